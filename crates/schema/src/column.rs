//! Resolved column metadata and typed cell access

use std::fmt;

use grnbind_core::{DataKind, Error, ObjectId, Result, RowId, Value};
use grnbind_engine::{Engine, WireType};

use crate::codec;

/// A resolved column: stored, virtual (`_id`, `_key`, `_value`) or a
/// dotted reference path.
///
/// Columns are immutable snapshots handed out as `Arc<Column>` by the
/// catalog. They stay usable until a [`refresh`](crate::Catalog::refresh)
/// evicts them; after that the engine may reject the stale handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub(crate) table: String,
    pub(crate) name: String,
    pub(crate) object: ObjectId,
    pub(crate) value_kind: DataKind,
    pub(crate) is_vector: bool,
    pub(crate) value_table: Option<String>,
}

impl Column {
    /// Owning table name
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Column name; dotted for reference paths
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Engine handle
    pub fn object(&self) -> ObjectId {
        self.object
    }

    /// Kind of each value; the terminal key kind for references
    pub fn value_kind(&self) -> DataKind {
        self.value_kind
    }

    /// Check if each cell holds a vector
    pub fn is_vector(&self) -> bool {
        self.is_vector
    }

    /// Referenced table, if values are row references
    pub fn value_table(&self) -> Option<&str> {
        self.value_table.as_deref()
    }

    fn wire_type(&self) -> WireType {
        WireType {
            kind: self.value_kind,
            is_vector: self.is_vector,
        }
    }

    /// Write one cell.
    ///
    /// # Errors
    ///
    /// `KindConflict` or `OutOfRange` before the engine is called;
    /// `EngineCall` if the engine refuses the write.
    pub fn set_value<E: Engine + ?Sized>(
        &self,
        engine: &mut E,
        id: RowId,
        value: &Value,
    ) -> Result<()> {
        let wire = codec::encode_value(self.value_kind, self.is_vector, value)?;
        engine.set_value(self.object, id, &wire)
    }

    /// Read one cell. Unset cells read as zero values or empty vectors.
    ///
    /// # Errors
    ///
    /// `UnsupportedKind` for columns without a host mapping (a `Void` key
    /// or value); `EngineCall` if the engine cannot read the cell.
    pub fn get_value<E: Engine + ?Sized>(&self, engine: &mut E, id: RowId) -> Result<Value> {
        if self.value_kind == DataKind::Void {
            return Err(Error::UnsupportedKind {
                kind: self.value_kind.label(self.is_vector),
            });
        }
        let wire = engine.get_value(self.object, id, self.wire_type())?;
        codec::decode_value(self.value_kind, self.is_vector, wire)
    }

    /// Read several cells, one value per id in order.
    pub fn get_values<E: Engine + ?Sized>(
        &self,
        engine: &mut E,
        ids: &[RowId],
    ) -> Result<Vec<Value>> {
        ids.iter().map(|&id| self.get_value(engine, id)).collect()
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{} {}",
            self.table,
            self.name,
            self.value_kind.label(self.is_vector)
        )?;
        if let Some(table) = &self.value_table {
            write!(f, " -> {}", table)?;
        }
        Ok(())
    }
}
