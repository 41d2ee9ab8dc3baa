//! Resolved table metadata, row insertion and column type specs

use std::fmt;

use grnbind_core::{DataKind, Error, Key, ObjectId, Result, RowId, NIL_ID};
use grnbind_engine::Engine;

use crate::codec;

/// A resolved table.
///
/// When `key_table` is set the key is a row reference and `key_kind` is
/// the terminal key kind of the referenced table; likewise for values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub(crate) name: String,
    pub(crate) object: ObjectId,
    pub(crate) key_kind: DataKind,
    pub(crate) key_table: Option<String>,
    pub(crate) value_kind: DataKind,
    pub(crate) value_table: Option<String>,
}

/// Outcome of [`Table::insert_row`].
///
/// `inserted == false` means the key already existed; `id` is still valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowInsert {
    /// `true` if a new row was created
    pub inserted: bool,
    /// Row identifier, never `NIL_ID`
    pub id: RowId,
}

impl Table {
    /// Table name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Engine handle
    pub fn object(&self) -> ObjectId {
        self.object
    }

    /// Key kind; `Void` for tables without a key
    pub fn key_kind(&self) -> DataKind {
        self.key_kind
    }

    /// Referenced table, if the key is a row reference
    pub fn key_table(&self) -> Option<&str> {
        self.key_table.as_deref()
    }

    /// Value kind; `Void` for tables without `_value`
    pub fn value_kind(&self) -> DataKind {
        self.value_kind
    }

    /// Referenced table, if `_value` is a row reference
    pub fn value_table(&self) -> Option<&str> {
        self.value_table.as_deref()
    }

    /// Check if rows are addressed by key
    pub fn is_keyed(&self) -> bool {
        self.key_kind != DataKind::Void
    }

    /// Find or insert the row for `key`.
    ///
    /// # Errors
    ///
    /// - `KindConflict` / `OutOfRange` if `key` does not fit the key kind
    /// - `EngineCall` if the engine refuses the key
    pub fn insert_row<E: Engine + ?Sized>(&self, engine: &mut E, key: &Key) -> Result<RowInsert> {
        let wire = codec::encode_key(self.key_kind, key)?;
        let row = engine.insert_row(self.object, wire.as_ref())?;
        if row.id == NIL_ID {
            return Err(Error::engine_call(
                "insert_row",
                format!("engine refused key for <{}>", self.name),
            ));
        }
        Ok(RowInsert {
            inserted: row.inserted,
            id: row.id,
        })
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        match &self.key_table {
            Some(table) => write!(f, " key={}({})", table, self.key_kind)?,
            None if self.is_keyed() => write!(f, " key={}", self.key_kind)?,
            None => {}
        }
        match &self.value_table {
            Some(table) => write!(f, " value={}({})", table, self.value_kind),
            None if self.value_kind != DataKind::Void => write!(f, " value={}", self.value_kind),
            None => Ok(()),
        }
    }
}

/// Column layout selected by a type spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnLayout {
    /// One value per row
    Scalar,
    /// A sequence of values per row
    Vector,
    /// Inverted index over a source
    Index,
}

impl ColumnLayout {
    /// Engine flag for this layout
    pub fn flag(&self) -> &'static str {
        match self {
            ColumnLayout::Scalar => "COLUMN_SCALAR",
            ColumnLayout::Vector => "COLUMN_VECTOR",
            ColumnLayout::Index => "COLUMN_INDEX",
        }
    }
}

/// Parsed column type spec.
///
/// | Spec | Layout | Type | Source |
/// |------|--------|------|--------|
/// | `Int32` | scalar | `Int32` | |
/// | `[]ShortText` | vector | `ShortText` | |
/// | `Docs.body` | index | `Docs` | `body` |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeSpec<'a> {
    /// Column layout
    pub layout: ColumnLayout,
    /// Built-in kind name or table name
    pub type_name: &'a str,
    /// Indexed source, index layout only
    pub source: Option<&'a str>,
}

impl<'a> TypeSpec<'a> {
    /// Split a type spec into its parts.
    pub fn parse(spec: &'a str) -> Self {
        if let Some(type_name) = spec.strip_prefix("[]") {
            return Self {
                layout: ColumnLayout::Vector,
                type_name,
                source: None,
            };
        }
        match spec.split_once('.') {
            Some((type_name, source)) => Self {
                layout: ColumnLayout::Index,
                type_name,
                source: Some(source),
            },
            None => Self {
                layout: ColumnLayout::Scalar,
                type_name: spec,
                source: None,
            },
        }
    }
}
