//! The engine primitive contract.
//!
//! Schema mutation goes through the textual [`CommandChannel`]; metadata
//! discovery and value access go through the typed primitives below. Both
//! share one logical connection, so every `Engine` is also a channel.

use grnbind_core::{ObjectId, Result, RowId};
use grnbind_protocol::CommandChannel;

use crate::wire::{RowInfo, TypeInfo, WireScalar, WireType, WireValue};

/// Typed primitives of a connected engine.
///
/// Handles returned by `open_*` stay valid until the object is removed.
/// Resolving the same name twice must return the same handle while the
/// object is unchanged; callers rely on this to detect schema drift.
pub trait Engine: CommandChannel {
    /// Find a table by name.
    fn open_table(&mut self, name: &str) -> Option<ObjectId>;

    /// Name of a table.
    fn object_name(&mut self, object: ObjectId) -> Result<String>;

    /// Type of a table's `_key`.
    fn table_key_info(&mut self, table: ObjectId) -> Result<TypeInfo>;

    /// Type of a table's `_value`.
    fn table_value_info(&mut self, table: ObjectId) -> Result<TypeInfo>;

    /// Find a column of `table`.
    ///
    /// `_id`, `_key`, `_value` and dotted paths resolve to accessors.
    fn open_column(&mut self, table: ObjectId, name: &str) -> Option<ObjectId>;

    /// Type of a stored column.
    fn column_value_info(&mut self, column: ObjectId) -> Result<TypeInfo>;

    /// Find or insert a row. `key` is `None` for tables without a key.
    ///
    /// A returned id of `NIL_ID` means the engine refused the key.
    fn insert_row(&mut self, table: ObjectId, key: Option<&WireScalar>) -> Result<RowInfo>;

    /// Write a cell.
    fn set_value(&mut self, column: ObjectId, id: RowId, value: &WireValue) -> Result<()>;

    /// Read a cell. Unset cells read as zero values or empty vectors.
    fn get_value(&mut self, column: ObjectId, id: RowId, expected: WireType) -> Result<WireValue>;
}

impl<E: Engine + ?Sized> Engine for Box<E> {
    fn open_table(&mut self, name: &str) -> Option<ObjectId> {
        (**self).open_table(name)
    }

    fn object_name(&mut self, object: ObjectId) -> Result<String> {
        (**self).object_name(object)
    }

    fn table_key_info(&mut self, table: ObjectId) -> Result<TypeInfo> {
        (**self).table_key_info(table)
    }

    fn table_value_info(&mut self, table: ObjectId) -> Result<TypeInfo> {
        (**self).table_value_info(table)
    }

    fn open_column(&mut self, table: ObjectId, name: &str) -> Option<ObjectId> {
        (**self).open_column(table, name)
    }

    fn column_value_info(&mut self, column: ObjectId) -> Result<TypeInfo> {
        (**self).column_value_info(column)
    }

    fn insert_row(&mut self, table: ObjectId, key: Option<&WireScalar>) -> Result<RowInfo> {
        (**self).insert_row(table, key)
    }

    fn set_value(&mut self, column: ObjectId, id: RowId, value: &WireValue) -> Result<()> {
        (**self).set_value(column, id, value)
    }

    fn get_value(&mut self, column: ObjectId, id: RowId, expected: WireType) -> Result<WireValue> {
        (**self).get_value(column, id, expected)
    }
}
