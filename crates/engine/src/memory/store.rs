//! Storage objects of the memory engine
//!
//! Every table, column and accessor lives in one object map keyed by
//! [`ObjectId`]. Reference slots (a reference key, value or column) store the
//! referenced row id as `WireScalar::UInt32`; the terminal key is only
//! materialized when a value leaves the engine.

use rustc_hash::FxHashMap;

use grnbind_core::{DataKind, ObjectId, RowId};

use crate::wire::{WireScalar, WireValue};

/// Type of a key, value or column slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Domain {
    /// No slot
    Void,
    /// Built-in kind
    Builtin(DataKind),
    /// Row reference into a table
    Table(ObjectId),
}

impl Domain {
    pub(crate) fn ref_table(&self) -> Option<ObjectId> {
        match self {
            Domain::Table(table) => Some(*table),
            _ => None,
        }
    }
}

/// One row: its key (keyed tables only) and its `_value` slot.
#[derive(Debug, Clone, Default)]
pub(crate) struct MemRow {
    pub(crate) key: Option<WireScalar>,
    pub(crate) value: Option<WireScalar>,
}

#[derive(Debug)]
pub(crate) struct MemTable {
    pub(crate) name: String,
    pub(crate) key: Domain,
    pub(crate) value: Domain,
    /// Encoded key → row id
    pub(crate) keys: FxHashMap<Vec<u8>, RowId>,
    /// Row `id` lives at index `id - 1`
    pub(crate) rows: Vec<MemRow>,
    pub(crate) columns: FxHashMap<String, ObjectId>,
}

impl MemTable {
    pub(crate) fn new(name: String, key: Domain, value: Domain) -> Self {
        Self {
            name,
            key,
            value,
            keys: FxHashMap::default(),
            rows: Vec::new(),
            columns: FxHashMap::default(),
        }
    }

    pub(crate) fn has_row(&self, id: RowId) -> bool {
        id != 0 && (id as usize) <= self.rows.len()
    }

    pub(crate) fn row(&self, id: RowId) -> Option<&MemRow> {
        if self.has_row(id) {
            self.rows.get(id as usize - 1)
        } else {
            None
        }
    }

    pub(crate) fn row_mut(&mut self, id: RowId) -> Option<&mut MemRow> {
        if self.has_row(id) {
            self.rows.get_mut(id as usize - 1)
        } else {
            None
        }
    }

    /// Find-or-insert by encoded key; `None` appends a keyless row.
    pub(crate) fn insert(&mut self, key: Option<WireScalar>) -> (bool, RowId) {
        let encoded = key.as_ref().map(encode_key);
        if let Some(encoded) = &encoded {
            if let Some(&id) = self.keys.get(encoded) {
                return (false, id);
            }
        }
        self.rows.push(MemRow { key, value: None });
        let id = self.rows.len() as RowId;
        if let Some(encoded) = encoded {
            self.keys.insert(encoded, id);
        }
        (true, id)
    }
}

#[derive(Debug)]
pub(crate) struct MemColumn {
    pub(crate) table: ObjectId,
    pub(crate) name: String,
    pub(crate) vector: bool,
    pub(crate) index: bool,
    /// Source columns of an index; `None` stands for `_key`
    pub(crate) sources: Vec<Option<ObjectId>>,
    pub(crate) range: Domain,
    pub(crate) cells: FxHashMap<RowId, WireValue>,
}

/// One hop of an accessor path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    Id,
    Key,
    Value,
    Column(ObjectId),
}

/// A virtual column or dotted path, opened through `open_column`.
#[derive(Debug)]
pub(crate) struct Accessor {
    pub(crate) table: ObjectId,
    pub(crate) path: String,
    /// `(table the step reads from, step)`
    pub(crate) steps: Vec<(ObjectId, Step)>,
    /// Domain of the final step
    pub(crate) range: Domain,
    pub(crate) vector: bool,
}

impl Accessor {
    /// Every object this accessor depends on
    pub(crate) fn dependencies(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.steps.iter().flat_map(|(table, step)| {
            let column = match step {
                Step::Column(column) => Some(*column),
                _ => None,
            };
            std::iter::once(*table).chain(column)
        })
    }
}

#[derive(Debug)]
pub(crate) enum Object {
    Table(MemTable),
    Column(MemColumn),
    Accessor(Accessor),
}

/// Hashable encoding of a key; the tag keeps kinds from colliding.
pub(crate) fn encode_key(key: &WireScalar) -> Vec<u8> {
    let mut out = Vec::with_capacity(9);
    match key {
        WireScalar::Bool(b) => {
            out.push(0);
            out.push(*b as u8);
        }
        WireScalar::Int8(v) => {
            out.push(1);
            out.extend_from_slice(&v.to_le_bytes());
        }
        WireScalar::Int16(v) => {
            out.push(2);
            out.extend_from_slice(&v.to_le_bytes());
        }
        WireScalar::Int32(v) => {
            out.push(3);
            out.extend_from_slice(&v.to_le_bytes());
        }
        WireScalar::Int64(v) => {
            out.push(4);
            out.extend_from_slice(&v.to_le_bytes());
        }
        WireScalar::UInt8(v) => {
            out.push(5);
            out.push(*v);
        }
        WireScalar::UInt16(v) => {
            out.push(6);
            out.extend_from_slice(&v.to_le_bytes());
        }
        WireScalar::UInt32(v) => {
            out.push(7);
            out.extend_from_slice(&v.to_le_bytes());
        }
        WireScalar::UInt64(v) => {
            out.push(8);
            out.extend_from_slice(&v.to_le_bytes());
        }
        WireScalar::Time(v) => {
            out.push(9);
            out.extend_from_slice(&v.to_le_bytes());
        }
        WireScalar::Float(v) => {
            out.push(10);
            // -0.0 and 0.0 are the same key
            let v = if *v == 0.0 { 0.0f64 } else { *v };
            out.extend_from_slice(&v.to_bits().to_le_bytes());
        }
        WireScalar::Text(v) => {
            out.push(11);
            out.extend_from_slice(v);
        }
        WireScalar::GeoPoint(p) => {
            out.push(12);
            out.extend_from_slice(&p.latitude.to_le_bytes());
            out.extend_from_slice(&p.longitude.to_le_bytes());
        }
    }
    out
}
