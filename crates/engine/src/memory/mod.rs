//! In-process engine
//!
//! `MemoryEngine` implements both [`CommandChannel`] and [`Engine`] over
//! plain maps. It understands the schema commands the catalog emits and
//! stores rows, keys and cells without persistence, indexing or search.
//!
//! ## Behavior worth knowing
//!
//! - The channel is half-duplex: `send` while a response is pending, or
//!   `recv` with nothing pending, is a `Protocol` error.
//! - Empty text keys are refused (`insert_row` returns `NIL_ID`).
//! - Setting a reference cell inserts the key into the referenced table if
//!   it is not there yet.
//! - Accessor handles are memoized per `(table, path)` and purged when any
//!   object they pass through is removed.

mod commands;
mod store;

use rustc_hash::FxHashMap;
use tracing::trace;

use grnbind_core::{DataKind, Error, ObjectId, Result, RowId, NIL_ID};
use grnbind_protocol::{CommandChannel, Command, SUCCESS_TOKEN};

use crate::engine::Engine;
use crate::wire::{RowInfo, TypeInfo, WireScalar, WireType, WireValue};

use store::{Accessor, Domain, MemTable, Object, Step};

/// Handles below this are reserved for built-in types.
const FIRST_OBJECT_ID: u32 = 256;

/// Response body of a rejected command
const FAILURE_TOKEN: &[u8] = b"false";

/// Ephemeral engine for tests and embedding.
///
/// # Example
///
/// ```
/// use grnbind_engine::{Engine, MemoryEngine};
/// use grnbind_protocol::CommandChannel;
///
/// let mut engine = MemoryEngine::new();
/// let body = engine.query("table_create Users TABLE_HASH_KEY ShortText").unwrap();
/// assert_eq!(body, b"true");
/// assert!(engine.open_table("Users").is_some());
/// ```
#[derive(Debug)]
pub struct MemoryEngine {
    objects: FxHashMap<ObjectId, Object>,
    tables: FxHashMap<String, ObjectId>,
    accessors: FxHashMap<(ObjectId, String), ObjectId>,
    next_object: u32,
    pending: Option<Result<Vec<u8>>>,
    sent: Vec<String>,
    bytes_sent: usize,
}

impl Default for MemoryEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryEngine {
    /// Create an empty engine.
    pub fn new() -> Self {
        Self {
            objects: FxHashMap::default(),
            tables: FxHashMap::default(),
            accessors: FxHashMap::default(),
            next_object: FIRST_OBJECT_ID,
            pending: None,
            sent: Vec::new(),
            bytes_sent: 0,
        }
    }

    /// Every command text received, in order
    pub fn sent_commands(&self) -> &[String] {
        &self.sent
    }

    /// Total bytes received through `send`
    pub fn bytes_sent(&self) -> usize {
        self.bytes_sent
    }

    /// Number of rows in a table
    pub fn row_count(&self, table: &str) -> Option<usize> {
        let id = self.tables.get(table)?;
        self.table(*id).ok().map(|t| t.rows.len())
    }

    // ========================================================================
    // Object access
    // ========================================================================

    fn alloc(&mut self) -> ObjectId {
        let id = ObjectId::new(self.next_object);
        self.next_object += 1;
        id
    }

    fn table(&self, id: ObjectId) -> Result<&MemTable> {
        match self.objects.get(&id) {
            Some(Object::Table(table)) => Ok(table),
            _ => Err(Error::engine_call("table", format!("no table {}", id))),
        }
    }

    fn table_mut(&mut self, id: ObjectId) -> Result<&mut MemTable> {
        match self.objects.get_mut(&id) {
            Some(Object::Table(table)) => Ok(table),
            _ => Err(Error::engine_call("table", format!("no table {}", id))),
        }
    }

    fn purge_accessors(&mut self) {
        let objects = &self.objects;
        let stale: Vec<ObjectId> = objects
            .iter()
            .filter_map(|(&id, object)| match object {
                Object::Accessor(a) if a.dependencies().any(|dep| !objects.contains_key(&dep)) => {
                    Some(id)
                }
                _ => None,
            })
            .collect();
        for id in &stale {
            self.objects.remove(id);
        }
        self.accessors.retain(|_, id| !stale.contains(id));
        if !stale.is_empty() {
            trace!(count = stale.len(), "purged stale accessors");
        }
    }

    // ========================================================================
    // Reference resolution
    // ========================================================================

    /// Kind a domain finally stores once every reference is followed.
    fn terminal_kind(&self, mut domain: Domain) -> DataKind {
        // Each hop moves to a table created earlier, so the walk is bounded.
        for _ in 0..=self.tables.len() {
            match domain {
                Domain::Void => return DataKind::Void,
                Domain::Builtin(kind) => return kind,
                Domain::Table(table) => match self.table(table) {
                    Ok(t) => domain = t.key,
                    Err(_) => return DataKind::Void,
                },
            }
        }
        DataKind::Void
    }

    fn type_info(&self, domain: Domain) -> TypeInfo {
        TypeInfo {
            kind: self.terminal_kind(domain),
            ref_table: domain.ref_table(),
            is_vector: None,
        }
    }

    /// Turn a stored slot value into the value callers see.
    fn materialize(&self, domain: Domain, stored: WireScalar) -> Result<WireScalar> {
        let Domain::Table(table) = domain else {
            return Ok(stored);
        };
        let WireScalar::UInt32(id) = stored else {
            return Err(Error::engine_call(
                "get_value",
                format!("corrupt reference: {}", stored.type_name()),
            ));
        };
        let t = self.table(table)?;
        if id == NIL_ID {
            let kind = self.terminal_kind(t.key);
            return WireScalar::zero(kind)
                .ok_or_else(|| Error::engine_call("get_value", "reference to a keyless table"));
        }
        let key = t
            .row(id)
            .and_then(|row| row.key.clone())
            .ok_or_else(|| Error::engine_call("get_value", "reference to a keyless table"))?;
        self.materialize(t.key, key)
    }

    /// Turn a caller value into what a slot stores, inserting referenced
    /// keys as needed.
    fn intern(&mut self, domain: Domain, value: &WireScalar, operation: &str) -> Result<WireScalar> {
        match domain {
            Domain::Void => Err(Error::engine_call(operation, "slot has no type")),
            Domain::Builtin(kind) if value.matches(kind) => Ok(value.clone()),
            Domain::Builtin(kind) => Err(Error::engine_call(
                operation,
                format!("{} does not fit {}", value.type_name(), kind),
            )),
            Domain::Table(table) => {
                let key_domain = self.table(table)?.key;
                if key_domain == Domain::Void {
                    return Err(Error::engine_call(operation, "reference to a keyless table"));
                }
                let key = self.intern(key_domain, value, operation)?;
                if is_empty_text(&key) {
                    return Err(Error::engine_call(operation, "empty key"));
                }
                let (_, id) = self.table_mut(table)?.insert(Some(key));
                Ok(WireScalar::UInt32(id))
            }
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    fn build_accessor(&self, table: ObjectId, path: &str) -> Option<Accessor> {
        let mut cursor = table;
        let mut steps = Vec::new();
        let mut range = Domain::Void;
        let mut vector = false;
        for (i, segment) in path.split('.').enumerate() {
            if i > 0 {
                cursor = range.ref_table()?;
            }
            let t = self.table(cursor).ok()?;
            let (step, domain, is_vector) = match segment {
                "_id" => (Step::Id, Domain::Builtin(DataKind::UInt32), false),
                "_key" => (Step::Key, t.key, false),
                "_value" => (Step::Value, t.value, false),
                name => {
                    let id = *t.columns.get(name)?;
                    match self.objects.get(&id) {
                        Some(Object::Column(c)) if !c.index => (Step::Column(id), c.range, c.vector),
                        _ => return None,
                    }
                }
            };
            if is_vector && vector {
                return None;
            }
            vector |= is_vector;
            range = domain;
            steps.push((cursor, step));
        }
        Some(Accessor {
            table,
            path: path.to_string(),
            steps,
            range,
            vector,
        })
    }

    /// Raw slot contents of one step for one row.
    fn read_step(&self, table: ObjectId, step: Step, id: RowId) -> Result<Vec<WireScalar>> {
        let t = self.table(table)?;
        let row = t
            .row(id)
            .ok_or_else(|| Error::engine_call("get_value", format!("invalid row id: {}", id)))?;
        let raw = match step {
            Step::Id => vec![WireScalar::UInt32(id)],
            Step::Key => row.key.clone().into_iter().collect(),
            Step::Value => row.value.clone().into_iter().collect(),
            Step::Column(column) => match self.objects.get(&column) {
                Some(Object::Column(c)) => match c.cells.get(&id) {
                    Some(WireValue::Scalar(s)) => vec![s.clone()],
                    Some(WireValue::Vector(v)) => v.clone(),
                    None if c.vector => Vec::new(),
                    None => self.slot_zero(c.range).into_iter().collect(),
                },
                _ => return Err(Error::engine_call("get_value", "column was removed")),
            },
        };
        Ok(raw)
    }

    /// Follow an accessor from row `id`.
    ///
    /// A missing reference keeps its position and reads as a zero value
    /// at the end of the path.
    fn read_accessor(&self, accessor: &Accessor, id: RowId) -> Result<WireValue> {
        let Some(((last_table, last_step), hops)) = accessor.steps.split_last() else {
            return Err(Error::engine_call("get_value", "empty accessor"));
        };
        let mut ids = vec![id];
        for &(table, step) in hops {
            let mut next = Vec::new();
            for id in ids {
                if id == NIL_ID {
                    next.push(NIL_ID);
                    continue;
                }
                for raw in self.read_step(table, step, id)? {
                    if let WireScalar::UInt32(rid) = raw {
                        next.push(rid);
                    }
                }
            }
            ids = next;
        }

        let last_is_vector = match last_step {
            Step::Column(column) => {
                matches!(self.objects.get(column), Some(Object::Column(c)) if c.vector)
            }
            _ => false,
        };
        let mut values = Vec::new();
        for id in ids {
            if id == NIL_ID {
                if let (false, Some(zero)) = (last_is_vector, self.slot_zero(accessor.range)) {
                    values.push(self.materialize(accessor.range, zero)?);
                }
                continue;
            }
            for raw in self.read_step(*last_table, *last_step, id)? {
                values.push(self.materialize(accessor.range, raw)?);
            }
        }
        if accessor.vector {
            return Ok(WireValue::Vector(values));
        }
        match values.into_iter().next() {
            Some(value) => Ok(WireValue::Scalar(value)),
            None => self.zero_scalar(accessor.range),
        }
    }

    /// Stored form of an unset scalar slot.
    fn slot_zero(&self, domain: Domain) -> Option<WireScalar> {
        match domain {
            Domain::Void => None,
            Domain::Builtin(kind) => WireScalar::zero(kind),
            Domain::Table(_) => Some(WireScalar::UInt32(NIL_ID)),
        }
    }

    fn zero_scalar(&self, domain: Domain) -> Result<WireValue> {
        let kind = self.terminal_kind(domain);
        WireScalar::zero(kind)
            .map(WireValue::Scalar)
            .ok_or_else(|| Error::engine_call("get_value", format!("no zero value for {}", kind)))
    }
}

fn is_empty_text(value: &WireScalar) -> bool {
    matches!(value, WireScalar::Text(text) if text.is_empty())
}

// ============================================================================
// Command channel
// ============================================================================

impl CommandChannel for MemoryEngine {
    fn send(&mut self, command: &[u8]) -> Result<()> {
        if self.pending.is_some() {
            return Err(Error::protocol("send while a response is pending"));
        }
        self.bytes_sent += command.len();

        let parsed = std::str::from_utf8(command)
            .map_err(|e| Error::protocol(format!("command is not UTF-8: {}", e)))
            .and_then(|text| {
                self.sent.push(text.to_string());
                Command::parse(text)
            });
        let command = match parsed {
            Ok(command) => command,
            Err(e) => {
                // The diagnostic is still delivered by the next recv.
                self.pending = Some(Ok(e.to_string().into_bytes()));
                return Err(e);
            }
        };

        let response = self.execute(&command).map(|accepted| {
            if accepted {
                SUCCESS_TOKEN.to_vec()
            } else {
                FAILURE_TOKEN.to_vec()
            }
        });
        self.pending = Some(response);
        Ok(())
    }

    fn recv(&mut self) -> Result<Vec<u8>> {
        match self.pending.take() {
            Some(response) => response,
            None => Err(Error::protocol("recv without a pending response")),
        }
    }
}

// ============================================================================
// Engine primitives
// ============================================================================

impl Engine for MemoryEngine {
    fn open_table(&mut self, name: &str) -> Option<ObjectId> {
        self.tables.get(name).copied()
    }

    fn object_name(&mut self, object: ObjectId) -> Result<String> {
        match self.objects.get(&object) {
            Some(Object::Table(t)) => Ok(t.name.clone()),
            Some(Object::Column(c)) => Ok(format!("{}.{}", self.table(c.table)?.name, c.name)),
            Some(Object::Accessor(a)) => Ok(format!("{}.{}", self.table(a.table)?.name, a.path)),
            None => Err(Error::engine_call("object_name", format!("no object {}", object))),
        }
    }

    fn table_key_info(&mut self, table: ObjectId) -> Result<TypeInfo> {
        let key = self.table(table)?.key;
        Ok(self.type_info(key))
    }

    fn table_value_info(&mut self, table: ObjectId) -> Result<TypeInfo> {
        let value = self.table(table)?.value;
        Ok(self.type_info(value))
    }

    fn open_column(&mut self, table: ObjectId, name: &str) -> Option<ObjectId> {
        if !name.contains('.') {
            if let Some(&column) = self.table(table).ok()?.columns.get(name) {
                return Some(column);
            }
        }
        let memo = (table, name.to_string());
        if let Some(&accessor) = self.accessors.get(&memo) {
            return Some(accessor);
        }
        let accessor = self.build_accessor(table, name)?;
        let id = self.alloc();
        trace!(%id, path = name, "opened accessor");
        self.objects.insert(id, Object::Accessor(accessor));
        self.accessors.insert(memo, id);
        Some(id)
    }

    fn column_value_info(&mut self, column: ObjectId) -> Result<TypeInfo> {
        let (range, vector) = match self.objects.get(&column) {
            Some(Object::Column(c)) => (c.range, c.vector || c.index),
            Some(Object::Accessor(a)) => (a.range, a.vector),
            _ => {
                return Err(Error::engine_call(
                    "column_value_info",
                    format!("no column {}", column),
                ))
            }
        };
        Ok(TypeInfo {
            is_vector: Some(vector),
            ..self.type_info(range)
        })
    }

    fn insert_row(&mut self, table: ObjectId, key: Option<&WireScalar>) -> Result<RowInfo> {
        let domain = self.table(table)?.key;
        let stored = match (domain, key) {
            (Domain::Void, None) => None,
            (Domain::Void, Some(_)) => {
                return Err(Error::engine_call("insert_row", "table has no key"))
            }
            (_, None) => return Err(Error::engine_call("insert_row", "key required")),
            (_, Some(key)) if is_empty_text(key) => {
                return Ok(RowInfo {
                    inserted: false,
                    id: NIL_ID,
                })
            }
            (domain, Some(key)) => match self.intern(domain, key, "insert_row") {
                Ok(stored) => Some(stored),
                Err(e) => {
                    trace!(error = %e, "key refused");
                    return Ok(RowInfo {
                        inserted: false,
                        id: NIL_ID,
                    });
                }
            },
        };
        let (inserted, id) = self.table_mut(table)?.insert(stored);
        Ok(RowInfo { inserted, id })
    }

    fn set_value(&mut self, column: ObjectId, id: RowId, value: &WireValue) -> Result<()> {
        let (table, range, vector) = match self.objects.get(&column) {
            Some(Object::Column(c)) if c.index => {
                return Err(Error::engine_call("set_value", "index columns are read-only"))
            }
            Some(Object::Column(c)) => (c.table, c.range, c.vector),
            Some(Object::Accessor(a)) => {
                return match a.steps.as_slice() {
                    [(table, Step::Value)] => {
                        let (table, range) = (*table, a.range);
                        self.set_table_value(table, range, id, value)
                    }
                    [(_, Step::Column(column))] => {
                        let column = *column;
                        self.set_value(column, id, value)
                    }
                    [(_, Step::Id | Step::Key)] => Err(Error::engine_call(
                        "set_value",
                        format!("{} is read-only", a.path),
                    )),
                    _ => Err(Error::engine_call(
                        "set_value",
                        format!("cannot write through <{}>", a.path),
                    )),
                };
            }
            _ => return Err(Error::engine_call("set_value", format!("no column {}", column))),
        };
        if !self.table(table)?.has_row(id) {
            return Err(Error::engine_call("set_value", format!("invalid row id: {}", id)));
        }

        let stored = match value {
            WireValue::Scalar(s) if !vector => WireValue::Scalar(self.intern(range, s, "set_value")?),
            WireValue::Vector(v) if vector => {
                let mut stored = Vec::with_capacity(v.len());
                for s in v {
                    stored.push(self.intern(range, s, "set_value")?);
                }
                WireValue::Vector(stored)
            }
            _ => {
                return Err(Error::engine_call(
                    "set_value",
                    "vector-ness does not match the column",
                ))
            }
        };
        if let Some(Object::Column(c)) = self.objects.get_mut(&column) {
            c.cells.insert(id, stored);
        }
        Ok(())
    }

    fn get_value(&mut self, column: ObjectId, id: RowId, expected: WireType) -> Result<WireValue> {
        let info = self.column_value_info(column)?;
        if info.kind != expected.kind || info.is_vector != Some(expected.is_vector) {
            return Err(Error::engine_call(
                "get_value",
                format!(
                    "type mismatch: column is {}, read as {}",
                    info.kind.label(info.is_vector.unwrap_or(false)),
                    expected.kind.label(expected.is_vector)
                ),
            ));
        }

        match self.objects.get(&column) {
            Some(Object::Column(c)) if c.index => {
                Err(Error::engine_call("get_value", "index columns cannot be read"))
            }
            Some(Object::Column(c)) => {
                if !self.table(c.table)?.has_row(id) {
                    return Err(Error::engine_call("get_value", format!("invalid row id: {}", id)));
                }
                match c.cells.get(&id) {
                    Some(WireValue::Scalar(s)) => {
                        Ok(WireValue::Scalar(self.materialize(c.range, s.clone())?))
                    }
                    Some(WireValue::Vector(v)) => v
                        .iter()
                        .map(|s| self.materialize(c.range, s.clone()))
                        .collect::<Result<Vec<_>>>()
                        .map(WireValue::Vector),
                    None if c.vector => Ok(WireValue::Vector(Vec::new())),
                    None => self.zero_scalar(c.range),
                }
            }
            Some(Object::Accessor(a)) => self.read_accessor(a, id),
            _ => Err(Error::engine_call("get_value", format!("no column {}", column))),
        }
    }
}

impl MemoryEngine {
    fn set_table_value(
        &mut self,
        table: ObjectId,
        range: Domain,
        id: RowId,
        value: &WireValue,
    ) -> Result<()> {
        let WireValue::Scalar(value) = value else {
            return Err(Error::engine_call("set_value", "_value is never a vector"));
        };
        if !self.table(table)?.has_row(id) {
            return Err(Error::engine_call("set_value", format!("invalid row id: {}", id)));
        }
        let stored = self.intern(range, value, "set_value")?;
        if let Some(row) = self.table_mut(table)?.row_mut(id) {
            row.value = Some(stored);
        }
        Ok(())
    }
}
