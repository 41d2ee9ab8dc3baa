//! Schema catalog
//!
//! The catalog owns one engine connection and caches what it learns about
//! the engine's tables and columns:
//!
//! - **Lazy**: nothing is read until a name is first resolved
//! - **Recursive**: resolving a reference resolves (and caches) its target
//! - **Sticky**: cache entries live until [`Catalog::refresh`] finds that
//!   the engine now answers a name with a different handle
//!
//! ## Dotted names
//!
//! `find_column("Posts", "author.age")` resolves `author` on `Posts`, moves
//! to the table `author` references, then resolves `age` there. Every
//! segment but the last must be a reference, and at most one segment may
//! be a vector. The composite takes the final segment's kind and reference
//! table and is cached under the full dotted name.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::{debug, info, trace};

use grnbind_core::{DataKind, Error, Key, Result, RowId, Value};
use grnbind_engine::{Engine, Runtime, RuntimeGuard, TypeInfo};
use grnbind_protocol::{expect_success, Command, QueryError};

use crate::column::Column;
use crate::config::CatalogConfig;
use crate::options::{ColumnOptions, TableOptions};
use crate::table::{ColumnLayout, RowInsert, Table, TypeSpec};

/// Dotted paths are short; keep their segments inline.
type Segments<'a> = SmallVec<[&'a str; 4]>;

#[derive(Debug)]
struct TableEntry {
    table: Arc<Table>,
    columns: FxHashMap<String, Arc<Column>>,
}

/// What [`Catalog::refresh`] evicted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshReport {
    /// Evicted tables, with all of their cached columns
    pub evicted_tables: Vec<String>,
    /// Columns evicted from surviving tables, as `table.column`
    pub evicted_columns: Vec<String>,
}

impl RefreshReport {
    /// Check if nothing was evicted
    pub fn is_empty(&self) -> bool {
        self.evicted_tables.is_empty() && self.evicted_columns.is_empty()
    }
}

/// Typed schema access over one engine connection.
///
/// # Concurrency
///
/// The table and column caches are plain maps without locks, and every
/// operation that can touch them takes `&mut self`. A `Catalog<E>` is
/// `Send` when `E: Send`; sharing one between threads needs external
/// locking. The `Arc<Table>` and `Arc<Column>` snapshots it hands out are
/// immutable and can be read from any thread. Schema changes made by
/// another process are only observed after [`refresh`](Self::refresh).
///
/// # Example
///
/// ```
/// use grnbind_core::{Key, Value};
/// use grnbind_engine::MemoryEngine;
/// use grnbind_schema::{Catalog, ColumnOptions, TableOptions, TableType};
///
/// let mut catalog = Catalog::open(MemoryEngine::new()).unwrap();
/// catalog
///     .create_table("Users", &TableOptions::keyed(TableType::HashKey, "ShortText"))
///     .unwrap();
/// catalog
///     .create_column("Users", "age", "UInt8", &ColumnOptions::default())
///     .unwrap();
///
/// let row = catalog.insert_row("Users", &Key::from("alice")).unwrap();
/// catalog.set_value("Users", "age", row.id, &Value::Int(30)).unwrap();
/// assert_eq!(catalog.get_value("Users", "age", row.id).unwrap(), Value::Int(30));
/// ```
pub struct Catalog<E: Engine> {
    engine: E,
    tables: FxHashMap<String, TableEntry>,
    config: CatalogConfig,
    guard: Option<RuntimeGuard>,
}

impl<E: Engine> Catalog<E> {
    /// Open a catalog with the default configuration.
    pub fn open(engine: E) -> Result<Self> {
        Self::with_config(engine, CatalogConfig::default())
    }

    /// Open a catalog registered with the process-wide runtime.
    pub fn with_config(engine: E, config: CatalogConfig) -> Result<Self> {
        Self::open_with_runtime(engine, config, &Runtime::global())
    }

    /// Open a catalog registered with `runtime`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Runtime` if the runtime cannot be initialized.
    pub fn open_with_runtime(
        engine: E,
        config: CatalogConfig,
        runtime: &Arc<Runtime>,
    ) -> Result<Self> {
        let guard = if config.manage_runtime {
            Some(runtime.acquire()?)
        } else {
            None
        };
        debug!(manage_runtime = config.manage_runtime, "catalog opened");
        Ok(Self {
            engine,
            tables: FxHashMap::default(),
            config,
            guard,
        })
    }

    /// Release the runtime registration and return the engine.
    ///
    /// # Errors
    ///
    /// Returns `Error::Runtime` if runtime teardown fails.
    pub fn close(mut self) -> Result<E> {
        if let Some(guard) = self.guard.take() {
            guard.release()?;
        }
        Ok(self.engine)
    }

    /// The engine connection
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// The engine connection, mutably.
    ///
    /// Schema changes made through it are only seen after [`refresh`](Self::refresh).
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Active configuration
    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Names of cached tables, sorted
    pub fn cached_tables(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.keys().cloned().collect();
        names.sort();
        names
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Send raw command text and return the response body.
    pub fn query(&mut self, text: &str) -> std::result::Result<Vec<u8>, QueryError> {
        if self.config.log_commands {
            debug!(command = text, "sending raw command");
        }
        self.engine.query(text)
    }

    /// Encode and send `command`, returning the response body.
    ///
    /// A malformed command fails with `Protocol` before the channel is used.
    pub fn query_command(&mut self, command: &Command) -> std::result::Result<Vec<u8>, QueryError> {
        if self.config.log_commands {
            if let Ok(text) = command.encode() {
                debug!(command = %text, "sending command");
            }
        }
        self.engine.query_command(command)
    }

    fn execute(&mut self, command: &Command) -> Result<()> {
        let response = self.query_command(command)?;
        expect_success(command.name(), &response)
    }

    /// Check a type name against built-in kinds, falling back to tables.
    fn check_type(&mut self, name: &str, builtin: fn(&DataKind) -> bool) -> Result<()> {
        if DataKind::from_name(name).is_some_and(|kind| builtin(&kind)) {
            return Ok(());
        }
        match self.find_table(name) {
            Ok(_) => Ok(()),
            Err(Error::NameResolution { .. }) => Err(Error::NameResolution {
                entity: "type".to_string(),
                name: name.to_string(),
            }),
            Err(e) => Err(e),
        }
    }

    // ========================================================================
    // Tables
    // ========================================================================

    /// Create a table and return its resolved metadata.
    ///
    /// Type names are checked before anything is sent.
    ///
    /// # Errors
    ///
    /// - `NameResolution` for an unknown `key_type` or `value_type`
    /// - `CommandRejected` if the engine does not answer `true`
    pub fn create_table(&mut self, name: &str, options: &TableOptions) -> Result<Arc<Table>> {
        let mut command = Command::new("table_create")
            .option("name", name)
            .option("flags", options.flags());
        if let Some(key_type) = options.key_type() {
            self.check_type(key_type, DataKind::is_key_kind)?;
            command.set_option("key_type", key_type);
        }
        if let Some(value_type) = options.value_type() {
            self.check_type(value_type, DataKind::is_table_value_kind)?;
            command.set_option("value_type", value_type);
        }
        if let Some(tokenizer) = options.default_tokenizer.as_deref().filter(|s| !s.is_empty()) {
            command.set_option("default_tokenizer", tokenizer);
        }
        if let Some(normalizer) = options.normalizer.as_deref().filter(|s| !s.is_empty()) {
            command.set_option("normalizer", normalizer);
        }
        if !options.token_filters.is_empty() {
            command.set_option("token_filters", options.token_filters.join(","));
        }

        self.execute(&command)?;
        debug!(table = name, "created table");
        self.find_table(name)
    }

    /// Resolve a table by name, reading the engine on a cache miss.
    ///
    /// # Errors
    ///
    /// - `NameResolution` if the engine has no such table
    /// - `ReferenceChain` if its key or value references a keyless table
    pub fn find_table(&mut self, name: &str) -> Result<Arc<Table>> {
        if let Some(entry) = self.tables.get(name) {
            trace!(table = name, "table cache hit");
            return Ok(Arc::clone(&entry.table));
        }
        trace!(table = name, "table cache miss");

        let object = self
            .engine
            .open_table(name)
            .ok_or_else(|| Error::table_not_found(name))?;
        let key = self.engine.table_key_info(object)?;
        let key_table = self.resolve_reference(&format!("{}._key", name), key)?;
        let value = self.engine.table_value_info(object)?;
        let value_table = self.resolve_reference(&format!("{}._value", name), value)?;

        let table = Arc::new(Table {
            name: name.to_string(),
            object,
            key_kind: key.kind,
            key_table,
            value_kind: value.kind,
            value_table,
        });
        self.tables.insert(
            name.to_string(),
            TableEntry {
                table: Arc::clone(&table),
                columns: FxHashMap::default(),
            },
        );
        Ok(table)
    }

    /// Resolve the target of a reference, caching the target table.
    fn resolve_reference(&mut self, path: &str, info: TypeInfo) -> Result<Option<String>> {
        let Some(target) = info.ref_table else {
            return Ok(None);
        };
        if info.kind == DataKind::Void {
            return Err(Error::reference_chain(path, "reference to void"));
        }
        let name = self.engine.object_name(target)?;
        self.find_table(&name)?;
        Ok(Some(name))
    }

    /// A handle bundling a resolved table with this catalog.
    pub fn table(&mut self, name: &str) -> Result<TableHandle<'_, E>> {
        let table = self.find_table(name)?;
        Ok(TableHandle {
            catalog: self,
            table,
        })
    }

    /// Find or insert a row of `table`.
    pub fn insert_row(&mut self, table: &str, key: &Key) -> Result<RowInsert> {
        let table = self.find_table(table)?;
        table.insert_row(&mut self.engine, key)
    }

    // ========================================================================
    // Columns
    // ========================================================================

    /// Create a column on `table` from a type spec.
    ///
    /// `[]T` makes a vector column, `T.source` an index column over
    /// `source`, anything else a scalar column of `T`.
    ///
    /// # Errors
    ///
    /// - `NameResolution` if the table or type is unknown
    /// - `CommandRejected` if the engine does not answer `true`
    pub fn create_column(
        &mut self,
        table: &str,
        name: &str,
        type_spec: &str,
        options: &ColumnOptions,
    ) -> Result<Arc<Column>> {
        let owner = self.find_table(table)?;
        let spec = TypeSpec::parse(type_spec);
        self.check_type(spec.type_name, DataKind::is_column_kind)?;

        let mut command = Command::new("column_create")
            .option("table", owner.name())
            .option("name", name)
            .option("flags", options.flags(spec.layout.flag()))
            .option("type", spec.type_name);
        if let (ColumnLayout::Index, Some(source)) = (spec.layout, spec.source) {
            command.set_option("source", source);
        }

        self.execute(&command)?;
        debug!(table, column = name, "created column");
        self.find_column(table, name)
    }

    /// Resolve a column of `table`, reading the engine on a cache miss.
    ///
    /// # Errors
    ///
    /// - `NameResolution` if the table or a segment does not exist
    /// - `ReferenceChain` for a non-reference hop, a vector of vectors or
    ///   a reference to a keyless table
    pub fn find_column(&mut self, table: &str, name: &str) -> Result<Arc<Column>> {
        let owner = self.find_table(table)?;
        if let Some(column) = self.tables.get(table).and_then(|e| e.columns.get(name)) {
            trace!(table, column = name, "column cache hit");
            return Ok(Arc::clone(column));
        }
        trace!(table, column = name, "column cache miss");

        let column = if name.contains('.') {
            self.resolve_path(&owner, name)?
        } else {
            self.resolve_segment(&owner, name)?
        };
        let column = Arc::new(column);
        if let Some(entry) = self.tables.get_mut(table) {
            entry.columns.insert(name.to_string(), Arc::clone(&column));
        }
        Ok(column)
    }

    fn resolve_segment(&mut self, table: &Table, name: &str) -> Result<Column> {
        let object = self
            .engine
            .open_column(table.object, name)
            .ok_or_else(|| Error::column_not_found(&table.name, name))?;
        let (value_kind, is_vector, value_table) = match name {
            "_id" => (DataKind::UInt32, false, None),
            "_key" => (table.key_kind, false, table.key_table.clone()),
            "_value" => (table.value_kind, false, table.value_table.clone()),
            _ => {
                let info = self.engine.column_value_info(object)?;
                let path = format!("{}.{}", table.name, name);
                let value_table = self.resolve_reference(&path, info)?;
                (info.kind, info.is_vector.unwrap_or(false), value_table)
            }
        };
        Ok(Column {
            table: table.name.clone(),
            name: name.to_string(),
            object,
            value_kind,
            is_vector,
            value_table,
        })
    }

    fn resolve_path(&mut self, table: &Arc<Table>, path: &str) -> Result<Column> {
        let full = format!("{}.{}", table.name, path);
        let segments: Segments<'_> = path.split('.').collect();
        if segments.iter().any(|segment| segment.is_empty()) {
            return Err(Error::reference_chain(full, "empty segment"));
        }

        let mut cursor = Arc::clone(table);
        let mut is_vector = false;
        let mut last: Option<Arc<Column>> = None;
        for segment in &segments {
            if let Some(previous) = &last {
                let target = previous.value_table.clone().ok_or_else(|| {
                    Error::reference_chain(
                        &full,
                        format!("segment <{}> is not a reference", previous.name),
                    )
                })?;
                cursor = self.find_table(&target)?;
            }
            let column = self.find_column(&cursor.name, segment)?;
            if column.is_vector {
                if is_vector {
                    return Err(Error::reference_chain(
                        &full,
                        format!("segment <{}> makes a vector of vectors", segment),
                    ));
                }
                is_vector = true;
            }
            last = Some(column);
        }
        let last = last.ok_or_else(|| Error::reference_chain(&full, "empty path"))?;

        let object = self
            .engine
            .open_column(table.object, path)
            .ok_or_else(|| Error::column_not_found(&table.name, path))?;
        Ok(Column {
            table: table.name.clone(),
            name: path.to_string(),
            object,
            value_kind: last.value_kind,
            is_vector,
            value_table: last.value_table.clone(),
        })
    }

    /// Write one cell of `table.column`.
    pub fn set_value(&mut self, table: &str, column: &str, id: RowId, value: &Value) -> Result<()> {
        let column = self.find_column(table, column)?;
        column.set_value(&mut self.engine, id, value)
    }

    /// Read one cell of `table.column`.
    pub fn get_value(&mut self, table: &str, column: &str, id: RowId) -> Result<Value> {
        let column = self.find_column(table, column)?;
        column.get_value(&mut self.engine, id)
    }

    /// Read several cells of `table.column`, one value per id in order.
    pub fn get_values(&mut self, table: &str, column: &str, ids: &[RowId]) -> Result<Vec<Value>> {
        let column = self.find_column(table, column)?;
        column.get_values(&mut self.engine, ids)
    }

    // ========================================================================
    // Invalidation
    // ========================================================================

    /// Re-resolve every cached name and evict whatever drifted.
    ///
    /// A table is evicted when the engine no longer resolves its name to
    /// the cached handle; its columns go with it. Columns of surviving
    /// tables are checked the same way. Finally, anything whose reference
    /// target was evicted is evicted too, until nothing changes.
    pub fn refresh(&mut self) -> Result<RefreshReport> {
        let mut report = RefreshReport::default();

        let mut names: Vec<String> = self.tables.keys().cloned().collect();
        names.sort();
        for name in &names {
            let cached = self.tables.get(name).map(|e| e.table.object);
            if self.engine.open_table(name) != cached {
                self.evict_table(name, &mut report);
            }
        }

        let mut drifted = Vec::new();
        for (table, entry) in &self.tables {
            for (name, column) in &entry.columns {
                if self.engine.open_column(entry.table.object, name) != Some(column.object) {
                    drifted.push((table.clone(), name.clone()));
                }
            }
        }
        drifted.sort();
        for (table, column) in drifted {
            self.evict_column(&table, &column, &mut report);
        }

        loop {
            let (tables, columns) = self.orphans();
            if tables.is_empty() && columns.is_empty() {
                break;
            }
            for table in tables {
                self.evict_table(&table, &mut report);
            }
            for (table, column) in columns {
                self.evict_column(&table, &column, &mut report);
            }
        }
        Ok(report)
    }

    /// Cached entries whose reference target is no longer cached.
    fn orphans(&self) -> (Vec<String>, Vec<(String, String)>) {
        let orphaned = |target: &Option<String>| {
            target
                .as_deref()
                .map_or(false, |name| !self.tables.contains_key(name))
        };
        let mut tables = Vec::new();
        let mut columns = Vec::new();
        for (name, entry) in &self.tables {
            if orphaned(&entry.table.key_table) || orphaned(&entry.table.value_table) {
                tables.push(name.clone());
            }
            for (column, meta) in &entry.columns {
                if orphaned(&meta.value_table) {
                    columns.push((name.clone(), column.clone()));
                }
            }
        }
        tables.sort();
        columns.sort();
        (tables, columns)
    }

    fn evict_table(&mut self, name: &str, report: &mut RefreshReport) {
        if let Some(entry) = self.tables.remove(name) {
            info!(table = name, columns = entry.columns.len(), "evicted table");
            report.evicted_tables.push(name.to_string());
        }
    }

    fn evict_column(&mut self, table: &str, column: &str, report: &mut RefreshReport) {
        if let Some(entry) = self.tables.get_mut(table) {
            if entry.columns.remove(column).is_some() {
                info!(table, column, "evicted column");
                report.evicted_columns.push(format!("{}.{}", table, column));
            }
        }
    }
}

impl<E: Engine + std::fmt::Debug> std::fmt::Debug for Catalog<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog")
            .field("engine", &self.engine)
            .field("tables", &self.cached_tables())
            .field("config", &self.config)
            .field("guard", &self.guard)
            .finish()
    }
}

/// A resolved table borrowed together with its catalog.
///
/// Obtained from [`Catalog::table`]; column operations resolve names
/// relative to this table.
pub struct TableHandle<'c, E: Engine> {
    catalog: &'c mut Catalog<E>,
    table: Arc<Table>,
}

impl<'c, E: Engine> TableHandle<'c, E> {
    /// Resolved table metadata
    pub fn meta(&self) -> &Arc<Table> {
        &self.table
    }

    /// See [`Catalog::create_column`].
    pub fn create_column(
        &mut self,
        name: &str,
        type_spec: &str,
        options: &ColumnOptions,
    ) -> Result<Arc<Column>> {
        self.catalog
            .create_column(&self.table.name, name, type_spec, options)
    }

    /// See [`Catalog::find_column`].
    pub fn find_column(&mut self, name: &str) -> Result<Arc<Column>> {
        self.catalog.find_column(&self.table.name, name)
    }

    /// See [`Table::insert_row`].
    pub fn insert_row(&mut self, key: &Key) -> Result<RowInsert> {
        self.table.insert_row(&mut self.catalog.engine, key)
    }

    /// Write one cell.
    pub fn set_value(&mut self, column: &str, id: RowId, value: &Value) -> Result<()> {
        self.catalog.set_value(&self.table.name, column, id, value)
    }

    /// Read one cell.
    pub fn get_value(&mut self, column: &str, id: RowId) -> Result<Value> {
        self.catalog.get_value(&self.table.name, column, id)
    }
}
