//! Schema commands understood by the memory engine
//!
//! | Command | Positional order |
//! |---------|------------------|
//! | `table_create` | name, flags, key_type, value_type, default_tokenizer, normalizer, token_filters |
//! | `column_create` | table, name, flags, type, source |
//! | `table_remove` | name |
//! | `column_remove` | table, name |
//!
//! Named options override positional ones. A rejected command answers
//! `false`; the reason is only logged.

use tracing::debug;

use grnbind_core::{DataKind, Error, ObjectId, Result};
use grnbind_protocol::Command;

use super::store::{Domain, MemColumn, MemTable, Object};
use super::MemoryEngine;

type Outcome = std::result::Result<(), String>;

/// Named option, falling back to the positional argument at `position`.
fn param<'a>(command: &'a Command, key: &str, position: usize) -> Option<&'a str> {
    command
        .get(key)
        .or_else(|| command.args().get(position).map(String::as_str))
        .filter(|value| !value.is_empty())
}

fn flags(raw: Option<&str>) -> Vec<&str> {
    raw.map(|raw| {
        raw.split('|')
            .map(str::trim)
            .filter(|flag| !flag.is_empty())
            .collect()
    })
    .unwrap_or_default()
}

/// Object names: ASCII alphanumerics and `_`, not starting with `_`.
fn valid_object_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('_')
        && name.chars().all(|c| c == '_' || c.is_ascii_alphanumeric())
}

impl MemoryEngine {
    /// Run one parsed command; `Ok(false)` is a rejected command.
    pub(crate) fn execute(&mut self, command: &Command) -> Result<bool> {
        let outcome = match command.name() {
            "table_create" => self.table_create(command),
            "column_create" => self.column_create(command),
            "table_remove" => self.table_remove(command),
            "column_remove" => self.column_remove(command),
            other => {
                return Err(Error::CommandRejected {
                    command: other.to_string(),
                    response: "unknown command".to_string(),
                })
            }
        };
        match outcome {
            Ok(()) => Ok(true),
            Err(reason) => {
                debug!(command = command.name(), %reason, "command rejected");
                Ok(false)
            }
        }
    }

    fn resolve_type(&self, name: &str, accept: fn(&DataKind) -> bool) -> Option<Domain> {
        match DataKind::from_name(name) {
            Some(kind) if accept(&kind) => Some(Domain::Builtin(kind)),
            Some(_) => None,
            None => self.tables.get(name).map(|&table| Domain::Table(table)),
        }
    }

    fn table_create(&mut self, command: &Command) -> Outcome {
        let name = param(command, "name", 0).ok_or("missing table name")?;
        if !valid_object_name(name) {
            return Err(format!("invalid table name: <{}>", name));
        }
        if self.tables.contains_key(name) {
            return Err(format!("table already exists: <{}>", name));
        }

        let mut keyed = true;
        for flag in flags(param(command, "flags", 1)) {
            match flag {
                "TABLE_NO_KEY" => keyed = false,
                "TABLE_HASH_KEY" | "TABLE_PAT_KEY" | "TABLE_DAT_KEY" => keyed = true,
                "KEY_WITH_SIS" | "KEY_NORMALIZE" | "KEY_LARGE" | "PERSISTENT" => {}
                other => return Err(format!("unknown flag: <{}>", other)),
            }
        }

        let key = if keyed {
            let key_type = param(command, "key_type", 2).ok_or("keyed table without key_type")?;
            self.resolve_type(key_type, DataKind::is_key_kind)
                .ok_or_else(|| format!("invalid key_type: <{}>", key_type))?
        } else {
            Domain::Void
        };
        let value = match param(command, "value_type", 3) {
            Some(value_type) => self
                .resolve_type(value_type, DataKind::is_table_value_kind)
                .ok_or_else(|| format!("invalid value_type: <{}>", value_type))?,
            None => Domain::Void,
        };

        let id = self.alloc();
        self.objects
            .insert(id, Object::Table(MemTable::new(name.to_string(), key, value)));
        self.tables.insert(name.to_string(), id);
        Ok(())
    }

    fn column_create(&mut self, command: &Command) -> Outcome {
        let table_name = param(command, "table", 0).ok_or("missing table")?;
        let name = param(command, "name", 1).ok_or("missing column name")?;
        let table = *self
            .tables
            .get(table_name)
            .ok_or_else(|| format!("table not found: <{}>", table_name))?;
        if !valid_object_name(name) {
            return Err(format!("invalid column name: <{}>", name));
        }
        if self.table(table).map_err(|e| e.to_string())?.columns.contains_key(name) {
            return Err(format!("column already exists: <{}.{}>", table_name, name));
        }

        let mut layout = None;
        for flag in flags(param(command, "flags", 2)) {
            let selected = match flag {
                "COLUMN_SCALAR" | "COLUMN_VECTOR" | "COLUMN_INDEX" => flag,
                "COMPRESS_ZLIB" | "COMPRESS_LZ4" | "COMPRESS_ZSTD" | "WITH_SECTION"
                | "WITH_WEIGHT" | "WITH_POSITION" | "PERSISTENT" => continue,
                other => return Err(format!("unknown flag: <{}>", other)),
            };
            if layout.replace(selected).is_some() {
                return Err("more than one column layout flag".to_string());
            }
        }
        let layout = layout.unwrap_or("COLUMN_SCALAR");

        let type_name = param(command, "type", 3).ok_or("missing column type")?;
        let range = self
            .resolve_type(type_name, DataKind::is_column_kind)
            .ok_or_else(|| format!("invalid type: <{}>", type_name))?;

        let mut sources = Vec::new();
        if layout == "COLUMN_INDEX" {
            let source_table = range
                .ref_table()
                .ok_or_else(|| format!("index type must be a table: <{}>", type_name))?;
            let source_table = self.table(source_table).map_err(|e| e.to_string())?;
            for source in param(command, "source", 4).unwrap_or_default().split(',') {
                match source.trim() {
                    "" => {}
                    "_key" if source_table.key != Domain::Void => sources.push(None),
                    source => {
                        let column = source_table
                            .columns
                            .get(source)
                            .ok_or_else(|| format!("source not found: <{}>", source))?;
                        sources.push(Some(*column));
                    }
                }
            }
        }

        let id = self.alloc();
        self.objects.insert(
            id,
            Object::Column(MemColumn {
                table,
                name: name.to_string(),
                vector: layout == "COLUMN_VECTOR",
                index: layout == "COLUMN_INDEX",
                sources,
                range,
                cells: Default::default(),
            }),
        );
        if let Some(Object::Table(t)) = self.objects.get_mut(&table) {
            t.columns.insert(name.to_string(), id);
        }
        Ok(())
    }

    fn table_remove(&mut self, command: &Command) -> Outcome {
        let name = param(command, "name", 0).ok_or("missing table name")?;
        let table = *self
            .tables
            .get(name)
            .ok_or_else(|| format!("table not found: <{}>", name))?;

        let referenced = self.objects.iter().any(|(&id, object)| match object {
            Object::Table(t) => {
                id != table && (t.key == Domain::Table(table) || t.value == Domain::Table(table))
            }
            Object::Column(c) => c.table != table && c.range == Domain::Table(table),
            Object::Accessor(_) => false,
        });
        if referenced {
            return Err(format!("table is referenced: <{}>", name));
        }

        if let Some(Object::Table(removed)) = self.objects.remove(&table) {
            for column in removed.columns.values() {
                self.objects.remove(column);
            }
        }
        self.tables.remove(name);
        self.purge_accessors();
        Ok(())
    }

    fn column_remove(&mut self, command: &Command) -> Outcome {
        let table_name = param(command, "table", 0).ok_or("missing table")?;
        let name = param(command, "name", 1).ok_or("missing column name")?;
        let table = *self
            .tables
            .get(table_name)
            .ok_or_else(|| format!("table not found: <{}>", table_name))?;
        let column: ObjectId = *self
            .table(table)
            .map_err(|e| e.to_string())?
            .columns
            .get(name)
            .ok_or_else(|| format!("column not found: <{}.{}>", table_name, name))?;

        let indexed = self.objects.values().any(|object| match object {
            Object::Column(c) => c.sources.contains(&Some(column)),
            _ => false,
        });
        if indexed {
            return Err(format!("column is indexed: <{}.{}>", table_name, name));
        }

        self.objects.remove(&column);
        if let Some(Object::Table(t)) = self.objects.get_mut(&table) {
            t.columns.remove(name);
        }
        self.purge_accessors();
        Ok(())
    }
}
