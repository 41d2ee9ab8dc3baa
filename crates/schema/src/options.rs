//! Table and column creation options
//!
//! These map one-to-one onto the `flags` and type options of
//! `table_create` and `column_create`. All of them are serde types, so a
//! schema can be declared in TOML or JSON:
//!
//! ```toml
//! table_type = "pat_key"
//! key_type = "ShortText"
//! normalizer = "NormalizerAuto"
//! ```

use serde::{Deserialize, Serialize};

/// Key organization of a table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableType {
    /// Rows addressed by id only
    NoKey,
    /// Hash table
    #[default]
    HashKey,
    /// Patricia trie
    PatKey,
    /// Double-array trie
    DatKey,
}

impl TableType {
    /// Engine flag for this table type
    pub fn flag(&self) -> &'static str {
        match self {
            TableType::NoKey => "TABLE_NO_KEY",
            TableType::HashKey => "TABLE_HASH_KEY",
            TableType::PatKey => "TABLE_PAT_KEY",
            TableType::DatKey => "TABLE_DAT_KEY",
        }
    }
}

/// Options for [`Catalog::create_table`](crate::Catalog::create_table).
///
/// Leaving `key_type` unset always creates a table without a key,
/// whatever `table_type` says.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableOptions {
    /// Key organization; ignored when `key_type` is unset
    pub table_type: TableType,
    /// Add `KEY_WITH_SIS` (semi-infinite strings)
    pub with_sis: bool,
    /// Built-in key kind or table name
    pub key_type: Option<String>,
    /// Built-in value kind or table name; unset means no `_value`
    pub value_type: Option<String>,
    /// Tokenizer name, e.g. `TokenBigram`
    pub default_tokenizer: Option<String>,
    /// Normalizer name, e.g. `NormalizerAuto`
    pub normalizer: Option<String>,
    /// Token filter names
    pub token_filters: Vec<String>,
}

impl TableOptions {
    /// Keyed table of the given type
    pub fn keyed(table_type: TableType, key_type: impl Into<String>) -> Self {
        Self {
            table_type,
            key_type: Some(key_type.into()),
            ..Default::default()
        }
    }

    /// Set the value type
    pub fn with_value_type(mut self, value_type: impl Into<String>) -> Self {
        self.value_type = Some(value_type.into());
        self
    }

    /// Key type, treating an empty name as unset
    pub fn key_type(&self) -> Option<&str> {
        self.key_type.as_deref().filter(|name| !name.is_empty())
    }

    /// Value type, treating an empty name as unset
    pub fn value_type(&self) -> Option<&str> {
        self.value_type.as_deref().filter(|name| !name.is_empty())
    }

    /// Value of the `flags` option
    pub fn flags(&self) -> String {
        let mut flags = match self.key_type() {
            Some(_) => self.table_type.flag().to_string(),
            None => TableType::NoKey.flag().to_string(),
        };
        if self.with_sis {
            flags.push_str("|KEY_WITH_SIS");
        }
        flags
    }
}

/// Column value compression.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Compression {
    /// Store raw
    #[default]
    None,
    /// zlib
    Zlib,
    /// LZ4
    Lz4,
}

impl Compression {
    /// Engine flag, `None` when uncompressed
    pub fn flag(&self) -> Option<&'static str> {
        match self {
            Compression::None => None,
            Compression::Zlib => Some("COMPRESS_ZLIB"),
            Compression::Lz4 => Some("COMPRESS_LZ4"),
        }
    }
}

/// Options for [`TableHandle::create_column`](crate::TableHandle::create_column).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnOptions {
    /// Value compression
    pub compression: Compression,
    /// Index: record sections
    pub with_section: bool,
    /// Index: record weights
    pub with_weight: bool,
    /// Index: record positions
    pub with_position: bool,
}

impl ColumnOptions {
    /// Append this option set's flags to a column layout flag.
    pub fn flags(&self, layout: &str) -> String {
        let mut flags = layout.to_string();
        let bits = [
            (self.compression.flag(), true),
            (Some("WITH_SECTION"), self.with_section),
            (Some("WITH_WEIGHT"), self.with_weight),
            (Some("WITH_POSITION"), self.with_position),
        ];
        for (flag, enabled) in bits {
            if let (Some(flag), true) = (flag, enabled) {
                flags.push('|');
                flags.push_str(flag);
            }
        }
        flags
    }
}
