//! Built-in engine data kinds
//!
//! This module defines:
//! - DataKind: the closed set of built-in engine types
//! - ValueClass: the logical host type a kind marshals to
//!
//! ## Kind Families
//!
//! Several wire kinds share one host representation:
//!
//! | Class | Kinds | Host type |
//! |-------|-------|-----------|
//! | Int | `Int8..Int64`, `UInt8..UInt64`, `Time` | `i64` |
//! | Text | `ShortText`, `Text`, `LongText` | `Vec<u8>` |
//! | GeoPoint | `TokyoGeoPoint`, `WGS84GeoPoint` | [`GeoPoint`](crate::GeoPoint) |
//!
//! `Time` counts microseconds since the Unix epoch.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Built-in engine data type.
///
/// The canonical names returned by [`DataKind::name`] are the names the engine
/// accepts in `key_type`, `value_type` and `type` options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataKind {
    /// No value
    Void,
    /// Boolean
    Bool,
    /// Signed 8-bit integer
    Int8,
    /// Signed 16-bit integer
    Int16,
    /// Signed 32-bit integer
    Int32,
    /// Signed 64-bit integer
    Int64,
    /// Unsigned 8-bit integer
    UInt8,
    /// Unsigned 16-bit integer
    UInt16,
    /// Unsigned 32-bit integer
    UInt32,
    /// Unsigned 64-bit integer
    UInt64,
    /// 64-bit float
    Float,
    /// Microseconds since the Unix epoch
    Time,
    /// Text up to 4KiB
    ShortText,
    /// Text up to 64KiB
    Text,
    /// Text up to 2GiB
    LongText,
    /// Tokyo datum coordinate
    TokyoGeoPoint,
    /// WGS84 datum coordinate
    WGS84GeoPoint,
}

/// Logical host type of a [`DataKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueClass {
    /// No host representation
    Void,
    /// `bool`
    Bool,
    /// `i64`
    Int,
    /// `f64`
    Float,
    /// Byte string
    Text,
    /// Latitude/longitude pair
    GeoPoint,
}

impl ValueClass {
    /// Name used in error messages
    pub fn name(&self) -> &'static str {
        match self {
            ValueClass::Void => "Void",
            ValueClass::Bool => "Bool",
            ValueClass::Int => "Int",
            ValueClass::Float => "Float",
            ValueClass::Text => "Text",
            ValueClass::GeoPoint => "GeoPoint",
        }
    }

    /// Label including the vector marker, e.g. `[]Text`
    pub fn label(&self, is_vector: bool) -> String {
        if is_vector {
            format!("[]{}", self.name())
        } else {
            self.name().to_string()
        }
    }
}

impl fmt::Display for ValueClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl DataKind {
    /// Every built-in kind, in engine type-id order
    pub const ALL: [DataKind; 17] = [
        DataKind::Void,
        DataKind::Bool,
        DataKind::Int8,
        DataKind::UInt8,
        DataKind::Int16,
        DataKind::UInt16,
        DataKind::Int32,
        DataKind::UInt32,
        DataKind::Int64,
        DataKind::UInt64,
        DataKind::Float,
        DataKind::Time,
        DataKind::ShortText,
        DataKind::Text,
        DataKind::LongText,
        DataKind::TokyoGeoPoint,
        DataKind::WGS84GeoPoint,
    ];

    /// Canonical engine name
    pub fn name(&self) -> &'static str {
        match self {
            DataKind::Void => "Void",
            DataKind::Bool => "Bool",
            DataKind::Int8 => "Int8",
            DataKind::Int16 => "Int16",
            DataKind::Int32 => "Int32",
            DataKind::Int64 => "Int64",
            DataKind::UInt8 => "UInt8",
            DataKind::UInt16 => "UInt16",
            DataKind::UInt32 => "UInt32",
            DataKind::UInt64 => "UInt64",
            DataKind::Float => "Float",
            DataKind::Time => "Time",
            DataKind::ShortText => "ShortText",
            DataKind::Text => "Text",
            DataKind::LongText => "LongText",
            DataKind::TokyoGeoPoint => "TokyoGeoPoint",
            DataKind::WGS84GeoPoint => "WGS84GeoPoint",
        }
    }

    /// Parse a canonical engine name. Names are case-sensitive.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.name() == name)
    }

    /// Host class this kind marshals to
    pub fn class(&self) -> ValueClass {
        match self {
            DataKind::Void => ValueClass::Void,
            DataKind::Bool => ValueClass::Bool,
            DataKind::Int8
            | DataKind::Int16
            | DataKind::Int32
            | DataKind::Int64
            | DataKind::UInt8
            | DataKind::UInt16
            | DataKind::UInt32
            | DataKind::UInt64
            | DataKind::Time => ValueClass::Int,
            DataKind::Float => ValueClass::Float,
            DataKind::ShortText | DataKind::Text | DataKind::LongText => ValueClass::Text,
            DataKind::TokyoGeoPoint | DataKind::WGS84GeoPoint => ValueClass::GeoPoint,
        }
    }

    /// Check if this kind belongs to the integer family (including `Time`)
    pub fn is_integer(&self) -> bool {
        self.class() == ValueClass::Int
    }

    /// Check if this kind is a text kind
    pub fn is_text(&self) -> bool {
        self.class() == ValueClass::Text
    }

    /// Check if this kind is a geo point kind
    pub fn is_geo_point(&self) -> bool {
        self.class() == ValueClass::GeoPoint
    }

    /// Kinds accepted as a table `key_type`.
    ///
    /// Keys must be fixed size or `ShortText`.
    pub fn is_key_kind(&self) -> bool {
        !matches!(self, DataKind::Void | DataKind::Text | DataKind::LongText)
    }

    /// Kinds accepted as a table `value_type`.
    ///
    /// Table values are fixed size, so no text kind qualifies.
    pub fn is_table_value_kind(&self) -> bool {
        !matches!(self, DataKind::Void) && !self.is_text()
    }

    /// Kinds accepted as a column `type`
    pub fn is_column_kind(&self) -> bool {
        !matches!(self, DataKind::Void)
    }

    /// Inclusive host range of an integer kind, `None` for other kinds.
    pub fn int_range(&self) -> Option<(i128, i128)> {
        let range = match self {
            DataKind::Int8 => (i8::MIN as i128, i8::MAX as i128),
            DataKind::Int16 => (i16::MIN as i128, i16::MAX as i128),
            DataKind::Int32 => (i32::MIN as i128, i32::MAX as i128),
            DataKind::Int64 | DataKind::Time => (i64::MIN as i128, i64::MAX as i128),
            DataKind::UInt8 => (0, u8::MAX as i128),
            DataKind::UInt16 => (0, u16::MAX as i128),
            DataKind::UInt32 => (0, u32::MAX as i128),
            DataKind::UInt64 => (0, u64::MAX as i128),
            _ => return None,
        };
        Some(range)
    }

    /// Label including the vector marker, e.g. `[]Int32`
    pub fn label(&self, is_vector: bool) -> String {
        if is_vector {
            format!("[]{}", self.name())
        } else {
            self.name().to_string()
        }
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_round_trip() {
        for kind in DataKind::ALL {
            assert_eq!(DataKind::from_name(kind.name()), Some(kind));
        }
    }

    #[test]
    fn test_from_name_rejects_unknown() {
        assert_eq!(DataKind::from_name("int32"), None);
        assert_eq!(DataKind::from_name(""), None);
        assert_eq!(DataKind::from_name("Table"), None);
    }

    #[test]
    fn test_classes() {
        assert_eq!(DataKind::Time.class(), ValueClass::Int);
        assert_eq!(DataKind::UInt64.class(), ValueClass::Int);
        assert_eq!(DataKind::LongText.class(), ValueClass::Text);
        assert_eq!(DataKind::WGS84GeoPoint.class(), ValueClass::GeoPoint);
        assert_eq!(DataKind::Void.class(), ValueClass::Void);
    }

    #[test]
    fn test_key_and_value_kinds() {
        assert!(DataKind::ShortText.is_key_kind());
        assert!(!DataKind::Text.is_key_kind());
        assert!(!DataKind::ShortText.is_table_value_kind());
        assert!(DataKind::TokyoGeoPoint.is_table_value_kind());
        assert!(DataKind::LongText.is_column_kind());
        assert!(!DataKind::Void.is_column_kind());
    }

    #[test]
    fn test_int_range() {
        assert_eq!(DataKind::Int8.int_range(), Some((-128, 127)));
        assert_eq!(DataKind::UInt32.int_range(), Some((0, 4_294_967_295)));
        assert_eq!(DataKind::Float.int_range(), None);
    }

    #[test]
    fn test_labels() {
        assert_eq!(DataKind::Int32.label(false), "Int32");
        assert_eq!(DataKind::ShortText.label(true), "[]ShortText");
        assert_eq!(ValueClass::Text.label(true), "[]Text");
    }
}
