//! Wire representations exchanged with the engine primitives.
//!
//! Unlike the host [`Value`](grnbind_core::Value), a wire scalar carries the
//! exact sized primitive: an `Int32` column is written with
//! [`WireScalar::Int32`], never with a wider integer.

use grnbind_core::{DataKind, GeoPoint, ObjectId, RowId};

/// One engine primitive value.
#[derive(Debug, Clone, PartialEq)]
pub enum WireScalar {
    /// `Bool`
    Bool(bool),
    /// `Int8`
    Int8(i8),
    /// `Int16`
    Int16(i16),
    /// `Int32`
    Int32(i32),
    /// `Int64`
    Int64(i64),
    /// `UInt8`
    UInt8(u8),
    /// `UInt16`
    UInt16(u16),
    /// `UInt32`
    UInt32(u32),
    /// `UInt64`
    UInt64(u64),
    /// `Time`, microseconds since the Unix epoch
    Time(i64),
    /// `Float`
    Float(f64),
    /// Any text kind
    Text(Vec<u8>),
    /// Any geo point kind
    GeoPoint(GeoPoint),
}

impl WireScalar {
    /// Check if this primitive can be stored in a `kind` slot.
    ///
    /// Integer primitives match only their own sized kind. Text matches
    /// every text kind and GeoPoint every geo kind.
    pub fn matches(&self, kind: DataKind) -> bool {
        match self {
            WireScalar::Bool(_) => kind == DataKind::Bool,
            WireScalar::Int8(_) => kind == DataKind::Int8,
            WireScalar::Int16(_) => kind == DataKind::Int16,
            WireScalar::Int32(_) => kind == DataKind::Int32,
            WireScalar::Int64(_) => kind == DataKind::Int64,
            WireScalar::UInt8(_) => kind == DataKind::UInt8,
            WireScalar::UInt16(_) => kind == DataKind::UInt16,
            WireScalar::UInt32(_) => kind == DataKind::UInt32,
            WireScalar::UInt64(_) => kind == DataKind::UInt64,
            WireScalar::Time(_) => kind == DataKind::Time,
            WireScalar::Float(_) => kind == DataKind::Float,
            WireScalar::Text(_) => kind.is_text(),
            WireScalar::GeoPoint(_) => kind.is_geo_point(),
        }
    }

    /// The value an unset slot of `kind` reads as; `None` for `Void`.
    pub fn zero(kind: DataKind) -> Option<Self> {
        let zero = match kind {
            DataKind::Void => return None,
            DataKind::Bool => WireScalar::Bool(false),
            DataKind::Int8 => WireScalar::Int8(0),
            DataKind::Int16 => WireScalar::Int16(0),
            DataKind::Int32 => WireScalar::Int32(0),
            DataKind::Int64 => WireScalar::Int64(0),
            DataKind::UInt8 => WireScalar::UInt8(0),
            DataKind::UInt16 => WireScalar::UInt16(0),
            DataKind::UInt32 => WireScalar::UInt32(0),
            DataKind::UInt64 => WireScalar::UInt64(0),
            DataKind::Time => WireScalar::Time(0),
            DataKind::Float => WireScalar::Float(0.0),
            DataKind::ShortText | DataKind::Text | DataKind::LongText => {
                WireScalar::Text(Vec::new())
            }
            DataKind::TokyoGeoPoint | DataKind::WGS84GeoPoint => {
                WireScalar::GeoPoint(GeoPoint::default())
            }
        };
        Some(zero)
    }

    /// Primitive name for diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            WireScalar::Bool(_) => "Bool",
            WireScalar::Int8(_) => "Int8",
            WireScalar::Int16(_) => "Int16",
            WireScalar::Int32(_) => "Int32",
            WireScalar::Int64(_) => "Int64",
            WireScalar::UInt8(_) => "UInt8",
            WireScalar::UInt16(_) => "UInt16",
            WireScalar::UInt32(_) => "UInt32",
            WireScalar::UInt64(_) => "UInt64",
            WireScalar::Time(_) => "Time",
            WireScalar::Float(_) => "Float",
            WireScalar::Text(_) => "Text",
            WireScalar::GeoPoint(_) => "GeoPoint",
        }
    }
}

/// A scalar or vector cell as the engine reads and writes it.
#[derive(Debug, Clone, PartialEq)]
pub enum WireValue {
    /// One value per row
    Scalar(WireScalar),
    /// Ordered sequence per row; may be empty
    Vector(Vec<WireScalar>),
}

impl WireValue {
    /// Check if this is a vector cell
    pub fn is_vector(&self) -> bool {
        matches!(self, WireValue::Vector(_))
    }
}

/// The shape a reader expects from a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireType {
    /// Declared kind
    pub kind: DataKind,
    /// Declared vector-ness
    pub is_vector: bool,
}

/// Type information for a table key, table value or column.
///
/// When `ref_table` is set, `kind` is the terminal key kind of the
/// referenced table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeInfo {
    /// Built-in (or terminal) kind
    pub kind: DataKind,
    /// Referenced table, if this is a row reference
    pub ref_table: Option<ObjectId>,
    /// Vector-ness; only reported for columns
    pub is_vector: Option<bool>,
}

impl TypeInfo {
    /// Non-reference type info
    pub fn builtin(kind: DataKind) -> Self {
        Self {
            kind,
            ref_table: None,
            is_vector: None,
        }
    }
}

/// Outcome of a find-or-insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowInfo {
    /// `true` if a new row was created
    pub inserted: bool,
    /// Row identifier; `NIL_ID` on failure
    pub id: RowId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_exact_integer_width() {
        assert!(WireScalar::Int32(1).matches(DataKind::Int32));
        assert!(!WireScalar::Int32(1).matches(DataKind::Int64));
        assert!(!WireScalar::Int64(1).matches(DataKind::Time));
        assert!(WireScalar::Time(1).matches(DataKind::Time));
    }

    #[test]
    fn test_matches_families() {
        let text = WireScalar::Text(b"x".to_vec());
        assert!(text.matches(DataKind::ShortText));
        assert!(text.matches(DataKind::LongText));
        assert!(!text.matches(DataKind::Bool));
        let point = WireScalar::GeoPoint(GeoPoint::new(1, 2));
        assert!(point.matches(DataKind::TokyoGeoPoint));
        assert!(point.matches(DataKind::WGS84GeoPoint));
    }

    #[test]
    fn test_zero_matches_its_kind() {
        for kind in DataKind::ALL {
            match WireScalar::zero(kind) {
                Some(zero) => assert!(zero.matches(kind), "{:?}", kind),
                None => assert_eq!(kind, DataKind::Void),
            }
        }
    }
}
