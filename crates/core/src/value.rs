//! Value types for grnbind
//!
//! This module defines:
//! - GeoPoint: a latitude/longitude pair in milliseconds
//! - Value: the host value passed to and returned from column accessors
//! - Key: the host value used to find or insert a row
//!
//! ## Type Rules
//!
//! - No implicit coercions: `Int(1)` never matches a `Float` column
//! - `Text` is a byte string, not necessarily UTF-8
//! - A zero-length vector is a value, distinct from a missing one
//! - Float uses IEEE-754 equality: `NaN != NaN`, `-0.0 == 0.0`

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::kind::ValueClass;

/// A coordinate of latitude and longitude, both in milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in milliseconds
    pub latitude: i32,
    /// Longitude in milliseconds
    pub longitude: i32,
}

impl GeoPoint {
    /// Create a point from millisecond coordinates
    pub const fn new(latitude: i32, longitude: i32) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Host value for column get/set.
///
/// Each variant maps to exactly one `(ValueClass, is_vector)` pair; see
/// [`Value::class`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Boolean
    Bool(bool),
    /// Any integer-family kind, widened to `i64`
    Int(i64),
    /// 64-bit float
    Float(f64),
    /// Byte string
    Text(Vec<u8>),
    /// Coordinate
    GeoPoint(GeoPoint),
    /// Vector of booleans
    BoolVector(Vec<bool>),
    /// Vector of integers
    IntVector(Vec<i64>),
    /// Vector of floats
    FloatVector(Vec<f64>),
    /// Vector of byte strings
    TextVector(Vec<Vec<u8>>),
    /// Vector of coordinates
    GeoPointVector(Vec<GeoPoint>),
}

impl Value {
    /// The `(class, is_vector)` pair this variant requires of a column
    pub fn class(&self) -> (ValueClass, bool) {
        match self {
            Value::Bool(_) => (ValueClass::Bool, false),
            Value::Int(_) => (ValueClass::Int, false),
            Value::Float(_) => (ValueClass::Float, false),
            Value::Text(_) => (ValueClass::Text, false),
            Value::GeoPoint(_) => (ValueClass::GeoPoint, false),
            Value::BoolVector(_) => (ValueClass::Bool, true),
            Value::IntVector(_) => (ValueClass::Int, true),
            Value::FloatVector(_) => (ValueClass::Float, true),
            Value::TextVector(_) => (ValueClass::Text, true),
            Value::GeoPointVector(_) => (ValueClass::GeoPoint, true),
        }
    }

    /// Type label used in error messages, e.g. `[]Text`
    pub fn type_label(&self) -> String {
        let (class, is_vector) = self.class();
        class.label(is_vector)
    }

    /// Check if this is a vector value
    pub fn is_vector(&self) -> bool {
        self.class().1
    }

    /// Number of elements in a vector value, `None` for scalars
    pub fn vector_len(&self) -> Option<usize> {
        match self {
            Value::BoolVector(v) => Some(v.len()),
            Value::IntVector(v) => Some(v.len()),
            Value::FloatVector(v) => Some(v.len()),
            Value::TextVector(v) => Some(v.len()),
            Value::GeoPointVector(v) => Some(v.len()),
            _ => None,
        }
    }

    /// Get as bool if this is a Bool value
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as i64 if this is an Int value
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as f64 if this is a Float value
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Get as bytes if this is a Text value
    pub fn as_text(&self) -> Option<&[u8]> {
        match self {
            Value::Text(t) => Some(t),
            _ => None,
        }
    }

    /// Get as GeoPoint if this is a GeoPoint value
    pub fn as_geo_point(&self) -> Option<GeoPoint> {
        match self {
            Value::GeoPoint(p) => Some(*p),
            _ => None,
        }
    }

    /// Build a `Time` value from a UTC datetime
    pub fn time(at: DateTime<Utc>) -> Self {
        Value::Int(at.timestamp_micros())
    }

    /// Interpret an Int value as a `Time` (microseconds since epoch)
    pub fn as_time(&self) -> Option<DateTime<Utc>> {
        self.as_int().and_then(micros_to_datetime)
    }
}

/// Convert microseconds since the Unix epoch to a UTC datetime.
///
/// Returns `None` when the instant is outside chrono's representable range.
pub fn micros_to_datetime(micros: i64) -> Option<DateTime<Utc>> {
    let secs = micros.div_euclid(1_000_000);
    let nanos = (micros.rem_euclid(1_000_000) * 1_000) as u32;
    Utc.timestamp_opt(secs, nanos).single()
}

// ============================================================================
// From implementations for ergonomic API usage
// ============================================================================

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.as_bytes().to_vec())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s.into_bytes())
    }
}

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self {
        Value::Text(b.to_vec())
    }
}

impl From<GeoPoint> for Value {
    fn from(p: GeoPoint) -> Self {
        Value::GeoPoint(p)
    }
}

impl From<Vec<bool>> for Value {
    fn from(v: Vec<bool>) -> Self {
        Value::BoolVector(v)
    }
}

impl From<Vec<i64>> for Value {
    fn from(v: Vec<i64>) -> Self {
        Value::IntVector(v)
    }
}

impl From<Vec<f64>> for Value {
    fn from(v: Vec<f64>) -> Self {
        Value::FloatVector(v)
    }
}

impl From<Vec<Vec<u8>>> for Value {
    fn from(v: Vec<Vec<u8>>) -> Self {
        Value::TextVector(v)
    }
}

impl From<Vec<&str>> for Value {
    fn from(v: Vec<&str>) -> Self {
        Value::TextVector(v.into_iter().map(|s| s.as_bytes().to_vec()).collect())
    }
}

impl From<Vec<GeoPoint>> for Value {
    fn from(v: Vec<GeoPoint>) -> Self {
        Value::GeoPointVector(v)
    }
}

/// Host key for row insertion.
///
/// `Void` is the only key accepted by tables without a key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Key {
    /// No key
    Void,
    /// Boolean key
    Bool(bool),
    /// Integer-family key
    Int(i64),
    /// Float key
    Float(f64),
    /// Text key
    Text(Vec<u8>),
    /// Coordinate key
    GeoPoint(GeoPoint),
}

impl Key {
    /// Host class of this key
    pub fn class(&self) -> ValueClass {
        match self {
            Key::Void => ValueClass::Void,
            Key::Bool(_) => ValueClass::Bool,
            Key::Int(_) => ValueClass::Int,
            Key::Float(_) => ValueClass::Float,
            Key::Text(_) => ValueClass::Text,
            Key::GeoPoint(_) => ValueClass::GeoPoint,
        }
    }
}

impl From<()> for Key {
    fn from(_: ()) -> Self {
        Key::Void
    }
}

impl From<bool> for Key {
    fn from(b: bool) -> Self {
        Key::Bool(b)
    }
}

impl From<i64> for Key {
    fn from(i: i64) -> Self {
        Key::Int(i)
    }
}

impl From<i32> for Key {
    fn from(i: i32) -> Self {
        Key::Int(i as i64)
    }
}

impl From<f64> for Key {
    fn from(f: f64) -> Self {
        Key::Float(f)
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Text(s.as_bytes().to_vec())
    }
}

impl From<&[u8]> for Key {
    fn from(b: &[u8]) -> Self {
        Key::Text(b.to_vec())
    }
}

impl From<GeoPoint> for Key {
    fn from(p: GeoPoint) -> Self {
        Key::GeoPoint(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_classes() {
        assert_eq!(Value::Int(1).class(), (ValueClass::Int, false));
        assert_eq!(
            Value::TextVector(vec![]).class(),
            (ValueClass::Text, true)
        );
        assert_eq!(
            Value::GeoPointVector(vec![GeoPoint::new(1, 2)]).class(),
            (ValueClass::GeoPoint, true)
        );
    }

    #[test]
    fn test_type_labels() {
        assert_eq!(Value::Float(1.0).type_label(), "Float");
        assert_eq!(Value::IntVector(vec![1]).type_label(), "[]Int");
    }

    #[test]
    fn test_int_is_not_float() {
        assert_ne!(Value::Int(1), Value::Float(1.0));
    }

    #[test]
    fn test_float_ieee_equality() {
        assert_ne!(Value::Float(f64::NAN), Value::Float(f64::NAN));
        assert_eq!(Value::Float(-0.0), Value::Float(0.0));
    }

    #[test]
    fn test_empty_vector_has_length() {
        assert_eq!(Value::TextVector(vec![]).vector_len(), Some(0));
        assert_eq!(Value::Text(vec![]).vector_len(), None);
    }

    #[test]
    fn test_from_str_vector_keeps_empty_elements() {
        let value = Value::from(vec!["a", "bb", ""]);
        assert_eq!(
            value,
            Value::TextVector(vec![b"a".to_vec(), b"bb".to_vec(), Vec::new()])
        );
    }

    #[test]
    fn test_time_round_trip() {
        let at = Utc.with_ymd_and_hms(2015, 6, 1, 12, 30, 0).unwrap();
        let value = Value::time(at);
        assert_eq!(value.as_time(), Some(at));
    }

    #[test]
    fn test_negative_micros() {
        let at = micros_to_datetime(-1).unwrap();
        assert_eq!(at.timestamp_micros(), -1);
    }

    #[test]
    fn test_key_classes() {
        assert_eq!(Key::from(()).class(), ValueClass::Void);
        assert_eq!(Key::from(42).class(), ValueClass::Int);
        assert_eq!(Key::from("k").class(), ValueClass::Text);
    }

    #[test]
    fn test_value_serialization() {
        let value = Value::IntVector(vec![1, -2, 3]);
        let json = serde_json::to_string(&value).unwrap();
        let back: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value, back);
    }
}
