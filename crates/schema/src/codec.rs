//! Conversion between host values and wire primitives
//!
//! Encoding checks the host variant against the declared `(kind, is_vector)`
//! pair before anything reaches the engine:
//!
//! | Host variant | Accepted kinds |
//! |--------------|----------------|
//! | `Bool` | `Bool` |
//! | `Int` | `Int8..Int64`, `UInt8..UInt64`, `Time` (range checked) |
//! | `Float` | `Float` |
//! | `Text` | `ShortText`, `Text`, `LongText` |
//! | `GeoPoint` | `TokyoGeoPoint`, `WGS84GeoPoint` |
//!
//! The vector variants accept the same kinds on vector columns only.
//! Nothing is coerced: `Int(1)` never fits a `Float` column.

use grnbind_core::{DataKind, Error, GeoPoint, Key, Result, Value, ValueClass};
use grnbind_engine::{WireScalar, WireValue};

fn check(
    kind: DataKind,
    is_vector: bool,
    class: ValueClass,
    vector: bool,
    value: &Value,
) -> Result<()> {
    if kind.class() == class && is_vector == vector {
        Ok(())
    } else {
        Err(Error::kind_conflict(kind.label(is_vector), value.type_label()))
    }
}

fn out_of_range(kind: DataKind, value: impl ToString) -> Error {
    Error::OutOfRange {
        kind: kind.name().to_string(),
        value: value.to_string(),
    }
}

/// Narrow a host integer to the exact primitive of `kind`.
pub fn encode_int(kind: DataKind, value: i64) -> Result<WireScalar> {
    let range = |_: std::num::TryFromIntError| out_of_range(kind, value);
    let scalar = match kind {
        DataKind::Int8 => WireScalar::Int8(i8::try_from(value).map_err(range)?),
        DataKind::Int16 => WireScalar::Int16(i16::try_from(value).map_err(range)?),
        DataKind::Int32 => WireScalar::Int32(i32::try_from(value).map_err(range)?),
        DataKind::Int64 => WireScalar::Int64(value),
        DataKind::UInt8 => WireScalar::UInt8(u8::try_from(value).map_err(range)?),
        DataKind::UInt16 => WireScalar::UInt16(u16::try_from(value).map_err(range)?),
        DataKind::UInt32 => WireScalar::UInt32(u32::try_from(value).map_err(range)?),
        DataKind::UInt64 => WireScalar::UInt64(u64::try_from(value).map_err(range)?),
        DataKind::Time => WireScalar::Time(value),
        other => {
            return Err(Error::UnsupportedKind {
                kind: other.name().to_string(),
            })
        }
    };
    Ok(scalar)
}

/// Encode a value for a column declared as `(kind, is_vector)`.
///
/// # Errors
///
/// - `KindConflict` if the variant does not fit the declared pair
/// - `OutOfRange` if an integer does not fit the sized kind
pub fn encode_value(kind: DataKind, is_vector: bool, value: &Value) -> Result<WireValue> {
    let wire = match value {
        Value::Bool(b) => {
            check(kind, is_vector, ValueClass::Bool, false, value)?;
            WireValue::Scalar(WireScalar::Bool(*b))
        }
        Value::Int(i) => {
            check(kind, is_vector, ValueClass::Int, false, value)?;
            WireValue::Scalar(encode_int(kind, *i)?)
        }
        Value::Float(f) => {
            check(kind, is_vector, ValueClass::Float, false, value)?;
            WireValue::Scalar(WireScalar::Float(*f))
        }
        Value::Text(t) => {
            check(kind, is_vector, ValueClass::Text, false, value)?;
            WireValue::Scalar(WireScalar::Text(t.clone()))
        }
        Value::GeoPoint(p) => {
            check(kind, is_vector, ValueClass::GeoPoint, false, value)?;
            WireValue::Scalar(WireScalar::GeoPoint(*p))
        }
        Value::BoolVector(v) => {
            check(kind, is_vector, ValueClass::Bool, true, value)?;
            WireValue::Vector(v.iter().map(|b| WireScalar::Bool(*b)).collect())
        }
        Value::IntVector(v) => {
            check(kind, is_vector, ValueClass::Int, true, value)?;
            WireValue::Vector(
                v.iter()
                    .map(|i| encode_int(kind, *i))
                    .collect::<Result<Vec<_>>>()?,
            )
        }
        Value::FloatVector(v) => {
            check(kind, is_vector, ValueClass::Float, true, value)?;
            WireValue::Vector(v.iter().map(|f| WireScalar::Float(*f)).collect())
        }
        Value::TextVector(v) => {
            check(kind, is_vector, ValueClass::Text, true, value)?;
            WireValue::Vector(v.iter().map(|t| WireScalar::Text(t.clone())).collect())
        }
        Value::GeoPointVector(v) => {
            check(kind, is_vector, ValueClass::GeoPoint, true, value)?;
            WireValue::Vector(v.iter().map(|p| WireScalar::GeoPoint(*p)).collect())
        }
    };
    Ok(wire)
}

/// Encode a row key for a table whose key kind is `key_kind`.
///
/// Returns `None` for `Key::Void`, which only keyless tables accept. Text
/// keys are accepted for `ShortText` only.
pub fn encode_key(key_kind: DataKind, key: &Key) -> Result<Option<WireScalar>> {
    let conflict = || Error::kind_conflict(key_kind.name(), key.class().name());
    let scalar = match key {
        Key::Void if key_kind == DataKind::Void => return Ok(None),
        Key::Bool(b) if key_kind == DataKind::Bool => WireScalar::Bool(*b),
        Key::Int(i) if key_kind.is_integer() => encode_int(key_kind, *i)?,
        Key::Float(f) if key_kind == DataKind::Float => WireScalar::Float(*f),
        Key::Text(t) if key_kind == DataKind::ShortText => WireScalar::Text(t.clone()),
        Key::GeoPoint(p) if key_kind.is_geo_point() => WireScalar::GeoPoint(*p),
        _ => return Err(conflict()),
    };
    Ok(Some(scalar))
}

fn unexpected(kind: DataKind, scalar: &WireScalar) -> Error {
    Error::engine_call(
        "get_value",
        format!("engine returned {} for {}", scalar.type_name(), kind),
    )
}

fn decode_int(kind: DataKind, scalar: WireScalar) -> Result<i64> {
    let value = match scalar {
        WireScalar::Int8(v) if kind == DataKind::Int8 => v as i64,
        WireScalar::Int16(v) if kind == DataKind::Int16 => v as i64,
        WireScalar::Int32(v) if kind == DataKind::Int32 => v as i64,
        WireScalar::Int64(v) if kind == DataKind::Int64 => v,
        WireScalar::UInt8(v) if kind == DataKind::UInt8 => v as i64,
        WireScalar::UInt16(v) if kind == DataKind::UInt16 => v as i64,
        WireScalar::UInt32(v) if kind == DataKind::UInt32 => v as i64,
        WireScalar::UInt64(v) if kind == DataKind::UInt64 => {
            i64::try_from(v).map_err(|_| out_of_range(DataKind::Int64, v))?
        }
        WireScalar::Time(v) if kind == DataKind::Time => v,
        other => return Err(unexpected(kind, &other)),
    };
    Ok(value)
}

fn decode_bool(kind: DataKind, scalar: WireScalar) -> Result<bool> {
    match scalar {
        WireScalar::Bool(b) => Ok(b),
        other => Err(unexpected(kind, &other)),
    }
}

fn decode_float(kind: DataKind, scalar: WireScalar) -> Result<f64> {
    match scalar {
        WireScalar::Float(f) => Ok(f),
        other => Err(unexpected(kind, &other)),
    }
}

fn decode_text(kind: DataKind, scalar: WireScalar) -> Result<Vec<u8>> {
    match scalar {
        WireScalar::Text(t) => Ok(t),
        other => Err(unexpected(kind, &other)),
    }
}

fn decode_geo_point(kind: DataKind, scalar: WireScalar) -> Result<GeoPoint> {
    match scalar {
        WireScalar::GeoPoint(p) => Ok(p),
        other => Err(unexpected(kind, &other)),
    }
}

fn collect<T>(
    kind: DataKind,
    items: Vec<WireScalar>,
    decode: fn(DataKind, WireScalar) -> Result<T>,
) -> Result<Vec<T>> {
    items.into_iter().map(|item| decode(kind, item)).collect()
}

/// Decode a wire value read from a column declared as `(kind, is_vector)`.
///
/// # Errors
///
/// - `UnsupportedKind` for `Void`
/// - `OutOfRange` for `UInt64` values above `i64::MAX`
/// - `EngineCall` if the engine answered with another shape or primitive
pub fn decode_value(kind: DataKind, is_vector: bool, wire: WireValue) -> Result<Value> {
    let unsupported = || Error::UnsupportedKind {
        kind: kind.label(is_vector),
    };
    let class = kind.class();
    if class == ValueClass::Void {
        return Err(unsupported());
    }
    let value = match (wire, is_vector) {
        (WireValue::Scalar(s), false) => match class {
            ValueClass::Bool => Value::Bool(decode_bool(kind, s)?),
            ValueClass::Int => Value::Int(decode_int(kind, s)?),
            ValueClass::Float => Value::Float(decode_float(kind, s)?),
            ValueClass::Text => Value::Text(decode_text(kind, s)?),
            ValueClass::GeoPoint => Value::GeoPoint(decode_geo_point(kind, s)?),
            ValueClass::Void => return Err(unsupported()),
        },
        (WireValue::Vector(v), true) => match class {
            ValueClass::Bool => Value::BoolVector(collect(kind, v, decode_bool)?),
            ValueClass::Int => Value::IntVector(collect(kind, v, decode_int)?),
            ValueClass::Float => Value::FloatVector(collect(kind, v, decode_float)?),
            ValueClass::Text => Value::TextVector(collect(kind, v, decode_text)?),
            ValueClass::GeoPoint => Value::GeoPointVector(collect(kind, v, decode_geo_point)?),
            ValueClass::Void => return Err(unsupported()),
        },
        (wire, _) => {
            return Err(Error::engine_call(
                "get_value",
                format!(
                    "engine returned a {} for {}",
                    if wire.is_vector() { "vector" } else { "scalar" },
                    kind.label(is_vector)
                ),
            ))
        }
    };
    Ok(value)
}
