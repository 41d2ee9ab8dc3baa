//! Codec properties over the public API.

use grnbind::codec::{decode_value, encode_value};
use grnbind::{DataKind, Error, Value};
use proptest::prelude::*;

fn integer_kinds() -> impl Strategy<Value = DataKind> {
    prop::sample::select(
        DataKind::ALL
            .iter()
            .copied()
            .filter(DataKind::is_integer)
            .collect::<Vec<_>>(),
    )
}

proptest! {
    #[test]
    fn int_vectors_survive_or_fail_whole(kind in integer_kinds(), values in prop::collection::vec(any::<i64>(), 0..8)) {
        let (min, max) = kind.int_range().unwrap();
        let fits = values.iter().all(|&v| (min..=max).contains(&i128::from(v)));
        let value = Value::IntVector(values);
        match encode_value(kind, true, &value) {
            Ok(wire) => {
                prop_assert!(fits);
                prop_assert_eq!(decode_value(kind, true, wire).unwrap(), value);
            }
            Err(Error::OutOfRange { .. }) => prop_assert!(!fits),
            Err(other) => prop_assert!(false, "unexpected error: {}", other),
        }
    }

    #[test]
    fn text_is_kept_byte_for_byte(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
        let value = Value::Text(bytes);
        for kind in [DataKind::ShortText, DataKind::Text, DataKind::LongText] {
            let wire = encode_value(kind, false, &value).unwrap();
            prop_assert_eq!(decode_value(kind, false, wire).unwrap(), value.clone());
        }
    }
}
