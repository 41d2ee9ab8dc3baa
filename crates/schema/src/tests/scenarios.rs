//! End-to-end flows: create, insert, write, read, invalidate.

use grnbind_core::{DataKind, Error, Key, Value};
use grnbind_protocol::{Command, CommandChannel};

use super::test_catalog;
use crate::{ColumnOptions, TableOptions, TableType};

#[test]
#[allow(clippy::approx_constant)]
fn test_hash_key_table_with_float_column() {
    let mut catalog = test_catalog();
    let table = catalog
        .create_table("T", &TableOptions::keyed(TableType::HashKey, "Int32"))
        .unwrap();
    assert_eq!(table.key_kind(), DataKind::Int32);
    catalog
        .create_column("T", "V", "Float", &ColumnOptions::default())
        .unwrap();

    let first = catalog.insert_row("T", &Key::Int(42)).unwrap();
    let second = catalog.insert_row("T", &Key::Int(42)).unwrap();
    assert!(first.inserted);
    assert!(!second.inserted);
    assert_eq!(first.id, second.id);

    catalog.set_value("T", "V", first.id, &Value::Float(3.14)).unwrap();
    assert_eq!(catalog.get_value("T", "V", first.id).unwrap(), Value::Float(3.14));
    assert_eq!(catalog.get_value("T", "_key", first.id).unwrap(), Value::Int(42));
}

#[test]
fn test_keyless_table_with_text_vector() {
    let mut catalog = test_catalog();
    catalog.create_table("Docs", &TableOptions::default()).unwrap();
    let column = catalog
        .create_column("Docs", "words", "[]Text", &ColumnOptions::default())
        .unwrap();
    assert!(column.is_vector());
    assert_eq!(column.value_kind(), DataKind::Text);

    let row = catalog.insert_row("Docs", &Key::Void).unwrap();
    assert!(row.inserted);
    let words = Value::TextVector(vec![b"a".to_vec(), b"bb".to_vec(), Vec::new()]);
    catalog.set_value("Docs", "words", row.id, &words).unwrap();
    assert_eq!(catalog.get_value("Docs", "words", row.id).unwrap(), words);

    assert!(matches!(
        catalog.insert_row("Docs", &Key::Int(1)),
        Err(Error::KindConflict { .. })
    ));
}

#[test]
fn test_reference_chain_through_two_tables() {
    let mut catalog = test_catalog();
    catalog
        .create_table("B", &TableOptions::keyed(TableType::PatKey, "ShortText"))
        .unwrap();
    catalog
        .create_column("B", "n", "Int64", &ColumnOptions::default())
        .unwrap();
    catalog.create_table("A", &TableOptions::default()).unwrap();
    catalog
        .create_column("A", "b", "B", &ColumnOptions::default())
        .unwrap();
    catalog
        .create_column("A", "bs", "[]B", &ColumnOptions::default())
        .unwrap();
    catalog
        .create_column("B", "ns", "[]Int64", &ColumnOptions::default())
        .unwrap();

    let b = catalog.find_column("A", "b").unwrap();
    assert_eq!(b.value_table(), Some("B"));
    assert_eq!(b.value_kind(), DataKind::ShortText);

    let path = catalog.find_column("A", "b.n").unwrap();
    assert_eq!(path.value_kind(), DataKind::Int64);
    assert_eq!(path.value_table(), None);

    let err = catalog.find_column("A", "bs.ns").unwrap_err();
    assert!(matches!(err, Error::ReferenceChain { .. }), "{}", err);

    let row = catalog.insert_row("A", &Key::Void).unwrap();
    catalog
        .set_value("A", "bs", row.id, &Value::TextVector(vec![b"x".to_vec(), b"y".to_vec()]))
        .unwrap();
    let key = catalog.insert_row("B", &Key::from("y")).unwrap();
    assert!(!key.inserted, "writing a reference interns its key");
    catalog.set_value("B", "n", key.id, &Value::Int(-7)).unwrap();
    assert_eq!(
        catalog.get_value("A", "bs.n", row.id).unwrap(),
        Value::IntVector(vec![0, -7])
    );
}

#[test]
fn test_id_column_reads_row_ids() {
    let mut catalog = test_catalog();
    catalog.create_table("Log", &TableOptions::default()).unwrap();
    let ids: Vec<_> = (0..3)
        .map(|_| catalog.insert_row("Log", &Key::Void).unwrap().id)
        .collect();
    let values = catalog.get_values("Log", "_id", &ids).unwrap();
    let expected: Vec<Value> = ids.iter().map(|&id| Value::from(id)).collect();
    assert_eq!(values, expected);
    assert!(matches!(
        catalog.set_value("Log", "_id", ids[0], &Value::Int(9)),
        Err(Error::EngineCall { .. })
    ));
}

#[test]
fn test_invalid_option_key_never_reaches_engine() {
    let mut catalog = test_catalog();
    let command = Command::new("table_create")
        .option("Name", "T")
        .option("flags", "TABLE_NO_KEY");
    let err = catalog.query_command(&command).unwrap_err();
    assert!(matches!(err.error, Error::Protocol { .. }));
    assert!(err.partial.is_empty());
    assert_eq!(catalog.engine().bytes_sent(), 0);
}

#[test]
fn test_raw_query_and_unknown_command() {
    let mut catalog = test_catalog();
    assert_eq!(catalog.query("table_create Raw TABLE_NO_KEY").unwrap(), b"true");
    assert!(catalog.find_table("Raw").is_ok());

    let err = catalog.query("status").unwrap_err();
    assert!(matches!(err.error, Error::CommandRejected { .. }));
}

#[test]
fn test_refresh_after_external_changes() {
    let mut catalog = test_catalog();
    catalog
        .create_table("Tags", &TableOptions::keyed(TableType::HashKey, "ShortText"))
        .unwrap();
    catalog.create_table("Items", &TableOptions::default()).unwrap();
    catalog
        .create_column("Items", "tag", "Tags", &ColumnOptions::default())
        .unwrap();
    catalog
        .create_column("Items", "price", "UInt32", &ColumnOptions::default())
        .unwrap();

    catalog
        .engine_mut()
        .query("column_remove Items tag")
        .unwrap();
    catalog.engine_mut().query("table_remove Tags").unwrap();
    let report = catalog.refresh().unwrap();
    assert_eq!(report.evicted_tables, vec!["Tags"]);
    assert_eq!(report.evicted_columns, vec!["Items.tag"]);
    assert_eq!(catalog.cached_tables(), vec!["Items"]);

    // A table re-created under the same name is a new object.
    catalog
        .engine_mut()
        .query("table_create Tags TABLE_PAT_KEY Int8")
        .unwrap();
    let tags = catalog.find_table("Tags").unwrap();
    assert_eq!(tags.key_kind(), DataKind::Int8);
    assert!(catalog.find_column("Items", "tag").unwrap_err().is_not_found());
    assert!(catalog.find_column("Items", "price").is_ok());
}

#[test]
fn test_index_column_is_resolved_but_not_readable() {
    let mut catalog = test_catalog();
    catalog
        .create_table("Docs", &TableOptions::keyed(TableType::HashKey, "ShortText"))
        .unwrap();
    catalog
        .create_column("Docs", "body", "Text", &ColumnOptions::default())
        .unwrap();
    catalog
        .create_table(
            "Terms",
            &TableOptions {
                default_tokenizer: Some("TokenBigram".to_string()),
                ..TableOptions::keyed(TableType::PatKey, "ShortText")
            },
        )
        .unwrap();
    let index = catalog
        .create_column(
            "Terms",
            "docs_body",
            "Docs.body",
            &ColumnOptions {
                with_position: true,
                ..Default::default()
            },
        )
        .unwrap();
    assert!(index.is_vector());
    assert_eq!(index.value_kind(), DataKind::ShortText);
    assert_eq!(index.value_table(), Some("Docs"));
    assert!(catalog
        .engine()
        .sent_commands()
        .last()
        .unwrap()
        .contains("--flags 'COLUMN_INDEX|WITH_POSITION' --type 'Docs' --source 'body'"));

    let term = catalog.insert_row("Terms", &Key::from("ab")).unwrap();
    assert!(matches!(
        catalog.get_value("Terms", "docs_body", term.id),
        Err(Error::EngineCall { .. })
    ));

    // An indexed column cannot be removed.
    assert_eq!(
        catalog.query("column_remove Docs body").unwrap(),
        b"false"
    );
}
