//! Catalog flows over the bookstore schema.

use crate::common::*;
use grnbind::{DataKind, Error, Key, Value};

#[test]
fn resolves_reference_paths_across_tables() {
    let mut catalog = bookstore();

    let tolkien = catalog.insert_row("Authors", &Key::from("tolkien")).unwrap();
    catalog
        .set_value("Authors", "born", tolkien.id, &Value::Int(-2_461_449_600_000_000))
        .unwrap();

    let hobbit = catalog.insert_row("Books", &Key::Int(9_780_261_102_217)).unwrap();
    catalog
        .set_value("Books", "author", hobbit.id, &Value::from("tolkien"))
        .unwrap();
    catalog
        .set_value("Books", "title", hobbit.id, &Value::from("The Hobbit"))
        .unwrap();

    let shelf = catalog.insert_row("Shelves", &Key::Void).unwrap();
    catalog
        .set_value(
            "Shelves",
            "books",
            shelf.id,
            &Value::IntVector(vec![9_780_261_102_217, 9_780_007_117_116]),
        )
        .unwrap();

    let born = catalog.find_column("Shelves", "books.author.born").unwrap();
    assert_eq!(born.value_kind(), DataKind::Time);
    assert!(born.is_vector());
    assert_eq!(
        catalog.get_value("Shelves", "books.author.born", shelf.id).unwrap(),
        Value::IntVector(vec![-2_461_449_600_000_000, 0])
    );
    assert_eq!(
        catalog.get_value("Shelves", "books._key", shelf.id).unwrap(),
        Value::IntVector(vec![9_780_261_102_217, 9_780_007_117_116])
    );
    assert_eq!(
        catalog.get_value("Books", "author._key", hobbit.id).unwrap(),
        Value::from("tolkien")
    );
}

#[test]
fn vector_of_vectors_is_rejected() {
    let mut catalog = bookstore();
    let err = catalog.find_column("Shelves", "books.tags").unwrap_err();
    match err {
        Error::ReferenceChain { path, .. } => assert_eq!(path, "Shelves.books.tags"),
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn type_mismatches_fail_before_the_engine() {
    let mut catalog = bookstore();
    let book = catalog.insert_row("Books", &Key::Int(1)).unwrap();

    let err = catalog
        .set_value("Books", "title", book.id, &Value::Int(1))
        .unwrap_err();
    assert_eq!(err, Error::kind_conflict("Text", "Int"));
    assert!(matches!(
        catalog.insert_row("Books", &Key::Int(-1)),
        Err(Error::OutOfRange { .. })
    ));
    assert!(matches!(
        catalog.insert_row("Authors", &Key::from("")),
        Err(Error::EngineCall { .. })
    ));
}

#[test]
fn tables_resolve_once() {
    let mut catalog = bookstore();
    let before = catalog.engine().sent_commands().len();
    let first = catalog.find_column("Books", "author").unwrap();
    let second = catalog.find_column("Books", "author").unwrap();
    assert!(std::sync::Arc::ptr_eq(&first, &second));
    assert_eq!(catalog.engine().sent_commands().len(), before);
    assert_eq!(catalog.cached_tables(), vec!["Authors", "Books", "Shelves"]);
}

#[test]
fn refresh_cascades_through_references() {
    let mut catalog = bookstore();
    catalog.find_column("Shelves", "books.author").unwrap();

    // Drop the Authors table out from under the catalog.
    assert_eq!(catalog.query("column_remove Books author").unwrap(), b"true");
    assert_eq!(catalog.query("table_remove Authors").unwrap(), b"true");

    let report = catalog.refresh().unwrap();
    assert_eq!(report.evicted_tables, vec!["Authors"]);
    assert_eq!(
        report.evicted_columns,
        vec!["Books.author", "Shelves.books.author"]
    );
    assert!(catalog.refresh().unwrap().is_empty());
    assert!(catalog.find_table("Authors").unwrap_err().is_not_found());
}
