//! Integration tests for grantex-store
//!
//! These tests verify the upsert-by-file-name cycle and schema evolution.

use grantex_domain::traits::{RecordStore, UpsertOutcome};
use grantex_domain::{ExtractionRecord, FieldSchema};
use grantex_store::{SqliteStore, StoreError};

fn schema() -> FieldSchema {
    FieldSchema::from_names(&["title_name", "notice_date"], &["area_name", "tel_number"]).unwrap()
}

fn record(pairs: &[(&str, &str)]) -> ExtractionRecord {
    let mut record = ExtractionRecord::new();
    for (field, value) in pairs {
        record.set_text(field, *value);
    }
    record
}

#[test]
fn test_store_initialization() {
    let store = SqliteStore::in_memory(&schema());
    assert!(store.is_ok(), "Store should initialize successfully");
    let store = store.unwrap();
    assert_eq!(store.table(), "tb_bizup");
    assert_eq!(
        store.columns(),
        &["title_name", "notice_date", "area_name", "tel_number", "original_file_name", "file_path"]
    );
    assert_eq!(store.count().unwrap(), 0);
}

#[test]
fn test_insert_and_get() {
    let mut store = SqliteStore::in_memory(&schema()).unwrap();

    let outcome = store
        .upsert(&record(&[
            ("title_name", "Export Voucher"),
            ("notice_date", "2025-01-01"),
            ("original_file_name", "voucher.md"),
            ("file_path", "/data/voucher.md"),
        ]))
        .unwrap();
    assert!(matches!(outcome, UpsertOutcome::Inserted(_)));

    let (id, stored) = store.get_by_file_name("voucher.md").unwrap().unwrap();
    assert_eq!(id, outcome.id());
    assert_eq!(stored.text("title_name"), Some("Export Voucher"));
    assert_eq!(stored.text("file_path"), Some("/data/voucher.md"));
    // Absent fields come back as empty strings
    assert_eq!(stored.text("area_name"), Some(""));
}

#[test]
fn test_blank_update_never_erases() {
    let mut store = SqliteStore::in_memory(&schema()).unwrap();

    let first = store
        .upsert(&record(&[
            ("title_name", "Export Voucher"),
            ("notice_date", "2025-01-01"),
            ("original_file_name", "voucher.md"),
        ]))
        .unwrap();

    let second = store
        .upsert(&record(&[
            ("title_name", "Export Voucher (revised)"),
            ("notice_date", ""),
            ("area_name", "   "),
            ("tel_number", "053-655-5609"),
            ("original_file_name", "voucher.md"),
        ]))
        .unwrap();

    assert_eq!(second, UpsertOutcome::Updated(first.id()));

    let (_, stored) = store.get_by_file_name("voucher.md").unwrap().unwrap();
    assert_eq!(stored.text("notice_date"), Some("2025-01-01"));
    assert_eq!(stored.text("title_name"), Some("Export Voucher (revised)"));
    assert_eq!(stored.text("tel_number"), Some("053-655-5609"));
    assert_eq!(stored.text("area_name"), Some(""));
    assert_eq!(store.count().unwrap(), 1);
}

#[test]
fn test_upsert_is_idempotent() {
    let mut store = SqliteStore::in_memory(&schema()).unwrap();
    let input = record(&[
        ("title_name", "Smart Factory"),
        ("notice_date", "2025-03-02"),
        ("original_file_name", "factory.md"),
    ]);

    let first = store.upsert(&input).unwrap();
    let (_, after_first) = store.get_by_file_name("factory.md").unwrap().unwrap();

    let second = store.upsert(&input).unwrap();
    let (_, after_second) = store.get_by_file_name("factory.md").unwrap().unwrap();

    assert_eq!(first.id(), second.id());
    assert_eq!(after_first, after_second);
    assert_eq!(store.count().unwrap(), 1);
}

#[test]
fn test_distinct_keys_distinct_rows() {
    let mut store = SqliteStore::in_memory(&schema()).unwrap();
    let a = store
        .upsert(&record(&[("title_name", "A"), ("original_file_name", "a.md")]))
        .unwrap();
    let b = store
        .upsert(&record(&[("title_name", "B"), ("original_file_name", "b.md")]))
        .unwrap();

    assert_ne!(a.id(), b.id());
    assert_eq!(store.count().unwrap(), 2);
    assert!(store.get_by_file_name("c.md").unwrap().is_none());
}

#[test]
fn test_missing_key_rejected() {
    let mut store = SqliteStore::in_memory(&schema()).unwrap();

    let result = store.upsert(&record(&[("title_name", "No key")]));
    assert!(matches!(result, Err(StoreError::MissingKey)));

    let result = store.upsert(&record(&[("title_name", "Blank key"), ("original_file_name", " ")]));
    assert!(matches!(result, Err(StoreError::MissingKey)));

    assert_eq!(store.count().unwrap(), 0);
}

#[test]
fn test_schema_evolution_adds_columns() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("grantex.db");

    let mut store = SqliteStore::open(&db_path, &schema(), "tb_bizup").unwrap();
    store
        .upsert(&record(&[("title_name", "Old"), ("original_file_name", "old.md")]))
        .unwrap();
    store.close().unwrap();

    let wider = FieldSchema::from_names(
        &["title_name", "notice_date"],
        &["area_name", "tel_number", "support_amount"],
    )
    .unwrap();
    let mut store = SqliteStore::open(&db_path, &wider, "tb_bizup").unwrap();

    store
        .upsert(&record(&[("support_amount", "50,000,000 KRW"), ("original_file_name", "old.md")]))
        .unwrap();

    let (_, stored) = store.get_by_file_name("old.md").unwrap().unwrap();
    assert_eq!(stored.text("title_name"), Some("Old"));
    assert_eq!(stored.text("support_amount"), Some("50,000,000 KRW"));
    assert_eq!(store.count().unwrap(), 1);
}

#[test]
fn test_custom_table_name() {
    let dir = tempfile::tempdir().unwrap();
    let store = SqliteStore::open(dir.path().join("x.db"), &schema(), "announcements").unwrap();
    assert_eq!(store.table(), "announcements");
}

#[test]
fn test_invalid_table_name_rejected() {
    let result = SqliteStore::open(":memory:", &schema(), "tb; DROP TABLE x");
    assert!(matches!(result, Err(StoreError::InvalidIdentifier(_))));
}

#[test]
fn test_non_ascii_values_round_trip() {
    let mut store = SqliteStore::in_memory(&schema()).unwrap();
    store
        .upsert(&record(&[("title_name", "2025년 수출바우처 사업 공고"), ("original_file_name", "공고.md")]))
        .unwrap();

    let (_, stored) = store.get_by_file_name("공고.md").unwrap().unwrap();
    assert_eq!(stored.text("title_name"), Some("2025년 수출바우처 사업 공고"));
}
