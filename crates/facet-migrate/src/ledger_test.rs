use super::*;
use facet_db::ConnectionPool;

#[test]
fn test_new_rejects_invalid_table() {
    assert!(matches!(
        Ledger::new("ledger; DROP TABLE products"),
        Err(MigrateError::InvalidLedgerTable(_))
    ));
    assert_eq!(Ledger::default().table(), DEFAULT_LEDGER_TABLE);
}

#[test]
fn test_ensure_table_is_idempotent() {
    let pool = ConnectionPool::in_memory(1).unwrap();
    let conn = pool.acquire().unwrap();
    let ledger = Ledger::default();
    ledger.ensure_table(&conn).unwrap();
    ledger.ensure_table(&conn).unwrap();
    assert!(ledger.applied_names(&conn).unwrap().is_empty());
}

#[test]
fn test_ensure_table_creates_schema_for_qualified_name() {
    let pool = ConnectionPool::in_memory(1).unwrap();
    let conn = pool.acquire().unwrap();
    let ledger = Ledger::new("ops.applied_migrations").unwrap();
    ledger.ensure_table(&conn).unwrap();

    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM information_schema.tables \
             WHERE table_schema = 'ops' AND table_name = 'applied_migrations'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn test_record_and_list_entries() {
    let pool = ConnectionPool::in_memory(1).unwrap();
    let conn = pool.acquire().unwrap();
    let ledger = Ledger::default();
    ledger.ensure_table(&conn).unwrap();

    ledger.record(&conn, &UnitName::new("002_customers")).unwrap();
    ledger.record(&conn, &UnitName::new("001_products")).unwrap();

    let names = ledger.applied_names(&conn).unwrap();
    assert!(names.contains("001_products"));
    assert!(names.contains("002_customers"));

    let entries = ledger.entries(&conn).unwrap();
    let ordered: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(ordered, vec!["001_products", "002_customers"]);
    assert_ne!(entries[0].id, entries[1].id);
    assert!(entries[0].applied_at.timestamp() > 0);
}

#[test]
fn test_record_duplicate_is_constraint_violation() {
    let pool = ConnectionPool::in_memory(1).unwrap();
    let conn = pool.acquire().unwrap();
    let ledger = Ledger::default();
    ledger.ensure_table(&conn).unwrap();

    let name = UnitName::new("001_products");
    ledger.record(&conn, &name).unwrap();
    let err = ledger.record(&conn, &name).unwrap_err();
    assert!(err.is_constraint_violation(), "got {err}");
}

#[test]
fn test_remove_entry() {
    let pool = ConnectionPool::in_memory(1).unwrap();
    let conn = pool.acquire().unwrap();
    let ledger = Ledger::default();
    ledger.ensure_table(&conn).unwrap();

    let name = UnitName::new("001_products");
    ledger.record(&conn, &name).unwrap();
    assert_eq!(ledger.remove(&conn, &name).unwrap(), 1);
    assert_eq!(ledger.remove(&conn, &name).unwrap(), 0);
    assert!(ledger.applied_names(&conn).unwrap().is_empty());
}

#[test]
fn test_exists_tracks_table_creation() {
    let pool = ConnectionPool::in_memory(1).unwrap();
    let conn = pool.acquire().unwrap();
    for ledger in [Ledger::default(), Ledger::new("ops.applied_migrations").unwrap()] {
        assert!(!ledger.exists(&conn).unwrap());
        ledger.ensure_table(&conn).unwrap();
        assert!(ledger.exists(&conn).unwrap());
    }
}

#[test]
fn test_contains_recorded_name() {
    let pool = ConnectionPool::in_memory(1).unwrap();
    let conn = pool.acquire().unwrap();
    let ledger = Ledger::default();
    ledger.ensure_table(&conn).unwrap();
    let name = UnitName::new("001_products");

    assert!(!ledger.contains(&conn, &name).unwrap());
    ledger.record(&conn, &name).unwrap();
    assert!(ledger.contains(&conn, &name).unwrap());
}
