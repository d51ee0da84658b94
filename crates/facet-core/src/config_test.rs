use super::*;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_parse_empty_config_uses_defaults() {
    let config = Config::parse("").unwrap();
    assert_eq!(config.database.path, "storefront.duckdb");
    assert_eq!(config.database.pool_size, 4);
    assert_eq!(config.migrations.dir, PathBuf::from("migrations"));
    assert_eq!(
        config.migrations.rollback_dir,
        PathBuf::from("migrations/rollback")
    );
    assert_eq!(config.migrations.pattern, "*.sql");
    assert_eq!(config.migrations.ledger_table, "schema_migrations");
    assert_eq!(config.startup.connect_retries, 5);
    assert_eq!(config.server.bind, "127.0.0.1:8080");
}

#[test]
fn test_parse_full_config() {
    let yaml = r#"
database:
  path: ":memory:"
  pool_size: 2
migrations:
  dir: db/migrations
  rollback_dir: db/rollback
  pattern: "*.up.sql"
  ledger_table: ops.applied_migrations
startup:
  connect_retries: 3
  initial_backoff_ms: 100
  max_backoff_ms: 800
server:
  bind: 0.0.0.0:9090
"#;
    let config = Config::parse(yaml).unwrap();
    assert!(config.database.is_memory());
    assert_eq!(config.database.pool_size, 2);
    assert_eq!(config.migrations.dir, PathBuf::from("db/migrations"));
    assert_eq!(config.migrations.pattern, "*.up.sql");
    assert_eq!(config.migrations.ledger_table, "ops.applied_migrations");
    assert_eq!(config.startup.connect_retries, 3);
    assert_eq!(config.startup.max_backoff_ms, 800);
    assert_eq!(config.server.bind, "0.0.0.0:9090");
}

#[test]
fn test_unknown_field_rejected() {
    let result = Config::parse("migrations:\n  directory: db\n");
    assert!(matches!(result, Err(CoreError::ConfigParseError(_))));
}

#[test]
fn test_zero_pool_size_rejected() {
    let result = Config::parse("database:\n  pool_size: 0\n");
    assert!(matches!(result, Err(CoreError::ConfigInvalid { .. })));
}

#[test]
fn test_invalid_pattern_rejected() {
    let result = Config::parse("migrations:\n  pattern: \"[*.sql\"\n");
    assert!(matches!(result, Err(CoreError::ConfigInvalid { .. })));
}

#[test]
fn test_invalid_ledger_table_rejected() {
    for table in ["", "1_migrations", "ledger; DROP TABLE x", "a.b.c", "ops."] {
        let yaml = format!("migrations:\n  ledger_table: \"{table}\"\n");
        let result = Config::parse(&yaml);
        assert!(
            matches!(result, Err(CoreError::ConfigInvalid { .. })),
            "expected {table:?} to be rejected"
        );
    }
}

#[test]
fn test_backoff_bounds_validated() {
    let yaml = "startup:\n  initial_backoff_ms: 1000\n  max_backoff_ms: 10\n";
    assert!(matches!(
        Config::parse(yaml),
        Err(CoreError::ConfigInvalid { .. })
    ));
}

#[test]
fn test_valid_table_names() {
    assert!(is_valid_table_name("schema_migrations"));
    assert!(is_valid_table_name("_ledger2"));
    assert!(is_valid_table_name("ops.schema_migrations"));
    assert!(!is_valid_table_name("schema-migrations"));
}

#[test]
fn test_load_resolves_relative_paths() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("facet.yml");
    fs::write(
        &path,
        "database:\n  path: shop.duckdb\nmigrations:\n  dir: sql\n",
    )
    .unwrap();

    let config = Config::load(&path).unwrap();
    assert_eq!(config.migrations.dir, dir.path().join("sql"));
    assert_eq!(
        config.migrations.rollback_dir,
        dir.path().join("migrations/rollback")
    );
    assert_eq!(
        config.database.path,
        dir.path().join("shop.duckdb").display().to_string()
    );
}

#[test]
fn test_load_keeps_memory_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("facet.yml");
    fs::write(&path, "database:\n  path: \":memory:\"\n").unwrap();

    let config = Config::load(&path).unwrap();
    assert_eq!(config.database.path, MEMORY_DB_PATH);
}

#[test]
fn test_load_missing_file() {
    let dir = tempdir().unwrap();
    let result = Config::load(&dir.path().join("facet.yml"));
    assert!(matches!(result, Err(CoreError::ConfigNotFound { .. })));
}

#[test]
fn test_load_or_default_without_file() {
    let dir = tempdir().unwrap();
    let config = Config::load_or_default(&dir.path().join("facet.yml"), dir.path()).unwrap();
    assert_eq!(config.migrations.dir, dir.path().join("migrations"));
}
