use super::*;
use std::fs;
use tempfile::tempdir;

fn startup(retries: u32, initial: u64, max: u64) -> StartupConfig {
    StartupConfig {
        connect_retries: retries,
        initial_backoff_ms: initial,
        max_backoff_ms: max,
    }
}

fn project(dir: &std::path::Path) -> Config {
    fs::create_dir_all(dir.join("migrations/rollback")).unwrap();
    let mut config = Config::default();
    config.database.path = ":memory:".to_string();
    config.startup = startup(0, 1, 1);
    config.resolve_paths(dir);
    config
}

#[test]
fn test_backoff_doubles_and_caps() {
    let schedule = backoff_schedule(&startup(5, 250, 1000));
    let millis: Vec<u128> = schedule.iter().map(|d| d.as_millis()).collect();
    assert_eq!(millis, vec![250, 500, 1000, 1000, 1000]);
}

#[test]
fn test_backoff_no_retries() {
    assert!(backoff_schedule(&startup(0, 250, 1000)).is_empty());
}

#[test]
fn test_backoff_initial_above_cap() {
    let schedule = backoff_schedule(&startup(2, 5000, 300));
    assert_eq!(
        schedule,
        vec![Duration::from_millis(300), Duration::from_millis(300)]
    );
}

#[tokio::test]
async fn test_start_applies_migrations() {
    let temp = tempdir().unwrap();
    let config = project(temp.path());
    fs::write(
        temp.path().join("migrations/001_products.sql"),
        "CREATE TABLE products (id INTEGER PRIMARY KEY, sku VARCHAR);",
    )
    .unwrap();

    let state = start(&config).await.unwrap();

    assert!(!state.is_degraded());
    assert_eq!(state.runner.pending_count().unwrap(), 0);
}

#[tokio::test]
async fn test_start_degraded_on_migration_failure() {
    let temp = tempdir().unwrap();
    let config = project(temp.path());
    fs::write(
        temp.path().join("migrations/001_products.sql"),
        "CREATE TABLE products (id INTEGER PRIMARY KEY);",
    )
    .unwrap();
    fs::write(
        temp.path().join("migrations/002_broken.sql"),
        "ALTER TABLE no_such_table ADD COLUMN price DECIMAL(10, 2);",
    )
    .unwrap();

    let state = start(&config).await.unwrap();

    assert!(state.is_degraded());
    let message = state.migration_error.unwrap();
    assert!(message.contains("002_broken"), "got: {message}");
    assert_eq!(state.runner.pending_count().unwrap(), 1);
}

#[tokio::test]
async fn test_connect_fails_after_retries() {
    let temp = tempdir().unwrap();
    let mut config = project(temp.path());
    // A directory cannot be opened as a database file
    config.database.path = temp.path().join("migrations").display().to_string();
    config.startup = startup(2, 1, 2);

    let err = connect_with_retry(&config).await.unwrap_err();

    assert!(
        err.to_string().contains("after 3 attempt(s)"),
        "got: {err}"
    );
}
