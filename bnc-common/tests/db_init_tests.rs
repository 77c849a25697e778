//! Tests for database initialization and row insertion

use bnc_common::db::{init_database, init_memory_database, insert_row, TableRow, CORPUS_TABLES};
use sqlx::SqlitePool;
use tempfile::TempDir;

async fn table_names(pool: &SqlitePool) -> Vec<String> {
    sqlx::query_scalar(
        "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
    )
    .fetch_all(pool)
    .await
    .unwrap()
}

#[tokio::test]
async fn test_database_creation_when_missing() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("nested").join("bnc.db");

    let pool = init_database(&db_path).await.unwrap();

    assert!(db_path.exists(), "Database file was not created");
    let mut expected: Vec<String> = CORPUS_TABLES.iter().map(|t| t.to_string()).collect();
    expected.sort();
    assert_eq!(table_names(&pool).await, expected);
}

#[tokio::test]
async fn test_database_opens_existing() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("bnc.db");

    let pool1 = init_database(&db_path).await.unwrap();
    pool1.close().await;

    let pool2 = init_database(&db_path).await;
    assert!(pool2.is_ok(), "Failed to open existing database: {:?}", pool2.err());
}

#[tokio::test]
async fn test_foreign_keys_enforced() {
    let pool = init_memory_database().await.unwrap();
    let mut conn = pool.acquire().await.unwrap();

    // A link row without its setting and person parents must be rejected
    let link = TableRow::new("setting_people")
        .with("doc_id", "KB0")
        .with("setting_id", "S1")
        .with("person_id", "PS001");

    let result = insert_row(&mut conn, &link).await;
    assert!(result.is_err(), "Dangling foreign key was accepted");
}

#[tokio::test]
async fn test_insert_rows_in_dependency_order() {
    let pool = init_memory_database().await.unwrap();
    let mut tx = pool.begin().await.unwrap();

    let setting = TableRow::new("settings")
        .with("doc_id", "KB0")
        .with("setting_id", "S1")
        .with("locale", "home");
    let person = TableRow::new("people")
        .with("doc_id", "KB0")
        .with("person_id", "PS001")
        .with("ageGroup", "Ag3");
    let link = TableRow::new("setting_people")
        .with("doc_id", "KB0")
        .with("setting_id", "S1")
        .with("person_id", "PS001");

    insert_row(&mut tx, &setting).await.unwrap();
    insert_row(&mut tx, &person).await.unwrap();
    insert_row(&mut tx, &link).await.unwrap();
    tx.commit().await.unwrap();

    let (locale, age_group): (String, String) = sqlx::query_as(
        "SELECT s.locale, p.\"ageGroup\" FROM setting_people l
         JOIN settings s ON s.doc_id = l.doc_id AND s.setting_id = l.setting_id
         JOIN people p ON p.doc_id = l.doc_id AND p.person_id = l.person_id",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(locale, "home");
    assert_eq!(age_group, "Ag3");
}

#[tokio::test]
async fn test_duplicate_key_is_rejected() {
    let pool = init_memory_database().await.unwrap();
    let mut conn = pool.acquire().await.unwrap();

    let setting = TableRow::new("settings")
        .with("doc_id", "KB0")
        .with("setting_id", "S1");

    insert_row(&mut conn, &setting).await.unwrap();
    assert!(insert_row(&mut conn, &setting).await.is_err());
}

#[tokio::test]
async fn test_existing_store_with_foreign_layout_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("bnc.db");

    let pool = SqlitePool::connect(&format!("sqlite://{}?mode=rwc", db_path.display()))
        .await
        .unwrap();
    sqlx::query(
        "CREATE TABLE settings (doc_id TEXT NOT NULL, setting_id TEXT NOT NULL, \
         PRIMARY KEY (doc_id, setting_id))",
    )
    .execute(&pool)
    .await
    .unwrap();
    pool.close().await;

    match init_database(&db_path).await {
        Err(bnc_common::Error::Schema(msg)) => assert!(msg.contains("settings"), "{}", msg),
        other => panic!("Expected schema error, got {:?}", other.map(|_| ())),
    }

    // The store is left as it was
    let pool = SqlitePool::connect(&format!("sqlite://{}", db_path.display()))
        .await
        .unwrap();
    let columns: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM pragma_table_info('settings')")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(columns, 2);
}
