use super::Store;
use habitbot_core::config::StoreConfig;
use habitbot_core::traits::HabitStore;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;

/// Create an in-memory store for testing.
async fn test_store() -> Store {
    let opts = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);
    // A single connection: every pooled connection would get its own database.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(opts)
        .await
        .unwrap();
    Store::run_migrations(&pool).await.unwrap();
    Store { pool }
}

#[tokio::test]
async fn test_ensure_user_is_idempotent() {
    let store = test_store().await;
    let first = store.ensure_user("ann").await.unwrap();
    let second = store.ensure_user("ann").await.unwrap();
    assert_eq!(first, second);

    let other = store.ensure_user("bob").await.unwrap();
    assert_ne!(first, other);
}

#[tokio::test]
async fn test_find_user() {
    let store = test_store().await;
    assert_eq!(store.find_user("ann").await.unwrap(), None);
    let id = store.ensure_user("ann").await.unwrap();
    assert_eq!(store.find_user("ann").await.unwrap(), Some(id));
}

#[tokio::test]
async fn test_create_habit_links_tracker_and_user() {
    let store = test_store().await;
    let user = store.ensure_user("ann").await.unwrap();
    let habit_id = store
        .create_habit(user, "My Habit", "Daily walk")
        .await
        .unwrap();

    let habits = store.habits_for_user(user).await.unwrap();
    assert_eq!(habits.len(), 1);
    assert_eq!(habits[0].id, habit_id);
    assert_eq!(habits[0].title, "My Habit");
    assert_eq!(habits[0].description, "Daily walk");

    let (tracker_habit,): (i64,) =
        sqlx::query_as("SELECT habit_id FROM habit_trackers WHERE id = ?")
            .bind(habits[0].tracker_id)
            .fetch_one(store.pool())
            .await
            .unwrap();
    assert_eq!(tracker_habit, habit_id);
}

#[tokio::test]
async fn test_create_habit_rolls_back_on_bad_user() {
    let store = test_store().await;
    // No such user: the link insert violates the foreign key.
    let err = store.create_habit(999, "Orphan", "").await.unwrap_err();
    assert_eq!(err.kind(), habitbot_core::error::ErrorKind::Storage);

    let (habits,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM habits")
        .fetch_one(store.pool())
        .await
        .unwrap();
    let (trackers,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM habit_trackers")
        .fetch_one(store.pool())
        .await
        .unwrap();
    assert_eq!(habits, 0);
    assert_eq!(trackers, 0);
}

#[tokio::test]
async fn test_habits_are_per_user() {
    let store = test_store().await;
    HabitStore::create_habit(&store, "ann", "Read", "10 pages")
        .await
        .unwrap();
    HabitStore::create_habit(&store, "ann", "Run", "5k")
        .await
        .unwrap();
    HabitStore::create_habit(&store, "bob", "Sleep", "8h")
        .await
        .unwrap();

    let ann = store.list_habits("ann").await.unwrap();
    assert_eq!(
        ann.iter().map(|h| h.title.as_str()).collect::<Vec<_>>(),
        vec!["Read", "Run"]
    );
    assert_eq!(store.list_habits("bob").await.unwrap().len(), 1);
    assert!(store.list_habits("carol").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_migrations_run_once() {
    let store = test_store().await;
    Store::run_migrations(store.pool()).await.unwrap();
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM _migrations")
        .fetch_one(store.pool())
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_new_creates_database_file() {
    let dir = std::env::temp_dir().join(format!("__habitbot_store_test_{}__", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    let config = StoreConfig {
        db_path: dir.join("nested/habits.db").to_string_lossy().to_string(),
    };
    let store = Store::new(&config).await.unwrap();
    store.ensure_user("ann").await.unwrap();
    assert!(dir.join("nested/habits.db").exists());
    drop(store);
    let _ = std::fs::remove_dir_all(&dir);
}
