pub mod datalink;
pub mod procedures;
pub mod row;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;
use std::path::Path;

use crate::error::DataLinkError;

pub type DbPool = Pool<SqliteConnectionManager>;

const MIGRATIONS: &[(&str, &str)] = &[
    (
        "001_initial",
        include_str!("../../migrations/001_initial.sql"),
    ),
    (
        "002_catalog_seed",
        include_str!("../../migrations/002_catalog_seed.sql"),
    ),
];

/// Open the pooled connection to the store. Failures here are the
/// connection-establishment error tier, distinct from per-procedure failures.
pub fn create_pool(db_path: &Path) -> Result<DbPool, DataLinkError> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).map_err(DataLinkError::connection)?;
    }

    let manager = SqliteConnectionManager::file(db_path);
    let pool = Pool::builder()
        .max_size(8)
        .build(manager)
        .map_err(DataLinkError::connection)?;

    let conn = pool.get().map_err(DataLinkError::connection)?;
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA foreign_keys = ON;
        PRAGMA busy_timeout = 5000;
        ",
    )
    .map_err(DataLinkError::connection)?;

    Ok(pool)
}

pub fn run_migrations(pool: &DbPool) -> anyhow::Result<()> {
    let conn = pool.get()?;

    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            name TEXT PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )?;

    for (name, sql) in MIGRATIONS {
        let already_applied: bool = conn.query_row(
            "SELECT COUNT(*) > 0 FROM schema_version WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )?;

        if !already_applied {
            tracing::info!("Applying migration: {}", name);
            conn.execute_batch(sql)?;
            conn.execute(
                "INSERT INTO schema_version (name) VALUES (?1)",
                params![name],
            )?;
        }
    }

    tracing::info!("Database migrations complete");
    Ok(())
}

/// Single-connection in-memory pool for unit tests. One connection only:
/// each in-memory connection is its own database.
#[cfg(test)]
pub(crate) fn create_test_pool() -> DbPool {
    let manager = SqliteConnectionManager::memory();
    let pool = Pool::builder().max_size(1).build(manager).unwrap();
    let conn = pool.get().unwrap();
    conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
    pool
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_pool_creates_db_file() {
        let tmp = tempfile::tempdir().unwrap();
        let db_path = tmp.path().join("sub/dir/test.db");
        let pool = create_pool(&db_path).unwrap();
        assert!(db_path.exists());
        let conn = pool.get().unwrap();
        let mode: String = conn
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .unwrap();
        assert_eq!(mode, "wal");
    }

    #[test]
    fn migrations_run_and_are_idempotent() {
        let pool = create_test_pool();
        run_migrations(&pool).unwrap();
        run_migrations(&pool).unwrap();

        let conn = pool.get().unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 2);

        let tables: Vec<String> = {
            let mut stmt = conn
                .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
                .unwrap();
            stmt.query_map([], |row| row.get(0))
                .unwrap()
                .filter_map(|r| r.ok())
                .collect()
        };
        for table in [
            "users",
            "sessions",
            "wallets",
            "owned_games",
            "collections",
            "collection_games",
            "friendships",
            "features",
            "feature_user",
            "achievements",
            "achievement_user",
            "password_reset_codes",
        ] {
            assert!(tables.contains(&table.to_string()), "missing table {table}");
        }
    }

    #[test]
    fn seed_catalogs_are_present() {
        let pool = create_test_pool();
        run_migrations(&pool).unwrap();
        let conn = pool.get().unwrap();

        let features: i64 = conn
            .query_row("SELECT COUNT(*) FROM features", [], |row| row.get(0))
            .unwrap();
        assert!(features >= 5);

        let frames: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM features WHERE type = 'frame'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert!(frames >= 2);

        let achievements: i64 = conn
            .query_row("SELECT COUNT(*) FROM achievements", [], |row| row.get(0))
            .unwrap();
        assert!(achievements >= 5);
    }

    #[test]
    fn first_real_collection_id_is_two() {
        let pool = create_test_pool();
        run_migrations(&pool).unwrap();
        let conn = pool.get().unwrap();

        conn.execute(
            "INSERT INTO users (username, email, hashed_password, created_at)
             VALUES ('a', 'a@b.c', 'x', '2024-01-01T00:00:00.000000Z')",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO collections (user_id, name, created_at)
             VALUES (1, 'First', '2024-01-01T00:00:00.000000Z')",
            [],
        )
        .unwrap();

        let id: i64 = conn
            .query_row("SELECT MIN(collection_id) FROM collections", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(id, 2);
    }
}
