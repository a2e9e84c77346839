//! SQLite-backed document storage for Shopfront.
//!
//! [`Database`] is the single owned connection resource. It is created once
//! during startup (connected or explicitly disconnected) and cloned into
//! whatever needs it; there is no process-wide handle.

mod collection;
mod error;
mod migrate;
mod object_id;

use std::str::FromStr;
use std::time::Duration;

use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;

pub use collection::{Collection, Document};
pub use error::DbError;
pub use migrate::Migration;
pub use object_id::ObjectId;

pub type Result<T, E = DbError> = std::result::Result<T, E>;

/// Parameters for [`Database::connect`].
#[derive(Debug, Clone)]
pub struct ConnectOptions {
    pub url: String,
    pub max_connections: u32,
    pub connect_timeout: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConnectionState {
    Connected,
    Disconnected,
}

impl ConnectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Connected => "Connected",
            ConnectionState::Disconnected => "Disconnected",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Database {
    pool: Option<SqlitePool>,
}

impl Database {
    /// Open a pool for a `sqlite:` url. In-memory databases are pinned to a
    /// single long-lived connection so their contents survive between calls.
    pub async fn connect(options: &ConnectOptions) -> Result<Self> {
        if !options.url.starts_with("sqlite:") {
            let scheme = options
                .url
                .split_once(':')
                .map(|(scheme, _)| scheme)
                .unwrap_or_default();
            return Err(DbError::UnsupportedUrl(scheme.to_string()));
        }

        let in_memory = options.url.contains(":memory:") || options.url.contains("mode=memory");

        let mut connect_options = SqliteConnectOptions::from_str(&options.url)?
            .foreign_keys(true)
            .busy_timeout(options.connect_timeout);
        if !in_memory {
            connect_options = connect_options.journal_mode(SqliteJournalMode::Wal);
        }

        let pool_options = SqlitePoolOptions::new().acquire_timeout(options.connect_timeout);
        let pool_options = if in_memory {
            pool_options
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
        } else {
            pool_options.max_connections(options.max_connections.max(1))
        };

        let pool = pool_options.connect_with(connect_options).await?;

        tracing::info!(target: "shopfront-db", in_memory, "database connection established");
        Ok(Self { pool: Some(pool) })
    }

    /// A handle with no connection; every operation fails with [`DbError::Disconnected`].
    pub fn disconnected() -> Self {
        Self { pool: None }
    }

    pub fn state(&self) -> ConnectionState {
        match &self.pool {
            Some(pool) if !pool.is_closed() => ConnectionState::Connected,
            _ => ConnectionState::Disconnected,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    pub fn pool(&self) -> Result<&SqlitePool> {
        self.pool
            .as_ref()
            .filter(|pool| !pool.is_closed())
            .ok_or(DbError::Disconnected)
    }

    pub fn collection<T>(&self, name: &'static str) -> Result<Collection<T>>
    where
        T: Serialize + serde::de::DeserializeOwned,
    {
        Ok(Collection::new(self.pool()?.clone(), name))
    }

    /// Round-trip a trivial query.
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(self.pool()?).await?;
        Ok(())
    }

    /// Close the pool, waiting for checked-out connections to be returned.
    pub async fn close(&self) {
        if let Some(pool) = &self.pool {
            pool.close().await;
            tracing::info!(target: "shopfront-db", "database connection closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    const ITEMS_TABLE: Migration = Migration {
        id: "001_items",
        up: r#"
            CREATE TABLE items (
                seq        INTEGER PRIMARY KEY AUTOINCREMENT,
                id         TEXT    NOT NULL UNIQUE,
                created_at INTEGER NOT NULL,
                body       TEXT    NOT NULL
            );
            "#,
    };

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Item {
        label: String,
    }

    fn item(label: &str) -> Item {
        Item {
            label: label.to_string(),
        }
    }

    async fn memory_db() -> Database {
        let db = Database::connect(&ConnectOptions {
            url: "sqlite::memory:".to_string(),
            max_connections: 5,
            connect_timeout: Duration::from_secs(5),
        })
        .await
        .unwrap();
        db.apply_migrations(&[("test".to_string(), ITEMS_TABLE)])
            .await
            .unwrap();
        db
    }

    #[tokio::test]
    async fn rejects_non_sqlite_urls() {
        let err = Database::connect(&ConnectOptions {
            url: "mongodb+srv://cluster.example.net/shop".to_string(),
            max_connections: 1,
            connect_timeout: Duration::from_secs(1),
        })
        .await
        .unwrap_err();
        assert!(matches!(err, DbError::UnsupportedUrl(scheme) if scheme == "mongodb+srv"));
    }

    #[tokio::test]
    async fn disconnected_handle_fails_every_operation() {
        let db = Database::disconnected();
        assert_eq!(db.state(), ConnectionState::Disconnected);
        assert!(matches!(db.ping().await, Err(DbError::Disconnected)));
        assert!(matches!(
            db.collection::<Item>("items"),
            Err(DbError::Disconnected)
        ));
    }

    #[tokio::test]
    async fn close_flips_state_to_disconnected() {
        let db = memory_db().await;
        assert!(db.is_connected());
        db.ping().await.unwrap();
        db.close().await;
        assert_eq!(db.state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn migrations_apply_once() {
        let db = memory_db().await;
        let applied = db
            .apply_migrations(&[("test".to_string(), ITEMS_TABLE)])
            .await
            .unwrap();
        assert_eq!(applied, 0);
    }

    #[tokio::test]
    async fn broken_migration_reports_module_and_id() {
        let db = memory_db().await;
        let broken = Migration {
            id: "002_broken",
            up: "CREATE TABLE oops (",
        };
        let err = db
            .apply_migrations(&[("test".to_string(), broken)])
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Migration { ref id, .. } if id == "002_broken"));
    }

    #[tokio::test]
    async fn find_all_returns_newest_first() {
        let db = memory_db().await;
        let items = db.collection::<Item>("items").unwrap();
        for label in ["first", "second", "third"] {
            items.insert_one(item(label)).await.unwrap();
        }

        let labels: Vec<_> = items
            .find_all()
            .await
            .unwrap()
            .into_iter()
            .map(|doc| doc.body.label)
            .collect();
        assert_eq!(labels, ["third", "second", "first"]);
    }

    #[tokio::test]
    async fn find_by_id_distinguishes_missing_from_malformed() {
        let db = memory_db().await;
        let items = db.collection::<Item>("items").unwrap();
        let stored = items.insert_one(item("kept")).await.unwrap();

        let found = items.find_by_id(&stored.id.to_hex()).await.unwrap();
        assert_eq!(found.map(|doc| doc.body), Some(item("kept")));

        let missing = items
            .find_by_id("000000000000000000000000")
            .await
            .unwrap();
        assert!(missing.is_none());

        let malformed = items.find_by_id("kept").await.unwrap_err();
        assert!(malformed.is_invalid_id());
    }

    #[tokio::test]
    async fn replace_all_swaps_contents() {
        let db = memory_db().await;
        let items = db.collection::<Item>("items").unwrap();
        items.insert_one(item("stale")).await.unwrap();

        let inserted = items
            .replace_all(vec![item("a"), item("b")])
            .await
            .unwrap();
        assert_eq!(inserted.len(), 2);
        assert_eq!(items.count().await.unwrap(), 2);

        let labels: Vec<_> = items
            .find_all()
            .await
            .unwrap()
            .into_iter()
            .map(|doc| doc.body.label)
            .collect();
        assert_eq!(labels, ["b", "a"]);
    }

    #[tokio::test]
    async fn failed_replace_keeps_previous_contents() {
        let db = memory_db().await;
        let items = db.collection::<Item>("items").unwrap();
        items.insert_one(item("survivor")).await.unwrap();

        // The table rejects bodies over 16 bytes, so the second insert aborts the transaction.
        sqlx::raw_sql(
            "CREATE TRIGGER items_body_limit BEFORE INSERT ON items
             WHEN length(NEW.body) > 16
             BEGIN SELECT RAISE(ABORT, 'body too large'); END;",
        )
        .execute(db.pool().unwrap())
        .await
        .unwrap();

        let result = items
            .replace_all(vec![item("ok"), item("far too long to be accepted")])
            .await;
        assert!(matches!(result, Err(DbError::Sqlx(_))));

        let labels: Vec<_> = items
            .find_all()
            .await
            .unwrap()
            .into_iter()
            .map(|doc| doc.body.label)
            .collect();
        assert_eq!(labels, ["survivor"]);
    }
}
