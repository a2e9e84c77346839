use time::OffsetDateTime;

use crate::{Database, DbError, Result};

/// Migration definition contributed by a module.
#[derive(Debug, Clone)]
pub struct Migration {
    pub id: &'static str,
    pub up: &'static str,
}

impl Database {
    /// Apply `(module, migration)` pairs in order, skipping ones already recorded.
    ///
    /// Each migration runs in its own transaction together with its
    /// bookkeeping row. Returns how many were applied.
    pub async fn apply_migrations(&self, migrations: &[(String, Migration)]) -> Result<usize> {
        let pool = self.pool()?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS _migrations (
                module     TEXT    NOT NULL,
                id         TEXT    NOT NULL,
                applied_at INTEGER NOT NULL,
                PRIMARY KEY (module, id)
            )",
        )
        .execute(pool)
        .await?;

        let mut applied = 0;
        for (module, migration) in migrations {
            let recorded: Option<i64> =
                sqlx::query_scalar("SELECT applied_at FROM _migrations WHERE module = ? AND id = ?")
                    .bind(module.as_str())
                    .bind(migration.id)
                    .fetch_optional(pool)
                    .await?;
            if recorded.is_some() {
                continue;
            }

            let mut tx = pool.begin().await?;
            sqlx::raw_sql(migration.up)
                .execute(&mut *tx)
                .await
                .map_err(|source| DbError::Migration {
                    module: module.clone(),
                    id: migration.id.to_string(),
                    source,
                })?;
            sqlx::query("INSERT INTO _migrations (module, id, applied_at) VALUES (?, ?, ?)")
                .bind(module.as_str())
                .bind(migration.id)
                .bind(OffsetDateTime::now_utc().unix_timestamp())
                .execute(&mut *tx)
                .await?;
            tx.commit().await?;

            tracing::info!(
                target: "shopfront-db",
                module = %module,
                migration = migration.id,
                "migration applied"
            );
            applied += 1;
        }

        Ok(applied)
    }
}
