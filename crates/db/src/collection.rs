//! JSON document collections stored in SQLite tables.
//!
//! Every collection table has the same shape:
//!
//! ```sql
//! CREATE TABLE <name> (
//!     seq        INTEGER PRIMARY KEY AUTOINCREMENT,
//!     id         TEXT    NOT NULL UNIQUE,
//!     created_at INTEGER NOT NULL,
//!     body       TEXT    NOT NULL
//! );
//! ```
//!
//! `created_at` holds unix nanoseconds; `seq` breaks ties so that a later
//! insert always sorts ahead of an earlier one.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};
use time::OffsetDateTime;

use crate::{DbError, ObjectId, Result};

/// A stored document with the metadata assigned by the collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Document<T> {
    pub id: ObjectId,
    pub created_at: OffsetDateTime,
    pub body: T,
}

impl<T> Document<T> {
    fn stamp(body: T) -> Self {
        Self {
            id: ObjectId::generate(),
            created_at: OffsetDateTime::now_utc(),
            body,
        }
    }
}

type Row = (String, i64, String);

/// Typed handle over one collection table.
pub struct Collection<T> {
    pool: SqlitePool,
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            name: self.name,
            _marker: PhantomData,
        }
    }
}

impl<T> Collection<T>
where
    T: Serialize + DeserializeOwned,
{
    pub(crate) fn new(pool: SqlitePool, name: &'static str) -> Self {
        Self {
            pool,
            name,
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// All documents, newest first.
    pub async fn find_all(&self) -> Result<Vec<Document<T>>> {
        let sql = format!(
            "SELECT id, created_at, body FROM {} ORDER BY created_at DESC, seq DESC",
            self.name
        );
        let rows: Vec<Row> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;
        rows.into_iter().map(decode_row).collect()
    }

    /// Look up one document. The id format is checked before the query runs.
    pub async fn find_by_id(&self, id: &str) -> Result<Option<Document<T>>> {
        let id = ObjectId::parse_str(id)?;
        let sql = format!(
            "SELECT id, created_at, body FROM {} WHERE id = ?",
            self.name
        );
        let row: Option<Row> = sqlx::query_as(&sql)
            .bind(id.to_hex())
            .fetch_optional(&self.pool)
            .await?;
        row.map(decode_row).transpose()
    }

    pub async fn insert_one(&self, body: T) -> Result<Document<T>> {
        let document = Document::stamp(body);
        let mut conn = self.pool.acquire().await?;
        self.insert_document(&mut conn, &document).await?;
        Ok(document)
    }

    /// Delete every document and insert `bodies` in order, in one transaction.
    ///
    /// On any failure the transaction is rolled back and the previous
    /// contents stay in place.
    pub async fn replace_all(&self, bodies: Vec<T>) -> Result<Vec<Document<T>>> {
        let mut tx = self.pool.begin().await?;

        let delete = format!("DELETE FROM {}", self.name);
        let removed = sqlx::query(&delete).execute(&mut *tx).await?.rows_affected();

        let mut inserted = Vec::with_capacity(bodies.len());
        for body in bodies {
            let document = Document::stamp(body);
            self.insert_document(&mut tx, &document).await?;
            inserted.push(document);
        }

        tx.commit().await?;

        tracing::debug!(
            target: "shopfront-db",
            collection = self.name,
            removed,
            inserted = inserted.len(),
            "collection replaced"
        );
        Ok(inserted)
    }

    pub async fn count(&self) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", self.name);
        let count: i64 = sqlx::query_scalar(&sql).fetch_one(&self.pool).await?;
        Ok(count)
    }

    async fn insert_document(
        &self,
        conn: &mut SqliteConnection,
        document: &Document<T>,
    ) -> Result<()> {
        let sql = format!(
            "INSERT INTO {} (id, created_at, body) VALUES (?, ?, ?)",
            self.name
        );
        let body = serde_json::to_string(&document.body)?;
        sqlx::query(&sql)
            .bind(document.id.to_hex())
            .bind(document.created_at.unix_timestamp_nanos() as i64)
            .bind(body)
            .execute(conn)
            .await?;
        Ok(())
    }
}

fn decode_row<T: DeserializeOwned>((id, created_at, body): Row) -> Result<Document<T>> {
    let id = ObjectId::parse_str(&id).map_err(|_| DbError::Corrupt(format!("bad id '{id}'")))?;
    let created_at = OffsetDateTime::from_unix_timestamp_nanos(i128::from(created_at))
        .map_err(|err| DbError::Corrupt(format!("bad timestamp for {id}: {err}")))?;
    let body = serde_json::from_str(&body)?;
    Ok(Document {
        id,
        created_at,
        body,
    })
}
