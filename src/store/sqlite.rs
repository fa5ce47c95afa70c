//! SQLite highlight store
//!
//! One row per record. `set` replaces the table contents inside a single
//! transaction so readers never observe a half-written map.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use super::{HighlightStore, StoreError};
use crate::anchor::{HighlightMap, HighlightRecord};

/// Create a connection pool and make sure the schema exists
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, StoreError> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    SqliteStore::init(&pool).await?;
    Ok(pool)
}

/// Store backed by a `highlights` table
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Initialize the highlights table
    pub async fn init(pool: &SqlitePool) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS highlights (
                id TEXT PRIMARY KEY,
                text TEXT NOT NULL,
                url TEXT NOT NULL,
                timestamp INTEGER NOT NULL,
                structural_path TEXT NOT NULL,
                char_offset INTEGER NOT NULL,
                length INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_highlights_url ON highlights(url);
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl HighlightStore for SqliteStore {
    async fn get(&self) -> Result<HighlightMap, StoreError> {
        let rows = sqlx::query_as::<_, HighlightRow>(
            r#"
            SELECT id, text, url, timestamp, structural_path, char_offset, length
            FROM highlights
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| row.into_record().map(|record| (record.id.clone(), record)))
            .collect()
    }

    async fn set(&self, highlights: HighlightMap) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM highlights")
            .execute(&mut *tx)
            .await?;

        for record in highlights.values() {
            sqlx::query(
                r#"
                INSERT INTO highlights (id, text, url, timestamp, structural_path, char_offset, length)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&record.id)
            .bind(&record.text)
            .bind(&record.url)
            .bind(record.timestamp)
            .bind(&record.structural_path)
            .bind(record.offset as i64)
            .bind(record.length as i64)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

/// Internal row type for SQLite queries
#[derive(sqlx::FromRow)]
struct HighlightRow {
    id: String,
    text: String,
    url: String,
    timestamp: i64,
    structural_path: String,
    char_offset: i64,
    length: i64,
}

impl HighlightRow {
    fn into_record(self) -> Result<HighlightRecord, StoreError> {
        let corrupt = |reason: &str| StoreError::Corrupt {
            id: self.id.clone(),
            reason: reason.to_string(),
        };
        let offset = usize::try_from(self.char_offset).map_err(|_| corrupt("negative offset"))?;
        let length = usize::try_from(self.length).map_err(|_| corrupt("negative length"))?;

        Ok(HighlightRecord {
            id: self.id,
            text: self.text,
            url: self.url,
            timestamp: self.timestamp,
            structural_path: self.structural_path,
            offset,
            length,
        })
    }
}
