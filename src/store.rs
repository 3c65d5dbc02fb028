// SQLite record store (same schema as the original monitor).
// Append-only: one row per sample tick, ids assigned by AUTOINCREMENT,
// no update or delete path. Uses sqlx for async SQLite access.

use crate::models::{Record, Sample};
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("database path: {0}")]
    Io(#[from] std::io::Error),
}

pub struct RecordStore {
    pool: SqlitePool,
}

impl RecordStore {
    /// Open the database at `path`, creating the parent directory, the file
    /// and the schema if missing. Safe to call repeatedly on the same path;
    /// existing rows are kept. synchronous=FULL so every append is on disk
    /// before the INSERT returns.
    pub async fn open(path: &str) -> Result<Self, StoreError> {
        if let Some(parent) = Path::new(path).parent() {
            std::fs::create_dir_all(parent)?;
        }
        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}", path))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .busy_timeout(std::time::Duration::from_secs(5))
            .synchronous(sqlx::sqlite::SqliteSynchronous::Full);
        let pool = SqlitePoolOptions::new().connect_with(opts).await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS records (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                cpu REAL,
                osu_free REAL,
                osu_total REAL,
                disk_free REAL,
                disk_total REAL
            )
            "#,
        )
        .execute(&pool)
        .await?;

        Ok(Self { pool })
    }

    /// Insert one sample as its own transaction and return the assigned id.
    pub async fn append(&self, sample: &Sample) -> Result<i64, StoreError> {
        let result = sqlx::query(
            "INSERT INTO records (cpu, osu_free, osu_total, disk_free, disk_total) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(sample.cpu_percent)
        .bind(sample.memory_free_kb as f64)
        .bind(sample.memory_total_kb as f64)
        .bind(sample.disk_free_kb as f64)
        .bind(sample.disk_total_kb as f64)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// Every stored sample in insertion order, oldest first.
    pub async fn all(&self) -> Result<Vec<Record>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, cpu, osu_free, osu_total, disk_free, disk_total FROM records ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let id: i64 = row.try_get("id")?;
            let cpu: f64 = row.try_get("cpu")?;
            let osu_free: f64 = row.try_get("osu_free")?;
            let osu_total: f64 = row.try_get("osu_total")?;
            let disk_free: f64 = row.try_get("disk_free")?;
            let disk_total: f64 = row.try_get("disk_total")?;
            out.push(Record {
                id,
                sample: Sample {
                    cpu_percent: cpu,
                    memory_free_kb: osu_free as u64,
                    memory_total_kb: osu_total as u64,
                    disk_free_kb: disk_free as u64,
                    disk_total_kb: disk_total as u64,
                },
            });
        }
        Ok(out)
    }

    /// Release the connection pool. `append`/`all` fail afterwards.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
