//! Versioned record repository.
//!
//! Records are JSON blobs read and replaced wholesale. Every write is a compare-and-swap
//! on the record version, performed inside one transaction together with the global
//! revision bump.

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::{Row, SqlitePool};

use crate::errors::AppError;
use crate::models::RevisionInfo;

/// Names of the records kept in the `options` table.
pub mod records {
    pub const GROUPS: &str = "translation_groups";
    pub const OBJECT_INDEX: &str = "translation_index";
    pub const LANGUAGES: &str = "languages";
    pub const DEFAULT_LANGUAGE: &str = "default_language";
}

/// A decoded record together with the version it was read at.
/// Version 0 means the record does not exist yet.
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned<T> {
    pub value: T,
    pub version: i64,
}

/// One record replacement, applied only if the stored version still matches.
#[derive(Debug, Clone)]
pub struct RecordWrite {
    pub name: &'static str,
    pub value: String,
    pub expected_version: i64,
}

impl RecordWrite {
    pub fn new<T: Serialize>(
        name: &'static str,
        value: &T,
        expected_version: i64,
    ) -> Result<Self, AppError> {
        Ok(Self {
            name,
            value: serde_json::to_string(value)?,
            expected_version,
        })
    }
}

/// Database repository for record operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Get the current revision ID.
    pub async fn get_revision_id(&self) -> Result<i64, AppError> {
        let row = sqlx::query("SELECT revision_id FROM meta WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("revision_id"))
    }

    /// Get revision info.
    pub async fn get_revision_info(&self) -> Result<RevisionInfo, AppError> {
        let row = sqlx::query("SELECT revision_id, generated_at FROM meta WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(RevisionInfo {
            revision_id: row.get("revision_id"),
            generated_at: row.get("generated_at"),
        })
    }

    /// Read and decode a single record.
    pub async fn read_record<T>(&self, name: &str) -> Result<Versioned<T>, AppError>
    where
        T: DeserializeOwned + Default,
    {
        let row = sqlx::query("SELECT value, version FROM options WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        Ok(match row {
            Some(row) => Versioned {
                value: decode(name, row.get("value")),
                version: row.get("version"),
            },
            None => Versioned {
                value: T::default(),
                version: 0,
            },
        })
    }

    /// Read two records in one statement so they reflect the same committed state.
    pub async fn read_pair<A, B>(
        &self,
        first: &str,
        second: &str,
    ) -> Result<(Versioned<A>, Versioned<B>), AppError>
    where
        A: DeserializeOwned + Default,
        B: DeserializeOwned + Default,
    {
        let rows = sqlx::query("SELECT name, value, version FROM options WHERE name IN (?, ?)")
            .bind(first)
            .bind(second)
            .fetch_all(&self.pool)
            .await?;

        let mut a = Versioned {
            value: A::default(),
            version: 0,
        };
        let mut b = Versioned {
            value: B::default(),
            version: 0,
        };

        for row in rows {
            let name: String = row.get("name");
            let version: i64 = row.get("version");
            let raw: String = row.get("value");
            if name == first {
                a = Versioned {
                    value: decode(first, raw),
                    version,
                };
            } else if name == second {
                b = Versioned {
                    value: decode(second, raw),
                    version,
                };
            }
        }

        Ok((a, b))
    }

    /// Apply record writes atomically. Any version mismatch rolls the whole batch back
    /// and surfaces as `AppError::Conflict`. Returns the new revision id.
    pub async fn write_records(&self, writes: &[RecordWrite]) -> Result<i64, AppError> {
        let now = Utc::now().to_rfc3339();
        let mut tx = self.pool.begin().await?;

        for write in writes {
            let result = if write.expected_version == 0 {
                sqlx::query(
                    "INSERT INTO options (name, value, version, updated_at) VALUES (?, ?, 1, ?) ON CONFLICT(name) DO NOTHING",
                )
                .bind(write.name)
                .bind(&write.value)
                .bind(&now)
                .execute(&mut *tx)
                .await?
            } else {
                sqlx::query(
                    "UPDATE options SET value = ?, version = version + 1, updated_at = ? WHERE name = ? AND version = ?",
                )
                .bind(&write.value)
                .bind(&now)
                .bind(write.name)
                .bind(write.expected_version)
                .execute(&mut *tx)
                .await?
            };

            if result.rows_affected() == 0 {
                let current = sqlx::query("SELECT version FROM options WHERE name = ?")
                    .bind(write.name)
                    .fetch_optional(&mut *tx)
                    .await?
                    .map(|row| row.get::<i64, _>("version"))
                    .unwrap_or(0);
                tx.rollback().await?;

                return Err(AppError::Conflict {
                    message: format!(
                        "Record {} changed concurrently: expected version {}, current {}",
                        write.name, write.expected_version, current
                    ),
                    current_version: current,
                });
            }
        }

        sqlx::query("UPDATE meta SET revision_id = revision_id + 1, generated_at = ? WHERE id = 1")
            .bind(&now)
            .execute(&mut *tx)
            .await?;

        let revision: i64 = sqlx::query("SELECT revision_id FROM meta WHERE id = 1")
            .fetch_one(&mut *tx)
            .await?
            .get("revision_id");

        tx.commit().await?;

        Ok(revision)
    }

    /// Read-modify-write of a single record with retry on version conflicts.
    /// Nothing is written when `apply` leaves the value unchanged.
    pub async fn update_record<T, R, F>(
        &self,
        name: &'static str,
        max_retries: u32,
        mut apply: F,
    ) -> Result<R, AppError>
    where
        T: Serialize + DeserializeOwned + Default + Clone + PartialEq,
        F: FnMut(&mut T) -> Result<R, AppError>,
    {
        let mut attempt = 0;
        loop {
            let current = self.read_record::<T>(name).await?;
            let mut value = current.value.clone();
            let result = apply(&mut value)?;

            if value == current.value {
                return Ok(result);
            }

            let write = RecordWrite::new(name, &value, current.version)?;
            match self.write_records(&[write]).await {
                Ok(_) => return Ok(result),
                Err(e) if e.is_conflict() && attempt < max_retries => {
                    attempt += 1;
                    tracing::warn!("Retrying write of {} after conflict (attempt {})", name, attempt);
                    tokio::task::yield_now().await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

fn decode<T>(name: &str, raw: String) -> T
where
    T: DeserializeOwned + Default,
{
    serde_json::from_str(&raw).unwrap_or_else(|e| {
        tracing::warn!("Discarding unreadable record {}: {}", name, e);
        T::default()
    })
}
