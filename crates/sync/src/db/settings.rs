//! Option storage.
//!
//! Small JSON documents keyed by name. The sync runner keeps the epoch
//! metadata and the collected sync errors here.

use serde::Serialize;
use serde::de::DeserializeOwned;
use sqlx::SqlitePool;

use super::RepositoryError;

/// Repository for the `settings` key/value table.
pub struct SettingsRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> SettingsRepository<'a> {
    /// Create a new settings repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Read and decode a value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored JSON does not decode as `T`.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, RepositoryError> {
        let raw: Option<String> = sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(self.pool)
            .await?;

        raw.map(|json| {
            serde_json::from_str(&json).map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid JSON in setting {key}: {e}"))
            })
        })
        .transpose()
    }

    /// Encode and store a value, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    /// Returns `RepositoryError::DataCorruption` if the value cannot be serialized.
    pub async fn set<T: Serialize + Sync>(&self, key: &str, value: &T) -> Result<(), RepositoryError> {
        let json = serde_json::to_string(value).map_err(|e| {
            RepositoryError::DataCorruption(format!("cannot serialize setting {key}: {e}"))
        })?;

        sqlx::query(
            r"
            INSERT INTO settings (key, value, updated_at)
            VALUES (?, ?, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
            ON CONFLICT (key) DO UPDATE
            SET value = excluded.value, updated_at = excluded.updated_at
            ",
        )
        .bind(key)
        .bind(json)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Remove a value. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, key: &str) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM settings WHERE key = ?")
            .bind(key)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
