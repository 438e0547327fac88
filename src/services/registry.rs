use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Criteria, RequesterKind, SearchStatus, StandingSearch};
use crate::services::cache::ActiveSearchCache;

/// Errors from the standing-search registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Registry write failed: {0}")]
    WriteFailed(sqlx::Error),

    #[error("Registry query failed: {0}")]
    QueryFailed(sqlx::Error),

    #[error("Standing search not found: {0}")]
    NotFound(Uuid),

    #[error("Invalid row data: {0}")]
    InvalidRow(String),
}

/// Durable store of standing searches, one row per requester.
///
/// The one-active-row-per-requester rule is enforced by a unique
/// constraint on `requester_id`, not by application-level locking, so it
/// holds across service instances. Rows are never hard-deleted here; the
/// status toggle only flips between active and expired.
pub struct StandingSearchRegistry {
    pool: PgPool,
    cache: ActiveSearchCache,
}

impl StandingSearchRegistry {
    pub fn new(pool: PgPool, cache: ActiveSearchCache) -> Self {
        Self { pool, cache }
    }

    /// Create or replace the requester's standing search.
    ///
    /// A re-submission overwrites the mutable fields and reactivates the
    /// search while keeping its id (the conflict target never updates
    /// `id` or `created_at`). Last-writer-wins under concurrent calls;
    /// the single statement rules out partial overwrites.
    pub async fn upsert(
        &self,
        requester_id: &str,
        requester_kind: RequesterKind,
        requester_contact: &str,
        description_text: &str,
        criteria: &Criteria,
    ) -> Result<StandingSearch, RegistryError> {
        let criteria_json =
            serde_json::to_value(criteria).map_err(|e| RegistryError::InvalidRow(e.to_string()))?;

        let query = r#"
            INSERT INTO standing_searches
                (id, requester_id, requester_kind, requester_contact, description_text, criteria, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, 'active', NOW(), NOW())
            ON CONFLICT (requester_id)
            DO UPDATE SET
                requester_kind = EXCLUDED.requester_kind,
                requester_contact = EXCLUDED.requester_contact,
                description_text = EXCLUDED.description_text,
                criteria = EXCLUDED.criteria,
                status = 'active',
                updated_at = NOW()
            RETURNING id, requester_id, requester_kind, requester_contact, description_text, criteria, status, created_at, updated_at
        "#;

        let row = sqlx::query(query)
            .bind(Uuid::new_v4())
            .bind(requester_id)
            .bind(requester_kind.as_str())
            .bind(requester_contact)
            .bind(description_text)
            .bind(&criteria_json)
            .fetch_one(&self.pool)
            .await
            .map_err(RegistryError::WriteFailed)?;

        self.cache.invalidate().await;

        let search = row_to_search(&row)?;

        tracing::debug!(
            "Upserted standing search {} for requester {}",
            search.id,
            requester_id
        );

        Ok(search)
    }

    /// Toggle a standing search between active and expired. Idempotent:
    /// setting the current status again is a no-op success.
    pub async fn set_status(&self, id: Uuid, status: SearchStatus) -> Result<(), RegistryError> {
        let query = r#"
            UPDATE standing_searches
            SET status = $2, updated_at = NOW()
            WHERE id = $1
        "#;

        let result = sqlx::query(query)
            .bind(id)
            .bind(status.as_str())
            .execute(&self.pool)
            .await
            .map_err(RegistryError::WriteFailed)?;

        if result.rows_affected() == 0 {
            return Err(RegistryError::NotFound(id));
        }

        self.cache.invalidate().await;

        tracing::debug!("Standing search {} set to {}", id, status.as_str());

        Ok(())
    }

    /// The requester's active standing search, if any. Used to restore
    /// continuation state in the UI.
    pub async fn find_active_for(
        &self,
        requester_id: &str,
    ) -> Result<Option<StandingSearch>, RegistryError> {
        let query = r#"
            SELECT id, requester_id, requester_kind, requester_contact, description_text, criteria, status, created_at, updated_at
            FROM standing_searches
            WHERE requester_id = $1 AND status = 'active'
        "#;

        let row = sqlx::query(query)
            .bind(requester_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(RegistryError::QueryFailed)?;

        row.as_ref().map(row_to_search).transpose()
    }

    /// All active standing searches, served through the short-TTL cache.
    /// Staleness is bounded by the cache TTL and by invalidation on every
    /// write through this registry.
    pub async fn all_active(&self) -> Result<Vec<StandingSearch>, RegistryError> {
        if let Some(cached) = self.cache.get().await {
            return Ok(cached.as_ref().clone());
        }

        let query = r#"
            SELECT id, requester_id, requester_kind, requester_contact, description_text, criteria, status, created_at, updated_at
            FROM standing_searches
            WHERE status = 'active'
            ORDER BY created_at
        "#;

        let rows = sqlx::query(query)
            .fetch_all(&self.pool)
            .await
            .map_err(RegistryError::QueryFailed)?;

        let searches: Result<Vec<StandingSearch>, RegistryError> =
            rows.iter().map(row_to_search).collect();
        let searches = searches?;

        self.cache.set(searches.clone()).await;

        Ok(searches)
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, RegistryError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(RegistryError::QueryFailed)
    }
}

fn row_to_search(row: &PgRow) -> Result<StandingSearch, RegistryError> {
    let kind_raw: String = row.get("requester_kind");
    let requester_kind = RequesterKind::parse(&kind_raw)
        .ok_or_else(|| RegistryError::InvalidRow(format!("unknown requester kind: {}", kind_raw)))?;

    let status_raw: String = row.get("status");
    let status = SearchStatus::parse(&status_raw)
        .ok_or_else(|| RegistryError::InvalidRow(format!("unknown search status: {}", status_raw)))?;

    let criteria_json: serde_json::Value = row.get("criteria");
    let criteria: Criteria = serde_json::from_value(criteria_json)
        .map_err(|e| RegistryError::InvalidRow(format!("criteria decode failed: {}", e)))?;

    Ok(StandingSearch {
        id: row.get("id"),
        requester_id: row.get("requester_id"),
        requester_kind,
        requester_contact: row.get("requester_contact"),
        description_text: row.get("description_text"),
        criteria,
        status,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}
