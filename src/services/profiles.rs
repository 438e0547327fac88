use sqlx::postgres::PgRow;
use sqlx::{PgPool, QueryBuilder, Row};
use thiserror::Error;

use crate::models::{CandidateProfile, Criteria};

/// Errors from the candidate-profile read model. A storage fault is
/// retryable and distinct from "zero results".
#[derive(Debug, Error)]
pub enum ProfileStoreError {
    #[error("Profile query failed: {0}")]
    QueryFailed(#[from] sqlx::Error),
}

/// Read-only access to athlete profiles.
///
/// Profiles are owned by the external profile CRUD; this store only reads
/// them. Present criteria fields are pushed down as ILIKE/range
/// predicates over a bounded, recency-ordered window; the engine
/// re-applies the same predicates in memory on top of that window.
pub struct ProfileStore {
    pool: PgPool,
    fetch_window: i64,
}

impl ProfileStore {
    pub fn new(pool: PgPool, fetch_window: u32) -> Self {
        Self {
            pool,
            fetch_window: fetch_window as i64,
        }
    }

    /// Fetch candidates narrowed by the criteria, most recently updated
    /// first. The repository ordering is the ranking order.
    pub async fn query_candidates(
        &self,
        criteria: &Criteria,
    ) -> Result<Vec<CandidateProfile>, ProfileStoreError> {
        let mut builder = QueryBuilder::new(
            "SELECT id, name, avatar_url, position, nationality, height_cm, status, experience_years, contact_email, updated_at \
             FROM athlete_profiles WHERE 1 = 1",
        );

        if let Some(position) = &criteria.position {
            builder.push(" AND position ILIKE ");
            builder.push_bind(format!("%{}%", position.as_str()));
        }

        if let Some(nationality) = &criteria.nationality {
            builder.push(" AND nationality ILIKE ");
            builder.push_bind(format!("%{}%", nationality));
        }

        if let Some(min) = criteria.height_min {
            builder.push(" AND height_cm >= ");
            builder.push_bind(min as i32);
        }

        if let Some(max) = criteria.height_max {
            builder.push(" AND height_cm <= ");
            builder.push_bind(max as i32);
        }

        if let Some(status) = &criteria.status {
            builder.push(" AND status ILIKE ");
            builder.push_bind(format!("%{}%", status.as_str()));
        }

        if let Some(min) = criteria.experience_min {
            builder.push(" AND experience_years >= ");
            builder.push_bind(min as i32);
        }

        builder.push(" ORDER BY updated_at DESC LIMIT ");
        builder.push_bind(self.fetch_window);

        let rows = builder.build().fetch_all(&self.pool).await?;

        let profiles: Vec<CandidateProfile> = rows.iter().map(row_to_profile).collect();

        tracing::debug!("Queried {} candidate profiles", profiles.len());

        Ok(profiles)
    }
}

fn row_to_profile(row: &PgRow) -> CandidateProfile {
    let height_cm: i32 = row.get("height_cm");
    let experience_years: i32 = row.get("experience_years");

    CandidateProfile {
        id: row.get("id"),
        name: row.get("name"),
        avatar_url: row.get("avatar_url"),
        position: row.get("position"),
        nationality: row.get("nationality"),
        height_cm: height_cm.max(0) as u16,
        status: row.get("status"),
        experience_years: experience_years.clamp(0, u8::MAX as i32) as u8,
        contact_email: row.get("contact_email"),
        updated_at: row.get("updated_at"),
    }
}
