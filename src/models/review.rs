use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MIN_RATING: i16 = 1;
pub const MAX_RATING: i16 = 5;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Review {
    pub id: Uuid,
    pub gym_id: Uuid,
    pub author_id: Uuid,
    pub text: String,
    pub rating: i16,
    pub created_at: DateTime<Utc>,
}

/// Review joined with its author's display name.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct ReviewWithAuthor {
    pub id: Uuid,
    pub author_id: Uuid,
    pub author_name: String,
    pub text: String,
    pub rating: i16,
    pub created_at: DateTime<Utc>,
}
