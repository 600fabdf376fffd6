use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(skip_serializing)]
    pub reset_password_token: Option<String>,
    #[serde(skip_serializing)]
    pub reset_password_expires: Option<DateTime<Utc>>,
    pub hearts: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Gravatar accepts SHA-256 of the trimmed, lower-cased address.
    pub fn gravatar(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.email.trim().to_lowercase().as_bytes());
        format!("https://gravatar.com/avatar/{:x}?s=200", hasher.finalize())
    }

    pub fn has_hearted(&self, gym_id: Uuid) -> bool {
        self.hearts.contains(&gym_id)
    }
}
