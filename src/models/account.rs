use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered account document
///
/// The password is stored as a bcrypt hash; the hash never leaves the store
/// layer in API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn new(username: String, password_hash: String) -> Self {
        Self {
            username,
            password_hash,
            created_at: Utc::now(),
        }
    }
}
