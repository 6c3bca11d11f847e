use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// User record as persisted in the users document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,                   // opaque; assigned at registration, never changes
    pub username: String,             // unique across the store
    pub email: String,                // unique across the store
    pub password_hash: String,        // Argon2 PHC string
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl User {
    /// True when either identity field collides with the given pair.
    pub fn conflicts_with(&self, username: &str, email: &str) -> bool {
        self.username == username || self.email == email
    }

    /// Login lookup: the single identifier may be a username or an email.
    pub fn matches_identifier(&self, identifier: &str) -> bool {
        self.username == identifier || self.email == identifier
    }
}
