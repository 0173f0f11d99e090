//! Server-side session records backing issued bearer tokens.

use chrono::{DateTime, TimeDelta, Utc};
use uuid::Uuid;

use super::UserId;

/// Lifetime shared by minted tokens and their session records.
pub fn session_lifetime() -> TimeDelta {
    TimeDelta::days(7)
}

/// Stored mapping from an issued token to its owner and expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub id: Uuid,
    pub token: String,
    pub created_at: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub user_id: UserId,
}

impl SessionRecord {
    /// Whether the record is still usable at `now` (strictly before `end_date`).
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.end_date > now
    }
}
