//! Store records for the `profiles` collection. Profiles are keyed by the
//! hosted-auth user id; rows are created by the backend on signup, so this
//! tier only ever reads and updates them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::UserId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub id: UserId,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub website_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update payload; only set fields land in the PATCH body.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileUpdateStoreRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website_url: Option<String>,
    pub updated_at: DateTime<Utc>,
}
