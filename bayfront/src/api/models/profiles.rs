//! API request/response models for seller profiles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::store::models::ProfileRecord;
use crate::types::UserId;

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub website_url: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none() && self.avatar_url.is_none() && self.bio.is_none() && self.website_url.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProfileResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: UserId,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub website_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProfileRecord> for ProfileResponse {
    fn from(record: ProfileRecord) -> Self {
        Self {
            id: record.id,
            display_name: record.display_name,
            avatar_url: record.avatar_url,
            bio: record.bio,
            website_url: record.website_url,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}
