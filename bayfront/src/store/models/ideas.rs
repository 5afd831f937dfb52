//! Store records for the `ideas` collection: community suggestions for
//! templates that should exist.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{IdeaId, UserId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdeaRecord {
    pub id: IdeaId,
    pub user_id: UserId,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// Insert payload. The owner id comes from the authenticated caller, never
/// from the request body.
#[derive(Debug, Clone, Serialize)]
pub struct IdeaCreateStoreRequest {
    pub user_id: UserId,
    pub title: String,
    pub description: String,
}
