//! Store records for the `concepts` collection: rough design concepts shared
//! by creators for feedback before building a full template.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{ConceptId, UserId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConceptRecord {
    pub id: ConceptId,
    pub user_id: UserId,
    pub title: String,
    pub summary: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConceptCreateStoreRequest {
    pub user_id: UserId,
    pub title: String,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}
