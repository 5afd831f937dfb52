//! API request/response models for template ideas and design concepts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::store::models::{ConceptRecord, IdeaRecord};
use crate::types::{ConceptId, IdeaId, UserId};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IdeaCreate {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IdeaResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: IdeaId,
    #[schema(value_type = String, format = "uuid")]
    pub user_id: UserId,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl From<IdeaRecord> for IdeaResponse {
    fn from(record: IdeaRecord) -> Self {
        Self {
            id: record.id,
            user_id: record.user_id,
            title: record.title,
            description: record.description,
            created_at: record.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConceptCreate {
    pub title: String,
    pub summary: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConceptResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: ConceptId,
    #[schema(value_type = String, format = "uuid")]
    pub user_id: UserId,
    pub title: String,
    pub summary: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<ConceptRecord> for ConceptResponse {
    fn from(record: ConceptRecord) -> Self {
        Self {
            id: record.id,
            user_id: record.user_id,
            title: record.title,
            summary: record.summary,
            image_url: record.image_url,
            created_at: record.created_at,
        }
    }
}
