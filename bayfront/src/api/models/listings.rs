//! API request/response models for marketplace listings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::pagination::Pagination;
use crate::moderation::ReviewStatus;
use crate::store::models::{ListingRecord, ProfileSummary};
use crate::types::{ListingId, UserId};

/// Payload for submitting a new listing.
///
/// Deliberately carries no review fields: the initial status and approval
/// timestamp are derived from the verified submitter role, never accepted
/// from the client.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ListingCreate {
    pub title: String,
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Price in the smallest currency unit
    pub price_cents: i64,
    pub preview_image_url: Option<String>,
    pub demo_url: Option<String>,
}

/// Payload for owner edits. Review fields are not editable here; those move
/// through the review actions.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ListingUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub price_cents: Option<i64>,
    pub preview_image_url: Option<String>,
    pub demo_url: Option<String>,
}

impl ListingUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.tags.is_none()
            && self.price_cents.is_none()
            && self.preview_image_url.is_none()
            && self.demo_url.is_none()
    }
}

/// A listing as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ListingResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: ListingId,
    #[schema(value_type = String, format = "uuid")]
    pub user_id: UserId,
    pub title: String,
    pub description: String,
    pub category: String,
    pub tags: Vec<String>,
    pub price_cents: i64,
    pub preview_image_url: Option<String>,
    pub demo_url: Option<String>,
    pub status: ReviewStatus,
    pub featured: bool,
    pub views: i64,
    pub downloads: i64,
    pub rating_avg: f64,
    pub rating_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
    pub featured_at: Option<DateTime<Utc>>,
    /// Owner summary for attribution cards
    pub seller: Option<SellerSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SellerSummary {
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

impl From<ProfileSummary> for SellerSummary {
    fn from(profile: ProfileSummary) -> Self {
        Self {
            display_name: profile.display_name,
            avatar_url: profile.avatar_url,
        }
    }
}

impl From<ListingRecord> for ListingResponse {
    fn from(record: ListingRecord) -> Self {
        Self {
            id: record.id,
            user_id: record.user_id,
            title: record.title,
            description: record.description,
            category: record.category,
            tags: record.tags,
            price_cents: record.price_cents,
            preview_image_url: record.preview_image_url,
            demo_url: record.demo_url,
            status: record.status,
            featured: record.featured,
            views: record.views,
            downloads: record.downloads,
            rating_avg: record.rating_avg,
            rating_count: record.rating_count,
            created_at: record.created_at,
            updated_at: record.updated_at,
            approved_at: record.approved_at,
            featured_at: record.featured_at,
            seller: record.profile.map(SellerSummary::from),
        }
    }
}

/// Query parameters for the marketplace listing endpoint.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListListingsQuery {
    /// Pagination parameters
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: Pagination,

    /// Include non-public listings (admin only)
    pub include_all: Option<bool>,

    /// Only the caller's own listings, every workflow state included
    pub mine: Option<bool>,

    /// Filter by category slug
    pub category: Option<String>,
}

/// Query parameters for the admin review queue.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ReviewQueueQuery {
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: Pagination,

    /// Workflow state to review (default: pending)
    pub status: Option<ReviewStatus>,
}
