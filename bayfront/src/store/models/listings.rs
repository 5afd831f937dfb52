//! Store records for the `websites` collection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::moderation::ReviewStatus;
use crate::types::{ListingId, UserId};

/// A listing row as returned by the store, including the embedded owner
/// profile summary when the query selects it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingRecord {
    pub id: ListingId,
    pub user_id: UserId,
    pub title: String,
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub price_cents: i64,
    pub preview_image_url: Option<String>,
    pub demo_url: Option<String>,
    pub status: ReviewStatus,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub views: i64,
    #[serde(default)]
    pub downloads: i64,
    #[serde(default)]
    pub rating_avg: f64,
    #[serde(default)]
    pub rating_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
    pub featured_at: Option<DateTime<Utc>>,
    /// Denormalized owner summary, embedded via `profile:profiles(...)`
    #[serde(default)]
    pub profile: Option<ProfileSummary>,
}

/// The slice of a profile embedded into listing reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

/// Insert payload for a new listing. The review fields are filled in by the
/// moderation derivation, not by API clients.
#[derive(Debug, Clone, Serialize)]
pub struct ListingCreateStoreRequest {
    pub user_id: UserId,
    pub title: String,
    pub description: String,
    pub category: String,
    pub tags: Vec<String>,
    pub price_cents: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub demo_url: Option<String>,
    pub status: ReviewStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<DateTime<Utc>>,
}

/// Partial update payload; only set fields land in the PATCH body.
#[derive(Debug, Clone, Serialize)]
pub struct ListingUpdateStoreRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_cents: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub demo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ReviewStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured_at: Option<DateTime<Utc>>,
    /// Always bumped on writes; the store has no update trigger for this column.
    pub updated_at: DateTime<Utc>,
}

impl ListingUpdateStoreRequest {
    /// An update that only touches `updated_at`, for composing with field setters.
    pub fn stamped(now: DateTime<Utc>) -> Self {
        Self {
            title: None,
            description: None,
            category: None,
            tags: None,
            price_cents: None,
            preview_image_url: None,
            demo_url: None,
            status: None,
            featured: None,
            approved_at: None,
            featured_at: None,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_body_omits_unset_fields() {
        let now = Utc::now();
        let update = ListingUpdateStoreRequest {
            title: Some("New title".to_string()),
            ..ListingUpdateStoreRequest::stamped(now)
        };
        let body = serde_json::to_value(&update).unwrap();
        let object = body.as_object().unwrap();
        assert_eq!(object.len(), 2, "only title and updated_at should serialize: {object:?}");
        assert!(object.contains_key("title"));
        assert!(object.contains_key("updated_at"));
    }

    #[test]
    fn test_listing_record_tolerates_missing_counters() {
        let raw = serde_json::json!({
            "id": "7b0e8f84-6f78-4b4e-a6a6-0c6f4f0f2c11",
            "user_id": "0d3cf5d9-9a1e-4a3c-94b2-2f6d6d2f3b22",
            "title": "Portfolio",
            "description": "A portfolio template",
            "category": "portfolio",
            "price_cents": 2900,
            "preview_image_url": null,
            "demo_url": null,
            "status": "pending",
            "created_at": "2026-01-04T10:00:00Z",
            "updated_at": "2026-01-04T10:00:00Z",
            "approved_at": null,
            "featured_at": null
        });
        let record: ListingRecord = serde_json::from_value(raw).unwrap();
        assert_eq!(record.views, 0);
        assert_eq!(record.rating_count, 0);
        assert!(record.profile.is_none());
    }
}
