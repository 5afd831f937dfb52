//! Repository for the `websites` collection.

use async_trait::async_trait;
use serde_json::json;

use crate::moderation::ReviewStatus;
use crate::store::client::{DataClient, Order};
use crate::store::errors::Result;
use crate::store::models::{ListingCreateStoreRequest, ListingRecord, ListingUpdateStoreRequest};
use crate::types::{ListingId, UserId};

use super::Repository;

const TABLE: &str = "websites";

/// Columns for listing reads, with the owner profile summary embedded.
const LISTING_SELECT: &str = "*,profile:profiles(display_name,avatar_url)";

/// Filter for listing queries.
pub struct ListingFilter {
    statuses: Option<Vec<ReviewStatus>>,
    category: Option<String>,
    owner: Option<UserId>,
    featured_only: bool,
    skip: i64,
    limit: i64,
}

impl ListingFilter {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self {
            statuses: None,
            category: None,
            owner: None,
            featured_only: false,
            skip,
            limit,
        }
    }

    /// Restrict to listings in any of the given states.
    pub fn with_statuses(mut self, statuses: Vec<ReviewStatus>) -> Self {
        self.statuses = Some(statuses);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_owner(mut self, owner: UserId) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn featured_only(mut self) -> Self {
        self.featured_only = true;
        self
    }
}

/// Repository for listing records.
pub struct Listings<'a> {
    client: &'a DataClient,
}

impl<'a> Listings<'a> {
    pub fn new(client: &'a DataClient) -> Self {
        Self { client }
    }

    /// Update a listing. Callers are responsible for having validated any
    /// status change against the moderation transition table first.
    pub async fn update(&self, id: ListingId, request: &ListingUpdateStoreRequest) -> Result<ListingRecord> {
        self.client
            .from(TABLE)
            .eq("id", id)
            .select(LISTING_SELECT)
            .update(request)
            .await
    }

    /// Bump the view counter through the store-side function; a plain UPDATE
    /// would lose increments under concurrency.
    pub async fn increment_views(&self, id: ListingId) -> Result<()> {
        self.client.rpc("increment_listing_views", json!({ "listing_id": id })).await?;
        Ok(())
    }

    /// Bump the download counter through the store-side function.
    pub async fn increment_downloads(&self, id: ListingId) -> Result<()> {
        self.client
            .rpc("increment_listing_downloads", json!({ "listing_id": id }))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl Repository for Listings<'_> {
    type CreateRequest = ListingCreateStoreRequest;
    type Response = ListingRecord;
    type Id = ListingId;
    type Filter = ListingFilter;

    async fn create(&self, request: &Self::CreateRequest) -> Result<Self::Response> {
        self.client.from(TABLE).select(LISTING_SELECT).insert(request).await
    }

    async fn get_by_id(&self, id: Self::Id) -> Result<Option<Self::Response>> {
        self.client
            .from(TABLE)
            .select(LISTING_SELECT)
            .eq("id", id)
            .fetch_optional()
            .await
    }

    async fn list(&self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut query = self.client.from(TABLE).select(LISTING_SELECT);

        if let Some(statuses) = &filter.statuses {
            query = match statuses.as_slice() {
                [single] => query.eq("status", single),
                many => query.in_("status", many),
            };
        }
        if let Some(category) = &filter.category {
            query = query.eq("category", category);
        }
        if let Some(owner) = &filter.owner {
            query = query.eq("user_id", owner);
        }
        if filter.featured_only {
            query = query.eq("featured", true);
        }

        query
            .order("created_at", Order::Descending)
            .range(filter.skip, filter.limit)
            .fetch()
            .await
    }

    async fn delete(&self, id: Self::Id) -> Result<bool> {
        self.client.from(TABLE).eq("id", id).delete().await
    }
}
