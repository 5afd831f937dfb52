//! Repository for the `ideas` collection.

use async_trait::async_trait;

use crate::store::client::{DataClient, Order};
use crate::store::errors::Result;
use crate::store::models::{IdeaCreateStoreRequest, IdeaRecord};
use crate::types::{IdeaId, UserId};

use super::Repository;

const TABLE: &str = "ideas";

/// Filter for idea listings. Ideas are always served newest-first; only
/// pagination varies.
pub struct IdeaFilter {
    pub skip: i64,
    pub limit: i64,
}

pub struct Ideas<'a> {
    client: &'a DataClient,
}

impl<'a> Ideas<'a> {
    pub fn new(client: &'a DataClient) -> Self {
        Self { client }
    }

    /// Delete an idea only if it belongs to `owner`. Admin deletes go through
    /// the unrestricted trait method instead.
    pub async fn delete_owned(&self, id: IdeaId, owner: UserId) -> Result<bool> {
        self.client.from(TABLE).eq("id", id).eq("user_id", owner).delete().await
    }
}

#[async_trait]
impl Repository for Ideas<'_> {
    type CreateRequest = IdeaCreateStoreRequest;
    type Response = IdeaRecord;
    type Id = IdeaId;
    type Filter = IdeaFilter;

    async fn create(&self, request: &Self::CreateRequest) -> Result<Self::Response> {
        self.client.from(TABLE).insert(request).await
    }

    async fn get_by_id(&self, id: Self::Id) -> Result<Option<Self::Response>> {
        self.client.from(TABLE).eq("id", id).fetch_optional().await
    }

    async fn list(&self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        self.client
            .from(TABLE)
            .order("created_at", Order::Descending)
            .range(filter.skip, filter.limit)
            .fetch()
            .await
    }

    async fn delete(&self, id: Self::Id) -> Result<bool> {
        self.client.from(TABLE).eq("id", id).delete().await
    }
}
