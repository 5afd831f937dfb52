//! Repository for the `concepts` collection. Mirrors [`super::Ideas`]; the
//! collections share their lifecycle (insert with server-assigned owner, list
//! newest-first, owner-or-admin delete).

use async_trait::async_trait;

use crate::store::client::{DataClient, Order};
use crate::store::errors::Result;
use crate::store::models::{ConceptCreateStoreRequest, ConceptRecord};
use crate::types::{ConceptId, UserId};

use super::ideas::IdeaFilter;
use super::Repository;

const TABLE: &str = "concepts";

pub struct Concepts<'a> {
    client: &'a DataClient,
}

impl<'a> Concepts<'a> {
    pub fn new(client: &'a DataClient) -> Self {
        Self { client }
    }

    pub async fn delete_owned(&self, id: ConceptId, owner: UserId) -> Result<bool> {
        self.client.from(TABLE).eq("id", id).eq("user_id", owner).delete().await
    }
}

#[async_trait]
impl Repository for Concepts<'_> {
    type CreateRequest = ConceptCreateStoreRequest;
    type Response = ConceptRecord;
    type Id = ConceptId;
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
