//! Repository for the `profiles` collection.
//!
//! Profile rows are created by the hosted backend when an account signs up, so
//! there is no create path here; this tier reads and updates only. The
//! repository trait doesn't apply.

use crate::store::client::DataClient;
use crate::store::errors::Result;
use crate::store::models::{ProfileRecord, ProfileUpdateStoreRequest};
use crate::types::UserId;

const TABLE: &str = "profiles";

pub struct Profiles<'a> {
    client: &'a DataClient,
}

impl<'a> Profiles<'a> {
    pub fn new(client: &'a DataClient) -> Self {
        Self { client }
    }

    pub async fn get(&self, user_id: UserId) -> Result<Option<ProfileRecord>> {
        self.client.from(TABLE).eq("id", user_id).fetch_optional().await
    }

    pub async fn update(&self, user_id: UserId, request: &ProfileUpdateStoreRequest) -> Result<ProfileRecord> {
        self.client.from(TABLE).eq("id", user_id).update(request).await
    }
}
