//! Catalog service: cached reads and the mutation + invalidation protocol.
//!
//! Every read the marketplace UI depends on goes through the query cache with
//! a stable [`QueryKey`]; every mutation follows the same three steps:
//!
//! 1. issue the remote write,
//! 2. on success, invalidate every cache key whose result set could include
//!    the affected entity (the collection tag and the entity key, both),
//! 3. on failure, propagate the error unchanged - no retry, no invalidation.
//!
//! Invalidation strictly follows write acknowledgment, so readers never
//! observe a phantom invalidation without a corresponding durable write.
//!
//! The catalog is also where the review workflow is enforced: submission
//! status is derived from the verified caller (never from the request body),
//! and admin transitions are validated against the moderation table before
//! any PATCH leaves the process.

use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::api::models::ideas::{ConceptCreate, IdeaCreate};
use crate::api::models::listings::{ListingCreate, ListingUpdate};
use crate::api::models::profiles::ProfileUpdate;
use crate::api::models::users::CurrentUser;
use crate::cache::{QueryCache, QueryKey};
use crate::errors::{Error, Result};
use crate::moderation::{self, ReviewAction, ReviewStatus};
use crate::store::handlers::{Concepts, Ideas, IdeaFilter, ListingFilter, Listings, Profiles, Repository};
use crate::store::models::{
    ConceptCreateStoreRequest, ConceptRecord, IdeaCreateStoreRequest, IdeaRecord, ListingCreateStoreRequest, ListingRecord,
    ListingUpdateStoreRequest, ProfileRecord, ProfileUpdateStoreRequest,
};
use crate::store::{DataClient, StoreError};
use crate::types::{abbrev_uuid, ConceptId, IdeaId, ListingId, UserId};

/// Collection tag for marketplace listing result sets.
pub const WEBSITES_TAG: &str = "websites";
/// Entity tag for a single listing.
pub const WEBSITE_TAG: &str = "website";
pub const IDEAS_TAG: &str = "ideas";
pub const CONCEPTS_TAG: &str = "concepts";
pub const PROFILE_TAG: &str = "profile";

/// The catalog service. Cheap to clone; shared through `AppState`.
#[derive(Clone)]
pub struct Catalog {
    client: DataClient,
    cache: QueryCache,
}

impl Catalog {
    pub fn new(client: DataClient, cache: QueryCache) -> Self {
        Self { client, cache }
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// Key for a marketplace collection read.
    fn listings_key(include_all: bool, category: Option<&str>, skip: i64, limit: i64) -> QueryKey {
        QueryKey::with_params(
            WEBSITES_TAG,
            json!({ "include_all": include_all, "category": category, "skip": skip, "limit": limit }),
        )
    }

    /// Key for a single-listing read.
    fn listing_key(id: ListingId) -> QueryKey {
        QueryKey::with_params(WEBSITE_TAG, json!({ "id": id }))
    }

    /// The default browse key the prefetch planner warms ahead of marketplace
    /// navigation.
    pub fn marketplace_key() -> QueryKey {
        Self::listings_key(false, None, 0, crate::api::models::pagination::DEFAULT_LIMIT)
    }

    /// Warm the default marketplace listing query.
    pub async fn prefetch_marketplace(&self) -> std::result::Result<(), Arc<StoreError>> {
        let client = self.client.clone();
        let filter = public_filter(None, 0, crate::api::models::pagination::DEFAULT_LIMIT);
        self.cache
            .prefetch(Self::marketplace_key(), move || async move {
                let rows = Listings::new(&client).list(&filter).await?;
                Ok(serde_json::to_value(rows)?)
            })
            .await
    }

    // ---- Listings ----

    /// Cached marketplace read. `include_all` callers see every workflow state;
    /// public callers see approved and featured listings only.
    #[instrument(skip(self))]
    pub async fn list_listings(&self, include_all: bool, category: Option<String>, skip: i64, limit: i64) -> Result<Vec<ListingRecord>> {
        let key = Self::listings_key(include_all, category.as_deref(), skip, limit);
        let client = self.client.clone();
        let value = self
            .cache
            .fetch(key, move || async move {
                let mut filter = ListingFilter::new(skip, limit);
                if !include_all {
                    filter = filter.with_statuses(vec![ReviewStatus::Approved, ReviewStatus::Featured]);
                }
                if let Some(category) = category {
                    filter = filter.with_category(category);
                }
                let rows = Listings::new(&client).list(&filter).await?;
                Ok(serde_json::to_value(rows)?)
            })
            .await
            .map_err(Error::Store)?;
        decode(value)
    }

    /// Cached read of one seller's own listings, every workflow state
    /// included: the seller dashboard shows pending and rejected submissions
    /// alongside live ones.
    #[instrument(skip(self, owner), fields(owner = %abbrev_uuid(&owner)))]
    pub async fn list_my_listings(&self, owner: UserId, skip: i64, limit: i64) -> Result<Vec<ListingRecord>> {
        let key = QueryKey::with_params(WEBSITES_TAG, json!({ "owner": owner, "skip": skip, "limit": limit }));
        let client = self.client.clone();
        let value = self
            .cache
            .fetch(key, move || async move {
                let filter = ListingFilter::new(skip, limit).with_owner(owner);
                let rows = Listings::new(&client).list(&filter).await?;
                Ok(serde_json::to_value(rows)?)
            })
            .await
            .map_err(Error::Store)?;
        decode(value)
    }

    /// Cached single-listing read.
    #[instrument(skip(self, id), fields(listing_id = %abbrev_uuid(&id)))]
    pub async fn get_listing(&self, id: ListingId) -> Result<ListingRecord> {
        let key = Self::listing_key(id);
        let client = self.client.clone();
        let value = self
            .cache
            .fetch(key, move || async move {
                let record = Listings::new(&client).get_by_id(id).await?.ok_or(StoreError::NotFound)?;
                Ok(serde_json::to_value(record)?)
            })
            .await
            .map_err(not_found_as("listing", id))?;
        decode(value)
    }

    /// Submit a new listing. The initial review state comes from the verified
    /// submitter role; see [`moderation::initial_review`].
    #[instrument(skip(self, user, create), fields(user_id = %user.id))]
    pub async fn create_listing(&self, user: &CurrentUser, create: ListingCreate) -> Result<ListingRecord> {
        let review = moderation::initial_review(user.is_admin(), chrono::Utc::now());
        let request = ListingCreateStoreRequest {
            user_id: user.id,
            title: create.title,
            description: create.description,
            category: create.category,
            tags: create.tags,
            price_cents: create.price_cents,
            preview_image_url: create.preview_image_url,
            demo_url: create.demo_url,
            status: review.status,
            approved_at: review.approved_at,
        };

        let record = Listings::new(&self.client).create(&request).await?;
        debug!(listing_id = %record.id, status = %record.status, "listing created");
        self.invalidate_listing(record.id);
        Ok(record)
    }

    /// Owner-or-admin edit of descriptive fields.
    #[instrument(skip(self, user, update), fields(user_id = %user.id))]
    pub async fn update_listing(&self, user: &CurrentUser, id: ListingId, update: ListingUpdate) -> Result<ListingRecord> {
        if update.is_empty() {
            return Err(Error::BadRequest {
                message: "update contains no fields".to_string(),
            });
        }

        let listings = Listings::new(&self.client);
        let existing = listings.get_by_id(id).await?.ok_or_else(|| Error::NotFound {
            resource: "listing".to_string(),
            id: id.to_string(),
        })?;
        ensure_owner_or_admin(user, existing.user_id, "update")?;

        let request = ListingUpdateStoreRequest {
            title: update.title,
            description: update.description,
            category: update.category,
            tags: update.tags,
            price_cents: update.price_cents,
            preview_image_url: update.preview_image_url,
            demo_url: update.demo_url,
            ..ListingUpdateStoreRequest::stamped(chrono::Utc::now())
        };

        let record = listings.update(id, &request).await?;
        self.invalidate_listing(id);
        Ok(record)
    }

    /// Owner-or-admin delete.
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn delete_listing(&self, user: &CurrentUser, id: ListingId) -> Result<()> {
        let listings = Listings::new(&self.client);
        let existing = listings.get_by_id(id).await?.ok_or_else(|| Error::NotFound {
            resource: "listing".to_string(),
            id: id.to_string(),
        })?;
        ensure_owner_or_admin(user, existing.user_id, "delete")?;

        listings.delete(id).await?;
        self.invalidate_listing(id);
        Ok(())
    }

    /// Apply a review quick action. The transition is validated against the
    /// moderation table before any write is issued; an invalid move costs no
    /// remote call.
    #[instrument(skip(self, id), fields(listing_id = %abbrev_uuid(&id)))]
    pub async fn transition_listing(&self, id: ListingId, action: ReviewAction) -> Result<ListingRecord> {
        let listings = Listings::new(&self.client);
        let existing = listings.get_by_id(id).await?.ok_or_else(|| Error::NotFound {
            resource: "listing".to_string(),
            id: id.to_string(),
        })?;

        let target = action.target();
        if !existing.status.can_transition(target) {
            return Err(Error::InvalidTransition {
                from: existing.status,
                to: target,
            });
        }

        let now = chrono::Utc::now();
        let mut request = ListingUpdateStoreRequest::stamped(now);
        request.status = Some(target);
        request.featured = Some(target == ReviewStatus::Featured);
        match action {
            ReviewAction::Approve => request.approved_at = Some(now),
            ReviewAction::Feature => request.featured_at = Some(now),
            _ => {}
        }

        let record = listings.update(id, &request).await?;
        debug!(listing_id = %id, from = %existing.status, to = %target, "review transition applied");
        self.invalidate_listing(id);
        Ok(record)
    }

    /// Admin review queue. Served straight from the store: moderators act on
    /// what they see, so this read must not be a stale snapshot.
    #[instrument(skip(self))]
    pub async fn review_queue(&self, status: ReviewStatus, skip: i64, limit: i64) -> Result<Vec<ListingRecord>> {
        let filter = ListingFilter::new(skip, limit).with_statuses(vec![status]);
        let rows = Listings::new(&self.client).list(&filter).await?;
        Ok(rows)
    }

    /// Best-effort view counter bump, detached from the calling request.
    /// Failures are logged and swallowed; a lost view is not worth a failed
    /// page load.
    pub fn record_view(&self, id: ListingId) {
        let client = self.client.clone();
        tokio::spawn(async move {
            if let Err(e) = Listings::new(&client).increment_views(id).await {
                debug!(listing_id = %id, "view counter increment failed: {e}");
            }
        });
    }

    /// Download counter bump. Unlike views this is an explicit client call, so
    /// failures surface.
    pub async fn record_download(&self, id: ListingId) -> Result<()> {
        Listings::new(&self.client).increment_downloads(id).await?;
        Ok(())
    }

    fn invalidate_listing(&self, id: ListingId) {
        self.cache.invalidate_tag(WEBSITES_TAG);
        self.cache.invalidate(&Self::listing_key(id));
    }

    // ---- Ideas ----

    #[instrument(skip(self))]
    pub async fn list_ideas(&self, skip: i64, limit: i64) -> Result<Vec<IdeaRecord>> {
        let key = QueryKey::with_params(IDEAS_TAG, json!({ "skip": skip, "limit": limit }));
        let client = self.client.clone();
        let value = self
            .cache
            .fetch(key, move || async move {
                let rows = Ideas::new(&client).list(&IdeaFilter { skip, limit }).await?;
                Ok(serde_json::to_value(rows)?)
            })
            .await
            .map_err(Error::Store)?;
        decode(value)
    }

    #[instrument(skip(self, user, create), fields(user_id = %user.id))]
    pub async fn create_idea(&self, user: &CurrentUser, create: IdeaCreate) -> Result<IdeaRecord> {
        let request = IdeaCreateStoreRequest {
            user_id: user.id,
            title: create.title,
            description: create.description,
        };
        let record = Ideas::new(&self.client).create(&request).await?;
        self.cache.invalidate_tag(IDEAS_TAG);
        Ok(record)
    }

    #[instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn delete_idea(&self, user: &CurrentUser, id: IdeaId) -> Result<()> {
        let ideas = Ideas::new(&self.client);
        let deleted = if user.is_admin() {
            ideas.delete(id).await?
        } else {
            ideas.delete_owned(id, user.id).await?
        };
        if !deleted {
            return Err(Error::NotFound {
                resource: "idea".to_string(),
                id: id.to_string(),
            });
        }
        self.cache.invalidate_tag(IDEAS_TAG);
        Ok(())
    }

    // ---- Concepts ----

    #[instrument(skip(self))]
    pub async fn list_concepts(&self, skip: i64, limit: i64) -> Result<Vec<ConceptRecord>> {
        let key = QueryKey::with_params(CONCEPTS_TAG, json!({ "skip": skip, "limit": limit }));
        let client = self.client.clone();
        let value = self
            .cache
            .fetch(key, move || async move {
                let rows = Concepts::new(&client).list(&IdeaFilter { skip, limit }).await?;
                Ok(serde_json::to_value(rows)?)
            })
            .await
            .map_err(Error::Store)?;
        decode(value)
    }

    #[instrument(skip(self, user, create), fields(user_id = %user.id))]
    pub async fn create_concept(&self, user: &CurrentUser, create: ConceptCreate) -> Result<ConceptRecord> {
        let request = ConceptCreateStoreRequest {
            user_id: user.id,
            title: create.title,
            summary: create.summary,
            image_url: create.image_url,
        };
        let record = Concepts::new(&self.client).create(&request).await?;
        self.cache.invalidate_tag(CONCEPTS_TAG);
        Ok(record)
    }

    #[instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn delete_concept(&self, user: &CurrentUser, id: ConceptId) -> Result<()> {
        let concepts = Concepts::new(&self.client);
        let deleted = if user.is_admin() {
            concepts.delete(id).await?
        } else {
            concepts.delete_owned(id, user.id).await?
        };
        if !deleted {
            return Err(Error::NotFound {
                resource: "concept".to_string(),
                id: id.to_string(),
            });
        }
        self.cache.invalidate_tag(CONCEPTS_TAG);
        Ok(())
    }

    // ---- Profiles ----

    #[instrument(skip(self))]
    pub async fn get_profile(&self, user_id: UserId) -> Result<ProfileRecord> {
        let key = QueryKey::with_params(PROFILE_TAG, json!({ "id": user_id }));
        let client = self.client.clone();
        let value = self
            .cache
            .fetch(key, move || async move {
                let record = Profiles::new(&client).get(user_id).await?.ok_or(StoreError::NotFound)?;
                Ok(serde_json::to_value(record)?)
            })
            .await
            .map_err(not_found_as("profile", user_id))?;
        decode(value)
    }

    /// Update the caller's own profile. Invalidates listing keys too: the
    /// denormalized seller summary embedded in listing reads just changed.
    #[instrument(skip(self, user, update), fields(user_id = %user.id))]
    pub async fn update_profile(&self, user: &CurrentUser, update: ProfileUpdate) -> Result<ProfileRecord> {
        if update.is_empty() {
            return Err(Error::BadRequest {
                message: "update contains no fields".to_string(),
            });
        }

        let request = ProfileUpdateStoreRequest {
            display_name: update.display_name,
            avatar_url: update.avatar_url,
            bio: update.bio,
            website_url: update.website_url,
            updated_at: chrono::Utc::now(),
        };
        let record = Profiles::new(&self.client).update(user.id, &request).await?;

        self.cache.invalidate(&QueryKey::with_params(PROFILE_TAG, json!({ "id": user.id })));
        self.cache.invalidate_tag(WEBSITES_TAG);
        self.cache.invalidate_tag(WEBSITE_TAG);
        Ok(record)
    }
}

fn public_filter(category: Option<String>, skip: i64, limit: i64) -> ListingFilter {
    let mut filter = ListingFilter::new(skip, limit).with_statuses(vec![ReviewStatus::Approved, ReviewStatus::Featured]);
    if let Some(category) = category {
        filter = filter.with_category(category);
    }
    filter
}

fn ensure_owner_or_admin(user: &CurrentUser, owner: UserId, action: &str) -> Result<()> {
    if user.id == owner || user.is_admin() {
        Ok(())
    } else {
        Err(Error::Forbidden {
            action: action.to_string(),
            resource: "listing".to_string(),
        })
    }
}

/// Deserialize a cached JSON snapshot into its typed form.
fn decode<T: DeserializeOwned>(value: Arc<Value>) -> Result<T> {
    serde_json::from_value((*value).clone()).map_err(|e| StoreError::from(e).into())
}

/// Contextualize a cached store failure: bare `NotFound` becomes a typed 404.
fn not_found_as(resource: &'static str, id: impl ToString) -> impl FnOnce(Arc<StoreError>) -> Error {
    let id = id.to_string();
    move |err| match err.as_ref() {
        StoreError::NotFound => Error::NotFound {
            resource: resource.to_string(),
            id,
        },
        _ => Error::Store(err),
    }
}
