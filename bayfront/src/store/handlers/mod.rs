//! Repository implementations for the remote store collections.
//!
//! A repository is a typed data access layer for one collection of the hosted
//! data service. Repositories own the column selections, filter encoding and
//! RPC names for their collection; nothing else in the crate builds raw
//! queries.
//!
//! The [`Repository`] trait covers the operations every owned collection
//! supports (create, get, list, delete). Updates are inherent methods on the
//! repositories that support them - the `ideas` and `concepts` collections are
//! append-and-delete only.

use async_trait::async_trait;

use super::errors::Result;

pub mod concepts;
pub mod ideas;
pub mod listings;
pub mod profiles;

pub use concepts::Concepts;
pub use ideas::{IdeaFilter, Ideas};
pub use listings::{ListingFilter, Listings};
pub use profiles::Profiles;

/// Base repository trait providing common collection operations.
#[async_trait]
pub trait Repository {
    /// The request type for creating entities
    type CreateRequest: Send + Sync;

    /// The response/record type returned by operations
    type Response;

    /// The identifier type for lookups
    type Id: Send + Sync;

    /// The filter type for list operations
    type Filter: Send + Sync;

    /// Create a new entity
    async fn create(&self, request: &Self::CreateRequest) -> Result<Self::Response>;

    /// Get an entity by ID
    async fn get_by_id(&self, id: Self::Id) -> Result<Option<Self::Response>>;

    /// List entities with filtering and pagination
    async fn list(&self, filter: &Self::Filter) -> Result<Vec<Self::Response>>;

    /// Delete an entity by ID, returning whether it existed
    async fn delete(&self, id: Self::Id) -> Result<bool>;
}
