//! Row structures matching the remote store collections.
//!
//! Each collection gets the same triple: a `*Record` (what the store
//! returns), a `*CreateStoreRequest` (what we insert) and, where updates exist,
//! a `*UpdateStoreRequest` with all-optional fields so the PATCH body only
//! carries what changed.

pub mod concepts;
pub mod ideas;
pub mod listings;
pub mod profiles;

pub use concepts::{ConceptCreateStoreRequest, ConceptRecord};
pub use ideas::{IdeaCreateStoreRequest, IdeaRecord};
pub use listings::{ListingCreateStoreRequest, ListingRecord, ListingUpdateStoreRequest, ProfileSummary};
pub use profiles::{ProfileRecord, ProfileUpdateStoreRequest};
