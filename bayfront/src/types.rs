//! Common type definitions shared across the gateway.
//!
//! All entity identifiers are UUIDs assigned by the remote store. They are
//! wrapped in type aliases so signatures say which entity they refer to:
//!
//! - [`UserId`]: account identifier from the hosted auth service
//! - [`ListingId`]: website-template listing identifier
//! - [`IdeaId`] / [`ConceptId`]: community submission identifiers

use uuid::Uuid;

// Type aliases for IDs
pub type UserId = Uuid;
pub type ListingId = Uuid;
pub type IdeaId = Uuid;
pub type ConceptId = Uuid;

/// Abbreviate a UUID to its first 8 characters for more readable logs and traces
/// Example: "550e8400-e29b-41d4-a716-446655440000" -> "550e8400"
pub fn abbrev_uuid(uuid: &Uuid) -> String {
    uuid.to_string().chars().take(8).collect()
}
