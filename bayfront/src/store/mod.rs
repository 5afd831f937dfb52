//! Remote store layer: typed access to the hosted data service.
//!
//! All persisted entities live in the hosted backend; this tier holds only
//! transient, invalidatable copies. The layer is organized like a database
//! layer, with the wire client standing where a connection pool would be:
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  (API request handlers)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │   Catalog   │  (cached reads, mutation + invalidation protocol)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │Repositories │  (store::handlers - per-collection queries)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │ DataClient  │  (store::client - PostgREST-style REST calls)
//! └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`client`]: the HTTP client and fluent query builder
//! - [`handlers`]: repository implementations per collection
//! - [`models`]: record structures matching collection rows
//! - [`errors`]: store-specific error taxonomy

pub mod client;
pub mod errors;
pub mod handlers;
pub mod models;

pub use client::{DataClient, Order};
pub use errors::StoreError;
