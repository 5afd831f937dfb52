//! API models for the authenticated user.
//!
//! Bayfront has no user table of its own; accounts live in the hosted auth
//! service and arrive here as verified JWT claims. [`CurrentUser`] is the
//! in-process view of those claims.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::types::UserId;

/// Platform role carried in the hosted-auth token's app metadata.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Administrator,
    Standard,
}

/// The authenticated caller, decoded from a verified access token.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CurrentUser {
    #[schema(value_type = String, format = "uuid")]
    pub id: UserId,
    pub email: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub role: Role,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Administrator
    }
}
