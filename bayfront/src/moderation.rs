//! Listing review workflow: submission status derivation and the moderation
//! state machine.
//!
//! The remote store keeps a `status` column on every listing; this module owns
//! the rules for what that column may be set to. Two entry points:
//!
//! - [`initial_review`]: what a freshly submitted listing starts as, derived
//!   from the *verified* role of the submitter - never from client input.
//! - [`ReviewStatus::can_transition`]: the transition table the admin review
//!   queue must pass before any update is sent to the store.
//!
//! Transitions are one-directional business events; the table is deliberately
//! small:
//!
//! ```text
//! pending  -> approved | rejected
//! approved <-> featured
//! any      -> archived
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Lifecycle state of a marketplace listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    Pending,
    Approved,
    Rejected,
    Featured,
    Archived,
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReviewStatus::Pending => "pending",
            ReviewStatus::Approved => "approved",
            ReviewStatus::Rejected => "rejected",
            ReviewStatus::Featured => "featured",
            ReviewStatus::Archived => "archived",
        };
        write!(f, "{s}")
    }
}

impl ReviewStatus {
    /// Whether the transition `self -> to` is allowed by the review workflow.
    ///
    /// Self-transitions are rejected; they would re-stamp timestamps without
    /// changing anything.
    pub fn can_transition(self, to: ReviewStatus) -> bool {
        use ReviewStatus::*;
        match (self, to) {
            (_, Archived) => self != Archived,
            (Pending, Approved) | (Pending, Rejected) => true,
            (Approved, Featured) | (Featured, Approved) => true,
            _ => false,
        }
    }

    /// Listings in these states can be bought.
    pub fn is_purchasable(self) -> bool {
        matches!(self, ReviewStatus::Approved | ReviewStatus::Featured)
    }

    /// Listings in these states appear in the public marketplace.
    pub fn is_public(self) -> bool {
        self.is_purchasable()
    }
}

/// Quick actions exposed to the admin review queue. Each maps to exactly one
/// target state; validity still depends on the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReviewAction {
    Approve,
    Reject,
    Feature,
    Unfeature,
    Archive,
}

impl ReviewAction {
    /// The state this action moves a listing into.
    pub fn target(self) -> ReviewStatus {
        match self {
            ReviewAction::Approve | ReviewAction::Unfeature => ReviewStatus::Approved,
            ReviewAction::Reject => ReviewStatus::Rejected,
            ReviewAction::Feature => ReviewStatus::Featured,
            ReviewAction::Archive => ReviewStatus::Archived,
        }
    }
}

/// Initial review state of a new submission.
#[derive(Debug, Clone, PartialEq)]
pub struct InitialReview {
    pub status: ReviewStatus,
    pub approved_at: Option<DateTime<Utc>>,
}

/// Derive the initial review state for a submission from the verified role of
/// the submitter.
///
/// Admin submissions go live immediately; everyone else queues for review.
/// This runs after authentication, on this side of the trust boundary - the
/// create request types carry no status field a client could set.
pub fn initial_review(is_submitter_admin: bool, now: DateTime<Utc>) -> InitialReview {
    if is_submitter_admin {
        InitialReview {
            status: ReviewStatus::Approved,
            approved_at: Some(now),
        }
    } else {
        InitialReview {
            status: ReviewStatus::Pending,
            approved_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_admin_submissions_queue_for_review() {
        let now = Utc::now();
        let review = initial_review(false, now);
        assert_eq!(review.status, ReviewStatus::Pending);
        assert!(review.approved_at.is_none());
    }

    #[test]
    fn test_admin_submissions_are_live_immediately() {
        let before = Utc::now();
        let review = initial_review(true, Utc::now());
        assert_eq!(review.status, ReviewStatus::Approved);
        let approved_at = review.approved_at.expect("admin submissions carry an approval timestamp");
        assert!(approved_at >= before);
    }

    #[test]
    fn test_pending_can_be_resolved_either_way() {
        assert!(ReviewStatus::Pending.can_transition(ReviewStatus::Approved));
        assert!(ReviewStatus::Pending.can_transition(ReviewStatus::Rejected));
        assert!(!ReviewStatus::Pending.can_transition(ReviewStatus::Featured));
    }

    #[test]
    fn test_featuring_is_reversible() {
        assert!(ReviewStatus::Approved.can_transition(ReviewStatus::Featured));
        assert!(ReviewStatus::Featured.can_transition(ReviewStatus::Approved));
    }

    #[test]
    fn test_rejected_listings_cannot_be_featured() {
        assert!(!ReviewStatus::Rejected.can_transition(ReviewStatus::Featured));
        assert!(!ReviewStatus::Rejected.can_transition(ReviewStatus::Approved));
    }

    #[test]
    fn test_anything_can_be_archived_once() {
        for status in [
            ReviewStatus::Pending,
            ReviewStatus::Approved,
            ReviewStatus::Rejected,
            ReviewStatus::Featured,
        ] {
            assert!(status.can_transition(ReviewStatus::Archived), "{status} -> archived");
        }
        assert!(!ReviewStatus::Archived.can_transition(ReviewStatus::Archived));
    }

    #[test]
    fn test_archived_is_terminal() {
        for status in [
            ReviewStatus::Pending,
            ReviewStatus::Approved,
            ReviewStatus::Rejected,
            ReviewStatus::Featured,
        ] {
            assert!(!ReviewStatus::Archived.can_transition(status), "archived -> {status}");
        }
    }

    #[test]
    fn test_no_self_transitions() {
        for status in [
            ReviewStatus::Pending,
            ReviewStatus::Approved,
            ReviewStatus::Rejected,
            ReviewStatus::Featured,
            ReviewStatus::Archived,
        ] {
            assert!(!status.can_transition(status), "{status} -> {status}");
        }
    }

    #[test]
    fn test_action_targets() {
        assert_eq!(ReviewAction::Approve.target(), ReviewStatus::Approved);
        assert_eq!(ReviewAction::Unfeature.target(), ReviewStatus::Approved);
        assert_eq!(ReviewAction::Reject.target(), ReviewStatus::Rejected);
        assert_eq!(ReviewAction::Feature.target(), ReviewStatus::Featured);
        assert_eq!(ReviewAction::Archive.target(), ReviewStatus::Archived);
    }

    #[test]
    fn test_status_serde_round_trip() {
        let json = serde_json::to_string(&ReviewStatus::Featured).unwrap();
        assert_eq!(json, "\"featured\"");
        let back: ReviewStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ReviewStatus::Featured);
    }
}
