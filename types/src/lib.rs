//! Fundamental types for Listwise.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! identifiers, timestamps and the clock seam, business listings, ownership
//! claims with their method-specific proof, and claimant/moderator notifications.

pub mod business;
pub mod claim;
pub mod error;
pub mod ids;
pub mod notification;
pub mod time;

pub use business::{Business, BusinessClaimStatus};
pub use claim::{
    BusinessClaim, ClaimDraft, ClaimMethod, ClaimProof, ClaimStatus, Decision, VerificationStatus,
};
pub use error::TypeError;
pub use ids::{BusinessId, ClaimId, NotificationId, UserId};
pub use notification::{NewNotification, Notification, NotificationKind};
pub use time::{Clock, SystemClock, Timestamp};
