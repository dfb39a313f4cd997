//! In-app notifications delivered to moderators and claimants.

use crate::{NotificationId, Timestamp, UserId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Sent to moderators when a new claim is filed.
    ClaimSubmitted,
    /// Sent to the claimant when ownership is granted.
    ClaimApproved,
    /// Sent to the claimant when the claim is turned down.
    ClaimRejected,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ClaimSubmitted => "claim_submitted",
            Self::ClaimApproved => "claim_approved",
            Self::ClaimRejected => "claim_rejected",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A notification as handed to the delivery sink.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewNotification {
    pub user_id: UserId,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub link: String,
    pub metadata: BTreeMap<String, String>,
}

/// A stored inbox entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: UserId,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub link: String,
    pub metadata: BTreeMap<String, String>,
    pub read: bool,
    pub created_at: Timestamp,
}

impl Notification {
    pub fn from_new(id: NotificationId, new: NewNotification, created_at: Timestamp) -> Self {
        Self {
            id,
            user_id: new.user_id,
            kind: new.kind,
            title: new.title,
            message: new.message,
            link: new.link,
            metadata: new.metadata,
            read: false,
            created_at,
        }
    }
}
