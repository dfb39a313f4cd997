//! Business listings and their ownership state.

use crate::{BusinessId, Timestamp, TypeError, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Where a listing stands in the ownership-claim process.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusinessClaimStatus {
    /// No owner and no claim under review.
    Unclaimed,
    /// At least one claim has been filed and awaits moderation.
    Pending,
    /// A claim was approved; `owner_id` is set.
    Approved,
    /// A claim was rejected.
    Rejected,
}

impl BusinessClaimStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unclaimed => "unclaimed",
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for BusinessClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BusinessClaimStatus {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "unclaimed" => Ok(Self::Unclaimed),
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(TypeError::UnknownStatus(other.to_string())),
        }
    }
}

/// A business listing, reduced to the fields the claim workflow touches.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Business {
    pub id: BusinessId,
    /// Display name, used in moderator and claimant notifications.
    pub name: String,
    /// `None` means nobody owns the listing.
    pub owner_id: Option<UserId>,
    pub claim_status: BusinessClaimStatus,
    pub created_at: Timestamp,
}

impl Business {
    pub fn new(id: BusinessId, name: impl Into<String>, created_at: Timestamp) -> Self {
        Self {
            id,
            name: name.into(),
            owner_id: None,
            claim_status: BusinessClaimStatus::Unclaimed,
            created_at,
        }
    }

    pub fn is_owned(&self) -> bool {
        self.owner_id.is_some()
    }

    /// Move an ownerless listing into `Pending` once a claim is filed.
    /// Idempotent when it is already pending.
    pub fn mark_claim_pending(&mut self) {
        if !self.is_owned() {
            self.claim_status = BusinessClaimStatus::Pending;
        }
    }

    /// Clear ownership and reopen the listing for claims.
    pub fn vacate(&mut self) {
        self.owner_id = None;
        self.claim_status = BusinessClaimStatus::Unclaimed;
    }
}
