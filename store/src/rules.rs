//! Transition rules shared by every backend.
//!
//! Backends load the affected records inside their write transaction, run
//! these checks, and persist the mutated records before committing. Keeping
//! the rules here means the LMDB store and the in-memory test store cannot
//! drift apart.

use crate::StoreError;
use listwise_types::{
    Business, BusinessClaim, BusinessClaimStatus, ClaimDraft, ClaimId, Decision, Timestamp, UserId,
};

/// Check that a draft may be admitted against the current listing state.
///
/// `pending` is the id of an existing pending claim for the same
/// `(business, claimant)` pair, if the backend found one.
pub fn admit_claim(
    business: &Business,
    pending: Option<ClaimId>,
    draft: &ClaimDraft,
) -> Result<(), StoreError> {
    if business.is_owned() {
        return Err(StoreError::AlreadyOwned(business.id));
    }
    if let Some(existing) = pending {
        return Err(StoreError::Duplicate(format!(
            "{existing} is already pending for {} by {}",
            draft.business_id, draft.claimant_id
        )));
    }
    Ok(())
}

/// Check that `updated` is a legal self-service update of `stored`.
///
/// `updated` must have been read at the stored revision; anything else means
/// another write landed in between (`Stale`).
pub fn check_update(stored: &BusinessClaim, updated: &BusinessClaim) -> Result<(), StoreError> {
    if stored.is_terminal() {
        return Err(StoreError::AlreadyDecided(stored.id));
    }
    if updated.revision != stored.revision {
        return Err(StoreError::Stale(stored.id));
    }
    if updated.status != stored.status {
        return Err(StoreError::Conflict(format!(
            "{} status changes only through moderation",
            stored.id
        )));
    }
    if updated.business_id != stored.business_id
        || updated.claimant_id != stored.claimant_id
        || updated.method() != stored.method()
    {
        return Err(StoreError::Conflict(format!(
            "{} business, claimant and method are immutable",
            stored.id
        )));
    }
    Ok(())
}

/// Check an update and produce the record to persist, revision advanced.
pub fn prepare_update(
    stored: &BusinessClaim,
    updated: &BusinessClaim,
) -> Result<BusinessClaim, StoreError> {
    check_update(stored, updated)?;
    let mut next = updated.clone();
    next.revision = stored.revision + 1;
    Ok(next)
}

/// Apply a moderation decision to a claim and its listing.
///
/// Both records are only mutated once every check has passed.
pub fn apply_decision(
    claim: &mut BusinessClaim,
    business: &mut Business,
    decision: Decision,
    moderator: &UserId,
    now: Timestamp,
) -> Result<(), StoreError> {
    if claim.is_terminal() {
        return Err(StoreError::AlreadyDecided(claim.id));
    }
    match decision {
        Decision::Approve => {
            if !claim.ready_for_approval() {
                return Err(StoreError::NotVerified(claim.id));
            }
            if business.is_owned() {
                return Err(StoreError::AlreadyOwned(business.id));
            }
            claim.apply_decision(decision, moderator.clone(), now);
            business.owner_id = Some(claim.claimant_id.clone());
            business.claim_status = BusinessClaimStatus::Approved;
        }
        Decision::Reject => {
            claim.apply_decision(decision, moderator.clone(), now);
            // An owned listing keeps its approved state when a stale claim is turned down.
            if !business.is_owned() {
                business.claim_status = BusinessClaimStatus::Unclaimed;
            }
        }
    }
    claim.revision += 1;
    Ok(())
}
