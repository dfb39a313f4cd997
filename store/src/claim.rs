//! Claim storage trait.

use crate::StoreError;
use listwise_types::{
    Business, BusinessClaim, BusinessId, ClaimDraft, ClaimId, ClaimStatus, Decision, Timestamp,
    UserId,
};

/// The claim and listing as they stand after a moderation decision.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecisionRecord {
    pub claim: BusinessClaim,
    pub business: Business,
}

/// Trait for claim storage operations.
pub trait ClaimStore {
    /// Persist a new pending claim and advance the listing to `Pending`, as
    /// one atomic write.
    ///
    /// Inside that write the backend re-checks, in order:
    /// 1. the business exists (`NotFound`) and has no owner (`AlreadyOwned`);
    /// 2. no pending claim exists for `(business, claimant)` (`Duplicate`).
    fn create_claim(&self, draft: ClaimDraft) -> Result<BusinessClaim, StoreError>;

    fn get_claim(&self, id: ClaimId) -> Result<BusinessClaim, StoreError>;

    /// The pending claim for `(business, claimant)`, if any.
    fn pending_claim(
        &self,
        business: BusinessId,
        claimant: &UserId,
    ) -> Result<Option<BusinessClaim>, StoreError>;

    /// The most recently filed claim for `(business, claimant)`, whatever its status.
    fn latest_claim(
        &self,
        business: BusinessId,
        claimant: &UserId,
    ) -> Result<Option<BusinessClaim>, StoreError>;

    /// Write back proof/verification changes to a claim that is still pending,
    /// returning the stored record with its revision advanced.
    ///
    /// Fails with `AlreadyDecided` if the stored claim has become terminal,
    /// with `Stale` if it was written since `claim` was read, and with
    /// `Conflict` if an immutable field differs.
    fn update_pending_claim(&self, claim: &BusinessClaim) -> Result<BusinessClaim, StoreError>;

    /// Apply a moderation decision, as one atomic write.
    ///
    /// Approval requires the claim to be pending (`AlreadyDecided`), ready
    /// for approval (`NotVerified`) and the business to still be unowned
    /// (`AlreadyOwned`). Rejection requires only that the claim is pending.
    fn decide_claim(
        &self,
        id: ClaimId,
        decision: Decision,
        moderator: &UserId,
        now: Timestamp,
    ) -> Result<DecisionRecord, StoreError>;

    /// Claims ordered by id, optionally filtered by status.
    fn list_claims(
        &self,
        status: Option<ClaimStatus>,
        offset: u64,
        limit: usize,
    ) -> Result<Vec<BusinessClaim>, StoreError>;
}
