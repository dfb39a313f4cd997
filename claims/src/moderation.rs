//! The moderator gate: the only path that grants or denies ownership.

use std::collections::BTreeMap;
use std::sync::Arc;

use listwise_store::{BusinessStore, ClaimStore, ClaimsStore, DecisionRecord, StoreError};
use listwise_types::{
    Business, BusinessId, ClaimId, Clock, Decision, NewNotification, NotificationKind, UserId,
};

use crate::error::from_store;
use crate::{ClaimError, Notifier};

pub struct ClaimModerationService {
    store: Arc<dyn ClaimsStore>,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn Notifier>,
}

impl ClaimModerationService {
    pub fn new(
        store: Arc<dyn ClaimsStore>,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            store,
            clock,
            notifier,
        }
    }

    /// Approve or reject a pending claim and return the listing as it now
    /// stands.
    ///
    /// The claim update and the ownership change are one atomic store
    /// write. Approving requires a pending claim, completed self-service
    /// proof for DNS and email claims, and a listing that is still unowned;
    /// of two concurrent approvals for one listing exactly one succeeds.
    pub async fn decide(
        &self,
        claim_id: ClaimId,
        decision: Decision,
        moderator: &UserId,
    ) -> Result<Business, ClaimError> {
        let now = self.clock.now();
        let DecisionRecord { claim, business } = self
            .store
            .decide_claim(claim_id, decision, moderator, now)
            .map_err(|e| match e {
                StoreError::NotFound(_) => ClaimError::ClaimNotFound(claim_id),
                other => from_store(other),
            })?;

        tracing::info!(
            target: "audit",
            claim_id = %claim.id,
            business_id = %business.id,
            claimant_id = %claim.claimant_id,
            moderator_id = %moderator,
            method = %claim.method(),
            decision = %decision,
            owner_id = business.owner_id.as_ref().map(|o| o.as_str()).unwrap_or("-"),
            "claim decided"
        );

        let (kind, title, message) = match decision {
            Decision::Approve => (
                NotificationKind::ClaimApproved,
                "Ownership claim approved",
                format!("You are now the owner of {}.", business.name),
            ),
            Decision::Reject => (
                NotificationKind::ClaimRejected,
                "Ownership claim rejected",
                format!("Your claim for {} was not approved.", business.name),
            ),
        };
        let mut metadata = BTreeMap::new();
        metadata.insert("claim_id".to_string(), claim.id.get().to_string());
        metadata.insert("business_id".to_string(), business.id.get().to_string());
        metadata.insert("decision".to_string(), decision.to_string());
        let notification = NewNotification {
            user_id: claim.claimant_id.clone(),
            kind,
            title: title.to_string(),
            message,
            link: format!("/businesses/{}", business.id.get()),
            metadata,
        };
        if let Err(e) = self.notifier.notify(notification).await {
            tracing::warn!(claim_id = %claim.id, error = %e, "failed to notify claimant");
        }

        Ok(business)
    }

    /// Clear a listing's owner so it can be claimed again.
    pub fn vacate(
        &self,
        business_id: BusinessId,
        moderator: &UserId,
    ) -> Result<Business, ClaimError> {
        let previous = self
            .store
            .get_business(business_id)
            .map_err(|e| match e {
                StoreError::NotFound(_) => ClaimError::BusinessNotFound(business_id),
                other => from_store(other),
            })?
            .owner_id;
        let business = self.store.vacate_ownership(business_id).map_err(|e| match e {
            StoreError::NotFound(_) => ClaimError::BusinessNotFound(business_id),
            other => from_store(other),
        })?;
        tracing::info!(
            target: "audit",
            business_id = %business_id,
            moderator_id = %moderator,
            previous_owner = previous.as_ref().map(|o| o.as_str()).unwrap_or("-"),
            "ownership vacated"
        );
        Ok(business)
    }
}
