//! One handle over the claim workflow, as the RPC layer sees it.

use std::sync::Arc;

use listwise_crypto::VerificationCodeGenerator;
use listwise_store::{BusinessStore, ClaimStore, ClaimsStore, NotificationStore, StoreError};
use listwise_types::{
    Business, BusinessClaim, BusinessId, ClaimId, ClaimMethod, ClaimProof, ClaimStatus, Clock,
    Decision, Notification, NotificationId, Timestamp, UserId, VerificationStatus,
};
use listwise_verification::{DnsVerifier, EmailOtpVerifier, TxtResolver};
use serde::Serialize;

use crate::error::from_store;
use crate::{
    ClaimError, ClaimModerationService, ClaimPolicy, ClaimRequestService,
    ClaimVerificationService, InitiatedClaim, Mailer, MethodData, Notifier, ResendReceipt,
};

/// External collaborators of the workflow.
#[derive(Clone)]
pub struct ClaimDeps {
    pub store: Arc<dyn ClaimsStore>,
    pub clock: Arc<dyn Clock>,
    pub codes: Arc<dyn VerificationCodeGenerator>,
    pub mailer: Arc<dyn Mailer>,
    pub notifier: Arc<dyn Notifier>,
    pub resolver: Arc<dyn TxtResolver>,
}

/// A claimant's view of their claim. Never carries the outstanding code.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ClaimView {
    pub claim_id: u64,
    pub business_id: u64,
    pub claimant_id: UserId,
    pub method: ClaimMethod,
    pub status: ClaimStatus,
    pub verification_status: VerificationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_failure: Option<String>,
    pub created_at: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified_at: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decided_at: Option<Timestamp>,
    /// Moderator who decided the claim.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decided_by: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
    /// Earliest time a new code may be requested (open email claims only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resend_available_at: Option<Timestamp>,
}

impl ClaimView {
    pub fn from_claim(claim: &BusinessClaim, resend_cooldown_secs: u64) -> Self {
        let (mut proof_url, mut domain, mut verification_token, mut email_address) =
            (None, None, None, None);
        let mut resend_available_at = None;
        match &claim.proof {
            ClaimProof::Document { proof_url: url } => proof_url = Some(url.clone()),
            ClaimProof::Dns {
                domain: d,
                verification_token: t,
            } => {
                domain = Some(d.clone());
                verification_token = Some(t.clone());
            }
            ClaimProof::Email {
                email_address: a,
                last_sent_at,
                ..
            } => {
                email_address = Some(a.clone());
                if claim.is_pending() && !claim.is_verified() {
                    resend_available_at = Some(last_sent_at.plus_secs(resend_cooldown_secs));
                }
            }
        }
        Self {
            claim_id: claim.id.get(),
            business_id: claim.business_id.get(),
            claimant_id: claim.claimant_id.clone(),
            method: claim.method(),
            status: claim.status,
            verification_status: claim.verification_status,
            last_failure: claim.last_failure.clone(),
            created_at: claim.created_at,
            verified_at: claim.verified_at,
            decided_at: claim.decided_at,
            decided_by: claim.decided_by.clone(),
            proof_url,
            domain,
            verification_token,
            email_address,
            resend_available_at,
        }
    }
}

pub struct ClaimService {
    store: Arc<dyn ClaimsStore>,
    clock: Arc<dyn Clock>,
    policy: ClaimPolicy,
    request: ClaimRequestService,
    verification: ClaimVerificationService,
    moderation: ClaimModerationService,
}

impl ClaimService {
    pub fn new(deps: ClaimDeps, policy: ClaimPolicy, moderators: Vec<UserId>) -> Self {
        let request = ClaimRequestService::new(
            deps.store.clone(),
            deps.clock.clone(),
            deps.codes.clone(),
            deps.mailer.clone(),
            deps.notifier.clone(),
            moderators,
            policy.mail_timeout(),
        );
        let verification = ClaimVerificationService::new(
            deps.store.clone(),
            deps.clock.clone(),
            deps.codes.clone(),
            deps.mailer.clone(),
            DnsVerifier::new(deps.resolver.clone(), policy.dns_timeout()),
            EmailOtpVerifier::new(policy.otp_ttl_secs),
            policy.resend_cooldown_secs,
            policy.mail_timeout(),
        );
        let moderation =
            ClaimModerationService::new(deps.store.clone(), deps.clock.clone(), deps.notifier);
        Self {
            store: deps.store,
            clock: deps.clock,
            policy,
            request,
            verification,
            moderation,
        }
    }

    pub fn policy(&self) -> &ClaimPolicy {
        &self.policy
    }

    pub fn register_business(&self, name: &str) -> Result<Business, ClaimError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ClaimError::InvalidInput("name must not be empty".into()));
        }
        let business = self
            .store
            .create_business(name, self.clock.now())
            .map_err(from_store)?;
        tracing::info!(business_id = %business.id, "business registered");
        Ok(business)
    }

    pub fn get_business(&self, id: BusinessId) -> Result<Business, ClaimError> {
        self.store.get_business(id).map_err(|e| match e {
            StoreError::NotFound(_) => ClaimError::BusinessNotFound(id),
            other => from_store(other),
        })
    }

    pub async fn initiate(
        &self,
        business_id: BusinessId,
        claimant: &UserId,
        data: MethodData,
    ) -> Result<InitiatedClaim, ClaimError> {
        self.request.initiate(business_id, claimant, data).await
    }

    pub async fn verify(
        &self,
        business_id: BusinessId,
        claimant: &UserId,
        submitted: &str,
    ) -> Result<BusinessClaim, ClaimError> {
        self.verification.verify(business_id, claimant, submitted).await
    }

    pub async fn resend(
        &self,
        business_id: BusinessId,
        claimant: &UserId,
    ) -> Result<ResendReceipt, ClaimError> {
        self.verification.resend(business_id, claimant).await
    }

    pub async fn decide(
        &self,
        claim_id: ClaimId,
        decision: Decision,
        moderator: &UserId,
    ) -> Result<Business, ClaimError> {
        self.moderation.decide(claim_id, decision, moderator).await
    }

    pub fn vacate(
        &self,
        business_id: BusinessId,
        moderator: &UserId,
    ) -> Result<Business, ClaimError> {
        self.moderation.vacate(business_id, moderator)
    }

    /// The claimant's most recent claim on a listing, whatever its status.
    pub fn claim_status(
        &self,
        business_id: BusinessId,
        claimant: &UserId,
    ) -> Result<ClaimView, ClaimError> {
        self.get_business(business_id)?;
        let claim = self
            .store
            .latest_claim(business_id, claimant)
            .map_err(from_store)?
            .ok_or(ClaimError::NoPendingClaim(business_id))?;
        Ok(ClaimView::from_claim(&claim, self.policy.resend_cooldown_secs))
    }

    pub fn list_claims(
        &self,
        status: Option<ClaimStatus>,
        offset: u64,
        limit: usize,
    ) -> Result<Vec<ClaimView>, ClaimError> {
        let claims = self
            .store
            .list_claims(status, offset, limit)
            .map_err(from_store)?;
        Ok(claims
            .iter()
            .map(|c| ClaimView::from_claim(c, self.policy.resend_cooldown_secs))
            .collect())
    }

    pub fn notifications(
        &self,
        user: &UserId,
        unread_only: bool,
    ) -> Result<Vec<Notification>, ClaimError> {
        self.store
            .notifications_for(user, unread_only)
            .map_err(from_store)
    }

    pub fn mark_notification_read(
        &self,
        user: &UserId,
        id: NotificationId,
    ) -> Result<Notification, ClaimError> {
        self.store.mark_read(user, id).map_err(|e| match e {
            StoreError::NotFound(_) => ClaimError::NotificationNotFound(id),
            other => from_store(other),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use listwise_types::ClaimDraft;

    fn email_claim() -> BusinessClaim {
        ClaimDraft {
            business_id: BusinessId::new(2),
            claimant_id: UserId::new("alice").unwrap(),
            proof: ClaimProof::Email {
                email_address: "owner@shop.example".into(),
                otp_code: Some("482931".into()),
                last_sent_at: Timestamp::new(1_000),
            },
            created_at: Timestamp::new(1_000),
        }
        .into_claim(ClaimId::new(7))
    }

    #[test]
    fn view_never_exposes_the_code() {
        let view = ClaimView::from_claim(&email_claim(), 60);
        let json = serde_json::to_string(&view).unwrap();
        assert!(!json.contains("482931"));
        assert_eq!(view.email_address.as_deref(), Some("owner@shop.example"));
        assert_eq!(view.resend_available_at, Some(Timestamp::new(1_060)));
        assert_eq!(view.claimant_id.as_str(), "alice");
        assert_eq!(view.decided_by, None);
    }

    #[test]
    fn decided_claim_names_its_moderator() {
        let mut claim = email_claim();
        claim.mark_verified(Timestamp::new(1_100));
        claim.apply_decision(
            Decision::Approve,
            UserId::new("mod-1").unwrap(),
            Timestamp::new(1_200),
        );
        let json = serde_json::to_value(ClaimView::from_claim(&claim, 60)).unwrap();
        assert_eq!(json["claimant_id"], "alice");
        assert_eq!(json["decided_by"], "mod-1");
        assert_eq!(json["status"], "approved");
    }

    #[test]
    fn verified_claim_has_no_resend_time() {
        let mut claim = email_claim();
        claim.mark_verified(Timestamp::new(1_100));
        let view = ClaimView::from_claim(&claim, 60);
        assert_eq!(view.resend_available_at, None);
        assert_eq!(view.verification_status, VerificationStatus::Verified);
    }
}
