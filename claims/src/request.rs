//! Filing new ownership claims.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use listwise_crypto::VerificationCodeGenerator;
use listwise_store::{BusinessStore, ClaimStore, ClaimsStore, StoreError};
use listwise_types::{
    Business, BusinessClaim, BusinessId, ClaimDraft, ClaimMethod, ClaimProof, Clock,
    NewNotification, NotificationKind, UserId,
};
use serde::{Deserialize, Serialize};

use crate::error::from_store;
use crate::{validate, ClaimError, Mailer, Notifier};

/// Claimant-supplied data for each method.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum MethodData {
    Document { proof_url: String },
    Dns { domain: String },
    Email { email_address: String },
}

impl MethodData {
    pub fn method(&self) -> ClaimMethod {
        match self {
            Self::Document { .. } => ClaimMethod::Document,
            Self::Dns { .. } => ClaimMethod::Dns,
            Self::Email { .. } => ClaimMethod::Email,
        }
    }
}

/// What the claimant must publish for a DNS claim.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsInstructions {
    pub record_name: String,
    pub record_type: String,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InitiatedClaim {
    pub claim: BusinessClaim,
    /// Present for DNS claims only.
    pub dns_instructions: Option<DnsInstructions>,
}

pub struct ClaimRequestService {
    store: Arc<dyn ClaimsStore>,
    clock: Arc<dyn Clock>,
    codes: Arc<dyn VerificationCodeGenerator>,
    mailer: Arc<dyn Mailer>,
    notifier: Arc<dyn Notifier>,
    moderators: Vec<UserId>,
    mail_timeout: Duration,
}

impl ClaimRequestService {
    pub fn new(
        store: Arc<dyn ClaimsStore>,
        clock: Arc<dyn Clock>,
        codes: Arc<dyn VerificationCodeGenerator>,
        mailer: Arc<dyn Mailer>,
        notifier: Arc<dyn Notifier>,
        moderators: Vec<UserId>,
        mail_timeout: Duration,
    ) -> Self {
        Self {
            store,
            clock,
            codes,
            mailer,
            notifier,
            moderators,
            mail_timeout,
        }
    }

    /// File a claim on `business_id` for `claimant`.
    ///
    /// Checks run in order and the first failure wins: the listing exists
    /// and is unowned, the claimant has no pending claim on it, then the
    /// method data is well formed. Email claims dispatch their code before
    /// anything is stored, so a delivery failure leaves no trace. The store
    /// repeats the first two checks inside its write.
    pub async fn initiate(
        &self,
        business_id: BusinessId,
        claimant: &UserId,
        data: MethodData,
    ) -> Result<InitiatedClaim, ClaimError> {
        let business = self.store.get_business(business_id).map_err(|e| match e {
            StoreError::NotFound(_) => ClaimError::BusinessNotFound(business_id),
            other => from_store(other),
        })?;
        if business.is_owned() {
            return Err(ClaimError::AlreadyOwned(business_id));
        }
        if self
            .store
            .pending_claim(business_id, claimant)
            .map_err(from_store)?
            .is_some()
        {
            return Err(ClaimError::DuplicatePendingClaim(business_id));
        }

        let now = self.clock.now();
        let (proof, dns_instructions) = match data {
            MethodData::Document { proof_url } => {
                let proof_url = validate::proof_url(&proof_url).map_err(ClaimError::InvalidInput)?;
                (ClaimProof::Document { proof_url }, None)
            }
            MethodData::Dns { domain } => {
                let domain = validate::domain(&domain).map_err(ClaimError::InvalidInput)?;
                let token = self.codes.generate_dns_token();
                let instructions = DnsInstructions {
                    record_name: domain.clone(),
                    record_type: "TXT".to_string(),
                    value: token.clone(),
                };
                (
                    ClaimProof::Dns {
                        domain,
                        verification_token: token,
                    },
                    Some(instructions),
                )
            }
            MethodData::Email { email_address } => {
                let email_address =
                    validate::email(&email_address).map_err(ClaimError::InvalidInput)?;
                let code = self.codes.generate_otp();
                self.dispatch_code(&email_address, &code).await?;
                (
                    ClaimProof::Email {
                        email_address,
                        otp_code: Some(code),
                        last_sent_at: now,
                    },
                    None,
                )
            }
        };

        let draft = ClaimDraft {
            business_id,
            claimant_id: claimant.clone(),
            proof,
            created_at: now,
        };
        let claim = self.store.create_claim(draft).map_err(|e| match e {
            StoreError::NotFound(_) => ClaimError::BusinessNotFound(business_id),
            StoreError::Duplicate(_) => ClaimError::DuplicatePendingClaim(business_id),
            other => from_store(other),
        })?;

        tracing::info!(
            claim_id = %claim.id,
            business_id = %business_id,
            claimant_id = %claimant,
            method = %claim.method(),
            "claim filed"
        );

        self.alert_moderators(&business, &claim).await;

        Ok(InitiatedClaim {
            claim,
            dns_instructions,
        })
    }

    async fn dispatch_code(&self, address: &str, code: &str) -> Result<(), ClaimError> {
        send_code(self.mailer.as_ref(), self.mail_timeout, address, code).await
    }

    async fn alert_moderators(&self, business: &Business, claim: &BusinessClaim) {
        for moderator in &self.moderators {
            let mut metadata = BTreeMap::new();
            metadata.insert("claim_id".to_string(), claim.id.get().to_string());
            metadata.insert("business_id".to_string(), business.id.get().to_string());
            metadata.insert("claimant_id".to_string(), claim.claimant_id.to_string());
            metadata.insert("method".to_string(), claim.method().to_string());
            let notification = NewNotification {
                user_id: moderator.clone(),
                kind: NotificationKind::ClaimSubmitted,
                title: "New ownership claim".to_string(),
                message: format!(
                    "{} filed a {} claim for {}",
                    claim.claimant_id,
                    claim.method(),
                    business.name
                ),
                link: format!("/admin/claims/{}", claim.id.get()),
                metadata,
            };
            if let Err(e) = self.notifier.notify(notification).await {
                tracing::warn!(
                    claim_id = %claim.id,
                    moderator = %moderator,
                    error = %e,
                    "failed to alert moderator"
                );
            }
        }
    }
}

/// Send a verification code within `timeout`. Any failure, including the
/// deadline passing, is a retryable delivery error.
pub(crate) async fn send_code(
    mailer: &dyn Mailer,
    timeout: Duration,
    address: &str,
    code: &str,
) -> Result<(), ClaimError> {
    match tokio::time::timeout(timeout, mailer.send_verification_email(address, code)).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => {
            tracing::warn!(to = address, error = %e, "verification email failed");
            Err(ClaimError::NotificationDeliveryFailed(e.to_string()))
        }
        Err(_) => {
            tracing::warn!(
                to = address,
                timeout_ms = timeout.as_millis() as u64,
                "verification email timed out"
            );
            Err(ClaimError::NotificationDeliveryFailed(format!(
                "mail transport did not answer within {}s",
                timeout.as_secs()
            )))
        }
    }
}
