//! Self-service proof and code resends.

use std::sync::Arc;
use std::time::Duration;

use listwise_crypto::VerificationCodeGenerator;
use listwise_store::{ClaimStore, ClaimsStore, StoreError};
use listwise_types::{BusinessClaim, BusinessId, ClaimProof, Clock, Timestamp, UserId};
use listwise_verification::{DnsVerifier, EmailOtpVerifier, VerificationError};
use serde::Serialize;

use crate::error::from_store;
use crate::request::send_code;
use crate::{ClaimError, Mailer};

/// Outcome of a successful resend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ResendReceipt {
    pub claim_id: u64,
    pub sent_at: Timestamp,
    /// Earliest time another code may be requested.
    pub next_resend_at: Timestamp,
    pub expires_at: Timestamp,
}

pub struct ClaimVerificationService {
    store: Arc<dyn ClaimsStore>,
    clock: Arc<dyn Clock>,
    codes: Arc<dyn VerificationCodeGenerator>,
    mailer: Arc<dyn Mailer>,
    dns: DnsVerifier,
    otp: EmailOtpVerifier,
    resend_cooldown_secs: u64,
    mail_timeout: Duration,
}

impl ClaimVerificationService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store: Arc<dyn ClaimsStore>,
        clock: Arc<dyn Clock>,
        codes: Arc<dyn VerificationCodeGenerator>,
        mailer: Arc<dyn Mailer>,
        dns: DnsVerifier,
        otp: EmailOtpVerifier,
        resend_cooldown_secs: u64,
        mail_timeout: Duration,
    ) -> Self {
        Self {
            store,
            clock,
            codes,
            mailer,
            dns,
            otp,
            resend_cooldown_secs,
            mail_timeout,
        }
    }

    fn load_pending(
        &self,
        business_id: BusinessId,
        claimant: &UserId,
    ) -> Result<BusinessClaim, ClaimError> {
        self.store
            .pending_claim(business_id, claimant)
            .map_err(from_store)?
            .ok_or(ClaimError::NoPendingClaim(business_id))
    }

    /// Check the claimant's proof for their pending claim on `business_id`.
    ///
    /// `submitted` is the emailed code for email claims and is ignored for
    /// DNS claims. Moderation status is never touched. A wrong or stale
    /// proof is recorded on the claim before the error is returned; a
    /// transient failure leaves the claim as it was.
    pub async fn verify(
        &self,
        business_id: BusinessId,
        claimant: &UserId,
        submitted: &str,
    ) -> Result<BusinessClaim, ClaimError> {
        let mut claim = self.load_pending(business_id, claimant)?;
        if claim.is_verified() {
            return Err(ClaimError::AlreadyVerified(claim.id));
        }

        let outcome = match &claim.proof {
            ClaimProof::Document { .. } => return Err(ClaimError::MethodNotVerifiable),
            ClaimProof::Dns {
                domain,
                verification_token,
            } => self.dns.check(domain, verification_token).await,
            ClaimProof::Email {
                otp_code,
                last_sent_at,
                ..
            } => self.otp.check(
                otp_code.as_deref(),
                submitted,
                *last_sent_at,
                self.clock.now(),
            ),
        };

        match outcome {
            Ok(()) => {
                claim.mark_verified(self.clock.now());
                let claim = self.store_update(&claim)?;
                tracing::info!(
                    claim_id = %claim.id,
                    business_id = %business_id,
                    method = %claim.method(),
                    "claim verified"
                );
                Ok(claim)
            }
            Err(e) if e.is_transient() => Err(e.into()),
            Err(e) => {
                claim.mark_failed(proof_failure_reason(&e));
                self.store_update(&claim)?;
                tracing::info!(
                    claim_id = %claim.id,
                    business_id = %business_id,
                    method = %claim.method(),
                    reason = %e,
                    "verification attempt failed"
                );
                Err(e.into())
            }
        }
    }

    /// Send a fresh code for a pending, unverified email claim.
    ///
    /// The previous code stays valid until the new one has been handed to
    /// the mail transport.
    pub async fn resend(
        &self,
        business_id: BusinessId,
        claimant: &UserId,
    ) -> Result<ResendReceipt, ClaimError> {
        let mut claim = self.load_pending(business_id, claimant)?;
        let (address, last_sent_at) = match &claim.proof {
            ClaimProof::Email {
                email_address,
                last_sent_at,
                ..
            } => (email_address.clone(), *last_sent_at),
            _ => return Err(ClaimError::ResendUnsupported(claim.method())),
        };
        if claim.is_verified() {
            return Err(ClaimError::AlreadyVerified(claim.id));
        }

        let now = self.clock.now();
        let elapsed = last_sent_at.elapsed_since(now);
        if elapsed < self.resend_cooldown_secs {
            return Err(ClaimError::ResendCooldown {
                retry_after_secs: self.resend_cooldown_secs - elapsed,
            });
        }

        let code = self.codes.generate_otp();
        send_code(self.mailer.as_ref(), self.mail_timeout, &address, &code).await?;

        claim.refresh_code(code, now);
        let claim = self.store_update(&claim)?;
        tracing::info!(claim_id = %claim.id, business_id = %business_id, "verification code resent");

        Ok(ResendReceipt {
            claim_id: claim.id.get(),
            sent_at: now,
            next_resend_at: now.plus_secs(self.resend_cooldown_secs),
            expires_at: now.plus_secs(self.otp.ttl_secs()),
        })
    }

    fn store_update(&self, claim: &BusinessClaim) -> Result<BusinessClaim, ClaimError> {
        self.store.update_pending_claim(claim).map_err(|e| match e {
            StoreError::NotFound(_) => ClaimError::ClaimNotFound(claim.id),
            other => from_store(other),
        })
    }
}

fn proof_failure_reason(e: &VerificationError) -> &'static str {
    match e {
        VerificationError::TokenNotFound { .. } => "token_not_found",
        VerificationError::InvalidCode => "invalid_code",
        VerificationError::CodeExpired => "code_expired",
        VerificationError::DnsLookupFailed { .. } => "dns_lookup_failed",
    }
}
