//! Ownership claims and their method-specific proof.
//!
//! A claim carries two independent status fields:
//! - [`VerificationStatus`] — the outcome of the claimant's self-service proof.
//! - [`ClaimStatus`] — the moderator's decision, which alone transfers ownership.

use crate::{BusinessId, ClaimId, Timestamp, TypeError, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the claimant proves control of the business.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimMethod {
    /// An uploaded document, judged by a moderator.
    Document,
    /// A TXT record published on the business's domain.
    Dns,
    /// A one-time code mailed to an address at the business.
    Email,
}

impl ClaimMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Dns => "dns",
            Self::Email => "email",
        }
    }

    /// Whether the claimant can complete proof without a moderator.
    pub fn is_self_verifiable(&self) -> bool {
        matches!(self, Self::Dns | Self::Email)
    }
}

impl fmt::Display for ClaimMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClaimMethod {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "document" => Ok(Self::Document),
            "dns" => Ok(Self::Dns),
            "email" => Ok(Self::Email),
            other => Err(TypeError::UnknownMethod(other.to_string())),
        }
    }
}

/// Moderation outcome of a claim.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    Pending,
    Approved,
    Rejected,
}

impl ClaimStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Approved and rejected claims never change again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClaimStatus {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(TypeError::UnknownStatus(other.to_string())),
        }
    }
}

/// Outcome of the claimant's self-service proof.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Pending,
    Verified,
    /// The last attempt failed; the claimant may try again.
    Failed,
}

impl VerificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Verified => "verified",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A moderator's verdict on a claim.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
        }
    }

    /// The terminal claim status this decision produces.
    pub fn resulting_status(&self) -> ClaimStatus {
        match self {
            Self::Approve => ClaimStatus::Approved,
            Self::Reject => ClaimStatus::Rejected,
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Decision {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "approve" => Ok(Self::Approve),
            "reject" => Ok(Self::Reject),
            other => Err(TypeError::UnknownDecision(other.to_string())),
        }
    }
}

/// Method-specific proof material. Each variant carries only its own fields.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClaimProof {
    Document {
        /// Location of the uploaded artifact; storage is handled elsewhere.
        proof_url: String,
    },
    Dns {
        domain: String,
        /// Expected TXT record value, e.g. `verify=<32 hex chars>`.
        verification_token: String,
    },
    Email {
        email_address: String,
        /// The outstanding one-time code. `None` once consumed.
        otp_code: Option<String>,
        /// When the current code was dispatched.
        last_sent_at: Timestamp,
    },
}

impl ClaimProof {
    pub fn method(&self) -> ClaimMethod {
        match self {
            Self::Document { .. } => ClaimMethod::Document,
            Self::Dns { .. } => ClaimMethod::Dns,
            Self::Email { .. } => ClaimMethod::Email,
        }
    }
}

// Hand-written so one-time codes never end up in logs or panic messages.
impl fmt::Debug for ClaimProof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Document { proof_url } => f
                .debug_struct("Document")
                .field("proof_url", proof_url)
                .finish(),
            Self::Dns {
                domain,
                verification_token,
            } => f
                .debug_struct("Dns")
                .field("domain", domain)
                .field("verification_token", verification_token)
                .finish(),
            Self::Email {
                email_address,
                otp_code,
                last_sent_at,
            } => f
                .debug_struct("Email")
                .field("email_address", email_address)
                .field("otp_code", &otp_code.as_ref().map(|_| "<redacted>"))
                .field("last_sent_at", last_sent_at)
                .finish(),
        }
    }
}

/// A claim before the store has assigned it an id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClaimDraft {
    pub business_id: BusinessId,
    pub claimant_id: UserId,
    pub proof: ClaimProof,
    pub created_at: Timestamp,
}

impl ClaimDraft {
    pub fn into_claim(self, id: ClaimId) -> BusinessClaim {
        BusinessClaim {
            id,
            business_id: self.business_id,
            claimant_id: self.claimant_id,
            proof: self.proof,
            status: ClaimStatus::Pending,
            verification_status: VerificationStatus::Pending,
            last_failure: None,
            created_at: self.created_at,
            verified_at: None,
            decided_at: None,
            decided_by: None,
            revision: 0,
        }
    }
}

/// One attempt by a user to prove ownership of a business.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessClaim {
    pub id: ClaimId,
    pub business_id: BusinessId,
    pub claimant_id: UserId,
    pub proof: ClaimProof,
    pub status: ClaimStatus,
    pub verification_status: VerificationStatus,
    /// Reason for the most recent failed self-service attempt.
    pub last_failure: Option<String>,
    pub created_at: Timestamp,
    pub verified_at: Option<Timestamp>,
    pub decided_at: Option<Timestamp>,
    pub decided_by: Option<UserId>,
    /// Write counter kept by the store. An update must carry the revision it
    /// was read at; the store advances it on every write.
    pub revision: u64,
}

impl BusinessClaim {
    pub fn method(&self) -> ClaimMethod {
        self.proof.method()
    }

    pub fn is_pending(&self) -> bool {
        self.status == ClaimStatus::Pending
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn is_verified(&self) -> bool {
        self.verification_status == VerificationStatus::Verified
    }

    /// Whether a moderator may approve this claim.
    ///
    /// DNS and email claims must pass self-service proof first; document
    /// claims are judged from the artifact alone.
    pub fn ready_for_approval(&self) -> bool {
        !self.method().is_self_verifiable() || self.is_verified()
    }

    /// When the current one-time code was sent (email claims only).
    pub fn last_sent_at(&self) -> Option<Timestamp> {
        match &self.proof {
            ClaimProof::Email { last_sent_at, .. } => Some(*last_sent_at),
            _ => None,
        }
    }

    /// Record successful proof. For email claims the consumed code is dropped
    /// so that only the address remains.
    pub fn mark_verified(&mut self, now: Timestamp) {
        self.verification_status = VerificationStatus::Verified;
        self.verified_at = Some(now);
        self.last_failure = None;
        if let ClaimProof::Email { otp_code, .. } = &mut self.proof {
            *otp_code = None;
        }
    }

    /// Record a failed proof attempt. The claim stays open for retries.
    pub fn mark_failed(&mut self, reason: impl Into<String>) {
        self.verification_status = VerificationStatus::Failed;
        self.last_failure = Some(reason.into());
    }

    /// Replace the outstanding one-time code after a resend.
    pub fn refresh_code(&mut self, code: String, now: Timestamp) {
        if let ClaimProof::Email {
            otp_code,
            last_sent_at,
            ..
        } = &mut self.proof
        {
            *otp_code = Some(code);
            *last_sent_at = now;
        }
    }

    /// Apply a moderator decision. Callers must have checked the claim is not terminal.
    pub fn apply_decision(&mut self, decision: Decision, moderator: UserId, now: Timestamp) {
        self.status = decision.resulting_status();
        self.decided_at = Some(now);
        self.decided_by = Some(moderator);
    }
}
