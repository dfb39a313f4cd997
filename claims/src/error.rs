use listwise_store::StoreError;
use listwise_types::{BusinessId, ClaimId, ClaimMethod, NotificationId};
use listwise_verification::VerificationError;
use thiserror::Error;

/// Broad category of a [`ClaimError`], deciding how callers react.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorClass {
    /// The request is invalid for the current state. Never retried.
    Precondition,
    /// The submitted proof was wrong or stale. A new proof is needed.
    Proof,
    /// An external collaborator failed. Safe to retry now.
    Transient,
    /// Storage or another internal fault.
    Internal,
}

#[derive(Debug, Error)]
pub enum ClaimError {
    #[error("{0} does not exist")]
    BusinessNotFound(BusinessId),

    #[error("{0} does not exist")]
    ClaimNotFound(ClaimId),

    #[error("{0} already has an owner")]
    AlreadyOwned(BusinessId),

    #[error("{0} does not exist")]
    NotificationNotFound(NotificationId),

    #[error("a claim on {0} is already pending for this user")]
    DuplicatePendingClaim(BusinessId),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("no pending claim on {0} for this user")]
    NoPendingClaim(BusinessId),

    #[error("document claims are verified by a moderator")]
    MethodNotVerifiable,

    #[error("{0} has already been decided")]
    AlreadyDecided(ClaimId),

    #[error("{0} has not completed self-service verification")]
    NotVerified(ClaimId),

    #[error("{0} is already verified")]
    AlreadyVerified(ClaimId),

    #[error("{0} claims have no code to resend")]
    ResendUnsupported(ClaimMethod),

    #[error("a new code can be sent in {retry_after_secs}s")]
    ResendCooldown { retry_after_secs: u64 },

    #[error("DNS lookup for {domain} failed: {reason}")]
    DnsLookupFailed { domain: String, reason: String },

    #[error("could not deliver verification email: {0}")]
    NotificationDeliveryFailed(String),

    #[error("no TXT record on {domain} carries the verification token")]
    TokenNotFound { domain: String },

    #[error("verification code does not match")]
    InvalidCode,

    #[error("verification code has expired")]
    CodeExpired,

    #[error("{0} changed while this request was in flight; reload and retry")]
    ConcurrentUpdate(ClaimId),

    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}

impl ClaimError {
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::BusinessNotFound(_)
            | Self::ClaimNotFound(_)
            | Self::NotificationNotFound(_)
            | Self::AlreadyOwned(_)
            | Self::DuplicatePendingClaim(_)
            | Self::InvalidInput(_)
            | Self::NoPendingClaim(_)
            | Self::MethodNotVerifiable
            | Self::AlreadyDecided(_)
            | Self::NotVerified(_)
            | Self::AlreadyVerified(_)
            | Self::ResendUnsupported(_)
            | Self::ResendCooldown { .. } => ErrorClass::Precondition,
            Self::TokenNotFound { .. } | Self::InvalidCode | Self::CodeExpired => ErrorClass::Proof,
            Self::DnsLookupFailed { .. }
            | Self::NotificationDeliveryFailed(_)
            | Self::ConcurrentUpdate(_) => ErrorClass::Transient,
            Self::Storage(_) => ErrorClass::Internal,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.class() == ErrorClass::Transient
    }

    /// Stable machine-readable name, used in API error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Self::BusinessNotFound(_) => "business_not_found",
            Self::ClaimNotFound(_) => "claim_not_found",
            Self::NotificationNotFound(_) => "notification_not_found",
            Self::AlreadyOwned(_) => "already_owned",
            Self::DuplicatePendingClaim(_) => "duplicate_pending_claim",
            Self::InvalidInput(_) => "invalid_input",
            Self::NoPendingClaim(_) => "no_pending_claim",
            Self::MethodNotVerifiable => "method_not_verifiable",
            Self::AlreadyDecided(_) => "already_decided",
            Self::NotVerified(_) => "not_verified",
            Self::AlreadyVerified(_) => "already_verified",
            Self::ResendUnsupported(_) => "resend_unsupported",
            Self::ResendCooldown { .. } => "resend_cooldown",
            Self::DnsLookupFailed { .. } => "dns_lookup_failed",
            Self::NotificationDeliveryFailed(_) => "notification_delivery_failed",
            Self::TokenNotFound { .. } => "token_not_found",
            Self::InvalidCode => "invalid_code",
            Self::CodeExpired => "code_expired",
            Self::ConcurrentUpdate(_) => "concurrent_update",
            Self::Storage(_) => "internal",
        }
    }
}

impl From<VerificationError> for ClaimError {
    fn from(e: VerificationError) -> Self {
        match e {
            VerificationError::TokenNotFound { domain } => Self::TokenNotFound { domain },
            VerificationError::DnsLookupFailed { domain, reason } => {
                Self::DnsLookupFailed { domain, reason }
            }
            VerificationError::CodeExpired => Self::CodeExpired,
            VerificationError::InvalidCode => Self::InvalidCode,
        }
    }
}

/// Translate the store's conditional-write failures into workflow errors.
/// Plain `NotFound` is left to the caller, which knows what was missing.
pub(crate) fn from_store(e: StoreError) -> ClaimError {
    match e {
        StoreError::AlreadyOwned(id) => ClaimError::AlreadyOwned(id),
        StoreError::AlreadyDecided(id) => ClaimError::AlreadyDecided(id),
        StoreError::NotVerified(id) => ClaimError::NotVerified(id),
        StoreError::Stale(id) => ClaimError::ConcurrentUpdate(id),
        other => ClaimError::Storage(other),
    }
}
