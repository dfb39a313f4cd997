use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerificationError {
    #[error("no TXT record on {domain} carries the verification token")]
    TokenNotFound { domain: String },

    #[error("DNS lookup for {domain} failed: {reason}")]
    DnsLookupFailed { domain: String, reason: String },

    #[error("verification code has expired")]
    CodeExpired,

    #[error("verification code does not match")]
    InvalidCode,
}

impl VerificationError {
    /// Whether the same proof may succeed on a later attempt.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::DnsLookupFailed { .. })
    }
}
