//! DNS TXT ownership proof.

use std::sync::Arc;
use std::time::Duration;

use crate::resolver::{ResolveError, TxtRecord, TxtResolver};
use crate::VerificationError;

pub const DEFAULT_DNS_TIMEOUT: Duration = Duration::from_secs(5);

/// Checks that a domain publishes an expected verification token.
///
/// A record matches when the token equals one of its character-strings, or
/// the concatenation of all of them (long values are split across strings
/// by some DNS providers). Comparison is exact and case-sensitive.
#[derive(Clone)]
pub struct DnsVerifier {
    resolver: Arc<dyn TxtResolver>,
    timeout: Duration,
}

impl DnsVerifier {
    pub fn new(resolver: Arc<dyn TxtResolver>, timeout: Duration) -> Self {
        Self { resolver, timeout }
    }

    pub async fn check(&self, domain: &str, expected_token: &str) -> Result<(), VerificationError> {
        let lookup = tokio::time::timeout(self.timeout, self.resolver.resolve_txt(domain));
        let records = match lookup.await {
            Ok(Ok(records)) => records,
            // NXDOMAIN included: only a clean answer without the token is a proof failure.
            Ok(Err(e)) => {
                tracing::warn!(domain, error = %e, "TXT lookup failed");
                return Err(VerificationError::DnsLookupFailed {
                    domain: domain.to_string(),
                    reason: e.to_string(),
                });
            }
            Err(_) => {
                tracing::warn!(
                    domain,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "TXT lookup timed out"
                );
                return Err(VerificationError::DnsLookupFailed {
                    domain: domain.to_string(),
                    reason: ResolveError::Timeout.to_string(),
                });
            }
        };

        if records.iter().any(|r| record_matches(r, expected_token)) {
            Ok(())
        } else {
            tracing::debug!(domain, records = records.len(), "no TXT record matched");
            Err(VerificationError::TokenNotFound {
                domain: domain.to_string(),
            })
        }
    }
}

fn record_matches(record: &TxtRecord, token: &str) -> bool {
    record.iter().any(|s| s == token) || record.concat() == token
}
