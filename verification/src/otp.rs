//! Email one-time code proof.

use listwise_crypto::constant_time_eq;
use listwise_types::Timestamp;

use crate::VerificationError;

/// A code is honoured for 15 minutes after it was sent.
pub const DEFAULT_OTP_TTL_SECS: u64 = 15 * 60;

#[derive(Clone, Copy, Debug)]
pub struct EmailOtpVerifier {
    ttl_secs: u64,
}

impl Default for EmailOtpVerifier {
    fn default() -> Self {
        Self::new(DEFAULT_OTP_TTL_SECS)
    }
}

impl EmailOtpVerifier {
    pub fn new(ttl_secs: u64) -> Self {
        Self { ttl_secs }
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    /// Check a submitted code.
    ///
    /// Expiry is tested first: a stale code is rejected even when it matches.
    /// A code sent exactly `ttl_secs` ago is still valid. Surrounding
    /// whitespace in the submission is ignored.
    pub fn check(
        &self,
        stored: Option<&str>,
        submitted: &str,
        last_sent_at: Timestamp,
        now: Timestamp,
    ) -> Result<(), VerificationError> {
        if last_sent_at.elapsed_since(now) > self.ttl_secs {
            return Err(VerificationError::CodeExpired);
        }
        match stored {
            Some(code) if constant_time_eq(code, submitted.trim()) => Ok(()),
            _ => Err(VerificationError::InvalidCode),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SENT: Timestamp = Timestamp::new(1_000_000);

    #[test]
    fn valid_until_the_last_second() {
        let v = EmailOtpVerifier::default();
        let at_limit = SENT.plus_secs(15 * 60);
        assert_eq!(v.check(Some("482931"), "482931", SENT, at_limit), Ok(()));
    }

    #[test]
    fn expired_one_second_later_even_if_correct() {
        let v = EmailOtpVerifier::default();
        let past = SENT.plus_secs(15 * 60 + 1);
        assert_eq!(
            v.check(Some("482931"), "482931", SENT, past),
            Err(VerificationError::CodeExpired)
        );
    }

    #[test]
    fn mismatch_is_invalid() {
        let v = EmailOtpVerifier::default();
        assert_eq!(
            v.check(Some("482931"), "000000", SENT, SENT.plus_secs(30)),
            Err(VerificationError::InvalidCode)
        );
        assert_eq!(
            v.check(None, "482931", SENT, SENT.plus_secs(30)),
            Err(VerificationError::InvalidCode)
        );
    }

    #[test]
    fn submission_whitespace_is_trimmed() {
        let v = EmailOtpVerifier::default();
        assert_eq!(
            v.check(Some("482931"), " 482931\n", SENT, SENT.plus_secs(30)),
            Ok(())
        );
    }

    #[test]
    fn custom_ttl() {
        let v = EmailOtpVerifier::new(60);
        assert_eq!(
            v.check(Some("111111"), "111111", SENT, SENT.plus_secs(61)),
            Err(VerificationError::CodeExpired)
        );
    }
}
