//! Self-service ownership proof.
//!
//! Two of the three claim methods can be checked without a moderator:
//! 1. **DNS**: the claimant publishes a `verify=` token as a TXT record on
//!    the business's domain and [`DnsVerifier`] looks for it.
//! 2. **Email**: a six-digit code is mailed to an address at the business
//!    and [`EmailOtpVerifier`] checks the echoed value and its age.
//!
//! Document claims have no automated check; a moderator judges the artifact.
//!
//! Resolution goes through the [`TxtResolver`] seam so that tests and
//! alternative transports can stand in for [`DohResolver`].

pub mod dns;
pub mod error;
pub mod otp;
pub mod resolver;

pub use dns::{DnsVerifier, DEFAULT_DNS_TIMEOUT};
pub use error::VerificationError;
pub use otp::{EmailOtpVerifier, DEFAULT_OTP_TTL_SECS};
pub use resolver::{parse_txt_data, DohResolver, ResolveError, TxtResolver, TxtRecord};
