//! One-time codes and DNS verification tokens.

use rand::rngs::OsRng;
use rand::{Rng, RngCore};

/// Smallest one-time code (six digits, no leading zero).
pub const OTP_MIN: u32 = 100_000;
/// Largest one-time code.
pub const OTP_MAX: u32 = 999_999;
/// Namespace prefix of every DNS verification token.
pub const DNS_TOKEN_PREFIX: &str = "verify=";
/// Random bytes behind each DNS token (128 bits).
const DNS_TOKEN_BYTES: usize = 16;

/// Produces the secrets a claimant must echo back to prove control.
pub trait VerificationCodeGenerator: Send + Sync {
    /// A six-digit numeric code, uniform over [`OTP_MIN`, `OTP_MAX`].
    fn generate_otp(&self) -> String;

    /// A `verify=`-prefixed token carrying at least 128 bits of entropy.
    fn generate_dns_token(&self) -> String;
}

/// Generator backed by the operating system CSPRNG.
#[derive(Clone, Copy, Debug, Default)]
pub struct OsCodeGenerator;

impl VerificationCodeGenerator for OsCodeGenerator {
    fn generate_otp(&self) -> String {
        generate_otp()
    }

    fn generate_dns_token(&self) -> String {
        generate_dns_token()
    }
}

/// Draw a six-digit one-time code from the OS CSPRNG.
pub fn generate_otp() -> String {
    let code: u32 = OsRng.gen_range(OTP_MIN..=OTP_MAX);
    code.to_string()
}

/// Draw a fresh DNS verification token from the OS CSPRNG.
pub fn generate_dns_token() -> String {
    let mut bytes = [0u8; DNS_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    format!("{DNS_TOKEN_PREFIX}{}", hex::encode(bytes))
}

/// Compare two secrets without short-circuiting on the first differing byte.
///
/// Length differences are not hidden; both codes and tokens have fixed lengths.
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
