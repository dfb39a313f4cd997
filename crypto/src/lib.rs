//! Secret generation for claim verification.
//!
//! - **One-time codes**: six decimal digits mailed to the claimant.
//! - **DNS tokens**: 128 random bits, hex encoded behind a fixed `verify=`
//!   namespace so operators can tell them apart from unrelated TXT records.
//!
//! Both draw from the operating system CSPRNG; nothing is derived from the
//! clock or from the claimant's identity.

pub mod codes;

pub use codes::{
    constant_time_eq, generate_dns_token, generate_otp, OsCodeGenerator,
    VerificationCodeGenerator, DNS_TOKEN_PREFIX, OTP_MAX, OTP_MIN,
};
