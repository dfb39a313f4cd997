//! Nullable code generator — scripted secrets.

use std::collections::VecDeque;
use std::sync::Mutex;

use listwise_crypto::{VerificationCodeGenerator, DNS_TOKEN_PREFIX};

use crate::lock;

/// Hands out pre-configured codes and tokens in order.
///
/// When a queue runs dry it falls back to a predictable counter-based value
/// so tests never depend on the OS RNG.
pub struct NullCodeGenerator {
    otps: Mutex<VecDeque<String>>,
    tokens: Mutex<VecDeque<String>>,
    counter: Mutex<u32>,
}

impl NullCodeGenerator {
    pub fn new() -> Self {
        Self {
            otps: Mutex::new(VecDeque::new()),
            tokens: Mutex::new(VecDeque::new()),
            counter: Mutex::new(0),
        }
    }

    /// Queue the one-time codes to return, in order.
    pub fn with_otps<I, S>(self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        lock(&self.otps).extend(codes.into_iter().map(Into::into));
        self
    }

    /// Queue the DNS tokens to return, in order.
    pub fn with_dns_tokens<I, S>(self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        lock(&self.tokens).extend(tokens.into_iter().map(Into::into));
        self
    }

    fn next_counter(&self) -> u32 {
        let mut counter = lock(&self.counter);
        *counter += 1;
        *counter
    }
}

impl Default for NullCodeGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl VerificationCodeGenerator for NullCodeGenerator {
    fn generate_otp(&self) -> String {
        if let Some(code) = lock(&self.otps).pop_front() {
            return code;
        }
        format!("{:06}", 100_000 + self.next_counter())
    }

    fn generate_dns_token(&self) -> String {
        if let Some(token) = lock(&self.tokens).pop_front() {
            return token;
        }
        format!("{DNS_TOKEN_PREFIX}{:032x}", self.next_counter())
    }
}
