//! Nullable mailer — record messages without sending them.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use listwise_claims::{MailError, Mailer};

use crate::lock;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SentMail {
    pub to: String,
    pub code: String,
}

/// A test mailer that records messages instead of sending them.
#[derive(Default)]
pub struct NullMailer {
    sent: Mutex<Vec<SentMail>>,
    failure: Mutex<Option<MailError>>,
    delay: Mutex<Option<Duration>>,
}

impl NullMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent send fail with `error`.
    pub fn fail_with(&self, error: MailError) {
        *lock(&self.failure) = Some(error);
    }

    /// Let sends succeed again.
    pub fn recover(&self) {
        *lock(&self.failure) = None;
    }

    /// Stall each send before answering.
    pub fn delay(&self, delay: Duration) {
        *lock(&self.delay) = Some(delay);
    }

    pub fn sent(&self) -> Vec<SentMail> {
        lock(&self.sent).clone()
    }

    /// The code in the most recent message.
    pub fn last_code(&self) -> Option<String> {
        lock(&self.sent).last().map(|m| m.code.clone())
    }
}

#[async_trait]
impl Mailer for NullMailer {
    async fn send_verification_email(&self, address: &str, code: &str) -> Result<(), MailError> {
        let delay = *lock(&self.delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(error) = lock(&self.failure).clone() {
            return Err(error);
        }
        lock(&self.sent).push(SentMail {
            to: address.to_string(),
            code: code.to_string(),
        });
        Ok(())
    }
}
