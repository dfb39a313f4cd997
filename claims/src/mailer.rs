//! Outbound email transport for verification codes.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MailError {
    #[error("no mail transport is configured")]
    Unconfigured,

    #[error("mail API answered HTTP {0}")]
    Rejected(u16),

    #[error("mail transport error: {0}")]
    Transport(String),
}

/// Delivers one-time codes to claimants.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_verification_email(&self, address: &str, code: &str) -> Result<(), MailError>;
}

/// Posts messages as JSON to an HTTP mail API.
pub struct HttpMailer {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    from: String,
    code_ttl_secs: u64,
}

#[derive(Serialize)]
struct OutgoingMail<'a> {
    to: &'a str,
    from: &'a str,
    subject: &'a str,
    text: String,
}

impl HttpMailer {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        from: impl Into<String>,
        code_ttl_secs: u64,
        timeout: Duration,
    ) -> Result<Self, MailError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MailError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
            api_key,
            from: from.into(),
            code_ttl_secs,
        })
    }

    fn body(&self, code: &str) -> String {
        format!(
            "Your business verification code is {code}.\n\n\
             It expires in {} minutes. If you did not request it, ignore this message.",
            self.code_ttl_secs / 60
        )
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send_verification_email(&self, address: &str, code: &str) -> Result<(), MailError> {
        let mail = OutgoingMail {
            to: address,
            from: &self.from,
            subject: "Your business verification code",
            text: self.body(code),
        };
        let mut request = self.http.post(&self.endpoint).json(&mail);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        let response = request
            .send()
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;
        if !response.status().is_success() {
            return Err(MailError::Rejected(response.status().as_u16()));
        }
        tracing::debug!(to = address, "verification email accepted");
        Ok(())
    }
}

/// Stand-in used when no mail endpoint is configured: every send fails, so
/// email claims are refused rather than filed without a code on its way.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnconfiguredMailer;

#[async_trait]
impl Mailer for UnconfiguredMailer {
    async fn send_verification_email(&self, _address: &str, _code: &str) -> Result<(), MailError> {
        Err(MailError::Unconfigured)
    }
}
