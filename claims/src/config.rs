//! Service configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use listwise_types::UserId;
use listwise_utils::LogFormat;
use listwise_verification::DEFAULT_OTP_TTL_SECS;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("invalid config: {0}")]
    Parse(String),

    #[error("invalid moderator id {0:?}")]
    Moderator(String),
}

/// Configuration for the Listwise claim service.
///
/// Can be loaded from a TOML file via [`ServiceConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Data directory for LMDB storage.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// LMDB map size in bytes.
    #[serde(default = "default_map_size")]
    pub map_size: usize,

    /// HTTP API port.
    #[serde(default = "default_rpc_port")]
    pub rpc_port: u16,

    /// Log format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Users who receive new-claim alerts.
    #[serde(default)]
    pub moderators: Vec<String>,

    #[serde(default)]
    pub policy: ClaimPolicy,

    #[serde(default)]
    pub dns: DnsConfig,

    #[serde(default)]
    pub mail: MailConfig,
}

/// Timing rules of the claim workflow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimPolicy {
    /// How long an emailed code stays valid.
    #[serde(default = "default_otp_ttl_secs")]
    pub otp_ttl_secs: u64,

    /// Minimum gap between two code dispatches for the same claim.
    #[serde(default = "default_resend_cooldown_secs")]
    pub resend_cooldown_secs: u64,

    #[serde(default = "default_dns_timeout_secs")]
    pub dns_timeout_secs: u64,

    #[serde(default = "default_mail_timeout_secs")]
    pub mail_timeout_secs: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsConfig {
    /// DNS-over-HTTPS JSON endpoint.
    #[serde(default = "default_doh_endpoint")]
    pub doh_endpoint: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailConfig {
    /// HTTP mail API endpoint. Email claims are refused when unset.
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Bearer token for the mail API.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_mail_from")]
    pub from: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_data_dir() -> PathBuf {
    PathBuf::from("./listwise_data")
}

fn default_map_size() -> usize {
    1 << 30
}

fn default_rpc_port() -> u16 {
    7480
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_otp_ttl_secs() -> u64 {
    DEFAULT_OTP_TTL_SECS
}

fn default_resend_cooldown_secs() -> u64 {
    60
}

fn default_dns_timeout_secs() -> u64 {
    5
}

fn default_mail_timeout_secs() -> u64 {
    10
}

fn default_doh_endpoint() -> String {
    "https://cloudflare-dns.com/dns-query".to_string()
}

fn default_mail_from() -> String {
    "no-reply@listwise.local".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl ServiceConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Parse the configured moderator ids.
    pub fn moderator_ids(&self) -> Result<Vec<UserId>, ConfigError> {
        self.moderators
            .iter()
            .map(|m| UserId::new(m).map_err(|_| ConfigError::Moderator(m.clone())))
            .collect()
    }
}

impl ClaimPolicy {
    pub fn dns_timeout(&self) -> Duration {
        Duration::from_secs(self.dns_timeout_secs)
    }

    pub fn mail_timeout(&self) -> Duration {
        Duration::from_secs(self.mail_timeout_secs)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            map_size: default_map_size(),
            rpc_port: default_rpc_port(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            moderators: Vec::new(),
            policy: ClaimPolicy::default(),
            dns: DnsConfig::default(),
            mail: MailConfig::default(),
        }
    }
}

impl Default for ClaimPolicy {
    fn default() -> Self {
        Self {
            otp_ttl_secs: default_otp_ttl_secs(),
            resend_cooldown_secs: default_resend_cooldown_secs(),
            dns_timeout_secs: default_dns_timeout_secs(),
            mail_timeout_secs: default_mail_timeout_secs(),
        }
    }
}

impl Default for DnsConfig {
    fn default() -> Self {
        Self {
            doh_endpoint: default_doh_endpoint(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = ServiceConfig::default();
        let toml_str = config.to_toml_string().unwrap();
        let parsed = ServiceConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed.rpc_port, config.rpc_port);
        assert_eq!(parsed.policy, config.policy);
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = ServiceConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.rpc_port, 7480);
        assert_eq!(config.log_format, LogFormat::Human);
        assert_eq!(config.policy.otp_ttl_secs, 900);
        assert_eq!(config.policy.resend_cooldown_secs, 60);
        assert_eq!(config.policy.dns_timeout(), Duration::from_secs(5));
        assert_eq!(config.policy.mail_timeout(), Duration::from_secs(10));
        assert!(config.mail.endpoint.is_none());
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            rpc_port = 9999
            log_format = "json"
            moderators = ["mod-1", "mod-2"]

            [policy]
            resend_cooldown_secs = 120

            [mail]
            endpoint = "https://mail.example/send"
        "#;
        let config = ServiceConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.rpc_port, 9999);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.policy.resend_cooldown_secs, 120);
        assert_eq!(config.policy.otp_ttl_secs, 900);
        assert_eq!(config.moderator_ids().unwrap().len(), 2);
        assert_eq!(config.mail.from, "no-reply@listwise.local");
    }

    #[test]
    fn blank_moderator_is_rejected() {
        let config = ServiceConfig {
            moderators: vec!["  ".into()],
            ..ServiceConfig::default()
        };
        assert!(matches!(
            config.moderator_ids(),
            Err(ConfigError::Moderator(_))
        ));
    }

    #[test]
    fn missing_file_returns_read_error() {
        let result = ServiceConfig::from_toml_file("/nonexistent/listwise.toml");
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }
}
