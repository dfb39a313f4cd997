//! TXT record resolution.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

/// One TXT record: its character-strings in wire order.
pub type TxtRecord = Vec<String>;

/// DNS record type number for TXT.
const TXT_TYPE: u16 = 16;
/// RCODE values in DNS JSON responses.
const RCODE_NOERROR: u32 = 0;
const RCODE_SERVFAIL: u32 = 2;
const RCODE_NXDOMAIN: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("domain does not exist")]
    NxDomain,

    #[error("lookup timed out")]
    Timeout,

    #[error("server failure (rcode {0})")]
    ServerFailure(u32),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Looks up the TXT records published on a domain.
#[async_trait]
pub trait TxtResolver: Send + Sync {
    async fn resolve_txt(&self, domain: &str) -> Result<Vec<TxtRecord>, ResolveError>;
}

/// DNS-over-HTTPS resolver speaking the JSON API served by the public
/// resolvers (`application/dns-json`).
pub struct DohResolver {
    http: reqwest::Client,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct DohResponse {
    #[serde(rename = "Status")]
    status: u32,
    #[serde(rename = "Answer", default)]
    answer: Vec<DohAnswer>,
}

#[derive(Debug, Deserialize)]
struct DohAnswer {
    #[serde(rename = "type")]
    record_type: u16,
    data: String,
}

impl DohResolver {
    /// `endpoint` is the full query URL, e.g. `https://cloudflare-dns.com/dns-query`.
    /// `timeout` bounds the HTTP exchange; callers usually wrap lookups in
    /// their own deadline as well.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, ResolveError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ResolveError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl TxtResolver for DohResolver {
    async fn resolve_txt(&self, domain: &str) -> Result<Vec<TxtRecord>, ResolveError> {
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[("name", domain), ("type", "TXT")])
            .header(reqwest::header::ACCEPT, "application/dns-json")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ResolveError::Timeout
                } else {
                    ResolveError::Transport(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(ResolveError::Transport(format!(
                "resolver returned HTTP {}",
                response.status()
            )));
        }

        let body: DohResponse = response
            .json()
            .await
            .map_err(|e| ResolveError::Malformed(e.to_string()))?;

        records_from_response(body)
    }
}

fn records_from_response(body: DohResponse) -> Result<Vec<TxtRecord>, ResolveError> {
    match body.status {
        RCODE_NOERROR => Ok(body
            .answer
            .iter()
            .filter(|a| a.record_type == TXT_TYPE)
            .map(|a| parse_txt_data(&a.data))
            .collect()),
        RCODE_NXDOMAIN => Err(ResolveError::NxDomain),
        RCODE_SERVFAIL => Err(ResolveError::ServerFailure(RCODE_SERVFAIL)),
        other => Err(ResolveError::ServerFailure(other)),
    }
}

/// Split TXT presentation data (`"part one" "part two"`) into its
/// character-strings. Unquoted data is returned as a single string.
///
/// Inside quotes `\X` stands for `X` and `\DDD` for the byte with decimal
/// value `DDD`, as in RFC 1035 master files.
pub fn parse_txt_data(data: &str) -> TxtRecord {
    let trimmed = data.trim();
    if !trimmed.starts_with('"') {
        return vec![trimmed.to_string()];
    }

    let mut parts = Vec::new();
    let mut buf: Vec<u8> = Vec::new();
    let mut in_quote = false;
    let mut chars = trimmed.chars();
    while let Some(c) = chars.next() {
        match c {
            '"' if in_quote => {
                parts.push(String::from_utf8_lossy(&std::mem::take(&mut buf)).into_owned());
                in_quote = false;
            }
            '"' => in_quote = true,
            '\\' if in_quote => match decimal_escape(&mut chars) {
                Some(byte) => buf.push(byte),
                None => {
                    if let Some(escaped) = chars.next() {
                        push_char(&mut buf, escaped);
                    }
                }
            },
            c if in_quote => push_char(&mut buf, c),
            _ => {}
        }
    }
    // Tolerate a missing closing quote.
    if in_quote {
        parts.push(String::from_utf8_lossy(&buf).into_owned());
    }
    parts
}

/// Consume a `DDD` escape body if the next three characters are digits
/// forming a value up to 255.
fn decimal_escape(chars: &mut std::str::Chars<'_>) -> Option<u8> {
    let ahead: String = chars.clone().take(3).collect();
    if ahead.len() != 3 || !ahead.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let value: u8 = ahead.parse().ok()?;
    chars.nth(2);
    Some(value)
}

fn push_char(buf: &mut Vec<u8>, c: char) {
    let mut tmp = [0u8; 4];
    buf.extend_from_slice(c.encode_utf8(&mut tmp).as_bytes());
}
