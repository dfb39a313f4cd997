//! Nullable DNS resolver — canned TXT answers.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use listwise_verification::{ResolveError, TxtRecord, TxtResolver};

use crate::lock;

/// Answers TXT lookups from a table instead of the network.
///
/// Unknown domains resolve to no records. A configured delay is applied
/// before answering, which lets tests exercise lookup deadlines under
/// tokio's paused clock.
#[derive(Default)]
pub struct NullResolver {
    answers: Mutex<HashMap<String, Result<Vec<TxtRecord>, ResolveError>>>,
    delay: Mutex<Option<Duration>>,
    lookups: Mutex<Vec<String>>,
}

impl NullResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish TXT records for `domain`, one record per entry, each holding
    /// a single character-string.
    pub fn set_txt(&self, domain: &str, records: &[&str]) {
        let records = records.iter().map(|r| vec![r.to_string()]).collect();
        lock(&self.answers).insert(domain.to_string(), Ok(records));
    }

    /// Publish TXT records with explicit character-string splits.
    pub fn set_records(&self, domain: &str, records: Vec<TxtRecord>) {
        lock(&self.answers).insert(domain.to_string(), Ok(records));
    }

    pub fn fail(&self, domain: &str, error: ResolveError) {
        lock(&self.answers).insert(domain.to_string(), Err(error));
    }

    pub fn delay(&self, delay: Duration) {
        *lock(&self.delay) = Some(delay);
    }

    /// Domains looked up so far, in order.
    pub fn lookups(&self) -> Vec<String> {
        lock(&self.lookups).clone()
    }
}

#[async_trait]
impl TxtResolver for NullResolver {
    async fn resolve_txt(&self, domain: &str) -> Result<Vec<TxtRecord>, ResolveError> {
        lock(&self.lookups).push(domain.to_string());
        let delay = *lock(&self.delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        lock(&self.answers)
            .get(domain)
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}
