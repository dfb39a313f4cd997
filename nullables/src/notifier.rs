//! Nullable notifier — record notifications without storing them.

use std::sync::Mutex;

use async_trait::async_trait;
use listwise_claims::{Notifier, NotifyError};
use listwise_types::NewNotification;

use crate::lock;

#[derive(Default)]
pub struct NullNotifier {
    delivered: Mutex<Vec<NewNotification>>,
    failing: Mutex<bool>,
}

impl NullNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent delivery fail.
    pub fn fail(&self) {
        *lock(&self.failing) = true;
    }

    pub fn delivered(&self) -> Vec<NewNotification> {
        lock(&self.delivered).clone()
    }
}

#[async_trait]
impl Notifier for NullNotifier {
    async fn notify(&self, notification: NewNotification) -> Result<(), NotifyError> {
        if *lock(&self.failing) {
            return Err(NotifyError("notifier unavailable".into()));
        }
        lock(&self.delivered).push(notification);
        Ok(())
    }
}
