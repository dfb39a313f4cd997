//! Notification sink for moderators and claimants.

use std::sync::Arc;

use async_trait::async_trait;
use listwise_store::NotificationStore;
use listwise_types::{Clock, NewNotification};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("notification delivery failed: {0}")]
pub struct NotifyError(pub String);

/// Delivers in-app notifications. Callers treat delivery as best-effort.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: NewNotification) -> Result<(), NotifyError>;
}

/// Writes notifications into a [`NotificationStore`] inbox.
pub struct StoreNotifier<S: ?Sized> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S: ?Sized> StoreNotifier<S> {
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }
}

#[async_trait]
impl<S> Notifier for StoreNotifier<S>
where
    S: NotificationStore + Send + Sync + ?Sized,
{
    async fn notify(&self, notification: NewNotification) -> Result<(), NotifyError> {
        let stored = self
            .store
            .put_notification(notification, self.clock.now())
            .map_err(|e| NotifyError(e.to_string()))?;
        tracing::debug!(
            notification_id = %stored.id,
            user_id = %stored.user_id,
            kind = %stored.kind,
            "notification stored"
        );
        Ok(())
    }
}
