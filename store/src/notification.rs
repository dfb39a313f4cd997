//! Notification inbox storage trait.

use crate::StoreError;
use listwise_types::{NewNotification, Notification, NotificationId, Timestamp, UserId};

/// A push-style inbox with read/unread state, keyed by recipient.
pub trait NotificationStore {
    fn put_notification(
        &self,
        notification: NewNotification,
        now: Timestamp,
    ) -> Result<Notification, StoreError>;

    /// A user's notifications, newest first.
    fn notifications_for(
        &self,
        user: &UserId,
        unread_only: bool,
    ) -> Result<Vec<Notification>, StoreError>;

    /// Mark one of the user's notifications as read. Fails with `NotFound`
    /// when the id does not belong to `user`.
    fn mark_read(&self, user: &UserId, id: NotificationId) -> Result<Notification, StoreError>;
}
