//! LMDB implementation of NotificationStore.

use listwise_store::{NotificationStore, StoreError};
use listwise_types::{NewNotification, Notification, NotificationId, Timestamp, UserId};

use crate::environment::{encode, read, LmdbEnvironment};
use crate::keys::{inbox_key, inbox_prefix};
use crate::meta::Counter;
use crate::LmdbError;

impl NotificationStore for LmdbEnvironment {
    fn put_notification(
        &self,
        notification: NewNotification,
        now: Timestamp,
    ) -> Result<Notification, StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let id = NotificationId::new(self.next_id(&mut wtxn, Counter::Notification)?);
        let stored = Notification::from_new(id, notification, now);
        self.notifications_db
            .put(
                &mut wtxn,
                &inbox_key(&stored.user_id, id),
                &encode(&stored)?,
            )
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(stored)
    }

    fn notifications_for(
        &self,
        user: &UserId,
        unread_only: bool,
    ) -> Result<Vec<Notification>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let prefix = inbox_prefix(user);
        let mut out = Vec::new();
        for entry in self
            .notifications_db
            .rev_prefix_iter(&rtxn, &prefix)
            .map_err(LmdbError::from)?
        {
            let (_, bytes) = entry.map_err(LmdbError::from)?;
            let n: Notification = bincode::deserialize(bytes).map_err(LmdbError::from)?;
            if unread_only && n.read {
                continue;
            }
            out.push(n);
        }
        Ok(out)
    }

    fn mark_read(&self, user: &UserId, id: NotificationId) -> Result<Notification, StoreError> {
        let key = inbox_key(user, id);
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let mut n: Notification = read(self.notifications_db, &wtxn, &key)?
            .ok_or_else(|| StoreError::NotFound(format!("{id} for {user}")))?;
        if !n.read {
            n.read = true;
            self.notifications_db
                .put(&mut wtxn, &key, &encode(&n)?)
                .map_err(LmdbError::from)?;
        }
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(n)
    }
}
