//! Composite key layouts.

use listwise_types::{BusinessId, NotificationId, UserId};

/// `business_id (8 BE bytes) ++ claimant bytes`.
///
/// The business id is fixed-width, so no separator is needed.
pub(crate) fn pair_key(business: BusinessId, claimant: &UserId) -> Vec<u8> {
    let c = claimant.as_str().as_bytes();
    let mut key = Vec::with_capacity(8 + c.len());
    key.extend_from_slice(&business.to_key());
    key.extend_from_slice(c);
    key
}

/// `len(user) (2 BE bytes) ++ user bytes`.
///
/// The length prefix stops one user's inbox from being a key prefix of
/// another's (e.g. `bob` and `bobby`).
pub(crate) fn inbox_prefix(user: &UserId) -> Vec<u8> {
    let u = user.as_str().as_bytes();
    let mut key = Vec::with_capacity(2 + u.len() + 8);
    key.extend_from_slice(&(u.len() as u16).to_be_bytes());
    key.extend_from_slice(u);
    key
}

/// `inbox_prefix(user) ++ notification_id (8 BE bytes)`.
pub(crate) fn inbox_key(user: &UserId, id: NotificationId) -> Vec<u8> {
    let mut key = inbox_prefix(user);
    key.extend_from_slice(&id.to_key());
    key
}
