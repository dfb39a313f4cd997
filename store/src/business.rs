//! Business listing storage trait.

use crate::StoreError;
use listwise_types::{Business, BusinessId, Timestamp};

/// Trait for business listing storage.
pub trait BusinessStore {
    /// Register a new, unclaimed listing under a freshly allocated id.
    fn create_business(&self, name: &str, now: Timestamp) -> Result<Business, StoreError>;

    fn get_business(&self, id: BusinessId) -> Result<Business, StoreError>;

    /// Clear the owner and reopen the listing for claims.
    fn vacate_ownership(&self, id: BusinessId) -> Result<Business, StoreError>;

    fn business_count(&self) -> Result<u64, StoreError>;
}
