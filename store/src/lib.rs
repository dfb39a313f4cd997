//! Abstract storage traits for Listwise.
//!
//! Every storage backend (LMDB, in-memory for testing) implements these
//! traits. The rest of the codebase depends only on the traits.
//!
//! The two critical sections of the claim workflow live behind this seam:
//! [`ClaimStore::create_claim`] enforces one pending claim per
//! `(business, claimant)` pair, and [`ClaimStore::decide_claim`] transfers
//! ownership only while the business is still unowned. Backends must run
//! each of them as a single atomic write; the shared transition rules are in
//! [`rules`].

pub mod business;
pub mod claim;
pub mod error;
pub mod notification;
pub mod rules;

pub use business::BusinessStore;
pub use claim::{ClaimStore, DecisionRecord};
pub use error::StoreError;
pub use notification::NotificationStore;

/// Everything the claim services need from persistence, as one object.
pub trait ClaimsStore: BusinessStore + ClaimStore + NotificationStore + Send + Sync {}

impl<T> ClaimsStore for T where T: BusinessStore + ClaimStore + NotificationStore + Send + Sync {}
