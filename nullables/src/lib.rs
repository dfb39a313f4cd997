//! Nullable infrastructure for deterministic testing.
//!
//! Every external dependency of the claim workflow (clock, randomness,
//! storage, DNS, mail, notifications) sits behind a trait. This crate
//! provides test-friendly implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the filesystem or network
//! - Record what they were asked to do
//!
//! Usage: swap real implementations for nullables in tests.

pub mod clock;
pub mod mail;
pub mod notifier;
pub mod random;
pub mod resolver;
pub mod store;

pub use clock::NullClock;
pub use mail::{NullMailer, SentMail};
pub use notifier::NullNotifier;
pub use random::NullCodeGenerator;
pub use resolver::NullResolver;
pub use store::NullStore;

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lock a mutex, recovering the data if a panicking test poisoned it.
pub(crate) fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}
