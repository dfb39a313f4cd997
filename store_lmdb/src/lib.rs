//! LMDB storage backend for Listwise.
//!
//! Implements all storage traits from `listwise-store` using the `heed` LMDB
//! bindings. Each logical store maps to one or more LMDB databases within a
//! single environment; values are `bincode`-encoded.
//!
//! LMDB admits one write transaction at a time, so every conditional write
//! (claim admission, moderation) reads and writes inside a single `RwTxn`
//! and is atomic with respect to concurrent requests.

pub mod business;
pub mod claim;
pub mod environment;
pub mod error;
mod keys;
pub mod meta;
pub mod notification;

pub use environment::LmdbEnvironment;
pub use error::LmdbError;
