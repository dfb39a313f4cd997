//! HTTP API for the Listwise claim workflow.
//!
//! Provides endpoints for:
//! - Filing, verifying and resending claims (claimants)
//! - Deciding claims, registering and vacating listings (moderators)
//! - Claim status and notification inboxes
//! - Liveness
//!
//! Identity comes from trusted headers set by the upstream session layer;
//! see [`identity`].

pub mod error;
pub mod handlers;
pub mod identity;
pub mod pagination;
pub mod server;

pub use error::RpcError;
pub use identity::Identity;
pub use server::{router, AppState, RpcServer};
