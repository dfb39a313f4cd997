//! Business-ownership claim workflow.
//!
//! A user proves control of a listing through one of three channels
//! (uploaded document, DNS TXT record, emailed one-time code), and a
//! moderator grants or denies ownership:
//! - [`ClaimRequestService`] files a claim and dispatches its proof material.
//! - [`ClaimVerificationService`] checks self-service proof and resends codes.
//! - [`ClaimModerationService`] is the only path that transfers ownership.
//!
//! [`ClaimService`] bundles the three behind one handle for the RPC layer.
//! Every external collaborator (store, clock, mail, DNS, notifications) is
//! injected as a trait object so tests can swap in deterministic doubles.

pub mod config;
pub mod error;
pub mod mailer;
pub mod moderation;
pub mod notifier;
pub mod request;
pub mod service;
pub mod shutdown;
pub mod validate;
pub mod verify;

pub use config::{ClaimPolicy, ConfigError, DnsConfig, MailConfig, ServiceConfig};
pub use error::{ClaimError, ErrorClass};
pub use mailer::{HttpMailer, MailError, Mailer, UnconfiguredMailer};
pub use moderation::ClaimModerationService;
pub use notifier::{Notifier, NotifyError, StoreNotifier};
pub use request::{ClaimRequestService, DnsInstructions, InitiatedClaim, MethodData};
pub use service::{ClaimDeps, ClaimService, ClaimView};
pub use shutdown::ShutdownController;
pub use verify::{ClaimVerificationService, ResendReceipt};
