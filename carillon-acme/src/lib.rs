//! # carillon-acme
//!
//! Certificate lifecycle for the relay node: account bootstrap, renewal-need
//! evaluation, issuance through a black-box ACME engine with scoped HTTP-01
//! challenge publication, and atomic alias-swap activation.
//!
//! The ACME wire protocol itself is not implemented here — embedders plug an
//! engine in through [`AcmeEngine`].

pub mod alias;
pub mod challenge;
pub mod engine;
pub mod error;
pub mod lifecycle;

pub use challenge::{with_challenge, ChallengeResponder};
pub use engine::{AcmeEngine, ChallengePublisher, EngineError};
pub use error::AcmeError;
pub use lifecycle::{
    certificate_paths, CertificateManager, NoReload, ProxyReload, RenewalOutcome,
    RENEWAL_THRESHOLD_DAYS,
};
