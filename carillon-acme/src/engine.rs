//! The external ACME engine seam.
//!
//! Account-key cryptography, JWS signing and the order/challenge/finalize
//! protocol live behind [`AcmeEngine`]; this crate only sequences the
//! lifecycle around it. Embedders supply an implementation backed by an ACME
//! client of their choice; tests supply fakes.

use thiserror::Error;

/// Opaque engine failure. The protocol layer's own error detail is carried
/// as text; the lifecycle never branches on it.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct EngineError(pub String);

impl EngineError {
    pub fn new(message: impl Into<String>) -> Self {
        EngineError(message.into())
    }
}

/// Callback the engine drives while negotiating HTTP-01 challenges.
///
/// The engine calls [`publish`](ChallengePublisher::publish) once per
/// challenge before asking the authority to validate it. Retraction is the
/// caller's responsibility (see [`crate::challenge::ChallengeResponder`]),
/// which is what guarantees cleanup even when a later domain in the batch
/// fails.
pub trait ChallengePublisher {
    fn publish(&mut self, token: &str, value: &str) -> Result<(), EngineError>;
}

/// Black-box ACME protocol engine.
///
/// All key material crosses this boundary as PEM text; the lifecycle manager
/// persists it but never inspects it.
pub trait AcmeEngine {
    /// Generate a fresh private key (account or issuance).
    fn generate_key(&mut self) -> Result<String, EngineError>;

    /// Load the account key the engine signs requests with.
    fn load_account_key(&mut self, key_pem: &str) -> Result<(), EngineError>;

    /// Register the loaded key with the authority. Called once per
    /// deployment lifetime, right after the key is first generated.
    fn register_account(&mut self, contact_email: Option<&str>) -> Result<(), EngineError>;

    /// Subject alternative names of an issued certificate chain.
    fn certificate_domains(&self, certificate_pem: &str) -> Result<Vec<String>, EngineError>;

    /// Days of validity left on an issued certificate chain.
    fn remaining_validity_days(&self, certificate_pem: &str) -> Result<i64, EngineError>;

    /// Run one order through validation and finalization.
    ///
    /// Publishes each HTTP-01 challenge through `publisher` during
    /// negotiation and returns the full certificate chain as PEM.
    fn issue(
        &mut self,
        private_key_pem: &str,
        domains: &[String],
        publisher: &mut dyn ChallengePublisher,
    ) -> Result<String, EngineError>;
}
