//! Credential verification capability.

use crate::config::VerificationConfig;
use crate::credentials::Credentials;

/// Decides whether a credential pair is accepted.
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, candidate: &Credentials) -> bool;
}

/// Accepts exactly one fixed pair.
#[derive(Debug, Clone)]
pub struct FixedVerifier {
    expected: Credentials,
}

impl FixedVerifier {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            expected: Credentials::new(email, password),
        }
    }

    pub fn from_config(config: &VerificationConfig) -> Self {
        Self::new(config.email.clone(), config.password.clone())
    }
}

impl Default for FixedVerifier {
    fn default() -> Self {
        Self::from_config(&VerificationConfig::default())
    }
}

impl CredentialVerifier for FixedVerifier {
    fn verify(&self, candidate: &Credentials) -> bool {
        candidate == &self.expected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_accepts_only_test_123() {
        let verifier = FixedVerifier::default();
        assert!(verifier.verify(&Credentials::new("test", "123")));
        assert!(!verifier.verify(&Credentials::new("test", "1234")));
        assert!(!verifier.verify(&Credentials::new("Test", "123")));
        assert!(!verifier.verify(&Credentials::default()));
    }

    #[test]
    fn test_comparison_is_exact() {
        let verifier = FixedVerifier::new("me@example.com", "pw");
        assert!(!verifier.verify(&Credentials::new(" me@example.com", "pw")));
        assert!(verifier.verify(&Credentials::new("me@example.com", "pw")));
    }
}
