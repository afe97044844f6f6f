//! Authentication configuration.

/// Configuration for the session service.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// PEM-encoded Ed25519 private key for JWT signing.
    pub jwt_private_key_pem: String,
    /// PEM-encoded Ed25519 public key for JWT verification.
    pub jwt_public_key_pem: String,
    /// JWT issuer (`iss` claim).
    pub jwt_issuer: String,
    /// Temp session lifetime in seconds (default: 300 = 5 minutes).
    pub temp_session_lifetime_secs: u64,
    /// Company-scoped session lifetime in seconds (default: 2_592_000 = 30 days).
    pub session_lifetime_secs: u64,
    /// Trial length granted to new companies, in days.
    pub trial_days: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_private_key_pem: String::new(),
            jwt_public_key_pem: String::new(),
            jwt_issuer: "fineko".into(),
            temp_session_lifetime_secs: 300,
            session_lifetime_secs: 2_592_000,
            trial_days: 30,
        }
    }
}
