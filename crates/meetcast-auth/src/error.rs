//! Error types for token signing.

/// Errors that can occur while minting or checking tokens.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Encoding the JWT failed.
    #[error("token signing failed: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    /// A token did not verify against the expected secret or claims.
    #[error("token verification failed: {0}")]
    Verification(String),
}
