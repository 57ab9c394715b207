//! Token and signature generation for the meeting platform.
//!
//! The platform has two trust domains. Account-level REST calls carry an
//! [`AuthToken`] signed with the API secret, while joining a meeting needs a
//! [`JoinSignature`] signed with the SDK secret and bound to one meeting.
//! Both are HS256 JWTs minted fresh on every call; nothing here caches or
//! stores tokens.

pub mod claims;
pub mod error;
pub mod signer;

pub use claims::{decode_auth_token, decode_join_signature, AuthClaims, JoinClaims};
pub use error::AuthError;
pub use signer::{
    AuthToken, JoinSignature, Signer, DEFAULT_AUTH_TOKEN_TTL, DEFAULT_SIGNATURE_SKEW,
    DEFAULT_SIGNATURE_TTL,
};
