//! JWT claim sets and verification helpers.

use crate::error::AuthError;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// Claims of the API authorization token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthClaims {
    /// The API key.
    pub iss: String,
    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,
}

/// Claims of the meeting join signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinClaims {
    pub sdk_key: String,
    /// Meeting number.
    pub mn: String,
    pub role: u8,
    /// Backdated timestamp in milliseconds.
    pub ts: i64,
    pub iat: i64,
    pub exp: i64,
    pub token_exp: i64,
    /// `sdkKey + mn + ts + role`, for endpoints that check the flat payload.
    pub hash: String,
}

impl JoinClaims {
    pub(crate) fn flat_payload(sdk_key: &str, meeting_number: &str, ts: i64, role: u8) -> String {
        format!("{sdk_key}{meeting_number}{ts}{role}")
    }
}

/// Verifies an auth token against the API secret and returns its claims.
pub fn decode_auth_token(token: &str, api_secret: &str) -> Result<AuthClaims, AuthError> {
    decode::<AuthClaims>(
        token,
        &DecodingKey::from_secret(api_secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map(|data| data.claims)
    .map_err(|e| AuthError::Verification(e.to_string()))
}

/// Verifies a join signature against the SDK secret and returns its claims.
///
/// Also checks that the flat `hash` payload agrees with the structured
/// fields, so a token whose fields were minted inconsistently is rejected.
pub fn decode_join_signature(token: &str, sdk_secret: &str) -> Result<JoinClaims, AuthError> {
    let claims = decode::<JoinClaims>(
        token,
        &DecodingKey::from_secret(sdk_secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map(|data| data.claims)
    .map_err(|e| AuthError::Verification(e.to_string()))?;

    let expected = JoinClaims::flat_payload(&claims.sdk_key, &claims.mn, claims.ts, claims.role);
    if claims.hash != expected {
        return Err(AuthError::Verification(
            "hash does not match signed fields".to_string(),
        ));
    }
    Ok(claims)
}
