use crate::claims::{AuthClaims, JoinClaims};
use crate::error::AuthError;
use chrono::{DateTime, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use meetcast_types::{Credentials, PARTICIPANT_ROLE};
use std::time::Duration;
use tracing::debug;

/// Lifetime of an API authorization token.
pub const DEFAULT_AUTH_TOKEN_TTL: Duration = Duration::from_secs(5000);

/// How far join signatures are backdated to tolerate clock skew and latency
/// on the receiving side.
pub const DEFAULT_SIGNATURE_SKEW: Duration = Duration::from_secs(30);

/// Lifetime of a join signature, counted from its backdated issue time.
pub const DEFAULT_SIGNATURE_TTL: Duration = Duration::from_secs(2 * 60 * 60);

/// A signed, time-bounded API authorization token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthToken {
    token: String,
    issuer: String,
    expires_at: DateTime<Utc>,
}

impl AuthToken {
    pub fn as_str(&self) -> &str {
        &self.token
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Value for an `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

/// A signed assertion authorizing entry to one meeting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinSignature {
    token: String,
    meeting_number: String,
    timestamp_ms: i64,
}

impl JoinSignature {
    pub fn as_str(&self) -> &str {
        &self.token
    }

    pub fn meeting_number(&self) -> &str {
        &self.meeting_number
    }

    /// The backdated timestamp bound into the signature.
    pub fn timestamp_ms(&self) -> i64 {
        self.timestamp_ms
    }

    pub fn into_string(self) -> String {
        self.token
    }
}

/// Mints auth tokens and join signatures from static credentials.
///
/// Every method is a pure function of the credentials, the clock reading and
/// its arguments. The `*_at` variants take the clock reading explicitly.
#[derive(Debug, Clone)]
pub struct Signer {
    credentials: Credentials,
    auth_ttl: Duration,
    signature_skew: Duration,
    signature_ttl: Duration,
}

impl Signer {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            auth_ttl: DEFAULT_AUTH_TOKEN_TTL,
            signature_skew: DEFAULT_SIGNATURE_SKEW,
            signature_ttl: DEFAULT_SIGNATURE_TTL,
        }
    }

    pub fn with_auth_ttl(mut self, ttl: Duration) -> Self {
        self.auth_ttl = ttl;
        self
    }

    pub fn with_signature_skew(mut self, skew: Duration) -> Self {
        self.signature_skew = skew;
        self
    }

    pub fn with_signature_ttl(mut self, ttl: Duration) -> Self {
        self.signature_ttl = ttl;
        self
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn auth_token(&self) -> Result<AuthToken, AuthError> {
        self.auth_token_at(Utc::now())
    }

    /// Builds an API token issued by the API key and expiring `auth_ttl`
    /// after `now`.
    pub fn auth_token_at(&self, now: DateTime<Utc>) -> Result<AuthToken, AuthError> {
        let exp = now.timestamp().saturating_add(secs(self.auth_ttl));
        let claims = AuthClaims {
            iss: self.credentials.api_key().to_string(),
            exp,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.credentials.api_secret().as_bytes()),
        )?;

        Ok(AuthToken {
            token,
            issuer: claims.iss,
            expires_at: DateTime::from_timestamp(exp, 0).unwrap_or(DateTime::<Utc>::MAX_UTC),
        })
    }

    pub fn join_signature(&self, meeting_number: &str) -> Result<JoinSignature, AuthError> {
        self.join_signature_at(meeting_number, Utc::now())
    }

    /// Builds a join signature for `meeting_number`, backdated by the
    /// configured skew from `now`.
    pub fn join_signature_at(
        &self,
        meeting_number: &str,
        now: DateTime<Utc>,
    ) -> Result<JoinSignature, AuthError> {
        let ts = now.timestamp_millis().saturating_sub(millis(self.signature_skew));
        let iat = ts.div_euclid(1000);
        let exp = iat.saturating_add(secs(self.signature_ttl));
        let sdk_key = self.credentials.sdk_key();

        let claims = JoinClaims {
            sdk_key: sdk_key.to_string(),
            mn: meeting_number.to_string(),
            role: PARTICIPANT_ROLE,
            ts,
            iat,
            exp,
            token_exp: exp,
            hash: JoinClaims::flat_payload(sdk_key, meeting_number, ts, PARTICIPANT_ROLE),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.credentials.sdk_secret().as_bytes()),
        )?;

        debug!(meeting = meeting_number, ts, "minted join signature");

        Ok(JoinSignature {
            token,
            meeting_number: claims.mn,
            timestamp_ms: ts,
        })
    }
}

fn secs(d: Duration) -> i64 {
    i64::try_from(d.as_secs()).unwrap_or(i64::MAX)
}

fn millis(d: Duration) -> i64 {
    i64::try_from(d.as_millis()).unwrap_or(i64::MAX)
}
