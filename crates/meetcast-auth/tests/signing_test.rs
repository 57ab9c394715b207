use chrono::{TimeDelta, Utc};
use meetcast_auth::{decode_auth_token, decode_join_signature, AuthError, Signer};
use meetcast_types::{Credentials, PARTICIPANT_ROLE};

const API_KEY: &str = "api-key";
const API_SECRET: &str = "api-secret";
const SDK_KEY: &str = "sdk-key";
const SDK_SECRET: &str = "sdk-secret";

fn signer() -> Signer {
    Signer::new(Credentials::new(API_KEY, API_SECRET, SDK_KEY, SDK_SECRET).unwrap())
}

#[test]
fn test_auth_token_claims_verify_with_api_secret() {
    let token = signer().auth_token().expect("Failed to generate token");

    let claims = decode_auth_token(token.as_str(), API_SECRET).expect("Failed to decode token");
    assert_eq!(claims.iss, API_KEY);
    assert_eq!(claims.exp, token.expires_at().timestamp());
}

#[test]
fn test_auth_token_rejected_by_sdk_secret() {
    let token = signer().auth_token().unwrap();
    match decode_auth_token(token.as_str(), SDK_SECRET) {
        Err(AuthError::Verification(_)) => {}
        other => panic!("Expected verification failure, got {:?}", other),
    }
}

#[test]
fn test_join_signature_binds_meeting_and_sdk_key() {
    let sig = signer()
        .join_signature("87654321")
        .expect("Failed to generate signature");

    let claims = decode_join_signature(sig.as_str(), SDK_SECRET).expect("Failed to decode");
    assert_eq!(claims.mn, "87654321");
    assert_eq!(claims.sdk_key, SDK_KEY);
    assert_eq!(claims.role, PARTICIPANT_ROLE);
    assert_eq!(claims.ts, sig.timestamp_ms());
    assert_eq!(claims.iat, claims.ts / 1000);
    assert_eq!(claims.hash, format!("{SDK_KEY}87654321{}{PARTICIPANT_ROLE}", claims.ts));
    assert!(claims.exp > Utc::now().timestamp());
}

#[test]
fn test_join_signature_rejected_by_api_secret() {
    let sig = signer().join_signature("87654321").unwrap();
    assert!(decode_join_signature(sig.as_str(), API_SECRET).is_err());
}

#[test]
fn test_join_signatures_are_time_scoped() {
    let s = signer();
    let now = Utc::now();
    let first = s.join_signature_at("111", now).unwrap();
    let second = s
        .join_signature_at("111", now + TimeDelta::seconds(1))
        .unwrap();

    assert_ne!(first.as_str(), second.as_str());

    let a = decode_join_signature(first.as_str(), SDK_SECRET).unwrap();
    let b = decode_join_signature(second.as_str(), SDK_SECRET).unwrap();
    assert_eq!(a.mn, b.mn);
    assert_eq!(a.sdk_key, b.sdk_key);
    assert_eq!(b.ts - a.ts, 1000);
}

#[test]
fn test_expired_auth_token_fails_verification() {
    let issued = Utc::now() - TimeDelta::seconds(10_000);
    let token = signer().auth_token_at(issued).unwrap();
    assert!(decode_auth_token(token.as_str(), API_SECRET).is_err());
}
