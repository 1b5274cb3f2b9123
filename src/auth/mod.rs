//! Credential codec
//!
//! A credential is a compact three-segment token whose middle segment is a
//! base64url JSON payload carrying at least `exp` (seconds since epoch).
//! Decoding only reads the payload; authenticity is the backend's concern
//! unless a gate secret is configured, in which case `verify_claims` checks the
//! HMAC signature as well.

pub mod role;

pub use role::Role;

use std::collections::HashSet;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CredentialError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub exp: i64,
    pub sub: Option<String>,
    /// Full decoded payload, including `exp` and `sub`
    pub payload: Map<String, Value>,
}

impl Claims {
    /// Expiry is inclusive: a credential expiring exactly now is expired.
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.exp <= now
    }
}

/// Outcome of inspecting a credential at a point in time
#[derive(Debug, Clone, PartialEq)]
pub enum CredentialStatus {
    Valid(Claims),
    Expired(Claims),
    Malformed(CredentialError),
}

impl CredentialStatus {
    pub fn is_valid(&self) -> bool {
        matches!(self, CredentialStatus::Valid(_))
    }
}

/// Decode the payload segment without checking the signature
pub fn decode_claims(token: &str) -> Result<Claims, CredentialError> {
    let segments: Vec<&str> = token.trim().split('.').collect();
    if segments.len() != 3 {
        return Err(CredentialError::SegmentCount(segments.len()));
    }

    let bytes = URL_SAFE_NO_PAD
        .decode(segments[1].trim_end_matches('='))
        .map_err(|e| CredentialError::Encoding(e.to_string()))?;

    let payload: Map<String, Value> =
        serde_json::from_slice(&bytes).map_err(|e| CredentialError::Payload(e.to_string()))?;

    // Fractional expiries are truncated toward zero
    let exp = payload
        .get("exp")
        .and_then(Value::as_f64)
        .ok_or(CredentialError::MissingExpiry)? as i64;

    let sub = payload.get("sub").and_then(Value::as_str).map(str::to_string);

    Ok(Claims { exp, sub, payload })
}

/// Verify the HMAC signature with `secret`, then decode the payload
///
/// Expiry is not validated here; callers compare `exp` against their own clock.
pub fn verify_claims(token: &str, secret: &str) -> Result<Claims, CredentialError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims = HashSet::from(["exp".to_string()]);

    decode::<Value>(token.trim(), &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map_err(|e| CredentialError::Signature(e.to_string()))?;

    decode_claims(token)
}

/// Classify a credential at `now` (unix seconds)
///
/// Never fails: every decode or verification problem becomes `Malformed`.
pub fn inspect(token: &str, now: i64, secret: Option<&str>) -> CredentialStatus {
    let decoded = match secret {
        Some(secret) => verify_claims(token, secret),
        None => decode_claims(token),
    };

    match decoded {
        Ok(claims) if claims.is_expired_at(now) => CredentialStatus::Expired(claims),
        Ok(claims) => CredentialStatus::Valid(claims),
        Err(err) => {
            tracing::debug!("Credential rejected: {}", err);
            CredentialStatus::Malformed(err)
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    pub(crate) fn unsigned_token(payload: &Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload.to_string());
        format!("{}.{}.signature", header, body)
    }

    fn signed_token(payload: &Value, secret: &str) -> String {
        encode(&Header::default(), payload, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
    }

    #[test]
    fn decodes_exp_and_sub() {
        let token = unsigned_token(&json!({"exp": 1_700_000_000, "sub": "42", "role": "professional"}));
        let claims = decode_claims(&token).unwrap();
        assert_eq!(claims.exp, 1_700_000_000);
        assert_eq!(claims.sub.as_deref(), Some("42"));
        assert_eq!(claims.payload["role"], "professional");
    }

    #[test]
    fn accepts_padded_payload_and_fractional_exp() {
        let header = URL_SAFE_NO_PAD.encode(b"{}");
        let body = base64::engine::general_purpose::URL_SAFE.encode(json!({"exp": 10.95}).to_string());
        let claims = decode_claims(&format!("{}.{}.sig", header, body)).unwrap();
        assert_eq!(claims.exp, 10);
    }

    #[test]
    fn rejects_wrong_segment_count() {
        assert_eq!(decode_claims("abc"), Err(CredentialError::SegmentCount(1)));
        assert_eq!(decode_claims("a.b"), Err(CredentialError::SegmentCount(2)));
        assert_eq!(decode_claims("a.b.c.d"), Err(CredentialError::SegmentCount(4)));
        assert_eq!(decode_claims(""), Err(CredentialError::SegmentCount(1)));
    }

    #[test]
    fn rejects_bad_base64_and_bad_json() {
        assert!(matches!(decode_claims("h.!!!!.s"), Err(CredentialError::Encoding(_))));

        let not_json = URL_SAFE_NO_PAD.encode("not json");
        assert!(matches!(decode_claims(&format!("h.{}.s", not_json)), Err(CredentialError::Payload(_))));

        let array = URL_SAFE_NO_PAD.encode("[1,2,3]");
        assert!(matches!(decode_claims(&format!("h.{}.s", array)), Err(CredentialError::Payload(_))));
    }

    #[test]
    fn missing_or_textual_exp_is_malformed() {
        let token = unsigned_token(&json!({"sub": "42"}));
        assert_eq!(decode_claims(&token), Err(CredentialError::MissingExpiry));

        let token = unsigned_token(&json!({"exp": "1700000000"}));
        assert_eq!(decode_claims(&token), Err(CredentialError::MissingExpiry));
    }

    #[test]
    fn inspect_treats_exp_equal_to_now_as_expired() {
        let token = unsigned_token(&json!({"exp": 1_000}));
        assert!(matches!(inspect(&token, 999, None), CredentialStatus::Valid(_)));
        assert!(matches!(inspect(&token, 1_000, None), CredentialStatus::Expired(_)));
        assert!(matches!(inspect(&token, 1_001, None), CredentialStatus::Expired(_)));
    }

    #[test]
    fn inspect_never_panics_on_garbage() {
        for token in ["", ".", "..", "a.b.c", "💥.💥.💥", "eyJ.eyJ.eyJ", "a..c"] {
            assert!(matches!(inspect(token, 0, None), CredentialStatus::Malformed(_)), "{token:?}");
        }
    }

    #[test]
    fn signature_checked_only_when_secret_given() {
        let token = signed_token(&json!({"exp": 2_000, "sub": "7"}), "s3cret");
        assert!(inspect(&token, 1_000, Some("s3cret")).is_valid());
        assert!(matches!(
            inspect(&token, 1_000, Some("other")),
            CredentialStatus::Malformed(CredentialError::Signature(_))
        ));

        let forged = unsigned_token(&json!({"exp": 2_000}));
        assert!(inspect(&forged, 1_000, None).is_valid());
        assert!(!inspect(&forged, 1_000, Some("s3cret")).is_valid());
    }

    #[test]
    fn verified_token_still_expires_on_gate_clock() {
        let token = signed_token(&json!({"exp": 500}), "s3cret");
        assert!(matches!(inspect(&token, 1_000, Some("s3cret")), CredentialStatus::Expired(_)));
    }
}
