//! Unverified JWT claim inspection.
//!
//! Only the payload segment is decoded, to read the expiry claim. The
//! signature is never checked client-side, so a passing check only means
//! the token looks usable. The backend still authorizes every request.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClaimsError {
    #[error("Token has no payload segment")]
    MissingPayload,

    #[error("Token payload is not valid base64url: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("Token payload is not a valid claims object: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("Token expiry is not a number: {0}")]
    Expiry(Value),
}

/// Claims the client looks at. Identity claims are whatever the backend
/// issues, so only `exp` has a required shape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Claims {
    /// Expiry, seconds since epoch
    pub exp: Option<f64>,
    /// Subject as text, whatever JSON type the backend used for it
    pub sub: Option<String>,
}

impl Claims {
    fn from_object(mut object: Map<String, Value>) -> Result<Self, ClaimsError> {
        let exp = match object.remove("exp") {
            None | Some(Value::Null) => None,
            Some(Value::Number(n)) => n.as_f64(),
            Some(other) => return Err(ClaimsError::Expiry(other)),
        };
        let sub = match object.remove("sub") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s),
            Some(other) => Some(other.to_string()),
        };
        Ok(Self { exp, sub })
    }

    /// True when `exp` is present and strictly before `now_secs`
    pub fn is_expired_at(&self, now_secs: f64) -> bool {
        matches!(self.exp, Some(exp) if exp < now_secs)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let exp = self.exp?;
        DateTime::from_timestamp_millis((exp * 1000.0) as i64)
    }
}

/// Decode the payload of a `header.payload.signature` token
pub fn decode_claims(token: &str) -> Result<Claims, ClaimsError> {
    let payload = token
        .split('.')
        .nth(1)
        .filter(|p| !p.is_empty())
        .ok_or(ClaimsError::MissingPayload)?;

    // Some issuers keep the base64 padding
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('='))?;
    let object: Map<String, Value> = serde_json::from_slice(&bytes)?;
    Claims::from_object(object)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_with(payload: &str) -> String {
        format!(
            "{}.{}.sig",
            URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#),
            URL_SAFE_NO_PAD.encode(payload)
        )
    }

    #[test]
    fn test_decode_claims_reads_exp() {
        let claims = decode_claims(&token_with(r#"{"sub":"alice","exp":1700000000}"#)).unwrap();
        assert_eq!(claims.exp, Some(1_700_000_000.0));
        assert_eq!(claims.sub.as_deref(), Some("alice"));
        assert_eq!(
            claims.expires_at().map(|t| t.timestamp()),
            Some(1_700_000_000)
        );
    }

    #[test]
    fn test_decode_claims_without_exp() {
        let claims = decode_claims(&token_with(r#"{"sub":"alice"}"#)).unwrap();
        assert!(claims.exp.is_none());
        assert!(!claims.is_expired_at(f64::MAX));
    }

    #[test]
    fn test_is_expired_at_is_strict() {
        let claims = Claims {
            exp: Some(100.0),
            ..Default::default()
        };
        assert!(!claims.is_expired_at(99.5));
        assert!(!claims.is_expired_at(100.0));
        assert!(claims.is_expired_at(100.25));
    }

    #[test]
    fn test_decode_claims_malformed() {
        assert!(matches!(decode_claims("opaque"), Err(ClaimsError::MissingPayload)));
        assert!(matches!(decode_claims("a..c"), Err(ClaimsError::MissingPayload)));
        assert!(matches!(decode_claims("a.!!!.c"), Err(ClaimsError::Encoding(_))));

        let not_json = format!("a.{}.c", URL_SAFE_NO_PAD.encode("plain text"));
        assert!(matches!(decode_claims(&not_json), Err(ClaimsError::Payload(_))));
    }

    #[test]
    fn test_decode_claims_ignores_identity_claim_types() {
        let claims = decode_claims(&token_with(
            r#"{"sub":42,"iat":"yesterday","roles":["admin"],"exp":1700000000}"#,
        ))
        .unwrap();
        assert_eq!(claims.exp, Some(1_700_000_000.0));
        assert_eq!(claims.sub.as_deref(), Some("42"));
    }

    #[test]
    fn test_decode_claims_rejects_non_numeric_exp() {
        assert!(matches!(
            decode_claims(&token_with(r#"{"exp":"soon"}"#)),
            Err(ClaimsError::Expiry(_))
        ));
        assert!(decode_claims(&token_with(r#"{"exp":null}"#)).unwrap().exp.is_none());
    }

    #[test]
    fn test_decode_claims_tolerates_padding() {
        let padded = format!(
            "a.{}.c",
            base64::engine::general_purpose::URL_SAFE.encode(r#"{"exp":5}"#)
        );
        assert_eq!(decode_claims(&padded).unwrap().exp, Some(5.0));
    }
}
