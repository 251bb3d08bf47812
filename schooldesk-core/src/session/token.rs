//! Bearer token payload decoding.
//!
//! Tokens are three dot-separated segments; the middle one is base64 JSON
//! carrying an `exp` claim in Unix seconds. Signatures are not checked here,
//! the issuing API owns that.

use base64::Engine;
use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::TokenDecodeError;

/// The claims this crate reads from a token. Other claims are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct TokenClaims {
    /// Expiry, seconds since the Unix epoch. Fractional seconds are allowed.
    pub exp: f64,
}

impl TokenClaims {
    /// First millisecond at which the token counts as expired, if representable.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis((self.exp * 1000.0).ceil() as i64)
    }

    /// A token is expired from the `exp` instant onwards (inclusive).
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp_millis() as f64 >= self.exp * 1000.0
    }
}

/// Decode the claims carried by a token's payload segment.
pub fn decode_claims(token: &str) -> Result<TokenClaims, TokenDecodeError> {
    let segments: Vec<&str> = token.trim().split('.').collect();
    if segments.len() != 3 {
        return Err(TokenDecodeError::Segments(segments.len()));
    }

    let payload = segments[1].trim_end_matches('=');
    let bytes = if payload.contains(['+', '/']) {
        STANDARD_NO_PAD.decode(payload)?
    } else {
        URL_SAFE_NO_PAD.decode(payload)?
    };

    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD;

    fn token_with_payload(payload: &str) -> String {
        format!("header.{}.signature", URL_SAFE_NO_PAD.encode(payload))
    }

    #[test]
    fn test_decode_reads_exp_and_ignores_other_claims() {
        let token = token_with_payload(r#"{"exp":1704067200,"user_id":4,"token_type":"access"}"#);
        let claims = decode_claims(&token).unwrap();
        assert_eq!(claims.exp, 1_704_067_200.0);
        assert_eq!(
            claims.expires_at().unwrap().to_rfc3339(),
            "2024-01-01T00:00:00+00:00"
        );
    }

    #[test]
    fn test_decode_accepts_padded_standard_base64() {
        let payload = STANDARD.encode(r#"{"exp":1,"name":"??>>"}"#);
        assert_eq!(payload, "eyJleHAiOjEsIm5hbWUiOiI/Pz4+In0=");
        let claims = decode_claims(&format!("h.{payload}.s")).unwrap();
        assert_eq!(claims.exp, 1.0);
    }

    #[test]
    fn test_decode_rejects_wrong_segment_count() {
        assert!(matches!(decode_claims("abc"), Err(TokenDecodeError::Segments(1))));
        assert!(matches!(decode_claims("a.b.c.d"), Err(TokenDecodeError::Segments(4))));
    }

    #[test]
    fn test_decode_rejects_bad_base64_and_json() {
        assert!(matches!(decode_claims("h.!!!.s"), Err(TokenDecodeError::Base64(_))));

        let token = token_with_payload("not json");
        assert!(matches!(decode_claims(&token), Err(TokenDecodeError::Json(_))));

        let token = token_with_payload(r#"{"sub":"no expiry"}"#);
        assert!(matches!(decode_claims(&token), Err(TokenDecodeError::Json(_))));
    }

    #[test]
    fn test_expiry_is_inclusive() {
        let claims = TokenClaims { exp: 1_704_067_200.0 };
        let at_exp = DateTime::from_timestamp(1_704_067_200, 0).unwrap();
        let just_before = DateTime::from_timestamp_millis(1_704_067_199_999).unwrap();

        assert!(claims.is_expired_at(at_exp));
        assert!(!claims.is_expired_at(just_before));
    }

    #[test]
    fn test_decode_accepts_fractional_exp() {
        let token = token_with_payload(r#"{"exp":1900000000.0}"#);
        assert_eq!(decode_claims(&token).unwrap().exp, 1_900_000_000.0);

        let claims = decode_claims(&token_with_payload(r#"{"exp":1704067200.5}"#)).unwrap();
        let at_whole_second = DateTime::from_timestamp(1_704_067_200, 0).unwrap();
        let at_half = DateTime::from_timestamp_millis(1_704_067_200_500).unwrap();

        assert!(!claims.is_expired_at(at_whole_second));
        assert!(claims.is_expired_at(at_half));
        assert_eq!(claims.expires_at(), Some(at_half));
    }
}
