use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::claims::TokenClaims;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token expired")]
    Expired,

    #[error("invalid token: {0}")]
    Invalid(String),
}

/// Signature verification + decode seam.
///
/// Verifies the raw bearer token and returns its claim set. Claim
/// *reconciliation* is deliberately not part of this trait; that belongs to
/// [`ClaimGuard`](crate::ClaimGuard).
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<TokenClaims, TokenError>;
}

/// HS256 verifier for provider-issued session tokens.
pub struct Hs256TokenVerifier {
    decoding: DecodingKey,
    validation: Validation,
}

impl Hs256TokenVerifier {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            decoding: DecodingKey::from_secret(secret),
            validation: Validation::new(Algorithm::HS256),
        }
    }
}

impl TokenVerifier for Hs256TokenVerifier {
    fn verify(&self, token: &str) -> Result<TokenClaims, TokenError> {
        let data = jsonwebtoken::decode::<Map<String, Value>>(token, &self.decoding, &self.validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e.to_string()),
            })?;

        Ok(TokenClaims::new(data.claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header};
    use serde_json::json;

    const SECRET: &[u8] = b"test-secret";

    fn mint(claims: serde_json::Value) -> String {
        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap()
    }

    fn future_exp() -> i64 {
        chrono::Utc::now().timestamp() + 600
    }

    #[test]
    fn verifies_and_exposes_claims() {
        let verifier = Hs256TokenVerifier::new(SECRET);
        let token = mint(json!({
            "sub": "user_ext_1",
            "org_id": "org_1",
            "exp": future_exp(),
        }));

        let claims = verifier.verify(&token).unwrap();
        assert_eq!(claims.sub(), Some("user_ext_1"));
        assert_eq!(claims.organization_id(), Some("org_1"));
    }

    #[test]
    fn rejects_expired_tokens() {
        let verifier = Hs256TokenVerifier::new(SECRET);
        let token = mint(json!({
            "sub": "user_ext_1",
            "exp": chrono::Utc::now().timestamp() - 600,
        }));

        assert_eq!(verifier.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn rejects_wrong_signature() {
        let verifier = Hs256TokenVerifier::new(b"other-secret");
        let token = mint(json!({ "sub": "user_ext_1", "exp": future_exp() }));

        assert!(matches!(verifier.verify(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn rejects_garbage() {
        let verifier = Hs256TokenVerifier::new(SECRET);
        assert!(matches!(verifier.verify("not-a-jwt"), Err(TokenError::Invalid(_))));
    }
}
