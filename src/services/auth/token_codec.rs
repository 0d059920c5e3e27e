/*
 * Responsibility
 * - issue / verify self-signed tokens (HS256, process-wide secret)
 * - `/getToken` signs arbitrary JSON-object claims with an expiry;
 *   verification is deterministic until the expiry elapses
 * - `SignedTokenAuthenticator`: the `Authenticator` over this codec
 */
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use serde::Deserialize;
use serde_json::{Value, json};
use thiserror::Error;

use crate::services::auth::authenticator::{AuthError, Authenticator, Identity};

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("invalid token: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),
    #[error("claims must be a JSON object")]
    NotAnObject,
    #[error("signing failed: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

/// Claims of a verified self-signed token. Whatever the caller sent to
/// `/getToken` comes back out; only `email` and `exp` have meaning here.
#[derive(Debug, Clone, Deserialize)]
pub struct SignedClaims {
    #[serde(default)]
    pub email: Option<String>,
    pub exp: i64,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Key material is intentionally not printable via Debug.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("validation", &self.validation)
            .finish()
    }
}

impl TokenCodec {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Same token + same secret must verify identically until expiry.
        validation.leeway = 0;
        // Claims are caller-supplied; an `aud` field in them is data,
        // not something to validate against.
        validation.validate_aud = false;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Sign `claims` (any JSON object) with `iat`/`exp` added.
    pub fn issue(&self, claims: &Value, ttl: Duration) -> Result<String, TokenError> {
        let mut body = claims.as_object().cloned().ok_or(TokenError::NotAnObject)?;

        let now = Utc::now();
        body.insert("iat".to_string(), json!(now.timestamp()));
        body.insert("exp".to_string(), json!((now + ttl).timestamp()));

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &body, &self.encoding_key)
            .map_err(TokenError::Signing)
    }

    /// Verify signature + expiry and return the embedded claims.
    pub fn verify(&self, token: &str) -> Result<SignedClaims, TokenError> {
        jsonwebtoken::decode::<SignedClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e),
            })
    }
}

pub struct SignedTokenAuthenticator {
    codec: Arc<TokenCodec>,
}

impl SignedTokenAuthenticator {
    pub fn new(codec: Arc<TokenCodec>) -> Self {
        Self { codec }
    }
}

#[async_trait]
impl Authenticator for SignedTokenAuthenticator {
    async fn authenticate(&self, token: &str) -> Result<Identity, AuthError> {
        let claims = self.codec.verify(token).map_err(|e| match e {
            TokenError::Expired => AuthError::Expired,
            other => AuthError::Rejected(other.to_string()),
        })?;

        let email = claims.email.ok_or(AuthError::MissingEmail)?;
        Ok(Identity { email })
    }

    fn unauthorized_message(&self) -> &'static str {
        "unauthorized access"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> TokenCodec {
        TokenCodec::new(b"test-secret")
    }

    #[test]
    fn issued_token_verifies_with_original_claims() {
        let codec = codec();
        let token = codec
            .issue(&json!({"email": "a@b.com", "role": "buyer"}), Duration::hours(1))
            .unwrap();

        let claims = codec.verify(&token).unwrap();
        assert_eq!(claims.email.as_deref(), Some("a@b.com"));
        assert_eq!(claims.extra.get("role"), Some(&json!("buyer")));
        assert!(claims.exp > Utc::now().timestamp());
    }

    #[test]
    fn expired_token_fails_with_expired() {
        let codec = codec();
        let token = codec
            .issue(&json!({"email": "a@b.com"}), Duration::seconds(-30))
            .unwrap();

        assert!(matches!(codec.verify(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn tampered_token_fails_verification() {
        let codec = codec();
        let token = codec
            .issue(&json!({"email": "a@b.com"}), Duration::hours(1))
            .unwrap();

        // Corrupt the signature segment.
        let mut tampered = token[..token.len() - 4].to_string();
        tampered.push_str("AAAA");
        assert!(matches!(
            codec.verify(&tampered),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn wrong_secret_fails_verification() {
        let token = codec()
            .issue(&json!({"email": "a@b.com"}), Duration::hours(1))
            .unwrap();

        let other = TokenCodec::new(b"different-secret");
        assert!(matches!(other.verify(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn non_object_claims_are_rejected() {
        assert!(matches!(
            codec().issue(&json!("just a string"), Duration::hours(1)),
            Err(TokenError::NotAnObject)
        ));
    }

    #[tokio::test]
    async fn authenticator_requires_email_claim() {
        let codec = Arc::new(codec());
        let auth = SignedTokenAuthenticator::new(codec.clone());

        let token = codec.issue(&json!({"name": "no email"}), Duration::hours(1)).unwrap();
        assert!(matches!(
            auth.authenticate(&token).await,
            Err(AuthError::MissingEmail)
        ));
    }
}
