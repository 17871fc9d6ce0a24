//! Bearer-token authentication: token issuance/verification, identity
//! resolution, and the per-request role guard.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use ryu_models::{Role, User};

use crate::error::ApiError;
use crate::state::AppState;

/// Claims carried by a bearer token: the subject's email and an absolute
/// expiry instant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject email.
    pub sub: String,
    /// Expiry as a unix timestamp.
    pub exp: i64,
}

/// Token verification failure.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("token revoked")]
    Revoked,
    #[error("invalid token: {0}")]
    Invalid(String),
}

/// Revocation seam for stateless tokens.
///
/// Tokens stay valid until their TTL elapses regardless of password
/// changes or account deletion; that is the inherited contract. Plugging a
/// real list in here adds revocation without touching any caller.
pub trait RevocationList: Send + Sync {
    fn is_revoked(&self, claims: &Claims) -> bool;
}

/// Default revocation list: nothing is ever revoked.
pub struct NoRevocation;

impl RevocationList for NoRevocation {
    fn is_revoked(&self, _claims: &Claims) -> bool {
        false
    }
}

/// Issues and verifies signed, time-limited bearer tokens (HS256).
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    default_ttl: Duration,
    revocations: Arc<dyn RevocationList>,
}

impl TokenService {
    /// Create a token service from the server-held secret.
    pub fn new(secret: &str, default_ttl: StdDuration) -> Self {
        Self::with_revocations(secret, default_ttl, Arc::new(NoRevocation))
    }

    /// Create a token service with a revocation list plugged in.
    pub fn with_revocations(
        secret: &str,
        default_ttl: StdDuration,
        revocations: Arc<dyn RevocationList>,
    ) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is exact; no clock leeway.
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            default_ttl: Duration::from_std(default_ttl).unwrap_or_else(|_| Duration::minutes(30)),
            revocations,
        }
    }

    /// Issue a token for the given subject with an explicit TTL.
    pub fn issue(&self, email: &str, ttl: Duration) -> Result<String, TokenError> {
        let claims = Claims {
            sub: email.to_string(),
            exp: (Utc::now() + ttl).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| TokenError::Invalid(e.to_string()))
    }

    /// Issue a token with the configured default TTL.
    pub fn issue_default(&self, email: &str) -> Result<String, TokenError> {
        self.issue(email, self.default_ttl)
    }

    /// Verify signature and expiry, returning the claims.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e.to_string()),
            }
        })?;

        if self.revocations.is_revoked(&data.claims) {
            return Err(TokenError::Revoked);
        }

        Ok(data.claims)
    }
}

/// Authenticated user resolved from the request's bearer token.
///
/// Resolution fails closed: a missing header, bad signature, expired
/// token, or a subject with no live user record all reject the request
/// with 401 before the handler runs.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    /// Role guard: the caller's role must equal `expected`. There is no
    /// hierarchy; each operation names exactly one role.
    pub fn require_role(&self, expected: Role) -> Result<&User, ApiError> {
        if self.0.role == expected {
            Ok(&self.0)
        } else {
            Err(ApiError::forbidden("Not authorized"))
        }
    }

    pub fn user(&self) -> &User {
        &self.0
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::unauthenticated("Missing Authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::unauthenticated("Invalid Authorization header format"))?;

        let claims = state
            .tokens
            .verify(token)
            .map_err(|_| ApiError::unauthenticated("Could not validate credentials"))?;

        let user = state
            .users
            .find_by_email(&claims.sub)
            .await?
            .ok_or_else(|| ApiError::unauthenticated("Could not validate credentials"))?;

        Ok(CurrentUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new("test-secret", StdDuration::from_secs(1800))
    }

    #[test]
    fn fresh_token_verifies() {
        let svc = service();
        let token = svc.issue("ada@x.io", Duration::hours(1)).unwrap();
        let claims = svc.verify(&token).unwrap();
        assert_eq!(claims.sub, "ada@x.io");
    }

    #[test]
    fn already_expired_token_fails() {
        let svc = service();
        let token = svc.issue("ada@x.io", Duration::seconds(-1)).unwrap();
        assert!(matches!(svc.verify(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn tampered_token_fails() {
        let svc = service();
        let token = svc.issue("ada@x.io", Duration::hours(1)).unwrap();
        let mut tampered = token.clone();
        tampered.pop();
        tampered.push(if token.ends_with('A') { 'B' } else { 'A' });
        assert!(matches!(svc.verify(&tampered), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn token_from_another_secret_fails() {
        let svc = service();
        let other = TokenService::new("other-secret", StdDuration::from_secs(1800));
        let token = other.issue("ada@x.io", Duration::hours(1)).unwrap();
        assert!(svc.verify(&token).is_err());
    }

    #[test]
    fn garbage_is_invalid_not_panic() {
        let svc = service();
        assert!(matches!(
            svc.verify("not.a.token"),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn revocation_list_is_consulted() {
        struct RevokeAll;
        impl RevocationList for RevokeAll {
            fn is_revoked(&self, _claims: &Claims) -> bool {
                true
            }
        }

        let svc = TokenService::with_revocations(
            "test-secret",
            StdDuration::from_secs(1800),
            Arc::new(RevokeAll),
        );
        let token = svc.issue("ada@x.io", Duration::hours(1)).unwrap();
        assert!(matches!(svc.verify(&token), Err(TokenError::Revoked)));
    }
}
