use crate::error::{IdentityError, IdentityErrorExt};
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tport_domain::config::AuthConfig;

/// Admin session claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub username: String,
    pub authenticated: bool,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
}

/// A freshly signed token and its lifetime in seconds.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub ttl_seconds: i64,
}

/// Signs and verifies HS256 session tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    issuer: String,
    ttl_seconds: i64,
}

impl TokenService {
    /// # Errors
    /// [`IdentityError::Config`] for an empty secret or a zero lifetime.
    pub fn new(secret: &str, issuer: &str, ttl_seconds: u64) -> Result<Self, IdentityError> {
        if secret.is_empty() {
            return Err(IdentityError::Config {
                message: "jwt_secret must not be empty".into(),
                context: None,
            });
        }
        let ttl_seconds = i64::try_from(ttl_seconds)
            .ok()
            .filter(|ttl| *ttl > 0)
            .ok_or_else(|| IdentityError::Config {
                message: format!("token_ttl_seconds must be positive, got {ttl_seconds}").into(),
                context: None,
            })?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[issuer]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        validation.leeway = 0;

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            issuer: issuer.to_owned(),
            ttl_seconds,
        })
    }

    /// # Errors
    /// See [`TokenService::new`].
    pub fn from_config(config: &AuthConfig) -> Result<Self, IdentityError> {
        Self::new(&config.jwt_secret, &config.issuer, config.token_ttl_seconds)
    }

    #[must_use]
    pub const fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    /// # Errors
    /// [`IdentityError::Token`] when signing fails.
    pub fn issue(&self, username: &str) -> Result<IssuedToken, IdentityError> {
        let iat = Utc::now().timestamp();
        self.sign(&Claims {
            sub: username.to_owned(),
            username: username.to_owned(),
            authenticated: true,
            iat,
            exp: iat + self.ttl_seconds,
            iss: self.issuer.clone(),
        })
        .map(|token| IssuedToken { token, ttl_seconds: self.ttl_seconds })
    }

    pub(crate) fn sign(&self, claims: &Claims) -> Result<String, IdentityError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding).context("Signing session token")
    }

    /// Checks signature, issuer and expiry.
    ///
    /// # Errors
    /// [`IdentityError::Token`] for any invalid token, [`IdentityError::Auth`] when the claims
    /// do not describe an authenticated session.
    pub fn verify(&self, token: &str) -> Result<Claims, IdentityError> {
        let claims = decode::<Claims>(token, &self.decoding, &self.validation)
            .context("Verifying session token")?
            .claims;
        if !claims.authenticated {
            return Err(IdentityError::Auth { message: "Invalid token".into(), context: None });
        }
        Ok(claims)
    }
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("issuer", &self.issuer)
            .field("ttl_seconds", &self.ttl_seconds)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new("test-secret", "tport", 3600).unwrap()
    }

    #[test]
    fn issued_token_verifies() {
        let issued = service().issue("Transportify-admin").unwrap();
        let claims = service().verify(&issued.token).unwrap();

        assert_eq!(claims.username, "Transportify-admin");
        assert_eq!(claims.sub, "Transportify-admin");
        assert!(claims.authenticated);
        assert_eq!(claims.exp - claims.iat, 3600);
        assert_eq!(issued.ttl_seconds, 3600);
    }

    #[test]
    fn expired_token_is_rejected() {
        let svc = service();
        let now = Utc::now().timestamp();
        let token = svc
            .sign(&Claims {
                sub: "admin".to_owned(),
                username: "admin".to_owned(),
                authenticated: true,
                iat: now - 120,
                exp: now - 60,
                iss: "tport".to_owned(),
            })
            .unwrap();

        assert!(matches!(svc.verify(&token), Err(IdentityError::Token { .. })));
    }

    #[test]
    fn foreign_secret_or_issuer_is_rejected() {
        let token = TokenService::new("other-secret", "tport", 60).unwrap().issue("admin").unwrap();
        assert!(service().verify(&token.token).is_err());

        let token = TokenService::new("test-secret", "someone-else", 60).unwrap().issue("admin").unwrap();
        assert!(service().verify(&token.token).is_err());
    }

    #[test]
    fn unauthenticated_claims_are_rejected() {
        let svc = service();
        let now = Utc::now().timestamp();
        let token = svc
            .sign(&Claims {
                sub: "admin".to_owned(),
                username: "admin".to_owned(),
                authenticated: false,
                iat: now,
                exp: now + 60,
                iss: "tport".to_owned(),
            })
            .unwrap();
        assert!(matches!(svc.verify(&token), Err(IdentityError::Auth { .. })));
    }

    #[test]
    fn rejects_unusable_settings() {
        assert!(TokenService::new("", "tport", 60).is_err());
        assert!(TokenService::new("secret", "tport", 0).is_err());
    }
}
