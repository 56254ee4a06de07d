//! Session token issuing and verification
//!
//! Tokens are HS256-signed JWTs carrying the subject id and role. They
//! are stateless: there is no server-side revocation list, so a token
//! stays valid until its expiry. Logout is advisory (the client drops
//! the token) — an accepted tradeoff, not an oversight.

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use uuid::Uuid;

/// Subject role carried in credentials and tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Admin,
}

impl Role {
    /// Database / wire representation of the role
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Admin => "admin",
        }
    }

    /// Parse a stored role value
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "customer" => Some(Role::Customer),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

/// Token configuration
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// Server-held signing secret
    pub secret: String,
    /// Token lifetime in seconds (default: 1 day)
    pub ttl_seconds: u64,
}

impl TokenConfig {
    /// Create a new TokenConfig from environment variables
    ///
    /// # Environment Variables
    /// - `JWT_SECRET`: HMAC signing secret (required)
    /// - `JWT_TTL_SECONDS`: Token lifetime in seconds (default: 86400)
    pub fn from_env() -> Result<Self, String> {
        let secret = env::var("JWT_SECRET")
            .map_err(|_| "JWT_SECRET environment variable not set".to_string())?;

        let ttl_seconds = env::var("JWT_TTL_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(86400);

        Ok(TokenConfig {
            secret,
            ttl_seconds,
        })
    }
}

/// Claims embedded in a session token
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user) ID
    pub sub: Uuid,
    /// Subject role
    pub role: Role,
    /// Issued at time (unix seconds)
    pub iat: u64,
    /// Expiration time (unix seconds)
    pub exp: u64,
}

/// Why a token failed verification
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TokenError {
    /// The token is not a well-formed JWT
    #[error("malformed token")]
    Malformed,

    /// The signature does not match the server secret
    #[error("invalid token signature")]
    SignatureInvalid,

    /// The token expired
    #[error("expired token")]
    Expired,
}

/// Token issuer/verifier
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_seconds: u64,
}

impl TokenService {
    /// Initialize a new token service
    pub fn new(config: &TokenConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        TokenService {
            encoding_key,
            decoding_key,
            validation,
            ttl_seconds: config.ttl_seconds,
        }
    }

    /// Issue a signed token for a subject
    pub fn issue(&self, subject: Uuid, role: Role) -> anyhow::Result<String> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| anyhow::anyhow!("Failed to get current time: {}", e))?
            .as_secs();

        let claims = Claims {
            sub: subject,
            role,
            iat: now,
            exp: now + self.ttl_seconds,
        };

        let token = encode(
            &Header::new(jsonwebtoken::Algorithm::HS256),
            &claims,
            &self.encoding_key,
        )?;
        Ok(token)
    }

    /// Verify a token and return its claims
    ///
    /// The HMAC comparison inside jsonwebtoken is constant-time; this
    /// function only classifies the failure.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        use jsonwebtoken::errors::ErrorKind;

        match decode::<Claims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => Ok(data.claims),
            Err(e) => match e.kind() {
                ErrorKind::ExpiredSignature => Err(TokenError::Expired),
                ErrorKind::InvalidSignature => Err(TokenError::SignatureInvalid),
                _ => Err(TokenError::Malformed),
            },
        }
    }

    /// Get the configured token lifetime
    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn service() -> TokenService {
        TokenService::new(&TokenConfig {
            secret: "test-secret".to_string(),
            ttl_seconds: 3600,
        })
    }

    #[test]
    fn test_issue_then_verify_round_trip() {
        let service = service();
        let subject = Uuid::new_v4();

        let token = service.issue(subject, Role::Customer).unwrap();
        let claims = service.verify(&token).unwrap();

        assert_eq!(claims.sub, subject);
        assert_eq!(claims.role, Role::Customer);
        assert_eq!(claims.exp, claims.iat + service.ttl_seconds());
    }

    #[test]
    #[serial]
    fn test_token_config_requires_secret() {
        unsafe {
            std::env::remove_var("JWT_SECRET");
            std::env::remove_var("JWT_TTL_SECONDS");
        }

        assert!(TokenConfig::from_env().is_err());
    }

    #[test]
    #[serial]
    fn test_token_config_from_env() {
        unsafe {
            std::env::set_var("JWT_SECRET", "env-secret");
            std::env::remove_var("JWT_TTL_SECONDS");
        }

        let config = TokenConfig::from_env().expect("Failed to create token config");
        assert_eq!(config.secret, "env-secret");
        assert_eq!(config.ttl_seconds, 86400);

        unsafe {
            std::env::set_var("JWT_TTL_SECONDS", "3600");
        }

        let config = TokenConfig::from_env().expect("Failed to create token config");
        assert_eq!(config.ttl_seconds, 3600);

        unsafe {
            std::env::remove_var("JWT_SECRET");
            std::env::remove_var("JWT_TTL_SECONDS");
        }
    }

    #[test]
    fn test_admin_role_survives_round_trip() {
        let service = service();
        let subject = Uuid::new_v4();

        let token = service.issue(subject, Role::Admin).unwrap();
        let claims = service.verify(&token).unwrap();

        assert_eq!(claims.role, Role::Admin);
    }

    #[test]
    fn test_tampered_signature_is_rejected() {
        let service = service();
        let token = service.issue(Uuid::new_v4(), Role::Customer).unwrap();

        // Flip the first character of the signature segment.
        let (payload, signature) = token.rsplit_once('.').unwrap();
        let first = signature.chars().next().unwrap();
        let flipped = if first == 'A' { 'B' } else { 'A' };
        let tampered = format!("{}.{}{}", payload, flipped, &signature[1..]);

        assert_eq!(
            service.verify(&tampered),
            Err(TokenError::SignatureInvalid)
        );
    }

    #[test]
    fn test_token_from_other_secret_is_rejected() {
        let service = service();
        let other = TokenService::new(&TokenConfig {
            secret: "different-secret".to_string(),
            ttl_seconds: 3600,
        });

        let token = other.issue(Uuid::new_v4(), Role::Customer).unwrap();
        assert_eq!(service.verify(&token), Err(TokenError::SignatureInvalid));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let service = service();
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();

        let claims = Claims {
            sub: Uuid::new_v4(),
            role: Role::Customer,
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode(
            &Header::new(jsonwebtoken::Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        assert_eq!(service.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_garbage_token_is_malformed() {
        let service = service();
        assert_eq!(service.verify("not-a-token"), Err(TokenError::Malformed));
        assert_eq!(service.verify(""), Err(TokenError::Malformed));
    }

    #[test]
    fn test_role_parse_round_trip() {
        assert_eq!(Role::parse("customer"), Some(Role::Customer));
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("host"), None);
        assert_eq!(Role::parse(Role::Admin.as_str()), Some(Role::Admin));
    }
}
