//! Session tokens and password hashing.

use argon2::password_hash::{PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::{Error, Result};

/// Sessions are stateless: the token is the whole session, so its
/// expiry is the only logout the server can enforce.
const TOKEN_LIFETIME_DAYS: i64 = 30;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
}

/// Signs and verifies HS256 session tokens with a secret fixed at
/// construction time.
#[derive(Clone)]
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenSigner {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn issue(&self, user_id: Uuid) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::days(TOKEN_LIFETIME_DAYS)).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| Error::Internal(format!("token encode error: {e}")))
    }

    /// Verify signature and expiry, returning the subject's user id.
    pub fn verify(&self, token: &str) -> Result<Uuid> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default()).map_err(|e| {
            debug!("token rejected: {e}");
            Error::Unauthorized("Not authorized, token failed.".to_string())
        })?;

        Uuid::parse_str(&data.claims.sub)
            .map_err(|_| Error::Unauthorized("Not authorized, token failed.".to_string()))
    }
}

pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| Error::Internal(format!("password hash error: {e}")))
}

/// Check a password against a stored PHC hash. A mismatch is a normal
/// `Ok(false)`; only unreadable hashes are errors.
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| Error::Internal(format!("stored credential unreadable: {e}")))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(Error::Internal(format!("password verify error: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_roundtrip() {
        let hash = hash_password("hunter2hunter2").unwrap();
        assert!(verify_password("hunter2hunter2", &hash).unwrap());
        assert!(!verify_password("wrong password", &hash).unwrap());
    }

    #[test]
    fn hashes_are_salted() {
        let h1 = hash_password("same input").unwrap();
        let h2 = hash_password("same input").unwrap();
        assert_ne!(h1, h2);
    }

    #[test]
    fn token_roundtrip() {
        let signer = TokenSigner::new("test-secret");
        let user_id = Uuid::new_v4();

        let token = signer.issue(user_id).unwrap();
        assert_eq!(signer.verify(&token).unwrap(), user_id);
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let signer = TokenSigner::new("test-secret");
        let other = TokenSigner::new("another-secret");

        let token = other.issue(Uuid::new_v4()).unwrap();
        assert!(signer.verify(&token).is_err());
    }

    #[test]
    fn garbage_token_is_rejected() {
        let signer = TokenSigner::new("test-secret");
        assert!(signer.verify("not-a-jwt").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let signer = TokenSigner::new("test-secret");
        let past = Utc::now().timestamp() - 3600;
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            iat: past - 60,
            exp: past,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        assert!(signer.verify(&token).is_err());
    }

    #[test]
    fn non_uuid_subject_is_rejected() {
        let signer = TokenSigner::new("test-secret");
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "not-a-uuid".to_string(),
            iat: now,
            exp: now + 3600,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        assert!(signer.verify(&token).is_err());
    }
}
