use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SecurityConfig;
use crate::models::User;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User name
    pub sub: String,
    pub roles: Vec<String>,
    pub iss: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user: &User, security: &SecurityConfig) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::minutes(security.jwt_expiry_minutes as i64)).timestamp();

        Self {
            sub: user.user_name.clone(),
            roles: user.roles.clone(),
            iss: security.jwt_issuer.clone(),
            exp,
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authentication failed. Wrong user name or password.")]
    InvalidCredentials,

    #[error("{0}")]
    MissingToken(String),

    #[error("Invalid JWT token: {0}")]
    InvalidToken(String),

    #[error("User lacks the required role '{0}'")]
    MissingRole(String),

    #[error("JWT secret not configured")]
    InvalidSecret,

    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),
}

pub fn generate_jwt(claims: &Claims, security: &SecurityConfig) -> Result<String, AuthError> {
    if security.jwt_secret.is_empty() {
        return Err(AuthError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(security.jwt_secret.as_bytes());
    encode(&Header::new(Algorithm::HS256), claims, &encoding_key)
        .map_err(|e| AuthError::TokenGeneration(e.to_string()))
}

/// Validate signature, expiry and issuer, returning the claims.
pub fn validate_jwt(token: &str, security: &SecurityConfig) -> Result<Claims, AuthError> {
    if security.jwt_secret.is_empty() {
        return Err(AuthError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(security.jwt_secret.as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[security.jwt_issuer.as_str()]);

    decode::<Claims>(token, &decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(|e| AuthError::InvalidToken(e.to_string()))
}

/// Argon2id hash of `password` as a PHC string with a random salt.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::PasswordHash(e.to_string()))
}

/// Check `password` against a stored PHC string. Unparseable hashes never match.
pub fn verify_password(password: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use uuid::Uuid;

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            user_name: "jdoe".into(),
            first_name: None,
            last_name: None,
            email: None,
            phone_number: None,
            password_hash: hash_password("Passw0rd!").unwrap(),
            roles: vec!["Manager".into()],
        }
    }

    #[test]
    fn password_round_trip() {
        let stored = hash_password("Passw0rd!").unwrap();
        assert!(stored.starts_with("$argon2id$"), "{}", stored);
        assert!(verify_password("Passw0rd!", &stored));
        assert!(!verify_password("passw0rd!", &stored));
        assert!(!verify_password("Passw0rd!", "garbage"));
        assert_ne!(stored, hash_password("Passw0rd!").unwrap());
    }

    #[test]
    fn legacy_salted_digests_no_longer_verify() {
        let legacy = "0f1e2d3c4b5a69788796a5b4c3d2e1f0$5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8";
        assert!(!verify_password("password", legacy));
    }

    #[test]
    fn issued_token_validates_with_same_config() {
        let security = AppConfig::development().security;
        let claims = Claims::new(&user(), &security);
        let token = generate_jwt(&claims, &security).unwrap();
        let decoded = validate_jwt(&token, &security).unwrap();
        assert_eq!(decoded.sub, "jdoe");
        assert_eq!(decoded.roles, vec!["Manager"]);
    }

    #[test]
    fn token_from_other_issuer_is_rejected() {
        let security = AppConfig::development().security;
        let mut other = security.clone();
        other.jwt_issuer = "SomeoneElse".into();
        let token = generate_jwt(&Claims::new(&user(), &other), &other).unwrap();
        assert!(matches!(validate_jwt(&token, &security), Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn empty_secret_is_a_configuration_error() {
        let mut security = AppConfig::development().security;
        security.jwt_secret.clear();
        assert!(matches!(
            generate_jwt(&Claims::new(&user(), &security), &security),
            Err(AuthError::InvalidSecret)
        ));
    }
}
