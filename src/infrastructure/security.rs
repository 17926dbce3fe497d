// Security - password hashing and signed tokens

use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, Params, PasswordHash, PasswordHasher as _, PasswordVerifier as _};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::config::AuthConfig;
use crate::core::UserId;
use crate::error::{AppError, AppResult};
use crate::infrastructure::clock::Clock;

/// Argon2id password hashing with configurable cost.
#[derive(Clone)]
pub struct PasswordHasher {
    params: Params,
}

impl PasswordHasher {
    pub fn new(memory_kib: u32, iterations: u32) -> AppResult<Self> {
        let params = Params::new(memory_kib, iterations, 1, None)
            .map_err(|e| AppError::Internal(format!("Invalid argon2 parameters: {}", e)))?;
        Ok(Self { params })
    }

    pub fn from_config(config: &AuthConfig) -> AppResult<Self> {
        Self::new(config.argon2_memory_kib, config.argon2_iterations)
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(
            argon2::Algorithm::Argon2id,
            argon2::Version::V0x13,
            self.params.clone(),
        )
    }

    pub fn hash(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;

        Ok(password_hash.to_string())
    }

    /// Verify password against a stored PHC string. Parameters are read from the hash itself.
    pub fn verify(&self, password: &str, hash: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AppError::Internal(format!("Invalid password hash: {}", e)))?;

        Ok(self
            .argon2()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Access,
    Refresh,
    PasswordReset,
}

/// JWT claims. `ver` must match the user's current token version for the token to be honoured.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub kind: TokenKind,
    pub ver: i64,
    pub jti: String,
}

impl Claims {
    pub fn user_id(&self) -> AppResult<UserId> {
        self.sub
            .parse()
            .map_err(|_| AppError::Unauthorized("Invalid token subject".to_string()))
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub token: String,
    pub refresh_token: String,
}

pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
    reset_ttl_secs: i64,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    pub fn new(config: &AuthConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            access_ttl_secs: config.access_token_ttl_secs as i64,
            refresh_ttl_secs: config.refresh_token_ttl_secs as i64,
            reset_ttl_secs: config.reset_token_ttl_secs as i64,
            clock,
        }
    }

    fn ttl(&self, kind: TokenKind) -> i64 {
        match kind {
            TokenKind::Access => self.access_ttl_secs,
            TokenKind::Refresh => self.refresh_ttl_secs,
            TokenKind::PasswordReset => self.reset_ttl_secs,
        }
    }

    pub fn issue(&self, user_id: UserId, token_version: i64, kind: TokenKind) -> AppResult<String> {
        let now = self.clock.now().timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now,
            exp: now + self.ttl(kind),
            kind,
            ver: token_version,
            jti: uuid::Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    pub fn issue_pair(&self, user_id: UserId, token_version: i64) -> AppResult<TokenPair> {
        Ok(TokenPair {
            token: self.issue(user_id, token_version, TokenKind::Access)?,
            refresh_token: self.issue(user_id, token_version, TokenKind::Refresh)?,
        })
    }

    /// Check signature, expiry against the injected clock, and that the token is one of `allowed`.
    pub fn verify(&self, token: &str, allowed: &[TokenKind]) -> AppResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| {
                debug!("Rejected token: {}", e);
                AppError::Unauthorized("Invalid token".to_string())
            })?
            .claims;

        if claims.exp <= self.clock.now().timestamp() {
            return Err(AppError::Unauthorized("Token expired".to_string()));
        }
        if !allowed.contains(&claims.kind) {
            return Err(AppError::Unauthorized("Wrong token type".to_string()));
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::ManualClock;
    use chrono::{Duration, TimeZone, Utc};

    fn service(clock: Arc<ManualClock>) -> TokenService {
        let config = AuthConfig {
            jwt_secret: "test-secret".to_string(),
            ..AuthConfig::default()
        };
        TokenService::new(&config, clock)
    }

    #[test]
    fn password_round_trip() {
        let hasher = PasswordHasher::new(8, 1).unwrap();
        let hash = hasher.hash("correct horse").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify("correct horse", &hash).unwrap());
        assert!(!hasher.verify("battery staple", &hash).unwrap());
    }

    #[test]
    fn garbage_hash_is_an_error() {
        let hasher = PasswordHasher::new(8, 1).unwrap();
        assert!(hasher.verify("pw", "not-a-phc-string").is_err());
    }

    #[test]
    fn tokens_expire_with_the_clock() {
        let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()));
        let tokens = service(clock.clone());

        let token = tokens.issue(UserId(42), 0, TokenKind::Access).unwrap();
        let claims = tokens.verify(&token, &[TokenKind::Access]).unwrap();
        assert_eq!(claims.user_id().unwrap(), UserId(42));

        clock.advance(Duration::seconds(3601));
        assert!(matches!(
            tokens.verify(&token, &[TokenKind::Access]),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn token_kind_is_enforced() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let tokens = service(clock);
        let pair = tokens.issue_pair(UserId(1), 3).unwrap();

        assert!(tokens.verify(&pair.refresh_token, &[TokenKind::Access]).is_err());
        let claims = tokens.verify(&pair.refresh_token, &[TokenKind::Refresh]).unwrap();
        assert_eq!(claims.ver, 3);
    }

    #[test]
    fn foreign_signature_is_rejected() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let ours = service(clock.clone());
        let theirs = TokenService::new(
            &AuthConfig {
                jwt_secret: "other".to_string(),
                ..AuthConfig::default()
            },
            clock,
        );
        let token = theirs.issue(UserId(1), 0, TokenKind::Access).unwrap();
        assert!(ours.verify(&token, &[TokenKind::Access]).is_err());
    }
}
