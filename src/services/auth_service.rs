// AuthService - registration, email verification, sessions and password reset

use chrono::Duration;
use rand::Rng;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::config::AuthConfig;
use crate::core::{Timestamp, UserId};
use crate::entities::{EntUser, EntVerificationCode, NewUser};
use crate::error::{AppError, AppResult};
use crate::infrastructure::security::Claims;
use crate::infrastructure::{
    Clock, Database, IdGenerator, Mailer, PasswordHasher, TokenKind, TokenService, ViewerContext,
};
use crate::models::{
    is_valid_nick_name, AuthResponse, MessageResponse, RegisterRequest, TokenValidation, UserView,
};

pub struct AuthService {
    db: Database,
    ids: Arc<IdGenerator>,
    clock: Arc<dyn Clock>,
    hasher: PasswordHasher,
    tokens: Arc<TokenService>,
    mailer: Arc<dyn Mailer>,
    config: AuthConfig,
}

fn generate_code() -> String {
    format!("{:06}", rand::rng().random_range(0..1_000_000))
}

impl AuthService {
    pub fn new(
        db: Database,
        ids: Arc<IdGenerator>,
        clock: Arc<dyn Clock>,
        hasher: PasswordHasher,
        tokens: Arc<TokenService>,
        mailer: Arc<dyn Mailer>,
        config: AuthConfig,
    ) -> Self {
        Self {
            db,
            ids,
            clock,
            hasher,
            tokens,
            mailer,
            config,
        }
    }

    fn check_password_strength(&self, password: &str) -> AppResult<()> {
        if password.chars().count() < self.config.password_min_length {
            return Err(AppError::Validation(format!(
                "Password must be at least {} characters",
                self.config.password_min_length
            )));
        }
        Ok(())
    }

    fn session(&self, user: EntUser) -> AppResult<AuthResponse> {
        Ok(AuthResponse {
            tokens: self.tokens.issue_pair(user.id, user.token_version)?,
            user: UserView::private(user),
        })
    }

    /// The live user a token was issued to, provided the token has not been revoked.
    async fn token_owner(&self, claims: &Claims) -> AppResult<EntUser> {
        let user = EntUser::gen_live(self.db.pool(), claims.user_id()?)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Account no longer exists".to_string()))?;
        if user.token_version != claims.ver {
            return Err(AppError::Unauthorized("Token has been revoked".to_string()));
        }
        Ok(user)
    }

    async fn issue_code(&self, email: &str) -> AppResult<()> {
        let code = generate_code();
        let now = self.clock.now();
        let expires_at = now + Duration::seconds(self.config.verification_code_ttl_secs as i64);

        EntVerificationCode::upsert(
            self.db.pool(),
            email,
            &code,
            Timestamp::from_datetime(expires_at),
            Timestamp::from_datetime(now),
        )
        .await?;

        let minutes = self.config.verification_code_ttl_secs / 60;
        self.mailer
            .send(
                email,
                "Your verification code",
                &format!("Your code is {}. It expires in {} minutes.", code, minutes),
            )
            .await
    }

    /// Create an unverified account and mail it a verification code.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: RegisterRequest) -> AppResult<MessageResponse> {
        let email = request.email.trim().to_string();
        let nick_name = request.nick_name.trim().to_string();
        if !is_valid_nick_name(&nick_name) {
            return Err(AppError::Validation(
                "nickName may only contain letters, digits, '_' and '.' (3 to 30 characters)"
                    .to_string(),
            ));
        }
        self.check_password_strength(&request.password)?;

        if EntUser::identity_taken(self.db.pool(), &email, &nick_name).await? {
            return Err(AppError::Conflict("Email or nickName already in use".to_string()));
        }

        let password_hash = self.hasher.hash(&request.password)?;
        EntUser::insert(
            self.db.pool(),
            &NewUser {
                id: UserId::new(self.ids.next_id()),
                nick_name,
                email: email.clone(),
                password_hash: Some(password_hash),
                is_federated: false,
                is_verified: false,
                created_at: self.clock.now_timestamp(),
            },
        )
        .await?;

        self.issue_code(&email).await?;
        info!("Registered {}, awaiting verification", email);
        Ok(MessageResponse::new("Verification code sent to your email"))
    }

    /// Send a fresh code to a registered, not yet verified address.
    pub async fn resend_code(&self, email: &str) -> AppResult<MessageResponse> {
        let user = EntUser::gen_live_by_email(self.db.pool(), email)
            .await?
            .ok_or_else(|| AppError::NotFound("No account for this email".to_string()))?;
        if user.is_verified {
            return Err(AppError::Conflict("This email is already verified".to_string()));
        }

        self.issue_code(&user.email).await?;
        Ok(MessageResponse::new("Verification code sent to your email"))
    }

    #[instrument(skip(self, code))]
    pub async fn verify_code(&self, email: &str, code: &str) -> AppResult<AuthResponse> {
        let now = self.clock.now_timestamp();
        let gone = || AppError::NotFound("Verification code not found or expired".to_string());
        EntVerificationCode::gen_nullable(self.db.pool(), email)
            .await?
            .filter(|r| !r.is_expired(now))
            .ok_or_else(gone)?;

        // The attempt is paid for before the comparison, so parallel guesses share one budget.
        let expected = EntVerificationCode::spend_attempt(
            self.db.pool(),
            email,
            self.config.verification_max_attempts as i64,
            now,
        )
        .await?
        .ok_or_else(|| {
            AppError::TooManyRequests("Too many failed attempts, request a new code".to_string())
        })?;
        if expected != code.trim() {
            warn!("Wrong verification code for {}", email);
            return Err(AppError::BadRequest("Invalid verification code".to_string()));
        }

        let mut tx = self.db.pool().begin().await?;
        if !EntVerificationCode::consume(&mut *tx, email, &expected).await? {
            return Err(gone());
        }
        let user = EntUser::gen_live_by_email(&mut *tx, email)
            .await?
            .ok_or_else(|| AppError::NotFound("No account for this email".to_string()))?;
        EntUser::mark_verified(&mut *tx, user.id, now).await?;
        tx.commit().await?;

        let user = EntUser::gen_live(self.db.pool(), user.id)
            .await?
            .ok_or_else(|| AppError::NotFound("No account for this email".to_string()))?;
        info!("Verified {}", user.email);
        self.session(user)
    }

    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> AppResult<AuthResponse> {
        let invalid = || AppError::Unauthorized("Invalid credentials".to_string());

        let user = EntUser::gen_live_by_email(self.db.pool(), email)
            .await?
            .ok_or_else(invalid)?;
        let hash = user.password_hash.as_deref().ok_or_else(invalid)?;
        if !self.hasher.verify(password, hash)? {
            return Err(invalid());
        }
        if !user.is_verified {
            return Err(AppError::Forbidden(
                "Please verify your email before signing in".to_string(),
            ));
        }

        self.session(user)
    }

    pub async fn refresh(&self, refresh_token: &str) -> AppResult<AuthResponse> {
        let claims = self.tokens.verify(refresh_token, &[TokenKind::Refresh])?;
        let user = self.token_owner(&claims).await?;
        self.session(user)
    }

    /// Mail a short-lived reset token.
    pub async fn request_password_reset(&self, email: &str) -> AppResult<MessageResponse> {
        let user = EntUser::gen_live_by_email(self.db.pool(), email)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let token = self
            .tokens
            .issue(user.id, user.token_version, TokenKind::PasswordReset)?;
        self.mailer
            .send(
                &user.email,
                "Reset your password",
                &format!("Use this token to choose a new password: {}", token),
            )
            .await?;

        Ok(MessageResponse::new("Password reset instructions sent"))
    }

    /// The reset token dies with the password change, as does every other outstanding token.
    #[instrument(skip(self, token, new_password))]
    pub async fn reset_password(&self, token: &str, new_password: &str) -> AppResult<MessageResponse> {
        let bad_token = || AppError::BadRequest("Invalid or expired token".to_string());

        let claims = self
            .tokens
            .verify(token, &[TokenKind::PasswordReset])
            .map_err(|_| bad_token())?;
        let user = self.token_owner(&claims).await.map_err(|_| bad_token())?;
        self.check_password_strength(new_password)?;

        let hash = self.hasher.hash(new_password)?;
        EntUser::set_password(self.db.pool(), user.id, &hash, self.clock.now_timestamp()).await?;

        info!("Password reset for user {}", user.id);
        Ok(MessageResponse::new("Password updated"))
    }

    pub async fn validate_token(&self, token: &str) -> AppResult<TokenValidation> {
        let claims = self
            .tokens
            .verify(token, &[TokenKind::Access, TokenKind::Refresh])?;
        let user = self.token_owner(&claims).await?;
        Ok(TokenValidation {
            valid: true,
            user: UserView::private(user),
        })
    }

    /// Access token to viewer, for the auth middleware.
    pub async fn resolve_viewer(&self, token: &str) -> AppResult<ViewerContext> {
        let claims = self.tokens.verify(token, &[TokenKind::Access])?;
        let user = self.token_owner(&claims).await?;
        Ok(ViewerContext::new(user.id, user.token_version))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_six_digits() {
        for _ in 0..100 {
            let code = generate_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }
}
