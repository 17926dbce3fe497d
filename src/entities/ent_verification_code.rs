// EntVerificationCode - pending email verification codes, one per address

use sqlx::{FromRow, SqliteExecutor};

use crate::core::Timestamp;
use crate::error::{db_error, AppResult};

#[derive(Debug, Clone, FromRow)]
pub struct EntVerificationCode {
    pub email: String,
    pub code: String,
    pub attempts: i64,
    pub expires_at: Timestamp,
    pub created_at: Timestamp,
}

impl EntVerificationCode {
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.expires_at <= now
    }

    /// Replace any earlier code for the address and reset its attempt counter.
    pub async fn upsert<'e, E>(
        executor: E,
        email: &str,
        code: &str,
        expires_at: Timestamp,
        now: Timestamp,
    ) -> AppResult<()>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query(
            "INSERT INTO verification_codes (email, code, attempts, expires_at, created_at) \
             VALUES (?, ?, 0, ?, ?) \
             ON CONFLICT(email) DO UPDATE SET code = excluded.code, attempts = 0, \
             expires_at = excluded.expires_at, created_at = excluded.created_at",
        )
        .bind(email.trim())
        .bind(code)
        .bind(expires_at)
        .bind(now)
        .execute(executor)
        .await
        .map_err(db_error("Failed to store verification code"))?;
        Ok(())
    }

    pub async fn gen_nullable<'e, E>(executor: E, email: &str) -> AppResult<Option<Self>>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, EntVerificationCode>(
            "SELECT email, code, attempts, expires_at, created_at FROM verification_codes WHERE email = ?",
        )
        .bind(email.trim())
        .fetch_optional(executor)
        .await
        .map_err(db_error("Failed to load verification code"))
    }

    /// Charge one attempt against a live code in a single statement and hand back the code
    /// to compare against. `None` once the budget is spent or the code has expired.
    pub async fn spend_attempt<'e, E>(
        executor: E,
        email: &str,
        max_attempts: i64,
        now: Timestamp,
    ) -> AppResult<Option<String>>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_scalar(
            "UPDATE verification_codes SET attempts = attempts + 1 \
             WHERE email = ? AND attempts < ? AND expires_at > ? RETURNING code",
        )
        .bind(email.trim())
        .bind(max_attempts)
        .bind(now)
        .fetch_optional(executor)
        .await
        .map_err(db_error("Failed to record attempt"))
    }

    /// Remove the code if it is still the one that was matched. Only one caller wins.
    pub async fn consume<'e, E>(executor: E, email: &str, code: &str) -> AppResult<bool>
    where
        E: SqliteExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM verification_codes WHERE email = ? AND code = ?")
            .bind(email.trim())
            .bind(code)
            .execute(executor)
            .await
            .map_err(db_error("Failed to delete verification code"))?;
        Ok(result.rows_affected() == 1)
    }
}
