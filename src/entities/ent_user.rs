// EntUser - account rows and their queries

use sqlx::{FromRow, QueryBuilder, Sqlite, SqliteExecutor};

use crate::core::{Page, Timestamp, UserId};
use crate::error::{db_error, AppResult};

const USER_COLUMNS: &str = "id, nick_name, email, password_hash, is_federated, is_verified, \
     name, last_name, gender, profile_image, cover_image, description, gamification_level, \
     number_of_followers, number_of_following, token_version, deleted_at, created_at, updated_at";

#[derive(Debug, Clone, FromRow)]
pub struct EntUser {
    pub id: UserId,
    pub nick_name: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub is_federated: bool,
    pub is_verified: bool,
    pub name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub profile_image: Option<String>,
    pub cover_image: Option<String>,
    pub description: Option<String>,
    pub gamification_level: i64,
    pub number_of_followers: i64,
    pub number_of_following: i64,
    pub token_version: i64,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: UserId,
    pub nick_name: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub is_federated: bool,
    pub is_verified: bool,
    pub created_at: Timestamp,
}

/// Profile fields a user may edit. `None` leaves the stored value alone.
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub profile_image: Option<String>,
    pub cover_image: Option<String>,
    pub description: Option<String>,
}

impl ProfileChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.last_name.is_none()
            && self.gender.is_none()
            && self.profile_image.is_none()
            && self.cover_image.is_none()
            && self.description.is_none()
    }
}

impl EntUser {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Any row with this id, including soft-deleted accounts.
    pub async fn gen_nullable<'e, E>(executor: E, id: UserId) -> AppResult<Option<Self>>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, EntUser>(&format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS))
            .bind(id)
            .fetch_optional(executor)
            .await
            .map_err(db_error("Failed to load user"))
    }

    pub async fn gen_live<'e, E>(executor: E, id: UserId) -> AppResult<Option<Self>>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, EntUser>(&format!(
            "SELECT {} FROM users WHERE id = ? AND deleted_at IS NULL",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(executor)
        .await
        .map_err(db_error("Failed to load user"))
    }

    pub async fn gen_live_by_email<'e, E>(executor: E, email: &str) -> AppResult<Option<Self>>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, EntUser>(&format!(
            "SELECT {} FROM users WHERE email = ? AND deleted_at IS NULL",
            USER_COLUMNS
        ))
        .bind(email.trim())
        .fetch_optional(executor)
        .await
        .map_err(db_error("Failed to load user by email"))
    }

    /// True when a live account already uses this email or nickname (case-insensitive).
    pub async fn identity_taken<'e, E>(executor: E, email: &str, nick_name: &str) -> AppResult<bool>
    where
        E: SqliteExecutor<'e>,
    {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM users WHERE deleted_at IS NULL AND (email = ? OR nick_name = ?)",
        )
        .bind(email.trim())
        .bind(nick_name.trim())
        .fetch_one(executor)
        .await
        .map_err(db_error("Failed to check identity"))?;
        Ok(count > 0)
    }

    pub async fn insert<'e, E>(executor: E, new: &NewUser) -> AppResult<()>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query(
            "INSERT INTO users (id, nick_name, email, password_hash, is_federated, is_verified, \
             created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(new.id)
        .bind(new.nick_name.trim())
        .bind(new.email.trim())
        .bind(new.password_hash.as_deref())
        .bind(new.is_federated)
        .bind(new.is_verified)
        .bind(new.created_at)
        .bind(new.created_at)
        .execute(executor)
        .await
        .map_err(db_error("Failed to create user"))?;
        Ok(())
    }

    pub async fn mark_verified<'e, E>(executor: E, id: UserId, now: Timestamp) -> AppResult<()>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query("UPDATE users SET is_verified = 1, updated_at = ? WHERE id = ?")
            .bind(now)
            .bind(id)
            .execute(executor)
            .await
            .map_err(db_error("Failed to verify user"))?;
        Ok(())
    }

    pub async fn update_profile<'e, E>(
        executor: E,
        id: UserId,
        changes: &ProfileChanges,
        now: Timestamp,
    ) -> AppResult<()>
    where
        E: SqliteExecutor<'e>,
    {
        let mut qb = QueryBuilder::<Sqlite>::new("UPDATE users SET updated_at = ");
        qb.push_bind(now);

        let fields = [
            ("name", &changes.name),
            ("last_name", &changes.last_name),
            ("gender", &changes.gender),
            ("profile_image", &changes.profile_image),
            ("cover_image", &changes.cover_image),
            ("description", &changes.description),
        ];
        for (column, value) in fields {
            if let Some(value) = value {
                qb.push(format!(", {} = ", column));
                qb.push_bind(value.clone());
            }
        }

        qb.push(" WHERE id = ");
        qb.push_bind(id);
        qb.push(" AND deleted_at IS NULL");

        qb.build()
            .execute(executor)
            .await
            .map_err(db_error("Failed to update profile"))?;
        Ok(())
    }

    /// Store a new password hash. Outstanding tokens are revoked with it.
    pub async fn set_password<'e, E>(executor: E, id: UserId, hash: &str, now: Timestamp) -> AppResult<()>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query(
            "UPDATE users SET password_hash = ?, token_version = token_version + 1, updated_at = ? \
             WHERE id = ?",
        )
        .bind(hash)
        .bind(now)
        .bind(id)
        .execute(executor)
        .await
        .map_err(db_error("Failed to update password"))?;
        Ok(())
    }

    pub async fn bump_token_version<'e, E>(executor: E, id: UserId, now: Timestamp) -> AppResult<()>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query("UPDATE users SET token_version = token_version + 1, updated_at = ? WHERE id = ?")
            .bind(now)
            .bind(id)
            .execute(executor)
            .await
            .map_err(db_error("Failed to revoke tokens"))?;
        Ok(())
    }

    /// Tombstone the account. Identity columns are kept; the partial unique indexes ignore them.
    /// Opening write of a transaction on a live user; see `EntPost::lock_for_update`.
    pub async fn lock_live<'e, E>(executor: E, id: UserId) -> AppResult<bool>
    where
        E: SqliteExecutor<'e>,
    {
        let result = sqlx::query(
            "UPDATE users SET token_version = token_version WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(executor)
        .await
        .map_err(db_error("Failed to lock user"))?;
        Ok(result.rows_affected() == 1)
    }

    pub async fn soft_delete<'e, E>(executor: E, id: UserId, now: Timestamp) -> AppResult<bool>
    where
        E: SqliteExecutor<'e>,
    {
        let result = sqlx::query(
            "UPDATE users SET deleted_at = ?, token_version = token_version + 1, \
             number_of_followers = 0, number_of_following = 0, updated_at = ? \
             WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(now)
        .bind(now)
        .bind(id)
        .execute(executor)
        .await
        .map_err(db_error("Failed to delete user"))?;
        Ok(result.rows_affected() == 1)
    }

    pub async fn set_gamification_level<'e, E>(executor: E, id: UserId, level: i64) -> AppResult<()>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query("UPDATE users SET gamification_level = ? WHERE id = ?")
            .bind(level)
            .bind(id)
            .execute(executor)
            .await
            .map_err(db_error("Failed to update gamification level"))?;
        Ok(())
    }

    /// Recompute both cached follow counts from the edge table.
    pub async fn refresh_follow_counts<'e, E>(executor: E, id: UserId) -> AppResult<()>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query(
            "UPDATE users SET \
             number_of_followers = (SELECT COUNT(*) FROM follows f JOIN users u ON u.id = f.follower_id \
                 WHERE f.followee_id = users.id AND u.deleted_at IS NULL), \
             number_of_following = (SELECT COUNT(*) FROM follows f JOIN users u ON u.id = f.followee_id \
                 WHERE f.follower_id = users.id AND u.deleted_at IS NULL) \
             WHERE id = ?",
        )
        .bind(id)
        .execute(executor)
        .await
        .map_err(db_error("Failed to refresh follow counts"))?;
        Ok(())
    }

    /// Case-insensitive substring match on name, last name and nickname over live users.
    pub async fn search<'e, E>(executor: E, input: &str, page: Page) -> AppResult<Vec<Self>>
    where
        E: SqliteExecutor<'e>,
    {
        let pattern = format!("%{}%", escape_like(input.trim()));
        sqlx::query_as::<_, EntUser>(&format!(
            "SELECT {} FROM users WHERE deleted_at IS NULL AND is_verified = 1 AND \
             (name LIKE ? ESCAPE '\\' OR last_name LIKE ? ESCAPE '\\' OR nick_name LIKE ? ESCAPE '\\') \
             ORDER BY nick_name ASC, id ASC LIMIT ? OFFSET ?",
            USER_COLUMNS
        ))
        .bind(&pattern)
        .bind(&pattern)
        .bind(&pattern)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(executor)
        .await
        .map_err(db_error("Failed to search users"))
    }
}

fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("ana"), "ana");
    }
}
