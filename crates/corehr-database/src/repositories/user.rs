//! PostgreSQL credential store implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use corehr_core::error::{AppError, ErrorKind};
use corehr_core::result::AppResult;
use corehr_core::traits::CredentialStore;
use corehr_core::types::pagination::{PageRequest, PageResponse};
use corehr_entity::token::{PasswordResetToken, RefreshToken};
use corehr_entity::user::{NewUser, User, UserUpdate};

/// Credential store backed by PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    /// Create a new store on the given pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(email) = LOWER($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find user by email", e)
            })
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user by id", e))
    }

    async fn create(&self, data: &NewUser) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (name, email, password_hash, role, is_active, employee_id) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING *",
        )
        .bind(&data.name)
        .bind(&data.email)
        .bind(&data.password_hash)
        .bind(data.role)
        .bind(data.is_active)
        .bind(data.employee_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.constraint() == Some("users_email_key") => {
                AppError::conflict("Email is already in use")
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create user", e),
        })
    }

    async fn update(&self, id: Uuid, data: &UserUpdate) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET name = COALESCE($2, name), \
                              email = COALESCE($3, email), \
                              role = COALESCE($4, role), \
                              is_active = COALESCE($5, is_active), \
                              last_login_at = COALESCE($6, last_login_at), \
                              updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&data.name)
        .bind(&data.email)
        .bind(data.role)
        .bind(data.is_active)
        .bind(data.last_login_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update user", e))?
        .ok_or_else(|| AppError::not_found(format!("User {id} not found")))
    }

    async fn list(&self, page: &PageRequest) -> AppResult<PageResponse<User>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count users", e))?;

        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users ORDER BY created_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list users", e))?;

        Ok(PageResponse::new(
            users,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    async fn find_by_refresh_token(&self, token: &str) -> AppResult<Option<RefreshToken>> {
        sqlx::query_as::<_, RefreshToken>("SELECT * FROM refresh_tokens WHERE token = $1")
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find refresh token", e)
            })
    }

    async fn save_refresh_token(&self, record: &RefreshToken) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO refresh_tokens (token, user_id, expires_at, created_at) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(&record.token)
        .bind(record.user_id)
        .bind(record.expires_at)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to save refresh token", e)
        })?;
        Ok(())
    }

    async fn invalidate_refresh_token(&self, token: &str) -> AppResult<()> {
        sqlx::query("DELETE FROM refresh_tokens WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to invalidate refresh token", e)
            })?;
        Ok(())
    }

    async fn invalidate_refresh_tokens_for_user(&self, user_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Database,
                    "Failed to invalidate user refresh tokens",
                    e,
                )
            })?;
        Ok(result.rows_affected())
    }

    async fn rotate_refresh_token(
        &self,
        old_token: &str,
        new_record: &RefreshToken,
    ) -> AppResult<()> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin rotation", e)
        })?;

        let deleted = sqlx::query("DELETE FROM refresh_tokens WHERE token = $1")
            .bind(old_token)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete rotated token", e)
            })?;

        // Someone else consumed the token between lookup and rotation —
        // the caller treats this as reuse.
        if deleted.rows_affected() == 0 {
            return Err(AppError::not_found("Refresh token not found"));
        }

        sqlx::query(
            "INSERT INTO refresh_tokens (token, user_id, expires_at, created_at) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(&new_record.token)
        .bind(new_record.user_id)
        .bind(new_record.expires_at)
        .bind(new_record.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to insert rotated token", e)
        })?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit rotation", e)
        })?;

        Ok(())
    }

    async fn save_password_reset_token(&self, record: &PasswordResetToken) -> AppResult<()> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin reset-token save", e)
        })?;

        // At most one active reset token per user.
        sqlx::query("DELETE FROM password_reset_tokens WHERE user_id = $1")
            .bind(record.user_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to clear prior reset tokens", e)
            })?;

        sqlx::query(
            "INSERT INTO password_reset_tokens (token, user_id, expires_at, created_at) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(&record.token)
        .bind(record.user_id)
        .bind(record.expires_at)
        .bind(record.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to save reset token", e)
        })?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit reset-token save", e)
        })?;

        Ok(())
    }

    async fn find_by_password_reset_token(
        &self,
        token: &str,
    ) -> AppResult<Option<PasswordResetToken>> {
        sqlx::query_as::<_, PasswordResetToken>(
            "SELECT * FROM password_reset_tokens WHERE token = $1 AND expires_at > NOW()",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find reset token", e))
    }

    async fn remove_password_reset_token(&self, user_id: Uuid) -> AppResult<()> {
        sqlx::query("DELETE FROM password_reset_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to remove reset token", e)
            })?;
        Ok(())
    }

    async fn update_password(&self, user_id: Uuid, password_hash: &str) -> AppResult<()> {
        let result =
            sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
                .bind(user_id)
                .bind(password_hash)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to update password", e)
                })?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("User {user_id} not found")));
        }
        Ok(())
    }

    async fn save_two_factor_secret(&self, user_id: Uuid, secret: &str) -> AppResult<()> {
        let result =
            sqlx::query("UPDATE users SET two_factor_secret = $2, updated_at = NOW() WHERE id = $1")
                .bind(user_id)
                .bind(secret)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to save 2FA secret", e)
                })?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("User {user_id} not found")));
        }
        Ok(())
    }

    async fn enable_two_factor(&self, user_id: Uuid) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE users SET two_factor_enabled = TRUE, updated_at = NOW() WHERE id = $1",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to enable 2FA", e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("User {user_id} not found")));
        }
        Ok(())
    }
}
