use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct UserModel {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Pending password reset; only the SHA-256 of the token is kept.
#[derive(Debug, Clone, FromRow)]
pub struct PasswordResetModel {
    pub user_id: String,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
}
