use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::accounts::password::hash_password;
use crate::accounts::repo_types::{NewAccount, User, UserRow};
use crate::error::{AppError, FieldErrors};

pub(crate) const DUPLICATE_EMAIL: &str = "user with this email already exists.";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("user with this email already exists")]
    DuplicateEmail,

    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail => {
                AppError::Validation(FieldErrors::single("email", DUPLICATE_EMAIL))
            }
            StoreError::Database(e) => AppError::Database(e),
            StoreError::Other(e) => AppError::Internal(e),
        }
    }
}

/// Persistence collaborator for user accounts.
///
/// `create_user` owns password hashing: callers pass the validated plain
/// password and never see the hash.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn create_user(&self, account: NewAccount) -> Result<User, StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
}

#[derive(Clone)]
pub struct PgAccountStore {
    db: PgPool,
}

impl PgAccountStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn create_user(&self, account: NewAccount) -> Result<User, StoreError> {
        let hash = hash_password(&account.password).await?;
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (email, password_hash, first_name, last_name, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, email, first_name, last_name, role, is_active, password_hash, created_at
            "#,
        )
        .bind(&account.email)
        .bind(&hash)
        .bind(&account.first_name)
        .bind(&account.last_name)
        .bind(account.role.as_str())
        .fetch_one(&self.db)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                StoreError::DuplicateEmail
            }
            other => StoreError::Database(other),
        })?;
        Ok(User::try_from(row)?)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, first_name, last_name, role, is_active, password_hash, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(row.map(User::try_from).transpose()?)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, first_name, last_name, role, is_active, password_hash, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row.map(User::try_from).transpose()?)
    }
}
