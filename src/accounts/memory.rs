use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::accounts::password::hash_password;
use crate::accounts::repo::{AccountStore, StoreError};
use crate::accounts::repo_types::{NewAccount, User};

/// Process-local account store keyed by email. Used by tests and local runs
/// without Postgres.
#[derive(Default)]
pub struct MemoryAccountStore {
    users: RwLock<HashMap<String, User>>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }

    /// Returns false when no account has this email.
    pub async fn set_active(&self, email: &str, active: bool) -> bool {
        match self.users.write().await.get_mut(email) {
            Some(user) => {
                user.is_active = active;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn create_user(&self, account: NewAccount) -> Result<User, StoreError> {
        let password_hash = hash_password(&account.password).await?;
        let mut users = self.users.write().await;
        if users.contains_key(&account.email) {
            return Err(StoreError::DuplicateEmail);
        }
        let user = User {
            id: Uuid::new_v4(),
            email: account.email,
            first_name: account.first_name,
            last_name: account.last_name,
            role: account.role,
            is_active: true,
            password_hash,
            created_at: OffsetDateTime::now_utc(),
        };
        users.insert(user.email.clone(), user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.id == id)
            .cloned())
    }
}
