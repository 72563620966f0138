use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::accounts::dto::{normalize_email, LoginRequest, TokenResponse, REQUIRED};
use crate::accounts::jwt::{JwtKeys, TokenPair};
use crate::accounts::password::verify_password;
use crate::accounts::repo::AccountStore;
use crate::accounts::repo_types::User;
use crate::error::{AppError, AppResult, FieldErrors};

pub const NO_ACTIVE_ACCOUNT: &str = "No active account found with the given credentials";

/// Credentials keyed by email.
#[derive(Debug, Clone)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = FieldErrors;

    fn try_from(req: LoginRequest) -> Result<Self, Self::Error> {
        let mut errors = FieldErrors::new();
        let email = req.email.map(|e| normalize_email(&e)).filter(|e| !e.is_empty());
        let password = req.password.filter(|p| !p.is_empty());
        if email.is_none() {
            errors.add("email", REQUIRED);
        }
        if password.is_none() {
            errors.add("password", REQUIRED);
        }
        match (email, password) {
            (Some(email), Some(password)) => Ok(Self { email, password }),
            _ => Err(errors),
        }
    }
}

/// A freshly minted token pair and the user it was issued for.
#[derive(Debug, Clone)]
pub struct ObtainedPair {
    pub tokens: TokenPair,
    pub user: User,
}

/// Authentication and token-minting collaborator.
#[async_trait]
pub trait TokenObtainPair: Send + Sync {
    /// Fails with [`AppError::Authentication`] for unknown emails, wrong
    /// passwords and inactive accounts.
    async fn obtain(&self, credentials: &LoginCredentials) -> AppResult<ObtainedPair>;
}

/// Resolves the user from the account store, checks the argon2 hash and
/// signs an access/refresh pair.
#[derive(Clone)]
pub struct JwtTokenObtainPair {
    store: Arc<dyn AccountStore>,
    keys: JwtKeys,
}

impl JwtTokenObtainPair {
    pub fn new(store: Arc<dyn AccountStore>, keys: JwtKeys) -> Self {
        Self { store, keys }
    }
}

#[async_trait]
impl TokenObtainPair for JwtTokenObtainPair {
    async fn obtain(&self, credentials: &LoginCredentials) -> AppResult<ObtainedPair> {
        let user = match self.store.find_by_email(&credentials.email).await? {
            Some(u) => u,
            None => {
                warn!(email = %credentials.email, "login unknown email");
                return Err(AppError::Authentication(NO_ACTIVE_ACCOUNT.into()));
            }
        };

        if !verify_password(&credentials.password, &user.password_hash).await? {
            warn!(email = %credentials.email, user_id = %user.id, "login invalid password");
            return Err(AppError::Authentication(NO_ACTIVE_ACCOUNT.into()));
        }

        if !user.is_active {
            warn!(user_id = %user.id, "login inactive account");
            return Err(AppError::Authentication(NO_ACTIVE_ACCOUNT.into()));
        }

        let tokens = self.keys.sign_pair(user.id)?;
        Ok(ObtainedPair { tokens, user })
    }
}

/// Issues the login response: delegates to a [`TokenObtainPair`] and copies
/// the resolved user's profile fields next to the tokens.
#[derive(Clone)]
pub struct LoginTokenIssuer {
    obtainer: Arc<dyn TokenObtainPair>,
}

impl LoginTokenIssuer {
    pub fn new(obtainer: Arc<dyn TokenObtainPair>) -> Self {
        Self { obtainer }
    }

    pub async fn validate(&self, credentials: &LoginCredentials) -> AppResult<TokenResponse> {
        let ObtainedPair { tokens, user } = self.obtainer.obtain(credentials).await?;
        info!(user_id = %user.id, email = %user.email, "user logged in");
        Ok(TokenResponse {
            access: tokens.access,
            refresh: tokens.refresh,
            email: user.email,
            role: user.role,
            first_name: user.first_name,
            last_name: user.last_name,
        })
    }
}
