use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod handlers;
pub mod jwt;
pub mod login;
pub mod memory;
mod password;
pub mod policy;
pub mod register;
pub mod repo;
pub mod repo_types;

pub use login::{JwtTokenObtainPair, LoginCredentials, LoginTokenIssuer, TokenObtainPair};
pub use memory::MemoryAccountStore;
pub use policy::{DefaultPasswordPolicy, PasswordValidator};
pub use register::RegistrationValidator;
pub use repo::{AccountStore, PgAccountStore, StoreError};
pub use repo_types::{NewAccount, Role, User};

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::auth_routes())
        .merge(handlers::me_routes())
}
