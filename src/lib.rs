//! Account registration and JWT login service.
//!
//! Registration input is validated field by field before an account is
//! created through an [`accounts::AccountStore`]; login delegates to a
//! [`accounts::TokenObtainPair`] and returns the token pair together with
//! the user's profile claims.

pub mod accounts;
pub mod app;
pub mod config;
pub mod error;
pub mod json;
pub mod state;

pub use app::build_app;
pub use error::{AppError, AppResult, FieldErrors};
pub use state::AppState;
