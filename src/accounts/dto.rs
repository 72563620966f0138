use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::accounts::repo_types::{Role, User};

pub(crate) const REQUIRED: &str = "This field is required.";

/// Trims the address and lowercases the domain. The local part keeps its
/// case, so `Ada@x.com` and `ada@x.com` are different accounts.
pub fn normalize_email(raw: &str) -> String {
    let trimmed = raw.trim();
    match trimmed.rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
        None => trimmed.to_string(),
    }
}

/// Request body for user registration.
///
/// Every field is optional at the serde level so that a missing field is
/// reported next to the others instead of rejecting the body outright.
#[derive(Debug, Default, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(
        required(message = "This field is required."),
        email(message = "Enter a valid email address.")
    )]
    pub email: Option<String>,
    #[validate(
        required(message = "This field is required."),
        length(min = 8, message = "Ensure this field has at least 8 characters.")
    )]
    pub password: Option<String>,
    #[validate(required(message = "This field is required."))]
    pub password2: Option<String>,
    #[validate(
        required(message = "This field is required."),
        length(max = 30, message = "Ensure this field has no more than 30 characters.")
    )]
    pub first_name: Option<String>,
    #[validate(
        required(message = "This field is required."),
        length(max = 30, message = "Ensure this field has no more than 30 characters.")
    )]
    pub last_name: Option<String>,
    pub role: Option<String>,
}

impl RegisterRequest {
    /// Trims text fields and normalizes the email. Passwords are left as sent.
    pub(crate) fn normalize(&mut self) {
        if let Some(email) = self.email.as_mut() {
            *email = normalize_email(email);
        }
        for name in [&mut self.first_name, &mut self.last_name].into_iter().flatten() {
            *name = name.trim().to_string();
        }
        if let Some(role) = self.role.as_mut() {
            *role = role.trim().to_string();
        }
    }
}

/// Request body for login. Email is the identity field.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Request body for token refresh.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub access: String,
}

/// Login response: the token pair plus profile claims of the authenticated user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenResponse {
    pub access: String,
    pub refresh: String,
    pub email: String,
    pub role: Role,
    pub first_name: String,
    pub last_name: String,
}

/// Public part of the user returned to the client, also the registration
/// response. The password never leaves the server.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            role: user.role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_email_lowercases_only_the_domain() {
        assert_eq!(normalize_email("  Ada@Example.COM "), "Ada@example.com");
        assert_eq!(normalize_email("ada@x.com"), "ada@x.com");
        assert_eq!(normalize_email("weird@local@Host.IO"), "weird@local@host.io");
        assert_eq!(normalize_email(" no-at-sign "), "no-at-sign");
    }
}
