use std::sync::Arc;

use tracing::{info, warn};
use validator::Validate;

use crate::accounts::dto::RegisterRequest;
use crate::accounts::policy::{PasswordValidator, UserAttributes};
use crate::accounts::repo::{AccountStore, StoreError, DUPLICATE_EMAIL};
use crate::accounts::repo_types::{NewAccount, Role, User};
use crate::error::{AppError, AppResult, FieldErrors};

pub(crate) const PASSWORD_MISMATCH: &str = "Password fields didn't match.";
const BLANK: &str = "This field may not be blank.";

/// Validates registration input and hands the accepted subset to the
/// account store.
#[derive(Clone)]
pub struct RegistrationValidator {
    store: Arc<dyn AccountStore>,
    policy: Arc<dyn PasswordValidator>,
}

impl RegistrationValidator {
    pub fn new(store: Arc<dyn AccountStore>, policy: Arc<dyn PasswordValidator>) -> Self {
        Self { store, policy }
    }

    /// Checks every field and collects all failures keyed by field name.
    ///
    /// `password2` is consumed here: the returned [`NewAccount`] carries no
    /// confirmation field.
    pub fn validate(&self, mut raw: RegisterRequest) -> Result<NewAccount, FieldErrors> {
        raw.normalize();

        let mut errors = match raw.validate() {
            Ok(()) => FieldErrors::new(),
            Err(e) => FieldErrors::from(e),
        };

        for (field, value) in [("first_name", &raw.first_name), ("last_name", &raw.last_name)] {
            if value.as_deref() == Some("") {
                errors.add(field, BLANK);
            }
        }

        let role = match raw.role.as_deref() {
            None => Role::default(),
            Some(value) => value.parse::<Role>().unwrap_or_else(|msg| {
                errors.add("role", msg);
                Role::default()
            }),
        };

        if let Some(password) = raw.password.as_deref() {
            let attrs = UserAttributes {
                email: raw.email.as_deref(),
                first_name: raw.first_name.as_deref(),
                last_name: raw.last_name.as_deref(),
            };
            if let Err(messages) = self.policy.validate(password, &attrs) {
                for message in messages {
                    errors.add("password", message);
                }
            }
        }

        if let (Some(password), Some(password2)) = (&raw.password, &raw.password2) {
            if password != password2 {
                errors.add("password", PASSWORD_MISMATCH);
            }
        }

        match (raw.email, raw.password, raw.first_name, raw.last_name) {
            (Some(email), Some(password), Some(first_name), Some(last_name)) if errors.is_empty() => {
                Ok(NewAccount {
                    email,
                    password,
                    first_name,
                    last_name,
                    role,
                })
            }
            _ => Err(errors),
        }
    }

    /// Creates the account through the store. An email that is already
    /// registered is reported as an `email` field error.
    pub async fn create(&self, account: NewAccount) -> AppResult<User> {
        if self.store.find_by_email(&account.email).await?.is_some() {
            warn!(email = %account.email, "email already registered");
            return Err(FieldErrors::single("email", DUPLICATE_EMAIL).into());
        }

        let user = match self.store.create_user(account).await {
            Ok(user) => user,
            Err(StoreError::DuplicateEmail) => {
                warn!("email registered concurrently");
                return Err(FieldErrors::single("email", DUPLICATE_EMAIL).into());
            }
            Err(e) => return Err(e.into()),
        };

        info!(user_id = %user.id, email = %user.email, role = %user.role, "user registered");
        Ok(user)
    }

    pub async fn register(&self, raw: RegisterRequest) -> AppResult<User> {
        let account = self.validate(raw).map_err(|errors| {
            warn!(fields = ?errors.fields().collect::<Vec<_>>(), "registration rejected");
            AppError::Validation(errors)
        })?;
        self.create(account).await
    }
}
