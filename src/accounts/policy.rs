//! Password strength policy.
//!
//! Registration only talks to the [`PasswordValidator`] trait; the default
//! policy combines a minimum length, similarity to the user's own
//! attributes, a common-password list and a numeric-only check.

use lazy_static::lazy_static;
use regex::Regex;
use strsim::normalized_levenshtein;

/// User data a policy may compare the password against.
#[derive(Debug, Clone, Default)]
pub struct UserAttributes<'a> {
    pub email: Option<&'a str>,
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
}

pub trait PasswordValidator: Send + Sync {
    /// Returns every failed rule's message; `Ok(())` when the password passes.
    fn validate(&self, password: &str, user: &UserAttributes<'_>) -> Result<(), Vec<String>>;
}

const COMMON_PASSWORDS: &[&str] = &[
    "123456", "password", "12345678", "qwerty", "123456789", "12345", "1234", "111111",
    "1234567", "dragon", "123123", "baseball", "abc123", "football", "monkey", "letmein",
    "696969", "shadow", "master", "666666", "qwertyuiop", "123321", "mustang", "1234567890",
    "michael", "654321", "superman", "1qaz2wsx", "7777777", "121212", "000000", "qazwsx",
    "123qwe", "killer", "trustno1", "jordan", "jennifer", "zxcvbnm", "asdfgh", "hunter",
    "buster", "soccer", "harley", "batman", "andrew", "tigger", "sunshine", "iloveyou",
    "2000", "charlie", "robert", "thomas", "hockey", "ranger", "daniel", "starwars",
    "klaster", "112233", "george", "computer", "michelle", "jessica", "pepper", "1111",
    "zxcvbn", "555555", "11111111", "131313", "freedom", "777777", "pass", "maggie",
    "159753", "aaaaaa", "ginger", "princess", "joshua", "cheese", "amanda", "summer",
    "love", "ashley", "nicole", "chelsea", "biteme", "matthew", "access", "yankees",
    "987654321", "dallas", "austin", "thunder", "taylor", "matrix", "password1",
    "password123", "passw0rd", "welcome", "welcome1", "admin", "admin123", "login",
    "qwerty123", "iloveyou1", "football1", "baseball1", "letmein1", "changeme",
    "secret", "administrator", "student", "student1", "p@ssw0rd", "p@ssword",
];

lazy_static! {
    static ref NON_WORD: Regex = Regex::new(r"\W+").unwrap();
}

/// Passwords scoring at or above this against an attribute are rejected.
const MAX_SIMILARITY: f64 = 0.7;

#[derive(Debug, Clone)]
pub struct DefaultPasswordPolicy {
    min_length: usize,
}

impl DefaultPasswordPolicy {
    pub fn new(min_length: usize) -> Self {
        Self { min_length }
    }

    fn check_length(&self, password: &str) -> Option<String> {
        if password.chars().count() < self.min_length {
            let unit = if self.min_length == 1 { "character" } else { "characters" };
            return Some(format!(
                "This password is too short. It must contain at least {} {}.",
                self.min_length, unit
            ));
        }
        None
    }

    /// Compares the whole password against each attribute and against its
    /// `\W+`-separated pieces, so `grace.hopper@navy.mil` is checked as a
    /// whole as well as `grace`, `hopper`, `navy` and `mil`.
    fn check_similarity(password: &str, user: &UserAttributes<'_>) -> Option<String> {
        let password = password.to_lowercase();
        let candidates = [
            ("email address", user.email),
            ("first name", user.first_name),
            ("last name", user.last_name),
        ];
        for (label, value) in candidates {
            let Some(value) = value else { continue };
            let value = value.to_lowercase();
            let similar = std::iter::once(value.as_str())
                .chain(NON_WORD.split(&value))
                .filter(|part| !part.is_empty())
                .any(|part| normalized_levenshtein(&password, part) >= MAX_SIMILARITY);
            if similar {
                return Some(format!("The password is too similar to the {}.", label));
            }
        }
        None
    }

    fn check_common(password: &str) -> Option<String> {
        let lowered = password.trim().to_lowercase();
        COMMON_PASSWORDS
            .contains(&lowered.as_str())
            .then(|| "This password is too common.".to_string())
    }

    fn check_numeric(password: &str) -> Option<String> {
        (!password.is_empty() && password.chars().all(|c| c.is_ascii_digit()))
            .then(|| "This password is entirely numeric.".to_string())
    }
}

impl Default for DefaultPasswordPolicy {
    fn default() -> Self {
        Self::new(8)
    }
}

impl PasswordValidator for DefaultPasswordPolicy {
    fn validate(&self, password: &str, user: &UserAttributes<'_>) -> Result<(), Vec<String>> {
        let errors: Vec<String> = [
            Self::check_similarity(password, user),
            self.check_length(password),
            Self::check_common(password),
            Self::check_numeric(password),
        ]
        .into_iter()
        .flatten()
        .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
