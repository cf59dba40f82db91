use chrono::{DateTime, Utc};
use validator::ValidateEmail;

use super::error::DomainError;

const USERNAME_MAX_CHARS: usize = 150;
const NAME_MAX_CHARS: usize = 150;

#[derive(Debug, Clone)]
pub(crate) struct RegisterRequest {
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) password: String,
    pub(crate) first_name: String,
    pub(crate) last_name: String,
}

impl RegisterRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let username = normalize_username(&self.username)?;
        let email = normalize_email(&self.email)?;
        let password_len = self.password.chars().count();
        if !(8..=128).contains(&password_len) {
            return Err(DomainError::Validation {
                field: "password",
                message: "must be 8..128 chars",
            });
        }
        Ok(Self {
            username,
            email,
            password: self.password,
            first_name: normalize_name("first_name", &self.first_name)?,
            last_name: normalize_name("last_name", &self.last_name)?,
        })
    }
}

#[derive(Debug, Clone)]
pub(crate) struct LoginRequest {
    pub(crate) username: String,
    pub(crate) password: String,
}

impl LoginRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let username = self.username.trim();
        if username.is_empty() || username.chars().count() > USERNAME_MAX_CHARS {
            return Err(DomainError::Validation {
                field: "username",
                message: "must be 1..150 chars",
            });
        }

        if self.password.is_empty() {
            return Err(DomainError::Validation {
                field: "password",
                message: "must not be empty",
            });
        }
        Ok(Self {
            username: username.to_string(),
            password: self.password,
        })
    }
}

/// Fields a user may change on their own profile.
#[derive(Debug, Clone)]
pub(crate) struct ProfileRequest {
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) first_name: String,
    pub(crate) last_name: String,
}

impl ProfileRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        Ok(Self {
            username: normalize_username(&self.username)?,
            email: normalize_email(&self.email)?,
            first_name: normalize_name("first_name", &self.first_name)?,
            last_name: normalize_name("last_name", &self.last_name)?,
        })
    }
}

#[derive(Debug, Clone)]
pub(crate) struct User {
    pub(crate) id: i64,
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) first_name: String,
    pub(crate) last_name: String,
    pub(crate) created_at: DateTime<Utc>,
}

fn normalize_username(username: &str) -> Result<String, DomainError> {
    let username = username.trim();
    let len = username.chars().count();
    if len == 0 || len > USERNAME_MAX_CHARS {
        return Err(DomainError::Validation {
            field: "username",
            message: "must be 1..150 chars",
        });
    }
    if !username
        .chars()
        .all(|ch| ch.is_alphanumeric() || matches!(ch, '@' | '.' | '+' | '-' | '_'))
    {
        return Err(DomainError::Validation {
            field: "username",
            message: "may contain only letters, digits and @/./+/-/_",
        });
    }
    Ok(username.to_string())
}

/// Email is optional; an empty value is stored as-is.
fn normalize_email(email: &str) -> Result<String, DomainError> {
    let email = email.trim().to_lowercase();
    if !email.is_empty() && !email.validate_email() {
        return Err(DomainError::Validation {
            field: "email",
            message: "must be a valid email",
        });
    }
    Ok(email)
}

fn normalize_name(field: &'static str, name: &str) -> Result<String, DomainError> {
    let name = name.trim();
    if name.chars().count() > NAME_MAX_CHARS {
        return Err(DomainError::Validation {
            field,
            message: "must be at most 150 chars",
        });
    }
    Ok(name.to_string())
}
