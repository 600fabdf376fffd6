use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::auth::password::MIN_PASSWORD_LEN;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex is valid")
});

/// Emails are stored trimmed and lower-cased so lookups are exact matches.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn is_valid_email(email: &str) -> bool {
    email.len() <= 254 && EMAIL_RE.is_match(email)
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default, rename = "password-confirm")]
    pub password_confirm: String,
}

impl RegisterForm {
    /// Trim the name and normalize the email in place.
    pub fn sanitized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.email = normalize_email(&self.email);
        self
    }

    /// All problems at once, so the form can list them together.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.name.is_empty() {
            errors.push("You must supply a name!".to_string());
        }
        if !is_valid_email(&self.email) {
            errors.push("That email is not valid!".to_string());
        }
        if self.password.is_empty() {
            errors.push("You must supply a password!".to_string());
        } else if self.password.len() < MIN_PASSWORD_LEN {
            errors.push(format!(
                "Your password must be at least {MIN_PASSWORD_LEN} characters!"
            ));
        }
        if self.password_confirm.is_empty() {
            errors.push("You must supply a password confirmation!".to_string());
        } else if self.password_confirm != self.password {
            errors.push("Oops! Your passwords do not match".to_string());
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

impl AccountForm {
    pub fn validate(self) -> Result<(String, String), Vec<String>> {
        let name = self.name.trim().to_string();
        let email = normalize_email(&self.email);

        let mut errors = Vec::new();
        if name.is_empty() {
            errors.push("You must supply a name!".to_string());
        }
        if !is_valid_email(&email) {
            errors.push("That email is not valid!".to_string());
        }

        if errors.is_empty() {
            Ok((name, email))
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForgotForm {
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResetForm {
    #[serde(default)]
    pub password: String,
    #[serde(default, rename = "password-confirm")]
    pub password_confirm: String,
}

impl ResetForm {
    pub fn validate(&self) -> Result<(), String> {
        if self.password != self.password_confirm {
            return Err("Passwords do not match".to_string());
        }
        if self.password.len() < MIN_PASSWORD_LEN {
            return Err(format!(
                "Your password must be at least {MIN_PASSWORD_LEN} characters!"
            ));
        }
        Ok(())
    }
}
