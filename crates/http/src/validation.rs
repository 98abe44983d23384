//! Signup form validation
//!
//! Mirrors the rules the signup form enforces so obviously bad input never
//! reaches the server.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::client::ClientError;
use crate::types::SignupRequest;

static LOGIN_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9_][a-z0-9._-]{3,18}$").expect("login id pattern is valid")
});
static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));
static BIRTH_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date pattern is valid"));

/// Shortest accepted password
pub const MIN_PASSWORD_LEN: usize = 8;
/// Longest accepted email address
pub const MAX_EMAIL_LEN: usize = 120;

/// 4-19 chars of `a-z 0-9 . _ -`, not starting with `.` or `-`
pub fn is_valid_login_id(login_id: &str) -> bool {
    LOGIN_ID.is_match(login_id)
}

/// At least one letter, one digit and eight characters
pub fn is_valid_password(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LEN
        && password.chars().any(|c| c.is_ascii_alphabetic())
        && password.chars().any(|c| c.is_ascii_digit())
}

/// `local@domain.tld`, at most [`MAX_EMAIL_LEN`] bytes
pub fn is_valid_email(email: &str) -> bool {
    email.len() <= MAX_EMAIL_LEN && EMAIL.is_match(email)
}

/// `YYYY-MM-DD` naming a real calendar day
pub fn is_valid_birth_date(date: &str) -> bool {
    BIRTH_DATE.is_match(date) && NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok()
}

/// Check every signup field, reporting all problems at once
pub fn validate_signup(request: &SignupRequest) -> Result<(), ClientError> {
    let mut problems = Vec::new();

    if !is_valid_login_id(&request.login_id) {
        problems.push(
            "login id must be 4-19 lowercase letters, digits, '.', '_' or '-'".to_string(),
        );
    }
    if !is_valid_password(&request.password) {
        problems.push(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters with a letter and a digit"
        ));
    }
    if request.password.is_empty() || request.password != request.password_confirm {
        problems.push("password confirmation does not match".to_string());
    }
    if request.name.trim().is_empty() {
        problems.push("name is required".to_string());
    }
    if !is_valid_birth_date(&request.birth_date) {
        problems.push("birth date must be a valid YYYY-MM-DD date".to_string());
    }
    if !is_valid_email(&request.email) {
        problems.push("email address is not valid".to_string());
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(ClientError::Validation(problems))
    }
}
