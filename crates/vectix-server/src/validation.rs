// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Shared validation utilities for API handlers and the CLI.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use uuid::Uuid;
use vectix_server_auth::{Expr, UserId, MIN_PASSWORD_LEN};

use crate::error::ServerError;

static USERNAME_REGEX: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]{3,32}$").unwrap());

static EMAIL_REGEX: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

const PASSWORD_SPECIALS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?";

/// 3 to 32 characters of letters, digits, `_` and `-`.
pub fn validate_username(username: &str) -> bool {
	USERNAME_REGEX.is_match(username)
}

pub fn validate_email(email: &str) -> bool {
	EMAIL_REGEX.is_match(email)
}

/// Sanitize an email address by trimming whitespace and lowercasing.
pub fn sanitize_email(email: &str) -> String {
	email.trim().to_lowercase()
}

/// Strength rules for operator-created accounts.
///
/// At least [`MIN_PASSWORD_LEN`] characters with an uppercase letter, a
/// lowercase letter, a digit and one of `!@#$%^&*()_+-=[]{}|;:,.<>?`.
pub fn validate_password_strength(password: &str) -> Result<(), String> {
	if password.chars().count() < MIN_PASSWORD_LEN {
		return Err(format!(
			"Password must be at least {MIN_PASSWORD_LEN} characters long"
		));
	}
	if !password.chars().any(|c| c.is_ascii_uppercase()) {
		return Err("Password must contain at least one uppercase letter".to_string());
	}
	if !password.chars().any(|c| c.is_ascii_lowercase()) {
		return Err("Password must contain at least one lowercase letter".to_string());
	}
	if !password.chars().any(|c| c.is_ascii_digit()) {
		return Err("Password must contain at least one digit".to_string());
	}
	if !password.chars().any(|c| PASSWORD_SPECIALS.contains(c)) {
		return Err("Password must contain at least one special character".to_string());
	}
	Ok(())
}

/// Input checks shared by registration and user creation.
pub fn validate_new_account(username: &str, email: &str, password: &str) -> Result<(), ServerError> {
	if username.trim().is_empty() {
		return Err(ServerError::Validation("Username must not be empty".to_string()));
	}
	if !validate_email(email.trim()) {
		return Err(ServerError::Validation("Invalid email address".to_string()));
	}
	if password.chars().count() < MIN_PASSWORD_LEN {
		return Err(ServerError::Validation(format!(
			"Password must be at least {MIN_PASSWORD_LEN} characters long"
		)));
	}
	Ok(())
}

/// Reject a stored expression that would fault at evaluation time.
pub fn validate_expression(expression: &Value) -> Result<(), ServerError> {
	Expr::parse(expression)
		.map(|_| ())
		.map_err(|e| ServerError::Validation(format!("Invalid expression: {e}")))
}

/// Parse a path segment as a [`UserId`].
pub fn parse_user_id(raw: &str) -> Result<UserId, ServerError> {
	Uuid::parse_str(raw)
		.map(UserId::new)
		.map_err(|_| ServerError::BadRequest("Invalid user id".to_string()))
}
