// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authentication and token configuration.

use serde::Deserialize;
use vectix_common_secret::SecretString;

pub const DEFAULT_ACCESS_TOKEN_EXPIRE_MINUTES: i64 = 30;
pub const DEFAULT_REFRESH_TOKEN_EXPIRE_DAYS: i64 = 7;
const DEFAULT_ENVIRONMENT: &str = "development";
const DEFAULT_ROLE: &str = "user";

/// Authentication configuration (runtime, fully resolved).
#[derive(Debug, Clone)]
pub struct AuthConfig {
	/// HS256 signing key. Required when `environment` is `production`.
	pub secret_key: Option<SecretString>,
	pub access_token_expire_minutes: i64,
	pub refresh_token_expire_days: i64,
	pub environment: String,
	pub signups_disabled: bool,
	/// Role granted to self-registered users.
	pub default_role: String,
}

impl AuthConfig {
	pub fn is_production(&self) -> bool {
		self.environment.eq_ignore_ascii_case("production")
	}
}

impl Default for AuthConfig {
	fn default() -> Self {
		AuthConfigLayer::default().finalize()
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfigLayer {
	#[serde(default)]
	pub secret_key: Option<SecretString>,
	#[serde(default)]
	pub access_token_expire_minutes: Option<i64>,
	#[serde(default)]
	pub refresh_token_expire_days: Option<i64>,
	#[serde(default)]
	pub environment: Option<String>,
	#[serde(default)]
	pub signups_disabled: Option<bool>,
	#[serde(default)]
	pub default_role: Option<String>,
}

impl AuthConfigLayer {
	pub fn merge(&mut self, other: AuthConfigLayer) {
		if other.secret_key.is_some() {
			self.secret_key = other.secret_key;
		}
		if other.access_token_expire_minutes.is_some() {
			self.access_token_expire_minutes = other.access_token_expire_minutes;
		}
		if other.refresh_token_expire_days.is_some() {
			self.refresh_token_expire_days = other.refresh_token_expire_days;
		}
		if other.environment.is_some() {
			self.environment = other.environment;
		}
		if other.signups_disabled.is_some() {
			self.signups_disabled = other.signups_disabled;
		}
		if other.default_role.is_some() {
			self.default_role = other.default_role;
		}
	}

	pub fn finalize(self) -> AuthConfig {
		AuthConfig {
			secret_key: self.secret_key.filter(|key| !key.is_empty()),
			access_token_expire_minutes: self
				.access_token_expire_minutes
				.unwrap_or(DEFAULT_ACCESS_TOKEN_EXPIRE_MINUTES),
			refresh_token_expire_days: self
				.refresh_token_expire_days
				.unwrap_or(DEFAULT_REFRESH_TOKEN_EXPIRE_DAYS),
			environment: self
				.environment
				.unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string()),
			signups_disabled: self.signups_disabled.unwrap_or(false),
			default_role: self.default_role.unwrap_or_else(|| DEFAULT_ROLE.to_string()),
		}
	}
}
