// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde::{Deserialize, Serialize};
use vectix_server_auth::TokenPair;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Username/password login.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct LoginRequest {
	pub username: String,
	pub password: String,
}

/// Exchange a refresh token for a new token pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct RefreshRequest {
	pub refresh_token: String,
}

/// Self-service signup. The account is active, not a superuser, and holds the
/// configured default role.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct RegisterRequest {
	pub name: String,
	#[serde(default)]
	pub phone_number: Option<String>,
	pub email: String,
	pub username: String,
	pub password: String,
}

/// An access/refresh token pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct TokenResponse {
	pub access_token: String,
	pub refresh_token: String,
	/// Always `bearer`.
	pub token_type: String,
}

impl From<TokenPair> for TokenResponse {
	fn from(pair: TokenPair) -> Self {
		Self {
			access_token: pair.access_token,
			refresh_token: pair.refresh_token,
			token_type: pair.token_type,
		}
	}
}
