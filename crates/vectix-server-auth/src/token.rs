// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Bearer token issuance, validation and rotation.
//!
//! Tokens are HS256 JWTs carrying `{sub, exp, type}` where `sub` is the
//! username and `type` is `access` or `refresh`. Validation checks the
//! signature, the expiry (no leeway) and that `type` matches what the caller
//! expects. Refresh is rotation: a valid refresh token buys a brand-new pair.

use std::fmt;

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use vectix_common_secret::SecretString;

use crate::abac::ActorSource;
use crate::error::AuthError;

pub const TOKEN_TYPE_BEARER: &str = "bearer";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
	Access,
	Refresh,
}

impl fmt::Display for TokenKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			TokenKind::Access => f.write_str("access"),
			TokenKind::Refresh => f.write_str("refresh"),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
	pub sub: String,
	/// Expiry, seconds since the Unix epoch.
	pub exp: i64,
	#[serde(rename = "type")]
	pub kind: TokenKind,
}

/// Signing key and lifetimes, passed in explicitly.
#[derive(Debug, Clone)]
pub struct TokenConfig {
	pub secret: SecretString,
	pub access_ttl: Duration,
	pub refresh_ttl: Duration,
}

impl TokenConfig {
	pub fn new(secret: SecretString, access_minutes: i64, refresh_days: i64) -> Self {
		Self {
			secret,
			access_ttl: Duration::minutes(access_minutes),
			refresh_ttl: Duration::days(refresh_days),
		}
	}

	fn ttl(&self, kind: TokenKind) -> Duration {
		match kind {
			TokenKind::Access => self.access_ttl,
			TokenKind::Refresh => self.refresh_ttl,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
	pub access_token: String,
	pub refresh_token: String,
	pub token_type: String,
}

#[derive(Debug, Clone)]
pub struct TokenIssuer {
	config: TokenConfig,
}

impl TokenIssuer {
	pub fn new(config: TokenConfig) -> Self {
		Self { config }
	}

	pub fn config(&self) -> &TokenConfig {
		&self.config
	}

	#[instrument(skip(self))]
	pub fn issue(&self, kind: TokenKind, username: &str) -> Result<String, AuthError> {
		let exp = (Utc::now() + self.config.ttl(kind)).timestamp();
		let token = self.encode_claims(&Claims {
			sub: username.to_string(),
			exp,
			kind,
		})?;
		debug!(exp, "issued token");
		Ok(token)
	}

	pub fn issue_access(&self, username: &str) -> Result<String, AuthError> {
		self.issue(TokenKind::Access, username)
	}

	pub fn issue_refresh(&self, username: &str) -> Result<String, AuthError> {
		self.issue(TokenKind::Refresh, username)
	}

	pub fn issue_pair(&self, username: &str) -> Result<TokenPair, AuthError> {
		Ok(TokenPair {
			access_token: self.issue_access(username)?,
			refresh_token: self.issue_refresh(username)?,
			token_type: TOKEN_TYPE_BEARER.to_string(),
		})
	}

	/// Sign arbitrary claims. Used for issuance and by tests that need
	/// already-expired tokens.
	pub fn encode_claims(&self, claims: &Claims) -> Result<String, AuthError> {
		let key = EncodingKey::from_secret(self.config.secret.expose().as_bytes());
		encode(&Header::new(Algorithm::HS256), claims, &key)
			.map_err(|e| AuthError::Internal(format!("failed to sign token: {e}")))
	}

	/// Decode and check a token of the `expected` kind.
	#[instrument(skip(self, token))]
	pub fn validate(&self, token: &str, expected: TokenKind) -> Result<Claims, AuthError> {
		let key = DecodingKey::from_secret(self.config.secret.expose().as_bytes());
		let mut validation = Validation::new(Algorithm::HS256);
		validation.leeway = 0;
		validation.set_required_spec_claims(&["exp", "sub"]);

		let claims = decode::<Claims>(token, &key, &validation)
			.map_err(|e| match e.kind() {
				ErrorKind::ExpiredSignature => AuthError::TokenExpired,
				_ => {
					debug!(error = %e, "token rejected");
					AuthError::InvalidToken
				}
			})?
			.claims;

		if claims.kind != expected {
			return Err(AuthError::WrongTokenType {
				expected,
				actual: claims.kind,
			});
		}
		if claims.sub.is_empty() {
			return Err(AuthError::InvalidToken);
		}

		Ok(claims)
	}

	/// Exchange a refresh token for a new access/refresh pair.
	///
	/// Fails closed: malformed, expired or access-typed tokens are rejected, as
	/// is a subject that no longer exists.
	#[instrument(skip(self, refresh_token, actors))]
	pub async fn rotate(
		&self,
		refresh_token: &str,
		actors: &dyn ActorSource,
	) -> Result<TokenPair, AuthError> {
		let claims = self.validate(refresh_token, TokenKind::Refresh)?;
		if actors.get_actor_by_username(&claims.sub).await?.is_none() {
			return Err(AuthError::UnknownSubject);
		}
		self.issue_pair(&claims.sub)
	}
}
