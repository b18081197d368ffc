// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authentication and authorization error types.

use thiserror::Error;

use crate::abac::EvalError;
use crate::token::TokenKind;
use crate::types::PermissionId;

/// Errors that can occur during authentication and authorization.
#[derive(Debug, Error)]
pub enum AuthError {
	// =========================================================================
	// Authentication Errors
	// =========================================================================
	/// No bearer token was presented.
	#[error("authentication required")]
	AuthenticationRequired,

	/// Username or password did not match.
	#[error("invalid credentials")]
	InvalidCredentials,

	/// The token could not be decoded or its signature did not verify.
	#[error("invalid token")]
	InvalidToken,

	/// The token's `exp` is in the past.
	#[error("token expired")]
	TokenExpired,

	/// An access token was used where a refresh token is expected, or vice versa.
	#[error("expected {expected} token, got {actual} token")]
	WrongTokenType {
		expected: TokenKind,
		actual: TokenKind,
	},

	/// The token's subject no longer exists.
	#[error("token subject not found")]
	UnknownSubject,

	// =========================================================================
	// Authorization Errors
	// =========================================================================
	/// The policy resolver denied the request.
	#[error("Not enough permissions")]
	AccessDenied,

	/// The account is deactivated.
	#[error("Inactive user")]
	InactiveUser,

	// =========================================================================
	// Policy Evaluation Errors
	// =========================================================================
	/// A stored expression could not be parsed or evaluated.
	#[error("policy evaluation failed for permission {permission_id}: {source}")]
	PolicyEvaluation {
		permission_id: PermissionId,
		#[source]
		source: EvalError,
	},

	// =========================================================================
	// Infrastructure Errors
	// =========================================================================
	/// Actor or policy lookup failed.
	#[error("storage error: {0}")]
	Storage(String),

	/// Password hashing error.
	#[error("password hashing error: {0}")]
	HashingError(String),

	/// Internal error.
	#[error("internal error: {0}")]
	Internal(String),

	/// Configuration error.
	#[error("configuration error: {0}")]
	Configuration(String),
}

impl AuthError {
	/// Returns true if this error should be logged at error level.
	pub fn is_internal(&self) -> bool {
		matches!(
			self,
			AuthError::PolicyEvaluation { .. }
				| AuthError::Storage(_)
				| AuthError::HashingError(_)
				| AuthError::Internal(_)
				| AuthError::Configuration(_)
		)
	}

	/// Returns true for failures that mean "who are you?" rather than "no".
	pub fn is_authentication_failure(&self) -> bool {
		self.status_code() == 401
	}

	/// Returns the HTTP status code for this error.
	pub fn status_code(&self) -> u16 {
		match self {
			// 401 Unauthorized
			AuthError::AuthenticationRequired
			| AuthError::InvalidCredentials
			| AuthError::InvalidToken
			| AuthError::TokenExpired
			| AuthError::WrongTokenType { .. }
			| AuthError::UnknownSubject => 401,

			// 403 Forbidden
			AuthError::AccessDenied | AuthError::InactiveUser => 403,

			// 500 Internal Server Error
			AuthError::PolicyEvaluation { .. }
			| AuthError::Storage(_)
			| AuthError::HashingError(_)
			| AuthError::Internal(_)
			| AuthError::Configuration(_) => 500,
		}
	}
}
