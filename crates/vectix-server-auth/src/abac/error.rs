// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use thiserror::Error;

/// A fault in a policy expression.
///
/// These are configuration bugs in stored policy data. They never turn into
/// an allow or a deny.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
	#[error("unknown operator `{0}`")]
	UnknownOperator(String),

	#[error("operator `{op}` expects {expected} argument(s), got {actual}")]
	Arity {
		op: String,
		expected: String,
		actual: usize,
	},

	#[error("expression nesting exceeds the maximum depth of {0}")]
	TooDeep(usize),

	#[error("malformed expression: {0}")]
	Malformed(String),

	#[error("operator `{op}` cannot be applied to {detail}")]
	TypeMismatch { op: &'static str, detail: String },

	#[error("invalid pattern `{pattern}`: {message}")]
	InvalidPattern { pattern: String, message: String },
}
