// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authentication and authorization core for Vectix.
//!
//! This crate provides:
//! - Domain types for actors, roles and permissions
//! - A JSON expression language for attribute-based rules ([`abac::expr`])
//! - The policy resolver and per-request authorization gate ([`abac`])
//! - HS256 access/refresh tokens with rotation ([`token`])
//! - Argon2id password hashing ([`password`])
//! - Bearer extraction and request auth context ([`middleware`])
//!
//! Storage is abstracted behind [`PolicySource`] and [`ActorSource`]; the
//! database crate implements both.
//!
//! # Security Considerations
//!
//! - Denials carry a fixed message and never name the rule that failed
//! - Expression faults are errors, never an allow or a deny
//! - Signing keys use [`vectix_common_secret::SecretString`] to prevent accidental logging

pub mod abac;
mod argon2_config;
pub mod error;
pub mod middleware;
pub mod password;
pub mod token;
pub mod types;

pub use abac::{
	build_target, evaluate, evaluate_value, is_truthy, ActorSource, AuthorizationGate, EvalError,
	Expr, PolicyResolver, PolicySource, RequestShape,
};
pub use error::AuthError;
pub use middleware::{extract_bearer_token, AuthContext, AuthRequired, CurrentUser};
pub use password::{hash_password, verify_password, MIN_PASSWORD_LEN};
pub use token::{Claims, TokenConfig, TokenIssuer, TokenKind, TokenPair};
pub use types::{Actor, Permission, PermissionId, Role, RoleId, RoleRef, UserId};
