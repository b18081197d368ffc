// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Expression-based access control.
//!
//! RBAC narrows a request to the permissions attached to the actor's roles
//! for a `(resource, action)` pair. ABAC then decides between them: a
//! permission without an expression grants outright, otherwise its
//! expression is evaluated against `{actor, target}`.
//!
//! ```text
//! check_permission(resource, action)
//!     │
//!     ├── superuser (re-validated in storage) ──────────────▶ allow
//!     │
//!     ├── build target from request shape
//!     │
//!     └── is_allowed ─▶ get_policies(role names, resource, action)
//!                           │
//!                           ├── none ────────────────────────▶ deny
//!                           └── first unconditional or truthy ▶ allow
//! ```
//!
//! - [`expr`]: the typed tree and its stored JSON form
//! - [`operators`]: the static operator table
//! - [`engine`]: evaluation, variable resolution, truthiness
//! - [`resolver`]: the policy resolver over a [`PolicySource`]
//! - [`gate`]: the per-request decision

pub mod engine;
pub mod error;
pub mod expr;
pub mod gate;
pub mod operators;
pub mod resolver;

pub use engine::{evaluate, evaluate_value, is_truthy, resolve_var};
pub use error::EvalError;
pub use expr::{Expr, MAX_DEPTH};
pub use gate::{build_target, ActorSource, AuthorizationGate, RequestShape};
pub use operators::{Arity, Operator, OPERATORS};
pub use resolver::{evaluate_permissions, policy_context, PolicyResolver, PolicySource};
