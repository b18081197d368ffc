// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Policy resolution: RBAC lookup followed by expression checks.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, error, instrument};

use super::engine::{evaluate, is_truthy};
use super::expr::Expr;
use crate::error::AuthError;
use crate::types::{Actor, Permission};

/// Storage lookup for the permissions that could apply to a request.
#[async_trait]
pub trait PolicySource: Send + Sync {
	/// Every permission matching `resource` and `action` exactly that is
	/// attached to at least one role named in `role_names`, each listed once,
	/// in a stable order.
	async fn get_policies(
		&self,
		role_names: &[String],
		resource: &str,
		action: &str,
	) -> Result<Vec<Permission>, AuthError>;
}

#[derive(Clone)]
pub struct PolicyResolver {
	source: Arc<dyn PolicySource>,
}

impl PolicyResolver {
	pub fn new(source: Arc<dyn PolicySource>) -> Self {
		Self { source }
	}

	/// Decide whether `actor` may perform `action` on `resource` given `target`.
	///
	/// Returns `Ok(false)` when nothing matches, including for an actor with no
	/// roles. Lookup failures and expression faults are errors, never a deny.
	#[instrument(
		level = "debug",
		skip_all,
		fields(user_id = %actor.id, resource = %resource, action = %action)
	)]
	pub async fn is_allowed(
		&self,
		resource: &str,
		action: &str,
		actor: &Actor,
		target: &Value,
	) -> Result<bool, AuthError> {
		let role_names = actor.role_names();
		if role_names.is_empty() {
			debug!("actor holds no roles");
			return Ok(false);
		}

		let permissions = self
			.source
			.get_policies(&role_names, resource, action)
			.await?;
		debug!(candidates = permissions.len(), "resolved candidate permissions");

		evaluate_permissions(&permissions, &policy_context(actor, target))
	}
}

/// The evaluation context: `{"actor": <policy attributes>, "target": target}`.
pub fn policy_context(actor: &Actor, target: &Value) -> Value {
	json!({
		"actor": actor.context_value(),
		"target": target,
	})
}

/// First unconditional or truthy permission wins, in the given order.
pub fn evaluate_permissions(permissions: &[Permission], context: &Value) -> Result<bool, AuthError> {
	for permission in permissions {
		let Some(stored) = &permission.expression else {
			debug!(permission_id = %permission.permission_id, "unconditional grant");
			return Ok(true);
		};

		let outcome = Expr::parse(stored).and_then(|expr| evaluate(&expr, context));
		match outcome {
			Ok(value) if is_truthy(&value) => {
				debug!(permission_id = %permission.permission_id, "expression granted");
				return Ok(true);
			}
			Ok(_) => {}
			Err(source) => {
				error!(
					permission_id = %permission.permission_id,
					error = %source,
					"policy expression fault"
				);
				return Err(AuthError::PolicyEvaluation {
					permission_id: permission.permission_id,
					source,
				});
			}
		}
	}

	Ok(false)
}
