// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The per-request authorization decision.

use std::sync::Arc;

use async_trait::async_trait;
use http::Method;
use serde_json::{json, Map, Value};
use tracing::{debug, info, instrument};

use super::resolver::PolicyResolver;
use crate::error::AuthError;
use crate::types::Actor;

/// Storage lookup for actors with their roles.
#[async_trait]
pub trait ActorSource: Send + Sync {
	async fn get_actor_by_username(&self, username: &str) -> Result<Option<Actor>, AuthError>;
}

/// The parts of an inbound request that shape the policy target.
#[derive(Debug, Clone)]
pub struct RequestShape {
	pub method: Method,
	pub path_params: Vec<(String, String)>,
	/// Parsed JSON body. Only consulted for POST and PUT.
	pub body: Option<Value>,
}

impl RequestShape {
	pub fn new(method: Method) -> Self {
		Self {
			method,
			path_params: Vec::new(),
			body: None,
		}
	}

	pub fn with_path_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.path_params.push((name.into(), value.into()));
		self
	}

	pub fn with_body(mut self, body: Value) -> Self {
		self.body = Some(body);
		self
	}

	fn path_param(&self, name: &str) -> Option<&str> {
		self.path_params
			.iter()
			.find(|(key, _)| key == name)
			.map(|(_, value)| value.as_str())
	}
}

/// Build the `target` an expression sees.
///
/// | request | target |
/// |---------|--------|
/// | none (direct call) | `{"response": "all"}` |
/// | POST, PUT | the JSON body, `{}` when absent |
/// | DELETE | the path parameters |
/// | GET with `id` | `{"id": <id>}` |
/// | GET without `id` | `{"response": "all"}` |
/// | anything else | `{}` |
pub fn build_target(request: Option<&RequestShape>) -> Value {
	let Some(request) = request else {
		return json!({"response": "all"});
	};

	match request.method {
		Method::POST | Method::PUT => request.body.clone().unwrap_or_else(|| json!({})),
		Method::DELETE => Value::Object(
			request
				.path_params
				.iter()
				.map(|(k, v)| (k.clone(), Value::String(v.clone())))
				.collect::<Map<_, _>>(),
		),
		Method::GET => match request.path_param("id") {
			Some(id) => json!({ "id": id }),
			None => json!({"response": "all"}),
		},
		_ => json!({}),
	}
}

/// Superuser bypass, then RBAC/ABAC through the [`PolicyResolver`].
#[derive(Clone)]
pub struct AuthorizationGate {
	resolver: PolicyResolver,
	actors: Arc<dyn ActorSource>,
}

impl AuthorizationGate {
	pub fn new(resolver: PolicyResolver, actors: Arc<dyn ActorSource>) -> Self {
		Self { resolver, actors }
	}

	pub fn resolver(&self) -> &PolicyResolver {
		&self.resolver
	}

	/// Allow or deny `actor` for `(resource, action)`.
	///
	/// On allow, returns the actor's public projection. A claimed superuser is
	/// re-read from storage: the bypass applies only if the stored record is
	/// still an active superuser, and a vanished record is an authentication
	/// failure. Every other path goes through the resolver. The decision is
	/// read-only.
	#[instrument(
		skip_all,
		fields(user_id = %actor.id, resource = %resource, action = %action)
	)]
	pub async fn check_permission(
		&self,
		resource: &str,
		action: &str,
		actor: &Actor,
		request: Option<&RequestShape>,
	) -> Result<Actor, AuthError> {
		let stored;
		let mut subject = actor;

		if actor.is_superuser {
			stored = self
				.actors
				.get_actor_by_username(&actor.username)
				.await?
				.ok_or(AuthError::UnknownSubject)?;

			if stored.is_superuser && stored.is_active {
				debug!("superuser bypass");
				return Ok(stored);
			}
			debug!("superuser flag no longer holds, evaluating policies");
			subject = &stored;
		}

		let target = build_target(request);
		if self
			.resolver
			.is_allowed(resource, action, subject, &target)
			.await?
		{
			debug!("permission granted");
			Ok(subject.clone())
		} else {
			info!("permission denied");
			Err(AuthError::AccessDenied)
		}
	}
}
