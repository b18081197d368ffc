// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Route-level permission checks.
//!
//! [`RequirePermission`] wraps a single route with the authorization gate for
//! a literal `(resource, action)` pair:
//!
//! ```ignore
//! Router::new().route(
//!     "/api/v1/rbac/roles/{id}",
//!     get(routes::rbac::get_role)
//!         .route_layer(RequirePermission::new(gate.clone(), "roles", "read")),
//! )
//! ```
//!
//! The request's method, path parameters and (for POST/PUT) JSON body form the
//! policy target. The body is buffered for the check and handed on unchanged.
//!
//! - No authenticated actor: 401
//! - Denied: 403 "Not enough permissions", never naming the rule
//! - Evaluation or storage fault: 500

use std::{
	future::{poll_fn, Future},
	pin::Pin,
	sync::Arc,
	task::{Context, Poll},
};

use axum::{
	body::{Body, Bytes, HttpBody},
	extract::{FromRequestParts, RawPathParams},
	http::{Method, Request},
	response::{IntoResponse, Response},
};
use serde_json::Value;
use tower::{Layer, Service};
use vectix_server_auth::{AuthContext, AuthorizationGate, CurrentUser, RequestShape};

use crate::error::ServerError;

/// Upper bound on a request body buffered for policy evaluation.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Route layer gating a handler on `(resource, action)`.
#[derive(Clone)]
pub struct RequirePermission {
	gate: AuthorizationGate,
	resource: Arc<str>,
	action: Arc<str>,
}

impl RequirePermission {
	pub fn new(gate: AuthorizationGate, resource: &str, action: &str) -> Self {
		Self {
			gate,
			resource: Arc::from(resource),
			action: Arc::from(action),
		}
	}
}

impl<S> Layer<S> for RequirePermission {
	type Service = RequirePermissionService<S>;

	fn layer(&self, inner: S) -> Self::Service {
		RequirePermissionService {
			inner,
			gate: self.gate.clone(),
			resource: self.resource.clone(),
			action: self.action.clone(),
		}
	}
}

/// Service wrapper for [`RequirePermission`].
#[derive(Clone)]
pub struct RequirePermissionService<S> {
	inner: S,
	gate: AuthorizationGate,
	resource: Arc<str>,
	action: Arc<str>,
}

impl<S> Service<Request<Body>> for RequirePermissionService<S>
where
	S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
	S::Future: Send,
{
	type Response = Response;
	type Error = S::Error;
	type Future = Pin<Box<dyn Future<Output = Result<Response, S::Error>> + Send>>;

	fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
		self.inner.poll_ready(cx)
	}

	fn call(&mut self, request: Request<Body>) -> Self::Future {
		// The ready clone stays with the caller; take it and leave a fresh one behind.
		let clone = self.inner.clone();
		let mut inner = std::mem::replace(&mut self.inner, clone);
		let gate = self.gate.clone();
		let resource = self.resource.clone();
		let action = self.action.clone();

		Box::pin(async move {
			match authorize(&gate, &resource, &action, request).await {
				Ok(request) => inner.call(request).await,
				Err(err) => Ok(err.into_response()),
			}
		})
	}
}

/// Run the gate and return the request to forward, with the allowed actor in
/// its [`AuthContext`].
async fn authorize(
	gate: &AuthorizationGate,
	resource: &str,
	action: &str,
	request: Request<Body>,
) -> Result<Request<Body>, ServerError> {
	let Some(current_user) = request
		.extensions()
		.get::<AuthContext>()
		.and_then(|ctx| ctx.current_user.clone())
	else {
		tracing::debug!(resource, action, "permission check without an authenticated actor");
		return Err(ServerError::credentials());
	};

	let (mut parts, body) = request.into_parts();

	let mut shape = RequestShape::new(parts.method.clone());
	if let Ok(params) = RawPathParams::from_request_parts(&mut parts, &()).await {
		for (name, value) in params.iter() {
			shape = shape.with_path_param(name, value);
		}
	}

	let bytes = read_body(body, MAX_BODY_BYTES).await?;
	if parts.method == Method::POST || parts.method == Method::PUT {
		shape = shape.with_body(parse_target_body(&bytes)?);
	}

	let actor = gate
		.check_permission(resource, action, &current_user.actor, Some(&shape))
		.await?;

	parts
		.extensions
		.insert(AuthContext::authenticated(CurrentUser::new(actor)));
	Ok(Request::from_parts(parts, Body::from(bytes)))
}

/// Buffer `body`, failing with 413 as soon as it grows past `limit`.
async fn read_body(mut body: Body, limit: usize) -> Result<Bytes, ServerError> {
	if body.size_hint().lower() > limit as u64 {
		return Err(ServerError::PayloadTooLarge(limit));
	}

	let mut buf = Vec::new();
	while let Some(frame) = poll_fn(|cx| Pin::new(&mut body).poll_frame(cx)).await {
		let frame =
			frame.map_err(|e| ServerError::BadRequest(format!("Failed to read request body: {e}")))?;
		let Ok(data) = frame.into_data() else {
			continue;
		};
		if buf.len() + data.len() > limit {
			return Err(ServerError::PayloadTooLarge(limit));
		}
		buf.extend_from_slice(&data);
	}
	Ok(Bytes::from(buf))
}

/// An empty body is the empty object; anything else must be JSON.
fn parse_target_body(bytes: &Bytes) -> Result<Value, ServerError> {
	if bytes.iter().all(u8::is_ascii_whitespace) {
		return Ok(Value::Object(Default::default()));
	}
	serde_json::from_slice(bytes)
		.map_err(|e| ServerError::BadRequest(format!("Request body is not valid JSON: {e}")))
}
