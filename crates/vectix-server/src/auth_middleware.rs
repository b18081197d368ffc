// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Bearer authentication for incoming requests.
//!
//! [`auth_layer`] runs on every API request. It never rejects on its own: a
//! missing or invalid token leaves an unauthenticated [`AuthContext`] in the
//! request extensions and the route-level guards decide. Storage faults are
//! the exception and fail the request.

use axum::{
	body::Body,
	extract::{FromRequestParts, State},
	http::{request::Parts, Request},
	middleware::Next,
	response::{IntoResponse, Response},
};
use vectix_server_auth::{
	extract_bearer_token, Actor, AuthContext, AuthError, CurrentUser, TokenKind,
};

use crate::{api::AppState, error::ServerError};

/// Resolve the bearer token into an [`AuthContext`].
pub async fn auth_layer(
	State(state): State<AppState>,
	mut request: Request<Body>,
	next: Next,
) -> Response {
	let context = match authenticate(&state, request.headers()).await {
		Ok(context) => context,
		Err(err) => return err.into_response(),
	};
	request.extensions_mut().insert(context);
	next.run(request).await
}

async fn authenticate(
	state: &AppState,
	headers: &axum::http::HeaderMap,
) -> Result<AuthContext, ServerError> {
	let Some(token) = extract_bearer_token(headers) else {
		return Ok(AuthContext::unauthenticated());
	};

	let claims = match state.tokens.validate(token, TokenKind::Access) {
		Ok(claims) => claims,
		Err(e) => {
			tracing::debug!(error = %e, "bearer token rejected");
			return Ok(AuthContext::unauthenticated());
		}
	};

	match state.user_repo.get_actor_by_username(&claims.sub).await? {
		Some(actor) => {
			tracing::trace!(user_id = %actor.id, "request authenticated");
			Ok(AuthContext::authenticated(CurrentUser::new(actor)))
		}
		None => {
			tracing::debug!("token subject no longer exists");
			Ok(AuthContext::unauthenticated())
		}
	}
}

/// Extractor for handlers that need an authenticated caller.
///
/// Rejects with 401 "Could not validate credentials" when no actor was resolved.
pub struct RequireAuth(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireAuth
where
	S: Send + Sync,
{
	type Rejection = ServerError;

	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		parts
			.extensions
			.get::<AuthContext>()
			.and_then(|ctx| ctx.current_user.clone())
			.map(RequireAuth)
			.ok_or_else(ServerError::credentials)
	}
}

/// Reject deactivated accounts.
pub fn require_active(actor: &Actor) -> Result<(), ServerError> {
	if actor.is_active {
		Ok(())
	} else {
		Err(AuthError::InactiveUser.into())
	}
}
