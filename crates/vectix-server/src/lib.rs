// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP server for the Vectix authorization core.
//!
//! Every protected endpoint is registered with a [`permission_middleware::RequirePermission`]
//! layer naming its `(resource, action)` pair. The layer runs the authorization gate
//! against the actor resolved by [`auth_middleware::auth_layer`].

pub mod api;
pub mod api_docs;
pub mod auth_middleware;
pub mod error;
pub mod permission_middleware;
pub mod routes;
pub mod validation;

pub use api::{create_app_state, create_router, AppState};
pub use error::{ErrorResponse, ServerError};
