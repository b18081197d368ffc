// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vectix_server_db::Route;

#[cfg(feature = "openapi")]
use utoipa::{IntoParams, ToSchema};

/// A UI navigation entry and the roles that may see it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct RouteResponse {
	pub id: i64,
	pub path: String,
	pub label: String,
	pub icon: Option<String>,
	pub is_active: bool,
	pub is_sidebar: bool,
	pub module_id: Option<i64>,
	pub parent_id: Option<i64>,
	pub role_ids: Vec<i64>,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl From<Route> for RouteResponse {
	fn from(route: Route) -> Self {
		Self {
			id: route.id,
			path: route.path,
			label: route.label,
			icon: route.icon,
			is_active: route.is_active,
			is_sidebar: route.is_sidebar,
			module_id: route.module_id,
			parent_id: route.parent_id,
			role_ids: route.role_ids.into_iter().map(|id| id.get()).collect(),
			created_at: route.created_at,
			updated_at: route.updated_at,
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CreateRouteRequest {
	pub path: String,
	pub label: String,
	#[serde(default)]
	pub icon: Option<String>,
	#[serde(default = "default_true")]
	pub is_active: bool,
	#[serde(default)]
	pub is_sidebar: bool,
	#[serde(default)]
	pub module_id: Option<i64>,
	#[serde(default)]
	pub parent_id: Option<i64>,
	#[serde(default)]
	pub role_ids: Vec<i64>,
}

fn default_true() -> bool {
	true
}

/// Partial route update. `role_ids`, when present, replaces the role set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct UpdateRouteRequest {
	#[serde(default)]
	pub path: Option<String>,
	#[serde(default)]
	pub label: Option<String>,
	#[serde(default)]
	pub icon: Option<String>,
	#[serde(default)]
	pub is_active: Option<bool>,
	#[serde(default)]
	pub is_sidebar: Option<bool>,
	#[serde(default)]
	pub module_id: Option<i64>,
	#[serde(default)]
	pub parent_id: Option<i64>,
	#[serde(default)]
	pub role_ids: Option<Vec<i64>>,
}

/// Filters for the caller's own navigation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(IntoParams))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct MyRoutesParams {
	pub is_active: Option<bool>,
	pub is_sidebar: Option<bool>,
}
