// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Navigation modules and the sidebar tree built from them.
//!
//! The sidebar is one entry per module, each holding that module's routes
//! nested by `parent_id`. A route whose parent is not among the module's
//! routes is shown at the top level of its module. Routes without a module
//! are left out.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vectix_server_auth::RoleId;
use vectix_server_db::{Module, Route};

#[cfg(feature = "openapi")]
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ModuleResponse {
	pub id: i64,
	pub name: String,
	pub label: String,
	pub icon: Option<String>,
	pub is_active: bool,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl From<Module> for ModuleResponse {
	fn from(module: Module) -> Self {
		Self {
			id: module.id,
			name: module.name,
			label: module.label,
			icon: module.icon,
			is_active: module.is_active,
			created_at: module.created_at,
			updated_at: module.updated_at,
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CreateModuleRequest {
	pub name: String,
	pub label: String,
	#[serde(default)]
	pub icon: Option<String>,
	#[serde(default = "default_true")]
	pub is_active: bool,
}

fn default_true() -> bool {
	true
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct UpdateModuleRequest {
	#[serde(default)]
	pub name: Option<String>,
	#[serde(default)]
	pub label: Option<String>,
	#[serde(default)]
	pub icon: Option<String>,
	#[serde(default)]
	pub is_active: Option<bool>,
}

/// Sidebar filters. `role` names a role; only its sidebar routes are shown
/// and modules left empty are dropped.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(IntoParams))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct SidebarParams {
	pub role: Option<String>,
	pub is_active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct SidebarRole {
	pub role_id: i64,
	pub role_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct SidebarRoute {
	pub id: i64,
	pub label: String,
	pub path: String,
	pub icon: Option<String>,
	pub is_active: bool,
	pub is_sidebar: bool,
	pub parent_id: Option<i64>,
	pub module_id: Option<i64>,
	#[cfg_attr(feature = "openapi", schema(no_recursion))]
	pub children: Vec<SidebarRoute>,
	pub roles: Vec<SidebarRole>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct SidebarModule {
	pub id: i64,
	pub label: String,
	pub icon: Option<String>,
	pub is_active: bool,
	pub routes: Vec<SidebarRoute>,
}

/// Group `routes` under `modules`, in module order, and nest each group.
///
/// `role_names` labels the roles attached to each route. With `drop_empty`,
/// modules that end up with no routes are omitted.
pub fn build_sidebar(
	modules: Vec<Module>,
	routes: Vec<Route>,
	role_names: &HashMap<RoleId, String>,
	drop_empty: bool,
) -> Vec<SidebarModule> {
	let mut by_module: HashMap<i64, Vec<Route>> = HashMap::new();
	for route in routes {
		if let Some(module_id) = route.module_id {
			by_module.entry(module_id).or_default().push(route);
		}
	}

	modules
		.into_iter()
		.filter_map(|module| {
			let group = by_module.remove(&module.id).unwrap_or_default();
			let routes = nest(&group, role_names);
			if drop_empty && routes.is_empty() {
				return None;
			}
			Some(SidebarModule {
				id: module.id,
				label: module.label,
				icon: module.icon,
				is_active: module.is_active,
				routes,
			})
		})
		.collect()
}

fn nest(group: &[Route], role_names: &HashMap<RoleId, String>) -> Vec<SidebarRoute> {
	let mut children: HashMap<i64, Vec<&Route>> = HashMap::new();
	let mut roots = Vec::new();
	for route in group {
		match route.parent_id {
			Some(parent) if parent != route.id && group.iter().any(|r| r.id == parent) => {
				children.entry(parent).or_default().push(route)
			}
			_ => roots.push(route),
		}
	}

	roots
		.into_iter()
		.map(|route| to_item(route, &children, role_names))
		.collect()
}

fn to_item(
	route: &Route,
	children: &HashMap<i64, Vec<&Route>>,
	role_names: &HashMap<RoleId, String>,
) -> SidebarRoute {
	SidebarRoute {
		id: route.id,
		label: route.label.clone(),
		path: route.path.clone(),
		icon: route.icon.clone(),
		is_active: route.is_active,
		is_sidebar: route.is_sidebar,
		parent_id: route.parent_id,
		module_id: route.module_id,
		children: children
			.get(&route.id)
			.map(|kids| {
				kids.iter()
					.map(|kid| to_item(kid, children, role_names))
					.collect()
			})
			.unwrap_or_default(),
		roles: route
			.role_ids
			.iter()
			.map(|role_id| SidebarRole {
				role_id: role_id.get(),
				role_name: role_names.get(role_id).cloned().unwrap_or_default(),
			})
			.collect(),
	}
}
