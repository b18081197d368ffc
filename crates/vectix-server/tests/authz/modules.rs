// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Navigation modules and the sidebar tree.

use axum::http::{Method, StatusCode};
use serde_json::{json, Value};

use super::support::{body_json, run_authz_cases, AuthzCase, TestApp, TestUser};

async fn create(app: &TestApp, user: &TestUser, path: &str, body: Value) -> Value {
	let response = app.post(path, Some(user), body).await;
	assert_eq!(response.status(), StatusCode::CREATED);
	body_json(response).await
}

fn field<'a>(items: &'a Value, key: &str) -> Vec<&'a Value> {
	items.as_array().unwrap().iter().map(|item| &item[key]).collect()
}

#[tokio::test]
async fn module_authorization_matrix() {
	let app = TestApp::new().await;
	let f = &app.fixtures;

	let cases = [
		AuthzCase {
			name: "anonymous cannot list modules",
			method: Method::GET,
			path: "/api/v1/modules".to_string(),
			user: None,
			body: None,
			expected_status: StatusCode::UNAUTHORIZED,
		},
		AuthzCase {
			name: "nobody cannot list modules",
			method: Method::GET,
			path: "/api/v1/modules".to_string(),
			user: Some(f.nobody.clone()),
			body: None,
			expected_status: StatusCode::FORBIDDEN,
		},
		AuthzCase {
			name: "editor cannot create modules",
			method: Method::POST,
			path: "/api/v1/modules".to_string(),
			user: Some(f.editor.clone()),
			body: Some(json!({"name": "finance", "label": "Finance"})),
			expected_status: StatusCode::FORBIDDEN,
		},
		AuthzCase {
			name: "editor cannot read the sidebar",
			method: Method::GET,
			path: "/api/v1/sidebar".to_string(),
			user: Some(f.editor.clone()),
			body: None,
			expected_status: StatusCode::FORBIDDEN,
		},
		AuthzCase {
			name: "manager can list modules",
			method: Method::GET,
			path: "/api/v1/modules".to_string(),
			user: Some(f.manager.clone()),
			body: None,
			expected_status: StatusCode::OK,
		},
		AuthzCase {
			name: "superuser can read the sidebar",
			method: Method::GET,
			path: "/api/v1/sidebar".to_string(),
			user: Some(f.admin.clone()),
			body: None,
			expected_status: StatusCode::OK,
		},
	];

	run_authz_cases(&app, &cases).await;
}

#[tokio::test]
async fn module_crud_round() {
	let app = TestApp::new().await;
	let manager = &app.fixtures.manager;

	let created = create(
		&app,
		manager,
		"/api/v1/modules",
		json!({"name": "finance", "label": "Finance", "icon": "wallet"}),
	)
	.await;
	let id = created["id"].as_i64().unwrap();
	assert_eq!(created["is_active"], true);
	assert_eq!(created["icon"], "wallet");

	let response = app
		.post(
			"/api/v1/modules",
			Some(manager),
			json!({"name": "finance", "label": "Again"}),
		)
		.await;
	assert_eq!(response.status(), StatusCode::CONFLICT);
	assert_eq!(
		body_json(response).await["message"],
		"Module with this name already exists"
	);

	let response = app
		.post("/api/v1/modules", Some(manager), json!({"name": " ", "label": "Blank"}))
		.await;
	assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

	let path = format!("/api/v1/modules/{id}");
	let response = app
		.put(&path, Some(manager), json!({"label": "Accounts", "is_active": false}))
		.await;
	assert_eq!(response.status(), StatusCode::OK);
	let updated = body_json(response).await;
	assert_eq!(updated["label"], "Accounts");
	assert_eq!(updated["name"], "finance");
	assert_eq!(updated["is_active"], false);

	let response = app.get("/api/v1/modules", Some(manager)).await;
	assert_eq!(field(&body_json(response).await, "id"), vec![&json!(id)]);

	let response = app.delete(&path, Some(manager)).await;
	assert_eq!(response.status(), StatusCode::NO_CONTENT);

	let response = app.get(&path, Some(manager)).await;
	assert_eq!(response.status(), StatusCode::NOT_FOUND);
	assert_eq!(body_json(response).await["message"], "Module not found");

	let response = app.put(&path, Some(manager), json!({"label": "Gone"})).await;
	assert_eq!(response.status(), StatusCode::NOT_FOUND);
	let response = app.delete(&path, Some(manager)).await;
	assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn route_in_unknown_module_is_not_found() {
	let app = TestApp::new().await;
	let response = app
		.post(
			"/api/v1/routes",
			Some(&app.fixtures.manager),
			json!({"path": "/ledger", "label": "Ledger", "module_id": 9999}),
		)
		.await;
	assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_a_module_keeps_its_routes() {
	let app = TestApp::new().await;
	let manager = &app.fixtures.manager;

	let module = create(&app, manager, "/api/v1/modules", json!({"name": "finance", "label": "Finance"})).await;
	let route = create(
		&app,
		manager,
		"/api/v1/routes",
		json!({"path": "/ledger", "label": "Ledger", "module_id": module["id"]}),
	)
	.await;

	let response = app
		.delete(&format!("/api/v1/modules/{}", module["id"]), Some(manager))
		.await;
	assert_eq!(response.status(), StatusCode::NO_CONTENT);

	let response = app
		.get(&format!("/api/v1/routes/{}", route["id"]), Some(manager))
		.await;
	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(body_json(response).await["module_id"], Value::Null);
}

#[tokio::test]
async fn sidebar_groups_nests_and_filters_by_role() {
	let app = TestApp::new().await;
	let f = &app.fixtures;
	let manager = &f.manager;
	let editor_role = f.editor_role.role_id.get();
	let manager_role = f.manager_role.role_id.get();

	let finance = create(&app, manager, "/api/v1/modules", json!({"name": "finance", "label": "Finance"})).await;
	let admin = create(&app, manager, "/api/v1/modules", json!({"name": "admin", "label": "Admin"})).await;

	let ledger = create(
		&app,
		manager,
		"/api/v1/routes",
		json!({
			"path": "/ledger", "label": "Ledger", "is_sidebar": true,
			"module_id": finance["id"], "role_ids": [editor_role]
		}),
	)
	.await;
	create(
		&app,
		manager,
		"/api/v1/routes",
		json!({
			"path": "/ledger/entries", "label": "Entries", "is_sidebar": true,
			"module_id": finance["id"], "parent_id": ledger["id"], "role_ids": [editor_role]
		}),
	)
	.await;
	create(
		&app,
		manager,
		"/api/v1/routes",
		json!({
			"path": "/audit", "label": "Audit", "is_active": false,
			"module_id": finance["id"], "role_ids": [manager_role]
		}),
	)
	.await;
	create(
		&app,
		manager,
		"/api/v1/routes",
		json!({
			"path": "/people", "label": "People", "is_sidebar": true,
			"module_id": admin["id"], "role_ids": [manager_role]
		}),
	)
	.await;

	let response = app.get("/api/v1/sidebar", Some(manager)).await;
	assert_eq!(response.status(), StatusCode::OK);
	let sidebar = body_json(response).await;
	assert_eq!(field(&sidebar, "label"), vec!["Finance", "Admin"]);
	let finance_routes = &sidebar[0]["routes"];
	assert_eq!(field(finance_routes, "path"), vec!["/ledger", "/audit"]);
	assert_eq!(field(&finance_routes[0]["children"], "path"), vec!["/ledger/entries"]);
	assert_eq!(
		finance_routes[0]["roles"],
		json!([{"role_id": editor_role, "role_name": "editor"}])
	);

	let response = app.get("/api/v1/sidebar?is_active=true", Some(manager)).await;
	let active = body_json(response).await;
	assert_eq!(field(&active[0]["routes"], "path"), vec!["/ledger"]);

	let response = app.get("/api/v1/sidebar?role=editor", Some(manager)).await;
	assert_eq!(response.status(), StatusCode::OK);
	let editor_view = body_json(response).await;
	assert_eq!(field(&editor_view, "label"), vec!["Finance"]);
	assert_eq!(field(&editor_view[0]["routes"], "path"), vec!["/ledger"]);
	assert_eq!(
		field(&editor_view[0]["routes"][0]["children"], "path"),
		vec!["/ledger/entries"]
	);

	let response = app.get("/api/v1/sidebar?role=ghost", Some(manager)).await;
	assert_eq!(response.status(), StatusCode::NOT_FOUND);
	assert_eq!(body_json(response).await["message"], "Role not found");
}
