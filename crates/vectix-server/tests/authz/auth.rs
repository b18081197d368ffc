// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Login, token and registration tests.

use axum::http::{header::WWW_AUTHENTICATE, StatusCode};
use chrono::Utc;
use serde_json::json;
use vectix_server_auth::{Claims, TokenKind};
use vectix_server_config::ServerConfig;

use super::support::{body_json, TestApp, PASSWORD};

// ============================================================================
// Login
// ============================================================================

#[tokio::test]
async fn login_issues_usable_token_pair() {
	let app = TestApp::new().await;

	let response = app
		.post(
			"/api/v1/auth/login",
			None,
			json!({"username": "manager", "password": PASSWORD}),
		)
		.await;
	assert_eq!(response.status(), StatusCode::OK);
	let body = body_json(response).await;
	assert_eq!(body["token_type"], "bearer");

	let access = body["access_token"].as_str().unwrap();
	let response = app.get_with_token("/api/v1/users/me", access).await;
	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(body_json(response).await["username"], "manager");
}

#[tokio::test]
async fn login_rejects_wrong_password_and_unknown_user_alike() {
	let app = TestApp::new().await;

	for (username, password) in [("manager", "wrong-password"), ("ghost", PASSWORD)] {
		let response = app
			.post(
				"/api/v1/auth/login",
				None,
				json!({"username": username, "password": password}),
			)
			.await;
		assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
		assert_eq!(response.headers().get(WWW_AUTHENTICATE).unwrap(), "Bearer");
		let body = body_json(response).await;
		assert_eq!(body["message"], "Incorrect username or password");
	}
}

// ============================================================================
// Bearer validation
// ============================================================================

#[tokio::test]
async fn missing_token_is_401_with_challenge() {
	let app = TestApp::new().await;

	let response = app.get("/api/v1/users/me", None).await;
	assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
	assert_eq!(response.headers().get(WWW_AUTHENTICATE).unwrap(), "Bearer");
	assert_eq!(
		body_json(response).await["message"],
		"Could not validate credentials"
	);
}

#[tokio::test]
async fn refresh_token_is_not_an_access_token() {
	let app = TestApp::new().await;
	let manager = &app.fixtures.manager;

	let response = app
		.get_with_token("/api/v1/users", &manager.refresh_token)
		.await;
	assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn garbage_and_expired_tokens_are_401() {
	let app = TestApp::new().await;

	let response = app.get_with_token("/api/v1/users/me", "not-a-jwt").await;
	assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

	let expired = app
		.state
		.tokens
		.encode_claims(&Claims {
			sub: "manager".to_string(),
			exp: Utc::now().timestamp() - 60,
			kind: TokenKind::Access,
		})
		.unwrap();
	let response = app.get_with_token("/api/v1/users/me", &expired).await;
	assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_for_vanished_subject_is_401() {
	let app = TestApp::new().await;
	let ghost = app.state.tokens.issue_access("ghost").unwrap();

	let response = app.get_with_token("/api/v1/users/me", &ghost).await;
	assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Refresh
// ============================================================================

#[tokio::test]
async fn refresh_rotates_into_a_new_pair() {
	let app = TestApp::new().await;
	let manager = &app.fixtures.manager;

	let response = app
		.post(
			"/api/v1/auth/refresh",
			None,
			json!({"refresh_token": manager.refresh_token}),
		)
		.await;
	assert_eq!(response.status(), StatusCode::OK);
	let body = body_json(response).await;

	let access = body["access_token"].as_str().unwrap();
	let response = app.get_with_token("/api/v1/users/me", access).await;
	assert_eq!(response.status(), StatusCode::OK);

	let refresh = body["refresh_token"].as_str().unwrap();
	let response = app.get_with_token("/api/v1/users/me", refresh).await;
	assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn refresh_rejects_access_tokens_and_unknown_subjects() {
	let app = TestApp::new().await;
	let manager = &app.fixtures.manager;
	let ghost_refresh = app.state.tokens.issue_refresh("ghost").unwrap();

	for token in [manager.access_token.as_str(), ghost_refresh.as_str(), "garbage"] {
		let response = app
			.post("/api/v1/auth/refresh", None, json!({"refresh_token": token}))
			.await;
		assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
		assert_eq!(
			body_json(response).await["message"],
			"Could not validate credentials"
		);
	}
}

// ============================================================================
// Registration
// ============================================================================

fn registration(username: &str) -> serde_json::Value {
	json!({
		"name": "New Person",
		"phone_number": "+15550100",
		"email": format!("{username}@example.com"),
		"username": username,
		"password": "long-enough-pw"
	})
}

#[tokio::test]
async fn register_creates_active_account_with_default_role() {
	let app = TestApp::new().await;

	let response = app
		.post("/api/v1/auth/register", None, registration("newbie"))
		.await;
	assert_eq!(response.status(), StatusCode::CREATED);
	let body = body_json(response).await;
	assert_eq!(body["is_active"], true);
	assert_eq!(body["is_superuser"], false);
	assert_eq!(body["roles"][0]["name"], "user");
	assert!(body.get("hashed_password").is_none());

	let response = app
		.post(
			"/api/v1/auth/login",
			None,
			json!({"username": "newbie", "password": "long-enough-pw"}),
		)
		.await;
	assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn register_rejects_duplicates_and_invalid_input() {
	let app = TestApp::new().await;

	let response = app
		.post("/api/v1/auth/register", None, registration("manager"))
		.await;
	assert_eq!(response.status(), StatusCode::CONFLICT);

	let mut short = registration("shorty");
	short["password"] = json!("short");
	let response = app.post("/api/v1/auth/register", None, short).await;
	assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

	let mut blank = registration("blank");
	blank["username"] = json!("");
	let response = app.post("/api/v1/auth/register", None, blank).await;
	assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn register_is_forbidden_when_signups_disabled() {
	let mut config = ServerConfig::default();
	config.auth.signups_disabled = true;
	let app = TestApp::with_config(config).await;

	let response = app
		.post("/api/v1/auth/register", None, registration("newbie"))
		.await;
	assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ============================================================================
// Public surface
// ============================================================================

#[tokio::test]
async fn health_and_openapi_are_public() {
	let app = TestApp::new().await;

	let response = app.get("/health", None).await;
	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(body_json(response).await["status"], "healthy");

	let response = app.get("/api/openapi.json", None).await;
	assert_eq!(response.status(), StatusCode::OK);
	let body = body_json(response).await;
	assert!(body["paths"]["/api/v1/rbac/roles"].is_object());
}
