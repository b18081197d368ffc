// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Centralized configuration management for the Vectix authorization server.
//!
//! This crate provides:
//! - Layered configuration from multiple sources (defaults, TOML file, environment)
//! - Type-safe configuration with validation
//! - Consistent environment variable naming (`VECTIX_SERVER_*`)
//!
//! # Usage
//!
//! ```ignore
//! use vectix_server_config::load_config;
//!
//! let config = load_config()?;
//! println!("Server listening on {}", config.socket_addr());
//! ```

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::ServerConfigLayer;
pub use sections::*;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use tracing::{debug, info};

/// Fully resolved server configuration.
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
	pub http: HttpConfig,
	pub database: DatabaseConfig,
	pub auth: AuthConfig,
	pub logging: LoggingConfig,
}

impl ServerConfig {
	/// Get the socket address string for binding.
	pub fn socket_addr(&self) -> String {
		format!("{}:{}", self.http.host, self.http.port)
	}
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`VECTIX_SERVER_*`)
/// 2. Config file (`/etc/vectix/server.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	])
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	])
}

fn load_from_sources(mut sources: Vec<Box<dyn ConfigSource>>) -> Result<ServerConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = ServerConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	finalize(merged)
}

/// Finalize configuration layer into resolved config.
pub fn finalize(layer: ServerConfigLayer) -> Result<ServerConfig, ConfigError> {
	let http = layer.http.unwrap_or_default().finalize();
	let database = layer.database.unwrap_or_default().finalize();
	let auth = layer.auth.unwrap_or_default().finalize();
	let logging = layer.logging.unwrap_or_default().finalize();

	validate_config(&auth)?;

	info!(
		host = %http.host,
		port = http.port,
		database = %database.url,
		environment = %auth.environment,
		secret_configured = auth.secret_key.is_some(),
		access_token_expire_minutes = auth.access_token_expire_minutes,
		refresh_token_expire_days = auth.refresh_token_expire_days,
		signups_disabled = auth.signups_disabled,
		"Server configuration loaded"
	);

	Ok(ServerConfig {
		http,
		database,
		auth,
		logging,
	})
}

/// Validate cross-field configuration rules.
fn validate_config(auth: &AuthConfig) -> Result<(), ConfigError> {
	if auth.is_production() && auth.secret_key.is_none() {
		return Err(ConfigError::Validation(
			"VECTIX_SERVER_SECRET_KEY must be set when VECTIX_SERVER_ENV=production. \
			 Tokens signed with a generated key do not survive a restart."
				.to_string(),
		));
	}

	if auth.access_token_expire_minutes <= 0 {
		return Err(ConfigError::InvalidValue {
			key: "auth.access_token_expire_minutes".to_string(),
			message: format!("must be positive, got {}", auth.access_token_expire_minutes),
		});
	}

	if auth.refresh_token_expire_days <= 0 {
		return Err(ConfigError::InvalidValue {
			key: "auth.refresh_token_expire_days".to_string(),
			message: format!("must be positive, got {}", auth.refresh_token_expire_days),
		});
	}

	if auth.default_role.trim().is_empty() {
		return Err(ConfigError::Validation(
			"auth.default_role must not be empty".to_string(),
		));
	}

	Ok(())
}
