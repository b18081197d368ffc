// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Vectix authorization server binary.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tower_http::{
	cors::{Any, CorsLayer},
	trace::TraceLayer,
};
use tracing_subscriber::{
	layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter, Registry,
};
use vectix_server::{
	create_app_state, create_router,
	validation::{sanitize_email, validate_email, validate_password_strength, validate_username},
};
use vectix_server_auth::hash_password;
use vectix_server_config::ServerConfig;
use vectix_server_db::{NewUser, RoleRepository, UserRepository};

const ADMIN_ROLE: &str = "admin";

/// Filter in effect while the configuration itself is loading.
const BOOTSTRAP_LOG_LEVEL: &str = "info";

type FilterHandle = reload::Handle<EnvFilter, Registry>;

/// Vectix server - multi-tenant RBAC and ABAC over HTTP.
#[derive(Parser, Debug)]
#[command(name = "vectix-server", about = "Vectix authorization server", version)]
struct Args {
	/// Config file to use instead of /etc/vectix/server.toml
	#[arg(long, global = true, env = "VECTIX_SERVER_CONFIG")]
	config: Option<PathBuf>,

	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Show version information
	Version,

	/// Create an active superuser holding the admin role
	CreateSuperuser {
		#[arg(long)]
		username: String,
		#[arg(long)]
		email: String,
		#[arg(long)]
		name: String,
		#[arg(long)]
		phone_number: Option<String>,
		#[arg(long, env = "VECTIX_SUPERUSER_PASSWORD", hide_env_values = true)]
		password: String,
	},
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let args = Args::parse();

	if let Some(Command::Version) = args.command {
		println!("vectix-server {}", env!("CARGO_PKG_VERSION"));
		return Ok(());
	}

	// Load .env file if present
	dotenvy::dotenv().ok();

	// RUST_LOG, when set, wins over the configured level.
	let env_filter = EnvFilter::try_from_default_env().ok();
	let from_env = env_filter.is_some();
	let (filter, filter_handle) =
		reload::Layer::new(env_filter.unwrap_or_else(|| EnvFilter::new(BOOTSTRAP_LOG_LEVEL)));
	tracing_subscriber::registry()
		.with(filter)
		.with(tracing_subscriber::fmt::layer())
		.init();

	let config = match &args.config {
		Some(path) => vectix_server_config::load_config_with_file(path),
		None => vectix_server_config::load_config(),
	}
	.context("failed to load configuration")?;

	if !from_env {
		apply_configured_level(&filter_handle, &config.logging.level)?;
	}

	match args.command {
		Some(Command::CreateSuperuser {
			username,
			email,
			name,
			phone_number,
			password,
		}) => {
			create_superuser(
				&config,
				SuperuserInput {
					username,
					email,
					name,
					phone_number,
					password,
				},
			)
			.await
		}
		_ => serve(config).await,
	}
}

/// Swap the bootstrap filter for the level named in the configuration.
fn apply_configured_level(handle: &FilterHandle, level: &str) -> anyhow::Result<()> {
	handle
		.reload(EnvFilter::new(level))
		.context("failed to apply configured log level")
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
	tracing::info!(
		host = %config.http.host,
		port = config.http.port,
		database = %config.database.url,
		"starting vectix-server"
	);

	let pool = vectix_server_db::create_pool(&config.database.url).await?;
	vectix_server_db::run_migrations(&pool).await?;

	let state = create_app_state(pool, &config);
	let app = create_router(state)
		.layer(TraceLayer::new_for_http())
		.layer(
			CorsLayer::new()
				.allow_origin(Any)
				.allow_methods(Any)
				.allow_headers(Any),
		);

	let addr = config.socket_addr();
	let listener = tokio::net::TcpListener::bind(&addr)
		.await
		.with_context(|| format!("failed to bind {addr}"))?;
	tracing::info!(%addr, "listening");

	tokio::select! {
		result = axum::serve(listener, app) => {
			result.context("server error")?;
		}
		_ = tokio::signal::ctrl_c() => {
			tracing::info!("shutting down");
		}
	}

	Ok(())
}

struct SuperuserInput {
	username: String,
	email: String,
	name: String,
	phone_number: Option<String>,
	password: String,
}

async fn create_superuser(config: &ServerConfig, input: SuperuserInput) -> anyhow::Result<()> {
	if !validate_username(&input.username) {
		bail!("username must be 3-32 characters of letters, digits, '_' or '-'");
	}
	let email = sanitize_email(&input.email);
	if !validate_email(&email) {
		bail!("invalid email address: {email}");
	}
	validate_password_strength(&input.password).map_err(anyhow::Error::msg)?;

	let pool = vectix_server_db::create_pool(&config.database.url).await?;
	vectix_server_db::run_migrations(&pool).await?;

	let admin = RoleRepository::new(pool.clone())
		.ensure_role(ADMIN_ROLE, Some("Administrator"))
		.await?;

	let actor = UserRepository::new(pool)
		.create_user(&NewUser {
			name: input.name,
			phone_number: input.phone_number,
			email,
			username: input.username,
			hashed_password: hash_password(&input.password)?,
			is_active: true,
			is_superuser: true,
			role_ids: vec![admin.role_id],
		})
		.await?;

	tracing::info!(user_id = %actor.id, username = %actor.username, "superuser created");
	println!("Superuser '{}' created ({})", actor.username, actor.id);
	Ok(())
}
