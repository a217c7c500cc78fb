// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use anyhow::{Context, Result, bail};
use axum::http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use axum::http::HeaderValue;
use clap::{Parser, Subcommand};
use server::auth::password::{MIN_PASSWORD_LENGTH, hash_password};
use server::config::{self, ServerConfig};
use server::database::{self, users};
use server::routes;
use server::state::AppState;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

#[derive(Parser)]
#[command(name = "audit-server")]
#[command(about = "Audit project tracker backend")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,

    /// Add an account that can obtain API tokens
    CreateUser {
        #[arg(long)]
        username: String,

        #[arg(long, default_value = "")]
        email: String,

        #[arg(long, env = "AUDIT_USER_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Remove an account. Records pointing at it keep existing with the
    /// reference cleared.
    DeleteUser {
        #[arg(long)]
        username: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve().await,
        Command::CreateUser {
            username,
            email,
            password,
        } => create_user(&username, &email, &password).await,
        Command::DeleteUser { username } => delete_user(&username).await,
    }
}

async fn serve() -> Result<()> {
    tracing::info!("Starting up the server...");
    let config = ServerConfig::from_env()?;

    let db_pool = database::establish_connection_pool(&config.database_url).await?;
    tracing::info!("Database connection was made successfully.");

    tokio::fs::create_dir_all(&config.media_root)
        .await
        .with_context(|| format!("Failed to create {}", config.media_root.display()))?;

    let cors = build_cors_layer(&config.cors_origins)?;
    let addr = format!("{}:{}", config.host, config.port);

    let app = routes::create_router(AppState::new(db_pool, config)).layer(cors);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("The server listens on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Any origin when none is configured, otherwise exactly the listed ones.
fn build_cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        let origins = origins
            .iter()
            .map(|o| {
                HeaderValue::from_str(o).with_context(|| format!("Invalid CORS origin '{o}'"))
            })
            .collect::<Result<Vec<_>>>()?;
        AllowOrigin::list(origins)
    };

    Ok(CorsLayer::new()
        .allow_methods(Any)
        .allow_headers([CONTENT_TYPE, ACCEPT, AUTHORIZATION])
        .allow_origin(allow_origin))
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received Ctrl-C, starting graceful shutdown"),
        Err(e) => {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

async fn create_user(username: &str, email: &str, password: &str) -> Result<()> {
    if username.trim().is_empty() {
        bail!("Username must not be empty");
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        bail!("Password must be at least {MIN_PASSWORD_LENGTH} characters long");
    }

    let pool = database::establish_connection_pool(&config::database_url()).await?;
    if users::find_user_by_username(&pool, username).await?.is_some() {
        bail!("User '{username}' already exists");
    }

    let hash = hash_password(password).map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;
    let user = users::create_user(&pool, username, email, &hash).await?;
    println!("Created user '{}' (id {})", user.username, user.id);
    Ok(())
}

async fn delete_user(username: &str) -> Result<()> {
    let pool = database::establish_connection_pool(&config::database_url()).await?;
    let user = users::find_user_by_username(&pool, username)
        .await?
        .with_context(|| format!("No user named '{username}'"))?;

    users::delete_user(&pool, user.id).await?;
    println!("Deleted user '{username}'");
    Ok(())
}
