// Main entry point for the LastBite access server

use std::sync::Arc;

use anyhow::{Context, Result};
use lastbite_core::kernel::{
    listen_for_profile_changes, BaseProfileStore, HostedAuthClient, PgProfileStore, ProfileHub,
    ServerDeps,
};
use lastbite_core::{server::build_app, Config};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,lastbite_core=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    tracing::info!("Starting LastBite access server");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(
        local_jwt_validation = config.auth_jwt_secret.is_some(),
        secure_cookies = config.secure_cookies,
        "Configuration loaded"
    );

    // Connect to database
    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connected");

    // Run migrations
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations complete");

    // Collaborators
    let auth = Arc::new(
        HostedAuthClient::new(
            &config.auth_url,
            config.auth_anon_key.clone(),
            config.auth_jwt_secret.as_deref(),
        )
        .context("Failed to create auth provider client")?,
    );
    let profiles: Arc<dyn BaseProfileStore> = Arc::new(PgProfileStore::new(pool.clone()));
    let profile_hub = ProfileHub::new();

    // Push admin-side profile changes to open streams
    let listener_pool = pool.clone();
    let listener_store = profiles.clone();
    let listener_hub = profile_hub.clone();
    tokio::spawn(async move {
        listen_for_profile_changes(&listener_pool, listener_store, listener_hub).await
    });

    let deps = ServerDeps::new(
        auth,
        profiles,
        profile_hub,
        config.site_url.clone(),
        config.secure_cookies,
    );

    // Build application
    let app = build_app(deps, &config.allowed_origins);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}
