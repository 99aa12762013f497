//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors; request errors are rendered by the
//! gate crate.

use anyhow::Context;
use base64::Engine;
use base64::engine::general_purpose;
use gate::infra::seed::{apply_seed, load_seed_file};
use gate::{
    GateAppState, GateConfig, InMemoryIdentityProvider, InMemoryRoleDirectory, PgRoleDirectory,
    PortalRegistry, gate_router,
};
use sqlx::postgres::PgPoolOptions;
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,gate=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = load_config()?;
    tracing::info!(
        role_lookup_timeout_ms = config.role_lookup_timeout.as_millis() as u64,
        role_cache = config.role_cache_ttl.is_some(),
        "Gate configuration loaded"
    );

    // Portals; an unknown slug stops startup here
    let registry = match env::var("GATE_PORTALS") {
        Ok(list) => {
            let slugs: Vec<&str> = list.split(',').filter(|s| !s.trim().is_empty()).collect();
            PortalRegistry::with_slugs(&slugs)?
        }
        Err(_) => PortalRegistry::new()?,
    };
    tracing::info!(portals = registry.len(), "Portal registry built");

    // Identity provider, seeded from file
    let provider = InMemoryIdentityProvider::new(config.password_pepper.clone());
    let seed = env::var("GATE_SEED_FILE").ok().map(PathBuf::from);

    let app = match env::var("DATABASE_URL") {
        Ok(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(&database_url)
                .await?;

            tracing::info!("Connected to database");

            // Run migrations
            sqlx::migrate!("../../../database/migrations")
                .run(&pool)
                .await?;

            tracing::info!("Migrations completed");

            if let Some(path) = &seed {
                // Role records live in the database; the seed only supplies accounts
                apply_seed(load_seed_file(path)?, &provider, &InMemoryRoleDirectory::new())?;
            }

            let directory = PgRoleDirectory::new(pool);
            gate_router(GateAppState::new(provider, directory, config, registry))
        }
        Err(_) => {
            tracing::warn!("DATABASE_URL not set, using in-memory role directory");

            let directory = InMemoryRoleDirectory::new();
            if let Some(path) = &seed {
                apply_seed(load_seed_file(path)?, &provider, &directory)?;
            }

            gate_router(GateAppState::new(provider, directory, config, registry))
        }
    };

    let app = app.layer(TraceLayer::new_for_http());

    // Start server
    let addr: SocketAddr = env::var("GATE_LISTEN_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:31113".to_string())
        .parse()
        .context("GATE_LISTEN_ADDR must be host:port")?;
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// Gate configuration from the environment
fn load_config() -> anyhow::Result<GateConfig> {
    let mut config = if cfg!(debug_assertions) {
        GateConfig::development()
    } else {
        // In production, load secret from environment
        let secret_b64 = env::var("GATE_SESSION_SECRET")
            .context("GATE_SESSION_SECRET must be set in production")?;
        let secret_bytes = Engine::decode(&general_purpose::STANDARD, &secret_b64)?;
        let secret: [u8; 32] = secret_bytes
            .try_into()
            .map_err(|_| anyhow::anyhow!("GATE_SESSION_SECRET must decode to 32 bytes"))?;
        GateConfig {
            session_secret: secret,
            ..GateConfig::default()
        }
    };

    if let Ok(ms) = env::var("GATE_ROLE_LOOKUP_TIMEOUT_MS") {
        let ms: u64 = ms.parse().context("GATE_ROLE_LOOKUP_TIMEOUT_MS must be an integer")?;
        config.role_lookup_timeout = Duration::from_millis(ms);
    }

    if let Ok(secs) = env::var("GATE_ROLE_CACHE_TTL_SECS") {
        let secs: u64 = secs.parse().context("GATE_ROLE_CACHE_TTL_SECS must be an integer")?;
        config.role_cache_ttl = (secs > 0).then(|| Duration::from_secs(secs));
    }

    if let Ok(pepper) = env::var("GATE_PASSWORD_PEPPER") {
        config.password_pepper = Some(pepper.into_bytes());
    }

    Ok(config)
}
