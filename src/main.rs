use std::sync::Arc;

use dotenvy::dotenv;
use stockroom::config::{self, Settings};
use stockroom::errors::Result;
use stockroom::web::{self, AppState};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file (non-fatal, env vars can be set externally)
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Resolve application settings
    let settings = Settings::from_env()
        .inspect_err(|e| error!("Failed to resolve settings: {}", e))?;
    info!(addr = %settings.bind_addr, "Resolved application settings.");

    // 4. Initialize database
    let db = config::database::create_connection(&settings.database_url)
        .await
        .inspect(|_| info!("Database connection established."))
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    config::database::create_tables(&db)
        .await
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Seed initial products (if a seed file is configured)
    if let Some(seed_path) = &settings.seed_path {
        let seed = config::seed::load_seed_config(seed_path)?;
        config::seed::apply_seed(&db, &seed)
            .await
            .inspect_err(|e| error!("Failed to seed products: {}", e))?;
    }

    // 6. Serve
    let state = AppState {
        db,
        settings: Arc::new(settings),
    };
    let listener = tokio::net::TcpListener::bind(&state.settings.bind_addr).await?;
    info!(addr = %state.settings.bind_addr, "Stockroom listening");
    axum::serve(listener, web::router(state))
        .await
        .map_err(Into::into)
}
