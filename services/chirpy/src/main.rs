use anyhow::Result;
use chirpy::{AppState, config::AppConfig, create_router, repositories::Repositories};
use common::database::{DatabaseConfig, health_check, init_pool, run_migrations};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// `DATABASE_URL` value that selects the in-process store
const MEMORY_DATABASE_URL: &str = "memory";

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("chirpy=info,tower_http=info")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting Chirpy service");

    let config = AppConfig::from_env()?;

    let repositories = if std::env::var("DATABASE_URL").as_deref() == Ok(MEMORY_DATABASE_URL) {
        info!("Using the in-memory store");
        Repositories::in_memory()
    } else {
        let db_config = DatabaseConfig::from_env()?;
        let pool = init_pool(&db_config).await?;

        if health_check(&pool).await? {
            info!("Database connection successful");
        } else {
            anyhow::bail!("Failed to connect to database");
        }

        run_migrations(&pool).await?;
        Repositories::postgres(pool)
    };

    let bind_addr = config.bind_addr.clone();
    let app = create_router(AppState::new(config, repositories));

    let listener = TcpListener::bind(&bind_addr).await?;
    info!("Chirpy listening on {}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
