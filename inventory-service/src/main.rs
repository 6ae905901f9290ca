use anyhow::Result;
use clap::Parser;
use diesel::{Connection, PgConnection};
use diesel_async::pooled_connection::{bb8::Pool, AsyncDieselConnectionManager};
use diesel_async::AsyncPgConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use inventory_service::{api, seed, store::Stores};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

#[derive(Parser)]
#[command(name = "inventory-service")]
struct Args {
    /// Postgres URL. Without it records are kept in memory.
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    #[arg(long, env = "DATABASE_POOL_SIZE", default_value = "10")]
    pool_size: u32,

    #[arg(long, env = "PORT", default_value = "8000")]
    port: u16,

    /// Load the demo catalogue on startup.
    #[arg(long, env = "SEED_DEMO_DATA")]
    seed_demo_data: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();

    let stores = match &args.database_url {
        Some(database_url) => {
            info!("Running database migrations...");
            let mut conn = PgConnection::establish(database_url)?;
            conn.run_pending_migrations(MIGRATIONS)
                .map_err(|e| anyhow::anyhow!("Migration error: {}", e))?;
            info!("Migrations completed successfully");

            let config = AsyncDieselConnectionManager::<AsyncPgConnection>::new(database_url);
            let pool = Pool::builder()
                .max_size(args.pool_size)
                .build(config)
                .await?;
            Stores::postgres(pool)
        }
        None => {
            warn!("DATABASE_URL not set, records are kept in memory and lost on exit");
            Stores::in_memory()
        }
    };

    if args.seed_demo_data {
        seed::seed_demo_data(&stores).await?;
    }

    let app = api::create_router(api::AppState { stores });
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", args.port)).await?;

    info!("Inventory service listening on http://0.0.0.0:{}", args.port);

    axum::serve(listener, app).await?;

    Ok(())
}
