//! Taskboard server and administration commands.
//!
//! Usage:
//!
//! ```text
//! taskboard serve
//! taskboard migrate
//! taskboard create-worker --username admin --password <secret>
//! ```
//!
//! Configuration comes from the environment (and a `.env` file when
//! present). Without `DATABASE_URL` the server runs on the in-memory store
//! and `migrate` / `create-worker` have nothing to act on.

use clap::{Parser, Subcommand};
use secrecy::ExposeSecret;
use std::sync::Arc;
use taskboard::{
    config::AppConfig,
    telemetry,
    tracker::{
        adapters::{
            memory::{InMemorySessionStore, InMemoryTrackerStore},
            postgres::{
                MigrationError, PgPool, PostgresSessionStore, PostgresTrackerStore, build_pool,
                run_migrations,
            },
        },
        ports::{SessionStore, TrackerStore},
        services::{WorkerCreateForm, WorkerForm, WorkerService, WorkerServiceError},
    },
    web::{AppState, build_router},
};
use thiserror::Error;

/// Boxed error type for the main result.
type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Parser)]
#[command(name = "taskboard", version, about = "Task tracking service")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server.
    Serve,
    /// Apply pending database migrations.
    Migrate,
    /// Create a worker account, typically the first login.
    CreateWorker {
        /// Login name.
        #[arg(long)]
        username: String,
        /// Password; prefer the environment variable over the flag.
        #[arg(long, env = "TASKBOARD_WORKER_PASSWORD", hide_env_values = true)]
        password: String,
        /// Given name.
        #[arg(long, default_value = "")]
        first_name: String,
        /// Family name.
        #[arg(long, default_value = "")]
        last_name: String,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error("DATABASE_URL must be set for `{0}`")]
    DatabaseRequired(&'static str),
    #[error("failed to connect to the database: {0}")]
    Pool(#[source] diesel::r2d2::PoolError),
    #[error("failed to check out a connection: {0}")]
    Connection(#[source] diesel::r2d2::PoolError),
    #[error(transparent)]
    Migration(#[from] MigrationError),
    #[error("migration task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
    #[error("worker rejected: {0}")]
    Worker(#[from] WorkerServiceError),
    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = AppConfig::from_env()?;
    telemetry::init(&config.log_filter, config.log_format);

    match cli.command {
        Command::Serve => serve(&config).await?,
        Command::Migrate => migrate(&config).await?,
        Command::CreateWorker {
            username,
            password,
            first_name,
            last_name,
        } => {
            let form = WorkerCreateForm {
                profile: WorkerForm {
                    username,
                    first_name,
                    last_name,
                    position: String::new(),
                },
                password2: password.clone(),
                password1: password,
            };
            create_worker(&config, &form).await?;
        }
    }
    Ok(())
}

fn connect(config: &AppConfig, command: &'static str) -> Result<PgPool, CliError> {
    let url = config
        .database_url
        .as_ref()
        .ok_or(CliError::DatabaseRequired(command))?;
    build_pool(url.expose_secret(), config.db_pool_size).map_err(CliError::Pool)
}

async fn apply_migrations(pool: PgPool) -> Result<(), CliError> {
    let applied = tokio::task::spawn_blocking(move || {
        let mut connection = pool.get().map_err(CliError::Connection)?;
        run_migrations(&mut connection).map_err(CliError::from)
    })
    .await??;
    tracing::info!(count = applied.len(), "database schema up to date");
    Ok(())
}

async fn migrate(config: &AppConfig) -> Result<(), CliError> {
    apply_migrations(connect(config, "migrate")?).await
}

async fn create_worker(config: &AppConfig, form: &WorkerCreateForm) -> Result<(), CliError> {
    let pool = connect(config, "create-worker")?;
    let service = WorkerService::new(Arc::new(PostgresTrackerStore::new(pool)));
    let worker = service.create(form).await?;
    tracing::info!(worker_id = %worker.id(), username = %worker.username(), "worker created");
    Ok(())
}

async fn serve(config: &AppConfig) -> Result<(), CliError> {
    let (store, sessions): (Arc<dyn TrackerStore>, Arc<dyn SessionStore>) =
        if config.database_url.is_some() {
            let pool = connect(config, "serve")?;
            apply_migrations(pool.clone()).await?;
            (
                Arc::new(PostgresTrackerStore::new(pool.clone())),
                Arc::new(PostgresSessionStore::new(pool)),
            )
        } else {
            tracing::warn!("DATABASE_URL not set; using the in-memory store");
            (
                Arc::new(InMemoryTrackerStore::new()),
                Arc::new(InMemorySessionStore::new()),
            )
        };

    let app = build_router(AppState::new(store, sessions, config.session_ttl()));
    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    tracing::info!(addr = %config.bind, "taskboard listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("taskboard stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}
