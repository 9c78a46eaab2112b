use std::net::SocketAddr;
use std::path::Path;

use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use marquee_api::{app, AppState, ServerConfig};
use marquee_core::logging;
use marquee_db::{log_pool_metrics, Database, PoolConfig};

/// Install the global subscriber.
///
/// Environment variables:
///   LOG_FORMAT  - "json" or "text" (default: "text")
///   LOG_FILE    - path to a daily-rotated log file (default: stdout only)
///   LOG_ANSI    - "true"/"false" to force ANSI colors
///   RUST_LOG    - env filter (default: "marquee_api=debug,marquee_db=debug,tower_http=debug")
///
/// The returned guard flushes the file writer and must live until exit.
fn init_tracing() -> Option<WorkerGuard> {
    let json = std::env::var("LOG_FORMAT").map_or(false, |v| v == "json");
    let log_file = std::env::var("LOG_FILE").ok();
    let log_ansi = std::env::var("LOG_ANSI")
        .ok()
        .map(|v| v == "true" || v == "1");

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "marquee_api=debug,marquee_db=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(env_filter);

    let Some(path) = log_file.as_deref() else {
        if json {
            registry.with(tracing_subscriber::fmt::layer().json()).init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer();
            if let Some(ansi) = log_ansi {
                layer = layer.with_ansi(ansi);
            }
            registry.with(layer).init();
        }
        return None;
    };

    let path = Path::new(path);
    let dir = path.parent().unwrap_or(Path::new("."));
    let file_name = path
        .file_name()
        .and_then(|f| f.to_str())
        .unwrap_or("marquee-api.log");
    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, file_name));

    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(writer))
            .init();
    } else {
        // Files get no ANSI escapes unless asked for.
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(writer)
                    .with_ansi(log_ansi.unwrap_or(false)),
            )
            .init();
    }
    Some(guard)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let _log_guard = init_tracing();

    let config = ServerConfig::from_env();

    info!(
        subsystem = logging::SUBSYSTEM_API,
        run_migrations = config.run_migrations,
        "Connecting to favorites database"
    );
    let db = Database::connect_with_config(&config.database_url, PoolConfig::from_env()).await?;

    if config.run_migrations {
        db.migrate().await?;
        info!(subsystem = logging::SUBSYSTEM_API, "Migrations applied");
    }
    log_pool_metrics(db.pool());

    let state = AppState::new(db.favorite_repository());
    let router = app(state, &config);

    let addr: SocketAddr = config.bind_addr().parse()?;
    info!(
        subsystem = logging::SUBSYSTEM_API,
        allowed_origins = config.allowed_origins.len(),
        body_limit = config.body_limit,
        "Marquee API listening on {}",
        addr
    );
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
