use std::{convert::Infallible, path::PathBuf, sync::Arc};

use anyhow::Context;
use clap::{self, Parser};
use hyper::service::service_fn;
use hyper_util::{
    rt::{TokioExecutor, TokioIo},
    server::conn::auto,
};
use log::info;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tokio::net::TcpListener;
use tracing::Instrument;
use tracing_subscriber::EnvFilter;

use encore_core::clock::SystemClock;
use encore_core::db::RECENT_LIMIT;
use migration::{Migrator, MigratorTrait};

mod api;
mod error;
mod event;
mod http;

use api::process_http::process_http;
use event::BackendContext;

#[derive(clap::Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Data directory path, the database is kept in `encore.db` there
    #[arg(short, long, env = "ENCORE_DATA")]
    data: Option<PathBuf>,

    /// Database url, overrides --data
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on, auto if not set
    #[arg(short, long)]
    port: Option<u16>,

    /// Log level (error, warn, info, debug, trace) or an env-filter directive
    #[arg(short, long, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Rows shown by the recently listed views
    #[arg(long, default_value_t = RECENT_LIMIT)]
    recent_limit: u64,
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let args = Args::parse();
    let filter = args
        .log_level
        .as_deref()
        .and_then(|l| EnvFilter::try_new(l).ok())
        .unwrap_or_else(|| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let db = prepare_db(args.data, args.database_url).await?;

    // Use port 0 if none specified (system will assign an available port)
    let port = args.port.unwrap_or(0);
    let addr = format!("{}:{}", args.host, port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    // Get the actual local address (including system-assigned port if port was 0)
    let local_addr = listener.local_addr()?;
    info!("Listening on: {}", local_addr);

    let ctx = Arc::new(BackendContext {
        db,
        clock: Arc::new(SystemClock),
        recent_limit: args.recent_limit,
    });

    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(conn) => conn,
            Err(e) => {
                log::warn!("accept failed: {e}");
                continue;
            }
        };
        let ctx = ctx.clone();
        tokio::spawn(
            async move {
                let service = service_fn(move |req| {
                    let ctx = ctx.clone();
                    async move { Ok::<_, Infallible>(process_http(&ctx, req).await) }
                });
                if let Err(e) = auto::Builder::new(TokioExecutor::new())
                    .serve_connection(TokioIo::new(stream), service)
                    .await
                {
                    log::debug!("connection closed with error: {e}");
                }
            }
            .instrument(tracing::debug_span!("conn", %peer)),
        );
    }
}

async fn prepare_db(
    data: Option<PathBuf>,
    database_url: Option<String>,
) -> Result<DatabaseConnection, anyhow::Error> {
    let db_url = match (database_url, data) {
        (Some(url), _) => url,
        (None, Some(data)) => {
            std::fs::create_dir_all(&data)
                .with_context(|| format!("Failed to create {}", data.display()))?;
            let db_path = data.join("encore.db");
            format!("sqlite://{}?mode=rwc", db_path.to_string_lossy())
        }
        (None, None) => anyhow::bail!("either --data or --database-url is required"),
    };

    let mut opt = ConnectOptions::new(db_url);
    opt.sqlx_logging_level(log::LevelFilter::Debug);
    let db = Database::connect(opt).await?;

    Migrator::up(&db, None).await?;
    info!("database ready");

    Ok(db)
}
