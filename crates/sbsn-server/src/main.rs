//! SBSN Server
//!
//! HTTP backend issuing and verifying bearer tokens for SBSN users.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::info;
use zeroize::Zeroizing;

use sbsn_core::config::{self, load_config};
use sbsn_core::tracing_init::init_tracing;
use sbsn_server::auth::{SigningKey, SystemClock};
use sbsn_server::server::{AppState, build_router};
use sbsn_server::storage::UserDatabase;

#[derive(Parser, Debug)]
#[command(name = "sbsn-server")]
#[command(version, about = "SBSN backend - sign-in and bearer token verification")]
struct Args {
    /// Settings file (JSON), layered over the global settings.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Address to listen on.
    #[arg(long)]
    addr: Option<SocketAddr>,

    /// Path to SQLite database file.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Token signing secret (at least 32 bytes).
    #[arg(long, env = "SBSN_JWT_SECRET", hide_env_values = true)]
    jwt_secret: String,

    /// Token TTL in seconds.
    #[arg(long)]
    token_ttl: Option<i64>,

    /// Clock skew tolerance in seconds (0-60).
    #[arg(long)]
    clock_skew: Option<i64>,

    /// Principal lookup timeout in milliseconds.
    #[arg(long)]
    lookup_timeout_ms: Option<u64>,

    /// Output logs as JSON (for structured log aggregation).
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut args = Args::parse();
    let mut secret = Zeroizing::new(std::mem::take(&mut args.jwt_secret).into_bytes());

    let mut cfg = load_config(args.config.as_deref())?;
    if let Some(addr) = args.addr {
        cfg.server.addr = addr;
    }
    if let Some(path) = args.db_path {
        cfg.server.database_path = Some(path);
    }
    if let Some(ttl) = args.token_ttl {
        cfg.auth.token_ttl_secs = ttl;
    }
    if let Some(skew) = args.clock_skew {
        cfg.auth.clock_skew_secs = skew;
    }
    if let Some(ms) = args.lookup_timeout_ms {
        cfg.auth.lookup_timeout_ms = ms;
    }
    cfg.auth.validate()?;

    init_tracing(
        &format!("sbsn_server={}", cfg.server.log_level),
        args.log_json,
    );

    info!(
        version = env!("CARGO_PKG_VERSION"),
        addr = %cfg.server.addr,
        token_ttl_secs = cfg.auth.token_ttl_secs,
        clock_skew_secs = cfg.auth.clock_skew_secs,
        "Starting sbsn-server"
    );

    // A missing or weak key is fatal at startup, never a per-request failure.
    let key = Arc::new(SigningKey::from_secret(&mut secret)?);

    let db_path = match cfg.server.database_path.clone() {
        Some(path) => path,
        None => config::database_path()
            .ok_or_else(|| anyhow::anyhow!("Cannot determine data directory"))?,
    };
    info!(path = %db_path.display(), "Opening user database");
    let db = UserDatabase::open(&db_path).await?;

    let state = AppState::new(Arc::new(db), key, Arc::new(SystemClock), &cfg.auth);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(cfg.server.addr).await?;
    info!(addr = %cfg.server.addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Received shutdown signal");
        })
        .await?;

    info!("Server stopped");
    Ok(())
}
