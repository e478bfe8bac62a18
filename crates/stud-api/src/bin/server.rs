//! stud-server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) layered with
//! `STUD_*` environment variables, opens the SQLite store, and serves the
//! JSON API over HTTP.
//!
//! ```toml
//! host = "127.0.0.1"
//! port = 8080
//! store_path = "~/.local/share/stud/stud.db"
//! seed_test_data = false
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use stud_api::ServerConfig;
use stud_core::registry::Registry;
use stud_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Stud book registry server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Load the demonstration records before serving.
  #[arg(long)]
  seed: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  init_tracing();

  let cli = Cli::parse();
  let cfg = load_config(cli.config)?;

  let store_path = expand_tilde(&cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("cannot open stud book at {}", store_path.display()))?;
  if cli.seed || cfg.seed_test_data {
    store.insert_test_data().await.context("seeding test data")?;
  }

  let registry = Registry::new(Arc::new(store));
  let app = stud_api::api_router(Arc::new(registry));

  let listener = TcpListener::bind((cfg.host.as_str(), cfg.port))
    .await
    .with_context(|| format!("cannot bind {}:{}", cfg.host, cfg.port))?;
  tracing::info!(address = %listener.local_addr()?, "stud-server ready");

  axum::serve(listener, app).await.context("serving requests")
}

/// `RUST_LOG` wins; otherwise everything at INFO and above.
fn init_tracing() {
  let filter = EnvFilter::builder()
    .with_default_directive(LevelFilter::INFO.into())
    .from_env_lossy();
  tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Defaults, then the optional TOML file, then `STUD_*` variables.
fn load_config(file: PathBuf) -> anyhow::Result<ServerConfig> {
  config::Config::builder()
    .set_default("host", "127.0.0.1")?
    .set_default("port", 8080)?
    .set_default("store_path", "stud.db")?
    .add_source(config::File::from(file).required(false))
    .add_source(config::Environment::with_prefix("STUD"))
    .build()
    .context("reading configuration")?
    .try_deserialize()
    .context("invalid server configuration")
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
