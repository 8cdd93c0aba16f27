use anyhow::Context;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use tohpitoh::api::ApiClient;
use tohpitoh::config::Config;
use tohpitoh::session::SessionResolver;
use tohpitoh::store::ClientStore;

fn main() -> anyhow::Result<()> {
    // Init logging
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();
    fmt().with_env_filter(filter).init();

    let cfg = Config::from_env()?;

    // Startup banner at info level so something always prints at default verbosity
    let rust_log = std::env::var("RUST_LOG").unwrap_or_else(|_| "<unset>".to_string());
    info!(
        target: "tohpitoh",
        "TOHPITOH portal starting: RUST_LOG='{}', api_url='{}', state_dir='{}'",
        rust_log, cfg.api_url, cfg.state_dir.display()
    );

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build Tokio runtime")?;

    let store = ClientStore::open(&cfg.state_dir)?;
    let resolver = SessionResolver::new(ApiClient::new(cfg.api_url.clone()), store.clone());

    tohpitoh::cli::repl::run(rt, resolver, store)
}
