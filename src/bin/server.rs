use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use football_data::config::{Config, parse_db_path_arg};
use football_data::http_client::{Fetcher, HttpFetcher, Upstream};
use football_data::refresh_gate::RefreshGate;
use football_data::server;
use football_data::service::StatsService;
use football_data::store::Store;

fn main() -> Result<()> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let config = Config::from_env().with_db_override(parse_db_path_arg(&args));

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("football_data=info,tower_http=info")),
        )
        .init();

    let store = Store::new(&config.db_path);
    // A missing store is not fatal: reads degrade to empty responses.
    if let Err(err) = store.init() {
        tracing::warn!("store init failed: {err:#}");
    }

    // Built outside the runtime: the blocking client owns a runtime of its own.
    let fetcher: Arc<dyn Fetcher> = Arc::new(HttpFetcher::new(config.http_timeout)?);
    let service = Arc::new(StatsService::new(
        store,
        RefreshGate::new(config.refresh_timeout),
        Arc::clone(&fetcher),
        Upstream::new(config.upstream.clone()),
    ));
    tracing::info!(
        db = %service.store().path().display(),
        upstream = %config.upstream,
        refresh_secs = service.gate().timeout().as_secs(),
        "starting"
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("build tokio runtime")?;
    runtime.block_on(server::serve(service, &config.bind))?;
    drop(runtime);
    drop(fetcher);
    Ok(())
}
