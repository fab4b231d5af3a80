use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use tracing_subscriber::EnvFilter;

use football_data::config::{Config, parse_db_path_arg};
use football_data::http_client::{HttpFetcher, Upstream};
use football_data::refresh_gate::RefreshGate;
use football_data::resource::{ResourceKey, is_upstream_id};
use football_data::service::StatsService;
use football_data::store::Store;

fn main() -> Result<()> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let key = parse_key(&args)?;
    let config = Config::from_env().with_db_override(parse_db_path_arg(&args));

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("football_data=info")),
        )
        .init();

    let store = Store::new(&config.db_path);
    store.init()?;
    let service = StatsService::new(
        store,
        RefreshGate::new(config.refresh_timeout),
        Arc::new(HttpFetcher::new(config.http_timeout)?),
        Upstream::new(config.upstream.clone()),
    );

    println!("Refreshing {key}");
    println!("DB: {}", config.db_path.display());
    match service.refresh(&key) {
        Ok(report) => {
            println!("Applied: {}", report.applied.join(", "));
            if !report.skipped.is_empty() {
                println!("Skipped: {}", report.skipped.join(", "));
            }
            println!("Rows written: {}", report.rows_written);
            Ok(())
        }
        Err(err) => Err(anyhow!("{} refresh failed: {err}", err.kind())),
    }
}

fn parse_key(args: &[String]) -> Result<ResourceKey> {
    let mut positional = args.iter().enumerate().filter_map(|(idx, arg)| {
        let after_db_flag = idx > 0 && args[idx - 1] == "--db";
        (!arg.starts_with("--") && !after_db_flag).then_some(arg.as_str())
    });
    let usage = "usage: refresh <league|team|player> <id> [--db <path>]";
    let kind = positional.next().context(usage)?;
    let id = positional.next().context(usage)?.trim();
    if kind != "league" && !is_upstream_id(id) {
        return Err(anyhow!("invalid {kind} id {id}"));
    }
    match kind {
        "league" => Ok(ResourceKey::League(
            id.parse().with_context(|| format!("invalid league id {id}"))?,
        )),
        "team" => Ok(ResourceKey::Team(id.to_string())),
        "player" => Ok(ResourceKey::Player(id.to_string())),
        other => Err(anyhow!("unknown resource kind {other}; {usage}")),
    }
}
