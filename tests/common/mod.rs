#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tempfile::TempDir;

use football_data::http_client::{Fetcher, Upstream};
use football_data::refresh_gate::RefreshGate;
use football_data::service::StatsService;
use football_data::store::Store;

pub const BASE: &str = "http://upstream.test";

pub fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

/// Serves canned bodies keyed by URL (plus `?type=` for ranking requests) and
/// counts every fetch attempt.
#[derive(Default)]
pub struct StubFetcher {
    pages: Mutex<HashMap<String, String>>,
    calls: AtomicUsize,
}

impl StubFetcher {
    pub fn serve(&self, key: impl Into<String>, body: impl Into<String>) {
        self.pages.lock().unwrap().insert(key.into(), body.into());
    }

    pub fn forget(&self, key: &str) {
        self.pages.lock().unwrap().remove(key);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Fetcher for StubFetcher {
    fn fetch(&self, url: &str, params: &[(&str, &str)]) -> Option<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let key = match params.iter().find(|(k, _)| *k == "type") {
            Some((_, kind)) => format!("{url}?type={kind}"),
            None => url.to_string(),
        };
        self.pages.lock().unwrap().get(&key).cloned()
    }
}

pub fn upstream() -> Upstream {
    Upstream::new(BASE)
}

pub fn team_key(team_id: &str) -> String {
    upstream().team_url(team_id)
}

pub fn player_key(person_id: &str) -> String {
    upstream().player_url(person_id)
}

pub fn standings_key() -> String {
    upstream().standings_url()
}

pub fn ranking_key(kind: &str) -> String {
    format!("{}?type={kind}", upstream().person_ranking_url())
}

pub struct Harness {
    pub dir: TempDir,
    pub fetcher: Arc<StubFetcher>,
    pub service: Arc<StatsService>,
}

pub fn harness() -> Harness {
    let dir = tempfile::tempdir().expect("temp dir");
    let store = Store::new(dir.path().join("football.db"));
    store.init().expect("init store");
    let fetcher = Arc::new(StubFetcher::default());
    let service = Arc::new(StatsService::new(
        store,
        RefreshGate::default(),
        fetcher.clone(),
        upstream(),
    ));
    Harness {
        dir,
        fetcher,
        service,
    }
}

pub fn serve_league_fixtures(fetcher: &StubFetcher) {
    fetcher.serve(standings_key(), read_fixture("standings.json"));
    fetcher.serve(ranking_key("goals"), read_fixture("goals_ranking.json"));
    fetcher.serve(ranking_key("assists"), read_fixture("assists_ranking.json"));
}
