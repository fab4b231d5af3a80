use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use rusqlite::Connection;
use tracing::{debug, info, warn};

use crate::http_client::{Fetcher, Upstream};
use crate::league_fetch::refresh_league;
use crate::player_fetch::refresh_player;
use crate::queries::{
    self, LeagueView, PlayerSearch, PlayerView, RankingView, SearchHit, SquadView, TeamView,
};
use crate::records::RankingType;
use crate::refresh::RefreshResult;
use crate::refresh_gate::RefreshGate;
use crate::resource::{ResourceKey, is_upstream_id};
use crate::store::Store;
use crate::team_fetch::refresh_team;

#[derive(Debug)]
pub enum PlayerLookup {
    Found(Box<PlayerView>),
    NotFound,
    StoreUnavailable,
}

/// Refresh-on-read orchestration behind every endpoint.
///
/// Reads never fail because of a refresh: a stale resource is refreshed
/// synchronously, failures are logged, and the read then serves whatever the
/// store holds.
pub struct StatsService {
    store: Store,
    gate: RefreshGate,
    fetcher: Arc<dyn Fetcher>,
    upstream: Upstream,
}

impl StatsService {
    pub fn new(store: Store, gate: RefreshGate, fetcher: Arc<dyn Fetcher>, upstream: Upstream) -> Self {
        Self {
            store,
            gate,
            fetcher,
            upstream,
        }
    }

    pub fn gate(&self) -> &RefreshGate {
        &self.gate
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Refreshes `key` when stale. Returns `None` on a cache hit, otherwise the
    /// outcome of the refresh. Only a successful refresh advances the gate.
    pub fn ensure_fresh(&self, key: &ResourceKey) -> Option<RefreshResult> {
        let now = Instant::now();
        if !self.gate.should_refresh_at(key, now) {
            debug!(%key, "refresh gate hit, serving stored data");
            return None;
        }
        info!(%key, "resource stale, refreshing");
        let result = self.refresh(key);
        match &result {
            Ok(report) => {
                self.gate.record_success(key, now);
                info!(%key, applied = ?report.applied, skipped = ?report.skipped, rows = report.rows_written, "refresh succeeded");
            }
            Err(err) => warn!(%key, kind = err.kind(), "refresh failed: {err}"),
        }
        Some(result)
    }

    /// Runs the scrape pipeline for `key` regardless of the gate.
    pub fn refresh(&self, key: &ResourceKey) -> RefreshResult {
        let fetcher = self.fetcher.as_ref();
        match key {
            ResourceKey::League(id) => refresh_league(fetcher, &self.store, &self.upstream, *id),
            ResourceKey::Team(id) => refresh_team(fetcher, &self.store, &self.upstream, id),
            ResourceKey::Player(id) => refresh_player(fetcher, &self.store, &self.upstream, id),
        }
    }

    pub fn leagues(&self) -> Vec<LeagueView> {
        self.read("leagues", queries::list_leagues)
    }

    pub fn league_teams(&self, league_id: u32) -> Vec<TeamView> {
        self.ensure_fresh(&ResourceKey::League(league_id));
        self.read("league teams", |conn| queries::league_teams(conn, league_id))
    }

    pub fn squad(&self, team_id: &str) -> Vec<SquadView> {
        if !is_upstream_id(team_id) {
            debug!(team_id, "rejecting non-numeric team id");
            return Vec::new();
        }
        self.ensure_fresh(&ResourceKey::Team(team_id.to_string()));
        self.read("squad", |conn| queries::squad(conn, team_id))
    }

    pub fn rankings(&self, league_id: u32, kind: &str) -> Vec<RankingView> {
        let Some(kind) = RankingType::parse(kind) else {
            return Vec::new();
        };
        self.read("rankings", |conn| queries::rankings(conn, league_id, kind))
    }

    pub fn player(&self, person_id: &str) -> PlayerLookup {
        if !is_upstream_id(person_id) {
            debug!(person_id, "rejecting non-numeric person id");
            return PlayerLookup::NotFound;
        }
        self.ensure_fresh(&ResourceKey::Player(person_id.to_string()));
        let view = self
            .store
            .open()
            .and_then(|conn| queries::player_view(&conn, person_id));
        match view {
            Ok(Some(view)) => PlayerLookup::Found(Box::new(view)),
            Ok(None) => PlayerLookup::NotFound,
            Err(err) => {
                warn!(person_id, "player read failed: {err:#}");
                PlayerLookup::StoreUnavailable
            }
        }
    }

    pub fn search_players(&self, filter: &PlayerSearch) -> Vec<SearchHit> {
        self.read("player search", |conn| queries::search_players(conn, filter))
    }

    /// Store-unreachable and query failures degrade to an empty collection.
    fn read<T: Default>(&self, what: &str, query: impl FnOnce(&Connection) -> Result<T>) -> T {
        match self.store.open().and_then(|conn| query(&conn)) {
            Ok(rows) => rows,
            Err(err) => {
                warn!(what, "store read failed: {err:#}");
                T::default()
            }
        }
    }
}
