use anyhow::{Context, Result, anyhow};
use rayon::prelude::*;
use serde_json::Value;
use tracing::{info, warn};

use crate::http_client::{Fetcher, Upstream};
use crate::leagues::league_name;
use crate::records::{Ranking, RankingType, Standing};
use crate::refresh::{RefreshError, RefreshReport, RefreshResult};
use crate::store::{self, Store};

const COMMON_PARAMS: [(&str, &str); 3] = [("app", "dqd"), ("version", "0"), ("platform", "web")];

/// Refreshes standings and both person rankings of one league.
///
/// Each of the three sub-updates stands alone: a missing or malformed payload
/// leaves that table untouched while the others are still written.
pub fn refresh_league(
    fetcher: &dyn Fetcher,
    store: &Store,
    upstream: &Upstream,
    league_id: u32,
) -> RefreshResult {
    info!(league_id, league = league_name(league_id), "refreshing league tables");
    let season = league_id.to_string();
    let standings_url = upstream.standings_url();
    let ranking_url = upstream.person_ranking_url();

    let (standings_raw, rankings_raw) = rayon::join(
        || {
            let mut params = vec![("season_id", season.as_str())];
            params.extend(COMMON_PARAMS);
            fetcher.fetch(&standings_url, &params)
        },
        || {
            RankingType::ALL
                .par_iter()
                .map(|kind| {
                    let mut params = vec![("season_id", season.as_str()), ("type", kind.as_str())];
                    params.extend(COMMON_PARAMS);
                    (*kind, fetcher.fetch(&ranking_url, &params))
                })
                .collect::<Vec<_>>()
        },
    );

    let mut first_error: Option<RefreshError> = None;

    let standings = match standings_raw {
        None => {
            note(&mut first_error, league_id, RefreshError::fetch(&standings_url));
            None
        }
        Some(raw) => match parse_standings_json(&raw, league_id) {
            Ok(rows) => Some(rows),
            Err(err) => {
                let err = RefreshError::parse(format!("standings: {err:#}"));
                note(&mut first_error, league_id, err);
                None
            }
        },
    };

    let mut rankings = Vec::new();
    for (kind, raw) in rankings_raw {
        match raw {
            None => {
                let url = format!("{ranking_url}?type={}", kind.as_str());
                note(&mut first_error, league_id, RefreshError::fetch(url));
            }
            Some(raw) => match parse_rankings_json(&raw) {
                Ok(rows) => rankings.push((kind, rows)),
                Err(err) => {
                    let err = RefreshError::parse(format!("{} ranking: {err:#}", kind.as_str()));
                    note(&mut first_error, league_id, err);
                }
            },
        }
    }

    let mut report = RefreshReport::default();
    if standings.is_none() && rankings.is_empty() {
        return Err(first_error.unwrap_or_else(|| RefreshError::parse("no league payloads")));
    }

    let mut conn = store.open()?;
    match standings {
        Some(rows) => match store::upsert_standings(&mut conn, league_id, &rows) {
            Ok(n) => report.apply("standings", n),
            Err(err) => {
                note(&mut first_error, league_id, RefreshError::Persist(err));
                report.skip("standings");
            }
        },
        None => report.skip("standings"),
    }
    for kind in RankingType::ALL {
        let part = ranking_part(kind);
        let Some((_, rows)) = rankings.iter().find(|(k, _)| *k == kind) else {
            report.skip(part);
            continue;
        };
        match store::replace_rankings(&mut conn, league_id, kind, rows) {
            Ok(n) => report.apply(part, n),
            Err(err) => {
                note(&mut first_error, league_id, RefreshError::Persist(err));
                report.skip(part);
            }
        }
    }

    if report.applied.is_empty() {
        return Err(first_error.unwrap_or_else(|| RefreshError::parse("nothing written")));
    }
    Ok(report)
}

fn note(slot: &mut Option<RefreshError>, league_id: u32, err: RefreshError) {
    warn!(league_id, kind = err.kind(), "league sub-update skipped: {err}");
    if slot.as_ref().is_none_or(|prev| rank_error(&err) > rank_error(prev)) {
        *slot = Some(err);
    }
}

fn ranking_part(kind: RankingType) -> &'static str {
    match kind {
        RankingType::Goals => "goals_ranking",
        RankingType::Assists => "assists_ranking",
    }
}

// Persist beats parse beats fetch when picking the error to report.
fn rank_error(err: &RefreshError) -> u8 {
    match err {
        RefreshError::Fetch { .. } => 0,
        RefreshError::Parse { .. } => 1,
        RefreshError::Persist(_) => 2,
    }
}

pub fn parse_standings_json(raw: &str, league_id: u32) -> Result<Vec<Standing>> {
    let value: Value = serde_json::from_str(raw.trim()).context("invalid standings json")?;
    let items = value
        .pointer("/content/rounds/0/content/data")
        .and_then(Value::as_array)
        .ok_or_else(|| anyhow!("missing content.rounds[0].content.data"))?;

    // One bad row rejects the payload so a partial table never replaces a whole one.
    items
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            parse_standing(item, league_id).ok_or_else(|| anyhow!("malformed standing row {idx}"))
        })
        .collect()
}

fn parse_standing(v: &Value, league_id: u32) -> Option<Standing> {
    Some(Standing {
        league_id,
        team_id: as_id_string(v.get("team_id")?)?,
        team_name: v.get("team_name").and_then(as_text),
        team_logo: v.get("team_logo").and_then(as_text),
        rank: as_i64_any(v.get("rank")?)?,
        played: as_i64_any(v.get("matches_total")?)?,
        won: as_i64_any(v.get("matches_won")?)?,
        draw: as_i64_any(v.get("matches_draw")?)?,
        lost: as_i64_any(v.get("matches_lost")?)?,
        goals_for: as_i64_any(v.get("goals_pro")?)?,
        goals_against: as_i64_any(v.get("goals_against")?)?,
        points: as_i64_any(v.get("points")?)?,
    })
}

pub fn parse_rankings_json(raw: &str) -> Result<Vec<Ranking>> {
    let value: Value = serde_json::from_str(raw.trim()).context("invalid ranking json")?;
    let items = value
        .pointer("/content/data")
        .and_then(Value::as_array)
        .ok_or_else(|| anyhow!("missing content.data"))?;

    items
        .iter()
        .enumerate()
        .map(|(idx, item)| parse_ranking(item).ok_or_else(|| anyhow!("malformed ranking row {idx}")))
        .collect()
}

fn parse_ranking(v: &Value) -> Option<Ranking> {
    let count = v
        .get("goal")
        .and_then(as_i64_any)
        .or_else(|| v.get("count").and_then(as_i64_any))?;
    Some(Ranking {
        rank: as_i64_any(v.get("rank")?)?,
        person_id: as_id_string(v.get("person_id")?)?,
        name: v.get("person_name").and_then(as_text).unwrap_or_default(),
        team: v.get("team_name").and_then(as_text).unwrap_or_default(),
        count,
    })
}

fn as_i64_any(v: &Value) -> Option<i64> {
    if let Some(n) = v.as_i64() {
        return Some(n);
    }
    v.as_str()?.trim().parse::<i64>().ok()
}

fn as_id_string(v: &Value) -> Option<String> {
    match v {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

fn as_text(v: &Value) -> Option<String> {
    v.as_str().map(|s| s.trim().to_string())
}
