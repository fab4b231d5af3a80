use criterion::{Criterion, criterion_group, criterion_main};
use rusqlite::Connection;
use std::hint::black_box;

use football_data::league_fetch::{parse_rankings_json, parse_standings_json};
use football_data::player_fetch::parse_player_html;
use football_data::queries::{PlayerSearch, search_players};
use football_data::records::{PlayerProfile, RosterEntry};
use football_data::store::{self, init_schema};
use football_data::team_fetch::parse_team_html;

fn bench_team_page_parse(c: &mut Criterion) {
    c.bench_function("team_page_parse", |b| {
        b.iter(|| {
            let page = parse_team_html(black_box(TEAM_HTML), "50000513").unwrap();
            black_box(page.roster.map(|r| r.entries.len()));
        })
    });
}

fn bench_player_page_parse(c: &mut Criterion) {
    c.bench_function("player_page_parse", |b| {
        b.iter(|| {
            let page = parse_player_html(black_box(PLAYER_HTML), "50108431").unwrap();
            black_box(page.profile.ability_total);
        })
    });
}

fn bench_league_json_parse(c: &mut Criterion) {
    c.bench_function("standings_parse", |b| {
        b.iter(|| {
            let rows = parse_standings_json(black_box(STANDINGS_JSON), 24646).unwrap();
            black_box(rows.len());
        })
    });
    c.bench_function("rankings_parse", |b| {
        b.iter(|| {
            let rows = parse_rankings_json(black_box(GOALS_JSON)).unwrap();
            black_box(rows.len());
        })
    });
}

fn bench_player_search(c: &mut Criterion) {
    let mut conn = Connection::open_in_memory().unwrap();
    init_schema(&conn).unwrap();
    let roster: Vec<RosterEntry> = (0..500)
        .map(|idx| RosterEntry {
            person_id: idx.to_string(),
            name: format!("球员{idx}"),
            position: if idx % 4 == 0 { "FW" } else { "MF" }.to_string(),
            ..RosterEntry::default()
        })
        .collect();
    for entry in &roster {
        let profile = PlayerProfile {
            person_id: entry.person_id.clone(),
            name_cn: entry.name.clone(),
            age: format!("{}岁", 18 + entry.person_id.len()),
            ability_total: (entry.person_id.parse::<i64>().unwrap() * 7) % 100,
            ..PlayerProfile::default()
        };
        store::upsert_player_profile(&conn, &profile).unwrap();
    }
    store::replace_roster(&mut conn, "t1", &roster).unwrap();

    let filter = PlayerSearch {
        position: Some("FW".to_string()),
        rating_min: Some(60),
        ..PlayerSearch::default()
    };
    c.bench_function("player_search", |b| {
        b.iter(|| {
            let hits = search_players(&conn, black_box(&filter)).unwrap();
            black_box(hits.len());
        })
    });
}

criterion_group!(
    perf,
    bench_team_page_parse,
    bench_player_page_parse,
    bench_league_json_parse,
    bench_player_search
);
criterion_main!(perf);

static TEAM_HTML: &str = include_str!("../tests/fixtures/team_page.html");
static PLAYER_HTML: &str = include_str!("../tests/fixtures/player_page.html");
static STANDINGS_JSON: &str = include_str!("../tests/fixtures/standings.json");
static GOALS_JSON: &str = include_str!("../tests/fixtures/goals_ranking.json");
