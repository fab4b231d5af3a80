use rusqlite::Connection;

use football_data::queries::{PlayerSearch, SEARCH_LIMIT, search_players};
use football_data::records::{PlayerProfile, RosterEntry, TeamProfile};
use football_data::store::{self, init_schema};

fn profile(id: usize, rating: i64, age: &str, foot: &str) -> PlayerProfile {
    PlayerProfile {
        person_id: format!("p{id:03}"),
        name_cn: format!("球员{id}"),
        name_en: format!("Player {id}"),
        nationality: if id % 2 == 0 { "英格兰" } else { "西班牙" }.to_string(),
        age: age.to_string(),
        foot: foot.to_string(),
        ability_total: rating,
        ..PlayerProfile::default()
    }
}

fn roster_entry(id: usize, position: &str) -> RosterEntry {
    RosterEntry {
        person_id: format!("p{id:03}"),
        name: format!("球员{id}"),
        position: position.to_string(),
        ..RosterEntry::default()
    }
}

/// Sixty profiled players across two teams in two leagues: ids below 40 are
/// forwards of team t1 (league 24646), the rest midfielders of t2 (24651).
fn seeded() -> Connection {
    let mut conn = Connection::open_in_memory().expect("in-memory db");
    init_schema(&conn).expect("schema");
    for (team_id, league_id) in [("t1", 24646), ("t2", 24651)] {
        let team = TeamProfile {
            team_id: team_id.to_string(),
            ..TeamProfile::default()
        };
        store::upsert_team(&conn, league_id, &team).expect("team");
    }

    let mut t1 = Vec::new();
    let mut t2 = Vec::new();
    for id in 0..60 {
        let age = format!("{}岁", 18 + id % 20);
        let foot = if id % 3 == 0 { "左脚" } else { "右脚" };
        store::upsert_player_profile(&conn, &profile(id, 40 + id as i64, &age, foot))
            .expect("profile");
        if id < 40 {
            t1.push(roster_entry(id, "FW"));
        } else {
            t2.push(roster_entry(id, "MF"));
        }
    }
    store::replace_roster(&mut conn, "t1", &t1).expect("t1 roster");
    store::replace_roster(&mut conn, "t2", &t2).expect("t2 roster");
    conn
}

fn assert_descending(ratings: &[i64]) {
    assert!(ratings.windows(2).all(|w| w[0] >= w[1]), "{ratings:?}");
}

#[test]
fn rating_and_position_filters_combine() {
    let conn = seeded();
    let filter = PlayerSearch {
        rating_min: Some(70),
        position: Some("FW".to_string()),
        ..PlayerSearch::default()
    };
    let hits = search_players(&conn, &filter).expect("search");
    let ratings: Vec<i64> = hits.iter().map(|h| h.rating).collect();

    // Forwards are ids 0..40, rated 40..80; 70 and up leaves ten.
    assert_eq!(hits.len(), 10);
    assert!(hits.iter().all(|h| h.rating >= 70 && h.position.contains("FW")));
    assert_descending(&ratings);
    assert_eq!(hits[0].id, "p039");
}

#[test]
fn unfiltered_search_is_capped_and_sorted() {
    let conn = seeded();
    let hits = search_players(&conn, &PlayerSearch::default()).expect("search");
    assert_eq!(hits.len(), SEARCH_LIMIT);
    let ratings: Vec<i64> = hits.iter().map(|h| h.rating).collect();
    assert_descending(&ratings);
    assert_eq!(hits[0].rating, 99);
}

#[test]
fn league_and_rating_ceiling_filter() {
    let conn = seeded();
    let filter = PlayerSearch {
        league_id: Some(24651),
        rating_max: Some(84),
        ..PlayerSearch::default()
    };
    let hits = search_players(&conn, &filter).expect("search");
    // Midfielders are rated 80..100.
    assert_eq!(hits.len(), 5);
    assert!(hits.iter().all(|h| h.league_id == Some(24651) && h.rating <= 84));
    assert!(hits.iter().all(|h| h.team_id.as_deref() == Some("t2")));
}

#[test]
fn age_filter_reads_leading_integer() {
    let conn = seeded();
    let filter = PlayerSearch {
        age_min: Some(35),
        age_max: Some(36),
        ..PlayerSearch::default()
    };
    let hits = search_players(&conn, &filter).expect("search");
    assert!(!hits.is_empty());
    for hit in &hits {
        let age: i64 = hit.age.trim_end_matches('岁').parse().expect("numeric age");
        assert!((35..=36).contains(&age), "{}", hit.age);
    }
}

#[test]
fn unknown_age_never_matches_age_bounds() {
    let conn = seeded();
    for (id, age) in [(900, ""), (901, "未知")] {
        store::upsert_player_profile(&conn, &profile(id, 99, age, "右脚")).expect("profile");
    }
    let filter = PlayerSearch {
        age_max: Some(21),
        ..PlayerSearch::default()
    };
    let hits = search_players(&conn, &filter).expect("search");
    assert!(!hits.is_empty());
    assert!(hits.iter().all(|h| h.id != "p900" && h.id != "p901"), "{hits:?}");

    // Without an age bound they are still searchable.
    let all = search_players(&conn, &PlayerSearch::default()).expect("search");
    assert!(all.iter().any(|h| h.id == "p900"));
}

#[test]
fn name_nationality_and_foot_filters() {
    let conn = seeded();
    let by_name = PlayerSearch {
        name: Some("Player 5".to_string()),
        ..PlayerSearch::default()
    };
    let ids: Vec<String> = search_players(&conn, &by_name)
        .expect("search")
        .into_iter()
        .map(|h| h.id)
        .collect();
    // "Player 5" and "Player 50".."Player 59", best rated first.
    assert_eq!(ids.len(), 11);
    assert_eq!(ids.first().map(String::as_str), Some("p059"));
    assert_eq!(ids.last().map(String::as_str), Some("p005"));

    let lefties = PlayerSearch {
        nationality: Some("英格兰".to_string()),
        foot: Some("左脚".to_string()),
        ..PlayerSearch::default()
    };
    let hits = search_players(&conn, &lefties).expect("search");
    // Even ids divisible by three.
    assert_eq!(hits.len(), 10);
    assert!(hits.iter().all(|h| h.nationality == "英格兰" && h.foot == "左脚"));
}

#[test]
fn wildcards_in_filters_match_literally() {
    let conn = seeded();
    let filter = PlayerSearch {
        name: Some("%".to_string()),
        ..PlayerSearch::default()
    };
    assert!(search_players(&conn, &filter).expect("search").is_empty());
}
