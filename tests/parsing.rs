use std::fs;
use std::path::PathBuf;

use football_data::league_fetch::{parse_rankings_json, parse_standings_json};
use football_data::player_fetch::parse_player_html;
use football_data::team_fetch::{RosterAlignment, parse_team_html};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn parses_standings_fixture() {
    let raw = read_fixture("standings.json");
    let rows = parse_standings_json(&raw, 24646).expect("fixture should parse");
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].team_id, "50000513");
    assert_eq!(rows[0].points, 23);
    assert_eq!(rows[1].team_id, "50001042");
    assert_eq!(rows[1].rank, 2);
    assert_eq!(rows[1].goals_for, 22);
    assert!(rows.iter().all(|r| r.league_id == 24646));
    assert_eq!(rows[2].team_logo, None);
}

#[test]
fn parses_ranking_fixtures() {
    let goals = parse_rankings_json(&read_fixture("goals_ranking.json")).expect("goals should parse");
    assert_eq!(goals.len(), 3);
    assert_eq!(goals[0].person_id, "50046387");
    assert_eq!(goals[0].count, 11);
    assert_eq!(goals[1].count, 8);

    let assists =
        parse_rankings_json(&read_fixture("assists_ranking.json")).expect("assists should parse");
    assert_eq!(assists.len(), 2);
    assert_eq!(assists[0].name, "萨卡");
    assert_eq!(assists[0].count, 6);
}

#[test]
fn parses_team_page_fixture() {
    let raw = read_fixture("team_page.html");
    let page = parse_team_html(&raw, "50000513").expect("fixture should parse");

    let p = &page.profile;
    assert_eq!(p.team_id, "50000513");
    assert_eq!(p.name_cn, "阿森纳");
    assert_eq!(p.name_en, "Arsenal");
    assert_eq!(p.founded, "1886");
    assert_eq!(p.country, "英格兰");
    assert_eq!(p.city, "伦敦");
    assert_eq!(p.stadium, "酋长球场");
    assert_eq!(p.capacity, "60704");
    assert_eq!(p.email, "info@arsenal.test");
    assert_eq!(p.address, "Highbury House, London");
    assert_eq!(p.logo_url, "https://img.test/arsenal_big.png");

    let honors = page.honors.expect("honors block present");
    assert_eq!(honors.len(), 3);
    assert_eq!(honors[0].name, "英格兰顶级联赛冠军");
    assert_eq!(honors[0].count, "13");
    assert_eq!(honors[0].seasons, "1930/1931 1932/1933");
    assert_eq!(honors[2].count, "1");
}

#[test]
fn team_roster_pairs_ids_in_order_and_truncates() {
    let raw = read_fixture("team_page.html");
    let roster = parse_team_html(&raw, "50000513")
        .expect("fixture should parse")
        .roster
        .expect("squad block present");

    // Three id tokens against four rows: the last row has no id to pair with.
    assert_eq!(roster.alignment, RosterAlignment::MissingIds { dropped: 1 });
    let pairs: Vec<_> = roster
        .entries
        .iter()
        .map(|e| (e.person_id.as_str(), e.name.as_str()))
        .collect();
    assert_eq!(
        pairs,
        vec![("50077436", "拉亚"), ("50096470", "加布里埃尔"), ("50108431", "萨卡")]
    );
    let saka = &roster.entries[2];
    assert_eq!(saka.number, "7");
    assert_eq!(saka.position, "前锋");
    assert_eq!(saka.avatar_url, "https://img.test/saka.png");
    assert_eq!(saka.nationality_icon_url, "https://img.test/flag_en.png");
}

#[test]
fn team_page_without_profile_block_is_rejected() {
    let raw = "<html><body><div class=\"team-player-data\"></div></body></html>";
    assert!(parse_team_html(raw, "1").is_err());
}

#[test]
fn team_page_without_optional_blocks() {
    let raw = r#"<html><body><div class="info-con"><p class="team-name">X</p></div></body></html>"#;
    let page = parse_team_html(raw, "1").expect("profile block present");
    assert_eq!(page.profile.name_cn, "X");
    assert!(page.honors.is_none());
    assert!(page.roster.is_none());
}

#[test]
fn parses_player_page_fixture() {
    let raw = read_fixture("player_page.html");
    let page = parse_player_html(&raw, "50108431").expect("fixture should parse");

    let p = &page.profile;
    assert_eq!(p.person_id, "50108431");
    assert_eq!(p.name_cn, "布卡约·萨卡");
    assert_eq!(p.name_en, "Bukayo Saka");
    assert_eq!(p.club, "阿森纳");
    assert_eq!(p.nationality, "英格兰");
    assert_eq!(p.height, "178CM");
    assert_eq!(p.weight, "72KG");
    assert_eq!(p.age, "23岁");
    assert_eq!(p.number, "7号");
    assert_eq!(p.birth_date, "2001-09-05");
    assert_eq!(p.foot, "左脚");
    assert_eq!(p.photo_url, "https://img.test/saka_big.png");
    assert_eq!(p.ability_total, 86);
    assert_eq!(p.abilities.speed, 87);
    assert_eq!(p.abilities.dribbling, 88);
    assert_eq!(p.abilities.defense, 55);
    assert_eq!(p.abilities.power, 68);
}

#[test]
fn player_stats_skip_short_and_non_numeric_rows() {
    let raw = read_fixture("player_page.html");
    let stats = parse_player_html(&raw, "50108431")
        .expect("fixture should parse")
        .stats
        .expect("season table present");
    assert_eq!(stats.len(), 2);
    assert_eq!(stats[0].season, "2023/2024");
    assert_eq!(stats[0].matches, 35);
    assert_eq!(stats[0].goals, 16);
    assert_eq!(stats[0].assists, 9);
    assert_eq!(stats[1].assists, 11);
    assert_eq!(stats[1].yellow, 6);
}

#[test]
fn player_page_without_bio_is_rejected() {
    assert!(parse_player_html("<html><body><p>404</p></body></html>", "1").is_err());
}
