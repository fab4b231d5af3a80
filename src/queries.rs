//! Read side: denormalized views shaped for the JSON API.

use anyhow::{Context, Result};
use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, OptionalExtension, params, params_from_iter};
use serde::{Deserialize, Serialize};

use crate::leagues::league_meta;
use crate::player_fetch::ABILITY_LABELS;
use crate::records::{PlayerProfile, PlayerStat, RankingType};

pub const SEARCH_LIMIT: usize = 50;
pub const DEFAULT_AVATAR: &str = "https://www.dongqiudi.com/img/default_head.png";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueView {
    pub id: u32,
    pub name: String,
    pub full_name: String,
    pub cn: String,
    pub logo: String,
    pub color: String,
    pub bg: String,
    pub gradient: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamView {
    pub id: String,
    pub league_id: u32,
    pub name: String,
    pub en: String,
    pub logo: String,
    pub stats: StandingView,
    pub info: TeamInfoView,
    pub honors: Vec<HonorView>,
    pub squad: Vec<SquadView>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct StandingView {
    pub rank: Option<i64>,
    pub played: Option<i64>,
    pub won: Option<i64>,
    pub draw: Option<i64>,
    pub lost: Option<i64>,
    pub gf: Option<i64>,
    pub ga: Option<i64>,
    pub pts: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TeamInfoView {
    pub founded: String,
    pub stadium: String,
    pub city: String,
    pub country: String,
    pub capacity: String,
    pub phone: String,
    pub email: String,
    pub address: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HonorView {
    pub name: String,
    pub count: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SquadView {
    pub id: String,
    pub name: String,
    pub number: String,
    pub pos: String,
    pub avatar: String,
    /// Aggregate ability, or `"-"` when the player was never profiled.
    pub rating: serde_json::Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankingView {
    pub id: String,
    pub rank: i64,
    pub name: String,
    pub team: String,
    pub count: i64,
    pub avatar: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RadarPoint {
    pub subject: &'static str,
    #[serde(rename = "A")]
    pub a: i64,
    #[serde(rename = "fullMark")]
    pub full_mark: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerView {
    pub id: String,
    pub name_cn: String,
    pub name_en: String,
    pub club: String,
    pub number: String,
    pub pos: String,
    pub age: String,
    pub height: String,
    pub weight: String,
    pub foot: String,
    pub birth_date: String,
    pub country: String,
    pub avatar: String,
    pub ability_total: i64,
    pub radar: Vec<RadarPoint>,
    pub history: Vec<PlayerStat>,
}

/// Optional filters of the player search. Absent fields do not filter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlayerSearch {
    pub name: Option<String>,
    pub league_id: Option<u32>,
    pub team_id: Option<String>,
    pub position: Option<String>,
    pub nationality: Option<String>,
    pub foot: Option<String>,
    pub rating_min: Option<i64>,
    pub rating_max: Option<i64>,
    pub age_min: Option<i64>,
    pub age_max: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub id: String,
    pub name: String,
    pub name_en: String,
    pub club: String,
    pub team_id: Option<String>,
    pub league_id: Option<u32>,
    pub position: String,
    pub nationality: String,
    pub foot: String,
    pub age: String,
    pub rating: i64,
    pub avatar: String,
}

pub fn list_leagues(conn: &Connection) -> Result<Vec<LeagueView>> {
    let mut stmt = conn
        .prepare("SELECT id, name FROM leagues ORDER BY id")
        .context("prepare leagues query")?;
    let rows = stmt
        .query_map([], |row| Ok((row.get::<_, u32>(0)?, row.get::<_, String>(1)?)))
        .context("query leagues")?;

    let mut out = Vec::new();
    for row in rows {
        let (id, name) = row.context("decode league row")?;
        let meta = league_meta(id);
        out.push(LeagueView {
            id,
            full_name: meta.map_or_else(|| name.clone(), |m| m.full_name.to_string()),
            cn: meta.map_or_else(|| name.clone(), |m| m.cn.to_string()),
            logo: meta.map_or("/default.png", |m| m.logo).to_string(),
            color: meta.map_or("text-gray-600", |m| m.color).to_string(),
            bg: meta.map_or("bg-gray-50", |m| m.bg).to_string(),
            gradient: meta.map_or("from-gray-500 to-gray-600", |m| m.gradient).to_string(),
            name,
        });
    }
    Ok(out)
}

/// Teams of a league joined with their standing, best rank first.
pub fn league_teams(conn: &Connection, league_id: u32) -> Result<Vec<TeamView>> {
    let mut stmt = conn
        .prepare(
            r#"
            SELECT
                t.team_id, t.name_cn, t.name_en, t.logo_url,
                t.founded, t.stadium, t.city, t.country, t.capacity,
                t.phone, t.email, t.address,
                s.rank, s.matches, s.won, s.draw, s.lost,
                s.goals_pro, s.goals_against, s.points
            FROM teams t
            LEFT JOIN standings s ON s.team_id = t.team_id AND s.league_id = t.league_id
            WHERE t.league_id = ?1
            ORDER BY s.rank IS NULL, s.rank ASC, t.team_id ASC
            "#,
        )
        .context("prepare league teams query")?;
    let rows = stmt
        .query_map(params![league_id as i64], |row| {
            Ok(TeamView {
                id: row.get(0)?,
                league_id,
                name: row.get(1)?,
                en: row.get(2)?,
                logo: row.get(3)?,
                info: TeamInfoView {
                    founded: row.get(4)?,
                    stadium: row.get(5)?,
                    city: row.get(6)?,
                    country: row.get(7)?,
                    capacity: row.get(8)?,
                    phone: row.get(9)?,
                    email: row.get(10)?,
                    address: row.get(11)?,
                },
                stats: StandingView {
                    rank: row.get(12)?,
                    played: row.get(13)?,
                    won: row.get(14)?,
                    draw: row.get(15)?,
                    lost: row.get(16)?,
                    gf: row.get(17)?,
                    ga: row.get(18)?,
                    pts: row.get(19)?,
                },
                honors: Vec::new(),
                squad: Vec::new(),
            })
        })
        .context("query league teams")?;

    let mut out = Vec::new();
    for row in rows {
        let mut team = row.context("decode team row")?;
        team.honors = team_honors(conn, &team.id)?;
        out.push(team);
    }
    Ok(out)
}

pub fn team_honors(conn: &Connection, team_id: &str) -> Result<Vec<HonorView>> {
    let mut stmt = conn
        .prepare_cached("SELECT name, count FROM honors WHERE team_id = ?1 ORDER BY rowid")
        .context("prepare honors query")?;
    let rows = stmt
        .query_map(params![team_id], |row| {
            Ok(HonorView {
                name: row.get(0)?,
                count: row.get(1)?,
            })
        })
        .context("query honors")?;
    rows.collect::<rusqlite::Result<Vec<_>>>()
        .context("decode honor row")
}

pub fn squad(conn: &Connection, team_id: &str) -> Result<Vec<SquadView>> {
    let mut stmt = conn
        .prepare(
            r#"
            SELECT p.person_id, p.name, p.number, p.position, p.avatar_url, pp.ability_total
            FROM players p
            LEFT JOIN player_profiles pp ON pp.person_id = p.person_id
            WHERE p.team_id = ?1
            ORDER BY p.rowid
            "#,
        )
        .context("prepare squad query")?;
    let rows = stmt
        .query_map(params![team_id], |row| {
            let rating = match row.get::<_, Option<i64>>(5)? {
                Some(v) if v > 0 => serde_json::Value::from(v),
                _ => serde_json::Value::from("-"),
            };
            Ok(SquadView {
                id: row.get(0)?,
                name: row.get(1)?,
                number: row.get(2)?,
                pos: row.get(3)?,
                avatar: row.get(4)?,
                rating,
            })
        })
        .context("query squad")?;
    rows.collect::<rusqlite::Result<Vec<_>>>()
        .context("decode squad row")
}

pub fn rankings(conn: &Connection, league_id: u32, kind: RankingType) -> Result<Vec<RankingView>> {
    let mut stmt = conn
        .prepare(
            r#"
            SELECT r.person_id, r.rank, r.name, r.team, r.count, p.avatar_url
            FROM rankings r
            LEFT JOIN players p ON p.person_id = r.person_id
            WHERE r.league_id = ?1 AND r.type = ?2
            ORDER BY r.rank ASC, r.rowid ASC
            "#,
        )
        .context("prepare rankings query")?;
    let rows = stmt
        .query_map(params![league_id as i64, kind.as_str()], |row| {
            let avatar: Option<String> = row.get(5)?;
            Ok(RankingView {
                id: row.get(0)?,
                rank: row.get(1)?,
                name: row.get(2)?,
                team: row.get(3)?,
                count: row.get(4)?,
                avatar: avatar
                    .filter(|a| !a.is_empty())
                    .unwrap_or_else(|| DEFAULT_AVATAR.to_string()),
            })
        })
        .context("query rankings")?;
    rows.collect::<rusqlite::Result<Vec<_>>>()
        .context("decode ranking row")
}

pub fn player_profile(conn: &Connection, person_id: &str) -> Result<Option<PlayerProfile>> {
    conn.query_row(
        r#"
        SELECT person_id, name_cn, name_en, club, nationality, height, weight, age,
               birth_date, number, foot, photo_url, ability_total,
               speed, shooting, passing, dribbling, defense, power
        FROM player_profiles WHERE person_id = ?1
        "#,
        params![person_id],
        |row| {
            Ok(PlayerProfile {
                person_id: row.get(0)?,
                name_cn: row.get(1)?,
                name_en: row.get(2)?,
                club: row.get(3)?,
                nationality: row.get(4)?,
                height: row.get(5)?,
                weight: row.get(6)?,
                age: row.get(7)?,
                birth_date: row.get(8)?,
                number: row.get(9)?,
                foot: row.get(10)?,
                photo_url: row.get(11)?,
                ability_total: row.get(12)?,
                abilities: crate::records::Abilities {
                    speed: row.get(13)?,
                    shooting: row.get(14)?,
                    passing: row.get(15)?,
                    dribbling: row.get(16)?,
                    defense: row.get(17)?,
                    power: row.get(18)?,
                },
            })
        },
    )
    .optional()
    .context("query player profile")
}

pub fn player_history(conn: &Connection, person_id: &str) -> Result<Vec<PlayerStat>> {
    let mut stmt = conn
        .prepare(
            "SELECT season, club, matches, starts, goals, assists, yellow, red
             FROM player_stats WHERE person_id = ?1 ORDER BY season DESC",
        )
        .context("prepare player history query")?;
    let rows = stmt
        .query_map(params![person_id], |row| {
            Ok(PlayerStat {
                season: row.get(0)?,
                club: row.get(1)?,
                matches: row.get(2)?,
                starts: row.get(3)?,
                goals: row.get(4)?,
                assists: row.get(5)?,
                yellow: row.get(6)?,
                red: row.get(7)?,
            })
        })
        .context("query player history")?;
    rows.collect::<rusqlite::Result<Vec<_>>>()
        .context("decode player stat row")
}

/// Profile, radar and history of one player; `None` when never profiled.
pub fn player_view(conn: &Connection, person_id: &str) -> Result<Option<PlayerView>> {
    let Some(profile) = player_profile(conn, person_id)? else {
        return Ok(None);
    };
    let history = player_history(conn, person_id)?;
    let radar = ABILITY_LABELS
        .iter()
        .map(|(label, ability)| RadarPoint {
            subject: *label,
            a: profile.abilities.get(*ability),
            full_mark: 100,
        })
        .collect();
    Ok(Some(PlayerView {
        id: profile.person_id,
        name_cn: profile.name_cn,
        name_en: profile.name_en,
        club: profile.club,
        number: profile.number,
        pos: "球员".to_string(),
        age: profile.age,
        height: profile.height,
        weight: profile.weight,
        foot: profile.foot,
        birth_date: profile.birth_date,
        country: profile.nationality,
        avatar: profile.photo_url,
        ability_total: profile.ability_total,
        radar,
        history,
    }))
}

/// Profiled players matching every given filter, highest ability first.
pub fn search_players(conn: &Connection, filter: &PlayerSearch) -> Result<Vec<SearchHit>> {
    let mut sql = String::from(
        r#"
        SELECT pp.person_id, pp.name_cn, pp.name_en, pp.club, p.team_id, t.league_id,
               COALESCE(p.position, ''), pp.nationality, pp.foot, pp.age,
               pp.ability_total, COALESCE(NULLIF(pp.photo_url, ''), p.avatar_url, '')
        FROM player_profiles pp
        LEFT JOIN players p ON p.person_id = pp.person_id
        LEFT JOIN teams t ON t.team_id = p.team_id
        WHERE 1 = 1
        "#,
    );
    let mut args: Vec<SqlValue> = Vec::new();
    let mut push = |clause: &str, value: SqlValue, sql: &mut String| {
        args.push(value);
        sql.push_str(&clause.replace('?', &format!("?{}", args.len())));
    };

    if let Some(name) = non_empty(filter.name.as_deref()) {
        let like = SqlValue::Text(like_pattern(name));
        push(" AND (pp.name_cn LIKE ? ESCAPE '\\'", like.clone(), &mut sql);
        push(" OR pp.name_en LIKE ? ESCAPE '\\'", like.clone(), &mut sql);
        push(" OR p.name LIKE ? ESCAPE '\\')", like, &mut sql);
    }
    if let Some(league_id) = filter.league_id {
        push(" AND t.league_id = ?", SqlValue::Integer(league_id.into()), &mut sql);
    }
    if let Some(team_id) = non_empty(filter.team_id.as_deref()) {
        push(" AND p.team_id = ?", SqlValue::Text(team_id.to_string()), &mut sql);
    }
    if let Some(position) = non_empty(filter.position.as_deref()) {
        let like = SqlValue::Text(like_pattern(position));
        push(" AND p.position LIKE ? ESCAPE '\\'", like, &mut sql);
    }
    if let Some(nationality) = non_empty(filter.nationality.as_deref()) {
        let like = SqlValue::Text(like_pattern(nationality));
        push(" AND pp.nationality LIKE ? ESCAPE '\\'", like, &mut sql);
    }
    if let Some(foot) = non_empty(filter.foot.as_deref()) {
        push(" AND pp.foot = ?", SqlValue::Text(foot.to_string()), &mut sql);
    }
    if let Some(min) = filter.rating_min {
        push(" AND pp.ability_total >= ?", SqlValue::Integer(min), &mut sql);
    }
    if let Some(max) = filter.rating_max {
        push(" AND pp.ability_total <= ?", SqlValue::Integer(max), &mut sql);
    }
    // Stored ages look like "25岁"; CAST keeps the leading integer. Unscraped
    // ages would CAST to 0, so they never match an age bound.
    if filter.age_min.is_some() || filter.age_max.is_some() {
        sql.push_str(" AND pp.age GLOB '[0-9]*'");
    }
    if let Some(min) = filter.age_min {
        push(" AND CAST(pp.age AS INTEGER) >= ?", SqlValue::Integer(min), &mut sql);
    }
    if let Some(max) = filter.age_max {
        push(" AND CAST(pp.age AS INTEGER) <= ?", SqlValue::Integer(max), &mut sql);
    }
    sql.push_str(&format!(
        " ORDER BY pp.ability_total DESC, pp.person_id ASC LIMIT {SEARCH_LIMIT}"
    ));

    let mut stmt = conn.prepare(&sql).context("prepare player search")?;
    let rows = stmt
        .query_map(params_from_iter(args.iter()), |row| {
            Ok(SearchHit {
                id: row.get(0)?,
                name: row.get(1)?,
                name_en: row.get(2)?,
                club: row.get(3)?,
                team_id: row.get(4)?,
                league_id: row.get(5)?,
                position: row.get(6)?,
                nationality: row.get(7)?,
                foot: row.get(8)?,
                age: row.get(9)?,
                rating: row.get(10)?,
                avatar: row.get(11)?,
            })
        })
        .context("query player search")?;
    rows.collect::<rusqlite::Result<Vec<_>>>()
        .context("decode search row")
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn like_pattern(raw: &str) -> String {
    let escaped = raw
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}
