//! SQLite schema and the write side of the store.
//!
//! Entities with a natural key are upserted; entity sets owned by one key
//! (rankings of a type, honors, roster, stat history) are deleted and
//! re-inserted inside a single transaction so readers never see an empty set.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, Transaction, params};

use crate::leagues::LEAGUE_NAMES;
use crate::records::{
    Honor, PlayerProfile, PlayerStat, Ranking, RankingType, RosterEntry, Standing, TeamProfile,
};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates the database file and schema if needed.
    pub fn init(&self) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create db dir {}", parent.display()))?;
        }
        let conn = self.open()?;
        init_schema(&conn)
    }

    pub fn open(&self) -> Result<Connection> {
        let conn = Connection::open(&self.path)
            .with_context(|| format!("open sqlite db {}", self.path.display()))?;
        conn.busy_timeout(BUSY_TIMEOUT)
            .context("set sqlite busy timeout")?;
        Ok(conn)
    }
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        CREATE TABLE IF NOT EXISTS leagues (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS teams (
            team_id TEXT PRIMARY KEY,
            league_id INTEGER NOT NULL DEFAULT 0,
            name_cn TEXT NOT NULL DEFAULT '',
            name_en TEXT NOT NULL DEFAULT '',
            founded TEXT NOT NULL DEFAULT '',
            country TEXT NOT NULL DEFAULT '',
            city TEXT NOT NULL DEFAULT '',
            stadium TEXT NOT NULL DEFAULT '',
            capacity TEXT NOT NULL DEFAULT '',
            phone TEXT NOT NULL DEFAULT '',
            email TEXT NOT NULL DEFAULT '',
            address TEXT NOT NULL DEFAULT '',
            logo_url TEXT NOT NULL DEFAULT '',
            updated_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_teams_league ON teams(league_id);

        CREATE TABLE IF NOT EXISTS standings (
            league_id INTEGER NOT NULL,
            team_id TEXT NOT NULL,
            rank INTEGER NOT NULL,
            matches INTEGER NOT NULL,
            won INTEGER NOT NULL,
            draw INTEGER NOT NULL,
            lost INTEGER NOT NULL,
            goals_pro INTEGER NOT NULL,
            goals_against INTEGER NOT NULL,
            points INTEGER NOT NULL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (league_id, team_id)
        );

        CREATE TABLE IF NOT EXISTS rankings (
            league_id INTEGER NOT NULL,
            type TEXT NOT NULL,
            rank INTEGER NOT NULL,
            person_id TEXT NOT NULL,
            name TEXT NOT NULL,
            team TEXT NOT NULL,
            count INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_rankings_league_type ON rankings(league_id, type);

        CREATE TABLE IF NOT EXISTS honors (
            team_id TEXT NOT NULL,
            name TEXT NOT NULL,
            count TEXT NOT NULL,
            seasons TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_honors_team ON honors(team_id);

        CREATE TABLE IF NOT EXISTS players (
            person_id TEXT PRIMARY KEY,
            team_id TEXT NOT NULL,
            name TEXT NOT NULL,
            number TEXT NOT NULL,
            position TEXT NOT NULL,
            avatar_url TEXT NOT NULL,
            nationality_url TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_players_team ON players(team_id);

        CREATE TABLE IF NOT EXISTS player_profiles (
            person_id TEXT PRIMARY KEY,
            name_cn TEXT NOT NULL,
            name_en TEXT NOT NULL,
            club TEXT NOT NULL,
            nationality TEXT NOT NULL,
            height TEXT NOT NULL,
            weight TEXT NOT NULL,
            age TEXT NOT NULL,
            birth_date TEXT NOT NULL,
            number TEXT NOT NULL,
            foot TEXT NOT NULL,
            photo_url TEXT NOT NULL,
            ability_total INTEGER NOT NULL,
            speed INTEGER NOT NULL,
            shooting INTEGER NOT NULL,
            passing INTEGER NOT NULL,
            dribbling INTEGER NOT NULL,
            defense INTEGER NOT NULL,
            power INTEGER NOT NULL,
            updated_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_profiles_ability ON player_profiles(ability_total);

        CREATE TABLE IF NOT EXISTS player_stats (
            person_id TEXT NOT NULL,
            season TEXT NOT NULL,
            club TEXT NOT NULL,
            matches INTEGER NOT NULL,
            starts INTEGER NOT NULL,
            goals INTEGER NOT NULL,
            assists INTEGER NOT NULL,
            yellow INTEGER NOT NULL,
            red INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_player_stats_person ON player_stats(person_id);
        "#,
    )
    .context("create sqlite schema")?;

    for (id, name) in LEAGUE_NAMES {
        conn.execute(
            "INSERT OR IGNORE INTO leagues (id, name) VALUES (?1, ?2)",
            params![*id as i64, name],
        )
        .context("seed league")?;
    }
    Ok(())
}

/// Upserts standings by (league, team) and makes sure every team in the table
/// exists in `teams` under this league.
pub fn upsert_standings(conn: &mut Connection, league_id: u32, rows: &[Standing]) -> Result<usize> {
    let tx = conn.transaction().context("begin standings transaction")?;
    let now = Utc::now().to_rfc3339();
    for row in rows {
        upsert_team_stub(&tx, league_id, row, &now)?;
        tx.execute(
            r#"
            INSERT INTO standings (
                league_id, team_id, rank, matches, won, draw, lost,
                goals_pro, goals_against, points, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            ON CONFLICT(league_id, team_id) DO UPDATE SET
                rank = excluded.rank,
                matches = excluded.matches,
                won = excluded.won,
                draw = excluded.draw,
                lost = excluded.lost,
                goals_pro = excluded.goals_pro,
                goals_against = excluded.goals_against,
                points = excluded.points,
                updated_at = excluded.updated_at
            "#,
            params![
                league_id as i64,
                row.team_id,
                row.rank,
                row.played,
                row.won,
                row.draw,
                row.lost,
                row.goals_for,
                row.goals_against,
                row.points,
                now,
            ],
        )
        .context("upsert standing")?;
    }
    tx.commit().context("commit standings transaction")?;
    Ok(rows.len())
}

fn upsert_team_stub(tx: &Transaction<'_>, league_id: u32, row: &Standing, now: &str) -> Result<()> {
    // Profile fields scraped from the team page win over the standings feed.
    tx.execute(
        r#"
        INSERT INTO teams (team_id, league_id, name_cn, logo_url, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        ON CONFLICT(team_id) DO UPDATE SET
            league_id = excluded.league_id,
            name_cn = CASE WHEN teams.name_cn = '' THEN excluded.name_cn ELSE teams.name_cn END,
            logo_url = CASE WHEN teams.logo_url = '' THEN excluded.logo_url ELSE teams.logo_url END
        "#,
        params![
            row.team_id,
            league_id as i64,
            row.team_name.as_deref().unwrap_or_default(),
            row.team_logo.as_deref().unwrap_or_default(),
            now,
        ],
    )
    .context("upsert team stub")?;
    Ok(())
}

pub fn replace_rankings(
    conn: &mut Connection,
    league_id: u32,
    kind: RankingType,
    rows: &[Ranking],
) -> Result<usize> {
    let tx = conn.transaction().context("begin rankings transaction")?;
    tx.execute(
        "DELETE FROM rankings WHERE league_id = ?1 AND type = ?2",
        params![league_id as i64, kind.as_str()],
    )
    .context("clear rankings")?;
    {
        let mut stmt = tx
            .prepare(
                "INSERT INTO rankings (league_id, type, rank, person_id, name, team, count)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )
            .context("prepare ranking insert")?;
        for row in rows {
            stmt.execute(params![
                league_id as i64,
                kind.as_str(),
                row.rank,
                row.person_id,
                row.name,
                row.team,
                row.count,
            ])
            .context("insert ranking")?;
        }
    }
    tx.commit().context("commit rankings transaction")?;
    Ok(rows.len())
}

/// League a team was last filed under, `0` when the team is unknown.
pub fn team_league_id(conn: &Connection, team_id: &str) -> Result<u32> {
    let league_id = conn
        .query_row(
            "SELECT league_id FROM teams WHERE team_id = ?1",
            params![team_id],
            |row| row.get::<_, i64>(0),
        )
        .optional()
        .context("query team league")?;
    Ok(league_id.and_then(|id| u32::try_from(id).ok()).unwrap_or(0))
}

pub fn upsert_team(conn: &Connection, league_id: u32, team: &TeamProfile) -> Result<()> {
    conn.execute(
        r#"
        INSERT INTO teams (
            team_id, league_id, name_cn, name_en, founded, country, city,
            stadium, capacity, phone, email, address, logo_url, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
        ON CONFLICT(team_id) DO UPDATE SET
            league_id = excluded.league_id,
            name_cn = excluded.name_cn,
            name_en = excluded.name_en,
            founded = excluded.founded,
            country = excluded.country,
            city = excluded.city,
            stadium = excluded.stadium,
            capacity = excluded.capacity,
            phone = excluded.phone,
            email = excluded.email,
            address = excluded.address,
            logo_url = excluded.logo_url,
            updated_at = excluded.updated_at
        "#,
        params![
            team.team_id,
            league_id as i64,
            team.name_cn,
            team.name_en,
            team.founded,
            team.country,
            team.city,
            team.stadium,
            team.capacity,
            team.phone,
            team.email,
            team.address,
            team.logo_url,
            Utc::now().to_rfc3339(),
        ],
    )
    .context("upsert team")?;
    Ok(())
}

pub fn replace_honors(conn: &mut Connection, team_id: &str, honors: &[Honor]) -> Result<usize> {
    let tx = conn.transaction().context("begin honors transaction")?;
    tx.execute("DELETE FROM honors WHERE team_id = ?1", params![team_id])
        .context("clear honors")?;
    {
        let mut stmt = tx
            .prepare("INSERT INTO honors (team_id, name, count, seasons) VALUES (?1, ?2, ?3, ?4)")
            .context("prepare honor insert")?;
        for honor in honors {
            stmt.execute(params![team_id, honor.name, honor.count, honor.seasons])
                .context("insert honor")?;
        }
    }
    tx.commit().context("commit honors transaction")?;
    Ok(honors.len())
}

/// Makes `roster` the complete squad of `team_id`. A player who moved here from
/// another stored team is re-homed by person id.
pub fn replace_roster(conn: &mut Connection, team_id: &str, roster: &[RosterEntry]) -> Result<usize> {
    let tx = conn.transaction().context("begin roster transaction")?;
    tx.execute("DELETE FROM players WHERE team_id = ?1", params![team_id])
        .context("clear roster")?;
    let now = Utc::now().to_rfc3339();
    {
        let mut stmt = tx
            .prepare(
                r#"
                INSERT INTO players (
                    person_id, team_id, name, number, position,
                    avatar_url, nationality_url, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                ON CONFLICT(person_id) DO UPDATE SET
                    team_id = excluded.team_id,
                    name = excluded.name,
                    number = excluded.number,
                    position = excluded.position,
                    avatar_url = excluded.avatar_url,
                    nationality_url = excluded.nationality_url,
                    updated_at = excluded.updated_at
                "#,
            )
            .context("prepare roster insert")?;
        for p in roster {
            stmt.execute(params![
                p.person_id,
                team_id,
                p.name,
                p.number,
                p.position,
                p.avatar_url,
                p.nationality_icon_url,
                now,
            ])
            .context("insert roster entry")?;
        }
    }
    tx.commit().context("commit roster transaction")?;
    Ok(roster.len())
}

pub fn upsert_player_profile(conn: &Connection, p: &PlayerProfile) -> Result<()> {
    conn.execute(
        r#"
        INSERT OR REPLACE INTO player_profiles (
            person_id, name_cn, name_en, club, nationality, height, weight, age,
            birth_date, number, foot, photo_url, ability_total,
            speed, shooting, passing, dribbling, defense, power, updated_at
        ) VALUES (
            ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8,
            ?9, ?10, ?11, ?12, ?13,
            ?14, ?15, ?16, ?17, ?18, ?19, ?20
        )
        "#,
        params![
            p.person_id,
            p.name_cn,
            p.name_en,
            p.club,
            p.nationality,
            p.height,
            p.weight,
            p.age,
            p.birth_date,
            p.number,
            p.foot,
            p.photo_url,
            p.ability_total,
            p.abilities.speed,
            p.abilities.shooting,
            p.abilities.passing,
            p.abilities.dribbling,
            p.abilities.defense,
            p.abilities.power,
            Utc::now().to_rfc3339(),
        ],
    )
    .context("upsert player profile")?;
    Ok(())
}

pub fn replace_player_stats(conn: &mut Connection, person_id: &str, stats: &[PlayerStat]) -> Result<usize> {
    let tx = conn.transaction().context("begin player stats transaction")?;
    tx.execute("DELETE FROM player_stats WHERE person_id = ?1", params![person_id])
        .context("clear player stats")?;
    {
        let mut stmt = tx
            .prepare(
                "INSERT INTO player_stats (person_id, season, club, matches, starts, goals, assists, yellow, red)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            )
            .context("prepare player stat insert")?;
        for s in stats {
            stmt.execute(params![
                person_id, s.season, s.club, s.matches, s.starts, s.goals, s.assists, s.yellow, s.red,
            ])
            .context("insert player stat")?;
        }
    }
    tx.commit().context("commit player stats transaction")?;
    Ok(stats.len())
}
