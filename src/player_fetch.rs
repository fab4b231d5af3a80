use anyhow::{Result, anyhow};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::info;

use crate::html_fields::{
    LabelTable, element_text, extract_labeled, first_integer, labels_in, selector, stripped_text,
};
use crate::http_client::{Fetcher, Upstream};
use crate::records::{Abilities, PlayerProfile, PlayerStat};
use crate::refresh::{RefreshError, RefreshReport, RefreshResult};
use crate::store::{self, Store};

const MIN_STAT_COLUMNS: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerField {
    Club,
    Nationality,
    Height,
    Age,
    Weight,
    Number,
    BirthDate,
    Foot,
}

pub const PLAYER_LABELS: &LabelTable<PlayerField> = &[
    ("俱乐部", PlayerField::Club),
    ("国籍", PlayerField::Nationality),
    ("身高", PlayerField::Height),
    ("年龄", PlayerField::Age),
    ("体重", PlayerField::Weight),
    ("号码", PlayerField::Number),
    ("生日", PlayerField::BirthDate),
    ("惯用脚", PlayerField::Foot),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ability {
    Speed,
    Shooting,
    Passing,
    Dribbling,
    Defense,
    Power,
}

/// Chart labels in radar order.
pub const ABILITY_LABELS: &LabelTable<Ability> = &[
    ("速度", Ability::Speed),
    ("射门", Ability::Shooting),
    ("传球", Ability::Passing),
    ("盘带", Ability::Dribbling),
    ("防守", Ability::Defense),
    ("力量", Ability::Power),
];

impl Abilities {
    pub fn get(&self, ability: Ability) -> i64 {
        match ability {
            Ability::Speed => self.speed,
            Ability::Shooting => self.shooting,
            Ability::Passing => self.passing,
            Ability::Dribbling => self.dribbling,
            Ability::Defense => self.defense,
            Ability::Power => self.power,
        }
    }

    fn set(&mut self, ability: Ability, score: i64) {
        let slot = match ability {
            Ability::Speed => &mut self.speed,
            Ability::Shooting => &mut self.shooting,
            Ability::Passing => &mut self.passing,
            Ability::Dribbling => &mut self.dribbling,
            Ability::Defense => &mut self.defense,
            Ability::Power => &mut self.power,
        };
        *slot = score;
    }
}

static INFO_LEFT: Lazy<Selector> = Lazy::new(|| selector("div.info-left"));
static CHINA_NAME: Lazy<Selector> = Lazy::new(|| selector("p.china-name"));
static EN_NAME: Lazy<Selector> = Lazy::new(|| selector("p.en-name"));
static LI: Lazy<Selector> = Lazy::new(|| selector("li"));
static PHOTO: Lazy<Selector> = Lazy::new(|| selector("img.player-photo"));
static AVERAGE: Lazy<Selector> = Lazy::new(|| selector("p.average b"));
static CHART_ITEM: Lazy<Selector> = Lazy::new(|| selector("div.box_chart div.item"));
static STATS_WRAP: Lazy<Selector> = Lazy::new(|| selector("div.total-con-wrap"));
static STATS_ROW: Lazy<Selector> = Lazy::new(|| selector("p.td"));
static SPAN: Lazy<Selector> = Lazy::new(|| selector("span"));

#[derive(Debug, Clone)]
pub struct PlayerPage {
    pub profile: PlayerProfile,
    /// `None` when the page has no season table.
    pub stats: Option<Vec<PlayerStat>>,
}

pub fn refresh_player(
    fetcher: &dyn Fetcher,
    store: &Store,
    upstream: &Upstream,
    person_id: &str,
) -> RefreshResult {
    info!(person_id, "refreshing player page");
    let url = upstream.player_url(person_id);
    let raw = fetcher
        .fetch(&url, &[])
        .ok_or_else(|| RefreshError::fetch(&url))?;
    let page = parse_player_html(&raw, person_id)
        .map_err(|err| RefreshError::parse(format!("player {person_id}: {err:#}")))?;

    let mut report = RefreshReport::default();
    let mut conn = store.open()?;
    store::upsert_player_profile(&conn, &page.profile)?;
    report.apply("profile", 1);
    match &page.stats {
        Some(stats) => report.apply(
            "stats",
            store::replace_player_stats(&mut conn, person_id, stats)?,
        ),
        None => report.skip("stats"),
    }
    Ok(report)
}

pub fn parse_player_html(raw: &str, person_id: &str) -> Result<PlayerPage> {
    let doc = Html::parse_document(raw);
    let info = doc
        .select(&INFO_LEFT)
        .next()
        .ok_or_else(|| anyhow!("missing div.info-left"))?;

    let mut profile = parse_bio(&info);
    profile.person_id = person_id.to_string();
    if let Some(src) = doc
        .select(&PHOTO)
        .next()
        .and_then(|img| img.value().attr("src"))
    {
        profile.photo_url = src.to_string();
    }
    profile.ability_total = doc
        .select(&AVERAGE)
        .next()
        .and_then(|b| stripped_text(&b).parse::<i64>().ok())
        .unwrap_or(0);
    profile.abilities = parse_abilities(doc.select(&CHART_ITEM));

    let stats = doc.select(&STATS_WRAP).next().map(|wrap| {
        wrap.select(&STATS_ROW)
            .filter_map(|row| {
                let cols: Vec<String> = row.select(&SPAN).map(|c| stripped_text(&c)).collect();
                parse_stat_columns(&cols)
            })
            .collect()
    });

    Ok(PlayerPage { profile, stats })
}

fn parse_bio(info: &ElementRef<'_>) -> PlayerProfile {
    let mut profile = PlayerProfile::default();
    if let Some(name) = info.select(&CHINA_NAME).next() {
        profile.name_cn = stripped_text(&name);
    }
    if let Some(name) = info.select(&EN_NAME).next() {
        profile.name_en = stripped_text(&name);
    }

    let fragments: Vec<String> = info.select(&LI).map(|li| element_text(&li)).collect();
    extract_labeled(fragments.iter().map(String::as_str), PLAYER_LABELS, |field, value| {
        let slot = match field {
            PlayerField::Club => &mut profile.club,
            PlayerField::Nationality => &mut profile.nationality,
            PlayerField::Height => &mut profile.height,
            PlayerField::Age => &mut profile.age,
            PlayerField::Weight => &mut profile.weight,
            PlayerField::Number => &mut profile.number,
            PlayerField::BirthDate => &mut profile.birth_date,
            PlayerField::Foot => &mut profile.foot,
        };
        *slot = value;
    });
    profile
}

/// Each chart item carries one label and one score; an item without digits scores 0.
pub fn parse_abilities<'a>(items: impl IntoIterator<Item = ElementRef<'a>>) -> Abilities {
    let mut abilities = Abilities::default();
    for item in items {
        let text = element_text(&item);
        let score = first_integer(&text).unwrap_or(0);
        for ability in labels_in(&text, ABILITY_LABELS) {
            abilities.set(ability, score);
        }
    }
    abilities
}

/// One season row: season, club, then matches/starts/goals/assists/yellow/red.
/// Rows that are too short or carry a non-numeric count are rejected.
pub fn parse_stat_columns(cols: &[String]) -> Option<PlayerStat> {
    if cols.len() < MIN_STAT_COLUMNS {
        return None;
    }
    let num = |idx: usize| cols[idx].trim().parse::<i64>().ok();
    Some(PlayerStat {
        season: cols[0].trim().to_string(),
        club: cols[1].trim().to_string(),
        matches: num(2)?,
        starts: num(3)?,
        goals: num(4)?,
        assists: num(5)?,
        yellow: num(6)?,
        red: num(7)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn stat_row_needs_nine_columns() {
        let short = cols(&["2023/24", "曼城", "30", "28", "20", "5", "2", "0"]);
        assert!(parse_stat_columns(&short).is_none());
        let full = cols(&["2023/24", "曼城", "30", "28", "20", "5", "2", "0", "2500"]);
        let stat = parse_stat_columns(&full).expect("full row parses");
        assert_eq!(stat.goals, 20);
        assert_eq!(stat.red, 0);
    }

    #[test]
    fn stat_row_rejects_non_numeric_counts() {
        let row = cols(&["2023/24", "曼城", "30", "-", "20", "5", "2", "0", "2500"]);
        assert!(parse_stat_columns(&row).is_none());
    }

    #[test]
    fn abilities_read_first_integer_per_item() {
        let html = Html::parse_fragment(
            r#"<div class="box_chart">
                <div class="item"><span>速度</span><b>91</b></div>
                <div class="item"><span>射门</span><b>88 / 99</b></div>
                <div class="item"><span>力量</span></div>
                <div class="item"><span>心态</span><b>70</b></div>
            </div>"#,
        );
        let abilities = parse_abilities(html.select(&CHART_ITEM));
        assert_eq!(abilities.speed, 91);
        assert_eq!(abilities.shooting, 88);
        assert_eq!(abilities.power, 0);
        assert_eq!(abilities.passing, 0);
    }
}
