use anyhow::{Result, anyhow};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{info, warn};

use crate::html_fields::{
    LabelTable, element_text, extract_labeled, select_img_src, selector, stripped_text,
};
use crate::http_client::{Fetcher, Upstream};
use crate::records::{Honor, RosterEntry, TeamProfile};
use crate::refresh::{RefreshError, RefreshReport, RefreshResult};
use crate::store::{self, Store};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeamField {
    Founded,
    Country,
    City,
    Stadium,
    Capacity,
    Phone,
    Email,
    Address,
}

pub const TEAM_LABELS: &LabelTable<TeamField> = &[
    ("成立", TeamField::Founded),
    ("国家", TeamField::Country),
    ("城市", TeamField::City),
    ("主场", TeamField::Stadium),
    ("容纳", TeamField::Capacity),
    ("电话", TeamField::Phone),
    ("邮箱", TeamField::Email),
    ("地址", TeamField::Address),
];

static PERSON_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"person_id:\s*"(\d+)""#).expect("static regex"));

static INFO_CON: Lazy<Selector> = Lazy::new(|| selector("div.info-con"));
static TEAM_NAME: Lazy<Selector> = Lazy::new(|| selector("p.team-name"));
static EN_NAME: Lazy<Selector> = Lazy::new(|| selector("p.en-name"));
static LABEL_ITEMS: Lazy<Selector> = Lazy::new(|| selector("span, p"));
static TEAM_LOGO: Lazy<Selector> = Lazy::new(|| selector("div.team-info img.team-logo"));
static HONOR_RECORD: Lazy<Selector> = Lazy::new(|| selector("div.hornor-record"));
static HONOR_LIST: Lazy<Selector> = Lazy::new(|| selector("div.hornor-list"));
static HONOR_HEADER: Lazy<Selector> = Lazy::new(|| selector("p.header"));
static HONOR_DURING: Lazy<Selector> = Lazy::new(|| selector("span.during-time"));
static PLAYER_DATA: Lazy<Selector> = Lazy::new(|| selector("div.team-player-data"));
static ROSTER_ITEM: Lazy<Selector> = Lazy::new(|| selector("p.analysis-list-item"));
static ITEM_POSITION: Lazy<Selector> = Lazy::new(|| selector("span.item1"));
static ITEM_NUMBER: Lazy<Selector> = Lazy::new(|| selector("span.item2"));
static ITEM_NAME: Lazy<Selector> = Lazy::new(|| selector("span.item3"));
static ITEM_NATIONALITY: Lazy<Selector> = Lazy::new(|| selector("span.item6"));
static IMG: Lazy<Selector> = Lazy::new(|| selector("img"));

#[derive(Debug, Clone)]
pub struct TeamPage {
    pub profile: TeamProfile,
    /// `None` when the page has no honors block at all.
    pub honors: Option<Vec<Honor>>,
    /// `None` when the page has no squad block at all.
    pub roster: Option<Roster>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
    pub entries: Vec<RosterEntry>,
    pub alignment: RosterAlignment,
}

/// How the scraped person-id tokens lined up with the roster rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterAlignment {
    Exact,
    /// Fewer ids than rows; the trailing rows were dropped.
    MissingIds { dropped: usize },
    /// More ids than rows; the trailing ids were ignored.
    ExtraIds { unused: usize },
}

pub fn refresh_team(
    fetcher: &dyn Fetcher,
    store: &Store,
    upstream: &Upstream,
    team_id: &str,
) -> RefreshResult {
    info!(team_id, "refreshing team page");
    let url = upstream.team_url(team_id);
    let raw = fetcher
        .fetch(&url, &[])
        .ok_or_else(|| RefreshError::fetch(&url))?;
    let page = parse_team_html(&raw, team_id)
        .map_err(|err| RefreshError::parse(format!("team {team_id}: {err:#}")))?;

    if let Some(roster) = &page.roster
        && roster.alignment != RosterAlignment::Exact
    {
        warn!(team_id, alignment = ?roster.alignment, "roster ids and rows diverge");
    }

    let mut report = RefreshReport::default();
    let mut conn = store.open()?;
    let league_id = store::team_league_id(&conn, team_id)?;
    store::upsert_team(&conn, league_id, &page.profile)?;
    report.apply("team", 1);

    match &page.honors {
        Some(honors) => report.apply("honors", store::replace_honors(&mut conn, team_id, honors)?),
        None => report.skip("honors"),
    }
    match &page.roster {
        Some(roster) if !roster.entries.is_empty() => {
            report.apply("roster", store::replace_roster(&mut conn, team_id, &roster.entries)?)
        }
        _ => report.skip("roster"),
    }
    Ok(report)
}

/// Parses a team page. Fails only when the profile block is missing, which
/// means the page is not a team page (or its layout moved).
pub fn parse_team_html(raw: &str, team_id: &str) -> Result<TeamPage> {
    let doc = Html::parse_document(raw);
    let info = doc
        .select(&INFO_CON)
        .next()
        .ok_or_else(|| anyhow!("missing div.info-con"))?;

    let mut profile = parse_profile(&info);
    profile.team_id = team_id.to_string();
    if let Some(src) = doc
        .select(&TEAM_LOGO)
        .next()
        .and_then(|img| img.value().attr("src"))
    {
        profile.logo_url = src.to_string();
    }

    let honors = doc.select(&HONOR_RECORD).next().map(|record| {
        record
            .select(&HONOR_LIST)
            .filter_map(|item| parse_honor(&item))
            .collect()
    });

    let roster = doc.select(&PLAYER_DATA).next().map(|block| {
        let rows = block.select(&ROSTER_ITEM).map(|row| parse_roster_row(&row)).collect();
        correlate_roster(&scrape_person_ids(raw), rows)
    });

    Ok(TeamPage {
        profile,
        honors,
        roster,
    })
}

fn parse_profile(info: &ElementRef<'_>) -> TeamProfile {
    let mut profile = TeamProfile::default();
    if let Some(name) = info.select(&TEAM_NAME).next() {
        profile.name_cn = stripped_text(&name);
    }
    if let Some(name) = info.select(&EN_NAME).next() {
        profile.name_en = stripped_text(&name);
    }

    let fragments: Vec<String> = info.select(&LABEL_ITEMS).map(|el| element_text(&el)).collect();
    extract_labeled(fragments.iter().map(String::as_str), TEAM_LABELS, |field, value| {
        let slot = match field {
            TeamField::Founded => &mut profile.founded,
            TeamField::Country => &mut profile.country,
            TeamField::City => &mut profile.city,
            TeamField::Stadium => &mut profile.stadium,
            TeamField::Capacity => &mut profile.capacity,
            TeamField::Phone => &mut profile.phone,
            TeamField::Email => &mut profile.email,
            TeamField::Address => &mut profile.address,
        };
        *slot = value;
    });
    profile
}

fn parse_honor(item: &ElementRef<'_>) -> Option<Honor> {
    let header = stripped_text(&item.select(&HONOR_HEADER).next()?);
    let (name, count) = split_honor(&header);
    let seasons = item
        .select(&HONOR_DURING)
        .next()
        .map(|el| element_text(&el))
        .unwrap_or_default();
    Some(Honor {
        name,
        count,
        seasons,
    })
}

/// Splits `"<name>X<count>"`; without an `X` the count is `"1"`.
pub fn split_honor(raw: &str) -> (String, String) {
    match raw.rsplit_once('X') {
        Some((name, count)) => (name.trim().to_string(), count.trim().to_string()),
        None => (raw.trim().to_string(), "1".to_string()),
    }
}

/// Person ids embedded in the page's inline script data, in document order.
pub fn scrape_person_ids(raw: &str) -> Vec<String> {
    PERSON_ID
        .captures_iter(raw)
        .filter_map(|cap| cap.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

fn parse_roster_row(row: &ElementRef<'_>) -> Option<RosterEntry> {
    let name_cell = row.select(&ITEM_NAME).next()?;
    Some(RosterEntry {
        person_id: String::new(),
        name: stripped_text(&name_cell),
        number: row
            .select(&ITEM_NUMBER)
            .next()
            .map(|el| stripped_text(&el))
            .unwrap_or_default(),
        position: row
            .select(&ITEM_POSITION)
            .next()
            .map(|el| stripped_text(&el))
            .unwrap_or_default(),
        avatar_url: name_cell
            .select(&IMG)
            .next()
            .and_then(|img| img.value().attr("src"))
            .unwrap_or_default()
            .to_string(),
        nationality_icon_url: select_img_src(row, &ITEM_NATIONALITY, &IMG).unwrap_or_default(),
    })
}

/// Pairs the i-th id with the i-th roster row.
///
/// Rows without a name cell still consume their position so later rows keep
/// their pairing; they are dropped afterwards.
pub fn correlate_roster(ids: &[String], rows: Vec<Option<RosterEntry>>) -> Roster {
    let alignment = match ids.len().cmp(&rows.len()) {
        std::cmp::Ordering::Equal => RosterAlignment::Exact,
        std::cmp::Ordering::Less => RosterAlignment::MissingIds {
            dropped: rows.len() - ids.len(),
        },
        std::cmp::Ordering::Greater => RosterAlignment::ExtraIds {
            unused: ids.len() - rows.len(),
        },
    };
    let entries = ids
        .iter()
        .zip(rows)
        .filter_map(|(id, row)| {
            let mut entry = row?;
            entry.person_id = id.clone();
            Some(entry)
        })
        .collect();
    Roster { entries, alignment }
}
