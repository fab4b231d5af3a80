use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Standing {
    pub league_id: u32,
    pub team_id: String,
    pub team_name: Option<String>,
    pub team_logo: Option<String>,
    pub rank: i64,
    pub played: i64,
    pub won: i64,
    pub draw: i64,
    pub lost: i64,
    pub goals_for: i64,
    pub goals_against: i64,
    pub points: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankingType {
    Goals,
    Assists,
}

impl RankingType {
    pub const ALL: [RankingType; 2] = [RankingType::Goals, RankingType::Assists];

    pub fn as_str(self) -> &'static str {
        match self {
            RankingType::Goals => "goals",
            RankingType::Assists => "assists",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "goals" => Some(RankingType::Goals),
            "assists" => Some(RankingType::Assists),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ranking {
    pub rank: i64,
    pub person_id: String,
    pub name: String,
    pub team: String,
    pub count: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TeamProfile {
    pub team_id: String,
    pub name_cn: String,
    pub name_en: String,
    pub founded: String,
    pub country: String,
    pub city: String,
    pub stadium: String,
    pub capacity: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub logo_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Honor {
    pub name: String,
    pub count: String,
    pub seasons: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RosterEntry {
    pub person_id: String,
    pub name: String,
    pub number: String,
    pub position: String,
    pub avatar_url: String,
    pub nationality_icon_url: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Abilities {
    pub speed: i64,
    pub shooting: i64,
    pub passing: i64,
    pub dribbling: i64,
    pub defense: i64,
    pub power: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlayerProfile {
    pub person_id: String,
    pub name_cn: String,
    pub name_en: String,
    pub club: String,
    pub nationality: String,
    pub height: String,
    pub weight: String,
    pub age: String,
    pub birth_date: String,
    pub number: String,
    pub foot: String,
    pub photo_url: String,
    pub ability_total: i64,
    pub abilities: Abilities,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerStat {
    pub season: String,
    pub club: String,
    pub matches: i64,
    pub starts: i64,
    pub goals: i64,
    pub assists: i64,
    pub yellow: i64,
    pub red: i64,
}
