use std::fmt;

/// Cache-gating identity of one refreshable resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResourceKey {
    League(u32),
    Team(String),
    Player(String),
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKey::League(id) => write!(f, "league_{id}"),
            ResourceKey::Team(id) => write!(f, "team_{id}"),
            ResourceKey::Player(id) => write!(f, "player_{id}"),
        }
    }
}

/// Upstream team and person ids are plain decimal numbers. Anything else is
/// rejected before it reaches the gate or an upstream URL.
pub fn is_upstream_id(raw: &str) -> bool {
    !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::{ResourceKey, is_upstream_id};

    #[test]
    fn upstream_ids_are_digits_only() {
        assert!(is_upstream_id("50000513"));
        assert!(!is_upstream_id(""));
        assert!(!is_upstream_id("../50000513"));
        assert!(!is_upstream_id("12 34"));
        assert!(!is_upstream_id("１２"));
    }

    #[test]
    fn keys_format_with_kind_prefix() {
        assert_eq!(ResourceKey::League(24646).to_string(), "league_24646");
        assert_eq!(ResourceKey::Team("50000513".into()).to_string(), "team_50000513");
        assert_eq!(ResourceKey::Player("50046387".into()).to_string(), "player_50046387");
    }
}
