use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_BIND: &str = "127.0.0.1:5000";
const DEFAULT_UPSTREAM: &str = "https://www.dongqiudi.com";
const DEFAULT_REFRESH_SECS: u64 = 300;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
const CACHE_DIR: &str = "football_data";
const DB_FILE: &str = "football_data.sqlite";

#[derive(Debug, Clone)]
pub struct Config {
    pub bind: String,
    pub db_path: PathBuf,
    pub refresh_timeout: Duration,
    pub http_timeout: Duration,
    pub upstream: String,
}

impl Config {
    /// Reads `.env.local` / `.env` (if present) and then the process environment.
    pub fn from_env() -> Self {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let secs = |name: &str, default: u64| {
            non_empty(name)
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(default)
                .max(1)
        };

        let upstream = non_empty("FOOTBALL_UPSTREAM")
            .unwrap_or_else(|| DEFAULT_UPSTREAM.to_string())
            .trim_end_matches('/')
            .to_string();

        Self {
            bind: non_empty("FOOTBALL_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string()),
            db_path: non_empty("FOOTBALL_DB_PATH")
                .map(PathBuf::from)
                .or_else(default_db_path)
                .unwrap_or_else(|| PathBuf::from(DB_FILE)),
            refresh_timeout: Duration::from_secs(secs("FOOTBALL_REFRESH_SECS", DEFAULT_REFRESH_SECS)),
            http_timeout: Duration::from_secs(secs(
                "FOOTBALL_HTTP_TIMEOUT_SECS",
                DEFAULT_HTTP_TIMEOUT_SECS,
            )),
            upstream,
        }
    }

    pub fn with_db_override(mut self, path: Option<PathBuf>) -> Self {
        if let Some(path) = path {
            self.db_path = path;
        }
        self
    }
}

pub fn default_db_path() -> Option<PathBuf> {
    app_cache_dir().map(|dir| dir.join(DB_FILE))
}

pub fn app_cache_dir() -> Option<PathBuf> {
    if let Ok(base) = std::env::var("XDG_CACHE_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(CACHE_DIR));
        }
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(CACHE_DIR))
}

/// Picks `--db <path>` or `--db=<path>` out of an argument list.
pub fn parse_db_path_arg(args: &[String]) -> Option<PathBuf> {
    for (idx, arg) in args.iter().enumerate() {
        if let Some(path) = arg.strip_prefix("--db=") {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return Some(PathBuf::from(trimmed));
            }
        }
        if arg == "--db" {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() {
                return Some(PathBuf::from(next));
            }
        }
    }
    None
}
