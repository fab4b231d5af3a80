use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue, USER_AGENT};
use tracing::debug;

const BROWSER_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Best-effort GET. `None` covers network errors and non-2xx statuses alike.
pub trait Fetcher: Send + Sync {
    fn fetch(&self, url: &str, params: &[(&str, &str)]) -> Option<String>;
}

pub fn http_client(timeout: Duration) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_UA));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("zh-CN,zh;q=0.9"));
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/json;q=0.9,*/*;q=0.8"),
    );
    Client::builder()
        .timeout(timeout)
        .default_headers(headers)
        .build()
        .context("failed to build http client")
}

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: http_client(timeout)?,
        })
    }

    fn get(&self, url: &str, params: &[(&str, &str)]) -> Result<String> {
        let resp = self
            .client
            .get(url)
            .query(params)
            .send()
            .context("request failed")?;
        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow::anyhow!("http {status}"));
        }
        // Upstream declares utf-8 but does not always say so in the headers.
        let bytes = resp.bytes().context("failed reading body")?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str, params: &[(&str, &str)]) -> Option<String> {
        match self.get(url, params) {
            Ok(body) => Some(body),
            Err(err) => {
                debug!(%url, "fetch failed: {err:#}");
                None
            }
        }
    }
}

/// URL builders for the scraped site.
#[derive(Debug, Clone)]
pub struct Upstream {
    base: String,
}

impl Upstream {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn standings_url(&self) -> String {
        format!("{}/sport-data/soccer/biz/data/standing", self.base)
    }

    pub fn person_ranking_url(&self) -> String {
        format!("{}/sport-data/soccer/biz/data/person_ranking", self.base)
    }

    pub fn team_url(&self, team_id: &str) -> String {
        format!("{}/team/{team_id}.html", self.base)
    }

    pub fn player_url(&self, person_id: &str) -> String {
        format!("{}/player/{person_id}.html", self.base)
    }
}
