use thiserror::Error;

/// Why a refresh did not complete. None of these reach the HTTP caller.
#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("fetch failed: {url}")]
    Fetch { url: String },
    #[error("unparseable upstream payload: {what}")]
    Parse { what: String },
    #[error("persist failed: {0:#}")]
    Persist(#[from] anyhow::Error),
}

impl RefreshError {
    pub fn fetch(url: impl Into<String>) -> Self {
        RefreshError::Fetch { url: url.into() }
    }

    pub fn parse(what: impl Into<String>) -> Self {
        RefreshError::Parse { what: what.into() }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            RefreshError::Fetch { .. } => "fetch",
            RefreshError::Parse { .. } => "parse",
            RefreshError::Persist(_) => "persist",
        }
    }
}

/// What a successful refresh wrote, and which sub-updates it had to skip.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshReport {
    pub applied: Vec<&'static str>,
    pub skipped: Vec<&'static str>,
    pub rows_written: usize,
}

impl RefreshReport {
    pub fn apply(&mut self, part: &'static str, rows: usize) {
        self.applied.push(part);
        self.rows_written += rows;
    }

    pub fn skip(&mut self, part: &'static str) {
        self.skipped.push(part);
    }
}

pub type RefreshResult = Result<RefreshReport, RefreshError>;
