use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// Static credentials used for HTTP basic authentication.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub url: String,
    pub credentials: Credentials,
}

impl DownloadRequest {
    pub fn new(url: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            url: url.into(),
            credentials,
        }
    }
}

/// Outcome of one URL. The error message is present only for failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadResult {
    request: DownloadRequest,
    saved_to: Option<PathBuf>,
    error_message: Option<String>,
}

impl DownloadResult {
    pub fn success(request: DownloadRequest, saved_to: PathBuf) -> Self {
        Self {
            request,
            saved_to: Some(saved_to),
            error_message: None,
        }
    }

    pub fn failure(request: DownloadRequest, error_message: impl Into<String>) -> Self {
        Self {
            request,
            saved_to: None,
            error_message: Some(error_message.into()),
        }
    }

    pub fn url(&self) -> &str {
        &self.request.url
    }

    pub fn succeeded(&self) -> bool {
        self.error_message.is_none()
    }

    pub fn saved_to(&self) -> Option<&Path> {
        self.saved_to.as_deref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }
}

/// Results of one pass over an ordered URL list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchRun {
    results: Vec<DownloadResult>,
    unprocessed: Vec<String>,
    cancelled: bool,
}

impl BatchRun {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, result: DownloadResult) {
        self.results.push(result);
    }

    /// Finalize early, keeping the URLs that were never attempted.
    pub fn cancel(&mut self, unprocessed: Vec<String>) {
        self.cancelled = true;
        self.unprocessed = unprocessed;
    }

    pub fn results(&self) -> &[DownloadResult] {
        &self.results
    }

    pub fn processed(&self) -> usize {
        self.results.len()
    }

    pub fn total(&self) -> usize {
        self.results.len() + self.unprocessed.len()
    }

    pub fn succeeded_count(&self) -> usize {
        self.results.iter().filter(|r| r.succeeded()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.processed() - self.succeeded_count()
    }

    pub fn failed_urls(&self) -> Vec<String> {
        self.results
            .iter()
            .filter(|r| !r.succeeded())
            .map(|r| r.url().to_string())
            .collect()
    }

    pub fn unprocessed(&self) -> &[String] {
        &self.unprocessed
    }

    pub fn was_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Input for the next run: failures first, then anything a cancel skipped.
    pub fn retry_urls(&self) -> Vec<String> {
        let mut urls = self.failed_urls();
        urls.extend(self.unprocessed.iter().cloned());
        urls
    }

    pub fn summary(&self) -> BatchSummary {
        BatchSummary {
            total: self.total(),
            succeeded: self.succeeded_count(),
            failed_urls: self.failed_urls(),
            unprocessed: self.unprocessed.clone(),
            cancelled: self.cancelled,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed_urls: Vec<String>,
    pub unprocessed: Vec<String>,
    pub cancelled: bool,
}

/// Emitted after each URL is processed. `index` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchProgress {
    pub index: usize,
    pub total: usize,
    pub result: DownloadResult,
}

impl fmt::Display for BatchProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}/{}] {}", self.index, self.total, self.result.url())?;
        match (self.result.saved_to(), self.result.error_message()) {
            (_, Some(error)) => write!(f, " -> {}", error),
            (Some(path), None) => write!(f, " -> Success: {}", path.display()),
            (None, None) => Ok(()),
        }
    }
}

impl BatchProgress {
    pub fn fraction(&self) -> f32 {
        if self.total == 0 {
            0.0
        } else {
            self.index as f32 / self.total as f32
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadPhase {
    Idle,
    AwaitingFolder,
    Downloading,
    Completed,
    Cancelled,
}
