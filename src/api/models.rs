use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the HTTP fetcher
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Turning this off accepts any server certificate.
    pub verify_tls: bool,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub user_agent: String,
}

impl ClientConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            verify_tls: true,
            connect_timeout_secs: 10,
            request_timeout_secs: 60,
            user_agent: concat!("simple-html-downloader/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}
