use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub const DEFAULT_TITLE: &str = "Draft from Petrel";
pub const DEFAULT_REMOTE_TIMEOUT_SECS: u64 = 30;

/// Staging behaviour shared by every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StagingConfig {
    /// Bound on each outbound page-creation call, in milliseconds.
    pub remote_timeout_ms: u64,
    /// Title for drafts whose request leaves the title blank.
    pub default_title: String,
}

impl Default for StagingConfig {
    fn default() -> Self {
        Self {
            remote_timeout_ms: DEFAULT_REMOTE_TIMEOUT_SECS * 1000,
            default_title: DEFAULT_TITLE.to_owned(),
        }
    }
}

impl StagingConfig {
    pub fn remote_timeout(&self) -> Duration {
        Duration::from_millis(self.remote_timeout_ms)
    }

    pub fn trace_loaded(&self) {
        info!(
            remote_timeout_ms = self.remote_timeout_ms,
            default_title = %self.default_title,
            "Loaded StagingConfig"
        );
        debug!(?self, "StagingConfig loaded (full debug)");
    }
}
