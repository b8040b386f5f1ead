/// `load_config` module: loads the static YAML config and resolves secrets from the environment.
///
/// This is the only place where untrusted YAML is parsed into typed structs.
///
/// # Responsibilities
/// - Parse the user-supplied YAML file into [`CliConfig`]
/// - Fill in defaults for the `staging` and `notion` sections when absent
/// - Resolve each integration's access token from the environment variable it names
///   (`token_env`), so the file itself never holds secrets
///
/// # Errors
/// All errors use `anyhow::Error` with the offending path or variable in the
/// message, and are surfaced at the CLI boundary.
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use petrel_core::config::StagingConfig;
use serde::Deserialize;
use tracing::{error, info};
use uuid::Uuid;

pub const DEFAULT_NOTION_API_BASE: &str = "https://api.notion.com/v1";
pub const DEFAULT_NOTION_VERSION: &str = "2022-06-28";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize)]
pub struct CliConfig {
    #[serde(default)]
    pub staging: StagingConfig,
    #[serde(default)]
    pub notion: NotionSection,
    #[serde(default)]
    pub integrations: Vec<IntegrationEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NotionSection {
    pub api_base: String,
    pub version: String,
    pub timeout_secs: u64,
}

impl Default for NotionSection {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_NOTION_API_BASE.to_owned(),
            version: DEFAULT_NOTION_VERSION.to_owned(),
            timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }
}

/// One user's workspace on one platform, as declared in the config file.
#[derive(Debug, Clone, Deserialize)]
pub struct IntegrationEntry {
    #[serde(default = "default_platform")]
    pub platform: String,
    pub user_id: Uuid,
    pub workspace_id: String,
    pub drafts_page_id: String,
    /// Name of the environment variable holding the access token.
    pub token_env: String,
    /// Pages that may be used as append targets.
    #[serde(default)]
    pub staging_pages: Vec<String>,
}

fn default_platform() -> String {
    petrel_core::platform::NOTION.to_owned()
}

impl IntegrationEntry {
    pub fn resolve_token(&self) -> Result<String> {
        std::env::var(&self.token_env).with_context(|| {
            format!(
                "access token env var {} for {} workspace {} is not set",
                self.token_env, self.platform, self.workspace_id
            )
        })
    }
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CliConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    let config: CliConfig = match serde_yaml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            conf
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    config.staging.trace_loaded();
    info!(
        integrations = config.integrations.len(),
        notion_api_base = %config.notion.api_base,
        "Loaded CliConfig"
    );
    Ok(config)
}
