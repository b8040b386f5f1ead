//! Config-backed workspace directory.
//!
//! Answers the core's ownership questions from the `integrations` section of
//! the config file: a user owns a workspace when an entry pairs them, and a
//! page is a valid staging page when it is listed on one of the user's entries.

use anyhow::Result;
use async_trait::async_trait;
use petrel_core::contract::{PlatformError, UserIntegration, WorkspaceValidator};
use tracing::{debug, info};
use uuid::Uuid;

use crate::load_config::IntegrationEntry;

#[derive(Debug, Clone)]
struct DirectoryEntry {
    user_id: Uuid,
    workspace_id: String,
    integration: UserIntegration,
    staging_pages: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct WorkspaceDirectory {
    platform: String,
    entries: Vec<DirectoryEntry>,
}

impl WorkspaceDirectory {
    /// Directory for `platform` built from the matching config entries.
    /// Fails when an entry's access token is missing from the environment.
    pub fn from_entries(platform: &str, entries: &[IntegrationEntry]) -> Result<Self> {
        let entries = entries
            .iter()
            .filter(|entry| entry.platform == platform)
            .map(|entry| -> Result<DirectoryEntry> {
                Ok(DirectoryEntry {
                    user_id: entry.user_id,
                    workspace_id: entry.workspace_id.clone(),
                    integration: UserIntegration {
                        access_token: entry.resolve_token()?,
                        drafts_container_id: entry.drafts_page_id.clone(),
                    },
                    staging_pages: entry.staging_pages.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        info!(
            platform,
            workspaces = entries.len(),
            "Workspace directory loaded"
        );
        Ok(Self {
            platform: platform.to_owned(),
            entries,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl WorkspaceValidator for WorkspaceDirectory {
    async fn user_has_workspace(
        &self,
        user_id: Uuid,
        workspace_id: &str,
    ) -> Result<Option<UserIntegration>, PlatformError> {
        let found = self
            .entries
            .iter()
            .find(|entry| entry.user_id == user_id && entry.workspace_id == workspace_id)
            .map(|entry| entry.integration.clone());
        debug!(
            platform = %self.platform,
            %user_id,
            workspace_id,
            found = found.is_some(),
            "Workspace lookup"
        );
        Ok(found)
    }

    async fn is_valid_staging_page(
        &self,
        user_id: Uuid,
        page_id: &str,
    ) -> Result<bool, PlatformError> {
        Ok(self
            .entries
            .iter()
            .filter(|entry| entry.user_id == user_id)
            .any(|entry| entry.staging_pages.iter().any(|page| page == page_id)))
    }
}
