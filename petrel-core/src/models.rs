//! Request and response shapes for draft staging.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::contract::{CreatedPage, PageCreator, UserIntegration};
use crate::error::StagingError;
use crate::lint::LintWarning;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateDraftRequest {
    pub markdown: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<DraftMetadata>,
    #[serde(default)]
    pub destinations: Vec<Destination>,
}

impl CreateDraftRequest {
    /// Rejects requests that cannot be staged anywhere, before any lookup.
    pub fn check(&self) -> Result<(), StagingError> {
        if self.destinations.is_empty() {
            return Err(StagingError::InputInvalid(
                "at least one destination is required".to_owned(),
            ));
        }
        if self.markdown.trim().is_empty() {
            return Err(StagingError::InputInvalid("markdown is empty".to_owned()));
        }
        if let Some(position) = self
            .destinations
            .iter()
            .position(|d| d.platform.trim().is_empty())
        {
            return Err(StagingError::InputInvalid(format!(
                "destination {position} has no platform"
            )));
        }
        Ok(())
    }

    pub fn title_or<'a>(&'a self, default_title: &'a str) -> &'a str {
        match self.title.trim() {
            "" => default_title,
            title => title,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    pub platform: String,
    #[serde(default)]
    pub workspace_id: String,
    #[serde(default)]
    pub append: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_id: Option<String>,
}

impl Destination {
    /// The page id, treating an empty string as absent.
    pub fn page_id(&self) -> Option<&str> {
        self.page_id.as_deref().filter(|id| !id.trim().is_empty())
    }
}

/// A destination that passed ownership checks, with its resolved integration
/// and the creator of the platform it was checked against.
#[derive(Clone)]
pub struct ValidatedDestination {
    /// Index of the destination in the request.
    pub position: usize,
    pub platform: String,
    pub workspace_id: String,
    pub append: bool,
    pub page_id: Option<String>,
    pub integration: UserIntegration,
    pub creator: Arc<dyn PageCreator>,
}

impl fmt::Debug for ValidatedDestination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatedDestination")
            .field("position", &self.position)
            .field("platform", &self.platform)
            .field("workspace_id", &self.workspace_id)
            .field("append", &self.append)
            .field("page_id", &self.page_id)
            .field("integration", &self.integration)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StagingStatus {
    Success,
    PartialSuccess,
    Fail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftStatus {
    Draft,
    Fail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftAction {
    Created,
    Appended,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftResultEntry {
    pub draft_id: Uuid,
    pub platform: String,
    pub workspace_id: String,
    #[serde(default)]
    pub page_id: String,
    #[serde(default)]
    pub url: String,
    pub status: DraftStatus,
    pub action: DraftAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lint_warnings: Vec<LintWarning>,
}

impl DraftResultEntry {
    pub fn created(
        destination: &ValidatedDestination,
        page: CreatedPage,
        lint_warnings: &[LintWarning],
    ) -> Self {
        Self {
            draft_id: Uuid::new_v4(),
            platform: destination.platform.clone(),
            workspace_id: destination.workspace_id.clone(),
            page_id: page.id,
            url: page.url,
            status: DraftStatus::Draft,
            action: DraftAction::Created,
            error: None,
            lint_warnings: lint_warnings.to_vec(),
        }
    }

    /// A failed draft. When the page was created before the failure, its id
    /// and url are kept so the draft can still be found.
    pub fn failed(
        destination: &ValidatedDestination,
        action: DraftAction,
        error: &StagingError,
        lint_warnings: &[LintWarning],
    ) -> Self {
        let (page_id, url) = match error {
            StagingError::IncompletePage { page, .. } => (page.id.clone(), page.url.clone()),
            _ => (destination.page_id.clone().unwrap_or_default(), String::new()),
        };
        Self {
            draft_id: Uuid::new_v4(),
            platform: destination.platform.clone(),
            workspace_id: destination.workspace_id.clone(),
            page_id,
            url,
            status: DraftStatus::Fail,
            action,
            error: Some(error.to_string()),
            lint_warnings: lint_warnings.to_vec(),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.status == DraftStatus::Draft
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagingResponse {
    pub status: StagingStatus,
    pub drafts: Vec<DraftResultEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StagingResponse {
    /// A request rejected before any draft was attempted.
    pub fn rejected(error: &StagingError) -> Self {
        Self {
            status: StagingStatus::Fail,
            drafts: Vec::new(),
            error: Some(error.to_string()),
        }
    }

    /// `success` when every draft succeeded, `fail` when none did,
    /// `partial_success` otherwise.
    pub fn from_drafts(drafts: Vec<DraftResultEntry>) -> Self {
        let succeeded = drafts.iter().filter(|d| d.succeeded()).count();
        let status = match succeeded {
            0 => StagingStatus::Fail,
            n if n == drafts.len() => StagingStatus::Success,
            _ => StagingStatus::PartialSuccess,
        };
        Self {
            status,
            drafts,
            error: None,
        }
    }
}
