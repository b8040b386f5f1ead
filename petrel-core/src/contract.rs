//! # contract: collaborator interfaces for the staging pipeline
//!
//! The core never talks to a platform directly. Everything outside the
//! pipeline is reached through the traits below:
//!
//! - [`MarkdownParser`] turns raw markdown into a [`ParsedDocument`].
//! - [`WorkspaceValidator`] answers ownership questions: does this user own
//!   this workspace, and is this page a valid staging page for them.
//! - [`PageCreator`] creates a draft page holding native blocks.
//!
//! ## Errors
//! Platform collaborators return the boxed [`PlatformError`]; the
//! orchestrator turns those into per-destination failure entries.
//!
//! ## Mocking & Testing
//! The traits are annotated for `mockall`; with the `test-export-mocks`
//! feature (on by default) the generated `Mock*` types are exported for
//! integration tests in this and dependent crates.

use async_trait::async_trait;
#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ParseError;
use crate::native::NativeBlock;
pub use crate::parser::ParsedDocument;

/// Error type for platform collaborators.
pub type PlatformError = Box<dyn std::error::Error + Send + Sync>;

/// Credentials and drafts location for one user's workspace on one platform.
#[derive(Clone, PartialEq, Eq)]
pub struct UserIntegration {
    pub access_token: String,
    /// Page under which new drafts are created.
    pub drafts_container_id: String,
}

impl std::fmt::Debug for UserIntegration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserIntegration")
            .field("access_token", &"<redacted>")
            .field("drafts_container_id", &self.drafts_container_id)
            .finish()
    }
}

/// A page returned by the platform after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedPage {
    pub id: String,
    pub url: String,
}

/// The page was created but filling it failed part way.
///
/// Returned by a [`PageCreator`] so the caller still learns where the
/// half-written draft lives.
#[derive(Debug, thiserror::Error)]
#[error("page {} was created but not completed: {source}", .page.id)]
pub struct IncompletePage {
    pub page: CreatedPage,
    #[source]
    pub source: PlatformError,
}

#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait MarkdownParser: Send + Sync {
    fn parse(&self, markdown: &str) -> Result<ParsedDocument, ParseError>;
}

#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait WorkspaceValidator: Send + Sync {
    /// The user's integration for `workspace_id`, or `None` when the user
    /// has no access to it.
    async fn user_has_workspace(
        &self,
        user_id: Uuid,
        workspace_id: &str,
    ) -> Result<Option<UserIntegration>, PlatformError>;

    /// Whether `page_id` is a staging page registered to the user.
    async fn is_valid_staging_page(
        &self,
        user_id: Uuid,
        page_id: &str,
    ) -> Result<bool, PlatformError>;
}

#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait PageCreator: Send + Sync {
    /// Create a page titled `title` under `parent_id` holding `blocks`.
    ///
    /// A failure after the page exists should be an [`IncompletePage`].
    async fn create_page(
        &self,
        access_token: &str,
        parent_id: &str,
        title: &str,
        blocks: &[NativeBlock],
    ) -> Result<CreatedPage, PlatformError>;
}
