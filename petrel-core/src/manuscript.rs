//! High-level pipeline: validate → parse → lint → map → flatten → stage.
//!
//! [`ManuscriptService::stage_draft`] takes one draft request and stages it
//! as a new page in every requested destination:
//!   - Checks the request shape and every destination's ownership before
//!     touching any platform; one bad destination rejects the request
//!   - Parses and lints the markdown; lint warnings never block staging
//!   - Maps and flattens the document once; the native blocks are shared by
//!     every destination
//!   - Creates the draft pages concurrently, each call bounded by
//!     [`StagingConfig::remote_timeout`], and aggregates one entry per
//!     destination in request order
//!
//! # Error Handling
//! Request-level failures come back as a `fail` response with zero drafts
//! and the rendered error. A failing destination becomes a `fail` entry and
//! staging continues with the others.
//!
//! # Callable From
//! The CLI crate and the integration tests. Platforms are injected through
//! [`PlatformRegistry`], so tests drive the whole pipeline with mocks.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::config::StagingConfig;
use crate::contract::{CreatedPage, IncompletePage, MarkdownParser};
use crate::error::StagingError;
use crate::flatten::flatten_block_tree;
use crate::lint::{LintWarning, MarkdownLinter};
use crate::mapper::BlockMapper;
use crate::models::{
    CreateDraftRequest, DraftAction, DraftResultEntry, StagingResponse, ValidatedDestination,
};
use crate::native::NativeBlock;
use crate::parser::PulldownParser;
use crate::platform::PlatformRegistry;
use crate::validate::validate_destinations;

pub struct ManuscriptService {
    registry: PlatformRegistry,
    parser: Arc<dyn MarkdownParser>,
    linter: MarkdownLinter,
    mapper: BlockMapper,
    config: StagingConfig,
}

impl ManuscriptService {
    pub fn new(registry: PlatformRegistry, config: StagingConfig) -> Self {
        Self {
            registry,
            parser: Arc::new(PulldownParser),
            linter: MarkdownLinter,
            mapper: BlockMapper,
            config,
        }
    }

    pub fn with_parser(mut self, parser: Arc<dyn MarkdownParser>) -> Self {
        self.parser = parser;
        self
    }

    pub fn config(&self) -> &StagingConfig {
        &self.config
    }

    /// Stage `request` for `user_id`. Never fails: every outcome, including a
    /// rejected request, is described by the returned response.
    pub async fn stage_draft(&self, user_id: Uuid, request: &CreateDraftRequest) -> StagingResponse {
        let span = info_span!("stage_draft", request_id = %Uuid::new_v4(), user_id = %user_id);
        async {
            info!(
                destinations = request.destinations.len(),
                "[STAGE] Starting draft staging"
            );
            match self.try_stage(user_id, request).await {
                Ok(response) => {
                    info!(
                        status = ?response.status,
                        drafts = response.drafts.len(),
                        "[STAGE] Draft staging finished"
                    );
                    response
                }
                Err(e) => {
                    error!(error = %e, "[STAGE][ERROR] Draft request rejected");
                    StagingResponse::rejected(&e)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn try_stage(
        &self,
        user_id: Uuid,
        request: &CreateDraftRequest,
    ) -> Result<StagingResponse, StagingError> {
        request.check()?;

        let destinations = validate_destinations(&self.registry, user_id, &request.destinations)
            .await
            .into_result()?;

        let parsed = self.parser.parse(&request.markdown)?;

        let lint_warnings = self
            .linter
            .lint(&parsed.tree, &parsed.source)
            .unwrap_or_else(|e| {
                warn!(error = %e, "[STAGE] Lint pass failed; staging without warnings");
                Vec::new()
            });

        let blocks = flatten_block_tree(&self.mapper.map(&parsed.tree, &parsed.source)?);
        info!(
            blocks = blocks.len(),
            lint_warnings = lint_warnings.len(),
            "[STAGE] Document prepared"
        );

        let title = request.title_or(&self.config.default_title);
        let drafts = join_all(
            destinations
                .iter()
                .map(|d| self.stage_destination(d, title, &blocks, &lint_warnings)),
        )
        .await;

        Ok(StagingResponse::from_drafts(drafts))
    }

    async fn stage_destination(
        &self,
        destination: &ValidatedDestination,
        title: &str,
        blocks: &[NativeBlock],
        lint_warnings: &[LintWarning],
    ) -> DraftResultEntry {
        if destination.append {
            let e = StagingError::Unsupported(
                "append to existing page is not yet supported".to_owned(),
            );
            warn!(
                platform = %destination.platform,
                page_id = destination.page_id.as_deref().unwrap_or_default(),
                "[STAGE] Append requested; not supported"
            );
            return DraftResultEntry::failed(destination, DraftAction::Appended, &e, lint_warnings);
        }

        match self.create_draft_page(destination, title, blocks).await {
            Ok(page) => {
                info!(
                    platform = %destination.platform,
                    workspace_id = %destination.workspace_id,
                    page_id = %page.id,
                    "[STAGE] Draft page created"
                );
                DraftResultEntry::created(destination, page, lint_warnings)
            }
            Err(e) => {
                error!(
                    platform = %destination.platform,
                    workspace_id = %destination.workspace_id,
                    error = %e,
                    "[STAGE][ERROR] Draft page creation failed"
                );
                DraftResultEntry::failed(destination, DraftAction::Created, &e, lint_warnings)
            }
        }
    }

    async fn create_draft_page(
        &self,
        destination: &ValidatedDestination,
        title: &str,
        blocks: &[NativeBlock],
    ) -> Result<CreatedPage, StagingError> {
        let timeout = self.config.remote_timeout();
        let call = destination.creator.create_page(
            &destination.integration.access_token,
            &destination.integration.drafts_container_id,
            title,
            blocks,
        );
        match tokio::time::timeout(timeout, call).await {
            Ok(Ok(page)) => Ok(page),
            Ok(Err(e)) => match e.downcast::<IncompletePage>() {
                Ok(incomplete) => {
                    let IncompletePage { page, source } = *incomplete;
                    Err(StagingError::IncompletePage {
                        platform: destination.platform.clone(),
                        page,
                        message: source.to_string(),
                    })
                }
                Err(e) => Err(StagingError::RemoteFailure {
                    platform: destination.platform.clone(),
                    message: e.to_string(),
                }),
            },
            Err(_) => Err(StagingError::Timeout {
                platform: destination.platform.clone(),
                timeout,
            }),
        }
    }
}
