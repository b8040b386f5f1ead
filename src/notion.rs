#![doc = "Notion page creation over the public REST API."]
//
//! # Notion client (CLI <-> Core)
//!
//! Implements the core's [`PageCreator`] against the Notion API with
//! `reqwest`. Notion caps every request at [`MAX_CHILDREN_PER_REQUEST`]
//! items per `children` array and [`MAX_NESTING_PER_REQUEST`] levels of
//! nested children, so a draft is written in steps:
//!
//! - `POST /pages` creates the page with the leading blocks that fit whole.
//! - `PATCH /blocks/{id}/children` appends the rest in batches. A block too
//!   deep or too wide travels without its children, which are appended to it
//!   afterwards using the block id from the response.
//!
//! A failure after the page exists is reported as an [`IncompletePage`].
//!
//! The request plan and bodies are built by plain functions so their shape
//! can be tested without a network.

use std::time::Duration;

use async_trait::async_trait;
use petrel_core::contract::{CreatedPage, IncompletePage, PageCreator, PlatformError};
use petrel_core::native::{rich_text, NativeBlock};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::load_config::NotionSection;

pub const MAX_CHILDREN_PER_REQUEST: usize = 100;
/// Levels of nested `children` allowed below the blocks of one request.
pub const MAX_NESTING_PER_REQUEST: usize = 2;

pub struct NotionClient {
    http: reqwest::Client,
    api_base: String,
    version: String,
}

#[derive(Debug, Deserialize)]
struct PageResponse {
    id: String,
    #[serde(default)]
    url: String,
}

#[derive(Debug, Deserialize)]
struct AppendResponse {
    #[serde(default)]
    results: Vec<BlockRef>,
}

#[derive(Debug, Deserialize)]
struct BlockRef {
    id: String,
}

impl NotionClient {
    pub fn new(config: &NotionSection) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        tracing::info!(
            api_base = %config.api_base,
            version = %config.version,
            timeout_secs = config.timeout_secs,
            "Initialized NotionClient"
        );
        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_owned(),
            version: config.version.clone(),
        })
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        access_token: &str,
        body: &Value,
    ) -> Result<reqwest::Response, PlatformError> {
        let response = request
            .bearer_auth(access_token)
            .header("Notion-Version", &self.version)
            .json(body)
            .send()
            .await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let detail = response.text().await.unwrap_or_default();
        tracing::error!(%status, detail = %detail, "Notion API returned an error");
        Err(format!("Notion API returned {status}: {detail}").into())
    }

    /// Appends `blocks` under `parent_id`, then the deferred children of
    /// every batch under the blocks they belong to.
    async fn append_blocks(
        &self,
        access_token: &str,
        parent_id: &str,
        blocks: &[NativeBlock],
    ) -> Result<(), PlatformError> {
        let mut pending = vec![(parent_id.to_owned(), blocks.to_vec())];
        while let Some((parent_id, blocks)) = pending.pop() {
            for batch in plan_batches(&blocks) {
                tracing::debug!(
                    parent_id = %parent_id,
                    blocks = batch.blocks.len(),
                    deferred = batch.deferred.len(),
                    "Appending block batch"
                );
                let response = self
                    .send(
                        self.http
                            .patch(format!("{}/blocks/{}/children", self.api_base, parent_id)),
                        access_token,
                        &append_children_body(&batch.blocks),
                    )
                    .await?;
                let appended: AppendResponse = response.json().await?;
                for (index, children) in batch.deferred {
                    let block = appended.results.get(index).ok_or_else(|| {
                        format!("Notion API returned no id for appended block {index}")
                    })?;
                    pending.push((block.id.clone(), children));
                }
            }
        }
        Ok(())
    }
}

/// Whether `block` with its whole subtree fits in one request, allowing
/// `levels` more levels of children below it.
fn fits_in_request(block: &NativeBlock, levels: usize) -> bool {
    let children = block.children();
    children.is_empty()
        || (levels > 0
            && children.len() <= MAX_CHILDREN_PER_REQUEST
            && children
                .iter()
                .all(|child| fits_in_request(child, levels - 1)))
}

/// Blocks for one append request.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockBatch {
    pub blocks: Vec<NativeBlock>,
    /// Children held back from `blocks[index]`, to be appended once that
    /// block has an id.
    pub deferred: Vec<(usize, Vec<NativeBlock>)>,
}

/// Splits `blocks` into append batches of at most
/// [`MAX_CHILDREN_PER_REQUEST`] blocks, stripping the children of every
/// block whose subtree would break a request limit.
pub fn plan_batches(blocks: &[NativeBlock]) -> Vec<BlockBatch> {
    blocks
        .chunks(MAX_CHILDREN_PER_REQUEST)
        .map(|chunk| {
            let mut deferred = Vec::new();
            let blocks: Vec<NativeBlock> = chunk
                .iter()
                .enumerate()
                .map(|(index, block)| {
                    let mut block = block.clone();
                    if !fits_in_request(&block, MAX_NESTING_PER_REQUEST) {
                        deferred.push((index, block.take_children()));
                    }
                    block
                })
                .collect();
            BlockBatch { blocks, deferred }
        })
        .collect()
}

/// Number of leading blocks sent with the page creation itself. Page
/// creation returns no block ids, so only blocks that fit whole qualify.
pub fn inline_prefix(blocks: &[NativeBlock]) -> usize {
    blocks
        .iter()
        .take(MAX_CHILDREN_PER_REQUEST)
        .take_while(|block| fits_in_request(block, MAX_NESTING_PER_REQUEST))
        .count()
}

/// Body of the page-creation request: a child page of `parent_id` titled
/// `title`, holding `children`.
pub fn page_create_body(parent_id: &str, title: &str, children: &[NativeBlock]) -> Value {
    json!({
        "parent": { "page_id": parent_id },
        "properties": {
            "title": { "title": rich_text(title) }
        },
        "children": children,
    })
}

pub fn append_children_body(children: &[NativeBlock]) -> Value {
    json!({ "children": children })
}

#[async_trait]
impl PageCreator for NotionClient {
    async fn create_page(
        &self,
        access_token: &str,
        parent_id: &str,
        title: &str,
        blocks: &[NativeBlock],
    ) -> Result<CreatedPage, PlatformError> {
        let (first, rest) = blocks.split_at(inline_prefix(blocks));
        tracing::info!(
            parent_id,
            blocks = blocks.len(),
            inline = first.len(),
            "Creating Notion draft page"
        );

        let response = self
            .send(
                self.http.post(format!("{}/pages", self.api_base)),
                access_token,
                &page_create_body(parent_id, title, first),
            )
            .await?;
        let page: PageResponse = response.json().await?;
        let page = CreatedPage {
            id: page.id,
            url: page.url,
        };

        if let Err(source) = self.append_blocks(access_token, &page.id, rest).await {
            tracing::error!(
                page_id = %page.id,
                error = %source,
                "Notion draft page left incomplete"
            );
            return Err(Box::new(IncompletePage { page, source }));
        }

        tracing::info!(page_id = %page.id, "Notion draft page created");
        Ok(page)
    }
}
