//! Error taxonomy for the staging pipeline.
//!
//! Request-level failures ([`StagingError::InputInvalid`], [`StagingError::ValidationFailed`],
//! [`StagingError::Parse`], [`StagingError::TreeWalk`]) reject the whole request.
//! Per-destination failures ([`StagingError::RemoteFailure`], [`StagingError::IncompletePage`],
//! [`StagingError::Timeout`], [`StagingError::Unsupported`]) are rendered into failed draft
//! entries instead.

use std::time::Duration;

use crate::contract::CreatedPage;
use crate::document::NodeId;

/// Parser capability failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The document produced no block content at all.
    #[error("invalid or empty markdown")]
    Empty,
}

/// Structural problem found while walking a [`crate::document::DocumentTree`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WalkError {
    #[error("document tree has no root node")]
    EmptyTree,

    #[error("node {child} listed as child of {parent} does not exist")]
    DanglingChild { parent: NodeId, child: NodeId },

    /// A node was entered twice: the tree contains a cycle or a shared subtree.
    #[error("node {0} reached twice while walking the document tree")]
    Revisited(NodeId),
}

/// A single node that could not be turned into a block.
///
/// Logged and skipped by the mapper; never aborts a mapping pass.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MappingFault {
    #[error("expected {expected} node at {node}, found {found}")]
    UnexpectedKind {
        node: NodeId,
        expected: &'static str,
        found: &'static str,
    },

    #[error("list item {0} is not inside a list")]
    OrphanListItem(NodeId),

    #[error("heading {node} has unsupported level {level}")]
    HeadingLevel { node: NodeId, level: u8 },
}

/// Everything that can go wrong while staging a draft.
#[derive(Debug, thiserror::Error)]
pub enum StagingError {
    #[error("invalid request: {0}")]
    InputInvalid(String),

    #[error("destination validation failed:\n- {}", .0.join("\n- "))]
    ValidationFailed(Vec<String>),

    #[error("markdown invalid: {0}")]
    Parse(#[from] ParseError),

    #[error("document tree could not be walked: {0}")]
    TreeWalk(#[from] WalkError),

    #[error("{platform} request failed: {message}")]
    RemoteFailure { platform: String, message: String },

    /// The draft page exists on the platform but its content is incomplete.
    #[error("{platform} page {} created but not completed: {message}", .page.id)]
    IncompletePage {
        platform: String,
        page: CreatedPage,
        message: String,
    },

    #[error("{platform} request timed out after {}ms", .timeout.as_millis())]
    Timeout { platform: String, timeout: Duration },

    #[error("{0}")]
    Unsupported(String),
}
