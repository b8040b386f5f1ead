//! Style and hygiene checks over a parsed document.
//!
//! Rules are looked up per node kind and applied on entry during one
//! depth-first walk, so warnings come out in document order. A rule never
//! fails: it either reports warnings for its node or nothing. The only error
//! the linter surfaces is a malformed tree.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::document::{DocumentTree, Node, NodeKind, WalkEvent};
use crate::error::WalkError;
use crate::line_index::LineIndex;

/// A single lint finding, serialized in the `{"Line": .., "Message": ..}` wire shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LintWarning {
    #[serde(rename = "Line")]
    pub line: usize,
    #[serde(rename = "Message")]
    pub message: String,
}

impl LintWarning {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

static MISSING_HASH_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#{1,6}[^\s#]").expect("valid regex"));
static TRAILING_HASHES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#{1,6}.*[^#]\s*#+$").expect("valid regex"));
static UNCLOSED_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[^\]]+\]\([^)]+$").expect("valid regex"));

type Rule = fn(&Node, &LineIndex, &mut Vec<LintWarning>);

fn rule_for(kind: &NodeKind) -> Option<Rule> {
    match kind {
        NodeKind::Heading { .. } => Some(check_heading),
        NodeKind::List { .. } => Some(check_list),
        NodeKind::Text { .. } => Some(check_text),
        NodeKind::Link { .. } => Some(check_link),
        _ => None,
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct MarkdownLinter;

impl MarkdownLinter {
    pub fn lint(&self, tree: &DocumentTree, source: &str) -> Result<Vec<LintWarning>, WalkError> {
        let lines = LineIndex::new(source);
        let mut warnings = Vec::new();

        tree.walk(|_, node, event| {
            if event != WalkEvent::Enter {
                return;
            }
            if let Some(rule) = rule_for(&node.kind) {
                rule(node, &lines, &mut warnings);
            }
        })
        .inspect_err(|e| error!(error = %e, "[LINT] Document tree could not be walked"))?;

        for warning in &warnings {
            debug!(line = warning.line, message = %warning.message, "[LINT] Warning");
        }
        info!(warnings = warnings.len(), "[LINT] Lint pass complete");
        Ok(warnings)
    }
}

fn check_heading(node: &Node, lines: &LineIndex, out: &mut Vec<LintWarning>) {
    if let NodeKind::Heading { level } = node.kind {
        if level > 3 {
            out.push(LintWarning::new(
                lines.line_of(node.span.start),
                "Avoid using deeply nested headings (h4 or deeper)",
            ));
        }
    }
}

fn check_list(node: &Node, lines: &LineIndex, out: &mut Vec<LintWarning>) {
    if let NodeKind::List { tight: false, .. } = node.kind {
        out.push(LintWarning::new(
            lines.line_of(node.span.start),
            "Loose lists may reduce readability",
        ));
    }
}

fn check_text(node: &Node, lines: &LineIndex, out: &mut Vec<LintWarning>) {
    let NodeKind::Text { literal } = &node.kind else {
        return;
    };
    let line = lines.line_of(node.span.start);

    if literal.contains("TODO") {
        out.push(LintWarning::new(line, "Contains unfinished content (TODO)"));
    }
    if literal.contains("  ") {
        out.push(LintWarning::new(line, "Avoid multiple consecutive spaces"));
    }
    if literal.matches('*').count() % 2 == 1 {
        out.push(LintWarning::new(line, "Unclosed italic/bold formatting"));
    }
    if MISSING_HASH_SPACE.is_match(literal) {
        out.push(LintWarning::new(line, "Missing space after hash in heading"));
    }
    if TRAILING_HASHES.is_match(literal) {
        out.push(LintWarning::new(line, "Avoid trailing '#' in heading"));
    }
    if UNCLOSED_LINK.is_match(literal) {
        out.push(LintWarning::new(
            line,
            "Malformed link (missing closing parenthesis)",
        ));
    }
}

fn check_link(node: &Node, lines: &LineIndex, out: &mut Vec<LintWarning>) {
    if let NodeKind::Link { destination, .. } = &node.kind {
        if !destination.starts_with("http") {
            out.push(LintWarning::new(
                lines.line_of(node.span.start),
                "Link does not have a valid URL scheme",
            ));
        }
    }
}
