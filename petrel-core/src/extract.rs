//! Plain-text extraction from inline content.

use std::collections::HashSet;

use crate::document::{DocumentTree, NodeId, NodeKind};

/// Concatenates the plain text below `id` in document order.
///
/// Text and code span literals are copied verbatim, soft breaks become a
/// space and hard breaks a newline. Every other kind contributes only its
/// children, so emphasis markers and link destinations never leak into the
/// result.
pub fn extract_text(tree: &DocumentTree, id: NodeId) -> String {
    let mut out = String::new();
    collect_text(tree, id, &mut out);
    out
}

/// Text that introduces a list item or quote, and the paragraph it came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadingText {
    pub text: String,
    /// Set when the text was taken from a leading paragraph child, which the
    /// mapper must then not emit on its own.
    pub absorbed: Option<NodeId>,
}

/// Text of the leading content of a container node.
///
/// Inline children before the first block child are collected directly
/// (tight list items). If the container instead opens with a paragraph,
/// that paragraph's text is used and reported as absorbed.
pub fn leading_text(tree: &DocumentTree, id: NodeId) -> LeadingText {
    let mut text = String::new();
    for (child_id, child) in tree.children(id) {
        if child.kind.is_inline() {
            collect_text(tree, child_id, &mut text);
            continue;
        }
        if child.kind == NodeKind::Paragraph && text.trim().is_empty() {
            return LeadingText {
                text: extract_text(tree, child_id),
                absorbed: Some(child_id),
            };
        }
        break;
    }
    LeadingText {
        text,
        absorbed: None,
    }
}

fn collect_text(tree: &DocumentTree, id: NodeId, out: &mut String) {
    let mut seen = HashSet::new();
    let mut pending = vec![id];
    while let Some(current) = pending.pop() {
        if !seen.insert(current) {
            continue;
        }
        let Some(node) = tree.node(current) else {
            continue;
        };
        match &node.kind {
            NodeKind::Text { literal } | NodeKind::CodeSpan { literal } => out.push_str(literal),
            NodeKind::SoftBreak => out.push(' '),
            NodeKind::HardBreak => out.push('\n'),
            _ => pending.extend(node.children.iter().rev()),
        }
    }
}
