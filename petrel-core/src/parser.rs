//! Markdown parsing into a [`DocumentTree`], backed by `pulldown-cmark`.
//!
//! Input is normalized to `\n` line endings before parsing so that node
//! spans, line numbers and literal content agree with each other. Adjacent
//! text events are merged into one text node, so delimiter runs that did not
//! form emphasis (`Some *unterminated`) stay in a single literal.

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag};
use tracing::debug;

use crate::contract::MarkdownParser;
use crate::document::{DocumentTree, NodeKind, TreeBuilder};
use crate::error::ParseError;

/// A parsed document together with the normalized source its spans refer to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDocument {
    pub tree: DocumentTree,
    pub source: String,
}

/// CommonMark parser with strikethrough, tables and task lists enabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct PulldownParser;

impl MarkdownParser for PulldownParser {
    fn parse(&self, markdown: &str) -> Result<ParsedDocument, ParseError> {
        let source = normalize_line_endings(markdown);
        let tree = build_tree(&source);
        let block_count = tree.node(tree.root()).map_or(0, |root| root.children.len());
        if block_count == 0 {
            debug!("[PARSE] Document has no block content");
            return Err(ParseError::Empty);
        }
        debug!(
            nodes = tree.len(),
            blocks = block_count,
            "[PARSE] Built document tree"
        );
        Ok(ParsedDocument { tree, source })
    }
}

pub fn normalize_line_endings(raw: &str) -> String {
    raw.replace("\r\n", "\n").replace('\r', "\n")
}

fn build_tree(source: &str) -> DocumentTree {
    let options =
        Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TABLES | Options::ENABLE_TASKLISTS;
    let mut builder = TreeBuilder::new(0..source.len());

    for (event, span) in Parser::new_ext(source, options).into_offset_iter() {
        match event {
            Event::Start(tag) => builder.open(kind_for_tag(tag), span),
            Event::End(_) => builder.close(),
            Event::Text(text) => {
                if !builder.append_literal(&text) {
                    builder.push_text(&text, span);
                }
            }
            Event::Html(html) => {
                if !builder.append_literal(&html) {
                    builder.leaf(
                        NodeKind::InlineHtml {
                            literal: html.into_string(),
                        },
                        span,
                    );
                }
            }
            Event::InlineHtml(html) => builder.leaf(
                NodeKind::InlineHtml {
                    literal: html.into_string(),
                },
                span,
            ),
            Event::Code(code) => builder.leaf(
                NodeKind::CodeSpan {
                    literal: code.into_string(),
                },
                span,
            ),
            Event::SoftBreak => builder.leaf(NodeKind::SoftBreak, span),
            Event::HardBreak => builder.leaf(NodeKind::HardBreak, span),
            Event::Rule => builder.leaf(NodeKind::ThematicBreak, span),
            // Task markers, footnote references and math carry no text we stage.
            _ => {}
        }
    }
    builder.finish()
}

fn kind_for_tag(tag: Tag<'_>) -> NodeKind {
    match tag {
        Tag::Paragraph => NodeKind::Paragraph,
        Tag::Heading { level, .. } => NodeKind::Heading { level: level as u8 },
        Tag::BlockQuote(_) => NodeKind::BlockQuote,
        Tag::CodeBlock(CodeBlockKind::Fenced(info)) => NodeKind::FencedCode {
            language: info.split_whitespace().next().unwrap_or_default().to_owned(),
            literal: String::new(),
        },
        Tag::CodeBlock(CodeBlockKind::Indented) => NodeKind::IndentedCode {
            literal: String::new(),
        },
        Tag::HtmlBlock => NodeKind::HtmlBlock {
            literal: String::new(),
        },
        Tag::List(start) => NodeKind::List {
            ordered: start.is_some(),
            start,
            tight: true,
        },
        Tag::Item => NodeKind::ListItem,
        Tag::Emphasis => NodeKind::Emphasis,
        Tag::Strong => NodeKind::Strong,
        Tag::Strikethrough => NodeKind::Strikethrough,
        Tag::Link {
            dest_url, title, ..
        } => NodeKind::Link {
            destination: dest_url.into_string(),
            title: title.into_string(),
        },
        Tag::Image {
            dest_url, title, ..
        } => NodeKind::Image {
            destination: dest_url.into_string(),
            title: title.into_string(),
        },
        _ => NodeKind::Other,
    }
}
