//! Typed markdown document tree.
//!
//! The tree is an arena: every [`Node`] lives in one `Vec` and refers to its
//! parent and children by [`NodeId`]. The parser is the only producer; once
//! built, the tree is read-only and owned by the pipeline invocation that
//! parsed it.
//!
//! [`NodeKind`] is the closed set of kinds shared by the parser, the linter,
//! the inline text extractor and the block mapper. Adding a kind means
//! touching each of their dispatch `match`es.

use std::fmt;
use std::ops::Range;

use crate::error::WalkError;

/// Index of a node inside its [`DocumentTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    /// ATX or setext heading, level 1-6.
    Heading { level: u8 },
    Paragraph,
    /// A tight list has no paragraph-wrapped items.
    List {
        ordered: bool,
        start: Option<u64>,
        tight: bool,
    },
    ListItem,
    BlockQuote,
    FencedCode { language: String, literal: String },
    IndentedCode { literal: String },
    ThematicBreak,
    HtmlBlock { literal: String },
    /// Tables, footnote definitions and other containers with no block mapping.
    Other,

    Text { literal: String },
    Emphasis,
    Strong,
    Strikethrough,
    CodeSpan { literal: String },
    Link { destination: String, title: String },
    Image { destination: String, title: String },
    SoftBreak,
    HardBreak,
    InlineHtml { literal: String },
}

impl NodeKind {
    /// Stable short name, used in logs and fault messages.
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Document => "document",
            NodeKind::Heading { .. } => "heading",
            NodeKind::Paragraph => "paragraph",
            NodeKind::List { .. } => "list",
            NodeKind::ListItem => "list_item",
            NodeKind::BlockQuote => "blockquote",
            NodeKind::FencedCode { .. } => "fenced_code",
            NodeKind::IndentedCode { .. } => "indented_code",
            NodeKind::ThematicBreak => "thematic_break",
            NodeKind::HtmlBlock { .. } => "html_block",
            NodeKind::Other => "other",
            NodeKind::Text { .. } => "text",
            NodeKind::Emphasis => "emphasis",
            NodeKind::Strong => "strong",
            NodeKind::Strikethrough => "strikethrough",
            NodeKind::CodeSpan { .. } => "code_span",
            NodeKind::Link { .. } => "link",
            NodeKind::Image { .. } => "image",
            NodeKind::SoftBreak => "soft_break",
            NodeKind::HardBreak => "hard_break",
            NodeKind::InlineHtml { .. } => "inline_html",
        }
    }

    pub fn is_inline(&self) -> bool {
        matches!(
            self,
            NodeKind::Text { .. }
                | NodeKind::Emphasis
                | NodeKind::Strong
                | NodeKind::Strikethrough
                | NodeKind::CodeSpan { .. }
                | NodeKind::Link { .. }
                | NodeKind::Image { .. }
                | NodeKind::SoftBreak
                | NodeKind::HardBreak
                | NodeKind::InlineHtml { .. }
        )
    }

    /// Kinds whose children nest under them in the block model.
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            NodeKind::List { .. } | NodeKind::ListItem | NodeKind::BlockQuote
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    /// Byte range into the normalized source.
    pub span: Range<usize>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl Node {
    pub fn new(kind: NodeKind, span: Range<usize>) -> Self {
        Self {
            kind,
            span,
            parent: None,
            children: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkEvent {
    Enter,
    Exit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentTree {
    nodes: Vec<Node>,
}

impl DocumentTree {
    /// Wraps nodes built outside the parser. The root is the first node.
    ///
    /// No structural checks happen here; [`DocumentTree::walk`] reports
    /// dangling ids and cycles when it meets them.
    pub fn from_nodes(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn parent(&self, id: NodeId) -> Option<(NodeId, &Node)> {
        let parent = self.node(id)?.parent?;
        self.node(parent).map(|node| (parent, node))
    }

    /// Children of `id` in document order. Dangling ids are skipped.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.node(id)
            .map(|node| node.children.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(|&child| self.node(child).map(|node| (child, node)))
    }

    /// Depth-first walk from the root, reporting an `Enter` event before a
    /// node's children and an `Exit` event after them.
    ///
    /// Iterative, so arbitrarily deep documents cannot overflow the stack.
    /// Every node is entered at most once; meeting a node a second time or a
    /// child id with no node behind it aborts the walk.
    pub fn walk<F>(&self, mut visit: F) -> Result<(), WalkError>
    where
        F: FnMut(NodeId, &Node, WalkEvent),
    {
        let root = self.node(NodeId::ROOT).ok_or(WalkError::EmptyTree)?;
        let mut entered = vec![false; self.nodes.len()];
        entered[NodeId::ROOT.0] = true;
        visit(NodeId::ROOT, root, WalkEvent::Enter);

        // (node, index of the next child to enter)
        let mut stack: Vec<(NodeId, usize)> = vec![(NodeId::ROOT, 0)];
        while let Some(frame) = stack.last_mut() {
            let (id, next) = *frame;
            let node = &self.nodes[id.0];
            match node.children.get(next) {
                Some(&child) => {
                    frame.1 += 1;
                    let child_node = self
                        .node(child)
                        .ok_or(WalkError::DanglingChild { parent: id, child })?;
                    if std::mem::replace(&mut entered[child.0], true) {
                        return Err(WalkError::Revisited(child));
                    }
                    visit(child, child_node, WalkEvent::Enter);
                    stack.push((child, 0));
                }
                None => {
                    stack.pop();
                    visit(id, node, WalkEvent::Exit);
                }
            }
        }
        Ok(())
    }
}

/// Incremental builder used by the parser: nodes are opened, filled and
/// closed in document order.
pub(crate) struct TreeBuilder {
    nodes: Vec<Node>,
    open: Vec<NodeId>,
}

impl TreeBuilder {
    pub(crate) fn new(span: Range<usize>) -> Self {
        Self {
            nodes: vec![Node::new(NodeKind::Document, span)],
            open: vec![NodeId::ROOT],
        }
    }

    fn current(&self) -> NodeId {
        self.open.last().copied().unwrap_or(NodeId::ROOT)
    }

    fn attach(&mut self, kind: NodeKind, span: Range<usize>) -> NodeId {
        let parent = self.current();
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            span,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    pub(crate) fn open(&mut self, kind: NodeKind, span: Range<usize>) {
        let id = self.attach(kind, span);
        self.open.push(id);
    }

    /// Closes the innermost open node. The document root is never closed.
    pub(crate) fn close(&mut self) {
        if self.open.len() <= 1 {
            return;
        }
        let Some(id) = self.open.pop() else {
            return;
        };
        if matches!(self.nodes[id.0].kind, NodeKind::List { .. }) {
            let loose = self.nodes[id.0].children.iter().any(|item| {
                self.nodes[item.0]
                    .children
                    .iter()
                    .any(|c| self.nodes[c.0].kind == NodeKind::Paragraph)
            });
            if let NodeKind::List { tight, .. } = &mut self.nodes[id.0].kind {
                *tight = !loose;
            }
        }
    }

    pub(crate) fn leaf(&mut self, kind: NodeKind, span: Range<usize>) {
        self.attach(kind, span);
    }

    /// Adds text under the current node, merging it into a directly
    /// preceding text sibling.
    pub(crate) fn push_text(&mut self, text: &str, span: Range<usize>) {
        let parent = self.current();
        if let Some(&last) = self.nodes[parent.0].children.last() {
            let node = &mut self.nodes[last.0];
            if let NodeKind::Text { literal } = &mut node.kind {
                literal.push_str(text);
                node.span.end = node.span.end.max(span.end);
                return;
            }
        }
        self.leaf(
            NodeKind::Text {
                literal: text.to_owned(),
            },
            span,
        );
    }

    /// Appends raw content to the current node when it is a literal block
    /// (code or HTML). Returns `false` when the current node holds no literal.
    pub(crate) fn append_literal(&mut self, text: &str) -> bool {
        let current = self.current();
        match &mut self.nodes[current.0].kind {
            NodeKind::FencedCode { literal, .. }
            | NodeKind::IndentedCode { literal }
            | NodeKind::HtmlBlock { literal } => {
                literal.push_str(text);
                true
            }
            _ => false,
        }
    }

    pub(crate) fn finish(self) -> DocumentTree {
        DocumentTree { nodes: self.nodes }
    }
}
