//! Document tree to [`TargetBlock`] mapping.
//!
//! The mapper walks the tree once with enter/exit events. List items and
//! quotes open a parent block on enter and close it on exit; every other
//! mapped block is attached to whichever parent is open, or to the
//! top-level result. Lists themselves never open a parent: their items
//! nest directly under the enclosing item or quote.
//!
//! A node that cannot be mapped is logged and skipped. Only a malformed
//! tree aborts the pass.

use std::collections::HashSet;

use tracing::{debug, error, info};

use crate::blocks::{BlockKind, TargetBlock};
use crate::document::{DocumentTree, Node, NodeId, NodeKind, WalkEvent};
use crate::error::{MappingFault, WalkError};
use crate::extract::{extract_text, leading_text};
use crate::line_index::LineIndex;

struct OpenParent {
    owner: NodeId,
    block: TargetBlock,
}

/// Per-call mapping state: open parents, absorbed paragraphs and the result.
#[derive(Default)]
pub struct MappingContext {
    stack: Vec<OpenParent>,
    absorbed: HashSet<NodeId>,
    result: Vec<TargetBlock>,
}

impl MappingContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_parent(&self) -> Option<&TargetBlock> {
        self.stack.last().map(|open| &open.block)
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn add_block(&mut self, block: TargetBlock) {
        match self.stack.last_mut() {
            Some(open) => open.block.children.push(block),
            None => self.result.push(block),
        }
    }

    pub fn push_parent(&mut self, owner: NodeId, block: TargetBlock) {
        self.stack.push(OpenParent { owner, block });
    }

    /// Closes the open parent owned by `owner` and attaches it to the next
    /// one down. Returns `false` when `owner` does not own the top entry.
    pub fn pop_parent(&mut self, owner: NodeId) -> bool {
        match self.stack.last() {
            Some(open) if open.owner == owner => {}
            _ => return false,
        }
        let Some(finished) = self.stack.pop() else {
            return false;
        };
        self.add_block(finished.block);
        true
    }

    fn absorb(&mut self, paragraph: NodeId) {
        self.absorbed.insert(paragraph);
    }

    fn is_absorbed(&self, paragraph: NodeId) -> bool {
        self.absorbed.contains(&paragraph)
    }

    pub fn finish(mut self) -> Vec<TargetBlock> {
        while let Some(open) = self.stack.pop() {
            self.add_block(open.block);
        }
        self.result
    }
}

type MapFn = fn(&DocumentTree, NodeId, &Node, &mut MappingContext) -> Result<(), MappingFault>;

fn mapper_for(kind: &NodeKind) -> Option<MapFn> {
    match kind {
        NodeKind::Document | NodeKind::List { .. } => Some(map_passthrough),
        NodeKind::Heading { .. } => Some(map_heading),
        NodeKind::Paragraph => Some(map_paragraph),
        NodeKind::ListItem => Some(map_list_item),
        NodeKind::BlockQuote => Some(map_quote),
        NodeKind::FencedCode { .. } | NodeKind::IndentedCode { .. } => Some(map_code),
        NodeKind::ThematicBreak => Some(map_divider),
        _ => None,
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct BlockMapper;

impl BlockMapper {
    pub fn map(&self, tree: &DocumentTree, source: &str) -> Result<Vec<TargetBlock>, WalkError> {
        info!("[MAP] Mapping document tree to blocks");
        let lines = LineIndex::new(source);
        let mut ctx = MappingContext::new();

        tree.walk(|id, node, event| match event {
            WalkEvent::Exit => {
                if node.kind.is_container() && ctx.pop_parent(id) {
                    debug!(node = %id, depth = ctx.depth(), "[MAP] Closed parent block");
                }
            }
            WalkEvent::Enter => {
                let Some(map_fn) = mapper_for(&node.kind) else {
                    return;
                };
                if let Err(fault) = map_fn(tree, id, node, &mut ctx) {
                    error!(
                        node = node.kind.name(),
                        line = lines.line_of(node.span.start),
                        error = %fault,
                        "[MAP] Skipping node that could not be mapped"
                    );
                }
            }
        })
        .inspect_err(|e| error!(error = %e, "[MAP] Document tree could not be walked"))?;

        let blocks = ctx.finish();
        info!(blocks = blocks.len(), "[MAP] Mapping complete");
        Ok(blocks)
    }
}

fn map_passthrough(
    _: &DocumentTree,
    _: NodeId,
    _: &Node,
    _: &mut MappingContext,
) -> Result<(), MappingFault> {
    Ok(())
}

fn map_heading(
    tree: &DocumentTree,
    id: NodeId,
    node: &Node,
    ctx: &mut MappingContext,
) -> Result<(), MappingFault> {
    let NodeKind::Heading { level } = node.kind else {
        return Err(MappingFault::UnexpectedKind {
            node: id,
            expected: "heading",
            found: node.kind.name(),
        });
    };
    let kind = BlockKind::heading(level).ok_or(MappingFault::HeadingLevel { node: id, level })?;
    ctx.add_block(TargetBlock::new(kind, extract_text(tree, id)));
    Ok(())
}

fn map_paragraph(
    tree: &DocumentTree,
    id: NodeId,
    _: &Node,
    ctx: &mut MappingContext,
) -> Result<(), MappingFault> {
    if ctx.is_absorbed(id) {
        return Ok(());
    }
    ctx.add_block(TargetBlock::new(BlockKind::Paragraph, extract_text(tree, id)));
    Ok(())
}

fn map_list_item(
    tree: &DocumentTree,
    id: NodeId,
    _: &Node,
    ctx: &mut MappingContext,
) -> Result<(), MappingFault> {
    let kind = match tree.parent(id) {
        Some((_, parent)) => match parent.kind {
            NodeKind::List { ordered: true, .. } => BlockKind::NumberedItem,
            NodeKind::List { ordered: false, .. } => BlockKind::BulletedItem,
            _ => return Err(MappingFault::OrphanListItem(id)),
        },
        None => return Err(MappingFault::OrphanListItem(id)),
    };
    open_container(tree, id, kind, ctx);
    Ok(())
}

fn map_quote(
    tree: &DocumentTree,
    id: NodeId,
    _: &Node,
    ctx: &mut MappingContext,
) -> Result<(), MappingFault> {
    open_container(tree, id, BlockKind::Quote, ctx);
    Ok(())
}

fn open_container(tree: &DocumentTree, id: NodeId, kind: BlockKind, ctx: &mut MappingContext) {
    let leading = leading_text(tree, id);
    if let Some(paragraph) = leading.absorbed {
        ctx.absorb(paragraph);
    }
    ctx.push_parent(id, TargetBlock::new(kind, leading.text));
}

fn map_code(
    _: &DocumentTree,
    id: NodeId,
    node: &Node,
    ctx: &mut MappingContext,
) -> Result<(), MappingFault> {
    let (language, literal) = match &node.kind {
        NodeKind::FencedCode { language, literal } => (language.clone(), literal),
        NodeKind::IndentedCode { literal } => (String::new(), literal),
        other => {
            return Err(MappingFault::UnexpectedKind {
                node: id,
                expected: "code block",
                found: other.name(),
            })
        }
    };
    let text = literal.strip_suffix('\n').unwrap_or(literal);
    ctx.add_block(TargetBlock::new(BlockKind::Code { language }, text));
    Ok(())
}

fn map_divider(
    _: &DocumentTree,
    _: NodeId,
    _: &Node,
    ctx: &mut MappingContext,
) -> Result<(), MappingFault> {
    ctx.add_block(TargetBlock::new(BlockKind::Divider, ""));
    Ok(())
}
