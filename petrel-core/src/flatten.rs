//! Block tree to native block conversion.

use tracing::warn;

use crate::blocks::TargetBlock;
use crate::native::NativeBlock;

/// Converts mapped blocks into native blocks, preserving sibling order at
/// every level. Each parent is emitted once, carrying its flattened
/// children in its own children field.
pub fn flatten_block_tree(blocks: &[TargetBlock]) -> Vec<NativeBlock> {
    blocks
        .iter()
        .map(|block| {
            let mut native = NativeBlock::from_target(&block.kind, &block.text);
            if !block.children.is_empty() {
                let children = flatten_block_tree(&block.children);
                if let Err(dropped) = native.set_children(children) {
                    warn!(
                        block = native.type_name(),
                        dropped = dropped.len(),
                        "[FLATTEN] Block cannot hold children; nested blocks dropped"
                    );
                }
            }
            native
        })
        .collect()
}
