//! Platform-neutral block model produced by the mapper.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKind {
    Heading1,
    Heading2,
    Heading3,
    Paragraph,
    BulletedItem,
    NumberedItem,
    Quote,
    Code { language: String },
    Divider,
}

impl BlockKind {
    /// Heading kind for a markdown level; levels past 3 clamp to `Heading3`.
    pub fn heading(level: u8) -> Option<Self> {
        match level {
            0 => None,
            1 => Some(BlockKind::Heading1),
            2 => Some(BlockKind::Heading2),
            _ => Some(BlockKind::Heading3),
        }
    }

    pub fn can_nest(&self) -> bool {
        matches!(
            self,
            BlockKind::BulletedItem | BlockKind::NumberedItem | BlockKind::Quote
        )
    }
}

/// A block with its nested blocks. Only kinds that can nest carry children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetBlock {
    pub kind: BlockKind,
    pub text: String,
    pub children: Vec<TargetBlock>,
}

impl TargetBlock {
    pub fn new(kind: BlockKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<TargetBlock>) -> Self {
        self.children = children;
        self
    }
}
