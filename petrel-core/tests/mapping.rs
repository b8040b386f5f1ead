use petrel_core::blocks::{BlockKind, TargetBlock};
use petrel_core::contract::MarkdownParser;
use petrel_core::document::{DocumentTree, Node, NodeId, NodeKind};
use petrel_core::error::WalkError;
use petrel_core::flatten::flatten_block_tree;
use petrel_core::mapper::BlockMapper;
use petrel_core::native::{normalize_language, NativeBlock, MAX_RICH_TEXT_LEN};
use petrel_core::parser::PulldownParser;
use serde_json::json;

fn map(markdown: &str) -> Vec<TargetBlock> {
    let doc = PulldownParser
        .parse(markdown)
        .expect("markdown should parse");
    BlockMapper
        .map(&doc.tree, &doc.source)
        .expect("mapping should succeed")
}

fn block(kind: BlockKind, text: &str) -> TargetBlock {
    TargetBlock::new(kind, text)
}

#[test]
fn headings_clamp_to_three_levels() {
    let blocks = map("# A\n\n## B\n\n### C\n\n#### D\n\n###### F\n");
    assert_eq!(
        blocks,
        vec![
            block(BlockKind::Heading1, "A"),
            block(BlockKind::Heading2, "B"),
            block(BlockKind::Heading3, "C"),
            block(BlockKind::Heading3, "D"),
            block(BlockKind::Heading3, "F"),
        ]
    );
}

#[test]
fn list_items_follow_their_list_kind() {
    let blocks = map("1. one\n2. two\n\n- a\n- b\n");
    let kinds: Vec<_> = blocks.iter().map(|b| b.kind.clone()).collect();
    assert_eq!(
        kinds,
        vec![
            BlockKind::NumberedItem,
            BlockKind::NumberedItem,
            BlockKind::BulletedItem,
            BlockKind::BulletedItem,
        ]
    );
    assert_eq!(blocks[1].text, "two");
}

#[test]
fn nested_list_keeps_second_level_items_in_order() {
    let blocks = map("- a\n  - b\n    - c\n  - d\n");
    assert_eq!(
        blocks,
        vec![block(BlockKind::BulletedItem, "a").with_children(vec![
            block(BlockKind::BulletedItem, "b")
                .with_children(vec![block(BlockKind::BulletedItem, "c")]),
            block(BlockKind::BulletedItem, "d"),
        ])]
    );
}

#[test]
fn mixed_nesting_uses_inner_list_kind() {
    let blocks = map("- parent\n  1. first\n  2. second\n");
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].kind, BlockKind::BulletedItem);
    let child_kinds: Vec<_> = blocks[0].children.iter().map(|b| b.kind.clone()).collect();
    assert_eq!(
        child_kinds,
        vec![BlockKind::NumberedItem, BlockKind::NumberedItem]
    );
}

#[test]
fn quote_takes_its_leading_paragraph_as_text() {
    assert_eq!(map("> quoted text\n"), vec![block(BlockKind::Quote, "quoted text")]);

    let blocks = map("> first\n>\n> second\n");
    assert_eq!(
        blocks,
        vec![block(BlockKind::Quote, "first")
            .with_children(vec![block(BlockKind::Paragraph, "second")])]
    );
}

#[test]
fn loose_list_items_do_not_repeat_their_text() {
    let blocks = map("- a\n\n- b\n");
    assert_eq!(
        blocks,
        vec![
            block(BlockKind::BulletedItem, "a"),
            block(BlockKind::BulletedItem, "b"),
        ]
    );
}

#[test]
fn inline_formatting_is_reduced_to_plain_text() {
    let blocks = map("Hello **bold** and `code` [link](https://example.com)\nnext line\n");
    assert_eq!(
        blocks,
        vec![block(
            BlockKind::Paragraph,
            "Hello bold and code link next line"
        )]
    );
}

#[test]
fn code_blocks_and_dividers_are_mapped() {
    let blocks = map("```rust\nfn main() {}\n```\n\n---\n\n    indented\n");
    assert_eq!(
        blocks,
        vec![
            block(
                BlockKind::Code {
                    language: "rust".to_string()
                },
                "fn main() {}"
            ),
            block(BlockKind::Divider, ""),
            block(
                BlockKind::Code {
                    language: String::new()
                },
                "indented"
            ),
        ]
    );
}

#[test]
fn unmappable_nodes_are_skipped_and_mapping_continues() {
    // document
    // ├── list_item (no list parent)
    // ├── heading level 0
    // └── paragraph "kept"
    let mut root = Node::new(NodeKind::Document, 0..4);
    root.children = vec![NodeId(1), NodeId(2), NodeId(3)];
    let mut orphan = Node::new(NodeKind::ListItem, 0..1);
    orphan.parent = Some(NodeId(0));
    let mut heading = Node::new(NodeKind::Heading { level: 0 }, 1..2);
    heading.parent = Some(NodeId(0));
    let mut paragraph = Node::new(NodeKind::Paragraph, 2..4);
    paragraph.parent = Some(NodeId(0));
    paragraph.children = vec![NodeId(4)];
    let mut text = Node::new(
        NodeKind::Text {
            literal: "kept".to_string(),
        },
        2..4,
    );
    text.parent = Some(NodeId(3));
    let tree = DocumentTree::from_nodes(vec![root, orphan, heading, paragraph, text]);

    let blocks = BlockMapper.map(&tree, "abcd").expect("mapping should succeed");
    assert_eq!(blocks, vec![block(BlockKind::Paragraph, "kept")]);
}

#[test]
fn cyclic_tree_aborts_mapping() {
    let mut root = Node::new(NodeKind::Document, 0..1);
    root.children = vec![NodeId(1)];
    let mut quote = Node::new(NodeKind::BlockQuote, 0..1);
    quote.parent = Some(NodeId(0));
    quote.children = vec![NodeId(1)];
    let tree = DocumentTree::from_nodes(vec![root, quote]);

    assert_eq!(
        BlockMapper.map(&tree, "x"),
        Err(WalkError::Revisited(NodeId(1)))
    );
}

#[test]
fn flatten_preserves_order_and_attaches_children() {
    let blocks = map("# Title\n\n- a\n  - b\n  - c\n- d\n\n> quote\n>\n> inner\n\nend\n");
    let native = flatten_block_tree(&blocks);

    let top: Vec<_> = native.iter().map(|b| (b.type_name(), b.plain_text())).collect();
    assert_eq!(
        top,
        vec![
            ("heading_1", "Title".to_string()),
            ("bulleted_list_item", "a".to_string()),
            ("bulleted_list_item", "d".to_string()),
            ("quote", "quote".to_string()),
            ("paragraph", "end".to_string()),
        ]
    );

    let nested: Vec<_> = native[1].children().iter().map(NativeBlock::plain_text).collect();
    assert_eq!(nested, vec!["b".to_string(), "c".to_string()]);
    assert!(native[2].children().is_empty());
    assert_eq!(native[3].children()[0].plain_text(), "inner");
}

#[test]
fn three_level_list_flattens_into_nested_children() {
    let native = flatten_block_tree(&map("- a\n  - b\n    - c\n"));

    assert_eq!(native.len(), 1);
    let a = &native[0];
    assert_eq!(a.type_name(), "bulleted_list_item");
    assert_eq!(a.plain_text(), "a");
    assert_eq!(a.children().len(), 1);
    let b = &a.children()[0];
    assert_eq!(b.plain_text(), "b");
    assert_eq!(b.children().len(), 1);
    let c = &b.children()[0];
    assert_eq!(c.plain_text(), "c");
    assert!(c.children().is_empty());

    let wire = serde_json::to_value(a).expect("serializes");
    assert_eq!(
        wire["bulleted_list_item"]["children"][0]["bulleted_list_item"]["children"][0]["type"],
        json!("bulleted_list_item")
    );
}

#[test]
fn native_blocks_serialize_to_wire_shape() {
    let native = flatten_block_tree(&map("- a\n  - b\n\n---\n"));
    let value = serde_json::to_value(&native).unwrap();
    assert_eq!(
        value,
        json!([
            {
                "object": "block",
                "type": "bulleted_list_item",
                "bulleted_list_item": {
                    "rich_text": [{"type": "text", "text": {"content": "a"}}],
                    "children": [
                        {
                            "object": "block",
                            "type": "bulleted_list_item",
                            "bulleted_list_item": {
                                "rich_text": [{"type": "text", "text": {"content": "b"}}]
                            }
                        }
                    ]
                }
            },
            {"object": "block", "type": "divider", "divider": {}}
        ])
    );
}

#[test]
fn code_block_wire_shape_uses_normalized_language() {
    let native = flatten_block_tree(&map("```py\nprint(1)\n```\n"));
    let value = serde_json::to_value(&native[0]).unwrap();
    assert_eq!(
        value,
        json!({
            "object": "block",
            "type": "code",
            "code": {
                "rich_text": [{"type": "text", "text": {"content": "print(1)"}}],
                "language": "python"
            }
        })
    );
}

#[test]
fn long_text_is_split_into_rich_text_chunks() {
    let long = "x".repeat(MAX_RICH_TEXT_LEN * 2 + 10);
    let native = flatten_block_tree(&[block(BlockKind::Paragraph, &long)]);
    let value = serde_json::to_value(&native[0]).unwrap();
    let chunks = value["paragraph"]["rich_text"].as_array().unwrap();
    assert_eq!(chunks.len(), 3);
    assert_eq!(
        chunks[0]["text"]["content"].as_str().unwrap().len(),
        MAX_RICH_TEXT_LEN
    );
    assert_eq!(chunks[2]["text"]["content"].as_str().unwrap().len(), 10);
    assert_eq!(native[0].plain_text(), long);
}

#[test]
fn children_on_blocks_that_cannot_nest_are_dropped() {
    let paragraph = block(BlockKind::Paragraph, "p")
        .with_children(vec![block(BlockKind::Paragraph, "lost")]);
    let native = flatten_block_tree(&[paragraph]);
    assert_eq!(native.len(), 1);
    assert!(native[0].children().is_empty());
}

#[test]
fn languages_normalize_to_platform_vocabulary() {
    assert_eq!(normalize_language("rs"), "rust");
    assert_eq!(normalize_language("Python"), "python");
    assert_eq!(normalize_language(""), "plain text");
    assert_eq!(normalize_language("brainfudge"), "plain text");
    assert_eq!(normalize_language("go"), "go");
}

#[test]
fn native_blocks_round_trip_through_json() {
    let native = flatten_block_tree(&map("# T\n\n1. one\n   - inner\n\n> q\n"));
    let json = serde_json::to_string(&native).unwrap();
    let back: Vec<NativeBlock> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, native);
}
