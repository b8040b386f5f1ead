use petrel::notion::{
    append_children_body, inline_prefix, page_create_body, plan_batches,
    MAX_CHILDREN_PER_REQUEST,
};
use petrel_core::blocks::{BlockKind, TargetBlock};
use petrel_core::contract::MarkdownParser;
use petrel_core::flatten::flatten_block_tree;
use petrel_core::mapper::BlockMapper;
use petrel_core::native::NativeBlock;
use petrel_core::parser::PulldownParser;
use serde_json::json;

fn native(markdown: &str) -> Vec<NativeBlock> {
    let doc = PulldownParser
        .parse(markdown)
        .expect("markdown should parse");
    let blocks = BlockMapper
        .map(&doc.tree, &doc.source)
        .expect("mapping should succeed");
    flatten_block_tree(&blocks)
}

/// Levels of blocks in `blocks`, counting the array itself.
fn levels(blocks: &[NativeBlock]) -> usize {
    blocks
        .iter()
        .map(|b| 1 + levels(b.children()))
        .max()
        .unwrap_or(0)
}

fn widest(blocks: &[NativeBlock]) -> usize {
    blocks
        .iter()
        .map(|b| widest(b.children()))
        .fold(blocks.len(), usize::max)
}

fn count(blocks: &[NativeBlock]) -> usize {
    blocks.iter().map(|b| 1 + count(b.children())).sum()
}

/// The block lists of every request the client sends for `blocks`, in the
/// order it sends them.
fn requests(blocks: &[NativeBlock]) -> Vec<Vec<NativeBlock>> {
    let (first, rest) = blocks.split_at(inline_prefix(blocks));
    let mut sent = vec![first.to_vec()];
    let mut pending = vec![rest.to_vec()];
    while let Some(blocks) = pending.pop() {
        for batch in plan_batches(&blocks) {
            sent.push(batch.blocks);
            pending.extend(batch.deferred.into_iter().map(|(_, children)| children));
        }
    }
    sent
}

fn assert_within_limits(sent: &[Vec<NativeBlock>]) {
    for blocks in sent {
        assert!(levels(blocks) <= 3, "too deep: {blocks:?}");
        assert!(widest(blocks) <= MAX_CHILDREN_PER_REQUEST, "too wide");
    }
}

#[test]
fn page_body_targets_parent_with_title_and_children() {
    let blocks = flatten_block_tree(&[TargetBlock::new(BlockKind::Paragraph, "hello")]);

    let body = page_create_body("drafts-1", "Draft from Petrel", &blocks);

    assert_eq!(
        body,
        json!({
            "parent": {"page_id": "drafts-1"},
            "properties": {
                "title": {"title": [{"type": "text", "text": {"content": "Draft from Petrel"}}]}
            },
            "children": [
                {
                    "object": "block",
                    "type": "paragraph",
                    "paragraph": {"rich_text": [{"type": "text", "text": {"content": "hello"}}]}
                }
            ]
        })
    );
}

#[test]
fn append_body_wraps_children() {
    let blocks = flatten_block_tree(&[TargetBlock::new(BlockKind::Divider, "")]);
    assert_eq!(
        append_children_body(&blocks),
        json!({"children": [{"object": "block", "type": "divider", "divider": {}}]})
    );
}

#[test]
fn shallow_document_is_sent_with_the_page() {
    let blocks = native("# Title\n\n- a\n  - b\n    - c\n\nend\n");

    assert_eq!(inline_prefix(&blocks), blocks.len());
    assert_eq!(requests(&blocks).len(), 1);
}

#[test]
fn deep_list_is_split_to_two_nested_levels_per_request() {
    let blocks = native("- a\n  - b\n    - c\n      - d\n");
    assert_eq!(levels(&blocks), 4);

    assert_eq!(inline_prefix(&blocks), 0);
    let body = page_create_body("drafts-1", "t", &blocks[..inline_prefix(&blocks)]);
    assert_eq!(body["children"], json!([]));

    let batches = plan_batches(&blocks);
    assert_eq!(batches.len(), 1);
    assert!(batches[0].blocks[0].children().is_empty());
    assert_eq!(batches[0].deferred.len(), 1);
    assert_eq!(batches[0].deferred[0].0, 0);
    assert_eq!(batches[0].deferred[0].1[0].plain_text(), "b");

    let sent = requests(&blocks);
    assert_within_limits(&sent);
    assert_eq!(sent.iter().map(|b| count(b)).sum::<usize>(), 4);
}

#[test]
fn wide_sub_list_is_appended_in_batches() {
    let mut markdown = String::from("- parent\n");
    for i in 0..150 {
        markdown.push_str(&format!("  - item {i}\n"));
    }
    let blocks = native(&markdown);
    assert_eq!(widest(&blocks), 150);

    let sent = requests(&blocks);
    assert_within_limits(&sent);
    let sizes: Vec<_> = sent.iter().map(Vec::len).collect();
    assert_eq!(sizes, vec![0, 1, 100, 50]);
    assert_eq!(sent[2][0].plain_text(), "item 0");
    assert_eq!(sent[3][49].plain_text(), "item 149");
}

#[test]
fn long_documents_continue_after_the_first_hundred_blocks() {
    let markdown: String = (0..250).map(|i| format!("para {i}\n\n")).collect();
    let blocks = native(&markdown);

    assert_eq!(inline_prefix(&blocks), MAX_CHILDREN_PER_REQUEST);
    let sizes: Vec<_> = requests(&blocks).iter().map(Vec::len).collect();
    assert_eq!(sizes, vec![100, 100, 50]);
}
