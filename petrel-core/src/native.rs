//! Notion-native block model and its JSON wire shape.
//!
//! A [`NativeBlock`] serializes as
//! `{"object":"block","type":"<t>","<t>":{"rich_text":[...], ...}}`.
//! Only list items and quotes carry a `children` field, and it is omitted
//! from the JSON when empty.

use serde::{Deserialize, Serialize};

use crate::blocks::BlockKind;

/// Upper bound on the length of one rich-text item.
pub const MAX_RICH_TEXT_LEN: usize = 2000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RichText {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: TextContent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextContent {
    pub content: String,
}

impl RichText {
    pub fn plain(content: impl Into<String>) -> Self {
        Self {
            kind: "text".to_owned(),
            text: TextContent {
                content: content.into(),
            },
        }
    }
}

/// Splits `content` into rich-text items of at most [`MAX_RICH_TEXT_LEN`] characters.
pub fn rich_text(content: &str) -> Vec<RichText> {
    let mut items = Vec::new();
    let mut chunk = String::new();
    let mut chars = 0;
    for c in content.chars() {
        if chars == MAX_RICH_TEXT_LEN {
            items.push(RichText::plain(std::mem::take(&mut chunk)));
            chars = 0;
        }
        chunk.push(c);
        chars += 1;
    }
    if !chunk.is_empty() {
        items.push(RichText::plain(chunk));
    }
    items
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextBody {
    pub rich_text: Vec<RichText>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NestingBody {
    pub rich_text: Vec<RichText>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NativeBlock>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeBody {
    pub rich_text: Vec<RichText>,
    pub language: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmptyBody {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BlockContent {
    #[serde(rename = "heading_1")]
    Heading1 { heading_1: TextBody },
    #[serde(rename = "heading_2")]
    Heading2 { heading_2: TextBody },
    #[serde(rename = "heading_3")]
    Heading3 { heading_3: TextBody },
    #[serde(rename = "paragraph")]
    Paragraph { paragraph: TextBody },
    #[serde(rename = "bulleted_list_item")]
    BulletedListItem { bulleted_list_item: NestingBody },
    #[serde(rename = "numbered_list_item")]
    NumberedListItem { numbered_list_item: NestingBody },
    #[serde(rename = "quote")]
    Quote { quote: NestingBody },
    #[serde(rename = "code")]
    Code { code: CodeBody },
    #[serde(rename = "divider")]
    Divider { divider: EmptyBody },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeBlock {
    pub object: String,
    #[serde(flatten)]
    pub content: BlockContent,
}

impl NativeBlock {
    pub fn new(content: BlockContent) -> Self {
        Self {
            object: "block".to_owned(),
            content,
        }
    }

    /// Native block for a mapped block kind and its text, without children.
    pub fn from_target(kind: &BlockKind, text: &str) -> Self {
        let text_body = || TextBody {
            rich_text: rich_text(text),
        };
        let nesting_body = || NestingBody {
            rich_text: rich_text(text),
            children: Vec::new(),
        };
        let content = match kind {
            BlockKind::Heading1 => BlockContent::Heading1 {
                heading_1: text_body(),
            },
            BlockKind::Heading2 => BlockContent::Heading2 {
                heading_2: text_body(),
            },
            BlockKind::Heading3 => BlockContent::Heading3 {
                heading_3: text_body(),
            },
            BlockKind::Paragraph => BlockContent::Paragraph {
                paragraph: text_body(),
            },
            BlockKind::BulletedItem => BlockContent::BulletedListItem {
                bulleted_list_item: nesting_body(),
            },
            BlockKind::NumberedItem => BlockContent::NumberedListItem {
                numbered_list_item: nesting_body(),
            },
            BlockKind::Quote => BlockContent::Quote {
                quote: nesting_body(),
            },
            BlockKind::Code { language } => BlockContent::Code {
                code: CodeBody {
                    rich_text: rich_text(text),
                    language: normalize_language(language),
                },
            },
            BlockKind::Divider => BlockContent::Divider {
                divider: EmptyBody {},
            },
        };
        Self::new(content)
    }

    /// The `type` tag this block serializes with.
    pub fn type_name(&self) -> &'static str {
        match &self.content {
            BlockContent::Heading1 { .. } => "heading_1",
            BlockContent::Heading2 { .. } => "heading_2",
            BlockContent::Heading3 { .. } => "heading_3",
            BlockContent::Paragraph { .. } => "paragraph",
            BlockContent::BulletedListItem { .. } => "bulleted_list_item",
            BlockContent::NumberedListItem { .. } => "numbered_list_item",
            BlockContent::Quote { .. } => "quote",
            BlockContent::Code { .. } => "code",
            BlockContent::Divider { .. } => "divider",
        }
    }

    /// Plain text of this block's own rich text.
    pub fn plain_text(&self) -> String {
        let items: &[RichText] = match &self.content {
            BlockContent::Heading1 { heading_1: body }
            | BlockContent::Heading2 { heading_2: body }
            | BlockContent::Heading3 { heading_3: body }
            | BlockContent::Paragraph { paragraph: body } => body.rich_text.as_slice(),
            BlockContent::BulletedListItem {
                bulleted_list_item: body,
            }
            | BlockContent::NumberedListItem {
                numbered_list_item: body,
            }
            | BlockContent::Quote { quote: body } => body.rich_text.as_slice(),
            BlockContent::Code { code } => code.rich_text.as_slice(),
            BlockContent::Divider { .. } => &[],
        };
        items.iter().map(|item| item.text.content.as_str()).collect()
    }

    pub fn children(&self) -> &[NativeBlock] {
        match &self.content {
            BlockContent::BulletedListItem {
                bulleted_list_item: body,
            }
            | BlockContent::NumberedListItem {
                numbered_list_item: body,
            }
            | BlockContent::Quote { quote: body } => &body.children,
            _ => &[],
        }
    }

    /// Attaches children to a block kind that has a children field.
    /// Hands the children back when this kind cannot hold any.
    pub fn set_children(&mut self, children: Vec<NativeBlock>) -> Result<(), Vec<NativeBlock>> {
        match &mut self.content {
            BlockContent::BulletedListItem {
                bulleted_list_item: body,
            }
            | BlockContent::NumberedListItem {
                numbered_list_item: body,
            }
            | BlockContent::Quote { quote: body } => {
                body.children = children;
                Ok(())
            }
            _ => Err(children),
        }
    }

    /// Detaches and returns this block's children.
    pub fn take_children(&mut self) -> Vec<NativeBlock> {
        match &mut self.content {
            BlockContent::BulletedListItem {
                bulleted_list_item: body,
            }
            | BlockContent::NumberedListItem {
                numbered_list_item: body,
            }
            | BlockContent::Quote { quote: body } => std::mem::take(&mut body.children),
            _ => Vec::new(),
        }
    }
}

const SUPPORTED_LANGUAGES: &[&str] = &[
    "abap", "arduino", "bash", "basic", "c", "clojure", "coffeescript", "c++", "c#", "css",
    "dart", "diff", "docker", "elixir", "elm", "erlang", "flow", "fortran", "f#", "gherkin",
    "glsl", "go", "graphql", "groovy", "haskell", "html", "java", "javascript", "json", "julia",
    "kotlin", "latex", "less", "lisp", "livescript", "lua", "makefile", "markdown", "markup",
    "matlab", "mermaid", "nix", "objective-c", "ocaml", "pascal", "perl", "php", "plain text",
    "powershell", "prolog", "protobuf", "python", "r", "reason", "ruby", "rust", "sass", "scala",
    "scheme", "scss", "shell", "sql", "swift", "typescript", "vb.net", "verilog", "vhdl",
    "visual basic", "webassembly", "xml", "yaml",
];

/// Maps a fenced-code info string onto the platform's language vocabulary.
/// Unknown or empty languages become `plain text`.
pub fn normalize_language(language: &str) -> String {
    let lower = language.trim().to_ascii_lowercase();
    let canonical = match lower.as_str() {
        "rs" => "rust",
        "py" | "python3" => "python",
        "js" | "jsx" | "node" => "javascript",
        "ts" | "tsx" => "typescript",
        "sh" | "zsh" | "console" => "shell",
        "yml" => "yaml",
        "golang" => "go",
        "cpp" | "cxx" | "hpp" => "c++",
        "cs" | "csharp" => "c#",
        "fs" | "fsharp" => "f#",
        "rb" => "ruby",
        "kt" | "kts" => "kotlin",
        "md" => "markdown",
        "dockerfile" => "docker",
        "objc" => "objective-c",
        "ps1" | "pwsh" => "powershell",
        "proto" => "protobuf",
        "tf" | "hcl" | "toml" | "ini" | "text" | "txt" | "plaintext" | "" => "plain text",
        other if SUPPORTED_LANGUAGES.contains(&other) => other,
        _ => "plain text",
    };
    canonical.to_owned()
}
