use crate::error::ModelResult;
use serde::{Deserialize, Serialize};

/// Inline content inside a block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Inline {
    Text {
        text: String,
    },
    Link {
        href: String,
        #[serde(default)]
        content: Vec<Inline>,
    },
    /// Inline kinds this client does not know; contribute no text.
    #[serde(other)]
    Unknown,
}

impl Inline {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }
}

/// Kind-specific payload of a block, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BlockKind {
    Paragraph {
        #[serde(default)]
        content: Vec<Inline>,
    },
    Heading {
        #[serde(default = "default_heading_level")]
        level: u8,
        #[serde(default)]
        content: Vec<Inline>,
    },
    BulletListItem {
        #[serde(default)]
        content: Vec<Inline>,
    },
    NumberedListItem {
        #[serde(default)]
        content: Vec<Inline>,
    },
    CheckListItem {
        #[serde(default)]
        checked: bool,
        #[serde(default)]
        content: Vec<Inline>,
    },
    Quote {
        #[serde(default)]
        content: Vec<Inline>,
    },
    Code {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        language: Option<String>,
        #[serde(default)]
        content: String,
    },
    Image {
        #[serde(default)]
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
    },
    /// Rows of cells; each cell holds inline content.
    Table {
        #[serde(default)]
        rows: Vec<Vec<Vec<Inline>>>,
    },
    Divider,
    /// Block kinds this client does not know. Their children are still
    /// walked.
    #[serde(other)]
    Unknown,
}

fn default_heading_level() -> u8 {
    1
}

/// One node of the block tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(flatten)]
    pub kind: BlockKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Block>,
}

impl Block {
    pub fn new(kind: BlockKind) -> Self {
        Self {
            id: None,
            kind,
            children: Vec::new(),
        }
    }

    /// A paragraph holding a single text run.
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::new(BlockKind::Paragraph {
            content: vec![Inline::text(text)],
        })
    }

    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        Self::new(BlockKind::Heading {
            level,
            content: vec![Inline::text(text)],
        })
    }

    pub fn bullet(text: impl Into<String>) -> Self {
        Self::new(BlockKind::BulletListItem {
            content: vec![Inline::text(text)],
        })
    }

    pub fn with_children(mut self, children: Vec<Block>) -> Self {
        self.children = children;
        self
    }

    /// Text held by this block itself, excluding its children.
    pub fn own_text(&self) -> String {
        let mut out = String::new();
        match &self.kind {
            BlockKind::Paragraph { content }
            | BlockKind::Heading { content, .. }
            | BlockKind::BulletListItem { content }
            | BlockKind::NumberedListItem { content }
            | BlockKind::CheckListItem { content, .. }
            | BlockKind::Quote { content } => push_inline_text(content, &mut out),
            BlockKind::Code { content, .. } => out.push_str(content),
            BlockKind::Image { caption, .. } => {
                if let Some(caption) = caption {
                    out.push_str(caption);
                }
            }
            BlockKind::Table { rows } => {
                for (r, row) in rows.iter().enumerate() {
                    if r > 0 {
                        out.push('\n');
                    }
                    for (c, cell) in row.iter().enumerate() {
                        if c > 0 {
                            out.push('\t');
                        }
                        push_inline_text(cell, &mut out);
                    }
                }
            }
            BlockKind::Divider | BlockKind::Unknown => {}
        }
        out
    }

    /// Whether wiki links inside this block are real references. Code is
    /// quoted verbatim, so `[[...]]` there is just text.
    pub(crate) fn carries_links(&self) -> bool {
        !matches!(self.kind, BlockKind::Code { .. })
    }
}

fn push_inline_text(content: &[Inline], out: &mut String) {
    let mut stack: Vec<&Inline> = content.iter().rev().collect();
    while let Some(inline) = stack.pop() {
        match inline {
            Inline::Text { text } => out.push_str(text),
            Inline::Link { content, .. } => stack.extend(content.iter().rev()),
            Inline::Unknown => {}
        }
    }
}

/// A decrypted document body: the top-level block list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentBody {
    pub blocks: Vec<Block>,
}

impl DocumentBody {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    /// Parses a plaintext body.
    pub fn from_json(bytes: &[u8]) -> ModelResult<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn to_json(&self) -> ModelResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Visits every block depth-first in document order.
    pub fn walk(&self) -> impl Iterator<Item = &Block> {
        let mut stack: Vec<&Block> = self.blocks.iter().rev().collect();
        std::iter::from_fn(move || {
            let block = stack.pop()?;
            stack.extend(block.children.iter().rev());
            Some(block)
        })
    }

    /// All text in the document, one line per non-empty block.
    pub fn plain_text(&self) -> String {
        self.walk()
            .map(Block::own_text)
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}
