use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Version tag written into every persisted document.
pub const FORMAT_VERSION: &str = "1.0";

/// Character that introduces a heading level in block content.
pub const HEADING_MARKER: char = '#';

/// Stable identifier of a block within one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(pub u64);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The type tag of a content block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Heading,
    Text,
    Math,
    Code,
    Quote,
    List,
    #[serde(alias = "rawlatex")]
    Raw,
}

impl BlockKind {
    pub const ALL: [Self; 7] = [
        Self::Heading,
        Self::Text,
        Self::Math,
        Self::Code,
        Self::Quote,
        Self::List,
        Self::Raw,
    ];

    /// Short label shown next to the block in the editor pane.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Heading => "heading",
            Self::Text => "text",
            Self::Math => "math",
            Self::Code => "code",
            Self::Quote => "quote",
            Self::List => "list",
            Self::Raw => "raw",
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single unit of document content.
///
/// Blocks never nest; their order in the [`Document`] is their structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentBlock {
    pub id: BlockId,
    #[serde(rename = "type")]
    pub kind: BlockKind,
    pub content: String,
    /// Language tag, meaningful for code blocks only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Numbered sectioning, meaningful for headings only.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub numbered: bool,
    /// Last committed preview text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rendered: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rendered_at: Option<DateTime<Utc>>,
}

impl ContentBlock {
    pub fn new(id: BlockId, kind: BlockKind, content: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            content: content.into(),
            language: None,
            numbered: false,
            rendered: None,
            rendered_at: None,
        }
    }

    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Heading level derived from the content (see [`heading_level`]).
    pub fn heading_level(&self) -> usize {
        heading_level(&self.content)
    }

    /// Heading text with the level markers removed.
    pub fn heading_title(&self) -> &str {
        heading_title(&self.content)
    }
}

/// Count of leading heading markers, never less than 1.
///
/// Preview and every export target derive the level through this one
/// function so they cannot disagree.
pub fn heading_level(content: &str) -> usize {
    content
        .trim_start()
        .chars()
        .take_while(|c| *c == HEADING_MARKER)
        .count()
        .max(1)
}

/// Heading content with leading markers and surrounding whitespace removed.
pub fn heading_title(content: &str) -> &str {
    content
        .trim_start()
        .trim_start_matches(HEADING_MARKER)
        .trim()
}

/// A complete document as it is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub version: String,
    pub template: String,
    #[serde(rename = "content")]
    pub blocks: Vec<ContentBlock>,
    /// Substitution slots carried through load and save untouched.
    #[serde(default)]
    pub variables: BTreeMap<String, String>,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl Document {
    /// Create a document from already-identified blocks.
    pub fn new(template: impl Into<String>, blocks: Vec<ContentBlock>) -> Self {
        let now = Utc::now();
        Self {
            version: FORMAT_VERSION.to_string(),
            template: template.into(),
            blocks,
            variables: BTreeMap::new(),
            created: now,
            modified: now,
        }
    }

    /// Highest block id in use, if any.
    pub fn max_id(&self) -> Option<BlockId> {
        self.blocks.iter().map(|b| b.id).max()
    }

    /// Iterate heading blocks in document order.
    pub fn headings(&self) -> impl Iterator<Item = &ContentBlock> {
        self.blocks.iter().filter(|b| b.kind == BlockKind::Heading)
    }
}
