//! Built-in document templates.

use super::types::{BlockId, BlockKind, ContentBlock, Document};

/// Heading text of the blank template, ignored when deriving file names.
pub const PLACEHOLDER_TITLE: &str = "Document Title";

#[derive(Debug, Clone, Copy)]
pub struct TemplateBlock {
    pub kind: BlockKind,
    pub content: &'static str,
    pub language: Option<&'static str>,
}

const fn block(kind: BlockKind, content: &'static str) -> TemplateBlock {
    TemplateBlock {
        kind,
        content,
        language: None,
    }
}

const fn code(content: &'static str, language: &'static str) -> TemplateBlock {
    TemplateBlock {
        kind: BlockKind::Code,
        content,
        language: Some(language),
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Template {
    pub name: &'static str,
    pub description: &'static str,
    pub blocks: &'static [TemplateBlock],
}

impl Template {
    /// Build a fresh document with sequential ids.
    pub fn instantiate(&self) -> Document {
        let blocks = self
            .blocks
            .iter()
            .zip(1..)
            .map(|(tb, id)| {
                let mut block = ContentBlock::new(BlockId(id), tb.kind, tb.content);
                block.language = tb.language.map(str::to_string);
                block
            })
            .collect();
        Document::new(self.name, blocks)
    }
}

const BUILTIN: &[Template] = &[
    Template {
        name: "Blank Document",
        description: "Start with an empty document",
        blocks: &[
            block(BlockKind::Heading, "# Document Title"),
            block(BlockKind::Text, "Start writing here"),
        ],
    },
    Template {
        name: "Academic Notes",
        description: "Mathematical notes and proofs",
        blocks: &[
            block(BlockKind::Heading, "# Course Notes"),
            block(BlockKind::Heading, "## Topic"),
            block(BlockKind::Text, "Key concepts:"),
            block(BlockKind::Math, "$\\int_{a}^{b} f(x) dx = F(b) - F(a)$"),
            block(BlockKind::Text, "Proof:"),
        ],
    },
    Template {
        name: "Resume",
        description: "Professional resume",
        blocks: &[
            block(BlockKind::Heading, "# Your Name"),
            block(BlockKind::Text, "email@example.com | (555) 123-4567"),
            block(BlockKind::Heading, "## Professional Summary"),
            block(BlockKind::Text, "Brief professional summary"),
            block(BlockKind::Heading, "## Experience"),
            block(BlockKind::Text, "**Job Title** - Company Name (Year - Year)"),
        ],
    },
    Template {
        name: "Code Documentation",
        description: "Documentation for a software project",
        blocks: &[
            block(BlockKind::Heading, "# Project Name"),
            block(BlockKind::Text, "Brief project description"),
            block(BlockKind::Heading, "## Installation"),
            code("git clone repo\ncd project\nnpm install", "bash"),
            block(BlockKind::Heading, "## Usage"),
            code(
                "const example = require('./example');\nexample.run();",
                "javascript",
            ),
        ],
    },
];

/// Immutable template registry, built once and passed by reference.
#[derive(Debug, Clone)]
pub struct TemplateSet {
    templates: Vec<Template>,
}

impl TemplateSet {
    pub fn builtin() -> Self {
        Self {
            templates: BUILTIN.to_vec(),
        }
    }

    pub fn all(&self) -> &[Template] {
        &self.templates
    }

    pub fn get(&self, index: usize) -> Option<&Template> {
        self.templates.get(index)
    }

    /// Case-insensitive lookup by name.
    pub fn find(&self, name: &str) -> Option<&Template> {
        self.templates
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name))
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl Default for TemplateSet {
    fn default() -> Self {
        Self::builtin()
    }
}
