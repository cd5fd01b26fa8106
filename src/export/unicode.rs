use super::emphasis::{Segment, math_segments};
use crate::document::{BlockKind, ContentBlock};
use crate::render::NotationRenderer;

pub fn generate(blocks: &[ContentBlock], renderer: &mut NotationRenderer) -> String {
    let parts: Vec<String> = blocks
        .iter()
        .map(|block| block_text(block, renderer))
        .collect();
    let mut out = parts.join("\n\n");
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

fn block_text(block: &ContentBlock, renderer: &mut NotationRenderer) -> String {
    match block.kind {
        BlockKind::Heading => renderer.render(block.heading_title()).text,
        BlockKind::Code => format!(
            "```{}\n{}\n```",
            block.language.as_deref().unwrap_or_default(),
            block.content
        ),
        BlockKind::Quote => quoted(&block.content),
        BlockKind::Math | BlockKind::Text | BlockKind::List | BlockKind::Raw => {
            renderer.render(&strip_math_delimiters(&block.content)).text
        }
    }
}

/// Prefix every line with a quote marker.
pub(super) fn quoted(content: &str) -> String {
    content
        .split('\n')
        .map(|line| format!("> {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Drop `$` delimiters around math spans; escaped dollars become literal.
fn strip_math_delimiters(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    for segment in math_segments(content.trim()) {
        match segment {
            Segment::Text(text) => out.push_str(&text.replace("$$", "")),
            Segment::Math(math) => out.push_str(math),
            Segment::Dollar => out.push('$'),
        }
    }
    out
}
