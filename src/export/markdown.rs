use super::unicode::quoted;
use crate::document::{BlockKind, ContentBlock};

pub fn generate(blocks: &[ContentBlock]) -> String {
    let parts: Vec<String> = blocks.iter().map(block_text).collect();
    let mut out = parts.join("\n\n");
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

fn block_text(block: &ContentBlock) -> String {
    match block.kind {
        BlockKind::Math => {
            let math = block.content.trim();
            if math.contains('$') {
                math.to_string()
            } else {
                format!("$$\n{math}\n$$")
            }
        }
        BlockKind::Code => format!(
            "```{}\n{}\n```",
            block.language.as_deref().unwrap_or_default(),
            block.content
        ),
        BlockKind::Quote => quoted(&block.content),
        BlockKind::Raw => format!("```latex\n{}\n```", block.content),
        BlockKind::Heading | BlockKind::List | BlockKind::Text => block.content.clone(),
    }
}
