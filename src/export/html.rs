use std::fmt::Write;
use std::sync::LazyLock;

use regex::Regex;

use super::emphasis::{Emphasis, Segment, emphasis_spans, math_segments};
use super::latex::list_items;
use crate::document::{BlockKind, ContentBlock};

const HEAD: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="UTF-8">
<title>Document</title>
<script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>
<link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/highlight.js/11.8.0/styles/default.min.css">
<script src="https://cdnjs.cloudflare.com/ajax/libs/highlight.js/11.8.0/highlight.min.js"></script>
<style>
body { font-family: serif; max-width: 800px; margin: 0 auto; padding: 2rem; line-height: 1.6; }
h1, h2, h3 { color: #333; }
code { background-color: #f4f4f4; padding: 2px 4px; border-radius: 3px; }
pre { background-color: #f4f4f4; padding: 1rem; border-radius: 5px; overflow-x: auto; }
blockquote { border-left: 4px solid #ddd; margin: 0; padding-left: 1rem; font-style: italic; }
</style>
</head>
<body>
"#;

const TAIL: &str = "<script>hljs.highlightAll();</script>\n</body>\n</html>\n";

const MAX_HEADING_TAG: usize = 6;

static URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s<"]+"#).expect("URL pattern is valid"));

pub fn generate(blocks: &[ContentBlock]) -> String {
    let mut out = String::from(HEAD);
    for block in blocks {
        write_block(&mut out, block);
    }
    out.push_str(TAIL);
    out
}

fn write_block(out: &mut String, block: &ContentBlock) {
    match block.kind {
        BlockKind::Heading => {
            let level = block.heading_level().min(MAX_HEADING_TAG);
            let _ = writeln!(out, "<h{level}>{}</h{level}>", escape(block.heading_title()));
        }
        BlockKind::Math => {
            let _ = writeln!(out, "<p>{}</p>", math_block(&block.content));
        }
        BlockKind::Code => {
            let language = block.language.as_deref().unwrap_or("text");
            let _ = writeln!(
                out,
                "<pre><code class=\"language-{}\">{}</code></pre>",
                escape(language),
                escape(&block.content)
            );
        }
        BlockKind::Quote => {
            let _ = writeln!(out, "<blockquote>{}</blockquote>", inline(&block.content));
        }
        BlockKind::List => {
            out.push_str("<ul>\n");
            for item in list_items(&block.content) {
                let _ = writeln!(out, "<li>{}</li>", inline(item));
            }
            out.push_str("</ul>\n");
        }
        BlockKind::Raw => {
            let _ = writeln!(
                out,
                "<div class=\"raw-latex\">\\[{}\\]</div>",
                escape(&block.content)
            );
        }
        BlockKind::Text => {
            let _ = writeln!(out, "<p>{}</p>", inline(&block.content));
        }
    }
}

/// Escaped text with inline math, paired emphasis tags and links.
fn inline(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    for segment in math_segments(content) {
        match segment {
            Segment::Math(math) => {
                let _ = write!(out, "\\({}\\)", escape(math));
            }
            Segment::Dollar => out.push('$'),
            Segment::Text(text) => {
                for span in emphasis_spans(text) {
                    match span {
                        Emphasis::Plain(plain) => out.push_str(&link(&escape(plain))),
                        Emphasis::Bold(inner) => {
                            let _ = write!(out, "<strong>{}</strong>", link(&escape(inner)));
                        }
                        Emphasis::Italic(inner) => {
                            let _ = write!(out, "<em>{}</em>", link(&escape(inner)));
                        }
                    }
                }
            }
        }
    }
    out
}

fn link(escaped: &str) -> String {
    URL.replace_all(escaped, r#"<a href="$0">$0</a>"#).into_owned()
}

/// A block holding one span (or none) is a display equation; mixed content
/// wraps `$$..$$` as display and `$..$` as inline math, leaving unpaired
/// delimiters as text.
fn math_block(raw: &str) -> String {
    let content = raw.trim();
    let single = content
        .strip_prefix("$$")
        .and_then(|c| c.strip_suffix("$$"))
        .or_else(|| content.strip_prefix('$').and_then(|c| c.strip_suffix('$')))
        .filter(|inner| !inner.contains('$'));
    if let Some(math) = single.or_else(|| (!content.contains('$')).then_some(content)) {
        return format!("\\[{}\\]", escape(math));
    }

    let mut out = String::with_capacity(content.len());
    let mut rest = content;
    while let Some(start) = rest.find("$$") {
        let body = &rest[start + 2..];
        let Some(len) = body.find("$$") else {
            break;
        };
        inline_math(&mut out, &rest[..start]);
        let _ = write!(out, "\\[{}\\]", escape(&body[..len]));
        rest = &body[len + 2..];
    }
    inline_math(&mut out, rest);
    out
}

fn inline_math(out: &mut String, text: &str) {
    for segment in math_segments(text) {
        match segment {
            Segment::Math(math) => {
                let _ = write!(out, "\\({}\\)", escape(math));
            }
            Segment::Dollar => out.push('$'),
            Segment::Text(text) => out.push_str(&escape(text)),
        }
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
