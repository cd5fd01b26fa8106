use std::fmt::Write;
use std::sync::LazyLock;

use regex::Regex;

use super::emphasis::{Emphasis, Segment, emphasis_spans, math_segments};
use crate::document::{BlockKind, ContentBlock};

const PREAMBLE: &str = "\\documentclass{article}
\\usepackage{amsmath}
\\usepackage{amsfonts}
\\usepackage{amssymb}
\\usepackage[utf8]{inputenc}
\\usepackage{url}
\\usepackage{hyperref}
\\usepackage{listings}
\\usepackage{xcolor}
\\lstset{basicstyle=\\ttfamily,breaklines=true}
\\begin{document}

";

const BLOCK_SEPARATOR: &str = "\\vspace{0.8em}\n\n";
const MATH_PADDING: &str = "\\vspace{0.5em}\n";
const DISPLAY_PADDING: &str = "\\vspace{0.3em}\n";
const SECTIONING: [&str; 3] = ["section", "subsection", "subsubsection"];
const DEEP_SECTIONING: &str = "paragraph";
const DEFAULT_LANGUAGE: &str = "text";

static URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(^|\s)(https?://\S+)").expect("URL pattern is valid"));

pub fn generate(blocks: &[ContentBlock]) -> String {
    let mut out = String::from(PREAMBLE);
    for (i, block) in blocks.iter().enumerate() {
        write_block(&mut out, block);
        if i + 1 < blocks.len() {
            out.push_str(BLOCK_SEPARATOR);
        }
    }
    out.push_str("\\end{document}\n");
    out
}

fn write_block(out: &mut String, block: &ContentBlock) {
    match block.kind {
        BlockKind::Heading => {
            let level = block.heading_level();
            let command = SECTIONING.get(level - 1).copied().unwrap_or(DEEP_SECTIONING);
            let star = if block.numbered { "" } else { "*" };
            let _ = writeln!(out, "\\{command}{star}{{{}}}", escape_title(block.heading_title()));
        }
        BlockKind::Math => out.push_str(&math_block(&block.content)),
        BlockKind::Code => {
            let language = block.language.as_deref().unwrap_or(DEFAULT_LANGUAGE);
            let _ = write!(
                out,
                "\\begin{{lstlisting}}[language={language}]\n{}\n\\end{{lstlisting}}\n",
                block.content
            );
        }
        BlockKind::Quote => {
            let _ = write!(out, "\\begin{{quote}}\n{}\n\\end{{quote}}\n", block.content);
        }
        BlockKind::List => {
            out.push_str("\\begin{itemize}\n");
            for item in list_items(&block.content) {
                let _ = writeln!(out, "\\item {item}");
            }
            out.push_str("\\end{itemize}\n");
        }
        BlockKind::Raw => {
            out.push_str(&block.content);
            out.push('\n');
        }
        BlockKind::Text => {
            out.push_str(&text_block(&block.content));
            out.push('\n');
        }
    }
}

/// Lines carrying a `- ` or `* ` bullet, with the bullet removed.
pub(super) fn list_items(content: &str) -> impl Iterator<Item = &str> {
    content.lines().filter_map(|line| {
        let line = line.trim();
        line.strip_prefix("- ")
            .or_else(|| line.strip_prefix("* "))
            .map(str::trim)
    })
}

/// Display and inline math spans wrapped for the typesetter.
///
/// `$$..$$` becomes an unnumbered equation, `$..$` inline math. Content
/// without any delimiter is taken to be a bare display equation. An
/// unterminated delimiter is copied through unchanged.
fn math_block(raw: &str) -> String {
    let content = raw.trim();
    let mut out = String::from(MATH_PADDING);
    if !content.contains('$') {
        let _ = write!(
            out,
            "{DISPLAY_PADDING}\\begin{{equation*}}\n{content}\n\\end{{equation*}}\n{DISPLAY_PADDING}"
        );
        out.push_str(MATH_PADDING);
        return out;
    }

    let mut rest = content;
    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        if let Some(inner) = rest.strip_prefix("$$") {
            if let Some(end) = inner.find("$$") {
                let _ = write!(
                    out,
                    "{DISPLAY_PADDING}\\begin{{equation*}}\n{}\n\\end{{equation*}}\n{DISPLAY_PADDING}",
                    &inner[..end]
                );
                rest = &inner[end + 2..];
                continue;
            }
            out.push_str("$$");
            rest = inner;
            continue;
        }
        let inner = &rest[1..];
        if let Some(end) = inner.find('$') {
            let _ = write!(out, "\\({}\\)", &inner[..end]);
            rest = &inner[end + 1..];
        } else {
            out.push('$');
            rest = inner;
        }
    }
    out.push_str(rest);
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(MATH_PADDING);
    out
}

/// Text block: inline math, then bold and italic, then bare URLs.
fn text_block(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    for segment in math_segments(content) {
        match segment {
            Segment::Math(math) => {
                let _ = write!(out, "\\({math}\\)");
            }
            Segment::Dollar => out.push_str("\\$"),
            Segment::Text(text) => {
                for span in emphasis_spans(text) {
                    match span {
                        Emphasis::Plain(plain) => out.push_str(&autolink(plain)),
                        Emphasis::Bold(inner) => {
                            let _ = write!(out, "\\textbf{{{inner}}}");
                        }
                        Emphasis::Italic(inner) => {
                            let _ = write!(out, "\\textit{{{inner}}}");
                        }
                    }
                }
            }
        }
    }
    out
}

fn autolink(text: &str) -> std::borrow::Cow<'_, str> {
    URL.replace_all(text, "$1\\url{$2}")
}

/// Escape typesetter specials in a heading title, leaving `$..$` math and
/// already escaped characters alone.
fn escape_title(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut in_math = false;
    let mut prev = None;
    for c in title.chars() {
        let escaped = prev == Some('\\');
        match c {
            '$' if !escaped => {
                in_math = !in_math;
                out.push(c);
            }
            '&' | '%' | '#' | '_' if !in_math && !escaped => {
                out.push('\\');
                out.push(c);
            }
            '~' if !in_math && !escaped => out.push_str("\\textasciitilde{}"),
            _ => out.push(c),
        }
        prev = Some(c);
    }
    out
}
