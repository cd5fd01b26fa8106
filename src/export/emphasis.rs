//! Tokenizers shared by the typesetting and hypertext targets.

const MATH_DELIM: char = '$';
const ESCAPE: char = '\\';

/// A piece of text-block content split on inline math spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Text(&'a str),
    Math(&'a str),
    /// An escaped delimiter, to be written as a literal `$`.
    Dollar,
}

/// Split `text` on `$..$` spans.
///
/// `\$` is a literal dollar. A `$` with no closing partner is kept as text.
pub fn math_segments(text: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let mut plain_start = 0;
    let mut i = 0;
    while i < text.len() {
        let rest = &text[i..];
        if rest.starts_with(ESCAPE) && rest[1..].starts_with(MATH_DELIM) {
            push_text(&mut out, &text[plain_start..i]);
            out.push(Segment::Dollar);
            i += 2;
            plain_start = i;
            continue;
        }
        if rest.starts_with(MATH_DELIM) {
            if let Some(end) = rest[1..].find(MATH_DELIM) {
                push_text(&mut out, &text[plain_start..i]);
                out.push(Segment::Math(&rest[1..=end]));
                i += end + 2;
                plain_start = i;
                continue;
            }
        }
        i += rest.chars().next().map_or(1, char::len_utf8);
    }
    push_text(&mut out, &text[plain_start..]);
    out
}

fn push_text<'a>(out: &mut Vec<Segment<'a>>, text: &'a str) {
    if !text.is_empty() {
        out.push(Segment::Text(text));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emphasis<'a> {
    Plain(&'a str),
    Bold(&'a str),
    Italic(&'a str),
}

/// Pair `**..**` and `*..*` markers.
///
/// Double markers are claimed first; a single `*` only opens or closes an
/// italic span when neither neighbour is also `*`. Every returned span is a
/// matched pair, so odd marker runs come back as plain text instead of
/// unbalanced tags.
pub fn emphasis_spans(text: &str) -> Vec<Emphasis<'_>> {
    let bytes = text.as_bytes();
    let lone_star = |j: usize| {
        bytes[j] == b'*'
            && (j == 0 || bytes[j - 1] != b'*')
            && bytes.get(j + 1).is_none_or(|b| *b != b'*')
    };

    let mut out = Vec::new();
    let mut plain_start = 0;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i..].starts_with(b"**") {
            if let Some(end) = text[i + 2..].find("**").filter(|end| *end > 0) {
                push_plain(&mut out, &text[plain_start..i]);
                out.push(Emphasis::Bold(&text[i + 2..i + 2 + end]));
                i += end + 4;
                plain_start = i;
                continue;
            }
        }
        if lone_star(i) {
            if let Some(end) = (i + 2..bytes.len()).find(|&j| lone_star(j)) {
                push_plain(&mut out, &text[plain_start..i]);
                out.push(Emphasis::Italic(&text[i + 1..end]));
                i = end + 1;
                plain_start = i;
                continue;
            }
        }
        i += 1;
    }
    push_plain(&mut out, &text[plain_start..]);
    out
}

fn push_plain<'a>(out: &mut Vec<Emphasis<'a>>, text: &'a str) {
    if !text.is_empty() {
        out.push(Emphasis::Plain(text));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_math_segments() {
        assert_eq!(
            math_segments("a $x$ b"),
            [Segment::Text("a "), Segment::Math("x"), Segment::Text(" b")]
        );
    }

    #[test]
    fn test_escaped_dollar_is_literal() {
        assert_eq!(
            math_segments("costs \\$5"),
            [Segment::Text("costs "), Segment::Dollar, Segment::Text("5")]
        );
    }

    #[test]
    fn test_unterminated_math_stays_text() {
        assert_eq!(math_segments("a $b"), [Segment::Text("a $b")]);
    }

    #[test]
    fn test_bold_then_italic() {
        assert_eq!(
            emphasis_spans("**b** and *i*"),
            [
                Emphasis::Bold("b"),
                Emphasis::Plain(" and "),
                Emphasis::Italic("i"),
            ]
        );
    }

    #[test]
    fn test_odd_marker_run_is_plain() {
        assert_eq!(emphasis_spans("a ** b"), [Emphasis::Plain("a ** b")]);
        assert_eq!(emphasis_spans("2 * 3"), [Emphasis::Plain("2 * 3")]);
    }

    #[test]
    fn test_three_lone_markers_pair_once() {
        assert_eq!(
            emphasis_spans("*a* b *c"),
            [Emphasis::Italic("a"), Emphasis::Plain(" b *c")]
        );
    }

    #[test]
    fn test_multibyte_text_survives() {
        assert_eq!(
            emphasis_spans("é *ü* ö"),
            [
                Emphasis::Plain("é "),
                Emphasis::Italic("ü"),
                Emphasis::Plain(" ö"),
            ]
        );
    }
}
