//! Inline formatting commands to emphasis markers.

const FORMAT_COMMANDS: &[(&str, &str)] = &[
    ("\\textbf{", "**"),
    ("\\textit{", "*"),
    ("\\emph{", "*"),
];

/// Rewrite `\textbf{..}`, `\textit{..}` and `\emph{..}` as `**..**` / `*..*`.
///
/// Every `{` opens a frame; the frame remembers whether a formatting command
/// opened it. The closing marker is written when the brace that ends that
/// frame arrives, so nested plain braces inside the argument survive.
/// Unmatched braces are copied through.
pub fn apply(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut frames: Vec<Option<&'static str>> = Vec::new();
    let mut rest = input;

    'scan: while let Some(c) = rest.chars().next() {
        for &(command, marker) in FORMAT_COMMANDS {
            if let Some(after) = rest.strip_prefix(command) {
                out.push_str(marker);
                frames.push(Some(marker));
                rest = after;
                continue 'scan;
            }
        }
        match c {
            '{' => {
                frames.push(None);
                out.push(c);
            }
            '}' => match frames.pop() {
                Some(Some(marker)) => out.push_str(marker),
                _ => out.push(c),
            },
            _ => out.push(c),
        }
        rest = &rest[c.len_utf8()..];
    }
    out
}
