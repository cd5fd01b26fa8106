//! Advisory validation of raw block content.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    UnmatchedClosingBrace,
    UnmatchedOpeningBrace,
    UnmatchedMathDelimiter,
}

impl DiagnosticKind {
    pub const fn message(self) -> &'static str {
        match self {
            Self::UnmatchedClosingBrace => "unmatched closing brace",
            Self::UnmatchedOpeningBrace => "unmatched opening brace",
            Self::UnmatchedMathDelimiter => "unmatched math delimiter",
        }
    }

    pub const fn severity(self) -> Severity {
        match self {
            Self::UnmatchedClosingBrace | Self::UnmatchedOpeningBrace => Severity::Error,
            Self::UnmatchedMathDelimiter => Severity::Warning,
        }
    }
}

/// A finding about block content. Lines and columns are 1-based and count
/// characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Diagnostic {
    pub line: usize,
    pub column: usize,
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    const fn new(line: usize, column: usize, kind: DiagnosticKind) -> Self {
        Self { line, column, kind }
    }

    pub const fn message(&self) -> &'static str {
        self.kind.message()
    }

    pub const fn severity(&self) -> Severity {
        self.kind.severity()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.line, self.column, self.message())
    }
}

/// Check brace balance and math delimiter parity line by line.
///
/// A closing brace with nothing open is reported at its column and does not
/// disturb the balance of later braces. Opening braces still open at the end
/// of a line are reported once, at the last column.
pub fn check(content: &str) -> Vec<Diagnostic> {
    let mut found = Vec::new();
    for (idx, line) in content.split('\n').enumerate() {
        let line_no = idx + 1;
        let line = line.strip_suffix('\r').unwrap_or(line);
        let mut open = 0_usize;
        let mut dollars = 0_usize;
        let mut last_dollar = 0;
        let mut width = 0;

        for (col, c) in line.chars().enumerate() {
            width = col + 1;
            match c {
                '{' => open += 1,
                '}' if open == 0 => {
                    found.push(Diagnostic::new(
                        line_no,
                        col + 1,
                        DiagnosticKind::UnmatchedClosingBrace,
                    ));
                }
                '}' => open -= 1,
                '$' => {
                    dollars += 1;
                    last_dollar = col + 1;
                }
                _ => {}
            }
        }

        if open > 0 {
            found.push(Diagnostic::new(
                line_no,
                width,
                DiagnosticKind::UnmatchedOpeningBrace,
            ));
        }
        if dollars % 2 == 1 {
            found.push(Diagnostic::new(
                line_no,
                last_dollar,
                DiagnosticKind::UnmatchedMathDelimiter,
            ));
        }
    }
    found
}
