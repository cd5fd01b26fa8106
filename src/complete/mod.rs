//! Macro-name completion.
//!
//! [`CompletionEngine::complete`] looks at the text before the cursor and,
//! when the trailing token contains a macro escape, proposes every registry
//! entry whose name starts with the escaped fragment.

use crate::render::{MACRO_ESCAPE, MacroTable};

/// Coarse grouping shown in the completion popover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Symbol,
    Operator,
    Relation,
    Function,
    Format,
    Link,
    Environment,
}

impl Category {
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Symbol => "symbol",
            Self::Operator => "operator",
            Self::Relation => "relation",
            Self::Function => "function",
            Self::Format => "format",
            Self::Link => "link",
            Self::Environment => "environment",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionCandidate {
    pub name: &'static str,
    pub description: &'static str,
    pub insert: &'static str,
    pub category: Category,
    pub example: &'static str,
}

const fn entry(
    name: &'static str,
    description: &'static str,
    insert: &'static str,
    category: Category,
    example: &'static str,
) -> CompletionCandidate {
    CompletionCandidate {
        name,
        description,
        insert,
        category,
        example,
    }
}

/// Commands beyond plain glyph macros. Entries here win over a macro of
/// the same name.
const COMMANDS: &[CompletionCandidate] = &[
    entry(
        "\\frac",
        "Fraction",
        "\\frac{numerator}{denominator}",
        Category::Function,
        "\\frac{1}{2} + \\frac{3}{4}",
    ),
    entry("\\sqrt", "Square root", "\\sqrt{x}", Category::Function, "\\sqrt{2}"),
    entry("\\textbf", "Bold text", "\\textbf{text}", Category::Format, "\\textbf{Important note}"),
    entry("\\textit", "Italic text", "\\textit{text}", Category::Format, "\\textit{emphasis}"),
    entry("\\emph", "Emphasized text", "\\emph{text}", Category::Format, "\\emph{key idea}"),
    entry(
        "\\href",
        "Hyperlink",
        "\\href{url}{text}",
        Category::Link,
        "\\href{https://example.com}{Example}",
    ),
    entry("\\url", "URL link", "\\url{url}", Category::Link, "\\url{https://example.com}"),
    entry(
        "\\begin",
        "Begin environment",
        "\\begin{env}",
        Category::Environment,
        "\\begin{align}",
    ),
    entry("\\end", "End environment", "\\end{env}", Category::Environment, "\\end{align}"),
];

fn macro_category(name: &str) -> Category {
    match name {
        "\\int" | "\\oint" | "\\sum" | "\\prod" | "\\pm" | "\\mp" | "\\times"
        | "\\div" | "\\cdot" | "\\cup" | "\\cap" | "\\neg" | "\\land" | "\\lor" => {
            Category::Operator
        }
        "\\le" | "\\leq" | "\\ge" | "\\geq" | "\\ne" | "\\neq" | "\\approx"
        | "\\equiv" | "\\to" | "\\rightarrow" | "\\leftarrow" | "\\Rightarrow"
        | "\\iff" | "\\subset" | "\\subseteq" | "\\supset" | "\\supseteq" | "\\in"
        | "\\notin" | "\\forall" | "\\exists" => Category::Relation,
        _ => Category::Symbol,
    }
}

/// Completion registry, sorted by name once at construction.
#[derive(Debug, Clone)]
pub struct CompletionEngine {
    entries: Vec<CompletionCandidate>,
}

impl CompletionEngine {
    /// Registry covering every macro in `macros` plus the structural and
    /// formatting commands.
    pub fn new(macros: &MacroTable) -> Self {
        let glyphs = macros.names().filter_map(|name| {
            let glyph = macros.glyph(name)?;
            Some(entry(name, glyph, name, macro_category(name), name))
        });
        let mut all: Vec<_> = COMMANDS.to_vec();
        all.extend(glyphs);
        Self::from_entries(&all)
    }

    pub fn builtin() -> Self {
        Self::new(&MacroTable::builtin())
    }

    pub fn from_entries(entries: &[CompletionCandidate]) -> Self {
        let mut entries = entries.to_vec();
        // Stable sort keeps the first occurrence of a name ahead of later ones.
        entries.sort_by(|a, b| a.name.cmp(b.name));
        entries.dedup_by(|a, b| a.name == b.name);
        Self { entries }
    }

    pub fn entries(&self) -> &[CompletionCandidate] {
        &self.entries
    }

    /// Candidates for the trigger at the end of `text`, alphabetical.
    ///
    /// An empty result means no popover should be shown.
    pub fn complete(&self, text: &str) -> Vec<CompletionCandidate> {
        let Some(trigger) = trigger_token(text) else {
            return Vec::new();
        };
        self.entries
            .iter()
            .filter(|c| c.name.starts_with(trigger))
            .copied()
            .collect()
    }
}

impl Default for CompletionEngine {
    fn default() -> Self {
        Self::builtin()
    }
}

/// The escaped fragment a completion would replace.
///
/// Takes the last whitespace-delimited token of `text` (none if `text` ends
/// in whitespace) and returns its suffix starting at the last macro escape,
/// provided something follows the escape. `$\al` and `\frac{1}{\al` both
/// yield `\al`.
pub fn trigger_token(text: &str) -> Option<&str> {
    let token = text.rsplit(char::is_whitespace).next()?;
    let start = token.rfind(MACRO_ESCAPE)?;
    let trigger = &token[start..];
    (trigger.len() > MACRO_ESCAPE.len_utf8()).then_some(trigger)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(cands: &[CompletionCandidate]) -> Vec<&'static str> {
        cands.iter().map(|c| c.name).collect()
    }

    #[test]
    fn test_prefix_matches_sorted() {
        let engine = CompletionEngine::builtin();
        let got = engine.complete("let \\in");
        assert_eq!(names(&got), ["\\in", "\\infty", "\\int"]);
    }

    #[test]
    fn test_bare_escape_has_no_candidates() {
        assert!(CompletionEngine::builtin().complete("x \\").is_empty());
    }

    #[test]
    fn test_trailing_whitespace_closes() {
        assert!(CompletionEngine::builtin().complete("\\alpha ").is_empty());
    }

    #[test]
    fn test_no_escape_no_candidates() {
        assert!(CompletionEngine::builtin().complete("alpha").is_empty());
        assert!(CompletionEngine::builtin().complete("").is_empty());
    }

    #[test]
    fn test_zero_matches() {
        assert!(CompletionEngine::builtin().complete("\\zzz").is_empty());
    }

    #[test]
    fn test_trigger_inside_math_token() {
        assert_eq!(trigger_token("$\\al"), Some("\\al"));
        assert_eq!(trigger_token("\\frac{1}{\\sq"), Some("\\sq"));
        assert_eq!(trigger_token("plain"), None);
    }

    #[test]
    fn test_candidate_carries_insert_text() {
        let got = CompletionEngine::builtin().complete("\\fr");
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].insert, "\\frac{numerator}{denominator}");
        assert_eq!(got[0].category.tag(), "function");
    }

    #[test]
    fn test_every_macro_is_offered() {
        let engine = CompletionEngine::builtin();
        for name in MacroTable::builtin().names() {
            assert!(
                engine.entries().iter().any(|c| c.name == name),
                "{name} missing"
            );
        }
    }

    #[test]
    fn test_command_overrides_glyph_macro() {
        let got = CompletionEngine::builtin().complete("\\sqr");
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].insert, "\\sqrt{x}");
        assert_eq!(got[0].category, Category::Function);
    }

    #[test]
    fn test_macro_candidate_describes_glyph() {
        let got = CompletionEngine::builtin().complete("\\alp");
        assert_eq!(got[0].description, "α");
        assert_eq!(got[0].insert, "\\alpha");
    }

    #[test]
    fn test_registry_names_are_unique() {
        let engine = CompletionEngine::builtin();
        let mut seen: Vec<_> = names(engine.entries());
        let before = seen.len();
        seen.dedup();
        assert_eq!(seen.len(), before);
    }
}
