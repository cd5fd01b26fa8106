//! Macro name to glyph substitution.

/// Escape character that introduces a macro name.
pub const MACRO_ESCAPE: char = '\\';

const BUILTIN_GLYPHS: &[(&str, &str)] = &[
    // Greek, lowercase
    ("\\alpha", "α"),
    ("\\beta", "β"),
    ("\\gamma", "γ"),
    ("\\delta", "δ"),
    ("\\epsilon", "ε"),
    ("\\varepsilon", "ε"),
    ("\\zeta", "ζ"),
    ("\\eta", "η"),
    ("\\theta", "θ"),
    ("\\iota", "ι"),
    ("\\kappa", "κ"),
    ("\\lambda", "λ"),
    ("\\mu", "μ"),
    ("\\nu", "ν"),
    ("\\xi", "ξ"),
    ("\\pi", "π"),
    ("\\rho", "ρ"),
    ("\\sigma", "σ"),
    ("\\tau", "τ"),
    ("\\phi", "φ"),
    ("\\varphi", "φ"),
    ("\\chi", "χ"),
    ("\\psi", "ψ"),
    ("\\omega", "ω"),
    // Greek, uppercase
    ("\\Gamma", "Γ"),
    ("\\Delta", "Δ"),
    ("\\Theta", "Θ"),
    ("\\Lambda", "Λ"),
    ("\\Pi", "Π"),
    ("\\Sigma", "Σ"),
    ("\\Phi", "Φ"),
    ("\\Psi", "Ψ"),
    ("\\Omega", "Ω"),
    // Operators
    ("\\int", "∫"),
    ("\\oint", "∮"),
    ("\\sum", "∑"),
    ("\\prod", "∏"),
    ("\\sqrt", "√"),
    ("\\infty", "∞"),
    ("\\partial", "∂"),
    ("\\nabla", "∇"),
    ("\\pm", "±"),
    ("\\mp", "∓"),
    ("\\times", "×"),
    ("\\div", "÷"),
    ("\\cdot", "·"),
    ("\\le", "≤"),
    ("\\leq", "≤"),
    ("\\ge", "≥"),
    ("\\geq", "≥"),
    ("\\ne", "≠"),
    ("\\neq", "≠"),
    ("\\approx", "≈"),
    ("\\equiv", "≡"),
    ("\\to", "→"),
    ("\\rightarrow", "→"),
    ("\\leftarrow", "←"),
    ("\\Rightarrow", "⇒"),
    ("\\iff", "⇔"),
    // Sets and logic
    ("\\subset", "⊂"),
    ("\\subseteq", "⊆"),
    ("\\supset", "⊃"),
    ("\\supseteq", "⊇"),
    ("\\in", "∈"),
    ("\\notin", "∉"),
    ("\\cup", "∪"),
    ("\\cap", "∩"),
    ("\\emptyset", "∅"),
    ("\\forall", "∀"),
    ("\\exists", "∃"),
    ("\\neg", "¬"),
    ("\\land", "∧"),
    ("\\lor", "∨"),
];

/// Ordered macro table.
///
/// Entries are kept longest name first (ties broken alphabetically) and
/// substitution walks them in that order, so a name that prefixes another
/// (`\in`, `\int`, `\infty`) can never claim part of the longer one.
#[derive(Debug, Clone)]
pub struct MacroTable {
    entries: Vec<(&'static str, &'static str)>,
}

impl MacroTable {
    pub fn builtin() -> Self {
        Self::from_entries(BUILTIN_GLYPHS)
    }

    pub fn from_entries(entries: &[(&'static str, &'static str)]) -> Self {
        let mut entries = entries.to_vec();
        entries.sort_by(|(a, _), (b, _)| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        entries.dedup_by(|(a, _), (b, _)| a == b);
        Self { entries }
    }

    /// Names in substitution order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(name, _)| *name)
    }

    pub fn glyph(&self, name: &str) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, glyph)| *glyph)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replace every known macro in one left-to-right pass.
    ///
    /// A macro only matches when the following character is not a letter,
    /// so `\pix` stays untouched. Glyphs are never rescanned.
    pub fn substitute(&self, input: &str) -> String {
        let mut out = String::with_capacity(input.len());
        let mut rest = input;
        while let Some(pos) = rest.find(MACRO_ESCAPE) {
            out.push_str(&rest[..pos]);
            rest = &rest[pos..];
            match self.match_at(rest) {
                Some((name, glyph)) => {
                    out.push_str(glyph);
                    rest = &rest[name.len()..];
                }
                None => {
                    out.push(MACRO_ESCAPE);
                    rest = &rest[MACRO_ESCAPE.len_utf8()..];
                }
            }
        }
        out.push_str(rest);
        out
    }

    fn match_at(&self, text: &str) -> Option<(&'static str, &'static str)> {
        self.entries.iter().copied().find(|(name, _)| {
            text.strip_prefix(name)
                .is_some_and(|after| !after.starts_with(|c: char| c.is_ascii_alphabetic()))
        })
    }
}

impl Default for MacroTable {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_are_longest_first() {
        let table = MacroTable::builtin();
        let lens: Vec<_> = table.names().map(str::len).collect();
        assert!(lens.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_prefix_names_do_not_cross_contaminate() {
        let table = MacroTable::builtin();
        assert_eq!(table.substitute("\\in"), "∈");
        assert_eq!(table.substitute("\\int"), "∫");
        assert_eq!(table.substitute("\\infty"), "∞");
        assert_eq!(table.substitute("x \\in A, \\int f, \\infty"), "x ∈ A, ∫ f, ∞");
    }

    #[test]
    fn test_le_and_leq_render_independently() {
        let table = MacroTable::builtin();
        assert_eq!(table.substitute("a \\le b \\leq c"), "a ≤ b ≤ c");
    }

    #[test]
    fn test_order_independent_of_declaration() {
        let table = MacroTable::from_entries(&[("\\a", "1"), ("\\ab", "2")]);
        assert_eq!(table.substitute("\\ab \\a"), "2 1");
    }

    #[test]
    fn test_unknown_macro_is_left_alone() {
        let table = MacroTable::builtin();
        assert_eq!(table.substitute("\\frac{1}{2}"), "\\frac{1}{2}");
        assert_eq!(table.substitute("\\pix"), "\\pix");
    }

    #[test]
    fn test_macro_followed_by_script_or_brace() {
        let table = MacroTable::builtin();
        assert_eq!(table.substitute("\\alpha_1"), "α_1");
        assert_eq!(table.substitute("\\sqrt{2}"), "√{2}");
    }

    #[test]
    fn test_trailing_escape() {
        assert_eq!(MacroTable::builtin().substitute("cost \\"), "cost \\");
    }
}
