//! Subscript and superscript translation.

fn subscript(c: char) -> Option<char> {
    Some(match c {
        '0' => '₀',
        '1' => '₁',
        '2' => '₂',
        '3' => '₃',
        '4' => '₄',
        '5' => '₅',
        '6' => '₆',
        '7' => '₇',
        '8' => '₈',
        '9' => '₉',
        'a' => 'ₐ',
        'e' => 'ₑ',
        'i' => 'ᵢ',
        'j' => 'ⱼ',
        'k' => 'ₖ',
        'n' => 'ₙ',
        'o' => 'ₒ',
        'u' => 'ᵤ',
        'x' => 'ₓ',
        _ => return None,
    })
}

fn superscript(c: char) -> Option<char> {
    Some(match c {
        '0' => '⁰',
        '1' => '¹',
        '2' => '²',
        '3' => '³',
        '4' => '⁴',
        '5' => '⁵',
        '6' => '⁶',
        '7' => '⁷',
        '8' => '⁸',
        '9' => '⁹',
        'i' => 'ⁱ',
        'n' => 'ⁿ',
        _ => return None,
    })
}

/// Translate `_c` and `^c` pairs whose character has a script glyph.
///
/// Anything else (`x_{ij}`, `a^b`) is copied verbatim.
pub fn translate(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        let map: fn(char) -> Option<char> = match c {
            '_' => subscript,
            '^' => superscript,
            _ => {
                out.push(c);
                continue;
            }
        };
        match chars.peek().copied().and_then(map) {
            Some(glyph) => {
                out.push(glyph);
                chars.next();
            }
            None => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digit_scripts() {
        assert_eq!(translate("x^2 + y_0"), "x² + y₀");
    }

    #[test]
    fn test_letter_scripts() {
        assert_eq!(translate("a_i^n"), "aᵢⁿ");
    }

    #[test]
    fn test_unmapped_sequences_untouched() {
        assert_eq!(translate("x_{ij} a^b"), "x_{ij} a^b");
        assert_eq!(translate("end_"), "end_");
    }

    #[test]
    fn test_consecutive_markers() {
        assert_eq!(translate("^^2"), "^²");
    }
}
