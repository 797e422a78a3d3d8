//! Character-level superscript and subscript substitution.
//!
//! `[SUPERSCRIPT]`/`[SUBSCRIPT]` markers rewrite a bracketed exponent with
//! Unicode super/subscript characters, so an exponent renders inline without
//! any font-metric support from the rasterization backend. This is distinct
//! from the `[CWSUPERSCRIPT]`/`[CWSUBSCRIPT]` style flags, which scale and
//! offset a whole token during layout.

const SUPERSCRIPT_MARKER: &str = "[SUPERSCRIPT]";
const SUBSCRIPT_MARKER: &str = "[SUBSCRIPT]";

/// Map a character to its Unicode superscript form, if one exists.
fn superscript_char(c: char) -> Option<char> {
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
        '+' => '⁺',
        '-' => '⁻',
        '=' => '⁼',
        '(' => '⁽',
        ')' => '⁾',
        'n' => 'ⁿ',
        'i' => 'ⁱ',
        _ => return None,
    })
}

/// Map a character to its Unicode subscript form, if one exists.
fn subscript_char(c: char) -> Option<char> {
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
        '+' => '₊',
        '-' => '₋',
        '=' => '₌',
        '(' => '₍',
        ')' => '₎',
        'a' => 'ₐ',
        'e' => 'ₑ',
        'h' => 'ₕ',
        'k' => 'ₖ',
        'l' => 'ₗ',
        'm' => 'ₘ',
        'n' => 'ₙ',
        'o' => 'ₒ',
        'p' => 'ₚ',
        's' => 'ₛ',
        't' => 'ₜ',
        'u' => 'ᵤ',
        'v' => 'ᵥ',
        'x' => 'ₓ',
        _ => return None,
    })
}

/// Rewrite every character that has a superscript form; others pass through.
pub fn to_superscript(text: &str) -> String {
    text.chars()
        .map(|c| superscript_char(c).unwrap_or(c))
        .collect()
}

/// Rewrite every character that has a subscript form; others pass through.
pub fn to_subscript(text: &str) -> String {
    text.chars()
        .map(|c| subscript_char(c).unwrap_or(c))
        .collect()
}

/// Expand script markers in a token.
///
/// The marker is followed by a bracketed exponent: `x[SUPERSCRIPT][2]`
/// becomes `x²`. One marker kind is processed per token, subscript taking
/// priority; pieces without a bracket pair are left alone.
pub fn format_script(text: &str) -> String {
    let (marker, map): (&str, fn(&str) -> String) = if text.contains(SUBSCRIPT_MARKER) {
        (SUBSCRIPT_MARKER, to_subscript)
    } else if text.contains(SUPERSCRIPT_MARKER) {
        (SUPERSCRIPT_MARKER, to_superscript)
    } else {
        return text.to_owned();
    };

    text.split(marker)
        .map(|piece| expand_exponent(piece, map))
        .collect()
}

fn expand_exponent(piece: &str, map: fn(&str) -> String) -> String {
    let Some(open) = piece.find('[') else {
        return piece.to_owned();
    };
    let Some(close) = piece[open..].find(']').map(|i| open + i) else {
        return piece.to_owned();
    };
    let mut expanded = String::with_capacity(piece.len());
    expanded.push_str(&piece[..open]);
    expanded.push_str(&map(&piece[open + 1..close]));
    expanded.push_str(&piece[close + 1..]);
    expanded
}
