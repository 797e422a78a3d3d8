//! Markup normalization and per-token style resolution.
//!
//! The markup language is a set of case-sensitive, bracket-delimited sigils
//! embedded in plain text. Range tags (`[BOLD]word word[/BOLD]`) apply to
//! every whitespace-delimited token between the opening and closing tag;
//! standalone tags (`[BREAK]`, `[BLANK]`, ...) mark the single token they
//! appear in. Tags are flat: nesting is not supported.
//!
//! Normalization rewrites range tags so that every affected token carries
//! the opening tag itself, which lets the rest of the pipeline work one
//! token at a time.

use crate::fill_in::FillInSlots;

/// Range tags, closed by the matching `[/NAME]` form.
const RANGE_TAGS: [&str; 6] = [
    "[HIGHLIGHT]",
    "[BOLD]",
    "[ITALIC]",
    "[UNDERLINE]",
    "[CONCAT]",
    "[FRACTION]",
];

/// Standalone tags that resolve to a style flag and are then stripped.
const BLANK_TAG: &str = "[BLANK]";
const BREAK_TAG: &str = "[BREAK]";
const SHIFT_UP_TAG: &str = "[SHIFTUP]";
const SHIFT_DOWN_TAG: &str = "[SHIFTDOWN]";
const SUPERSCRIPT_TAG: &str = "[CWSUPERSCRIPT]";
const SUBSCRIPT_TAG: &str = "[CWSUBSCRIPT]";

/// Symbol tags and their inline substitutions. The blank runs reserve room
/// for a caller's symbol hook to draw over; see
/// [`RichTextBlock::set_symbol_handler`](crate::block::RichTextBlock::set_symbol_handler).
const SYMBOL_TAGS: [(&str, &str); 7] = [
    ("[ANGLE]", "    "),
    ("[TRIANGLE]", "   "),
    ("[SQRT]", "  "),
    ("[SEGMENT]", "  "),
    ("[LINE]", "  "),
    ("[VECTOR]", "  "),
    ("[ARC]", "  "),
];

/// Style flags resolved for one whitespace-delimited token.
///
/// Multiple markers on one token combine; `custom` carries the names of any
/// caller-supplied tags found on the token.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleFlags {
    pub highlight: bool,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub concat: bool,
    pub fraction: bool,
    pub blank: bool,
    pub line_break: bool,
    pub superscript: bool,
    pub subscript: bool,
    pub shift_up: bool,
    pub shift_down: bool,
    pub custom: Vec<String>,
}

impl StyleFlags {
    /// Whether the token is scaled and offset as a sub/superscript.
    pub fn has_script(&self) -> bool {
        self.superscript || self.subscript
    }

    /// Whether the token is manually shifted by a third of the line pitch.
    pub fn has_shift(&self) -> bool {
        self.shift_up || self.shift_down
    }

    pub fn has_custom(&self, name: &str) -> bool {
        self.custom.iter().any(|flag| flag == name)
    }
}

/// A caller-supplied markup tag, e.g. `CustomTag::new("wave", "[WAVE]")`.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomTag {
    pub name: String,
    pub tag: String,
}

impl CustomTag {
    pub fn new(name: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tag: tag.into(),
        }
    }
}

/// The set of markup tags recognized by one label.
#[derive(Debug, Clone, Default)]
pub struct MarkupSet {
    custom: Vec<CustomTag>,
}

impl MarkupSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extend the built-in tags with caller-supplied ones. Custom tags are
    /// balanced like range tags and resolve to named custom flags.
    pub fn with_custom(custom: Vec<CustomTag>) -> Self {
        Self { custom }
    }

    pub fn custom_tags(&self) -> &[CustomTag] {
        &self.custom
    }

    /// Balance range markup so every affected token carries its opening tag.
    ///
    /// For every opening tag with a later matching closing tag, each
    /// whitespace-delimited word between them (inclusive) is prefixed with
    /// the opening tag and the closing tag is removed; this repeats until no
    /// matched closing tags remain. An opening tag without a closing tag is
    /// left as literal text by policy, and so is a closing tag without an
    /// earlier opening tag.
    pub fn normalize(&self, raw: &str) -> String {
        let mut text = raw.to_owned();
        for tag in self.range_tags() {
            let close = close_tag(&tag);
            while text.contains(close.as_str()) {
                match balance_once(&text, &tag, &close) {
                    Some(balanced) => text = balanced,
                    None => break,
                }
            }
        }
        text
    }

    /// Scan a token for every recognized marker and set the matching flags.
    pub fn resolve_style(&self, token: &str) -> StyleFlags {
        let mut flags = StyleFlags {
            highlight: token.contains("[HIGHLIGHT]"),
            bold: token.contains("[BOLD]"),
            italic: token.contains("[ITALIC]"),
            underline: token.contains("[UNDERLINE]"),
            concat: token.contains("[CONCAT]"),
            fraction: token.contains("[FRACTION]"),
            blank: token.contains(BLANK_TAG),
            line_break: token.contains(BREAK_TAG),
            superscript: token.contains(SUPERSCRIPT_TAG),
            subscript: token.contains(SUBSCRIPT_TAG),
            shift_up: token.contains(SHIFT_UP_TAG),
            shift_down: token.contains(SHIFT_DOWN_TAG),
            custom: Vec::new(),
        };
        // Symbol tags surface as named flags so a symbol hook can find the
        // reserved run and draw over it.
        for (tag, _) in SYMBOL_TAGS {
            if token.contains(tag) {
                flags
                    .custom
                    .push(tag.trim_matches(['[', ']']).to_ascii_lowercase());
            }
        }
        for tag in &self.custom {
            if token.contains(tag.tag.as_str()) {
                flags.custom.push(tag.name.clone());
            }
        }
        flags
    }

    /// Strip all recognized markers from a token.
    ///
    /// Each `[BLANK]` occurrence consumes the next fill-in slot in document
    /// order; symbol tags become their fixed inline substitution; every
    /// other recognized tag is deleted. Unrecognized bracket text is left
    /// untouched.
    pub fn clean(&self, token: &str, fill_ins: &mut FillInSlots) -> String {
        let mut cleaned = token.to_owned();

        while cleaned.contains(BLANK_TAG) {
            let value = fill_ins.take_next();
            cleaned = cleaned.replacen(BLANK_TAG, &value, 1);
        }

        for (tag, substitution) in SYMBOL_TAGS {
            cleaned = cleaned.replace(tag, substitution);
        }

        for tag in RANGE_TAGS {
            cleaned = cleaned.replace(tag, "");
        }
        for tag in [
            BREAK_TAG,
            SHIFT_UP_TAG,
            SHIFT_DOWN_TAG,
            SUPERSCRIPT_TAG,
            SUBSCRIPT_TAG,
        ] {
            cleaned = cleaned.replace(tag, "");
        }
        for tag in &self.custom {
            cleaned = cleaned.replace(tag.tag.as_str(), "");
        }
        cleaned
    }

    /// Count the blank markers in a document, which is the number of
    /// fill-in slots it owns.
    pub fn count_blanks(&self, raw: &str) -> usize {
        raw.matches(BLANK_TAG).count()
    }

    fn range_tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = RANGE_TAGS.iter().map(|tag| (*tag).to_owned()).collect();
        tags.extend(self.custom.iter().map(|tag| tag.tag.clone()));
        tags
    }
}

fn close_tag(open: &str) -> String {
    open.replacen('[', "[/", 1)
}

/// Balance one open/close pair. Returns `None` when the closing tag has no
/// earlier opening tag, leaving the text untouched.
fn balance_once(text: &str, open: &str, close: &str) -> Option<String> {
    let words: Vec<&str> = text.split(' ').collect();
    let end = words.iter().position(|word| word.contains(close))?;
    let start = words[..=end].iter().rposition(|word| word.contains(open))?;

    let mut balanced = String::with_capacity(text.len());
    for (index, word) in words.iter().enumerate() {
        let word = if index == start && index == end {
            word.replacen(open, "", 1).replacen(close, "", 1)
        } else if index == start {
            word.replacen(open, "", 1)
        } else if index == end {
            word.replacen(close, "", 1)
        } else {
            (*word).to_owned()
        };
        if index >= start && index <= end {
            balanced.push_str(open);
        }
        balanced.push_str(&word);
        balanced.push(' ');
    }
    Some(balanced.trim_end().to_owned())
}
