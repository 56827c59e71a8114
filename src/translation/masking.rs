/*!
 * Fragment masking.
 *
 * Protected fragments (inline code spans, absolute URLs and file or archive
 * names) are swapped for placeholder tokens before text reaches a translation
 * backend, and swapped back afterwards.
 */

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::MaskRestoreMismatch;

/// Backtick-delimited inline code, e.g. `` `make install` ``
static CODE_SPAN: Lazy<Regex> = Lazy::new(|| Regex::new(r"`[^`]+`").unwrap());

/// Absolute URL with any scheme and no embedded whitespace
static ABSOLUTE_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z][A-Za-z0-9+.\-]*://\S+").unwrap());

/// Dotted token that looks like a file or archive name, e.g. `gcc-13.2.0.tar.xz`
static FILE_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z0-9._\-]+\.[a-z]+").unwrap());

/// Pattern classes in overlap precedence order
static PROTECTED_PATTERNS: Lazy<[&'static Regex; 3]> =
    Lazy::new(|| [&*CODE_SPAN, &*ABSOLUTE_URL, &*FILE_NAME]);

const PLACEHOLDER_DELIMITER: &str = "__";
const PLACEHOLDER_STEM: &str = "ZXQ";

/// Ordered placeholder → original fragment pairs for one translation call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaskMap {
    entries: Vec<(String, String)>,
}

impl MaskMap {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterate over `(placeholder, original)` in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(p, o)| (p.as_str(), o.as_str()))
    }

    fn push(&mut self, placeholder: String, original: String) {
        self.entries.push((placeholder, original));
    }
}

/// Masked text plus the map needed to restore it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskedText {
    pub text: String,
    pub map: MaskMap,
}

impl MaskedText {
    /// True if something other than placeholders, punctuation and whitespace remains
    pub fn has_translatable_content(&self) -> bool {
        let mut remainder = self.text.clone();
        for (placeholder, _) in self.map.iter() {
            remainder = remainder.replace(placeholder, " ");
        }
        remainder.chars().any(char::is_alphabetic)
    }
}

/// Result of restoring placeholders in backend output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unmasked {
    pub text: String,
    pub mismatches: Vec<MaskRestoreMismatch>,
}

/// Replace every protected fragment of `text` with a unique placeholder.
pub fn mask(text: &str) -> MaskedText {
    let spans = protected_spans(text);
    if spans.is_empty() {
        return MaskedText {
            text: text.to_string(),
            map: MaskMap::default(),
        };
    }

    let stem = placeholder_stem(text);
    let mut map = MaskMap::default();
    let mut masked = String::with_capacity(text.len());
    let mut cursor = 0;

    for (index, (start, end)) in spans.into_iter().enumerate() {
        let placeholder = format!("{PLACEHOLDER_DELIMITER}{stem}{index}{PLACEHOLDER_DELIMITER}");
        masked.push_str(&text[cursor..start]);
        masked.push_str(&placeholder);
        map.push(placeholder, text[start..end].to_string());
        cursor = end;
    }
    masked.push_str(&text[cursor..]);

    MaskedText { text: masked, map }
}

/// Put the original fragments back. Placeholders the backend mangled stay
/// verbatim and are reported as mismatches.
pub fn unmask(text: &str, map: &MaskMap) -> Unmasked {
    let mut restored = text.to_string();
    let mut mismatches = Vec::new();

    for (placeholder, original) in map.iter() {
        if restored.contains(placeholder) {
            restored = restored.replace(placeholder, original);
        } else {
            mismatches.push(MaskRestoreMismatch {
                placeholder: placeholder.to_string(),
                original: original.to_string(),
            });
        }
    }

    Unmasked {
        text: restored,
        mismatches,
    }
}

/// Non-overlapping protected byte ranges sorted by position.
///
/// Classes are claimed in precedence order; a later class never takes a
/// range that overlaps one already claimed.
fn protected_spans(text: &str) -> Vec<(usize, usize)> {
    let mut claimed: Vec<(usize, usize)> = Vec::new();

    for pattern in PROTECTED_PATTERNS.iter() {
        for found in pattern.find_iter(text) {
            let (start, end) = (found.start(), found.end());
            let overlaps = claimed.iter().any(|&(s, e)| start < e && s < end);
            if !overlaps {
                claimed.push((start, end));
            }
        }
    }

    claimed.sort_unstable();
    claimed
}

/// Pick a stem that does not occur anywhere in `text`.
///
/// The stem is made of letters only, so it can neither straddle a placeholder
/// boundary nor be completed by surrounding prose.
fn placeholder_stem(text: &str) -> String {
    let mut stem = PLACEHOLDER_STEM.to_string();
    while text.contains(&stem) {
        stem.push('Q');
    }
    stem
}
