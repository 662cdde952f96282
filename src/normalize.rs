use std::sync::LazyLock;

use regex::Regex;

static ANNOTATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((Applause|Laughter|Inaudible)\.\)").unwrap());

/// Quote variants normalized to a plain apostrophe.
const SINGLE_QUOTES: &[char] = &['\u{0027}', '\u{0060}', '\u{00B4}', '\u{2018}', '\u{2019}'];
/// Quote variants removed outright.
const DOUBLE_QUOTES: &[char] = &['\u{0022}', '\u{201C}', '\u{201D}'];

/// Clean a transcript or title for import, in order: normalize
/// single-quote variants to `'`, drop double-quote variants, drop all
/// non-ASCII characters, remove stage-direction annotations, collapse
/// runs of spaces. Newlines survive. Idempotent.
pub fn clean_for_import(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        if SINGLE_QUOTES.contains(&ch) {
            out.push('\'');
        } else if DOUBLE_QUOTES.contains(&ch) {
            // dropped
        } else if ch.is_ascii() {
            out.push(ch);
        }
    }
    // Annotation removal can leave double spaces behind, so it runs
    // before the collapse.
    let out = ANNOTATION_RE.replace_all(&out, "");
    collapse_spaces(&out)
}

fn collapse_spaces(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch == ' ' {
            if !prev_space {
                out.push(' ');
            }
            prev_space = true;
        } else {
            out.push(ch);
            prev_space = false;
        }
    }
    out
}
