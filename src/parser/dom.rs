//! Minimal HTML scanning for the handful of known markup regions the
//! detail and listing pages use. Not a general HTML parser: it finds
//! elements by class token, slices out balanced inner HTML, and strips
//! tags/entities from the result.

use std::sync::LazyLock;

use regex::Regex;

static CLASS_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<([a-z][a-z0-9]*)\b[^>]*\bclass\s*=\s*"([^"]*)"[^>]*>"#).unwrap()
});

static ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(#x?[0-9a-fA-F]+|[a-zA-Z]+);").unwrap());

/// Inner HTML of the first element whose class attribute contains
/// `class` as a whole token.
pub fn class_block<'a>(html: &'a str, class: &str) -> Option<&'a str> {
    class_blocks(html, class).into_iter().next()
}

/// Inner HTML of every element carrying `class` as a whole token, in
/// document order. Elements without a matching close tag are dropped.
pub fn class_blocks<'a>(html: &'a str, class: &str) -> Vec<&'a str> {
    let mut out = Vec::new();
    for caps in CLASS_ATTR_RE.captures_iter(html) {
        let (Some(whole), Some(tag), Some(classes)) = (caps.get(0), caps.get(1), caps.get(2))
        else {
            continue;
        };
        if !classes.as_str().split_ascii_whitespace().any(|t| t == class) {
            continue;
        }
        if let Some(end) = find_close(html, whole.end(), tag.as_str()) {
            out.push(&html[whole.end()..end]);
        }
    }
    out
}

/// Inner HTML of every `<tag>` element inside `html`, in document order.
pub fn tag_blocks<'a>(html: &'a str, tag: &str) -> Vec<&'a str> {
    let lower = html.to_ascii_lowercase();
    let open = format!("<{}", tag.to_ascii_lowercase());
    let mut out = Vec::new();
    let mut pos = 0;

    while let Some(i) = lower[pos..].find(&open).map(|i| pos + i) {
        let after = i + open.len();
        if !is_tag_boundary(lower.as_bytes(), after) {
            pos = after;
            continue;
        }
        let Some(open_end) = lower[i..].find('>').map(|g| i + g + 1) else {
            break;
        };
        match find_close(html, open_end, tag) {
            Some(end) => {
                out.push(&html[open_end..end]);
                pos = end;
            }
            None => break,
        }
    }
    out
}

/// Scan forward from `from` (just past an open tag) and return the byte
/// offset where the matching close tag begins, tracking nesting of the
/// same tag name.
fn find_close(html: &str, from: usize, tag: &str) -> Option<usize> {
    let lower = html[from..].to_ascii_lowercase();
    let bytes = lower.as_bytes();
    let open = format!("<{}", tag.to_ascii_lowercase());
    let close = format!("</{}", tag.to_ascii_lowercase());

    let mut depth = 1usize;
    let mut pos = 0usize;
    while pos < lower.len() {
        let next_close = lower[pos..].find(&close).map(|i| pos + i)?;
        let next_open = lower[pos..].find(&open).map(|i| pos + i);

        if let Some(o) = next_open.filter(|&o| o < next_close) {
            if is_tag_boundary(bytes, o + open.len()) {
                depth += 1;
            }
            pos = o + open.len();
        } else {
            if is_tag_boundary(bytes, next_close + close.len()) {
                depth -= 1;
                if depth == 0 {
                    return Some(from + next_close);
                }
            }
            pos = next_close + close.len();
        }
    }
    None
}

fn is_tag_boundary(bytes: &[u8], idx: usize) -> bool {
    matches!(
        bytes.get(idx),
        Some(b'>' | b' ' | b'\t' | b'\n' | b'\r' | b'/') | None
    )
}

/// Drop everything between `<` and `>`; keeps text content verbatim,
/// including its whitespace.
pub fn strip_tags(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;
    for ch in s.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out
}

/// Decode the named entities that actually show up in these pages plus
/// numeric references. Unknown names pass through untouched.
pub fn decode_entities(s: &str) -> String {
    ENTITY_RE
        .replace_all(s, |caps: &regex::Captures| {
            let body = &caps[1];
            match body {
                "amp" => "&".to_string(),
                "lt" => "<".to_string(),
                "gt" => ">".to_string(),
                "quot" => "\"".to_string(),
                "apos" => "'".to_string(),
                "nbsp" => " ".to_string(),
                "lsquo" => "\u{2018}".to_string(),
                "rsquo" => "\u{2019}".to_string(),
                "ldquo" => "\u{201C}".to_string(),
                "rdquo" => "\u{201D}".to_string(),
                "ndash" => "\u{2013}".to_string(),
                "mdash" => "\u{2014}".to_string(),
                "hellip" => "\u{2026}".to_string(),
                _ if body.starts_with('#') => {
                    let (digits, radix) = match body.strip_prefix("#x") {
                        Some(hex) => (hex, 16),
                        None => (&body[1..], 10),
                    };
                    u32::from_str_radix(digits, radix)
                        .ok()
                        .and_then(char::from_u32)
                        .map(String::from)
                        .unwrap_or_default()
                }
                _ => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Collapse all whitespace runs to single spaces and trim.
pub fn normalize_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space {
                out.push(' ');
                prev_space = true;
            }
        } else {
            out.push(ch);
            prev_space = false;
        }
    }
    out.trim().to_string()
}

/// Single-line text of the first element with `class`: tags stripped,
/// entities decoded, whitespace collapsed.
pub fn class_text(html: &str, class: &str) -> Option<String> {
    class_block(html, class).map(|b| normalize_ws(&decode_entities(&strip_tags(b))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_token_among_others() {
        let html = r#"<div class="views-row views-row-1 odd"><span>x</span></div>"#;
        assert_eq!(class_block(html, "views-row"), Some("<span>x</span>"));
    }

    #[test]
    fn token_match_is_exact() {
        let html = r#"<div class="views-rowdy">nope</div>"#;
        assert!(class_block(html, "views-row").is_none());
    }

    #[test]
    fn nested_same_tag_balances() {
        let html = r#"<div class="outer">a<div>inner</div>b</div><div>tail</div>"#;
        assert_eq!(class_block(html, "outer"), Some("a<div>inner</div>b"));
    }

    #[test]
    fn multiple_blocks_in_order() {
        let html = r#"<div class="row">one</div><div class="row">two</div>"#;
        assert_eq!(class_blocks(html, "row"), vec!["one", "two"]);
    }

    #[test]
    fn paragraph_blocks() {
        let html = "<p>first</p>\n<p class=\"x\">second</p><pre>not a p</pre>";
        assert_eq!(tag_blocks(html, "p"), vec!["first", "second"]);
    }

    #[test]
    fn strip_tags_keeps_text_whitespace() {
        assert_eq!(strip_tags("a <em>b</em>\nc"), "a b\nc");
    }

    #[test]
    fn entities_named_and_numeric() {
        assert_eq!(decode_entities("A &amp; B&#39;s &#x2019;"), "A & B's \u{2019}");
        assert_eq!(decode_entities("&bogus;"), "&bogus;");
    }

    #[test]
    fn class_text_flattens() {
        let html = "<p class=\"president-name\">  Abraham\n  Lincoln </p>";
        assert_eq!(class_text(html, "president-name").as_deref(), Some("Abraham Lincoln"));
    }
}
