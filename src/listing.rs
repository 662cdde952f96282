use std::sync::LazyLock;

use regex::Regex;
use tracing::{info, warn};

use crate::parser::dom;

static HREF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?is)<a\b[^>]*\bhref\s*=\s*"([^"]+)""#).unwrap());

/// Extract detail-page URLs from the cached listing HTML.
///
/// One `.views-row` per speech; the link sits in its `.views-field-title`
/// region. Rows without a link are logged and skipped. Relative hrefs are
/// joined onto `base_url`.
pub fn detail_links(html: &str, base_url: &str) -> Vec<String> {
    let rows = dom::class_blocks(html, "views-row");
    let mut links = Vec::with_capacity(rows.len());

    for row in rows {
        let href = dom::class_block(row, "views-field-title")
            .and_then(|field| HREF_RE.captures(field))
            .map(|caps| caps[1].to_string());
        match href {
            Some(h) => links.push(absolutize(&h, base_url)),
            None => warn!("listing row without a detail link"),
        }
    }

    info!("Listing rows with links: {}", links.len());
    links
}

fn absolutize(href: &str, base_url: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else {
        format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            href.trim_start_matches('/')
        )
    }
}
