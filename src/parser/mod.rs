pub mod dom;

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use tracing::warn;

use crate::tables::RawSpeech;

static TITLE_TAIL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^.*: (.*)$").unwrap());
static BLANK_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{2,}").unwrap());

/// Transcript container layouts seen on detail pages, probed in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TranscriptLayout {
    /// Current layout: `.transcript-inner`.
    Inner,
    /// Older layout: `.view-transcript`; its paragraphs carry stray
    /// blank-line runs that get collapsed to one newline.
    View,
}

impl TranscriptLayout {
    fn locate(html: &str) -> Option<(Self, &str)> {
        if let Some(block) = dom::class_block(html, "transcript-inner") {
            return Some((Self::Inner, block));
        }
        dom::class_block(html, "view-transcript").map(|b| (Self::View, b))
    }

    fn paragraphs(self, block: &str) -> Vec<String> {
        dom::tag_blocks(block, "p")
            .into_iter()
            .map(|p| {
                let text = dom::decode_entities(&dom::strip_tags(p));
                let text = text.trim();
                match self {
                    Self::Inner => text.to_string(),
                    Self::View => BLANK_RUN_RE.replace_all(text, "\n").into_owned(),
                }
            })
            .collect()
    }
}

/// Parse one detail page into a raw speech record.
///
/// Returns `None` for a missed page: metadata regions absent, an
/// unparseable date, or no transcript text. The caller decides how to
/// count and log misses.
pub fn parse_speech_page(html: &str) -> Option<RawSpeech> {
    let about = dom::class_block(html, "about-this-episode")?;
    let name = dom::class_text(about, "president-name")?;
    let date_text = dom::class_text(about, "episode-date")?;
    let Some(date) = parse_episode_date(&date_text) else {
        warn!("unparseable episode date: {:?}", date_text);
        return None;
    };

    let title = speech_title(&dom::class_text(html, "presidential-speeches--title")?);

    let (layout, block) = TranscriptLayout::locate(html)?;
    let content = layout.paragraphs(block).join("\n");
    if content.trim().is_empty() {
        return None;
    }

    Some(RawSpeech { name, date, title, content })
}

fn parse_episode_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%B %d, %Y").ok()
}

/// Display titles read "<prefix>: <title>"; keep the part after the last
/// colon, or the whole string when there is no prefix.
fn speech_title(raw: &str) -> String {
    TITLE_TAIL_RE
        .captures(raw)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| raw.to_string())
}

// ── Tests ──
