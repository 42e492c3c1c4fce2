//! Second pass over a meeting's own documents page.

use crate::fetch::PageSource;
use crate::schema::{BrokenLink, Link, Meeting};
use crate::urls::UrlFixer;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::{debug, warn};
use url::Url;

const AUDIO_EXTENSIONS: &[&str] = &[".mp3", ".wav", ".wma", ".m4a"];
const VIDEO_EXTENSIONS: &[&str] = &[".mp4", ".wmv", ".mov", ".m4v"];

static CONTENT: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    ["#fec_mainContent", "#content", "body"]
        .iter()
        .map(|css| Selector::parse(css).expect("invalid selector: content"))
        .collect()
});
static LINKS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("invalid selector: a[href]"));
static PARAGRAPHS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p").expect("invalid selector: p"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Media {
    Audio,
    Video,
    Captions,
}

fn classify(link: &Link) -> Option<Media> {
    let target = link.url.to_lowercase();
    let text = link.text.to_lowercase();
    let ends_with_any = |extensions: &[&str]| extensions.iter().any(|ext| target.ends_with(ext));

    if ends_with_any(AUDIO_EXTENSIONS) || text.contains("audio") {
        Some(Media::Audio)
    } else if ends_with_any(VIDEO_EXTENSIONS) || text.contains("video") {
        Some(Media::Video)
    } else if text.contains("caption") {
        Some(Media::Captions)
    } else {
        None
    }
}

fn content_root(document: &Html) -> Option<ElementRef<'_>> {
    CONTENT
        .iter()
        .find_map(|selector| document.select(selector).next())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Fills the page-derived fields of `meeting` from its documents page.
///
/// Meetings without an `old_meeting_url`, or whose page cannot be fetched,
/// come back unchanged.
pub fn enrich_meeting(
    source: &dyn PageSource,
    fixer: &UrlFixer<'_>,
    meeting: Meeting,
    broken: Vec<BrokenLink>,
) -> (Meeting, Vec<BrokenLink>) {
    if meeting.old_meeting_url.is_empty() {
        return (meeting, broken);
    }
    let html = match source.fetch(&meeting.old_meeting_url) {
        Ok(html) => html,
        Err(err) => {
            warn!(url = %meeting.old_meeting_url, error = %format!("{err:#}"), "meeting page not available");
            return (meeting, broken);
        }
    };
    enrich_from_document(&html, fixer, meeting, broken)
}

/// Same as [`enrich_meeting`] for a page that was already fetched.
pub fn enrich_from_document(
    html: &str,
    fixer: &UrlFixer<'_>,
    meeting: Meeting,
    mut broken: Vec<BrokenLink>,
) -> (Meeting, Vec<BrokenLink>) {
    let base = match Url::parse(&meeting.old_meeting_url) {
        Ok(base) => base,
        Err(err) => {
            warn!(url = %meeting.old_meeting_url, error = %err, "meeting URL is not absolute");
            return (meeting, broken);
        }
    };
    let document = Html::parse_document(html);
    let Some(root) = content_root(&document) else {
        return (meeting, broken);
    };

    let mut tested = HashSet::new();
    let mut audio_url = String::new();
    let mut video_url = String::new();
    let mut closed_captioning_url = String::new();
    let mut documents = Vec::new();

    for anchor in root.select(&LINKS) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let link = Link {
            text: collapse_whitespace(&anchor.text().collect::<String>()),
            title: anchor.value().attr("title").map(str::to_string),
            url: fixer.normalize(&base, href, &mut tested, &mut broken),
        };
        let slot = match classify(&link) {
            Some(Media::Audio) => &mut audio_url,
            Some(Media::Video) => &mut video_url,
            Some(Media::Captions) => &mut closed_captioning_url,
            None => {
                documents.push(link);
                continue;
            }
        };
        if slot.is_empty() {
            *slot = link.url;
        }
    }

    let pdf_disclaimer = root
        .select(&PARAGRAPHS)
        .map(|p| collapse_whitespace(&p.text().collect::<String>()))
        .find(|text| text.to_lowercase().contains("adobe reader"))
        .unwrap_or_default();

    debug!(
        url = %meeting.old_meeting_url,
        documents = documents.len(),
        "enriched meeting"
    );
    let meeting = Meeting {
        agenda_documents_linked: documents,
        audio_url,
        video_url,
        closed_captioning_url,
        pdf_disclaimer,
        body: root.inner_html(),
        ..meeting
    };
    (meeting, broken)
}
