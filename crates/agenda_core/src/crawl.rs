//! Whole-archive crawl: root page, yearly pages, optional meeting pages.

use crate::enrich::enrich_meeting;
use crate::fetch::PageSource;
use crate::page::extract_page;
use crate::schema::{BrokenLink, Meeting};
use crate::urls::UrlFixer;
use anyhow::{Context, Result};
use scraper::{Html, Selector};
use std::sync::LazyLock;
use tracing::{debug, info};
use url::Url;

static YEAR_LINKS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("ul > li > a").expect("invalid selector: ul > li > a"));

/// Everything one crawl produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlOutcome {
    pub meetings: Vec<Meeting>,
    pub broken_links: Vec<BrokenLink>,
}

pub struct Crawler<'a> {
    source: &'a dyn PageSource,
    fixer: &'a UrlFixer<'a>,
    fetch_meeting_pages: bool,
}

impl<'a> Crawler<'a> {
    pub fn new(source: &'a dyn PageSource, fixer: &'a UrlFixer<'a>) -> Self {
        Self {
            source,
            fixer,
            fetch_meeting_pages: false,
        }
    }

    pub fn fetch_meeting_pages(mut self, enabled: bool) -> Self {
        self.fetch_meeting_pages = enabled;
        self
    }

    /// Yearly archive pages linked as "Open Meetings" from the root page.
    ///
    /// Unlike the yearly pages, the root page must be reachable.
    pub fn discover_annual_urls(&self, root_url: &str) -> Result<Vec<String>> {
        let root = Url::parse(root_url).with_context(|| format!("invalid root URL {root_url}"))?;
        let html = self
            .source
            .fetch(root_url)
            .with_context(|| format!("fetching root page {root_url}"))?;
        let document = Html::parse_document(&html);

        let mut urls: Vec<String> = Vec::new();
        for anchor in document.select(&YEAR_LINKS) {
            if !anchor.text().collect::<String>().contains("Open Meetings") {
                continue;
            }
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            let url = root
                .join(href.trim())
                .with_context(|| format!("resolving {href} against {root_url}"))?
                .to_string();
            if url != root_url && !urls.contains(&url) {
                urls.push(url);
            }
        }
        info!(root = root_url, pages = urls.len(), "discovered yearly pages");
        Ok(urls)
    }

    /// Crawls the root page and every yearly page it links to.
    ///
    /// Fatal layout errors stop the crawl; unavailable pages do not.
    pub fn run(&self, root_url: &str) -> Result<CrawlOutcome> {
        let mut pages = vec![root_url.to_string()];
        pages.extend(self.discover_annual_urls(root_url)?);

        let mut meetings = Vec::new();
        let mut broken = Vec::new();
        for page in &pages {
            let (found, carried) = extract_page(self.source, self.fixer, page, broken)?;
            debug!(url = %page, meetings = found.len(), "page done");
            meetings.extend(found);
            broken = carried;
        }

        if self.fetch_meeting_pages {
            let mut enriched = Vec::with_capacity(meetings.len());
            for meeting in meetings {
                let (meeting, carried) = enrich_meeting(self.source, self.fixer, meeting, broken);
                enriched.push(meeting);
                broken = carried;
            }
            meetings = enriched;
        }

        info!(
            pages = pages.len(),
            meetings = meetings.len(),
            broken = broken.len(),
            "crawl finished"
        );
        Ok(CrawlOutcome {
            meetings,
            broken_links: broken,
        })
    }
}
