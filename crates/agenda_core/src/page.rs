//! One yearly listing page to the meetings in its data table.

use crate::error::{ExtractError, RowError};
use crate::fetch::PageSource;
use crate::rows::parse_row;
use crate::schema::{BrokenLink, Meeting};
use crate::urls::UrlFixer;
use anyhow::{Context, Result};
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use tracing::{debug, info, warn};
use url::Url;

/// Selectors for the data table, tried in order until exactly one matches.
pub const TABLE_SELECTORS: [&str; 3] = [
    "table.agenda_table[summary='Data table']",
    "table[summary='Data table']",
    "table[border='0'][width='60%']",
];

static TABLE_QUERIES: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    TABLE_SELECTORS
        .iter()
        .map(|css| Selector::parse(css).expect("invalid selector: data table"))
        .collect()
});

/// Candidate data tables in `document`.
///
/// Each selector is tried in turn; the first to match exactly one table
/// wins. Otherwise the largest match seen is returned, so a page where some
/// selector found several tables is never mistaken for one with none.
pub fn locate_tables(document: &Html) -> Vec<ElementRef<'_>> {
    let mut widest: Vec<ElementRef<'_>> = Vec::new();
    for query in TABLE_QUERIES.iter() {
        let tables: Vec<_> = document.select(query).collect();
        if tables.len() == 1 {
            return tables;
        }
        if tables.len() > widest.len() {
            widest = tables;
        }
    }
    widest
}

/// Fetches `url` and parses its data table.
///
/// A page that cannot be fetched or has no data table yields no meetings.
/// Returns the meetings and `broken` extended with this page's broken links.
pub fn extract_page(
    source: &dyn PageSource,
    fixer: &UrlFixer<'_>,
    url: &str,
    broken: Vec<BrokenLink>,
) -> Result<(Vec<Meeting>, Vec<BrokenLink>)> {
    let html = match source.fetch(url) {
        Ok(html) => html,
        Err(err) => {
            warn!(url, error = %format!("{err:#}"), "listing page not available");
            return Ok((Vec::new(), broken));
        }
    };
    extract_document(&html, fixer, url, broken)
}

/// Parses an already fetched listing page.
pub fn extract_document(
    html: &str,
    fixer: &UrlFixer<'_>,
    url: &str,
    broken: Vec<BrokenLink>,
) -> Result<(Vec<Meeting>, Vec<BrokenLink>)> {
    let base = Url::parse(url).with_context(|| format!("invalid page URL {url}"))?;
    let document = Html::parse_document(html);

    let table = match locate_tables(&document).as_slice() {
        [table] => *table,
        [] => {
            warn!(url, "no data table found");
            return Ok((Vec::new(), broken));
        }
        tables => {
            return Err(ExtractError::AmbiguousTable {
                url: url.to_string(),
                count: tables.len(),
            }
            .into());
        }
    };

    let (table, broken) = fixer.apply_to_table(table, &base, broken);
    debug!(url, rows = table.rows.len(), "located data table");

    let mut meetings = Vec::new();
    for (index, row) in table.rows.iter().enumerate() {
        if row.has_header || row.text.trim().is_empty() {
            continue;
        }
        let parsed = parse_row(row).map_err(|source| RowError {
            page_url: url.to_string(),
            index,
            row_text: row.text.trim().to_string(),
            source,
        })?;
        meetings.extend(parsed);
    }

    info!(url, meetings = meetings.len(), "parsed listing page");
    Ok((meetings, broken))
}
