//! Making archive links absolute, and fixing or flagging the broken ones.

use crate::dom::Table;
use crate::fetch::LinkChecker;
use crate::schema::BrokenLink;
use scraper::ElementRef;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, warn};
use url::Url;

/// URLs found broken in an earlier pass. `Some` is a working replacement,
/// `None` means no replacement is known and the link stays flagged.
pub const KNOWN_BROKEN: &[(&str, Option<&str>)] = &[
    ("http://www.fec.gov/agenda/2014/approved_14-2-a.pdf", None),
    ("http://www.fec.gov/agenda/2014/approved_14-1-a.pdf", None),
    (
        "http://www.fec.gov/agenda/2010/2011/mtgdoc1101.pdf",
        Some("http://www.fec.gov/agenda/2011/mtgdoc1101.pdf"),
    ),
    (
        "http://www.fec.gov/agenda/sunshine/2009/notice20091210.pdf",
        Some("http://www.fec.gov/sunshine/2009/notice20091210.pdf"),
    ),
    (
        "http://www.fec.gov/agenda/sunshine/2009/notice20091202.pdf",
        Some("http://www.fec.gov/sunshine/2009/notice20091202.pdf"),
    ),
    (
        "http://www.fec.gov/agenda/sunshine/2009/notice20091117.pdf",
        Some("http://www.fec.gov/sunshine/2009/notice20091117.pdf"),
    ),
    (
        "http://www.fec.gov/agenda/sunshine/2009/notice20091103.pdf",
        Some("http://www.fec.gov/sunshine/2009/notice20091103.pdf"),
    ),
    (
        "http://www.fec.gov/agenda/sunshine/2009/notice20091027.pdf",
        Some("http://www.fec.gov/sunshine/2009/notice20091027.pdf"),
    ),
    (
        "http://www.fec.gov/agenda/sunshine/2009/notice20091001.pdf",
        Some("http://www.fec.gov/sunshine/2009/notice20091001.pdf"),
    ),
    (
        "http://www.fec.gov/agenda/sunshine/2009/notice20090917.pdf",
        Some("http://www.fec.gov/sunshine/2009/notice20090917.pdf"),
    ),
    (
        "http://www.fec.gov/agenda/sunshine/2009/notice20090820.pdf",
        Some("http://www.fec.gov/sunshine/2009/notice20090820.pdf"),
    ),
    (
        "http://www.fec.gov/agenda/sunshine/2009/notice20090722.pdf",
        Some("http://www.fec.gov/sunshine/2009/notice20090722.pdf"),
    ),
    (
        "http://www.fec.gov/agenda/sunshine/2009/notice20090709.pdf",
        Some("http://www.fec.gov/sunshine/2009/notice20090709.pdf"),
    ),
    (
        "http://www.fec.gov/agenda/sunshine/2009/notice20090617.pdf",
        Some("http://www.fec.gov/sunshine/2009/notice20090617.pdf"),
    ),
    (
        "http://www.fec.gov/agenda/sunshine/2009/notice20090610.pdf",
        Some("http://www.fec.gov/sunshine/2009/notice20090610.pdf"),
    ),
    (
        "http://www.fec.gov/agenda/sunshine/2009/notice20090512.pdf",
        Some("http://www.fec.gov/sunshine/2009/notice20090512.pdf"),
    ),
    (
        "http://www.fec.gov/agenda/sunshine/2009/notice20090501.pdf",
        Some("http://www.fec.gov/sunshine/2009/notice20090501.pdf"),
    ),
    (
        "http://www.fec.gov/agenda/sunshine/2009/notice20090428.pdf",
        Some("http://www.fec.gov/sunshine/2009/notice20090428.pdf"),
    ),
    (
        "http://www.fec.gov/agenda/sunshine/2009/notice20090417.pdf",
        Some("http://www.fec.gov/sunshine/2009/notice20090417.pdf"),
    ),
    (
        "http://www.fec.gov/agenda/sunshine/2009/notice20090409.pdf",
        Some("http://www.fec.gov/sunshine/2009/notice20090409.pdf"),
    ),
    (
        "http://www.fec.gov/agenda/sunshine/2009/notice20090313.pdf",
        Some("http://www.fec.gov/sunshine/2009/notice20090313.pdf"),
    ),
    (
        "http://www.fec.gov/agenda/sunshine/2009/notice20090306.pdf",
        Some("http://www.fec.gov/sunshine/2009/notice20090306.pdf"),
    ),
    (
        "http://www.fec.gov/agenda/sunshine/2009/notice20090227.pdf",
        Some("http://www.fec.gov/sunshine/2009/notice20090227.pdf"),
    ),
    (
        "http://www.fec.gov/agenda/sunshine/2009/notice20090205.pdf",
        Some("http://www.fec.gov/sunshine/2009/notice20090205.pdf"),
    ),
    (
        "http://www.fec.gov/agenda/sunshine/2009/notice20090122.pdf",
        Some("http://www.fec.gov/sunshine/2009/notice20090122.pdf"),
    ),
    (
        "http://www.fec.gov/agenda/sunshine/2009/notice20090107.pdf",
        Some("http://www.fec.gov/sunshine/2009/notice20090107.pdf"),
    ),
    (
        "http://www.fec.gov/agenda/sunshine/2008/notice20081231.pdf",
        Some("http://www.fec.gov/sunshine/2008/notice20081231.pdf"),
    ),
];

pub struct UrlFixer<'a> {
    overrides: HashMap<String, Option<String>>,
    checker: Option<&'a dyn LinkChecker>,
}

impl<'a> UrlFixer<'a> {
    /// Built-in table plus `extra` (empty value = no known replacement).
    /// Liveness checks run only when a `checker` is given.
    pub fn new(extra: &BTreeMap<String, String>, checker: Option<&'a dyn LinkChecker>) -> Self {
        let mut overrides: HashMap<String, Option<String>> = KNOWN_BROKEN
            .iter()
            .map(|(broken, fixed)| (broken.to_string(), fixed.map(str::to_string)))
            .collect();
        for (broken, fixed) in extra {
            let fixed = (!fixed.trim().is_empty()).then(|| fixed.trim().to_string());
            overrides.insert(broken.trim().to_string(), fixed);
        }
        Self { overrides, checker }
    }

    /// Resolves `raw` against `base` and applies the override table.
    ///
    /// `tested` remembers which URLs were already dealt with so each is
    /// checked once; failures are appended to `broken`.
    pub fn normalize(
        &self,
        base: &Url,
        raw: &str,
        tested: &mut HashSet<String>,
        broken: &mut Vec<BrokenLink>,
    ) -> String {
        let resolved = match base.join(raw.trim()) {
            Ok(url) => url.to_string(),
            Err(err) => {
                warn!(base = %base, raw, error = %err, "cannot resolve link");
                raw.trim().to_string()
            }
        };

        match self.overrides.get(&resolved) {
            Some(Some(replacement)) => {
                debug!(from = %resolved, to = %replacement, "replaced known broken link");
                tested.insert(replacement.clone());
                replacement.clone()
            }
            Some(None) => {
                tested.insert(resolved.clone());
                broken.push(BrokenLink {
                    page_url: base.to_string(),
                    url: resolved.clone(),
                });
                resolved
            }
            None => {
                if let Some(checker) = self.checker {
                    self.check(checker, base, &resolved, tested, broken);
                }
                resolved
            }
        }
    }

    fn check(
        &self,
        checker: &dyn LinkChecker,
        base: &Url,
        url: &str,
        tested: &mut HashSet<String>,
        broken: &mut Vec<BrokenLink>,
    ) {
        if !tested.insert(url.to_string()) {
            return;
        }
        let is_web = Url::parse(url)
            .map(|parsed| matches!(parsed.scheme(), "http" | "https"))
            .unwrap_or(false);
        if is_web && !checker.is_live(url) {
            warn!(page = %base, url, "broken link");
            broken.push(BrokenLink {
                page_url: base.to_string(),
                url: url.to_string(),
            });
        }
    }

    /// Copies `table` with every link normalized against `base`.
    ///
    /// The fetched document is left untouched. Returns the copy and `broken`
    /// extended with this table's failures.
    pub fn apply_to_table(
        &self,
        table: ElementRef<'_>,
        base: &Url,
        mut broken: Vec<BrokenLink>,
    ) -> (Table, Vec<BrokenLink>) {
        let mut tested = HashSet::new();
        let snapshot = Table::snapshot(table, &mut |href| {
            self.normalize(base, href, &mut tested, &mut broken)
        });
        (snapshot, broken)
    }
}
