//! Sanity summary of a finished crawl.

use crate::schema::{BrokenLink, Meeting};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlReport {
    pub dated: usize,
    /// Titles of meetings whose posted date could not be read.
    pub undated: Vec<String>,
    pub agenda_meetings: usize,
    pub notice_meetings: usize,
    pub unique_sunshine_urls: BTreeSet<String>,
    /// Sunshine Act notices linked from more than one meeting, with the count.
    pub duplicate_sunshine_urls: BTreeMap<String, usize>,
    /// Meetings per posted date (ISO 8601).
    pub per_date_counts: BTreeMap<String, usize>,
    pub broken_urls: BTreeSet<String>,
}

impl CrawlReport {
    pub fn build(meetings: &[Meeting], broken: &[BrokenLink]) -> Self {
        let mut report = CrawlReport::default();
        let mut sunshine_counts: BTreeMap<String, usize> = BTreeMap::new();

        for meeting in meetings {
            let Some(iso) = meeting
                .posted_date
                .as_ref()
                .filter(|date| date.is_parsed())
                .and_then(|date| date.iso8601.clone())
            else {
                report.undated.push(meeting.title_text.clone());
                continue;
            };
            report.dated += 1;
            *report.per_date_counts.entry(iso).or_default() += 1;

            if meeting.is_notice_only() {
                report.notice_meetings += 1;
            } else {
                report.agenda_meetings += 1;
            }
            for link in &meeting.sunshine_act_links {
                *sunshine_counts.entry(link.url.clone()).or_default() += 1;
            }
        }

        report.unique_sunshine_urls = sunshine_counts.keys().cloned().collect();
        report.duplicate_sunshine_urls = sunshine_counts
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .collect();
        report.broken_urls = broken.iter().map(|link| link.url.clone()).collect();
        report
    }

    /// Dates with more than one meeting posted.
    pub fn busy_dates(&self) -> impl Iterator<Item = (&str, usize)> {
        self.per_date_counts
            .iter()
            .filter(|(_, count)| **count > 1)
            .map(|(date, count)| (date.as_str(), *count))
    }
}

impl fmt::Display for CrawlReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "meetings: {} dated ({} agenda, {} notice only), {} undated",
            self.dated,
            self.agenda_meetings,
            self.notice_meetings,
            self.undated.len()
        )?;
        writeln!(f, "sunshine act notices: {}", self.unique_sunshine_urls.len())?;

        if !self.undated.is_empty() {
            writeln!(f, "\nundated meetings (review by hand):")?;
            for title in &self.undated {
                writeln!(f, "  {title:?}")?;
            }
        }
        if !self.duplicate_sunshine_urls.is_empty() {
            writeln!(f, "\nduplicate sunshine act links:")?;
            for (url, count) in &self.duplicate_sunshine_urls {
                writeln!(f, "  {count:>3}  {url}")?;
            }
        }
        let busy: Vec<_> = self.busy_dates().collect();
        if !busy.is_empty() {
            writeln!(f, "\ndates with several meetings:")?;
            for (date, count) in busy {
                writeln!(f, "  {count:>3}  {date}")?;
            }
        }
        if !self.broken_urls.is_empty() {
            writeln!(f, "\nbroken links:")?;
            for url in &self.broken_urls {
                writeln!(f, "  {url}")?;
            }
        }
        Ok(())
    }
}
