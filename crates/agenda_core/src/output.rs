use crate::schema::{BrokenLink, Meeting};
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

const STAMP: &[BorrowedFormatItem<'_>] =
    format_description!("[year]-[month]-[day]-[hour][minute][second]");

/// Files written by [`write_outputs`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Written {
    pub meetings: PathBuf,
    /// Only written when there were broken links.
    pub bad_urls: Option<PathBuf>,
}

/// Meetings in posted-date order, undated ones last. Ties keep crawl order.
pub fn sort_meetings(meetings: &mut [Meeting]) {
    meetings.sort_by_key(|meeting| {
        let posted = meeting.posted_on();
        (posted.is_none(), posted)
    });
}

/// `[`, one compact object per line, `]`.
fn to_json_lines<T: Serialize>(items: &[T]) -> Result<String> {
    let lines = items
        .iter()
        .map(serde_json::to_string)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(format!("[\n{}\n]\n", lines.join(",\n")))
}

/// Writes `<prefix>--<stamp>.json` and, when `broken` is not empty,
/// `<prefix>--bad-urls--<stamp>.json` into `dir`.
pub fn write_outputs(
    dir: &Path,
    prefix: &str,
    meetings: &[Meeting],
    broken: &[BrokenLink],
    now: OffsetDateTime,
) -> Result<Written> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let stamp = now.format(STAMP).context("formatting output timestamp")?;

    let mut sorted = meetings.to_vec();
    sort_meetings(&mut sorted);
    let meetings_path = dir.join(format!("{prefix}--{stamp}.json"));
    fs::write(&meetings_path, to_json_lines(&sorted)?)
        .with_context(|| format!("writing {}", meetings_path.display()))?;

    let bad_urls = if broken.is_empty() {
        None
    } else {
        let path = dir.join(format!("{prefix}--bad-urls--{stamp}.json"));
        fs::write(&path, to_json_lines(broken)?)
            .with_context(|| format!("writing {}", path.display()))?;
        Some(path)
    };

    Ok(Written {
        meetings: meetings_path,
        bad_urls,
    })
}
