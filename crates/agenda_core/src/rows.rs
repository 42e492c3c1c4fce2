//! One archive table row to one [`Meeting`].
//!
//! Rows have four cells (documents, draft minutes, approved minutes,
//! Sunshine Act notices), three (no draft) or two (documents and approved
//! only). Content is not always in the cell it belongs to, so each cell
//! parser may add to fields filled by an earlier one.

use crate::dates::{LEADING_DATE, extract_date_from_anchor, parse_date};
use crate::dom::{Anchor, Cell, Row};
use crate::error::ExtractError;
use crate::links::to_link;
use crate::schema::{Link, Meeting, MeetingType};
use std::collections::HashMap;

/// Approved-minutes cell texts that mean "no minutes", compared lowercased.
const NOT_APPLICABLE: &[&str] = &["", "n/a", "na", "meeting was cancelled", "-"];

/// Parses one data row. `Ok(None)` for rows known not to be meetings.
pub fn parse_row(row: &Row) -> Result<Option<Meeting>, ExtractError> {
    let lowered = row.text.to_lowercase();
    match row.cells.len() {
        1 if lowered.contains("adobe reader") => return Ok(None),
        2 if lowered.contains("approved minutes") => return Ok(None),
        _ => {}
    }

    let (docs, draft, approved, sunshine) = match row.cells.as_slice() {
        [docs, draft, approved, sunshine] => (docs, Some(draft), approved, Some(sunshine)),
        [docs, approved, sunshine] => (docs, None, approved, Some(sunshine)),
        [docs, approved] => (docs, None, approved, None),
        cells => return Err(ExtractError::ColumnCount(cells.len())),
    };

    let meeting = Meeting {
        meeting_type: MeetingType::Open,
        ..Meeting::default()
    };
    let meeting = parse_documents_cell(docs, meeting)?;
    let meeting = match draft {
        Some(cell) => Meeting {
            draft_minutes_links: cell.anchors().map(to_link).collect::<Result<_, _>>()?,
            ..meeting
        },
        None => meeting,
    };
    let meeting = parse_approved_cell(approved, meeting)?;
    let meeting = parse_sunshine_cell(sunshine, meeting)?;
    Ok(Some(meeting))
}

fn with_sunshine_link(meeting: Meeting, link: Link) -> Meeting {
    let mut links = meeting.sunshine_act_links.clone();
    links.push(link);
    Meeting {
        sunshine_act_links: links,
        ..meeting
    }
}

fn href_of(anchor: &Anchor) -> Result<&str, ExtractError> {
    anchor
        .href
        .as_deref()
        .ok_or_else(|| ExtractError::MissingHref(anchor.text.clone()))
}

fn leading_date(text: &str) -> Result<&str, ExtractError> {
    LEADING_DATE
        .find(text)
        .map(|found| found.as_str())
        .ok_or_else(|| ExtractError::MissingDate(text.to_string()))
}

fn parse_documents_cell(cell: &Cell, meeting: Meeting) -> Result<Meeting, ExtractError> {
    let mut meeting = meeting;
    let mut cell = cell.clone();

    // A second link is either a stray Sunshine Act notice or a repeat of the
    // first link; either way it leaves the cell.
    let anchors: Vec<&Anchor> = cell.anchors().collect();
    if let [first, second, ..] = anchors.as_slice() {
        let second_href = href_of(second)?;
        if second_href.contains("sunshine") {
            let link = Link {
                text: format!("{}{}", second.text, second.tail).trim().to_string(),
                title: second.title.clone(),
                url: second_href.to_string(),
            };
            meeting = with_sunshine_link(meeting, link);
        } else {
            let first_href = href_of(first)?;
            if first_href != second_href {
                return Err(ExtractError::DuplicateDocumentLink {
                    first: first_href.to_string(),
                    second: second_href.to_string(),
                });
            }
        }
        cell = cell.without_anchor(1);
    }

    let anchors: Vec<&Anchor> = cell.anchors().collect();
    match anchors.as_slice() {
        [anchor] => {
            let href = href_of(anchor)?;
            let cell_text = cell.text().trim().to_string();
            if href.contains("notice") {
                // A notice in the documents cell: the cell text is the title
                // and the link is one of the meeting's notices.
                let posted = parse_date(leading_date(&cell_text)?, None);
                let link = Link {
                    text: cell_text.clone(),
                    title: anchor.title.clone(),
                    url: href.to_string(),
                };
                let meeting = Meeting {
                    title_text: cell_text,
                    posted_date: Some(posted),
                    ..meeting
                };
                Ok(with_sunshine_link(meeting, link))
            } else if href.contains("agenda") {
                Ok(Meeting {
                    link_title_text: anchor.title.clone().unwrap_or_default(),
                    old_meeting_url: href.to_string(),
                    posted_date: Some(extract_date_from_anchor(anchor)?),
                    title_text: cell_text,
                    ..meeting
                })
            } else {
                Err(ExtractError::UnknownDocumentLink(href.to_string()))
            }
        }
        [] => {
            let title_text = cell.text().trim().replace(" ,", ",");
            let posted = parse_date(leading_date(&title_text)?, None);
            Ok(Meeting {
                title_text,
                posted_date: Some(posted),
                ..meeting
            })
        }
        more => Err(ExtractError::DocumentLinkCount(more.len())),
    }
}

fn parse_approved_cell(cell: &Cell, meeting: Meeting) -> Result<Meeting, ExtractError> {
    let anchors: Vec<&Anchor> = cell.anchors().collect();
    let text = cell.text();

    let anchor = match anchors.as_slice() {
        [anchor] => *anchor,
        [] if NOT_APPLICABLE.contains(&text.trim().to_lowercase().as_str()) => return Ok(meeting),
        _ => {
            return Err(ExtractError::ApprovedMinutesCell {
                links: anchors.len(),
                text: text.trim().to_string(),
            });
        }
    };

    let approved_date = if let Some(found) = LEADING_DATE.find(&text) {
        Some(parse_date(found.as_str(), None))
    } else if text.contains("Transcript") {
        // transcripts carry no date of their own
        meeting.posted_date.clone()
    } else {
        Some(parse_date(&anchor.text, None))
    };

    Ok(Meeting {
        approved_minutes_date: approved_date,
        approved_minutes_link: Some(to_link(anchor)?),
        ..meeting
    })
}

fn parse_sunshine_cell(cell: Option<&Cell>, meeting: Meeting) -> Result<Meeting, ExtractError> {
    let mut links = meeting.sunshine_act_links.clone();
    if let Some(cell) = cell {
        for anchor in cell.anchors() {
            links.push(to_link(anchor)?);
        }
    }
    Ok(Meeting {
        sunshine_act_links: dedup_sunshine_links(links),
        ..meeting
    })
}

/// Keeps one link per target URL, the one with the longest text.
///
/// First-seen URL order is preserved; on equal length the earlier link wins.
pub fn dedup_sunshine_links(links: Vec<Link>) -> Vec<Link> {
    let mut order: Vec<String> = Vec::new();
    let mut best: HashMap<String, Link> = HashMap::new();
    for link in links {
        let replace = match best.get(&link.url) {
            Some(kept) => text_len(&link) > text_len(kept),
            None => {
                order.push(link.url.clone());
                true
            }
        };
        if replace {
            best.insert(link.url.clone(), link);
        }
    }
    order.into_iter().filter_map(|url| best.remove(&url)).collect()
}

fn text_len(link: &Link) -> usize {
    link.text.trim().chars().count()
}
