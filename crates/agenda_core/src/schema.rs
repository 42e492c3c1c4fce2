use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A date read from the archive, together with the text it came from.
///
/// `calendar_date` and `iso8601` are either both set or both `None`; use
/// [`Date::parsed`] and [`Date::unparsed`] to build one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Date {
    #[schemars(with = "Option<String>")]
    pub calendar_date: Option<time::Date>,
    pub iso8601: Option<String>, // e.g. "2016-12-13"
    pub original: String,        // the text as it appeared on the page
    pub source: String,          // where the date was actually read from
}

impl Date {
    pub fn parsed(date: time::Date, original: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            calendar_date: Some(date),
            iso8601: Some(crate::dates::iso8601(date)),
            original: original.into(),
            source: source.into(),
        }
    }

    pub fn unparsed(original: impl Into<String>) -> Self {
        let original = original.into();
        Self {
            calendar_date: None,
            iso8601: None,
            source: original.clone(),
            original,
        }
    }

    pub fn is_parsed(&self) -> bool {
        self.calendar_date.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Link {
    pub text: String,
    pub title: Option<String>, // the anchor's title attribute, if any
    pub url: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum MeetingType {
    Open,
    Executive,
    #[default]
    Unknown,
}

/// One row of a commission-meeting archive table.
///
/// Built up by struct-update (`Meeting { field, ..meeting }`) as each cell of
/// the row is read; never modified once the row is done.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Meeting {
    pub agenda_documents_linked: Vec<Link>,
    pub approved_minutes_date: Option<Date>,
    pub approved_minutes_link: Option<Link>,
    pub audio_url: String,
    pub body: String, // HTML
    pub closed_captioning_url: String,
    pub draft_minutes_links: Vec<Link>,
    pub link_title_text: String,
    pub meeting_type: MeetingType,
    pub pdf_disclaimer: String,
    pub posted_date: Option<Date>,
    pub old_meeting_url: String,
    pub sunshine_act_links: Vec<Link>,
    pub title_text: String,
    pub video_url: String,
}

impl Meeting {
    pub fn posted_on(&self) -> Option<time::Date> {
        self.posted_date.as_ref().and_then(|date| date.calendar_date)
    }

    /// A meeting known only through its Sunshine Act notice: no agenda page
    /// and no approved minutes.
    pub fn is_notice_only(&self) -> bool {
        self.old_meeting_url.is_empty()
            && self.approved_minutes_link.is_none()
            && !self.sunshine_act_links.is_empty()
    }
}

/// A link target that failed validation, and the page it was found on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct BrokenLink {
    pub page_url: String,
    pub url: String,
}
