use thiserror::Error;

/// Layouts the extractor does not understand. Any of these halts the run:
/// guessing would silently produce a wrong record.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("unexpected column count: {0}")]
    ColumnCount(usize),
    #[error("unrecognized document link target: {0}")]
    UnknownDocumentLink(String),
    #[error("documents cell has {0} links after removing the second one")]
    DocumentLinkCount(usize),
    #[error("second documents link {second} does not repeat {first}")]
    DuplicateDocumentLink { first: String, second: String },
    #[error("approved minutes cell has {links} links and text {text:?}")]
    ApprovedMinutesCell { links: usize, text: String },
    #[error("expected a leading date in {0:?}")]
    MissingDate(String),
    #[error("no known date prefix in filename {0:?}")]
    UnknownFilename(String),
    #[error("unexpected date token {token:?} in filename {filename:?}")]
    FilenameDate { filename: String, token: String },
    #[error("anchor has no href: {0:?}")]
    MissingHref(String),
    #[error("{count} candidate data tables on {url}; inspect the page by hand")]
    AmbiguousTable { url: String, count: usize },
}

/// An [`ExtractError`] raised while reading one table row.
#[derive(Debug, Error)]
#[error("cannot parse row {index} on {page_url}: {row_text:?}")]
pub struct RowError {
    pub page_url: String,
    pub index: usize,
    pub row_text: String,
    #[source]
    pub source: ExtractError,
}
