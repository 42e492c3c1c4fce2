use agenda_core::crawl::Crawler;
use agenda_core::error::{ExtractError, RowError};
use agenda_core::fetch::{LinkChecker, PageSource};
use agenda_core::output::write_outputs;
use agenda_core::report::CrawlReport;
use agenda_core::schema::{Meeting, MeetingType};
use agenda_core::urls::UrlFixer;
use anyhow::{Result, anyhow};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use time::macros::datetime;

const ROOT: &str = "http://www.fec.gov/agenda/agendas.shtml";
const Y2011: &str = "http://www.fec.gov/agenda/2011/agendas2011.shtml";
const Y2010: &str = "http://www.fec.gov/agenda/2010/agendas2010.shtml";
const Y2009: &str = "http://www.fec.gov/agenda/2009/agendas2009.shtml";

const ROOT_PAGE: &str = r#"<html><body>
<ul>
  <li><a href="2011/agendas2011.shtml">2011 Open Meetings</a></li>
  <li><a href="2010/agendas2010.shtml">2010 Open Meetings</a></li>
  <li><a href="2009/agendas2009.shtml">2009 Open Meetings</a></li>
</ul>
<table class="agenda_table" summary="Data table">
  <tr><th>Agenda</th><th>Draft Minutes</th><th>Approved Minutes</th><th>Sunshine Notice</th></tr>
  <tr>
    <td><a href="2012/agenda20120112.shtml" title="Open Meeting">January 12, 2012</a></td>
    <td><a href="2012/draft20120112.pdf">Draft</a></td>
    <td>N/A</td>
    <td><a href="/sunshine/2012/notice20120105.pdf">Notice</a></td>
  </tr>
</table>
</body></html>"#;

const PAGE_2011: &str = r#"<html><body>
<table summary="Data table">
  <tr><th>Agenda</th><th>Approved Minutes</th><th>Sunshine Notice</th></tr>
  <tr>
    <td><a href="agenda20110106.shtml">January 6, 2011</a></td>
    <td><a href="/agenda/2010/2011/mtgdoc1101.pdf">January 20, 2011</a></td>
    <td><a href="/sunshine/2010/notice20101230.pdf">Notice</a></td>
  </tr>
  <tr>
    <td><a href="/sunshine/2011/notice20110126.pdf">February 2, 2011 Canceled</a></td>
    <td>&#160;</td>
    <td><a href="/sunshine/2011/notice20110126.pdf">Notice</a></td>
  </tr>
  <tr><td colspan="3">Viewing documents requires Adobe Reader.</td></tr>
</table>
</body></html>"#;

const PAGE_2010: &str = r#"<html><body>
<table border="0" width="60%">
  <tr>
    <td><a href="agenda20100304b.shtml">March 4, 2010<br></a>(2:00 PM)<a href="/sunshine/2010/notice20100302pdf.pdf">Canceled</a></td>
    <td>N/A</td>
  </tr>
  <tr><td>   </td><td></td></tr>
</table>
</body></html>"#;

const MEETING_2011: &str = r#"<html><body><div id="fec_mainContent">
  <a href="mtgdoc_11-01-a.pdf">Draft AO 2010-29</a>
  <a href="audio/20110106.mp3">Audio</a>
</div></body></html>"#;

struct Archive {
    pages: HashMap<&'static str, &'static str>,
    requests: RefCell<Vec<String>>,
}

impl Archive {
    fn new(pages: &[(&'static str, &'static str)]) -> Self {
        Self {
            pages: pages.iter().copied().collect(),
            requests: RefCell::new(Vec::new()),
        }
    }
}

impl PageSource for Archive {
    fn fetch(&self, url: &str) -> Result<String> {
        self.requests.borrow_mut().push(url.to_string());
        self.pages
            .get(url)
            .map(|html| html.to_string())
            .ok_or_else(|| anyhow!("503 Service Unavailable: {url}"))
    }
}

struct DeadLinks(&'static [&'static str]);

impl LinkChecker for DeadLinks {
    fn is_live(&self, url: &str) -> bool {
        !self.0.iter().any(|dead| *dead == url)
    }
}

fn archive() -> Archive {
    Archive::new(&[(ROOT, ROOT_PAGE), (Y2011, PAGE_2011), (Y2010, PAGE_2010)])
}

fn by_title<'m>(meetings: &'m [Meeting], title: &str) -> &'m Meeting {
    meetings
        .iter()
        .find(|meeting| meeting.title_text.starts_with(title))
        .unwrap_or_else(|| panic!("no meeting titled {title:?}"))
}

#[test]
fn crawls_root_and_yearly_pages() {
    let source = archive();
    let fixer = UrlFixer::new(&BTreeMap::new(), None);
    let outcome = Crawler::new(&source, &fixer).run(ROOT).unwrap();

    assert_eq!(outcome.meetings.len(), 4);
    assert!(outcome.broken_links.is_empty());
    assert!(outcome.meetings.iter().all(|m| m.meeting_type == MeetingType::Open));

    let january = by_title(&outcome.meetings, "January 12, 2012");
    assert_eq!(january.old_meeting_url, "http://www.fec.gov/agenda/2012/agenda20120112.shtml");
    assert_eq!(january.link_title_text, "Open Meeting");
    assert_eq!(january.draft_minutes_links[0].url, "http://www.fec.gov/agenda/2012/draft20120112.pdf");
    assert_eq!(
        january.sunshine_act_links[0].url,
        "http://www.fec.gov/sunshine/2012/notice20120105.pdf"
    );

    // known broken path, replaced on the way in
    let minutes = by_title(&outcome.meetings, "January 6, 2011");
    assert_eq!(
        minutes.approved_minutes_link.as_ref().unwrap().url,
        "http://www.fec.gov/agenda/2011/mtgdoc1101.pdf"
    );

    let cancelled = by_title(&outcome.meetings, "February 2, 2011");
    assert!(cancelled.is_notice_only());

    let march = by_title(&outcome.meetings, "March 4, 2010");
    assert_eq!(march.posted_date.as_ref().unwrap().iso8601.as_deref(), Some("2010-03-04"));
    assert_eq!(march.sunshine_act_links.len(), 1);

    // 2009 is unavailable: logged and skipped
    assert!(source.requests.borrow().iter().any(|url| url == Y2009));
}

#[test]
fn broken_links_accumulate_once_per_page() {
    let source = archive();
    let checker = DeadLinks(&["http://www.fec.gov/agenda/2012/draft20120112.pdf"]);
    let mut extra = BTreeMap::new();
    extra.insert("http://www.fec.gov/agenda/2010/agenda20100304b.shtml".to_string(), String::new());
    let fixer = UrlFixer::new(&extra, Some(&checker));
    let outcome = Crawler::new(&source, &fixer).run(ROOT).unwrap();

    let broken: Vec<_> = outcome
        .broken_links
        .iter()
        .map(|link| (link.page_url.as_str(), link.url.as_str()))
        .collect();
    assert_eq!(
        broken,
        [
            (ROOT, "http://www.fec.gov/agenda/2012/draft20120112.pdf"),
            (Y2010, "http://www.fec.gov/agenda/2010/agenda20100304b.shtml"),
        ]
    );
}

#[test]
fn meeting_pages_are_fetched_when_enabled() {
    let source = Archive::new(&[
        (ROOT, ROOT_PAGE),
        (Y2011, PAGE_2011),
        ("http://www.fec.gov/agenda/2011/agenda20110106.shtml", MEETING_2011),
    ]);
    let fixer = UrlFixer::new(&BTreeMap::new(), None);
    let outcome = Crawler::new(&source, &fixer)
        .fetch_meeting_pages(true)
        .run(ROOT)
        .unwrap();

    let enriched = by_title(&outcome.meetings, "January 6, 2011");
    assert_eq!(enriched.audio_url, "http://www.fec.gov/agenda/2011/audio/20110106.mp3");
    assert_eq!(enriched.agenda_documents_linked.len(), 1);
    assert!(enriched.body.contains("Draft AO 2010-29"));

    // the 2012 meeting page is missing; the meeting itself survives
    let january = by_title(&outcome.meetings, "January 12, 2012");
    assert!(january.body.is_empty());
}

#[test]
fn unknown_row_layout_stops_the_crawl_with_its_location() {
    let page = r#"<table summary="Data table">
        <tr><td>a</td><td>b</td><td>c</td><td>d</td><td>e</td></tr>
    </table>"#;
    let root = r#"<ul><li><a href="2011/agendas2011.shtml">2011 Open Meetings</a></li></ul>"#;
    let source = Archive::new(&[(ROOT, root), (Y2011, page)]);
    let fixer = UrlFixer::new(&BTreeMap::new(), None);
    let err = Crawler::new(&source, &fixer).run(ROOT).unwrap_err();

    let row = err.downcast_ref::<RowError>().expect("row error");
    assert_eq!(row.page_url, Y2011);
    assert_eq!(row.index, 0);
    assert!(matches!(row.source, ExtractError::ColumnCount(5)));
}

#[test]
fn crawl_to_files_and_report() {
    let source = archive();
    let fixer = UrlFixer::new(&BTreeMap::new(), None);
    let outcome = Crawler::new(&source, &fixer).run(ROOT).unwrap();

    let report = CrawlReport::build(&outcome.meetings, &outcome.broken_links);
    assert_eq!(report.dated, 4);
    assert!(report.undated.is_empty());
    assert_eq!(report.notice_meetings, 1);
    assert_eq!(report.agenda_meetings, 3);

    let dir = tempfile::tempdir().unwrap();
    let written = write_outputs(
        dir.path(),
        "meetings",
        &outcome.meetings,
        &outcome.broken_links,
        datetime!(2016-12-13 10:00:00 UTC),
    )
    .unwrap();
    let raw = std::fs::read_to_string(&written.meetings).unwrap();
    let meetings: Vec<Meeting> = serde_json::from_str(&raw).unwrap();
    let first_and_last: Vec<_> = [meetings.first(), meetings.last()]
        .into_iter()
        .flatten()
        .map(|m| m.title_text.as_str())
        .collect();
    assert_eq!(first_and_last, ["March 4, 2010(2:00 PM)", "January 12, 2012"]);
    assert!(written.bad_urls.is_none());
}
