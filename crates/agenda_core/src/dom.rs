//! Owned snapshot of an archive table.
//!
//! The extractor never edits the fetched document. Instead the located
//! `<table>` is copied into plain rows, cells and anchors, with every `href`
//! passed through a rewrite function on the way. Row parsing then works on
//! the copy only.

use scraper::{ElementRef, Node, Selector};
use std::sync::LazyLock;

static ROW_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tr").expect("invalid selector: tr"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub href: Option<String>,
    pub title: Option<String>,
    /// All text inside the element.
    pub text: String,
    /// Text directly following the closing tag, up to the next element.
    pub tail: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Text(String),
    Anchor(Anchor),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cell {
    pub fragments: Vec<Fragment>,
}

impl Cell {
    /// Full text content, anchors and their tails included.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for fragment in &self.fragments {
            match fragment {
                Fragment::Text(text) => out.push_str(text),
                Fragment::Anchor(anchor) => {
                    out.push_str(&anchor.text);
                    out.push_str(&anchor.tail);
                }
            }
        }
        out
    }

    pub fn anchors(&self) -> impl Iterator<Item = &Anchor> {
        self.fragments.iter().filter_map(|fragment| match fragment {
            Fragment::Anchor(anchor) => Some(anchor),
            Fragment::Text(_) => None,
        })
    }

    /// Copy of this cell without its `index`-th anchor (tail included).
    pub fn without_anchor(&self, index: usize) -> Cell {
        let mut seen = 0;
        let fragments = self
            .fragments
            .iter()
            .filter(|fragment| {
                if let Fragment::Anchor(_) = fragment {
                    seen += 1;
                    seen - 1 != index
                } else {
                    true
                }
            })
            .cloned()
            .collect();
        Cell { fragments }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    /// Direct `<td>` children.
    pub cells: Vec<Cell>,
    /// Whether any direct child is a `<th>`.
    pub has_header: bool,
    /// Text content of the whole row.
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub rows: Vec<Row>,
}

impl Table {
    /// Copies every `<tr>` below `table`, passing each `href` through `rewrite`.
    pub fn snapshot(table: ElementRef<'_>, rewrite: &mut dyn FnMut(&str) -> String) -> Table {
        let mut rows = Vec::new();
        for tr in table.select(&ROW_SELECTOR) {
            rows.push(snapshot_row(tr, &mut *rewrite));
        }
        Table { rows }
    }
}

fn snapshot_row(tr: ElementRef<'_>, rewrite: &mut dyn FnMut(&str) -> String) -> Row {
    let mut row = Row {
        text: tr.text().collect(),
        ..Row::default()
    };
    for child in tr.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "td" => {
                let mut cell = Cell::default();
                collect_fragments(child, &mut cell.fragments, rewrite);
                row.cells.push(cell);
            }
            name => {
                // not part of any cell, but its links still get checked
                row.has_header |= name == "th";
                rewrite_links(child, rewrite);
            }
        }
    }
    row
}

fn rewrite_links(element: ElementRef<'_>, rewrite: &mut dyn FnMut(&str) -> String) {
    if element.value().name() == "a" {
        if let Some(href) = element.value().attr("href") {
            rewrite(href);
        }
        return;
    }
    let mut ignored = Vec::new();
    collect_fragments(element, &mut ignored, rewrite);
}

fn collect_fragments(
    element: ElementRef<'_>,
    out: &mut Vec<Fragment>,
    rewrite: &mut dyn FnMut(&str) -> String,
) {
    // index into `out` of the anchor whose tail we are reading
    let mut tail_of: Option<usize> = None;

    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                if let Some(Fragment::Anchor(anchor)) = tail_of.and_then(|index| out.get_mut(index)) {
                    anchor.tail.push_str(text);
                } else {
                    out.push(Fragment::Text((**text).to_string()));
                }
            }
            Node::Element(_) => {
                let Some(child) = ElementRef::wrap(child) else {
                    continue;
                };
                if child.value().name() == "a" {
                    let anchor = Anchor {
                        href: child.value().attr("href").map(|href| rewrite(href)),
                        title: child.value().attr("title").map(str::to_string),
                        text: child.text().collect(),
                        tail: String::new(),
                    };
                    out.push(Fragment::Anchor(anchor));
                    tail_of = Some(out.len() - 1);
                } else {
                    tail_of = None;
                    collect_fragments(child, out, rewrite);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use scraper::Html;

    /// Parses `html` and snapshots its first table without rewriting links.
    pub(crate) fn table_from(html: &str) -> Table {
        let document = Html::parse_document(html);
        let selector = Selector::parse("table").unwrap();
        let table = document.select(&selector).next().unwrap();
        Table::snapshot(table, &mut |href| href.trim().to_string())
    }

    pub(crate) fn row_from(cells: &str) -> Row {
        let html = format!("<table><tr>{cells}</tr></table>");
        table_from(&html).rows.remove(0)
    }

    #[test]
    fn anchor_tail_stops_at_next_element() {
        let row = row_from(
            r#"<td><a href="/a">March 4, 2010<br></a>(2:00 PM)<a href="/s">Canceled</a></td>"#,
        );
        let anchors: Vec<_> = row.cells[0].anchors().collect();
        assert_eq!(anchors.len(), 2);
        assert_eq!(anchors[0].text, "March 4, 2010");
        assert_eq!(anchors[0].tail, "(2:00 PM)");
        assert_eq!(anchors[1].tail, "");
    }

    #[test]
    fn without_anchor_drops_the_tail_too() {
        let row = row_from(r#"<td>October 20, 2005 <a href="/n"> </a>(Hearing)<a href="/n">x</a></td>"#);
        let cell = row.cells[0].without_anchor(0);
        assert_eq!(cell.anchors().count(), 1);
        assert_eq!(cell.text(), "October 20, 2005 x");
    }

    #[test]
    fn nested_anchors_are_found_and_rewritten() {
        let document = Html::parse_document(
            r#"<table><tr><td><p><a href="notice.pdf">Notice</a><br><a href="other.pdf">Notice</a></p></td></tr></table>"#,
        );
        let selector = Selector::parse("table").unwrap();
        let table = document.select(&selector).next().unwrap();
        let snapshot = Table::snapshot(table, &mut |href| format!("http://host/{href}"));
        let hrefs: Vec<_> = snapshot.rows[0].cells[0]
            .anchors()
            .map(|anchor| anchor.href.clone().unwrap())
            .collect();
        assert_eq!(hrefs, ["http://host/notice.pdf", "http://host/other.pdf"]);
    }

    #[test]
    fn header_cell_links_are_rewritten_too() {
        let document = Html::parse_document(
            r#"<table><tr><th><a href="key.pdf">Key</a></th><td><a href="doc.pdf">Doc</a></td></tr></table>"#,
        );
        let selector = Selector::parse("table").unwrap();
        let table = document.select(&selector).next().unwrap();
        let mut seen = Vec::new();
        let snapshot = Table::snapshot(table, &mut |href| {
            seen.push(href.to_string());
            href.to_string()
        });
        assert_eq!(seen, ["key.pdf", "doc.pdf"]);
        assert!(snapshot.rows[0].has_header);
        assert_eq!(snapshot.rows[0].cells.len(), 1);
    }

    #[test]
    fn header_rows_are_marked() {
        let table = table_from(
            "<table><tr><th>Documents</th><th>Minutes</th></tr><tr><td>a</td><td>b</td></tr></table>",
        );
        assert_eq!(table.rows.len(), 2);
        assert!(table.rows[0].has_header);
        assert!(table.rows[0].cells.is_empty());
        assert!(!table.rows[1].has_header);
        assert_eq!(table.rows[1].cells.len(), 2);
    }
}
