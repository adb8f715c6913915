use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::error::Result;
use crate::parser::{Page, Pages};

/// Running totals over a page stream.
#[derive(Debug, Default, Serialize)]
pub struct Stats {
    pub pages: usize,
    /// Input lines consumed, including any dropped trailing fragment.
    pub lines: usize,
    pub body_lines: usize,
    pub by_status: BTreeMap<String, usize>,
    pub by_content_type: BTreeMap<String, usize>,
    pub first_capture: Option<NaiveDateTime>,
    pub last_capture: Option<NaiveDateTime>,
}

impl Stats {
    /// Drain `pages`, calling `on_page` after each one is counted. Stops at
    /// the first parse error.
    pub fn collect(mut pages: Pages<'_>, mut on_page: impl FnMut(&Page)) -> Result<Stats> {
        let mut stats = Stats::default();
        for page in pages.by_ref() {
            let page = page?;
            stats.add(&page);
            on_page(&page);
        }
        stats.lines = pages.lines_read();
        Ok(stats)
    }

    pub fn add(&mut self, page: &Page) {
        self.pages += 1;
        self.body_lines += page.body.len();
        *self.by_status.entry(page.status.clone()).or_default() += 1;
        *self
            .by_content_type
            .entry(page.content_type.clone())
            .or_default() += 1;

        if let Some(ts) = page.captured_at() {
            self.first_capture = Some(self.first_capture.map_or(ts, |t| t.min(ts)));
            self.last_capture = Some(self.last_capture.map_or(ts, |t| t.max(ts)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_str;

    #[test]
    fn totals() {
        let log = std::fs::read_to_string("tests/fixtures/simple-small-pages").unwrap();
        let mut stats = Stats::default();
        for page in parse_str(&log).unwrap() {
            stats.add(&page);
        }
        assert_eq!(stats.pages, 2);
        assert_eq!(stats.body_lines, 9);
        assert_eq!(stats.by_status.get("200"), Some(&1));
        assert_eq!(stats.by_status.get("404"), Some(&1));
        assert_eq!(stats.by_content_type.get("text/html"), Some(&1));
        assert_eq!(stats.first_capture.unwrap().to_string(), "2012-01-01 00:00:00");
        assert_eq!(stats.last_capture.unwrap().to_string(), "2012-01-01 00:01:05");
    }

    #[test]
    fn collect_counts_lines_and_pages() {
        let file = std::fs::File::open("tests/fixtures/simple-small-pages").unwrap();
        let mut seen = Vec::new();
        let stats = Stats::collect(
            Pages::from_reader(std::io::BufReader::new(file)),
            |p| seen.push(p.url.clone()),
        )
        .unwrap();
        assert_eq!(stats.pages, 2);
        assert_eq!(stats.lines, 18);
        assert_eq!(seen, vec!["http://example.com/a", "http://example.com/b"]);
    }

    #[test]
    fn collect_stops_at_malformed_page() {
        let log = "garbage\nHTTP/1.1 200 OK\n\nbody\n";
        let mut calls = 0;
        let err = Stats::collect(Pages::from_reader(log.as_bytes()), |_| calls += 1).unwrap_err();
        assert!(matches!(err, crate::error::Error::MalformedPage { line: 1, .. }));
        assert_eq!(calls, 0);
    }

    #[test]
    fn unparseable_timestamps_are_skipped() {
        let log = "\
http://a 1.1.1.1 sometime text/plain 1
HTTP/1.1 200 OK

x
";
        let mut stats = Stats::default();
        for page in parse_str(log).unwrap() {
            stats.add(&page);
        }
        assert_eq!(stats.pages, 1);
        assert!(stats.first_capture.is_none());
    }
}
