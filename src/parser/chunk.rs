use std::collections::BTreeMap;

use super::classify::{is_metadata_line, is_status_line};
use super::page::Page;
use crate::error::{Error, Malformed, Result};

/// Raw lines collected since the last page boundary.
///
/// A chunk is meant to have a single owner: once `next_chunk` hands out a
/// successor, the old chunk is finished and should be consumed with
/// `into_page`.
#[derive(Debug, Clone)]
pub struct Chunk {
    lines: Vec<String>,
    /// 1-based stream line number of `lines[0]`.
    first_line: usize,
}

impl Chunk {
    pub fn new(first_line: usize) -> Self {
        Chunk {
            lines: Vec::new(),
            first_line,
        }
    }

    fn seeded(first_line: usize, lines: &[String]) -> Self {
        Chunk {
            lines: lines.to_vec(),
            first_line,
        }
    }

    pub fn feed(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn first_line(&self) -> usize {
        self.first_line
    }

    /// Metadata line, status line and at least one more.
    pub fn is_complete(&self) -> bool {
        self.lines.len() >= 3
    }

    /// True when the last two lines look like the start of the next page.
    pub fn at_boundary(&self) -> bool {
        match self.lines.as_slice() {
            [.., meta, status] => {
                self.is_complete() && is_metadata_line(meta) && is_status_line(status)
            }
            _ => false,
        }
    }

    /// A new chunk seeded with the two boundary lines, if at a boundary.
    pub fn next_chunk(&self) -> Option<Chunk> {
        if !self.at_boundary() {
            return None;
        }
        let split = self.lines.len() - 2;
        Some(Chunk::seeded(self.first_line + split, &self.lines[split..]))
    }

    /// Decompose into a `Page`. When the chunk is at a boundary its last two
    /// lines belong to the next page and are left out of the body.
    pub fn into_page(self) -> Result<Page> {
        let line = self.first_line;
        let malformed = |reason| Error::MalformedPage { line, reason };

        if !self.is_complete() {
            return Err(malformed(Malformed::Incomplete));
        }
        let end = if self.at_boundary() {
            self.lines.len() - 2
        } else {
            self.lines.len()
        };

        let meta: Vec<&str> = self.lines[0].split_whitespace().collect();
        let &[url, ip, ts, content_type, size] = meta.as_slice() else {
            return Err(malformed(Malformed::Metadata { tokens: meta.len() }));
        };
        let status_fields: Vec<&str> = self.lines[1].split_whitespace().collect();
        let &[protocol, status, _message] = status_fields.as_slice() else {
            return Err(malformed(Malformed::Status {
                tokens: status_fields.len(),
            }));
        };

        let mut headers = BTreeMap::new();
        let mut pos = 2;
        loop {
            if pos >= end {
                return Err(malformed(Malformed::UnterminatedHeaders));
            }
            let header = &self.lines[pos];
            if header.trim().is_empty() {
                break;
            }
            let Some((name, value)) = header.split_once(':') else {
                return Err(malformed(Malformed::HeaderWithoutColon(header.clone())));
            };
            headers.insert(name.trim().to_lowercase(), value.trim().to_string());
            pos += 1;
        }

        let (url, ip, ts, content_type, size, protocol, status) = (
            url.to_string(),
            ip.to_string(),
            ts.to_string(),
            content_type.to_string(),
            size.to_string(),
            protocol.to_string(),
            status.to_string(),
        );
        let body = self.lines.into_iter().take(end).skip(pos + 1).collect();

        Ok(Page {
            url,
            ip,
            ts,
            content_type,
            size,
            protocol,
            status,
            headers,
            body,
        })
    }
}
