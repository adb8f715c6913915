use std::io::BufRead;

use tracing::{debug, trace};

use super::chunk::Chunk;
use super::page::Page;
use crate::error::{Error, Result};

type LineSource<'a> = Box<dyn Iterator<Item = Result<String>> + 'a>;

/// Lazily splits a concatenated capture log into pages.
///
/// Yields one `Result<Page>` per detected page. The first error (a malformed
/// page or a read failure) ends the iteration.
pub struct Pages<'a> {
    lines: LineSource<'a>,
    chunk: Chunk,
    line_no: usize,
    done: bool,
}

/// Start parsing `source`. An absent source is rejected before anything is
/// read.
pub fn pages<'a, I, S>(source: Option<I>) -> Result<Pages<'a>>
where
    I: IntoIterator<Item = S>,
    I::IntoIter: 'a,
    S: Into<String>,
{
    let source = source.ok_or_else(|| Error::InvalidInput("no line source".to_string()))?;
    Ok(Pages::from_lines(source))
}

impl<'a> Pages<'a> {
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        I::IntoIter: 'a,
        S: Into<String>,
    {
        let lines = lines.into_iter().map(|l| -> Result<String> { Ok(l.into()) });
        Self::new(Box::new(lines))
    }

    /// Read lines from `reader`, keeping their `\n` / `\r\n` terminators.
    /// Invalid UTF-8 is replaced rather than rejected.
    pub fn from_reader<R: BufRead + 'a>(mut reader: R) -> Self {
        let lines = std::iter::from_fn(move || {
            let mut buf = Vec::new();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => None,
                Ok(_) => Some(Ok(String::from_utf8_lossy(&buf).into_owned())),
                Err(e) => Some(Err(Error::Io(e))),
            }
        });
        Self::new(Box::new(lines))
    }

    fn new(lines: LineSource<'a>) -> Self {
        Pages {
            lines,
            chunk: Chunk::new(1),
            line_no: 0,
            done: false,
        }
    }

    /// Number of input lines consumed so far.
    pub fn lines_read(&self) -> usize {
        self.line_no
    }

    fn finish(&mut self) -> Option<Result<Page>> {
        self.done = true;
        let last = std::mem::replace(&mut self.chunk, Chunk::new(self.line_no + 1));
        if last.is_complete() {
            trace!(line = last.first_line(), "flushing final page");
            Some(last.into_page())
        } else {
            if !last.is_empty() {
                debug!(
                    line = last.first_line(),
                    lines = last.len(),
                    "dropping incomplete trailing fragment"
                );
            }
            None
        }
    }
}

impl Iterator for Pages<'_> {
    type Item = Result<Page>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            let line = match self.lines.next() {
                Some(Ok(line)) => line,
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(e));
                }
                None => return self.finish(),
            };
            self.line_no += 1;
            self.chunk.feed(line);

            if let Some(next) = self.chunk.next_chunk() {
                debug!(line = next.first_line(), "page boundary");
                let finished = std::mem::replace(&mut self.chunk, next);
                let page = finished.into_page();
                if page.is_err() {
                    self.done = true;
                }
                return Some(page);
            }
        }
    }
}

impl std::iter::FusedIterator for Pages<'_> {}
