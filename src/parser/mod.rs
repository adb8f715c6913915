pub mod chunk;
pub mod classify;
pub mod page;
pub mod stream;

pub use chunk::Chunk;
pub use page::Page;
pub use stream::{pages, Pages};

/// Convenience: parse a whole in-memory log.
pub fn parse_str(log: &str) -> crate::error::Result<Vec<Page>> {
    Pages::from_reader(log.as_bytes()).collect()
}
