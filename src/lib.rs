//! Split concatenated HTTP capture logs into structured pages.
//!
//! Each page in the log starts with a metadata line and a status line:
//!
//! ```text
//! http://searchengineland.com/Google-streamlines-search-options-30143 208.80.6.139 20120525125956 text/html 97819
//! HTTP/1.1 200 OK
//! ```
//!
//! followed by headers, a blank line and the body. Nothing marks where a
//! body ends, so boundaries are found by looking back at the last two lines.

pub mod error;
pub mod grep;
pub mod parser;
pub mod settings;
pub mod source;
pub mod stats;

pub use error::{Error, Result};
pub use parser::{pages, Page, Pages};
