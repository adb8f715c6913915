use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("malformed page starting at line {line}")]
    MalformedPage {
        line: usize,
        #[source]
        reason: Malformed,
    },

    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("bad pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("unknown field '{0}' (expected url, ip, ts, content-type, size, protocol, status, headers, header:<name> or body)")]
    UnknownField(String),

    #[error("config: {0}")]
    Config(#[from] config::ConfigError),
}

/// Why a chunk could not be turned into a page.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Malformed {
    #[error("fewer than 3 lines")]
    Incomplete,

    #[error("metadata line has {tokens} fields, expected 5")]
    Metadata { tokens: usize },

    #[error("status line has {tokens} fields, expected 3")]
    Status { tokens: usize },

    #[error("header line without ':': {:?}", .0.trim_end())]
    HeaderWithoutColon(String),

    #[error("no blank line after headers")]
    UnterminatedHeaders,
}
