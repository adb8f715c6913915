use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};

/// Open a capture log for reading. `None` or `-` means stdin.
pub fn open(path: Option<&Path>) -> Result<Box<dyn BufRead>> {
    let path = match path {
        None => return Ok(Box::new(io::stdin().lock())),
        Some(p) if p.as_os_str() == "-" => return Ok(Box::new(io::stdin().lock())),
        Some(p) => p,
    };
    if path.is_dir() {
        return Err(Error::InvalidInput(format!("{} is a directory", path.display())));
    }
    let file = File::open(path)
        .map_err(|e| Error::InvalidInput(format!("{}: {}", path.display(), e)))?;
    debug!(path = %path.display(), "opened capture log");
    Ok(Box::new(BufReader::new(file)))
}
