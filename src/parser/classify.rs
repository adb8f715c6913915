use std::sync::LazyLock;

use regex::Regex;

static STATUS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^HTTP/[0-9]\.[0-9] [0-9]{3} [\S ]+").unwrap());

/// True if the line splits into exactly 5 whitespace-separated fields
/// (url, ip, timestamp, content type, size). Bodies can fool this.
pub fn is_metadata_line(line: &str) -> bool {
    line.split_whitespace().count() == 5
}

/// True if the line starts like `HTTP/1.1 200 OK`. Prefix match only, so
/// trailing text and line terminators are allowed.
pub fn is_status_line(line: &str) -> bool {
    STATUS_RE.is_match(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_five_fields() {
        assert!(is_metadata_line(
            "http://example.com/a 1.2.3.4 20120101000000 text/html 100\n"
        ));
        assert!(is_metadata_line("a  b\tc d   e"));
    }

    #[test]
    fn metadata_wrong_field_count() {
        assert!(!is_metadata_line(""));
        assert!(!is_metadata_line("\r\n"));
        assert!(!is_metadata_line("a b c d"));
        assert!(!is_metadata_line("a b c d e f"));
    }

    #[test]
    fn status_line() {
        assert!(is_status_line("HTTP/1.1 200 OK"));
        assert!(is_status_line("HTTP/1.0 404 Not Found\r\n"));
        assert!(is_status_line("HTTP/2.0 301 Moved Permanently\n"));
    }

    #[test]
    fn status_line_rejects() {
        assert!(!is_status_line(""));
        assert!(!is_status_line("http/1.1 200 OK"));
        assert!(!is_status_line("HTTP/1.1 20 OK"));
        assert!(!is_status_line("HTTP/1.1 2000 OK"));
        assert!(!is_status_line("HTTP/1.1 200"));
        assert!(!is_status_line("HTTP/1.1 200 \n"));
        assert!(!is_status_line(" HTTP/1.1 200 OK"));
    }
}
