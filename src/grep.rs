use std::fmt;
use std::str::FromStr;

use regex::{Regex, RegexBuilder};

use crate::error::{Error, Result};
use crate::parser::Page;

/// Which part of a page a pattern is matched against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    Url,
    Ip,
    Ts,
    ContentType,
    Size,
    Protocol,
    Status,
    /// Any header, as `name: value`.
    Headers,
    /// One header by (lower-cased) name.
    Header(String),
    /// Any body line.
    Body,
}

impl FromStr for Field {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some(name) = s.strip_prefix("header:") {
            let name = name.trim();
            if name.is_empty() {
                return Err(Error::UnknownField(s.to_string()));
            }
            return Ok(Field::Header(name.to_lowercase()));
        }
        match s.to_lowercase().as_str() {
            "url" => Ok(Field::Url),
            "ip" => Ok(Field::Ip),
            "ts" | "timestamp" => Ok(Field::Ts),
            "content-type" | "content_type" => Ok(Field::ContentType),
            "size" => Ok(Field::Size),
            "protocol" => Ok(Field::Protocol),
            "status" => Ok(Field::Status),
            "headers" => Ok(Field::Headers),
            "body" => Ok(Field::Body),
            _ => Err(Error::UnknownField(s.to_string())),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Url => f.write_str("url"),
            Field::Ip => f.write_str("ip"),
            Field::Ts => f.write_str("ts"),
            Field::ContentType => f.write_str("content-type"),
            Field::Size => f.write_str("size"),
            Field::Protocol => f.write_str("protocol"),
            Field::Status => f.write_str("status"),
            Field::Headers => f.write_str("headers"),
            Field::Header(name) => write!(f, "header:{}", name),
            Field::Body => f.write_str("body"),
        }
    }
}

/// A compiled pattern bound to one page field.
#[derive(Debug, Clone)]
pub struct Matcher {
    field: Field,
    re: Regex,
    invert: bool,
}

impl Matcher {
    pub fn new(field: Field, pattern: &str, ignore_case: bool, invert: bool) -> Result<Self> {
        let re = RegexBuilder::new(pattern)
            .case_insensitive(ignore_case)
            .build()?;
        Ok(Matcher { field, re, invert })
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    pub fn is_match(&self, page: &Page) -> bool {
        self.hit(page) != self.invert
    }

    fn hit(&self, page: &Page) -> bool {
        let re = &self.re;
        match &self.field {
            Field::Url => re.is_match(&page.url),
            Field::Ip => re.is_match(&page.ip),
            Field::Ts => re.is_match(&page.ts),
            Field::ContentType => re.is_match(&page.content_type),
            Field::Size => re.is_match(&page.size),
            Field::Protocol => re.is_match(&page.protocol),
            Field::Status => re.is_match(&page.status),
            Field::Headers => page
                .headers
                .iter()
                .any(|(name, value)| re.is_match(&format!("{}: {}", name, value))),
            Field::Header(name) => page.headers.get(name).is_some_and(|v| re.is_match(v)),
            Field::Body => page
                .body
                .iter()
                .any(|line| re.is_match(line.trim_end_matches(['\r', '\n']))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_str;

    const LOG: &str = "\
http://example.com/a 1.2.3.4 20120101000000 text/html 100
HTTP/1.1 200 OK
Content-Type: text/html
Server: nginx

<p>Hello World</p>
http://example.com/b 5.6.7.8 20120101000100 image/png 42
HTTP/1.1 301 Moved
Location: http://example.com/c

";

    fn matching(field: &str, pattern: &str, ignore_case: bool, invert: bool) -> Vec<String> {
        let m = Matcher::new(field.parse().unwrap(), pattern, ignore_case, invert).unwrap();
        parse_str(LOG)
            .unwrap()
            .into_iter()
            .filter(|p| m.is_match(p))
            .map(|p| p.url)
            .collect()
    }

    #[test]
    fn parse_fields() {
        assert_eq!("url".parse::<Field>().unwrap(), Field::Url);
        assert_eq!("Content-Type".parse::<Field>().unwrap(), Field::ContentType);
        assert_eq!(
            "header:Location".parse::<Field>().unwrap(),
            Field::Header("location".into())
        );
        assert!(matches!("header:".parse::<Field>(), Err(Error::UnknownField(_))));
        assert!(matches!("cookies".parse::<Field>(), Err(Error::UnknownField(_))));
    }

    #[test]
    fn display_round_trips() {
        for s in ["url", "content-type", "header:server", "body", "headers"] {
            assert_eq!(s.parse::<Field>().unwrap().to_string(), s);
        }
    }

    #[test]
    fn body_match() {
        assert_eq!(matching("body", "hello", true, false), vec!["http://example.com/a"]);
        assert!(matching("body", "hello", false, false).is_empty());
    }

    #[test]
    fn body_line_anchor_ignores_terminator() {
        assert_eq!(matching("body", "</p>$", false, false), vec!["http://example.com/a"]);
    }

    #[test]
    fn status_and_invert() {
        assert_eq!(matching("status", "^3", false, false), vec!["http://example.com/b"]);
        assert_eq!(matching("status", "^3", false, true), vec!["http://example.com/a"]);
    }

    #[test]
    fn header_fields() {
        assert_eq!(matching("header:server", "nginx", false, false), vec!["http://example.com/a"]);
        assert_eq!(
            matching("headers", "^location: ", false, false),
            vec!["http://example.com/b"]
        );
        assert!(matching("header:x-missing", ".*", false, false).is_empty());
    }

    #[test]
    fn bad_pattern() {
        assert!(matches!(
            Matcher::new(Field::Url, "(", false, false),
            Err(Error::Pattern(_))
        ));
    }
}
