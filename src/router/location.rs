use std::{fmt, str::FromStr};

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use serde::{Deserialize, Serialize};
use url::{Url, form_urlencoded};

use super::RouteError;

/// Everything but RFC 3986 unreserved characters.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

/// A navigable location inside the application: a path plus query pairs.
///
/// Locations are parsed relative to the application root, so both `"/a/b?x=1"`
/// and absolute URLs resolve to the same path form.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Location {
    path: String,
    query: Vec<(String, String)>,
}

impl Location {
    pub fn root() -> Self {
        Self {
            path: "/".to_owned(),
            query: Vec::new(),
        }
    }

    /// Parses a path or an absolute URL.
    ///
    /// Dot segments and empty segments are kept as written, so every path
    /// produced by [`encode_segment`] parses back to the same segments.
    pub fn parse(input: &str) -> Result<Self, RouteError> {
        let target = input.split_once('#').map_or(input, |(head, _)| head);
        let (target, query) = target.split_once('?').unwrap_or((target, ""));
        let path = match target.strip_prefix("//") {
            Some(authority) => authority_path(authority),
            None if target.starts_with('/') => target,
            None => match Url::parse(input) {
                Ok(url) if url.has_authority() => target
                    .split_once("://")
                    .map_or("/", |(_, authority)| authority_path(authority)),
                Ok(_) | Err(url::ParseError::RelativeUrlWithoutBase) => target,
                Err(source) => {
                    return Err(RouteError::InvalidUrl {
                        input: input.to_owned(),
                        source,
                    });
                }
            },
        };

        let segments: Vec<String> = split(path).map(|segment| encode_segment(&decode_segment(segment))).collect();
        Ok(Self {
            path: format!("/{}", segments.join("/")),
            query: form_urlencoded::parse(query.as_bytes()).into_owned().collect(),
        })
    }

    /// The percent-encoded path, always starting with `/`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Decoded path segments. `/` has none; `/a/` ends with an empty one.
    pub fn segments(&self) -> Vec<String> {
        split(&self.path).map(decode_segment).collect()
    }

    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    /// The last value given for `key`.
    pub fn query(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub(crate) fn from_parts(path: String, query: Vec<(String, String)>) -> Self {
        Self { path, query }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)?;
        if !self.query.is_empty() {
            let query = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(self.query.iter())
                .finish();
            write!(f, "?{query}")?;
        }
        Ok(())
    }
}

impl FromStr for Location {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn split(path: &str) -> impl Iterator<Item = &str> {
    let path = path.strip_prefix('/').unwrap_or(path);
    path.split('/').filter(move |_| !path.is_empty())
}

fn authority_path(authority: &str) -> &str {
    authority.find('/').map_or("/", |index| &authority[index..])
}

/// Percent-decodes a path segment. Malformed escapes are kept verbatim.
pub fn decode_segment(segment: &str) -> String {
    percent_decode_str(segment).decode_utf8_lossy().into_owned()
}

/// Percent-encodes a path segment.
///
/// Segments made only of dots are escaped so they are never read as `.` or
/// `..` navigation.
pub fn encode_segment(segment: &str) -> String {
    if !segment.is_empty() && segment.bytes().all(|byte| byte == b'.') {
        return segment.replace('.', "%2E");
    }
    utf8_percent_encode(segment, SEGMENT).to_string()
}
