use std::collections::HashMap;

use super::{PathArgs, RouteError, location::encode_segment};

/// Key under which a trailing `*` stores the rest of the path.
pub const REST: &str = "*";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
    Rest,
}

/// A path pattern such as `/opportunities/:id/edit` or `/docs/*`.
///
/// Literal segments match exactly, `:name` captures one segment and a trailing
/// `*` captures whatever remains (possibly nothing).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    raw: String,
    segments: Vec<Segment>,
}

impl Pattern {
    pub fn parse(raw: &str) -> Result<Self, RouteError> {
        let invalid = |reason: &str| RouteError::InvalidPattern {
            pattern: raw.to_owned(),
            reason: reason.to_owned(),
        };
        if !raw.starts_with('/') {
            return Err(invalid("patterns must start with '/'"));
        }

        let parts: Vec<&str> = raw.split('/').filter(|part| !part.is_empty()).collect();
        let mut segments = Vec::with_capacity(parts.len());
        for (index, part) in parts.iter().enumerate() {
            let segment = if *part == REST {
                if index + 1 != parts.len() {
                    return Err(invalid("'*' is only allowed as the last segment"));
                }
                Segment::Rest
            } else if let Some(name) = part.strip_prefix(':') {
                if name.is_empty() {
                    return Err(invalid("parameter name is empty"));
                }
                if segments.contains(&Segment::Param(name.to_owned())) {
                    return Err(invalid("duplicate parameter name"));
                }
                Segment::Param(name.to_owned())
            } else {
                Segment::Literal((*part).to_owned())
            };
            segments.push(segment);
        }

        Ok(Self {
            raw: raw.to_owned(),
            segments,
        })
    }

    /// `/*`, matching every path.
    pub(crate) fn catch_all() -> Self {
        Self {
            raw: "/*".to_owned(),
            segments: vec![Segment::Rest],
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Matches decoded path segments, returning the captured parameters.
    ///
    /// A `:name` captures any one segment, including an empty one. A single
    /// trailing empty segment (`/a/`) is ignored when the pattern has no slot
    /// for it.
    pub fn matches(&self, path: &[String]) -> Option<HashMap<String, String>> {
        self.matches_exact(path).or_else(|| match path.split_last() {
            Some((last, init)) if last.is_empty() => self.matches_exact(init),
            _ => None,
        })
    }

    fn matches_exact(&self, path: &[String]) -> Option<HashMap<String, String>> {
        let mut params = HashMap::new();
        for (index, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Rest => {
                    params.insert(REST.to_owned(), path.get(index..).unwrap_or_default().join("/"));
                    return Some(params);
                }
                Segment::Literal(literal) => {
                    if path.get(index) != Some(literal) {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    params.insert(name.clone(), path.get(index)?.clone());
                }
            }
        }
        (path.len() == self.segments.len()).then_some(params)
    }

    /// Builds a path from `args`, encoding every substituted segment.
    ///
    /// A parameter missing from `args` is rendered as an empty segment.
    pub fn fill(&self, args: &PathArgs) -> String {
        let mut path = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(literal) => {
                    path.push('/');
                    path.push_str(literal);
                }
                Segment::Param(name) => {
                    path.push('/');
                    match args.param_value(name) {
                        Some(value) => path.push_str(&encode_segment(value)),
                        None => tracing::warn!(pattern = %self.raw, param = %name, "missing route parameter"),
                    }
                }
                Segment::Rest => {
                    let rest = args.param_value(REST).unwrap_or_default();
                    for part in rest.split('/').filter(|part| !part.is_empty()) {
                        path.push('/');
                        path.push_str(&encode_segment(part));
                    }
                }
            }
        }
        if path.is_empty() {
            path.push('/');
        }
        path
    }
}
