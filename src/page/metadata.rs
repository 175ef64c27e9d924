use serde::{Deserialize, Serialize};

/// Document-level descriptors derived from page state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Metadata {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Metadata {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
        }
    }

    /// `"{title} | {site}"`, or just the site name for an empty title.
    pub fn titled(title: &str, site: &str) -> Self {
        if title.is_empty() {
            Self::new(site)
        } else {
            Self::new(format!("{title} | {site}"))
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
