use crate::constants::{
    AWS_API, AWS_SOURCE_NAME, NVIDIA_API, NVIDIA_SOURCE_NAME, UIPATH_API, UIPATH_SOURCE_NAME,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Organization an event listing was scraped from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Source {
    #[serde(rename = "UiPath")]
    UiPath,
    #[serde(rename = "NVIDIA")]
    Nvidia,
    #[serde(rename = "AWS")]
    Aws,
}

impl Source {
    /// Name stored in the catalog and written to the snapshot.
    pub fn name(&self) -> &'static str {
        match self {
            Source::UiPath => UIPATH_SOURCE_NAME,
            Source::Nvidia => NVIDIA_SOURCE_NAME,
            Source::Aws => AWS_SOURCE_NAME,
        }
    }

    /// Identifier used on the command line and in config.toml.
    pub fn api_name(&self) -> &'static str {
        match self {
            Source::UiPath => UIPATH_API,
            Source::Nvidia => NVIDIA_API,
            Source::Aws => AWS_API,
        }
    }

    pub fn from_api_name(api_name: &str) -> Option<Self> {
        match api_name.trim().to_ascii_lowercase().as_str() {
            UIPATH_API => Some(Source::UiPath),
            NVIDIA_API => Some(Source::Nvidia),
            AWS_API => Some(Source::Aws),
            _ => None,
        }
    }

    pub fn all() -> [Source; 3] {
        [Source::UiPath, Source::Nvidia, Source::Aws]
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Canonical record produced by every source adapter.
///
/// Field order matches the snapshot column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnifiedEvent {
    pub source: Source,
    pub title: Option<String>,
    pub description: Option<String>,
    /// Verbatim from the source; formats differ between sources.
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub location: Option<String>,
    pub register_link: Option<String>,
    pub category: String,
}

impl UnifiedEvent {
    pub fn natural_key(&self) -> NaturalKey {
        NaturalKey {
            title: self.title.clone(),
            start_date: self.start_date.clone(),
            source: self.source,
        }
    }
}

/// Identity of an event: (title, start_date, source). `None` equals `None`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NaturalKey {
    pub title: Option<String>,
    pub start_date: Option<String>,
    pub source: Source,
}

/// A row read back from the catalog store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredEvent {
    pub id: i64,
    pub source: String,
    pub category: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub location: Option<String>,
    pub register_link: Option<String>,
}
