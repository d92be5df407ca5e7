use crate::common::constants::{
    DESCRIPTION_MAX_CHARS, PAVE_SOURCE_NAME, SYNDIO_SOURCE_NAME, TITLE_MAX_CHARS,
    WORLDATWORK_SOURCE_NAME,
};
use crate::common::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Provider a record was scraped from.
///
/// Names that are not one of the known providers are kept verbatim so a
/// catalog written by a newer build survives a round trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Source {
    Pave,
    WorldAtWork,
    Syndio,
    Other(String),
}

impl Source {
    pub fn as_str(&self) -> &str {
        match self {
            Source::Pave => PAVE_SOURCE_NAME,
            Source::WorldAtWork => WORLDATWORK_SOURCE_NAME,
            Source::Syndio => SYNDIO_SOURCE_NAME,
            Source::Other(name) => name,
        }
    }
}

impl From<String> for Source {
    fn from(value: String) -> Self {
        match value.as_str() {
            PAVE_SOURCE_NAME => Source::Pave,
            WORLDATWORK_SOURCE_NAME => Source::WorldAtWork,
            SYNDIO_SOURCE_NAME => Source::Syndio,
            _ => Source::Other(value),
        }
    }
}

impl From<Source> for String {
    fn from(source: Source) -> Self {
        match source {
            Source::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Lifecycle state of a webinar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    #[serde(rename = "Upcoming")]
    Upcoming,
    #[serde(rename = "On Demand")]
    OnDemand,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Upcoming => "Upcoming",
            Status::OnDemand => "On Demand",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let compact: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match compact.as_str() {
            "upcoming" => Ok(Status::Upcoming),
            "ondemand" => Ok(Status::OnDemand),
            _ => Err(format!("unknown status '{}' (expected Upcoming or On Demand)", s)),
        }
    }
}

/// One catalog entry. `link` is the identity key across runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub source: Source,
    pub title: String,
    pub status: Status,
    #[serde(default)]
    pub air_date: String,
    #[serde(default)]
    pub description: String,
    pub link: String,
}

impl Record {
    /// Builds a record, trimming text fields and applying the title and
    /// description length bounds.
    pub fn new(
        source: Source,
        title: &str,
        status: Status,
        air_date: &str,
        description: &str,
        link: &str,
    ) -> Self {
        Self {
            source,
            title: truncate_chars(title.trim(), TITLE_MAX_CHARS),
            status,
            air_date: air_date.trim().to_string(),
            description: truncate_chars(description.trim(), DESCRIPTION_MAX_CHARS),
            link: link.trim().to_string(),
        }
    }

    /// A record needs a title and a link to enter the catalog
    pub fn is_valid(&self) -> bool {
        !self.title.trim().is_empty() && !self.link.trim().is_empty()
    }
}

pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => text[..cut].to_string(),
        None => text.to_string(),
    }
}

/// Core trait that every webinar source must implement
#[async_trait::async_trait]
pub trait Extractor: Send + Sync {
    /// Provider tag stamped on every record this extractor produces
    fn source(&self) -> Source;

    /// Collect every candidate record currently listed by the source
    async fn produce_candidates(&self) -> Result<Vec<Record>>;
}
