use super::base::SourceAdapter;
use super::fields::{lenient_text, non_empty, read_item};
use crate::constants::NVIDIA_DEFAULT_CATEGORY;
use crate::error::{Result, ScraperError};
use crate::types::{Source, UnifiedEvent};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

const EVENTS_KEY: &str = "events";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NvidiaCalendarEntry {
    #[serde(default, deserialize_with = "lenient_text")]
    title: Option<String>,
    #[serde(default, rename = "type", deserialize_with = "lenient_text")]
    kind: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    start_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    end_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    location: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    venue: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    url: Option<String>,
}

/// NVIDIA's public events calendar feed.
pub struct NvidiaAdapter;

impl Default for NvidiaAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl NvidiaAdapter {
    pub fn new() -> Self {
        Self
    }

    /// The feed is usually `{"events": [...]}` but has also been served as a bare list.
    fn entries<'a>(&self, payload: &'a Value) -> Option<&'a Vec<Value>> {
        match payload {
            Value::Object(map) => map.get(EVENTS_KEY).and_then(Value::as_array),
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    fn map_entry(&self, entry: NvidiaCalendarEntry) -> UnifiedEvent {
        UnifiedEvent {
            source: Source::Nvidia,
            title: entry.title,
            description: None,
            start_date: entry.start_date,
            end_date: entry.end_date,
            location: non_empty(entry.location).or(non_empty(entry.venue)),
            register_link: entry.url,
            category: non_empty(entry.kind).unwrap_or_else(|| NVIDIA_DEFAULT_CATEGORY.to_string()),
        }
    }
}

impl SourceAdapter for NvidiaAdapter {
    fn source(&self) -> Source {
        Source::Nvidia
    }

    fn extract(&self, payload: &Value) -> Result<Vec<UnifiedEvent>> {
        let items = self.entries(payload).ok_or_else(|| ScraperError::Shape {
            source_name: Source::Nvidia.to_string(),
            message: format!("payload is neither a list nor an object with '{EVENTS_KEY}'"),
        })?;

        let events = items
            .iter()
            .filter_map(|item| {
                let entry = read_item::<NvidiaCalendarEntry>(item);
                if entry.is_none() {
                    debug!("Skipping non-object NVIDIA calendar entry");
                }
                entry
            })
            .map(|entry| self.map_entry(entry))
            .collect();
        Ok(events)
    }
}
