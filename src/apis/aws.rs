use super::base::SourceAdapter;
use super::fields::{lenient_object, lenient_text, non_empty, read_item};
use crate::constants::AWS_DEFAULT_CATEGORY;
use crate::error::{Result, ScraperError};
use crate::pipeline::processing::sanitize::sanitize;
use crate::types::{Source, UnifiedEvent};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

const ITEMS_KEY: &str = "items";

/// One search hit: `{"item": {...}, "tags": [...]}`.
#[derive(Debug, Deserialize)]
struct DirectoryHit {
    #[serde(default, deserialize_with = "lenient_object")]
    item: DirectoryItem,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DirectoryItem {
    #[serde(default, deserialize_with = "lenient_text")]
    date_created: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    date_updated: Option<String>,
    #[serde(default, deserialize_with = "lenient_object")]
    additional_fields: AdditionalFields,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AdditionalFields {
    #[serde(default, deserialize_with = "lenient_text")]
    title: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    event_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    body_back: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    body: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    cta_link: Option<String>,
    #[serde(default, rename = "primaryCTALink", deserialize_with = "lenient_text")]
    primary_cta_link: Option<String>,
}

/// AWS events directory search API.
pub struct AwsAdapter;

impl Default for AwsAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl AwsAdapter {
    pub fn new() -> Self {
        Self
    }

    fn map_hit(&self, hit: DirectoryHit) -> UnifiedEvent {
        let item = hit.item;
        let fields = item.additional_fields;
        let description_source = non_empty(fields.body_back).or(non_empty(fields.body));

        UnifiedEvent {
            source: Source::Aws,
            title: fields.title,
            description: Some(sanitize(description_source.as_deref())),
            start_date: item.date_created,
            end_date: item.date_updated,
            location: None,
            register_link: non_empty(fields.cta_link).or(non_empty(fields.primary_cta_link)),
            category: non_empty(fields.event_type)
                .unwrap_or_else(|| AWS_DEFAULT_CATEGORY.to_string()),
        }
    }
}

impl SourceAdapter for AwsAdapter {
    fn source(&self) -> Source {
        Source::Aws
    }

    fn extract(&self, payload: &Value) -> Result<Vec<UnifiedEvent>> {
        let items = payload
            .get(ITEMS_KEY)
            .and_then(Value::as_array)
            .ok_or_else(|| ScraperError::Shape {
                source_name: Source::Aws.to_string(),
                message: format!("no '{ITEMS_KEY}' list found"),
            })?;

        let events = items
            .iter()
            .filter_map(|hit| {
                let parsed = read_item::<DirectoryHit>(hit);
                if parsed.is_none() {
                    debug!("Skipping non-object AWS search hit");
                }
                parsed
            })
            .map(|hit| self.map_hit(hit))
            .collect();
        Ok(events)
    }
}
