use super::base::SourceAdapter;
use super::fields::{lenient_text, non_empty, read_item};
use crate::constants::{UIPATH_BASE_ORIGIN, UIPATH_DEFAULT_CATEGORY};
use crate::error::{Result, ScraperError};
use crate::pipeline::processing::json_search::find_array_by_key;
use crate::pipeline::processing::sanitize::sanitize;
use crate::types::{Source, UnifiedEvent};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

/// Key under which the webinar list sits, at no fixed depth in the page data.
const RESOURCE_MARKER: &str = "resourceData";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UiPathResource {
    #[serde(default, deserialize_with = "lenient_text")]
    title: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    category: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    slug: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    teaser_body: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    body: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    date: Option<String>,
}

/// UiPath automation webinars, served as Gatsby page data.
pub struct UiPathAdapter;

impl Default for UiPathAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl UiPathAdapter {
    pub fn new() -> Self {
        Self
    }

    fn map_resource(&self, resource: UiPathResource) -> UnifiedEvent {
        let category =
            non_empty(resource.category).unwrap_or_else(|| UIPATH_DEFAULT_CATEGORY.to_string());
        let description_source = non_empty(resource.teaser_body).or(non_empty(resource.body));
        let register_link = non_empty(resource.slug).map(|slug| absolute_link(&slug));

        UnifiedEvent {
            source: Source::UiPath,
            title: resource.title,
            description: Some(sanitize(description_source.as_deref())),
            start_date: resource.date,
            end_date: None,
            location: None,
            register_link,
            category,
        }
    }
}

/// Resource paths are usually site-relative; some entries already carry a full URL.
fn absolute_link(slug: &str) -> String {
    if slug.starts_with("http") {
        slug.to_string()
    } else {
        format!("{UIPATH_BASE_ORIGIN}{slug}")
    }
}

impl SourceAdapter for UiPathAdapter {
    fn source(&self) -> Source {
        Source::UiPath
    }

    fn extract(&self, payload: &Value) -> Result<Vec<UnifiedEvent>> {
        let items = find_array_by_key(payload, RESOURCE_MARKER).ok_or_else(|| {
            ScraperError::Shape {
                source_name: Source::UiPath.to_string(),
                message: format!("no '{RESOURCE_MARKER}' list found"),
            }
        })?;

        let events = items
            .iter()
            .filter_map(|item| {
                let resource = read_item::<UiPathResource>(item);
                if resource.is_none() {
                    debug!("Skipping non-object UiPath resource");
                }
                resource
            })
            .map(|resource| self.map_resource(resource))
            .collect();
        Ok(events)
    }
}
