//! Lenient field readers for third-party payloads whose shapes are not under
//! our control. Used through `#[serde(default, deserialize_with = ...)]`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Strings as-is, numbers and booleans rendered to text, anything else absent.
pub fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// A nested object, or `T::default()` when the value is missing, not an
/// object, or does not fit `T`.
pub fn lenient_object<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_object() {
        Ok(T::deserialize(value).unwrap_or_default())
    } else {
        Ok(T::default())
    }
}

/// Empty strings count as absent in fallback chains.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

/// Deserialize one raw item if it is a JSON object.
pub fn read_item<T: DeserializeOwned>(item: &Value) -> Option<T> {
    if !item.is_object() {
        return None;
    }
    T::deserialize(item).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Default, Deserialize)]
    struct Inner {
        #[serde(default, deserialize_with = "lenient_text")]
        name: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    struct Outer {
        #[serde(default, deserialize_with = "lenient_text")]
        title: Option<String>,
        #[serde(default, deserialize_with = "lenient_object")]
        inner: Inner,
    }

    #[test]
    fn scalars_are_rendered_and_containers_dropped() {
        let outer: Outer = read_item(&json!({"title": 42, "inner": {"name": true}})).unwrap();
        assert_eq!(outer.title.as_deref(), Some("42"));
        assert_eq!(outer.inner.name.as_deref(), Some("true"));

        let outer: Outer = read_item(&json!({"title": ["x"], "inner": {"name": {"a": 1}}})).unwrap();
        assert_eq!(outer.title, None);
        assert_eq!(outer.inner.name, None);
    }

    #[test]
    fn missing_or_wrong_nested_object_defaults() {
        let outer: Outer = read_item(&json!({"inner": null})).unwrap();
        assert_eq!(outer.inner.name, None);
        let outer: Outer = read_item(&json!({"inner": "text"})).unwrap();
        assert_eq!(outer.inner.name, None);
        let outer: Outer = read_item(&json!({})).unwrap();
        assert_eq!(outer.title, None);
    }

    #[test]
    fn non_object_items_are_rejected() {
        assert!(read_item::<Outer>(&json!(["title"])).is_none());
        assert!(read_item::<Outer>(&json!("title")).is_none());
    }

    #[test]
    fn non_empty_filters_blank() {
        assert_eq!(non_empty(Some(String::new())), None);
        assert_eq!(non_empty(Some("x".into())), Some("x".into()));
        assert_eq!(non_empty(None), None);
    }
}
