//! Depth-first traversal over untyped JSON payloads.

use serde_json::Value;
use std::ops::ControlFlow;

/// Visit every `(key, value)` pair of every object in `value`, depth first and
/// in document order. The visitor stops the walk by returning `Break`.
pub fn walk_entries<'a, B, F>(value: &'a Value, visit: &mut F) -> ControlFlow<B>
where
    F: FnMut(&'a str, &'a Value) -> ControlFlow<B>,
{
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                visit(key.as_str(), child)?;
                walk_entries(child, visit)?;
            }
            ControlFlow::Continue(())
        }
        Value::Array(items) => {
            for item in items {
                walk_entries(item, visit)?;
            }
            ControlFlow::Continue(())
        }
        _ => ControlFlow::Continue(()),
    }
}

/// First non-empty array stored under `marker` anywhere in the tree.
///
/// Empty arrays under the marker are passed over so a later populated one can
/// still be found.
pub fn find_array_by_key<'a>(value: &'a Value, marker: &str) -> Option<&'a Vec<Value>> {
    let found = walk_entries(value, &mut |key, child| match child {
        Value::Array(items) if key == marker && !items.is_empty() => ControlFlow::Break(items),
        _ => ControlFlow::Continue(()),
    });
    match found {
        ControlFlow::Break(items) => Some(items),
        ControlFlow::Continue(()) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn finds_deeply_nested_marker() {
        let payload = json!({
            "result": {
                "pageContext": {},
                "data": {
                    "page": [
                        {"widgets": "none"},
                        {"block": {"resourceData": [{"title": "A"}, {"title": "B"}]}}
                    ]
                }
            }
        });
        let items = find_array_by_key(&payload, "resourceData").unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["title"], "A");
    }

    #[test]
    fn first_match_in_document_order_wins() {
        let payload = json!({
            "z_first": {"resourceData": [{"title": "first"}]},
            "a_second": {"resourceData": [{"title": "second"}]}
        });
        let items = find_array_by_key(&payload, "resourceData").unwrap();
        assert_eq!(items[0]["title"], "first");
    }

    #[test]
    fn skips_non_array_and_empty_matches() {
        let payload = json!({
            "resourceData": {"not": "a list"},
            "nested": [{"resourceData": []}, {"deeper": {"resourceData": [1]}}]
        });
        let items = find_array_by_key(&payload, "resourceData").unwrap();
        assert_eq!(items, &vec![json!(1)]);
    }

    #[test]
    fn missing_marker_returns_none() {
        assert!(find_array_by_key(&json!({"data": [1, 2, 3]}), "resourceData").is_none());
        assert!(find_array_by_key(&json!("scalar"), "resourceData").is_none());
        assert!(find_array_by_key(&json!(null), "resourceData").is_none());
    }

    #[test]
    fn walk_stops_at_first_break() {
        let payload = json!({"a": {"b": 1}, "c": 2});
        let mut seen = Vec::new();
        let _ = walk_entries(&payload, &mut |key, _| {
            seen.push(key.to_string());
            if key == "b" {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        assert_eq!(seen, vec!["a", "b"]);
    }
}
