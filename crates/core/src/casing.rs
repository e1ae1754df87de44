//! snake_case to camelCase key rewriting for outgoing JSON.

use serde_json::{Map, Value};

/// Converts one snake_case key to camelCase.
///
/// The first segment is lowercased; each later segment is capitalized with
/// the rest of it lowercased, so `last_update` becomes `lastUpdate`.
pub fn to_camel_case(key: &str) -> String {
    let mut parts = key.split('_');
    let mut out = parts.next().unwrap_or_default().to_lowercase();

    for part in parts {
        let mut chars = part.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(&chars.as_str().to_lowercase());
        }
    }

    out
}

/// Rewrites every object key in a JSON tree to camelCase.
///
/// Recurses through nested objects and arrays; scalar values are untouched.
///
/// # Example
///
/// ```rust
/// use mangarelay_core::casing::camelize_keys;
/// use serde_json::json;
///
/// let value = camelize_keys(json!({"last_update": "x", "chapters": [{"last_chapter": 1}]}));
/// assert_eq!(value, json!({"lastUpdate": "x", "chapters": [{"lastChapter": 1}]}));
/// ```
pub fn camelize_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (to_camel_case(&key), camelize_keys(value)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(camelize_keys).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("url", "url")]
    #[case("last_update", "lastUpdate")]
    #[case("last_chapter", "lastChapter")]
    #[case("Last_UPDATE", "lastUpdate")]
    #[case("a_b_c", "aBC")]
    fn test_to_camel_case(#[case] key: &str, #[case] expected: &str) {
        assert_eq!(to_camel_case(key), expected);
    }

    #[test]
    fn test_camelize_nested() {
        let value = json!({
            "code": "SUCCESS",
            "data": {
                "last_update": "Jan 1",
                "chapters": [{"chapter_title": "One"}, "plain_string", 3],
                "nested_list": [[{"inner_key": null}]]
            }
        });

        assert_eq!(
            camelize_keys(value),
            json!({
                "code": "SUCCESS",
                "data": {
                    "lastUpdate": "Jan 1",
                    "chapters": [{"chapterTitle": "One"}, "plain_string", 3],
                    "nestedList": [[{"innerKey": null}]]
                }
            })
        );
    }
}
