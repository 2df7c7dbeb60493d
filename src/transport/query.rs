use serde_json::{Map, Value};

/// Flatten a JSON parameter object into URL query pairs.
///
/// Nested objects and arrays become bracketed keys (`a[min]`, `a[0]`),
/// booleans are sent as `1`/`0`, and `null` values are omitted.
pub fn encode_query(params: &Map<String, Value>) -> Vec<(String, String)> {
    let mut out = Vec::with_capacity(params.len());
    for (key, value) in params {
        flatten_into(&mut out, key.clone(), value);
    }
    out
}

fn flatten_into(out: &mut Vec<(String, String)>, key: String, value: &Value) {
    match value {
        Value::Null => {}
        Value::Bool(flag) => out.push((key, if *flag { "1" } else { "0" }.to_owned())),
        Value::Number(number) => out.push((key, number.to_string())),
        Value::String(text) => out.push((key, text.clone())),
        Value::Array(items) => {
            for (idx, item) in items.iter().enumerate() {
                flatten_into(out, format!("{key}[{idx}]"), item);
            }
        }
        Value::Object(map) => {
            for (sub, item) in map {
                flatten_into(out, format!("{key}[{sub}]"), item);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn pairs(value: Value) -> Vec<(String, String)> {
        match value {
            Value::Object(map) => encode_query(&map),
            _ => unreachable!(),
        }
    }

    #[test]
    fn encodes_scalars_in_insertion_order() {
        assert_eq!(
            pairs(json!({"name": "Alice", "page_size": 20, "starred": true, "archived": false})),
            vec![
                ("name".to_owned(), "Alice".to_owned()),
                ("page_size".to_owned(), "20".to_owned()),
                ("starred".to_owned(), "1".to_owned()),
                ("archived".to_owned(), "0".to_owned()),
            ]
        );
    }

    #[test]
    fn encodes_nested_modifiers_with_brackets() {
        assert_eq!(
            pairs(json!({
                "time_created": {"min": 10, "max": 20},
                "vars": {"region": {"prefix": "US"}},
                "phone_number": {"exists": true}
            })),
            vec![
                ("time_created[min]".to_owned(), "10".to_owned()),
                ("time_created[max]".to_owned(), "20".to_owned()),
                ("vars[region][prefix]".to_owned(), "US".to_owned()),
                ("phone_number[exists]".to_owned(), "1".to_owned()),
            ]
        );
    }

    #[test]
    fn encodes_arrays_with_indices_and_skips_null() {
        assert_eq!(
            pairs(json!({"ids": ["a", "b"], "label_id": null})),
            vec![
                ("ids[0]".to_owned(), "a".to_owned()),
                ("ids[1]".to_owned(), "b".to_owned()),
            ]
        );
    }
}
