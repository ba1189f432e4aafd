use serde_json::{Deserializer, Map, Value};

/// Find the first syntactically valid JSON object embedded in free text.
///
/// Models often wrap their answer in prose or code fences. Every `{` is tried
/// as a starting point in order; the first one that begins a complete object
/// wins, and whatever follows that object is ignored.
pub fn first_json_object(text: &str) -> Option<Map<String, Value>> {
    text.char_indices()
        .filter(|(_, c)| *c == '{')
        .find_map(|(start, _)| object_at(&text[start..]))
}

fn object_at(candidate: &str) -> Option<Map<String, Value>> {
    let mut stream = Deserializer::from_str(candidate).into_iter::<Value>();
    match stream.next() {
        Some(Ok(Value::Object(map))) => Some(map),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bare_object() {
        let m = first_json_object(r#"{"merchant":"Shell"}"#).unwrap();
        assert_eq!(m["merchant"], json!("Shell"));
    }

    #[test]
    fn object_surrounded_by_prose() {
        let m = first_json_object(r#"I think this is: {"merchant":"BP"} — done."#).unwrap();
        assert_eq!(m.len(), 1);
        assert_eq!(m["merchant"], json!("BP"));
    }

    #[test]
    fn object_in_markdown_fence() {
        let text = "```json\n{\"total\": 45.3}\n```";
        assert_eq!(first_json_object(text).unwrap()["total"], json!(45.3));
    }

    #[test]
    fn skips_broken_brace_before_valid_object() {
        let text = r#"Using {placeholders} here. {"merchant":"EKO","items":[{"name":"x","price":1}]}"#;
        let m = first_json_object(text).unwrap();
        assert_eq!(m["merchant"], json!("EKO"));
    }

    #[test]
    fn first_of_two_objects_wins() {
        let m = first_json_object(r#"{"merchant":"A"} or {"merchant":"B"}"#).unwrap();
        assert_eq!(m["merchant"], json!("A"));
    }

    #[test]
    fn no_object_at_all() {
        assert!(first_json_object("Sorry, I cannot read this receipt.").is_none());
        assert!(first_json_object("[1, 2, 3]").is_none());
        assert!(first_json_object("{\"unterminated\": ").is_none());
        assert!(first_json_object("").is_none());
    }
}
