//! Custom assertions para tests.

use serde_json::Value;

/// Verifica que un JSON tenga la forma de una tarea.
pub fn assert_task_schema(json: &Value) {
    let obj = json.as_object().expect("Task should be a JSON object");

    for field in ["id", "title", "description", "status", "priority", "user_id"] {
        assert!(obj.contains_key(field), "Missing '{}' field", field);
    }
    assert!(obj["id"].is_u64(), "'id' should be an integer");
    assert!(obj["title"].is_string(), "'title' should be a string");
    assert!(
        obj["created_at"].is_string() && obj["updated_at"].is_string(),
        "timestamps should be strings"
    );
}

/// Verifica el body de error `{error, message}`.
pub fn assert_error_body(json: &Value, error: &str) {
    assert_eq!(json["error"], error, "Unexpected error body: {}", json);
    assert!(json["message"].is_string(), "'message' should be a string");
}
