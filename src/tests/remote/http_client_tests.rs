use super::*;

#[test]
fn error_message_prefers_server_supplied_message() {
    let payload = serde_json::json!({ "error": { "message": "chat not found" } });
    assert_eq!(
        error_message(StatusCode::NOT_FOUND, &payload),
        "chat not found"
    );
}

#[test]
fn error_message_hints_on_unauthorized() {
    assert_eq!(
        error_message(StatusCode::UNAUTHORIZED, &Value::Null),
        "unauthorized (API key invalid or expired)"
    );
}

#[test]
fn error_message_falls_back_to_canonical_reason() {
    let payload = serde_json::json!({ "detail": "ignored" });
    assert_eq!(
        error_message(StatusCode::INTERNAL_SERVER_ERROR, &payload),
        "Internal Server Error"
    );
}
