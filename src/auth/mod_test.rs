use super::*;

#[test]
fn ok_carries_data() {
    let outcome = Outcome::ok(5);
    assert!(outcome.success);
    assert_eq!(outcome.data, Some(5));
    assert!(outcome.message.is_none());
    assert!(!outcome.is_unauthorized());
}

#[test]
fn failed_carries_message_and_kind() {
    let outcome: Outcome<()> = Outcome::failed(&ApiError::Unauthorized("Unauthorized".into()));
    assert!(!outcome.success);
    assert!(outcome.data.is_none());
    assert_eq!(outcome.message.as_deref(), Some("Unauthorized"));
    assert!(outcome.is_unauthorized());
}

#[test]
fn from_result() {
    let ok: Outcome<u8> = Ok(1).into();
    assert!(ok.success);
    let err: Outcome<u8> = Err(ApiError::Server { status: 502, message: "HTTP 502".into() }).into();
    assert_eq!(err.error, Some(ErrorKind::ServerFault));
    assert_eq!(err.message_or("fallback"), "HTTP 502");
}

#[test]
fn message_or_falls_back_on_blank() {
    let outcome: Outcome<()> = Outcome::failed(&ApiError::Validation { status: 400, message: String::new() });
    assert_eq!(outcome.message_or("Login failed"), "Login failed");
}

#[test]
fn serializes_uniform_shape() {
    let outcome: Outcome<()> = Outcome::failed(&ApiError::Forbidden("Forbidden".into()));
    let value = serde_json::to_value(&outcome).unwrap();
    assert_eq!(value, serde_json::json!({ "success": false, "message": "Forbidden", "error": "forbidden" }));
}
