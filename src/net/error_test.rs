use super::*;

// =============================================================================
// from_status
// =============================================================================

#[test]
fn from_status_401_is_unauthorized() {
    let err = ApiError::from_status(401, "");
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert_eq!(err.to_string(), "HTTP 401");
}

#[test]
fn from_status_403_is_forbidden() {
    let err = ApiError::from_status(403, r#"{"message":"Admin only"}"#);
    assert_eq!(err, ApiError::Forbidden("Admin only".into()));
}

#[test]
fn from_status_4xx_uses_server_message() {
    let err = ApiError::from_status(400, r#"{"success":false,"message":"Invalid email or password"}"#);
    assert_eq!(err.kind(), ErrorKind::ValidationFailure);
    assert_eq!(err.to_string(), "Invalid email or password");
}

#[test]
fn from_status_409_is_validation() {
    let err = ApiError::from_status(409, "{}");
    assert_eq!(err, ApiError::Validation { status: 409, message: "HTTP 409".into() });
}

#[test]
fn from_status_5xx_is_server_fault() {
    for status in [500_u16, 502, 503, 599] {
        let err = ApiError::from_status(status, "<html>gateway</html>");
        assert_eq!(err.kind(), ErrorKind::ServerFault, "status {status}");
        assert_eq!(err.to_string(), format!("HTTP {status}"));
    }
}

#[test]
fn from_status_ignores_blank_message() {
    let err = ApiError::from_status(422, r#"{"message":"   "}"#);
    assert_eq!(err.to_string(), "HTTP 422");
}

#[test]
fn from_status_ignores_non_string_message() {
    let err = ApiError::from_status(400, r#"{"message":42}"#);
    assert_eq!(err.to_string(), "HTTP 400");
}

// =============================================================================
// error codes
// =============================================================================

#[test]
fn error_codes_are_distinct() {
    let errors = [
        ApiError::Network("x".into()),
        ApiError::Unauthorized("x".into()),
        ApiError::Forbidden("x".into()),
        ApiError::Validation { status: 400, message: "x".into() },
        ApiError::Server { status: 500, message: "x".into() },
        ApiError::MalformedResponse("x".into()),
    ];
    let mut codes: Vec<_> = errors.iter().map(ApiError::error_code).collect();
    codes.sort_unstable();
    codes.dedup();
    assert_eq!(codes.len(), errors.len());
}

#[test]
fn network_error_display_is_prefixed() {
    let err = ApiError::Network("connection refused".into());
    assert_eq!(err.to_string(), "network failure: connection refused");
}

#[test]
fn error_kind_serializes_snake_case() {
    let json = serde_json::to_string(&ErrorKind::ValidationFailure).unwrap();
    assert_eq!(json, "\"validation_failure\"");
}
