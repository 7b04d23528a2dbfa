//! Middleware for logging requests and responses.

use axum::{
    body::Body,
    extract::Request,
    http::{HeaderMap, HeaderValue, StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::Value;

/// The maximum number of bytes of a request or response body logged at the `info` level.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

const REDACTED: &str = "Bearer ********";

/// JSON fields whose values are never logged.
const SECRET_FIELDS: [&str; 3] = ["password", "confirm_password", "token"];

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If a body is longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is
/// truncated and the full body is logged at the `debug` level.
/// The bearer token in the `Authorization` header and the passwords and
/// tokens in JSON bodies are never logged.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body_text = match read_body_text(body).await {
        Ok(text) => text,
        Err(error) => {
            tracing::warn!("could not read request body: {error}");
            return (StatusCode::BAD_REQUEST, "could not read request body").into_response();
        }
    };

    let display_text = redact_secrets(&body_text);
    tracing::info!(
        "Received request: {} {}\nheaders: {:#?}\nbody: {}",
        parts.method,
        parts.uri,
        redact_headers(&parts.headers),
        truncate(&display_text)
    );
    log_full_body("request", &display_text);

    let request = Request::from_parts(parts, body_text.into());
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let body_text = match read_body_text(body).await {
        Ok(text) => text,
        Err(error) => {
            tracing::error!("could not read response body: {error}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let display_text = redact_secrets(&body_text);
    tracing::info!(
        "Sending response: {}\nheaders: {:#?}\nbody: {}",
        parts.status,
        parts.headers,
        truncate(&display_text)
    );
    log_full_body("response", &display_text);

    Response::from_parts(parts, body_text.into())
}

async fn read_body_text(body: Body) -> Result<String, axum::Error> {
    let body_bytes = axum::body::to_bytes(body, usize::MAX).await?;

    Ok(String::from_utf8_lossy(&body_bytes).to_string())
}

/// A copy of `headers` with the credentials masked.
fn redact_headers(headers: &HeaderMap) -> HeaderMap {
    let mut headers = headers.clone();

    if headers.contains_key(AUTHORIZATION) {
        headers.insert(AUTHORIZATION, HeaderValue::from_static(REDACTED));
    }

    headers
}

/// `body` with the values of [SECRET_FIELDS] masked if it is a JSON object.
fn redact_secrets(body: &str) -> String {
    let Ok(Value::Object(mut fields)) = serde_json::from_str::<Value>(body) else {
        return body.to_owned();
    };

    let mut redacted = false;
    for name in SECRET_FIELDS {
        if let Some(value) = fields.get_mut(name) {
            *value = Value::String("********".to_owned());
            redacted = true;
        }
    }

    if redacted {
        Value::Object(fields).to_string()
    } else {
        body.to_owned()
    }
}

fn truncate(body: &str) -> String {
    if body.len() <= LOG_BODY_LENGTH_LIMIT {
        return format!("{body:?}");
    }

    // Back off to a char boundary so multi-byte text is never split.
    let mut end = LOG_BODY_LENGTH_LIMIT;
    while !body.is_char_boundary(end) {
        end -= 1;
    }

    format!("{:?}...", &body[..end])
}

fn log_full_body(direction: &str, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::debug!("Full {direction} body: {body:?}");
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        Router,
        http::{HeaderMap, HeaderValue, header::AUTHORIZATION},
        middleware,
        routing::post,
    };
    use axum_test::TestServer;

    use super::{
        LOG_BODY_LENGTH_LIMIT, logging_middleware, redact_headers, redact_secrets, truncate,
    };

    #[test]
    fn redacts_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer secret-token"));

        let redacted = redact_headers(&headers);

        assert_eq!(redacted[AUTHORIZATION], "Bearer ********");
        assert!(!format!("{redacted:?}").contains("secret-token"));
    }

    #[test]
    fn leaves_headers_without_credentials_alone() {
        let headers = HeaderMap::new();

        assert!(redact_headers(&headers).is_empty());
    }

    #[test]
    fn masks_passwords_and_tokens_in_json_bodies() {
        let body = r#"{"name":"alice","password":"hunter2hunter2","token":"abc-123"}"#;

        let redacted = redact_secrets(body);

        assert!(!redacted.contains("hunter2hunter2"));
        assert!(!redacted.contains("abc-123"));
        assert!(redacted.contains("alice"));
    }

    #[test]
    fn leaves_other_bodies_alone() {
        assert_eq!(redact_secrets("not json"), "not json");
        assert_eq!(redact_secrets(r#"{"amount":1}"#), r#"{"amount":1}"#);
    }

    #[test]
    fn truncates_long_bodies() {
        let body = "a".repeat(LOG_BODY_LENGTH_LIMIT + 10);

        let truncated = truncate(&body);

        assert!(truncated.ends_with("..."));
        assert_eq!(truncated.len(), LOG_BODY_LENGTH_LIMIT + 2 + 3);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let body = "é".repeat(LOG_BODY_LENGTH_LIMIT);

        let truncated = truncate(&body);

        assert!(truncated.ends_with("..."));
    }

    #[tokio::test]
    async fn passes_bodies_through_unchanged() {
        let app = Router::new()
            .route("/echo", post(|body: String| async move { body }))
            .layer(middleware::from_fn(logging_middleware));
        let server = TestServer::new(app).expect("Could not create test server.");

        let response = server.post("/echo").text("hello, world").await;

        response.assert_status_ok();
        response.assert_text("hello, world");
    }

    #[tokio::test]
    async fn forwards_passwords_unredacted() {
        let app = Router::new()
            .route("/echo", post(|body: String| async move { body }))
            .layer(middleware::from_fn(logging_middleware));
        let server = TestServer::new(app).expect("Could not create test server.");
        let body = r#"{"password":"hunter2hunter2"}"#;

        let response = server.post("/echo").text(body).await;

        response.assert_text(body);
    }
}
