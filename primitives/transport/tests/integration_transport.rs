//! Integration tests for the shared transport API.
//!
//! These exercise consumer usage patterns against an in-memory transport,
//! without a running server.

use std::sync::{Arc, Mutex};

use transport::{
    check_status, ApiErrorKind, ApiRequest, DynTransport, RawResponse, Transport, TransportError,
};

/// Answers from a fixed route table and records every request.
struct DummyTransport {
    seen: Mutex<Vec<ApiRequest>>,
}

#[async_trait::async_trait]
impl transport::Transport for DummyTransport {
    async fn execute(&self, request: &ApiRequest) -> Result<RawResponse, TransportError> {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(request.clone());
        }
        let response = match request.path.as_str() {
            "/ping" => RawResponse::new(200, r#"{"ok": true}"#),
            "/limited" => RawResponse::new(429, r#"{"message": "slow down"}"#)
                .with_header("Retry-After", "1"),
            _ => RawResponse::new(404, r#"{"error": "no route"}"#),
        };
        check_status(response)
    }

    fn endpoint(&self) -> &str { "dummy://" }
}

fn transport() -> Arc<DummyTransport> { Arc::new(DummyTransport { seen: Mutex::new(Vec::new()) }) }

#[tokio::test]
async fn consumer_can_call_transport() {
    let t = transport();
    let response = t.execute(&ApiRequest::get("/ping")).await.expect("ok");
    assert_eq!(response.json().expect("json")["ok"], true);
}

#[tokio::test]
async fn consumer_sees_api_error() {
    let t = transport();
    let err = t.execute(&ApiRequest::get("/missing")).await.expect_err("should err");
    match err {
        TransportError::Api(error) => {
            assert_eq!(error.kind, ApiErrorKind::NotFound);
            assert_eq!(error.message, "no route");
        }
        other => panic!("unexpected error variant: {other:?}"),
    }

    let err = t.execute(&ApiRequest::get("/limited")).await.expect_err("should err");
    assert!(err.is_retryable());
}

#[tokio::test]
async fn transport_is_shareable_as_dyn() {
    let concrete = transport();
    let shared: DynTransport = concrete.clone();
    assert_eq!(shared.endpoint(), "dummy://");

    let request = ApiRequest::delete("/ping").header("X-Request-Id", "42");
    shared.execute(&request).await.expect("ok");
    let seen = concrete.seen.lock().expect("lock");
    assert_eq!(seen.as_slice(), &[request]);
}
