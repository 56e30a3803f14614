// Integration tests for the DevTools connection
//
// A mock browser endpoint accepts one websocket and answers requests with
// a per-test closure. Tests cover request/response correlation, session
// routing, protocol errors, timeouts and event delivery to execution
// contexts.

mod common;

use cdp_bridge::server::connection::Connection;
use cdp_bridge::server::session::SessionLike;
use cdp_bridge::{ConnectOptions, Error, ExecutionContext, JsValue, Script};
use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

/// Starts a mock endpoint. `respond` maps each request to the frames sent
/// back, in order; an empty list leaves the request unanswered.
async fn start_browser<F>(respond: F) -> (String, JoinHandle<()>)
where
    F: Fn(&Value) -> Vec<Value> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        while let Some(Ok(message)) = ws.next().await {
            let Ok(text) = message.to_text() else {
                continue;
            };
            let Ok(request) = serde_json::from_str::<Value>(text) else {
                continue;
            };
            for frame in respond(&request) {
                if ws.send(Message::text(frame.to_string())).await.is_err() {
                    return;
                }
            }
        }
    });

    (format!("ws://{}", addr), server)
}

fn reply(request: &Value, result: Value) -> Value {
    let mut response = json!({ "id": request["id"], "result": result });
    if let Some(session_id) = request.get("sessionId") {
        response["sessionId"] = session_id.clone();
    }
    response
}

fn attach_or(request: &Value, otherwise: impl FnOnce() -> Vec<Value>) -> Vec<Value> {
    if request["method"] == "Target.attachToTarget" {
        vec![reply(request, json!({ "sessionId": "S1" }))]
    } else {
        otherwise()
    }
}

#[tokio::test]
async fn test_browser_session_round_trip() -> anyhow::Result<()> {
    common::init_tracing();
    let (url, server) = start_browser(|request| {
        assert!(request.get("sessionId").is_none());
        vec![reply(request, json!({ "product": "HeadlessChrome/120.0" }))]
    })
    .await;

    let connection = Connection::connect(&url, None).await?;
    let session = connection.browser_session();
    assert_eq!(session.session_id(), None);

    let version = session
        .send_message("Browser.getVersion", json!({}))
        .await?;
    assert_eq!(version["product"], "HeadlessChrome/120.0");

    server.abort();
    Ok(())
}

#[tokio::test]
async fn test_attached_session_routes_requests() -> anyhow::Result<()> {
    let (url, server) = start_browser(|request| {
        attach_or(request, || {
            assert_eq!(request["sessionId"], "S1");
            assert_eq!(request["method"], "Runtime.evaluate");
            vec![reply(
                request,
                json!({ "result": { "type": "number", "value": 4 } }),
            )]
        })
    })
    .await;

    let connection = Connection::connect(&url, None).await?;
    let session = connection.attach_to_target("T1").await?;
    assert_eq!(session.session_id(), Some("S1"));

    let context = ExecutionContext::new(Arc::new(session), 1, None);
    let value = context.evaluate(Script::expression("2 + 2"), &[]).await?;
    assert_eq!(value, JsValue::Number(4.0));

    server.abort();
    Ok(())
}

#[tokio::test]
async fn test_protocol_error_is_reported_verbatim() {
    let (url, server) = start_browser(|request| {
        attach_or(request, || {
            vec![json!({
                "id": request["id"],
                "sessionId": "S1",
                "error": { "code": -32000, "message": "Cannot find context with specified id" }
            })]
        })
    })
    .await;

    let connection = Connection::connect(&url, None).await.unwrap();
    let session = connection.attach_to_target("T1").await.unwrap();

    let err = session
        .send_message("Runtime.evaluate", json!({ "expression": "1" }))
        .await
        .unwrap_err();
    match err {
        Error::ProtocolError(message) => {
            assert_eq!(message, "Cannot find context with specified id")
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let context = ExecutionContext::new(Arc::new(session), 1, None);
    let err = context
        .evaluate(Script::expression("1"), &[])
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ContextDestroyed), "got {err:?}");

    server.abort();
}

#[tokio::test]
async fn test_unanswered_request_times_out() {
    let (url, server) = start_browser(|_| Vec::new()).await;

    let options = ConnectOptions::new().timeout(100.0);
    let connection = Connection::connect(&url, Some(options)).await.unwrap();
    let session = connection.browser_session();

    let err = session
        .send_message("Browser.getVersion", json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Timeout(_)), "got {err:?}");

    server.abort();
}

#[tokio::test]
async fn test_closed_endpoint_fails_pending_requests() {
    let (url, server) = start_browser(|_| Vec::new()).await;

    let connection = Connection::connect(&url, None).await.unwrap();
    let session = connection.browser_session();

    let pending = tokio::spawn(async move {
        session
            .send_message("Browser.getVersion", json!({}))
            .await
    });
    tokio::time::sleep(Duration::from_millis(50)).await;
    server.abort();

    let result = tokio::time::timeout(Duration::from_secs(5), pending)
        .await
        .expect("pending request should settle")
        .unwrap();
    assert!(result.is_err());
}

#[tokio::test]
async fn test_context_destroyed_event_reaches_context() {
    let (url, server) = start_browser(|request| {
        attach_or(request, || {
            if request["method"] == "Runtime.runIfWaitingForDebugger" {
                vec![
                    // Another session's context with the same id is ignored
                    json!({
                        "method": "Runtime.executionContextDestroyed",
                        "params": { "executionContextId": 1 },
                        "sessionId": "S2"
                    }),
                    json!({
                        "method": "Runtime.executionContextDestroyed",
                        "params": { "executionContextId": 1 },
                        "sessionId": "S1"
                    }),
                    reply(request, json!({})),
                ]
            } else {
                vec![reply(request, json!({}))]
            }
        })
    })
    .await;

    let connection = Connection::connect(&url, None).await.unwrap();
    let session = connection.attach_to_target("T1").await.unwrap();

    let context = ExecutionContext::new(Arc::new(session.clone()), 1, None);
    let listener = context.track_destruction(&session);

    session
        .send_message("Runtime.runIfWaitingForDebugger", json!({}))
        .await
        .unwrap();

    tokio::time::timeout(Duration::from_secs(5), listener)
        .await
        .expect("listener should stop once the context is destroyed")
        .unwrap();
    assert!(context.is_destroyed());

    let err = context
        .evaluate(Script::expression("1"), &[])
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ContextDestroyed));

    server.abort();
}

#[tokio::test]
async fn test_connect_to_missing_endpoint_fails() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = Connection::connect(&format!("ws://{}", addr), None)
        .await
        .err()
        .expect("connect should fail");
    assert!(matches!(err, Error::ConnectionFailed(_)), "got {err:?}");
}
