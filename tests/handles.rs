use std::sync::{Arc, Mutex};

use futures::StreamExt;
use serde_json::json;

use remotejs::cmd::CommandMessage;
use remotejs::error::HandleError;
use remotejs::types::runtime::{RemoteObject, RemoteObjectType};
use remotejs::types::{CallId, Response};
use remotejs::{ExecutionContext, HandleKind, JsHandle, Session};

type CallLog = Arc<Mutex<Vec<(String, serde_json::Value)>>>;

/// Spawns a scripted stand-in for the transport: it answers every submitted
/// command via `respond` and records the requests it saw.
fn spawn_session<F>(mut respond: F) -> (Arc<Session>, CallLog)
where
    F: FnMut(&str, &serde_json::Value) -> Result<serde_json::Value, remotejs::types::Error>
        + Send
        + 'static,
{
    let (tx, mut rx) = futures::channel::mpsc::channel(16);
    let calls: CallLog = Arc::default();
    let log = Arc::clone(&calls);
    async_std::task::spawn(async move {
        let mut next_id = 0usize;
        while let Some(msg) = rx.next().await {
            let CommandMessage {
                method,
                params,
                sender,
            } = msg;
            next_id += 1;
            log.lock().unwrap().push((method.to_string(), params.clone()));
            let resp = match respond(&method, &params) {
                Ok(result) => Response {
                    id: CallId::new(next_id),
                    result: Some(result),
                    error: None,
                },
                Err(err) => Response {
                    id: CallId::new(next_id),
                    result: None,
                    error: Some(err),
                },
            };
            let _ = sender.send(Ok(resp));
        }
    });
    (Arc::new(Session::new(tx)), calls)
}

fn object_handle(context: &Arc<ExecutionContext>, object_id: &str) -> JsHandle {
    let mut object = RemoteObject::new(RemoteObjectType::Object);
    object.object_id = Some(object_id.into());
    JsHandle::new(Arc::clone(context), object, HandleKind::Object)
}

fn number_handle(context: &Arc<ExecutionContext>, value: i64) -> JsHandle {
    let mut object = RemoteObject::new(RemoteObjectType::Number);
    object.value = Some(json!(value));
    JsHandle::new(Arc::clone(context), object, HandleKind::Object)
}

#[async_std::test]
async fn infinities_encode_as_sentinels() {
    let (session, calls) = spawn_session(|_, _| Ok(json!({"result": {"type": "undefined"}})));
    let ctx = ExecutionContext::with_default_factory(session, 1.into());

    let mut handle = ctx
        .evaluate_handle(
            "(a, b) => {}",
            vec![f64::INFINITY.into(), f64::NEG_INFINITY.into()],
        )
        .await
        .unwrap();
    handle.dispose().await.unwrap();

    let (method, params) = calls.lock().unwrap()[0].clone();
    assert_eq!(method, "Runtime.callFunctionOn");
    assert_eq!(
        params["arguments"],
        json!([
            {"unserializableValue": "Infinity"},
            {"unserializableValue": "-Infinity"}
        ])
    );
    assert_eq!(params["executionContextId"], json!(1));
    assert_eq!(params["returnByValue"], json!(false));
    assert_eq!(params["awaitPromise"], json!(true));
}

#[async_std::test]
async fn cross_context_handle_fails_before_rpc() {
    let (session, calls) = spawn_session(|_, _| Ok(json!({"result": {"type": "undefined"}})));
    let ctx = ExecutionContext::with_default_factory(Arc::clone(&session), 1.into());
    let other = ExecutionContext::with_default_factory(session, 2.into());

    let mut foreign = object_handle(&other, "obj:1");
    let err = ctx
        .evaluate_handle("o => o", vec![(&foreign).into()])
        .await
        .unwrap_err();
    assert!(matches!(err, HandleError::CrossContextHandle));
    assert!(calls.lock().unwrap().is_empty());
    foreign.dispose().await.ok();
}

#[async_std::test]
async fn disposed_handle_argument_fails_before_rpc() {
    let (session, calls) = spawn_session(|_, _| Ok(json!({"result": {"type": "undefined"}})));
    let ctx = ExecutionContext::with_default_factory(session, 1.into());

    // a primitive handle disposes without touching the runtime
    let mut handle = number_handle(&ctx, 7);
    handle.dispose().await.unwrap();

    let err = ctx
        .evaluate_handle("o => o", vec![(&handle).into()])
        .await
        .unwrap_err();
    assert!(matches!(err, HandleError::DisposedHandleUse));
    assert!(calls.lock().unwrap().is_empty());
}

#[async_std::test]
async fn handle_arguments_forward_reference_sentinel_and_value() {
    let (session, calls) = spawn_session(|_, _| Ok(json!({"result": {"type": "undefined"}})));
    let ctx = ExecutionContext::with_default_factory(session, 1.into());

    let reference = object_handle(&ctx, "obj:3");
    let primitive = number_handle(&ctx, 7);
    let mut sentinel_object = RemoteObject::new(RemoteObjectType::Number);
    sentinel_object.unserializable_value = Some("-0".into());
    let sentinel = JsHandle::new(Arc::clone(&ctx), sentinel_object, HandleKind::Object);

    let mut result = ctx
        .evaluate_handle(
            "(a, b, c) => {}",
            vec![(&reference).into(), (&primitive).into(), (&sentinel).into()],
        )
        .await
        .unwrap();
    result.dispose().await.unwrap();

    let (_, params) = calls.lock().unwrap()[0].clone();
    assert_eq!(
        params["arguments"],
        json!([
            {"objectId": "obj:3"},
            {"value": 7},
            {"unserializableValue": "-0"}
        ])
    );
    drop(reference);
}

#[async_std::test]
async fn double_dispose_releases_once() {
    let (session, calls) = spawn_session(|method, _| {
        assert_eq!(method, "Runtime.releaseObject");
        Ok(json!({}))
    });
    let ctx = ExecutionContext::with_default_factory(session, 1.into());

    let mut handle = object_handle(&ctx, "obj:7");
    handle.dispose().await.unwrap();
    handle.dispose().await.unwrap();

    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].1["objectId"], json!("obj:7"));
}

#[async_std::test]
async fn dispose_swallows_runtime_rejection() {
    let (session, calls) = spawn_session(|_, _| {
        Err(remotejs::types::Error {
            code: -32000,
            message: "Cannot find context with specified id".to_string(),
        })
    });
    let ctx = ExecutionContext::with_default_factory(session, 1.into());

    let mut handle = object_handle(&ctx, "obj:8");
    handle.dispose().await.unwrap();
    assert!(handle.is_disposed());
    assert_eq!(calls.lock().unwrap().len(), 1);
}

#[async_std::test]
async fn get_properties_skips_non_enumerable() {
    let (session, calls) = spawn_session(|method, _| {
        assert_eq!(method, "Runtime.getProperties");
        Ok(json!({"result": [
            {
                "name": "x",
                "configurable": true,
                "enumerable": true,
                "value": {"type": "number", "value": 5}
            },
            {
                "name": "hidden",
                "configurable": true,
                "enumerable": false,
                "value": {"type": "number", "value": 6}
            }
        ]}))
    });
    let ctx = ExecutionContext::with_default_factory(session, 1.into());

    let handle = object_handle(&ctx, "obj:1");
    let properties = handle.get_properties().await.unwrap();
    assert_eq!(properties.len(), 1);
    assert_eq!(properties["x"].json_value().await.unwrap(), json!(5));

    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].1["ownProperties"], json!(true));
}

#[async_std::test]
async fn json_value_of_primitive_issues_no_rpc() {
    let (session, calls) = spawn_session(|_, _| Ok(json!({})));
    let ctx = ExecutionContext::with_default_factory(session, 1.into());

    let handle = number_handle(&ctx, 42);
    assert_eq!(handle.json_value().await.unwrap(), json!(42));
    assert!(calls.lock().unwrap().is_empty());
}

#[async_std::test]
async fn json_value_of_reference_serializes_by_value() {
    let (session, calls) = spawn_session(|method, params| {
        assert_eq!(method, "Runtime.callFunctionOn");
        assert_eq!(params["objectId"], json!("obj:9"));
        assert_eq!(params["returnByValue"], json!(true));
        Ok(json!({"result": {"type": "object", "value": {"a": 1}}}))
    });
    let ctx = ExecutionContext::with_default_factory(session, 1.into());

    let handle = object_handle(&ctx, "obj:9");
    assert_eq!(handle.json_value().await.unwrap(), json!({"a": 1}));
    assert_eq!(calls.lock().unwrap().len(), 1);
}

#[async_std::test]
async fn evaluate_sums_arguments() {
    let (session, calls) =
        spawn_session(|_, _| Ok(json!({"result": {"type": "number", "value": 3}})));
    let ctx = ExecutionContext::with_default_factory(session, 1.into());

    let sum = ctx
        .evaluate("(a, b) => a + b", vec![1.into(), 2.into()])
        .await
        .unwrap();
    assert_eq!(sum, json!(3));

    // primitive result: no by-value call and no release needed
    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].1["arguments"], json!([{"value": 1}, {"value": 2}]));
}

#[async_std::test]
async fn evaluate_surfaces_thrown_exceptions() {
    let (session, _calls) = spawn_session(|_, _| {
        Ok(json!({
            "result": {"type": "object", "subtype": "error"},
            "exceptionDetails": {
                "exceptionId": 1,
                "text": "Uncaught",
                "lineNumber": 0,
                "columnNumber": 7,
                "exception": {
                    "type": "object",
                    "subtype": "error",
                    "description": "Error: boom\n    at <anonymous>:1:7"
                }
            }
        }))
    });
    let ctx = ExecutionContext::with_default_factory(session, 1.into());

    let err = ctx.evaluate("() => { throw new Error('boom') }", vec![]).await.unwrap_err();
    match err {
        HandleError::EvaluationFailed(message) => {
            assert!(message.contains("boom"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[async_std::test]
async fn get_property_extracts_and_releases_carrier() {
    let (session, calls) = spawn_session(|method, params| match method {
        "Runtime.callFunctionOn" => {
            Ok(json!({"result": {"type": "object", "objectId": "carrier:1"}}))
        }
        "Runtime.getProperties" => {
            assert_eq!(params["objectId"], json!("carrier:1"));
            Ok(json!({"result": [{
                "name": "x",
                "configurable": true,
                "enumerable": true,
                "value": {"type": "number", "value": 5}
            }]}))
        }
        "Runtime.releaseObject" => Ok(json!({})),
        other => Err(remotejs::types::Error {
            code: -32601,
            message: format!("unexpected method {other}"),
        }),
    });
    let ctx = ExecutionContext::with_default_factory(session, 1.into());

    let target = object_handle(&ctx, "obj:1");
    let property = target.get_property("x").await.unwrap();
    assert_eq!(property.json_value().await.unwrap(), json!(5));

    let calls = calls.lock().unwrap();
    // target and name travel as this-reference and value
    assert_eq!(
        calls[0].1["arguments"],
        json!([{"objectId": "obj:1"}, {"value": "x"}])
    );
    let releases: Vec<_> = calls
        .iter()
        .filter(|(method, _)| method == "Runtime.releaseObject")
        .collect();
    assert_eq!(releases.len(), 1);
    assert_eq!(releases[0].1["objectId"], json!("carrier:1"));
}

#[async_std::test]
async fn get_property_miss_still_releases_carrier() {
    let (session, calls) = spawn_session(|method, _| match method {
        "Runtime.callFunctionOn" => {
            Ok(json!({"result": {"type": "object", "objectId": "carrier:2"}}))
        }
        // the requested key is absent from the carrier
        "Runtime.getProperties" => Ok(json!({"result": [{
            "name": "other",
            "configurable": true,
            "enumerable": true,
            "value": {"type": "number", "value": 9}
        }]})),
        "Runtime.releaseObject" => Ok(json!({})),
        other => Err(remotejs::types::Error {
            code: -32601,
            message: format!("unexpected method {other}"),
        }),
    });
    let ctx = ExecutionContext::with_default_factory(session, 1.into());

    let target = object_handle(&ctx, "obj:1");
    let err = target.get_property("missing").await.unwrap_err();
    assert!(matches!(err, HandleError::NotFound));

    let calls = calls.lock().unwrap();
    let releases: Vec<_> = calls
        .iter()
        .filter(|(method, _)| method == "Runtime.releaseObject")
        .collect();
    assert_eq!(releases.len(), 1);
    assert_eq!(releases[0].1["objectId"], json!("carrier:2"));
}

#[async_std::test]
async fn query_objects_requires_live_reference() {
    let (session, calls) = spawn_session(|_, _| Ok(json!({})));
    let ctx = ExecutionContext::with_default_factory(session, 1.into());

    let primitive = number_handle(&ctx, 1);
    let err = ctx.query_objects(&primitive).await.unwrap_err();
    assert!(matches!(err, HandleError::PrototypeNotObject));

    let mut disposed = number_handle(&ctx, 2);
    disposed.dispose().await.unwrap();
    let err = ctx.query_objects(&disposed).await.unwrap_err();
    assert!(matches!(err, HandleError::DisposedHandleUse));

    assert!(calls.lock().unwrap().is_empty());
}

#[async_std::test]
async fn query_objects_wraps_collection() {
    let (session, calls) = spawn_session(|method, params| match method {
        "Runtime.queryObjects" => {
            assert_eq!(params["prototypeObjectId"], json!("proto:1"));
            Ok(json!({"objects": {
                "type": "object",
                "subtype": "array",
                "objectId": "coll:1"
            }}))
        }
        _ => Ok(json!({})),
    });
    let ctx = ExecutionContext::with_default_factory(session, 1.into());

    let prototype = object_handle(&ctx, "proto:1");
    let mut collection = ctx.query_objects(&prototype).await.unwrap();
    assert_eq!(
        collection.remote_object().object_id,
        Some("coll:1".into())
    );
    assert_eq!(collection.to_string(), "JSHandle@array");
    assert_eq!(calls.lock().unwrap().len(), 1);
    drop(prototype);
    collection.dispose().await.ok();
}
