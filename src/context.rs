use std::fmt;
use std::sync::Arc;

use remotejs_types::runtime::{
    CallArgument, CallFunctionOnParams, ExecutionContextId, QueryObjectsParams, RemoteObject,
    RemoteObjectSubtype,
};

use crate::error::{HandleError, Result};
use crate::handle::{HandleKind, JsHandle};
use crate::session::Session;
use crate::utils::exception_message;

/// Produces the [`JsHandle`] for a remote object obtained on behalf of a
/// context, e.g. as the result of an evaluation or a property lookup.
///
/// Injected per context so callers can substitute specialized handles (or
/// deterministic test doubles) without this layer knowing about them.
pub type HandleFactory = Arc<dyn Fn(Arc<ExecutionContext>, RemoteObject) -> JsHandle + Send + Sync>;

/// The default factory: plain handles, with descriptors for DOM nodes tagged
/// as the element variant.
pub fn default_handle_factory() -> HandleFactory {
    Arc::new(|context, object| {
        let kind = if object.subtype == Some(RemoteObjectSubtype::Node) {
            HandleKind::Element
        } else {
            HandleKind::Object
        };
        JsHandle::new(context, object, kind)
    })
}

/// Represents a context for JavaScript execution in the remote runtime. A
/// page might have many execution contexts
/// - each [iframe](https://developer.mozilla.org/en-US/docs/Web/HTML/Element/iframe)
///   has a "default" execution context that is always created after the frame
///   is attached to DOM.
///
/// Besides pages, execution contexts can be found in
/// [Web Workers](https://developer.mozilla.org/en-US/docs/Web/API/Web_Workers_API).
///
/// Creation and teardown of contexts is driven by navigation and frame
/// events and happens outside this type; a context never outlives the
/// session it was built from.
pub struct ExecutionContext {
    /// Shared session with the remote runtime, not owned by this context
    session: Arc<Session>,
    /// Identifier the runtime assigned to this evaluation scope
    context_id: ExecutionContextId,
    factory: HandleFactory,
}

impl ExecutionContext {
    pub fn new(
        session: Arc<Session>,
        context_id: ExecutionContextId,
        factory: HandleFactory,
    ) -> Arc<Self> {
        Arc::new(Self {
            session,
            context_id,
            factory,
        })
    }

    pub fn with_default_factory(
        session: Arc<Session>,
        context_id: ExecutionContextId,
    ) -> Arc<Self> {
        Self::new(session, context_id, default_handle_factory())
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn context_id(&self) -> ExecutionContextId {
        self.context_id
    }

    /// Wrap a result descriptor through this context's handle factory
    pub(crate) fn wrap(self: &Arc<Self>, object: RemoteObject) -> JsHandle {
        (self.factory)(Arc::clone(self), object)
    }

    /// Evaluate a function in this context and materialize the result as a
    /// JSON value.
    ///
    /// The intermediate handle is disposed in every case, also when the
    /// materialization fails, so the remote reference never leaks.
    pub async fn evaluate(
        self: &Arc<Self>,
        function: impl Into<String>,
        args: Vec<EvaluationArgument<'_>>,
    ) -> Result<serde_json::Value> {
        let mut handle = self.evaluate_handle(function, args).await?;
        let value = handle.json_value().await;
        let disposed = handle.dispose().await;
        let value = value?;
        disposed?;
        Ok(value)
    }

    /// Evaluate a function in this context and return a handle to the
    /// result, which the caller must eventually dispose.
    ///
    /// Zero-argument evaluations take the same `Runtime.callFunctionOn` path
    /// as calls with arguments.
    pub async fn evaluate_handle(
        self: &Arc<Self>,
        function: impl Into<String>,
        args: Vec<EvaluationArgument<'_>>,
    ) -> Result<JsHandle> {
        let arguments = args
            .iter()
            .map(|arg| self.convert_argument(arg))
            .collect::<Result<Vec<_>>>()?;
        let params = CallFunctionOnParams::new(function)
            .with_context(self.context_id)
            .with_arguments(arguments)
            .return_by_value(false)
            .await_promise(true);
        let resp = self.session.execute(params).await?.result;
        if let Some(details) = resp.exception_details {
            return Err(HandleError::EvaluationFailed(exception_message(&details)));
        }
        Ok(self.wrap(resp.result))
    }

    /// Encode one evaluation argument into its wire representation, first
    /// match wins.
    fn convert_argument(self: &Arc<Self>, arg: &EvaluationArgument<'_>) -> Result<CallArgument> {
        match arg {
            EvaluationArgument::Number(num) => {
                if *num == f64::INFINITY {
                    Ok(CallArgument::unserializable("Infinity"))
                } else if *num == f64::NEG_INFINITY {
                    Ok(CallArgument::unserializable("-Infinity"))
                } else {
                    Ok(CallArgument::value(
                        serde_json::Number::from_f64(*num)
                            .map(serde_json::Value::Number)
                            .unwrap_or(serde_json::Value::Null),
                    ))
                }
            }
            EvaluationArgument::Handle(handle) => {
                if !Arc::ptr_eq(handle.context(), self) {
                    return Err(HandleError::CrossContextHandle);
                }
                if handle.is_disposed() {
                    return Err(HandleError::DisposedHandleUse);
                }
                let object = handle.remote_object();
                if let Some(unserializable) = &object.unserializable_value {
                    // forward the sentinel unchanged
                    Ok(CallArgument::unserializable(unserializable.as_ref()))
                } else if let Some(object_id) = &object.object_id {
                    // a reference, not a copy
                    Ok(CallArgument::object(object_id.clone()))
                } else {
                    Ok(CallArgument::value(
                        object.value.clone().unwrap_or(serde_json::Value::Null),
                    ))
                }
            }
            EvaluationArgument::Value(value) => Ok(CallArgument::value(value.clone())),
        }
    }

    /// Returns a handle to an array-like collection of all live objects
    /// whose prototype is the given object.
    pub async fn query_objects(self: &Arc<Self>, prototype: &JsHandle) -> Result<JsHandle> {
        if prototype.is_disposed() {
            return Err(HandleError::DisposedHandleUse);
        }
        let object_id = prototype
            .remote_object()
            .object_id
            .clone()
            .ok_or(HandleError::PrototypeNotObject)?;
        let resp = self.session.execute(QueryObjectsParams::new(object_id)).await?;
        Ok(self.wrap(resp.result.objects))
    }
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("context_id", &self.context_id)
            .finish_non_exhaustive()
    }
}

/// An argument to [`ExecutionContext::evaluate`].
///
/// JSON values cannot carry `Infinity` or `-Infinity`, so raw numbers keep
/// their own variant until they are encoded for the wire.
#[derive(Debug)]
pub enum EvaluationArgument<'a> {
    /// A JSON-representable value, passed by value
    Value(serde_json::Value),
    /// A number, which may be one of the non-JSON sentinels
    Number(f64),
    /// A previously obtained handle, passed by reference
    Handle(&'a JsHandle),
}

impl From<serde_json::Value> for EvaluationArgument<'_> {
    fn from(value: serde_json::Value) -> Self {
        EvaluationArgument::Value(value)
    }
}

impl From<f64> for EvaluationArgument<'_> {
    fn from(num: f64) -> Self {
        EvaluationArgument::Number(num)
    }
}

impl From<i32> for EvaluationArgument<'_> {
    fn from(num: i32) -> Self {
        EvaluationArgument::Value(num.into())
    }
}

impl From<i64> for EvaluationArgument<'_> {
    fn from(num: i64) -> Self {
        EvaluationArgument::Value(num.into())
    }
}

impl From<u32> for EvaluationArgument<'_> {
    fn from(num: u32) -> Self {
        EvaluationArgument::Value(num.into())
    }
}

impl From<bool> for EvaluationArgument<'_> {
    fn from(value: bool) -> Self {
        EvaluationArgument::Value(value.into())
    }
}

impl From<&str> for EvaluationArgument<'_> {
    fn from(value: &str) -> Self {
        EvaluationArgument::Value(value.into())
    }
}

impl From<String> for EvaluationArgument<'_> {
    fn from(value: String) -> Self {
        EvaluationArgument::Value(value.into())
    }
}

impl<'a> From<&'a JsHandle> for EvaluationArgument<'a> {
    fn from(handle: &'a JsHandle) -> Self {
        EvaluationArgument::Handle(handle)
    }
}
