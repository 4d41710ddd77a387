use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use remotejs_types::runtime::{
    CallFunctionOnParams, GetPropertiesParams, ReleaseObjectParams, RemoteObject,
};

use crate::context::{EvaluationArgument, ExecutionContext};
use crate::error::{HandleError, Result};
use crate::utils::{exception_message, value_from_remote_object};

/// Distinguishes plain object handles from handles referencing a DOM node.
///
/// A closed set: the element variant only changes what [`JsHandle::as_element`]
/// yields, the element-specific API lives outside this layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleKind {
    Object,
    Element,
}

/// An opaque, disposable proxy for a single remote object (or primitive)
/// living inside exactly one [`ExecutionContext`].
///
/// Every handle keeps a remote reference alive until [`JsHandle::dispose`]
/// is called, so the owner of a handle must eventually dispose it to let the
/// runtime garbage-collect the object.
#[derive(Debug)]
pub struct JsHandle {
    /// The context this handle was created in, used for validation and for
    /// wrapping derived handles
    context: Arc<ExecutionContext>,
    /// Mirror object referencing the original JavaScript object
    remote_object: RemoteObject,
    kind: HandleKind,
    disposed: bool,
}

impl JsHandle {
    pub fn new(
        context: Arc<ExecutionContext>,
        remote_object: RemoteObject,
        kind: HandleKind,
    ) -> Self {
        Self {
            context,
            remote_object,
            kind,
            disposed: false,
        }
    }

    /// The execution context this handle belongs to
    pub fn context(&self) -> &Arc<ExecutionContext> {
        &self.context
    }

    /// The descriptor this handle proxies
    pub fn remote_object(&self) -> &RemoteObject {
        &self.remote_object
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Fetch a single property of the referenced object as a new handle.
    ///
    /// There is no protocol primitive for "get exactly one named property as
    /// a reference", so the property is rehomed into a fresh null-prototype
    /// carrier object whose only key is the requested name; the carrier is
    /// released before returning.
    pub async fn get_property(&self, name: impl Into<String>) -> Result<JsHandle> {
        let name = name.into();
        let mut carrier = self
            .context
            .evaluate_handle(
                "(object, propertyName) => {
                    const result = {__proto__: null};
                    result[propertyName] = object[propertyName];
                    return result;
                }",
                vec![
                    EvaluationArgument::from(self),
                    EvaluationArgument::from(name.clone()),
                ],
            )
            .await?;
        let properties = carrier.get_properties().await;
        let disposed = carrier.dispose().await;
        let mut properties = properties?;
        disposed?;
        properties.remove(&name).ok_or(HandleError::NotFound)
    }

    /// Fetch all own, enumerable properties of the referenced object, each
    /// wrapped into a handle of its own.
    ///
    /// A handle without a backing object id has no properties, by contract.
    pub async fn get_properties(&self) -> Result<HashMap<String, JsHandle>> {
        if self.disposed {
            return Err(HandleError::DisposedHandleUse);
        }
        let object_id = match &self.remote_object.object_id {
            Some(object_id) => object_id.clone(),
            None => return Ok(HashMap::new()),
        };
        let resp = self
            .context
            .session()
            .execute(GetPropertiesParams::own(object_id))
            .await?;
        let mut properties = HashMap::new();
        for prop in resp.result.result {
            if !prop.enumerable {
                continue;
            }
            if let Some(value) = prop.value {
                properties.insert(prop.name, self.context.wrap(value));
            }
        }
        Ok(properties)
    }

    /// Materialize the referenced value as JSON.
    ///
    /// For primitives the descriptor already carries the value and no
    /// request is issued. For live objects the runtime serializes the full
    /// object graph by value, which fails for graphs the runtime itself
    /// rejects, e.g. ones with cycles.
    pub async fn json_value(&self) -> Result<serde_json::Value> {
        if self.disposed {
            return Err(HandleError::DisposedHandleUse);
        }
        if let Some(object_id) = &self.remote_object.object_id {
            let params = CallFunctionOnParams::new("function() { return this; }")
                .with_object(object_id.clone())
                .return_by_value(true)
                .await_promise(true);
            let resp = self.context.session().execute(params).await?.result;
            if let Some(details) = resp.exception_details {
                return Err(HandleError::EvaluationFailed(exception_message(&details)));
            }
            return value_from_remote_object(&resp.result);
        }
        value_from_remote_object(&self.remote_object)
    }

    /// Downcast to the element variant. Yields `None` for plain handles.
    ///
    /// Safe to call on a disposed handle.
    pub fn as_element(&self) -> Option<&JsHandle> {
        match self.kind {
            HandleKind::Element => Some(self),
            HandleKind::Object => None,
        }
    }

    /// Release the remote reference behind this handle.
    ///
    /// Idempotent: at most one release request is ever issued, and the
    /// handle counts as disposed even when that request fails. Rejections
    /// from the runtime are swallowed, they indicate the object is already
    /// gone because the page navigated or closed.
    pub async fn dispose(&mut self) -> Result<()> {
        if self.disposed {
            return Ok(());
        }
        self.disposed = true;
        let object_id = match self.remote_object.object_id.clone() {
            Some(object_id) => object_id,
            None => return Ok(()),
        };
        match self
            .context
            .session()
            .execute(ReleaseObjectParams::new(object_id))
            .await
        {
            Ok(_) => Ok(()),
            Err(HandleError::Chrome(err)) => {
                tracing::debug!("Failed to release remote object: {err}");
                Ok(())
            }
            Err(err) => Err(err),
        }
    }
}

impl fmt::Display for JsHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.remote_object.object_id.is_some() {
            let tag = self
                .remote_object
                .subtype
                .map(|subtype| subtype.as_str())
                .unwrap_or_else(|| self.remote_object.r#type.as_str());
            write!(f, "JSHandle@{tag}")
        } else {
            match value_from_remote_object(&self.remote_object) {
                Ok(value) => write!(f, "JSHandle:{value}"),
                Err(_) => {
                    let sentinel = self
                        .remote_object
                        .unserializable_value
                        .as_ref()
                        .map(|value| value.as_ref())
                        .unwrap_or("undefined");
                    write!(f, "JSHandle:{sentinel}")
                }
            }
        }
    }
}

impl Drop for JsHandle {
    fn drop(&mut self) {
        if !self.disposed && self.remote_object.object_id.is_some() {
            tracing::debug!(
                context_id = ?self.context.context_id(),
                "JSHandle dropped without dispose, the remote object stays referenced until the context is destroyed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use futures::channel::mpsc::channel;

    use remotejs_types::runtime::{RemoteObjectSubtype, RemoteObjectType};

    use crate::session::Session;

    use super::*;

    fn test_context() -> Arc<ExecutionContext> {
        let (commands, _rx) = channel(1);
        ExecutionContext::with_default_factory(Arc::new(Session::new(commands)), 1.into())
    }

    #[test]
    fn display_live_reference() {
        let mut object = RemoteObject::new(RemoteObjectType::Object);
        object.subtype = Some(RemoteObjectSubtype::Array);
        object.object_id = Some("obj:1".into());
        let handle = JsHandle::new(test_context(), object, HandleKind::Object);
        assert_eq!(handle.to_string(), "JSHandle@array");

        let mut object = RemoteObject::new(RemoteObjectType::Function);
        object.object_id = Some("obj:2".into());
        let handle = JsHandle::new(test_context(), object, HandleKind::Object);
        assert_eq!(handle.to_string(), "JSHandle@function");
    }

    #[test]
    fn display_primitive() {
        let mut object = RemoteObject::new(RemoteObjectType::Number);
        object.value = Some(serde_json::json!(3));
        let handle = JsHandle::new(test_context(), object, HandleKind::Object);
        assert_eq!(handle.to_string(), "JSHandle:3");

        let undefined = RemoteObject::new(RemoteObjectType::Undefined);
        let handle = JsHandle::new(test_context(), undefined, HandleKind::Object);
        assert_eq!(handle.to_string(), "JSHandle:null");
    }

    #[test]
    fn element_downcast() {
        let mut object = RemoteObject::new(RemoteObjectType::Object);
        object.subtype = Some(RemoteObjectSubtype::Node);
        object.object_id = Some("node:1".into());
        let context = test_context();
        let handle = context.wrap(object);
        assert!(handle.as_element().is_some());

        let plain = context.wrap(RemoteObject::new(RemoteObjectType::Object));
        assert!(plain.as_element().is_none());
    }
}
