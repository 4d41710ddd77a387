//! Hand-written subset of the devtools `Runtime` domain: the mirror-object
//! descriptors and the four commands the handle layer speaks.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::{Command, Method};

/// Id of an execution context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct ExecutionContextId(u32);

impl ExecutionContextId {
    pub const IDENTIFIER: &'static str = "Runtime.ExecutionContextId";

    pub fn new(id: u32) -> Self {
        ExecutionContextId(id)
    }

    pub fn inner(&self) -> u32 {
        self.0
    }
}

impl From<u32> for ExecutionContextId {
    fn from(id: u32) -> Self {
        ExecutionContextId(id)
    }
}

/// Unique object identifier for a remote object held alive by the runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct RemoteObjectId(String);

impl RemoteObjectId {
    pub const IDENTIFIER: &'static str = "Runtime.RemoteObjectId";
}

impl AsRef<str> for RemoteObjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for RemoteObjectId {
    fn from(id: String) -> Self {
        RemoteObjectId(id)
    }
}

impl From<&str> for RemoteObjectId {
    fn from(id: &str) -> Self {
        RemoteObjectId(id.to_string())
    }
}

/// Primitive value which cannot be JSON-stringified. Includes values `-0`,
/// `NaN`, `Infinity`, `-Infinity`, and bigint literals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnserializableValue(String);

impl UnserializableValue {
    pub const IDENTIFIER: &'static str = "Runtime.UnserializableValue";
}

impl AsRef<str> for UnserializableValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for UnserializableValue {
    fn from(value: String) -> Self {
        UnserializableValue(value)
    }
}

impl From<&str> for UnserializableValue {
    fn from(value: &str) -> Self {
        UnserializableValue(value.to_string())
    }
}

/// Mirror object referencing an original JavaScript object.
///
/// At most one of `value`, `unserializable_value` and `object_id` is
/// populated; which one decides how the object must be interpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteObject {
    /// Object type.
    pub r#type: RemoteObjectType,
    /// Object subtype hint. Specified for `object` type values only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtype: Option<RemoteObjectSubtype>,
    /// Object class (constructor) name. Specified for `object` type values
    /// only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    /// Remote object value in case of primitive values or JSON values (if it
    /// was requested).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
    /// Primitive value which can not be JSON-stringified does not have
    /// `value`, but gets this property.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unserializable_value: Option<UnserializableValue>,
    /// String representation of the object.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Unique object identifier (for non-primitive values).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_id: Option<RemoteObjectId>,
}

impl RemoteObject {
    pub const IDENTIFIER: &'static str = "Runtime.RemoteObject";

    pub fn new(r#type: RemoteObjectType) -> RemoteObject {
        Self {
            r#type,
            subtype: Default::default(),
            class_name: Default::default(),
            value: Default::default(),
            unserializable_value: Default::default(),
            description: Default::default(),
            object_id: Default::default(),
        }
    }
}

/// Object type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteObjectType {
    Object,
    Function,
    Undefined,
    String,
    Number,
    Boolean,
    Symbol,
    Bigint,
}

impl RemoteObjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RemoteObjectType::Object => "object",
            RemoteObjectType::Function => "function",
            RemoteObjectType::Undefined => "undefined",
            RemoteObjectType::String => "string",
            RemoteObjectType::Number => "number",
            RemoteObjectType::Boolean => "boolean",
            RemoteObjectType::Symbol => "symbol",
            RemoteObjectType::Bigint => "bigint",
        }
    }
}

/// Object subtype hint. Specified for `object` type values only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteObjectSubtype {
    Array,
    Null,
    Node,
    Regexp,
    Date,
    Map,
    Set,
    Weakmap,
    Weakset,
    Iterator,
    Generator,
    Error,
    Proxy,
    Promise,
    Typedarray,
    Arraybuffer,
    Dataview,
}

impl RemoteObjectSubtype {
    pub fn as_str(&self) -> &'static str {
        match self {
            RemoteObjectSubtype::Array => "array",
            RemoteObjectSubtype::Null => "null",
            RemoteObjectSubtype::Node => "node",
            RemoteObjectSubtype::Regexp => "regexp",
            RemoteObjectSubtype::Date => "date",
            RemoteObjectSubtype::Map => "map",
            RemoteObjectSubtype::Set => "set",
            RemoteObjectSubtype::Weakmap => "weakmap",
            RemoteObjectSubtype::Weakset => "weakset",
            RemoteObjectSubtype::Iterator => "iterator",
            RemoteObjectSubtype::Generator => "generator",
            RemoteObjectSubtype::Error => "error",
            RemoteObjectSubtype::Proxy => "proxy",
            RemoteObjectSubtype::Promise => "promise",
            RemoteObjectSubtype::Typedarray => "typedarray",
            RemoteObjectSubtype::Arraybuffer => "arraybuffer",
            RemoteObjectSubtype::Dataview => "dataview",
        }
    }
}

/// Represents a function call argument. Either remote object id `object_id`,
/// primitive `value`, unserializable primitive value or neither of (for
/// undefined) them should be specified.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallArgument {
    /// Primitive value or serializable javascript object.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
    /// Primitive value which can not be JSON-stringified.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unserializable_value: Option<UnserializableValue>,
    /// Remote object handle.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_id: Option<RemoteObjectId>,
}

impl CallArgument {
    pub const IDENTIFIER: &'static str = "Runtime.CallArgument";

    pub fn value(value: serde_json::Value) -> Self {
        Self {
            value: Some(value),
            ..Default::default()
        }
    }

    pub fn unserializable(value: impl Into<UnserializableValue>) -> Self {
        Self {
            unserializable_value: Some(value.into()),
            ..Default::default()
        }
    }

    pub fn object(object_id: RemoteObjectId) -> Self {
        Self {
            object_id: Some(object_id),
            ..Default::default()
        }
    }
}

/// Object property descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDescriptor {
    /// Property name or symbol description.
    pub name: String,
    /// The value associated with the property.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<RemoteObject>,
    /// True if the value associated with the property may be changed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub writable: Option<bool>,
    /// True if the type of this property descriptor may be changed and if the
    /// property may be deleted from the corresponding object.
    pub configurable: bool,
    /// True if this property shows up during enumeration of the properties on
    /// the corresponding object.
    pub enumerable: bool,
    /// True if the property is owned for the object.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_own: Option<bool>,
}

impl PropertyDescriptor {
    pub const IDENTIFIER: &'static str = "Runtime.PropertyDescriptor";
}

/// Stack entry for runtime errors and assertions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallFrame {
    /// JavaScript function name.
    pub function_name: String,
    /// JavaScript script id.
    pub script_id: String,
    /// JavaScript script name or url.
    pub url: String,
    /// JavaScript script line number (0-based).
    pub line_number: u32,
    /// JavaScript script column number (0-based).
    pub column_number: u32,
}

impl CallFrame {
    pub const IDENTIFIER: &'static str = "Runtime.CallFrame";
}

/// Call frames for assertions or error messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackTrace {
    /// String label of this stack trace. For async traces this may be a name
    /// of the function that initiated the async call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JavaScript function name.
    pub call_frames: Vec<CallFrame>,
}

impl StackTrace {
    pub const IDENTIFIER: &'static str = "Runtime.StackTrace";
}

/// Detailed information about exception (or error) that was thrown during
/// script compilation or execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExceptionDetails {
    /// Exception id.
    pub exception_id: u32,
    /// Exception text, which should be used together with exception object
    /// when available.
    pub text: String,
    /// Line number of the exception location (0-based).
    pub line_number: u32,
    /// Column number of the exception location (0-based).
    pub column_number: u32,
    /// URL of the exception location, to be used when the script was not
    /// reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Exception object if available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exception: Option<RemoteObject>,
    /// JavaScript stack trace if available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack_trace: Option<StackTrace>,
}

impl ExceptionDetails {
    pub const IDENTIFIER: &'static str = "Runtime.ExceptionDetails";
}

/// Calls a function with given declaration on the given object or in the
/// given execution context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallFunctionOnParams {
    /// Declaration of the function to call.
    pub function_declaration: String,
    /// Identifier of the object to call function on. Either `object_id` or
    /// `execution_context_id` should be specified.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_id: Option<RemoteObjectId>,
    /// Call arguments. All call arguments must belong to the same JavaScript
    /// world as the target object.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Vec<CallArgument>>,
    /// Whether the result is expected to be a JSON object which should be
    /// sent by value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_by_value: Option<bool>,
    /// Whether execution should `await` for resulting value and return once
    /// awaited promise is resolved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub await_promise: Option<bool>,
    /// Specifies execution context which global object will be used to call
    /// function on. Either `execution_context_id` or `object_id` should be
    /// specified.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_context_id: Option<ExecutionContextId>,
}

impl CallFunctionOnParams {
    pub const IDENTIFIER: &'static str = "Runtime.callFunctionOn";

    pub fn new(function_declaration: impl Into<String>) -> Self {
        Self {
            function_declaration: function_declaration.into(),
            object_id: None,
            arguments: None,
            return_by_value: None,
            await_promise: None,
            execution_context_id: None,
        }
    }

    pub fn with_object(mut self, object_id: RemoteObjectId) -> Self {
        self.object_id = Some(object_id);
        self
    }

    pub fn with_context(mut self, execution_context_id: ExecutionContextId) -> Self {
        self.execution_context_id = Some(execution_context_id);
        self
    }

    pub fn with_arguments(mut self, arguments: Vec<CallArgument>) -> Self {
        self.arguments = Some(arguments);
        self
    }

    pub fn return_by_value(mut self, return_by_value: bool) -> Self {
        self.return_by_value = Some(return_by_value);
        self
    }

    pub fn await_promise(mut self, await_promise: bool) -> Self {
        self.await_promise = Some(await_promise);
        self
    }
}

impl Method for CallFunctionOnParams {
    fn identifier(&self) -> Cow<'static, str> {
        Self::IDENTIFIER.into()
    }
}

impl Command for CallFunctionOnParams {
    type Response = CallFunctionOnReturns;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallFunctionOnReturns {
    /// Call result.
    pub result: RemoteObject,
    /// Exception details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exception_details: Option<ExceptionDetails>,
}

/// Returns properties of a given object. Object group of the result is
/// inherited from the target object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetPropertiesParams {
    /// Identifier of the object to return properties for.
    pub object_id: RemoteObjectId,
    /// If true, returns properties belonging only to the element itself, not
    /// to its prototype chain.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub own_properties: Option<bool>,
}

impl GetPropertiesParams {
    pub const IDENTIFIER: &'static str = "Runtime.getProperties";

    pub fn own(object_id: RemoteObjectId) -> Self {
        Self {
            object_id,
            own_properties: Some(true),
        }
    }
}

impl Method for GetPropertiesParams {
    fn identifier(&self) -> Cow<'static, str> {
        Self::IDENTIFIER.into()
    }
}

impl Command for GetPropertiesParams {
    type Response = GetPropertiesReturns;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetPropertiesReturns {
    /// Object properties.
    pub result: Vec<PropertyDescriptor>,
    /// Exception details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exception_details: Option<ExceptionDetails>,
}

/// Queries objects with given prototype.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryObjectsParams {
    /// Identifier of the prototype to return objects for.
    pub prototype_object_id: RemoteObjectId,
}

impl QueryObjectsParams {
    pub const IDENTIFIER: &'static str = "Runtime.queryObjects";

    pub fn new(prototype_object_id: RemoteObjectId) -> Self {
        Self {
            prototype_object_id,
        }
    }
}

impl Method for QueryObjectsParams {
    fn identifier(&self) -> Cow<'static, str> {
        Self::IDENTIFIER.into()
    }
}

impl Command for QueryObjectsParams {
    type Response = QueryObjectsReturns;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryObjectsReturns {
    /// Array with objects.
    pub objects: RemoteObject,
}

/// Releases remote object with given id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseObjectParams {
    /// Identifier of the object to release.
    pub object_id: RemoteObjectId,
}

impl ReleaseObjectParams {
    pub const IDENTIFIER: &'static str = "Runtime.releaseObject";

    pub fn new(object_id: RemoteObjectId) -> Self {
        Self { object_id }
    }
}

impl Method for ReleaseObjectParams {
    fn identifier(&self) -> Cow<'static, str> {
        Self::IDENTIFIER.into()
    }
}

impl Command for ReleaseObjectParams {
    type Response = ReleaseObjectReturns;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseObjectReturns {}
