use remotejs_types::runtime::{ExceptionDetails, RemoteObject};

use crate::error::{HandleError, Result};

/// Derives a human readable message from the exception details the runtime
/// reports for a failed evaluation.
///
/// Prefers the thrown exception's own description; otherwise renders the
/// report text followed by the stack frames.
pub fn exception_message(exception_details: &ExceptionDetails) -> String {
    if let Some(exception) = &exception_details.exception {
        if let Some(description) = &exception.description {
            return description.clone();
        }
    }
    let mut message = exception_details.text.clone();
    if let Some(stack) = &exception_details.stack_trace {
        for frame in &stack.call_frames {
            let function_name = if frame.function_name.is_empty() {
                "<anonymous>"
            } else {
                frame.function_name.as_str()
            };
            message.push_str(&format!(
                "\n    at {} ({}:{}:{})",
                function_name, frame.url, frame.line_number, frame.column_number
            ));
        }
    }
    message
}

/// Converts a remote object that carries its own materialized value into a
/// JSON value.
///
/// Numeric sentinels without a JSON representation (`NaN`, `Infinity`,
/// `-Infinity`) map to `null`; `-0` maps to the number `-0.0`. A descriptor
/// with an `objectId` has no local value and is rejected.
pub fn value_from_remote_object(remote_object: &RemoteObject) -> Result<serde_json::Value> {
    if remote_object.object_id.is_some() {
        return Err(HandleError::msg(
            "Cannot extract value when objectId is given",
        ));
    }
    if let Some(unserializable) = &remote_object.unserializable_value {
        return match unserializable.as_ref() {
            "-0" => Ok(serde_json::Number::from_f64(-0.0)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null)),
            "NaN" | "Infinity" | "-Infinity" => Ok(serde_json::Value::Null),
            other => Err(HandleError::msg(format!(
                "Unsupported unserializable value: {other}"
            ))),
        };
    }
    // undefined has neither value nor sentinel
    Ok(remote_object
        .value
        .clone()
        .unwrap_or(serde_json::Value::Null))
}
