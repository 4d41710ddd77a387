//! The remote-value and handle layer for driving JavaScript execution in a
//! remote runtime (a browser page) over the chrome devtools protocol.
//!
//! [`ExecutionContext`] evaluates expressions inside one isolated JavaScript
//! world and hands results back either as plain JSON values or as
//! [`JsHandle`]s, live references the caller must dispose. The transport is
//! an external collaborator behind the [`Session`] channel seam.

pub use remotejs_types as types;

pub mod cmd;
pub mod context;
pub mod error;
pub mod handle;
pub mod session;
pub mod utils;

pub use crate::context::{
    default_handle_factory, EvaluationArgument, ExecutionContext, HandleFactory,
};
pub use crate::handle::{HandleKind, JsHandle};
pub use crate::session::Session;
