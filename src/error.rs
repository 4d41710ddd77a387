use futures::channel::mpsc::SendError;
use futures::channel::oneshot::Canceled;
use thiserror::Error;

pub type Result<T, E = HandleError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum HandleError {
    #[error("{0}")]
    Serde(#[from] serde_json::Error),
    /// The remote runtime rejected the request itself
    #[error("{0}")]
    Chrome(#[from] remotejs_types::Error),
    #[error("{0}")]
    ChannelSendError(#[from] SendError),
    #[error("{0}")]
    Canceled(#[from] Canceled),
    #[error("Received no response from the remote runtime")]
    NoResponse,
    #[error("Not Found")]
    NotFound,
    /// The evaluated expression threw inside the remote runtime
    #[error("Evaluation failed: {0}")]
    EvaluationFailed(String),
    #[error("JSHandles can be evaluated only in the context they were created")]
    CrossContextHandle,
    #[error("JSHandle is disposed")]
    DisposedHandleUse,
    #[error("Prototype JSHandle must not be referencing primitive value")]
    PrototypeNotObject,
    #[error("{0}")]
    Msg(String),
}

impl HandleError {
    /// Create an error with a custom message
    pub fn msg(msg: impl Into<String>) -> Self {
        HandleError::Msg(msg.into())
    }
}
