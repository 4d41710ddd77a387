use std::borrow::Cow;

use futures::channel::oneshot::Sender as OneshotSender;

use remotejs_types::{Command, CommandResponse, Request, Response};

use crate::error::{HandleError, Result};

/// Message used to issue a command to the remote runtime and receive its
/// response through a oneshot channel.
#[derive(Debug)]
pub struct CommandMessage {
    pub method: Cow<'static, str>,
    pub params: serde_json::Value,
    pub sender: OneshotSender<Result<Response>>,
}

impl CommandMessage {
    pub fn new<C: Command>(cmd: C, sender: OneshotSender<Result<Response>>) -> Result<Self> {
        Ok(Self {
            method: cmd.identifier(),
            params: serde_json::to_value(cmd)?,
            sender,
        })
    }

    /// The request as handed to the transport
    pub fn request(&self) -> Request {
        Request::new(self.method.clone(), self.params.clone())
    }
}

/// Deserialize the payload of a raw [`Response`] into the response type of
/// the command that issued it
pub fn to_command_response<T: Command>(
    resp: Response,
    method: Cow<'static, str>,
) -> Result<CommandResponse<T::Response>> {
    if let Some(res) = resp.result {
        let result = serde_json::from_value(res)?;
        Ok(CommandResponse {
            id: resp.id,
            result,
            method,
        })
    } else if let Some(err) = resp.error {
        Err(err.into())
    } else {
        Err(HandleError::NoResponse)
    }
}
