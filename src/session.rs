use futures::channel::mpsc::Sender;
use futures::channel::oneshot::channel as oneshot_channel;
use futures::SinkExt;

use remotejs_types::{Command, CommandResponse};

use crate::cmd::{to_command_response, CommandMessage};
use crate::error::Result;

/// The sending half of the RPC session with the remote runtime.
///
/// Commands are submitted as [`CommandMessage`]s over a channel; the
/// receiving end (the transport driving the actual connection) answers each
/// message through the embedded oneshot sender. Request/response correlation
/// and event delivery are the transport's responsibility.
///
/// A `Session` is shared read-only by every execution context and handle
/// derived from it.
#[derive(Debug, Clone)]
pub struct Session {
    commands: Sender<CommandMessage>,
}

impl Session {
    pub fn new(commands: Sender<CommandMessage>) -> Self {
        Self { commands }
    }

    /// Execute a command and return the deserialized `Command::Response`
    pub async fn execute<T: Command>(&self, cmd: T) -> Result<CommandResponse<T::Response>> {
        let (tx, rx) = oneshot_channel();
        let method = cmd.identifier();
        let msg = CommandMessage::new(cmd, tx)?;

        self.commands.clone().send(msg).await?;
        let resp = rx.await??;
        to_command_response::<T>(resp, method)
    }
}
