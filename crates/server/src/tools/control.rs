//! control tool implementation.
//!
//! Delivers a control command to the worker and waits for its reply.

use rmcp::{ErrorData as McpError, model::*};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;
use shelter_client::{ControlCommand, ControlMessage, Dispatch, Worker, WorkerEvent};
use shelter_core::Error;

/// Input parameters for the control tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ControlParams {
    /// One of SKIP_WAITING, CLEAR_CACHE or GET_VERSION.
    pub command: String,
}

/// Output structure for the control tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ControlOutput {
    /// The command as received.
    pub command: String,
    /// Whether the worker recognized the command.
    pub recognized: bool,
    /// The worker's reply; only CLEAR_CACHE and GET_VERSION reply.
    pub reply: Option<serde_json::Value>,
}

/// Implementation of the control tool.
pub async fn control_impl(worker: &Worker, params: ControlParams) -> Result<CallToolResult, McpError> {
    let command = ControlCommand::parse(&json!({ "command": params.command }));
    let recognized = command != ControlCommand::Unknown;

    let (message, rx) = ControlMessage::with_reply(command);
    if let Dispatch::WaitUntil(barrier) = worker.dispatch(WorkerEvent::Message(message)) {
        barrier.settle().await?;
    }

    let reply = match rx.await {
        Ok(reply) => Some(
            serde_json::to_value(reply).map_err(|e| Error::InvalidInput(format!("Failed to serialize reply: {e}")))?,
        ),
        Err(_) => None,
    };

    let output = ControlOutput { command: params.command, recognized, reply };
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}
