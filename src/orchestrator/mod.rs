//! Execution dispatch: buffer + selection in, [`Action`] out.

use crate::piston::{ClientError, ExecuteResponse, ExecutionRequest, PistonClient};
use crate::state::{Action, DispatchId, Selection};

/// Anything that can hand over the full text of the code being edited.
pub trait CodeBuffer {
    fn buffer(&self) -> String;
}

impl CodeBuffer for str {
    fn buffer(&self) -> String {
        self.to_string()
    }
}

impl CodeBuffer for String {
    fn buffer(&self) -> String {
        self.clone()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionResult {
    pub stdout: String,
    pub stderr: String,
    pub code: Option<i32>,
    pub signal: Option<String>,
}

/// Map the service response onto the two output channels.
///
/// A response without a `run` stage is accepted only when the service stopped
/// at the compile stage, in which case the compiler's streams are shown. This
/// is an extension: a client that only reads `run` reports such a body as a
/// failure.
pub fn map_response(resp: ExecuteResponse) -> Result<ExecutionResult, ClientError> {
    let stage = resp.run.or(resp.compile).ok_or(ClientError::MissingRun)?;
    Ok(ExecutionResult {
        stdout: stage.stdout.unwrap_or_default(),
        stderr: stage.stderr.unwrap_or_default(),
        code: stage.code,
        signal: stage.signal,
    })
}

/// Text shown in place of program output when the request itself failed.
pub fn failure_message(err: &ClientError) -> String {
    format!("Error: {}", err)
}

#[derive(Debug, Clone)]
pub struct Orchestrator {
    client: PistonClient,
}

impl Orchestrator {
    pub fn new(client: PistonClient) -> Self {
        Self { client }
    }

    /// Package the buffer for the selected runtime. No validation happens here;
    /// the service decides what an empty buffer or unknown runtime means.
    pub fn prepare<B: CodeBuffer + ?Sized>(buffer: &B, selection: &Selection) -> ExecutionRequest {
        ExecutionRequest::single(&selection.language, &selection.version, &buffer.buffer())
    }

    pub async fn execute(&self, request: &ExecutionRequest) -> Result<ExecutionResult, ClientError> {
        let resp = self.client.execute(request).await?;
        map_response(resp)
    }

    /// Run one request to completion and describe the outcome as a state action.
    /// Never fails; transport and protocol errors become `ExecuteFailed`.
    pub async fn dispatch(&self, dispatch: DispatchId, request: ExecutionRequest) -> Action {
        match self.execute(&request).await {
            Ok(result) => {
                tracing::info!(
                    dispatch = dispatch.0,
                    code = ?result.code,
                    stdout_bytes = result.stdout.len(),
                    stderr_bytes = result.stderr.len(),
                    "execution finished"
                );
                Action::ExecuteSucceeded { dispatch, result }
            }
            Err(e) => {
                tracing::error!(dispatch = dispatch.0, error = %e, "execution request failed");
                Action::ExecuteFailed {
                    dispatch,
                    message: failure_message(&e),
                }
            }
        }
    }
}
