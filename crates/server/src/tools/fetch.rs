//! fetch tool implementation.
//!
//! Hands a request to the worker exactly as a page would issue it and
//! reports how it was answered.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rmcp::{ErrorData as McpError, model::*};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use shelter_client::{Dispatch, Transport, Worker, WorkerEvent};
use shelter_core::{Error, RequestDescriptor, Response, Strategy};

/// Input parameters for the fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FetchParams {
    /// Absolute URL of the request.
    pub url: String,

    /// HTTP method (default: GET). Only GET requests are intercepted.
    #[serde(default = "default_method")]
    pub method: String,

    /// Whether this is a top-level page navigation.
    #[serde(default)]
    pub navigate: bool,
}

fn default_method() -> String {
    "GET".into()
}

/// Output structure for the fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FetchOutput {
    /// The canonical request URL.
    pub url: String,
    /// Whether the worker handled the request.
    pub intercepted: bool,
    /// Strategy chosen for an intercepted request.
    pub strategy: Option<Strategy>,
    /// The response; absent when a cold stale-while-revalidate fetch failed.
    pub response: Option<FetchedResponse>,
}

/// A response as handed back to the host.
///
/// Exactly one of `body` and `body_base64` is set: UTF-8 bodies travel as
/// text, anything else as standard base64 of the exact bytes.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FetchedResponse {
    pub status: u16,
    pub headers: Vec<HeaderPair>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_base64: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct HeaderPair {
    pub name: String,
    pub value: String,
}

impl From<Response> for FetchedResponse {
    fn from(response: Response) -> Self {
        let (body, body_base64) = match std::str::from_utf8(&response.body) {
            Ok(text) => (Some(text.to_string()), None),
            Err(_) => (None, Some(STANDARD.encode(&response.body))),
        };
        Self {
            status: response.status,
            headers: response
                .headers
                .into_iter()
                .map(|(name, value)| HeaderPair { name, value })
                .collect(),
            body,
            body_base64,
        }
    }
}

/// Implementation of the fetch tool.
///
/// Requests the worker does not intercept go straight to `transport`.
pub async fn fetch_impl(
    worker: &Worker, transport: &dyn Transport, params: FetchParams,
) -> Result<CallToolResult, McpError> {
    if params.url.trim().is_empty() {
        return Err(Error::InvalidInput("url cannot be empty".into()).into());
    }

    let request = RequestDescriptor::new(&params.method, &params.url, params.navigate)?;
    let url = request.url.to_string();

    let output = match worker.dispatch(WorkerEvent::Fetch(request.clone())) {
        Dispatch::Passthrough => {
            tracing::debug!(url = %url, method = %request.method, "passthrough");
            let response = transport.fetch(&request).await?;
            FetchOutput { url, intercepted: false, strategy: None, response: Some(response.into()) }
        }
        Dispatch::RespondWith { strategy, response } => {
            let response = response.await.map_err(Error::from)?;
            FetchOutput { url, intercepted: true, strategy: Some(strategy), response: response.map(Into::into) }
        }
        Dispatch::WaitUntil(_) => {
            return Err(Error::TaskFailed("fetch event produced no response".into()).into());
        }
    };

    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}
