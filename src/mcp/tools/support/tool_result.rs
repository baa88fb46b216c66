use crate::azure::client::OpsError;
use crate::compact_llm;
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content, ErrorCode},
};
use serde::Serialize;

/// Maps an operation result onto a tool result. Operation errors are tool
/// errors the agent can read and act on, never protocol errors.
pub fn text_result(result: Result<String, OpsError>) -> Result<CallToolResult, McpError> {
    Ok(match result {
        Ok(text) => CallToolResult::success(vec![Content::text(text)]),
        Err(e) => {
            log::info!("Tool returned error: {:?}", e);
            CallToolResult::error(vec![Content::text(e.to_string())])
        }
    })
}

/// Like [`text_result`], rendering the value as compact JSON.
pub fn json_result<T: Serialize>(result: Result<T, OpsError>) -> Result<CallToolResult, McpError> {
    let value = match result {
        Ok(value) => value,
        Err(e) => return text_result(Err(e)),
    };
    let text = compact_llm::to_compact_string(&value).map_err(|e| McpError {
        code: ErrorCode(-32000),
        message: format!("Failed to serialize result: {}", e).into(),
        data: None,
    })?;
    Ok(CallToolResult::success(vec![Content::text(text)]))
}
