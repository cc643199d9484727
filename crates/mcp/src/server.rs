// SPDX-License-Identifier: MIT

//! `ServerHandler` exposing [`SpindleTools`] over MCP's stdio transport,
//! grounded on the stdio `ServerHandler` construction in the pack's
//! `kodegen` MCP server (`rmcp::transport::stdio`, `ServiceExt::serve`,
//! hand-matched `call_tool` dispatch rather than the `#[tool_router]`
//! macro, since nothing in the corpus demonstrates that attribute).

use crate::tools::{
    RespinArgs, ShardOpArgs, SpinArgs, SpinWaitArgs, SpoolIdArgs, SpoolPeekArgs, SpindleTools,
};
use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, Implementation, ListToolsResult,
    PaginatedRequestParam, ProtocolVersion, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData as McpError, RoleServer, ServerHandler};
use serde::Serialize;
use serde_json::Map;
use std::sync::Arc;

#[derive(Clone)]
pub struct SpindleServer {
    tools: Arc<SpindleTools>,
}

impl SpindleServer {
    pub fn new(tools: Arc<SpindleTools>) -> Self {
        Self { tools }
    }

    pub async fn serve_stdio(self) -> anyhow::Result<()> {
        let service = rmcp::ServiceExt::serve(self, rmcp::transport::stdio()).await?;
        service.waiting().await?;
        Ok(())
    }
}

fn schema_for<T: schemars::JsonSchema>() -> Arc<Map<String, serde_json::Value>> {
    let schema = schemars::schema_for!(T);
    match serde_json::to_value(schema).unwrap_or_default() {
        serde_json::Value::Object(map) => Arc::new(map),
        _ => Arc::new(Map::new()),
    }
}

fn tool_def(name: &'static str, description: &'static str, schema: Arc<Map<String, serde_json::Value>>) -> Tool {
    Tool {
        name: name.into(),
        title: None,
        description: Some(description.into()),
        input_schema: schema,
        output_schema: None,
        annotations: None,
        icons: None,
    }
}

fn tool_catalog() -> Vec<Tool> {
    vec![
        tool_def("spin", "Delegate a prompt to a child coding-agent harness and return its spool id.", schema_for::<SpinArgs>()),
        tool_def("unspool", "Fetch the full record for one spool.", schema_for::<SpoolIdArgs>()),
        tool_def("spools", "List every persisted spool record.", schema_for::<EmptyArgs>()),
        tool_def("spin_wait", "Wait for a set of spools to reach a terminal state.", schema_for::<SpinWaitArgs>()),
        tool_def("respin", "Continue a harness session with a new prompt.", schema_for::<RespinArgs>()),
        tool_def("spin_drop", "Request termination of a running spool.", schema_for::<SpoolIdArgs>()),
        tool_def("spool_peek", "Tail a spool's stdout artifact.", schema_for::<SpoolPeekArgs>()),
        tool_def("spool_retry", "Re-spawn a spool's prompt as a brand-new spool.", schema_for::<SpoolIdArgs>()),
        tool_def("shard_status", "Report the git worktree status of a spool's shard.", schema_for::<SpoolIdArgs>()),
        tool_def("shard_merge", "Merge a spool's shard branch into the base branch.", schema_for::<ShardOpArgs>()),
        tool_def("shard_abandon", "Tear down a spool's shard worktree.", schema_for::<ShardOpArgs>()),
    ]
}

#[derive(Debug, Clone, serde::Deserialize, schemars::JsonSchema)]
struct EmptyArgs {}

fn args_of<T: serde::de::DeserializeOwned>(request: &CallToolRequestParam) -> Result<T, McpError> {
    let value = match &request.arguments {
        Some(map) => serde_json::Value::Object(map.clone()),
        None => serde_json::Value::Object(Map::new()),
    };
    serde_json::from_value(value)
        .map_err(|e| McpError::invalid_params(format!("invalid arguments: {e}"), None))
}

fn ok_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("serialization error: {e}"), None))?;
    Ok(CallToolResult::success(vec![Content::text(text)]))
}

impl ServerHandler for SpindleServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "Spindle delegation server: spawn, supervise, and harvest results from child coding-agent CLIs.".to_string(),
            ),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult::with_all_items(tool_catalog()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let tools = &self.tools;
        match request.name.as_ref() {
            "spin" => {
                let args: SpinArgs = args_of(&request)?;
                match tools.spin(args).await {
                    Ok(result) => ok_result(&result),
                    Err(e) => Err(McpError::internal_error(e.to_string(), None)),
                }
            }
            "unspool" => {
                let args: SpoolIdArgs = args_of(&request)?;
                match tools.unspool(args) {
                    Ok(result) => ok_result(&result),
                    Err(e) => Err(McpError::internal_error(e.to_string(), None)),
                }
            }
            "spools" => match tools.spools() {
                Ok(result) => ok_result(&result),
                Err(e) => Err(McpError::internal_error(e.to_string(), None)),
            },
            "spin_wait" => {
                let args: SpinWaitArgs = args_of(&request)?;
                match tools.spin_wait(args).await {
                    Ok(result) => ok_result(&result),
                    Err(e) => Err(McpError::internal_error(e.to_string(), None)),
                }
            }
            "respin" => {
                let args: RespinArgs = args_of(&request)?;
                match tools.respin(args).await {
                    Ok(result) => ok_result(&result),
                    Err(e) => Err(McpError::internal_error(e.to_string(), None)),
                }
            }
            "spin_drop" => {
                let args: SpoolIdArgs = args_of(&request)?;
                match tools.spin_drop(args) {
                    Ok(()) => ok_result(&serde_json::json!({"ok": true})),
                    Err(e) => Err(McpError::internal_error(e.to_string(), None)),
                }
            }
            "spool_peek" => {
                let args: SpoolPeekArgs = args_of(&request)?;
                match tools.spool_peek(args) {
                    Ok(result) => ok_result(&result),
                    Err(e) => Err(McpError::internal_error(e.to_string(), None)),
                }
            }
            "spool_retry" => {
                let args: SpoolIdArgs = args_of(&request)?;
                match tools.spool_retry(args).await {
                    Ok(result) => ok_result(&result),
                    Err(e) => Err(McpError::internal_error(e.to_string(), None)),
                }
            }
            "shard_status" => {
                let args: SpoolIdArgs = args_of(&request)?;
                match tools.shard_status(args).await {
                    Ok(result) => ok_result(&result),
                    Err(e) => Err(McpError::internal_error(e.to_string(), None)),
                }
            }
            "shard_merge" => {
                let args: ShardOpArgs = args_of(&request)?;
                match tools.shard_merge(args).await {
                    Ok(result) => ok_result(&result),
                    Err(e) => Err(McpError::internal_error(e.to_string(), None)),
                }
            }
            "shard_abandon" => {
                let args: ShardOpArgs = args_of(&request)?;
                match tools.shard_abandon(args).await {
                    Ok(()) => ok_result(&serde_json::json!({"ok": true})),
                    Err(e) => Err(McpError::internal_error(e.to_string(), None)),
                }
            }
            other => Err(McpError::invalid_params(format!("unknown tool: {other}"), None)),
        }
    }
}
