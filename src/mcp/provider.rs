//! Tool Binding Factory
//!
//! Turns the service's tool catalogue into bindings for one request

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;

use crate::auth::CredentialContext;
use crate::core::BridgeResult;
use crate::tools::{Tool, ToolProvider};

use super::catalog::ToolCatalog;
use super::client::RemoteToolClient;
use super::tool_adapter::ToolBinding;

/// Builds `ToolBinding`s for one caller.
///
/// The bridge does not filter by scope: the gateway in front of the tool
/// service enforces scopes on every call. An explicit allow-list can be set
/// for local defense in depth.
pub struct ToolBindingFactory {
    client: Arc<RemoteToolClient>,
    catalog: Arc<ToolCatalog>,
    context: CredentialContext,
    allowed_tools: Option<HashSet<String>>,
}

impl ToolBindingFactory {
    pub fn new(client: Arc<RemoteToolClient>, catalog: Arc<ToolCatalog>, context: CredentialContext) -> Self {
        Self {
            client,
            catalog,
            context,
            allowed_tools: None,
        }
    }

    /// Only bind tools whose names are listed
    pub fn with_allowed_tools<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_tools = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// List the service's tools once and bind every recognised one
    pub async fn discover(&self) -> BridgeResult<Vec<ToolBinding>> {
        let headers = self.context.propagation_headers(true);
        let descriptors = self.client.list_tools(&headers).await?;

        let mut bindings = Vec::with_capacity(descriptors.len());
        for descriptor in descriptors {
            let Some(schema) = self.catalog.get(&descriptor.name) else {
                tracing::warn!("[ToolFactory] Unknown MCP tool: {}", descriptor.name);
                continue;
            };

            if let Some(allowed) = &self.allowed_tools {
                if !allowed.contains(&descriptor.name) {
                    tracing::info!(
                        "[ToolFactory] Skipping '{}': not in local allow-list",
                        descriptor.name
                    );
                    continue;
                }
            }

            bindings.push(ToolBinding::new(
                descriptor,
                schema.clone(),
                self.client.clone(),
                headers.clone(),
            ));
        }

        tracing::info!(
            "[ToolFactory] Bound {} tools for '{}': {:?}",
            bindings.len(),
            self.context.subject(),
            bindings.iter().map(|b| b.name()).collect::<Vec<_>>()
        );

        Ok(bindings)
    }
}

#[async_trait]
impl ToolProvider for ToolBindingFactory {
    async fn get_tools(&self) -> BridgeResult<Vec<Arc<dyn Tool>>> {
        let tools = self
            .discover()
            .await?
            .into_iter()
            .map(|binding| Arc::new(binding) as Arc<dyn Tool>)
            .collect();
        Ok(tools)
    }

    fn name(&self) -> &str {
        "MCP"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::InboundCredentials;
    use crate::core::BridgeError;
    use crate::mcp::config::BridgeConfig;
    use crate::mcp::test_support::{LogCapture, StubReply, StubServer};
    use crate::tools::ToolRegistry;
    use serde_json::json;

    fn alice() -> CredentialContext {
        CredentialContext::new(InboundCredentials {
            user_scopes: Some("hr:employee:read hr:salary:read".into()),
            user_sub: Some("alice".into()),
            ..Default::default()
        })
    }

    fn factory(url: &str) -> ToolBindingFactory {
        let client = Arc::new(RemoteToolClient::new(&BridgeConfig::new(url)).unwrap());
        ToolBindingFactory::new(client, Arc::new(ToolCatalog::hr()), alice())
    }

    #[tokio::test]
    async fn test_unknown_descriptors_are_dropped() {
        let server = StubServer::tool_service(json!([
            {"name": "get_employee", "description": "Get employee information by employee ID"},
            {"name": "unknown_tool_x", "description": "Something new"}
        ]));

        let logs = LogCapture::default();
        let _guard = logs.install();

        let bindings = factory(&server.url).discover().await.unwrap();
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].name(), "get_employee");

        let warnings: Vec<String> = logs
            .lines()
            .into_iter()
            .filter(|line| line.contains("WARN"))
            .collect();
        assert_eq!(warnings.len(), 1, "{warnings:?}");
        assert!(warnings[0].contains("[ToolFactory] Unknown MCP tool: unknown_tool_x"));

        let requests = server.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method(), "tools/list");
        assert_eq!(requests[0].header("x-user-scopes"), Some("hr:employee:read hr:salary:read"));
        assert_eq!(requests[0].header("x-user-sub"), Some("alice"));
    }

    #[tokio::test]
    async fn test_no_scope_filtering_without_allow_list() {
        // alice lacks hr:salary:write; the gateway decides, not the bridge
        let server = StubServer::tool_service(json!([
            {"name": "update_salary"}, {"name": "get_org_chart"}
        ]));
        let bindings = factory(&server.url).discover().await.unwrap();
        let names: Vec<&str> = bindings.iter().map(|b| b.name()).collect();
        assert_eq!(names, vec!["update_salary", "get_org_chart"]);
    }

    #[tokio::test]
    async fn test_allow_list_filters_locally() {
        let server = StubServer::tool_service(json!([
            {"name": "get_employee"}, {"name": "get_salary"}, {"name": "list_departments"}
        ]));
        let bindings = factory(&server.url)
            .with_allowed_tools(["get_employee", "list_departments"])
            .discover()
            .await
            .unwrap();
        let names: Vec<&str> = bindings.iter().map(|b| b.name()).collect();
        assert_eq!(names, vec!["get_employee", "list_departments"]);
    }

    #[tokio::test]
    async fn test_discovery_failure_propagates() {
        let server = StubServer::start(|req| {
            StubReply::error(&req.body["id"], -32603, "catalogue unavailable", json!(null))
        });
        let err = factory(&server.url).discover().await.unwrap_err();
        assert!(matches!(err, BridgeError::Protocol { .. }));
    }

    #[tokio::test]
    async fn test_provider_feeds_registry() {
        let server = StubServer::tool_service(json!([
            {"name": "list_employees"}, {"name": "get_salary"}
        ]));
        let mut registry = ToolRegistry::new();
        let added = registry.add_provider(&factory(&server.url)).await.unwrap();
        assert_eq!(added, 2);
        assert_eq!(registry.tool_names(), vec!["get_salary", "list_employees"]);
    }
}
