use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::{json, Value};

use delegation_bridge::auth::{CredentialContext, InboundCredentials};
use delegation_bridge::delegation::DelegationChainRecorder;
use delegation_bridge::logging;
use delegation_bridge::mcp::{BridgeConfig, RemoteToolClient, ToolBindingFactory, ToolCatalog};
use delegation_bridge::tools::ToolRegistry;

#[derive(Parser, Debug)]
#[command(name = "delegation-bridge", about = "Call gateway-protected HR tools on behalf of a user")]
struct Cli {
    /// Tool service endpoint (overrides `MCP_SERVER_URL`).
    #[arg(long, global = true)]
    server_url: Option<String>,

    #[command(flatten)]
    credentials: CredentialArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Caller identity as the gateway would have injected it.
#[derive(Args, Debug)]
struct CredentialArgs {
    /// Space-separated granted scopes.
    #[arg(long, env = "USER_SCOPES", global = true)]
    scopes: Option<String>,
    /// Caller subject.
    #[arg(long, env = "USER_SUB", global = true)]
    sub: Option<String>,
    /// Actor chain so far.
    #[arg(long, env = "ACTOR_CHAIN", global = true)]
    actor_chain: Option<String>,
    /// Full Authorization header value, e.g. "Bearer eyJ...".
    #[arg(long, env = "AUTHORIZATION", global = true)]
    authorization: Option<String>,
    /// Base64 token-exchange envelope.
    #[arg(long, env = "INTROSPECTION_TOKEN", global = true)]
    introspection_token: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the tools bound for this caller.
    Tools,
    /// Invoke one tool and print its result with the delegation chain.
    Call {
        /// Tool name, e.g. get_employee.
        tool: String,
        /// JSON object of arguments.
        #[arg(long, default_value = "{}")]
        args: String,
    },
}

impl From<CredentialArgs> for InboundCredentials {
    fn from(args: CredentialArgs) -> Self {
        InboundCredentials {
            user_scopes: args.scopes,
            user_sub: args.sub,
            actor_chain: args.actor_chain,
            authorization: args.authorization,
            introspection_token: args.introspection_token,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let _guard = logging::init_logging()?;
    let cli = Cli::parse();

    let mut config = BridgeConfig::from_env()?;
    if let Some(url) = cli.server_url {
        config = config.with_mcp_server_url(url);
    }
    config.validate()?;

    let context = CredentialContext::new(cli.credentials.into());
    tracing::info!(
        "[Credentials] Caller '{}' with scopes {:?}",
        context.subject(),
        context.scopes()
    );

    let client = Arc::new(RemoteToolClient::new(&config)?);
    let mut factory =
        ToolBindingFactory::new(client.clone(), Arc::new(ToolCatalog::hr()), context.clone());
    if let Some(allowed) = &config.allowed_tools {
        factory = factory.with_allowed_tools(allowed.iter().cloned());
    }

    let mut registry = ToolRegistry::new();
    registry
        .add_provider(&factory)
        .await
        .context("Tool discovery failed")?;

    let output = match cli.command {
        Commands::Tools => serde_json::to_value(registry.get_definitions())?,
        Commands::Call { tool, args } => {
            let input: Value =
                serde_json::from_str(&args).with_context(|| format!("--args is not valid JSON: {}", args))?;
            let result = registry.execute(&tool, &input).await;
            let captured = client.captured_secondary_token();
            let delegation = DelegationChainRecorder::new().for_turn(&context, captured.as_deref());
            json!({
                "tool": tool,
                "result": result,
                "delegation": delegation,
            })
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
