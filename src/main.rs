use anyhow::{Context, Result};
use clap::Parser;
use mcp_for_azure_operations::azure::client::OpsClient;
use mcp_for_azure_operations::config::Config;
use mcp_for_azure_operations::mcp::server::AzureOpsServer;
use mcp_for_azure_operations::server::http;
use rmcp::ServiceExt;
use rmcp::transport::stdio;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Run in server mode
    #[arg(long)]
    server: bool,

    /// Port to run the server on
    #[arg(long, default_value_t = 3000)]
    port: u16,

    /// Configuration file (default: per-user config dir)
    #[arg(long, env = "AZURE_OPS_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding the PowerShell scripts
    #[arg(long, env = "AZURE_OPS_SCRIPTS_DIR")]
    scripts_dir: Option<PathBuf>,

    /// Base directory for the Bicep templates
    #[arg(long, env = "AZURE_OPS_TEMPLATES_DIR")]
    templates_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();
    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(dir) = args.scripts_dir {
        config.scripts_dir = dir;
    }
    if let Some(dir) = args.templates_dir {
        config.templates_dir = dir;
    }
    log::debug!("Configuration: {:?}", config);

    let client = OpsClient::from_config(config);
    let mcp_server = AzureOpsServer::new(client);

    if args.server {
        log::info!("Starting web server on port {}", args.port);
        http::run_server(mcp_server, args.port).await?;
    } else {
        log::info!("Starting stdio server");
        let service = mcp_server.serve(stdio()).await?;
        service.waiting().await?;
    }

    Ok(())
}
