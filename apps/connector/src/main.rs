//! Tessera connector runtime.

#![forbid(unsafe_code)]

mod command;
mod connector_config;

use std::sync::Arc;

use clap::Parser;
use tessera_application::ConnectorService;
use tessera_core::{AppError, AppResult};
use tessera_domain::GraphSnapshot;
use tessera_infrastructure::HttpDirectoryClient;
use tracing::info;

use crate::command::{Cli, Command};
use crate::connector_config::{ConnectorConfig, init_tracing};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let command = Cli::parse().command();
    let config = ConnectorConfig::load()?;
    let sync_deployment = config.directory.sync_deployment();
    let organization_id = config.directory.organization_id.clone();
    let client = Arc::new(HttpDirectoryClient::new(config.directory)?);
    let service = ConnectorService::new(client, sync_deployment);

    info!(
        connector = %service.metadata().display_name,
        sync_deployment,
        organization_id = organization_id.as_deref().unwrap_or("*"),
        "tessera-connector started"
    );

    match command {
        Command::Validate => {
            service.validate().await?;
            info!("credentials validated");
        }
        Command::Sync => {
            service.validate().await?;
            let snapshot = service.sync().await?;
            print_snapshot(&snapshot)?;
        }
        Command::Grant(args) => service.grant(&args.into()).await?,
        Command::Revoke(args) => service.revoke(&args.into()).await?,
    }

    Ok(())
}

fn print_snapshot(snapshot: &GraphSnapshot) -> AppResult<()> {
    let rendered = serde_json::to_string_pretty(snapshot)
        .map_err(|error| AppError::Internal(format!("failed to render graph: {error}")))?;
    println!("{rendered}");

    info!(
        resources = snapshot.resources.len(),
        entitlements = snapshot.entitlements.len(),
        grants = snapshot.grants.len(),
        "sync completed"
    );
    Ok(())
}
