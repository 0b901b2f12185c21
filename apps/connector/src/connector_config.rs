use std::env;
use std::time::Duration;

use tessera_core::{AppError, AppResult};
use tessera_infrastructure::{DEFAULT_HTTP_TIMEOUT, DirectoryClientConfig};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
pub struct ConnectorConfig {
    pub directory: DirectoryClientConfig,
}

impl ConnectorConfig {
    pub fn load() -> AppResult<Self> {
        Self::from_source(|name| env::var(name).ok())
    }

    fn from_source(lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let api_key = required_env(&lookup, "TESSERA_API_KEY")?;
        let organization_id = lookup("TESSERA_ORGANIZATION_ID");
        let deployment_endpoint = lookup("TESSERA_DEPLOYMENT_ENDPOINT");
        let deployment_api_key = lookup("TESSERA_DEPLOYMENT_API_KEY");
        let timeout_secs = parse_env_u64(
            &lookup,
            "TESSERA_HTTP_TIMEOUT_SECS",
            DEFAULT_HTTP_TIMEOUT.as_secs(),
        )?;

        let mut directory = DirectoryClientConfig::new(api_key.as_str())?
            .with_organization_id(organization_id.as_deref())
            .with_deployment(
                deployment_endpoint.as_deref(),
                deployment_api_key.as_deref(),
            )?
            .with_timeout(Duration::from_secs(timeout_secs))?;

        if let Some(base_url) = lookup("TESSERA_CLOUD_BASE_URL") {
            directory = directory.with_cloud_base_url(base_url.as_str())?;
        }

        Ok(Self { directory })
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> AppResult<String> {
    lookup(name)
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| AppError::Configuration(format!("api key is missing: {name} is required")))
}

fn parse_env_u64(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: u64,
) -> AppResult<u64> {
    match lookup(name) {
        Some(value) => value.trim().parse::<u64>().map_err(|error| {
            AppError::Configuration(format!("invalid {name} value '{value}': {error}"))
        }),
        None => Ok(default),
    }
}
