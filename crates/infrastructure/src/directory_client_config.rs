use std::time::Duration;

use tessera_core::{AppError, AppResult, NonEmptyString};
use url::Url;

/// Default cloud API base URL.
pub const DEFAULT_CLOUD_BASE_URL: &str = "https://api.elastic-cloud.com/";

/// Default per-request timeout.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Deployment security API endpoint and its credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentTarget {
    /// Deployment base URL.
    pub endpoint: Url,
    /// Deployment API key.
    pub api_key: NonEmptyString,
}

/// Connection settings for [`crate::HttpDirectoryClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryClientConfig {
    /// Cloud API key.
    pub api_key: NonEmptyString,
    /// Organization pinned for member listings.
    pub organization_id: Option<String>,
    /// Deployment surface; deployment resource types are synced only when set.
    pub deployment: Option<DeploymentTarget>,
    /// Cloud API base URL.
    pub cloud_base_url: Url,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl DirectoryClientConfig {
    /// Creates a cloud-only configuration with default base URL and timeout.
    pub fn new(api_key: &str) -> AppResult<Self> {
        let api_key = NonEmptyString::new(api_key)
            .map_err(|_| AppError::Configuration("api key is missing".to_owned()))?;

        Ok(Self {
            api_key,
            organization_id: None,
            deployment: None,
            cloud_base_url: parse_base_url(DEFAULT_CLOUD_BASE_URL, "cloud base url")?,
            timeout: DEFAULT_HTTP_TIMEOUT,
        })
    }

    /// Pins member listings to one organization. Blank ids are ignored.
    #[must_use]
    pub fn with_organization_id(mut self, organization_id: Option<&str>) -> Self {
        self.organization_id = organization_id
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_owned);
        self
    }

    /// Enables the deployment surface.
    ///
    /// Endpoint and key must be given together; giving neither leaves the
    /// deployment surface disabled.
    pub fn with_deployment(
        mut self,
        endpoint: Option<&str>,
        api_key: Option<&str>,
    ) -> AppResult<Self> {
        let endpoint = endpoint.map(str::trim).filter(|value| !value.is_empty());
        let api_key = api_key.filter(|value| !value.trim().is_empty());

        self.deployment = match (endpoint, api_key) {
            (None, None) => None,
            (Some(endpoint), Some(api_key)) => Some(DeploymentTarget {
                endpoint: parse_base_url(endpoint, "deployment endpoint")?,
                api_key: NonEmptyString::new(api_key)?,
            }),
            (Some(_), None) => {
                return Err(AppError::Configuration(
                    "deployment api key is required when a deployment endpoint is set".to_owned(),
                ));
            }
            (None, Some(_)) => {
                return Err(AppError::Configuration(
                    "deployment endpoint is required when a deployment api key is set".to_owned(),
                ));
            }
        };

        Ok(self)
    }

    /// Overrides the cloud API base URL.
    pub fn with_cloud_base_url(mut self, base_url: &str) -> AppResult<Self> {
        self.cloud_base_url = parse_base_url(base_url, "cloud base url")?;
        Ok(self)
    }

    /// Overrides the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> AppResult<Self> {
        if timeout.is_zero() {
            return Err(AppError::Configuration(
                "http timeout must be greater than zero".to_owned(),
            ));
        }

        self.timeout = timeout;
        Ok(self)
    }

    /// Returns whether deployment resource types should be synced.
    #[must_use]
    pub fn sync_deployment(&self) -> bool {
        self.deployment.is_some()
    }
}

fn parse_base_url(value: &str, name: &str) -> AppResult<Url> {
    let url = Url::parse(value)
        .map_err(|error| AppError::Configuration(format!("invalid {name} '{value}': {error}")))?;
    if url.cannot_be_a_base() {
        return Err(AppError::Configuration(format!(
            "invalid {name} '{value}': not a base url"
        )));
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tessera_core::AppError;

    use super::{DEFAULT_HTTP_TIMEOUT, DirectoryClientConfig};

    #[test]
    fn missing_api_key_is_a_configuration_error() {
        let result = DirectoryClientConfig::new("  ");
        assert!(matches!(result, Err(AppError::Configuration(_))));
    }

    #[test]
    fn cloud_only_config_uses_defaults() {
        let config = DirectoryClientConfig::new("cloud-key");
        assert!(config.is_ok());
        let Ok(config) = config else { return };

        assert_eq!(
            config.cloud_base_url.as_str(),
            "https://api.elastic-cloud.com/"
        );
        assert_eq!(config.timeout, DEFAULT_HTTP_TIMEOUT);
        assert!(!config.sync_deployment());
    }

    #[test]
    fn deployment_endpoint_and_key_must_be_paired() {
        let Ok(config) = DirectoryClientConfig::new("cloud-key") else {
            panic!("cloud key should be accepted");
        };

        let endpoint_only = config
            .clone()
            .with_deployment(Some("https://deployment.example.com:9243"), None);
        assert!(matches!(endpoint_only, Err(AppError::Configuration(_))));

        let key_only = config.clone().with_deployment(None, Some("deployment-key"));
        assert!(matches!(key_only, Err(AppError::Configuration(_))));

        let paired = config.with_deployment(
            Some("https://deployment.example.com:9243"),
            Some("deployment-key"),
        );
        assert!(paired.is_ok_and(|config| config.sync_deployment()));
    }

    #[test]
    fn blank_organization_id_is_ignored() {
        let Ok(config) = DirectoryClientConfig::new("cloud-key") else {
            panic!("cloud key should be accepted");
        };

        assert_eq!(
            config.clone().with_organization_id(Some(" ")).organization_id,
            None
        );
        assert_eq!(
            config.with_organization_id(Some("org-1")).organization_id,
            Some("org-1".to_owned())
        );
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let Ok(config) = DirectoryClientConfig::new("cloud-key") else {
            panic!("cloud key should be accepted");
        };

        let result = config.with_timeout(Duration::ZERO);
        assert!(matches!(result, Err(AppError::Configuration(_))));
    }

    #[test]
    fn malformed_base_url_is_rejected() {
        let Ok(config) = DirectoryClientConfig::new("cloud-key") else {
            panic!("cloud key should be accepted");
        };

        let result = config.with_cloud_base_url("mailto:ops@example.com");
        assert!(matches!(result, Err(AppError::Configuration(_))));
    }
}
