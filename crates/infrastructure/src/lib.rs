//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod directory_client_config;
mod http_directory_client;

pub use directory_client_config::{
    DEFAULT_CLOUD_BASE_URL, DEFAULT_HTTP_TIMEOUT, DeploymentTarget, DirectoryClientConfig,
};
pub use http_directory_client::HttpDirectoryClient;
