pub mod environment;
pub mod utils;
pub mod web;

pub use crate::{
    config::{environment::EnvironmentConfig, web::WebApiConfig},
    defaults,
};
pub use clap::{Args, Parser};
use serde::Deserialize;
use std::{
    collections::BTreeMap,
    fs::File,
    io::Error,
    path::{Path, PathBuf},
};
use strum::{AsRefStr, EnumString};
use thiserror::Error;

/// Error type returned by configuration operations.
#[derive(Error, Debug)]
pub enum TapConfigError {
    #[error("Error parsing env variables from config: {0:?}")]
    EnvVarParseError(#[from] std::env::VarError),
    #[error("Error processing file: {0:?}")]
    ConfigFileError(#[from] Error),
    #[error("Error processing YAML file: {0:?}")]
    SerdeYamlError(#[from] serde_yaml::Error),
    #[error("Error processing URI: {0:?}")]
    InvalidUriError(#[from] http::uri::InvalidUri),
    #[error("Unknown environment: {0:?}")]
    UnknownEnvironment(String),
    #[error("Malformed environment variable reference: {0:?}")]
    InvalidEnvVarKey(String),
}

/// Result type returned by configuration operations.
pub type TapConfigResult<T> = core::result::Result<T, TapConfigError>;

/// Environment variables read by the API server when the matching flag is absent.
#[derive(Debug, EnumString, AsRefStr)]
pub enum EnvVar {
    #[strum(serialize = "TAP_GRAPHQL_URL")]
    GraphqlUrl,
    #[strum(serialize = "TAP_ODATA_URL")]
    ODataUrl,
    #[strum(serialize = "TAP_TOKEN_URL")]
    TokenUrl,
    #[strum(serialize = "TAP_CLIENT_ID")]
    ClientId,
    #[strum(serialize = "TAP_CLIENT_SECRET")]
    ClientSecret,
    #[strum(serialize = "TAP_SCOPE")]
    Scope,
}

/// Return the value of an environment variable or a default value.
pub fn env_or_default(var: EnvVar, default: String) -> String {
    std::env::var(var.as_ref()).unwrap_or(default)
}

#[derive(Debug, Parser, Clone)]
#[clap(
    name = "TAP API Server",
    about = "Token, GraphQL and OData proxy for the TAP console",
    version
)]
pub struct ApiServerArgs {
    /// Log level passed to the TAP API server.
    #[clap(long, default_value = defaults::LOG_LEVEL, value_parser(["info", "debug", "error", "warn"]), help = "Log level passed to the TAP API server.")]
    pub log_level: String,

    /// API server config file.
    #[clap(short, long, value_name = "FILE", help = "API server config file.")]
    pub config: Option<PathBuf>,

    /// Web API host.
    #[clap(long, help = "Web API host.", default_value = defaults::WEB_API_HOST)]
    pub web_api_host: String,

    /// Web API port.
    #[clap(long, help = "Web API port.", default_value = defaults::WEB_API_PORT)]
    pub web_api_port: String,

    /// Max body size for web API requests.
    #[clap(long, help = "Max body size for web API requests.", default_value_t = defaults::MAX_BODY_SIZE)]
    pub max_body_size: usize,

    /// Name under which the flag-configured environment is registered.
    #[clap(
        long,
        default_value = "dev",
        help = "Name under which the flag-configured environment is registered."
    )]
    pub environment: String,

    /// GraphQL endpoint of the environment.
    #[clap(long, help = "GraphQL endpoint of the environment.")]
    pub graphql_url: Option<String>,

    /// OData (Dataverse) Web API base URL of the environment.
    #[clap(long, help = "OData (Dataverse) Web API base URL of the environment.")]
    pub odata_url: Option<String>,

    /// OAuth2 token endpoint of the environment.
    #[clap(long, help = "OAuth2 token endpoint of the environment.")]
    pub token_url: Option<String>,

    /// OAuth2 client ID.
    #[clap(long, help = "OAuth2 client ID.")]
    pub client_id: Option<String>,

    /// OAuth2 client secret.
    #[clap(long, help = "OAuth2 client secret.")]
    pub client_secret: Option<String>,

    /// OAuth2 scope.
    #[clap(long, help = "OAuth2 scope.")]
    pub scope: Option<String>,

    /// Enable verbose logging.
    #[clap(short, long, help = "Enable verbose logging.")]
    pub verbose: bool,
}

impl Default for ApiServerArgs {
    fn default() -> Self {
        Self {
            log_level: defaults::LOG_LEVEL.to_string(),
            config: None,
            web_api_host: defaults::WEB_API_HOST.to_string(),
            web_api_port: defaults::WEB_API_PORT.to_string(),
            max_body_size: defaults::MAX_BODY_SIZE,
            environment: "dev".to_string(),
            graphql_url: None,
            odata_url: None,
            token_url: None,
            client_id: None,
            client_secret: None,
            scope: None,
            verbose: defaults::VERBOSE_LOGGING,
        }
    }
}

pub trait Env {
    fn inject_opt_env_vars(&mut self) -> TapConfigResult<()>;
}

/// TAP API server configuration.
#[derive(Clone, Deserialize, Debug)]
#[serde(default)]
pub struct TapConfig {
    pub log_level: String,
    pub verbose: bool,
    pub web_api: WebApiConfig,
    pub environments: BTreeMap<String, EnvironmentConfig>,
}

impl Default for TapConfig {
    fn default() -> Self {
        Self {
            log_level: defaults::LOG_LEVEL.to_string(),
            verbose: defaults::VERBOSE_LOGGING,
            web_api: WebApiConfig::default(),
            environments: BTreeMap::new(),
        }
    }
}

impl TryFrom<ApiServerArgs> for TapConfig {
    type Error = TapConfigError;

    fn try_from(args: ApiServerArgs) -> TapConfigResult<Self> {
        let graphql_url = args
            .graphql_url
            .unwrap_or_else(|| env_or_default(EnvVar::GraphqlUrl, String::new()));
        let odata_url = args
            .odata_url
            .unwrap_or_else(|| env_or_default(EnvVar::ODataUrl, String::new()));

        let mut environments = BTreeMap::new();

        // An environment only exists if at least one upstream is reachable.
        if !graphql_url.is_empty() || !odata_url.is_empty() {
            let scope = args
                .scope
                .or_else(|| std::env::var(EnvVar::Scope.as_ref()).ok());

            environments.insert(
                args.environment,
                EnvironmentConfig {
                    graphql_url,
                    odata_url,
                    token_url: args.token_url.unwrap_or_else(|| {
                        env_or_default(EnvVar::TokenUrl, String::new())
                    }),
                    client_id: args.client_id.unwrap_or_else(|| {
                        env_or_default(EnvVar::ClientId, String::new())
                    }),
                    client_secret: args.client_secret.unwrap_or_else(|| {
                        env_or_default(EnvVar::ClientSecret, String::new())
                    }),
                    scope,
                },
            );
        }

        let mut config = TapConfig {
            log_level: args.log_level,
            verbose: args.verbose,
            web_api: WebApiConfig {
                host: args.web_api_host,
                port: args.web_api_port,
                max_body_size: args.max_body_size,
            },
            environments,
        };

        config.inject_opt_env_vars()?;

        Ok(config)
    }
}

impl TapConfig {
    // When building the config via a file, if any section (e.g., web_api) or any
    // individual setting in a section (e.g., web_api.port) is missing, it is
    // replaced with its respective default value.
    pub fn from_file(path: impl AsRef<Path>) -> TapConfigResult<Self> {
        let file = File::open(path)?;

        let mut config: TapConfig = serde_yaml::from_reader(file)?;

        config.inject_opt_env_vars()?;

        Ok(config)
    }

    /// Look up an environment by name.
    pub fn environment(&self, name: &str) -> TapConfigResult<&EnvironmentConfig> {
        self.environments
            .get(name)
            .ok_or_else(|| TapConfigError::UnknownEnvironment(name.to_string()))
    }

    /// Names of all configured environments, in sorted order.
    pub fn environment_names(&self) -> Vec<&str> {
        self.environments.keys().map(String::as_str).collect()
    }

    // Inject env vars into each section of the config
    pub fn inject_opt_env_vars(&mut self) -> TapConfigResult<()> {
        self.web_api.inject_opt_env_vars()?;
        for environment in self.environments.values_mut() {
            environment.inject_opt_env_vars()?;
        }

        Ok(())
    }
}
