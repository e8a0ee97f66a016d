use crate::{
    config::{
        utils::{derive_http_url, deserialize_port, resolve_opt_env_var},
        Env, TapConfigResult,
    },
    defaults,
    utils::derive_socket_addr,
};
use http::Uri;
use serde::Deserialize;
use std::net::SocketAddr;

#[derive(Clone, Deserialize, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct WebApiConfig {
    /// Web API host.
    pub host: String,

    /// Web API port.
    #[serde(deserialize_with = "deserialize_port")]
    pub port: String,

    /// Max body size for web API requests.
    pub max_body_size: usize,
}

impl std::fmt::Display for WebApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl TryFrom<&WebApiConfig> for Uri {
    type Error = http::uri::InvalidUri;

    fn try_from(c: &WebApiConfig) -> Result<Self, Self::Error> {
        derive_http_url(&c.host, &c.port).parse()
    }
}

impl TryFrom<&WebApiConfig> for SocketAddr {
    type Error = anyhow::Error;

    fn try_from(cfg: &WebApiConfig) -> Result<Self, Self::Error> {
        derive_socket_addr(&cfg.host, &cfg.port)
    }
}

impl Default for WebApiConfig {
    fn default() -> Self {
        Self {
            host: defaults::WEB_API_HOST.into(),
            port: defaults::WEB_API_PORT.into(),
            max_body_size: defaults::MAX_BODY_SIZE,
        }
    }
}

impl Env for WebApiConfig {
    fn inject_opt_env_vars(&mut self) -> TapConfigResult<()> {
        resolve_opt_env_var(&mut self.host)?;
        resolve_opt_env_var(&mut self.port)?;
        Ok(())
    }
}
