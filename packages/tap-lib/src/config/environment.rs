use crate::config::{utils::resolve_opt_env_var, Env, TapConfigResult};
use serde::Deserialize;
use std::fmt::{Debug, Formatter};

/// Upstream endpoints and OAuth2 client credentials for one target environment
/// (e.g. `dev`, `test`, `stage`, `prod`).
#[derive(Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct EnvironmentConfig {
    /// GraphQL endpoint queries are proxied to.
    pub graphql_url: String,

    /// OData (Dataverse) Web API base URL, e.g. `https://org.crm.dynamics.com/api/data/v9.2`.
    pub odata_url: String,

    /// OAuth2 token endpoint used for the client-credentials grant.
    pub token_url: String,

    /// OAuth2 client ID. May reference an environment variable (`$VAR` or `${VAR}`).
    pub client_id: String,

    /// OAuth2 client secret. May reference an environment variable (`$VAR` or `${VAR}`).
    pub client_secret: String,

    /// OAuth2 scope requested with the token.
    pub scope: Option<String>,
}

impl Debug for EnvironmentConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let EnvironmentConfig {
            graphql_url,
            odata_url,
            token_url,
            client_id,
            scope,
            ..
        } = self;
        f.debug_struct("EnvironmentConfig")
            .field("graphql_url", &graphql_url)
            .field("odata_url", &odata_url)
            .field("token_url", &token_url)
            .field("client_id", &client_id)
            .field("client_secret", &"XXXX")
            .field("scope", &scope)
            .finish()
    }
}

impl Env for EnvironmentConfig {
    fn inject_opt_env_vars(&mut self) -> TapConfigResult<()> {
        resolve_opt_env_var(&mut self.client_id)?;
        resolve_opt_env_var(&mut self.client_secret)?;

        if let Some(scope) = self.scope.as_mut() {
            resolve_opt_env_var(scope)?;
        }

        Ok(())
    }
}
