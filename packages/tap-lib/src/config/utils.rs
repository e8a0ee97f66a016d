use crate::{
    config::{TapConfigError, TapConfigResult},
    utils::{is_opt_env_var, trim_opt_env_key},
};
use serde::{Deserialize, Deserializer};

/// Replace a `$VAR` / `${VAR}` value with the variable's contents.
pub fn resolve_opt_env_var(value: &mut String) -> TapConfigResult<()> {
    if is_opt_env_var(value) {
        let key = trim_opt_env_key(value)
            .ok_or_else(|| TapConfigError::InvalidEnvVarKey(value.clone()))?;
        *value = std::env::var(key)?;
    }
    Ok(())
}

/// Deserialize a port given either as a YAML string or as a number.
pub fn deserialize_port<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Port {
        Text(String),
        Number(u64),
    }

    Ok(match Port::deserialize(deserializer)? {
        Port::Text(s) => s,
        Port::Number(n) => n.to_string(),
    })
}

/// Attach a protocol to a host and port.
pub fn derive_http_url(host: &str, port: &str) -> String {
    let protocol = match port {
        "443" | "4443" => "https",
        _ => "http",
    };

    format!("{protocol}://{host}:{port}")
}

/// Join a base URL and a path segment with exactly one '/' between them.
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
