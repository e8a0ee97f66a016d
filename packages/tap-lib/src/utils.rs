use crate::config::TapConfig;
use chrono::{DateTime, Utc};
use std::{
    env,
    net::{SocketAddr, ToSocketAddrs},
    str::FromStr,
};
use tracing::{debug, info};
use tracing_subscriber::filter::EnvFilter;

const RUST_LOG: &str = "RUST_LOG";
const HUMAN_LOGGING: &str = "HUMAN_LOGGING";

/// Trim the leading '$' or '${' and trailing '}' from an environment variable.
///
/// Returns `None` for an empty name or a `${` without its closing brace.
pub fn trim_opt_env_key(key: &str) -> Option<&str> {
    // Ambiguous key: $FOO, non-ambiguous key: ${FOO}
    let name = match key.strip_prefix("${") {
        Some(rest) => rest.strip_suffix('}')?,
        None => key.strip_prefix('$')?,
    };
    (!name.is_empty()).then_some(name)
}

/// Determine whether a given key is an environment variable.
pub fn is_opt_env_var(k: &str) -> bool {
    k.starts_with('$') || (k.starts_with("${") && k.ends_with('}'))
}

/// Derive the [`std::net::SocketAddr`] from a given host and port, falling back
/// to a DNS lookup using [`std::net::ToSocketAddrs`] if the host is not a valid IP address.
pub fn derive_socket_addr(host: &str, port: &str) -> anyhow::Result<SocketAddr> {
    let host = format!("{host}:{port}");
    match SocketAddr::from_str(&host) {
        Ok(v) => Ok(v),
        Err(e) => {
            debug!("Failed to parse '{host}': {e}. Retrying...");
            let addr = host
                .to_socket_addrs()?
                .next()
                .ok_or_else(|| anyhow::anyhow!("Could not derive SocketAddr from '{host}'"))?;

            info!("Parsed SocketAddr '{addr:?}' from '{host}'");

            Ok(addr)
        }
    }
}

/// Source of wall-clock time.
///
/// Responses that carry a timestamp take a `Clock` rather than reading the system
/// time directly, so that callers (and tests) decide what "now" means.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// [`Clock`] backed by the system time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// [`Clock`] that always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Initialize the logging context for the TAP services.
pub fn init_logging(config: &TapConfig) -> anyhow::Result<()> {
    let filter = match env::var_os(RUST_LOG) {
        Some(_) => EnvFilter::try_from_default_env()?,
        None if config.verbose => EnvFilter::new("debug"),
        None => EnvFilter::new(&config.log_level),
    };

    let human_logging = match env::var(HUMAN_LOGGING) {
        Ok(s) => bool::from_str(&s).map_err(|_| {
            anyhow::anyhow!("Expected `true` or `false` to be provided for `HUMAN_LOGGING`")
        })?,
        Err(_) => true,
    };

    let sub = tracing_subscriber::fmt::Subscriber::builder()
        .with_writer(std::io::stderr)
        .with_env_filter(filter);

    if human_logging {
        sub.with_ansi(true)
            .with_level(true)
            .with_line_number(true)
            .init();
    } else {
        sub.with_ansi(false)
            .with_level(true)
            .with_line_number(true)
            .json()
            .init();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_opt_env_keys_are_trimmed() {
        assert!(is_opt_env_var("$CLIENT_SECRET"));
        assert!(is_opt_env_var("${CLIENT_SECRET}"));
        assert!(!is_opt_env_var("CLIENT_SECRET"));

        assert_eq!(trim_opt_env_key("$CLIENT_SECRET"), Some("CLIENT_SECRET"));
        assert_eq!(trim_opt_env_key("${CLIENT_SECRET}"), Some("CLIENT_SECRET"));
    }

    #[test]
    fn test_malformed_opt_env_keys_are_rejected() {
        assert_eq!(trim_opt_env_key("${"), None);
        assert_eq!(trim_opt_env_key("${FOO"), None);
        assert_eq!(trim_opt_env_key("${}"), None);
        assert_eq!(trim_opt_env_key("$"), None);
        assert_eq!(trim_opt_env_key("FOO"), None);
    }

    #[test]
    fn test_derive_socket_addr_from_ip() {
        let addr = derive_socket_addr("127.0.0.1", "29988").unwrap();
        assert_eq!(addr.to_string(), "127.0.0.1:29988");
    }

    #[test]
    fn test_fixed_clock_is_fixed() {
        let instant = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let clock = FixedClock(instant);
        assert_eq!(clock.now(), clock.now());
        assert_eq!(clock.now().to_rfc3339(), "2024-03-01T12:00:00+00:00");
    }
}
