use crate::cli::StatusCommand;
use serde_json::{to_string_pretty, value::Value, Map};
use tap_lib::config::utils::join_url;
use anyhow::bail;
use tracing::{error, info};

pub async fn status(StatusCommand { url, verbose }: StatusCommand) -> anyhow::Result<()> {
    let health_target = join_url(&url, "api/health");

    let client = reqwest::Client::new();

    match client.get(&health_target).send().await {
        Ok(res) => {
            if res.status() != reqwest::StatusCode::OK {
                error!(
                    "\n❌ {health_target} returned a non-200 response code: {:?}",
                    res.status()
                );
                bail!("Status check returned {}", res.status());
            }

            let res_json = res.json::<Map<String, Value>>().await?;

            info!("\n✅ Successfully fetched service health");
            println!("{}", to_string_pretty(&res_json)?);
        }
        Err(e) => {
            if verbose {
                error!("\n❌ Could not connect to TAP API server:\n'{e}'");
            } else {
                error!("\n❌ Status check failed.");
            }
            bail!("Could not reach {health_target}");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::get, Router};
    use std::net::SocketAddr;

    #[tokio::test]
    async fn test_unhealthy_server_is_an_error() {
        let app = Router::new().route(
            "/api/health",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "down") }),
        );
        let server = axum::Server::bind(&SocketAddr::from(([127, 0, 0, 1], 0)))
            .serve(app.into_make_service());
        let addr = server.local_addr();
        tokio::spawn(server);

        let result = status(StatusCommand {
            url: format!("http://{addr}"),
            verbose: false,
        })
        .await;
        assert!(result.unwrap_err().to_string().contains("503"));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_an_error() {
        let addr = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap();

        let result = status(StatusCommand {
            url: format!("http://{addr}"),
            verbose: true,
        })
        .await;
        assert!(result.is_err());
    }
}
