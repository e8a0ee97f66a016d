use crate::cli::PaginateCommand;
use serde_json::{to_string_pretty, Map, Value};
use tap_lib::config::utils::join_url;
use tap_odata::{PaginationParams, PaginationRequest};
use anyhow::bail;
use tracing::{error, info};

pub async fn init(command: PaginateCommand) -> anyhow::Result<()> {
    let url = join_url(&command.url, "api/odata/paginate");
    let verbose = command.verbose;
    let request = request(command);

    let client = reqwest::Client::new();

    match client.post(&url).json(&request).send().await {
        Ok(res) => {
            let status = res.status();
            let body = res.json::<Map<String, Value>>().await?;

            if !status.is_success() {
                error!("\n❌ {url} returned a non-200 response code: {status:?}");
                println!("{}", to_string_pretty(&body)?);
                bail!("Pagination request returned {status}");
            }

            if verbose {
                info!(
                    "\n✅ Fetched page {} ({} row(s))",
                    request.params.current_page,
                    body.get("data")
                        .and_then(serde_json::Value::as_array)
                        .map(Vec::len)
                        .unwrap_or_default()
                );
            }

            println!("{}", to_string_pretty(&body)?);
        }
        Err(e) => {
            if verbose {
                error!("\n❌ Could not connect to TAP API server:\n'{e}'");
            } else {
                error!("\n❌ Pagination request failed.");
            }
            bail!("Could not reach {url}");
        }
    }

    Ok(())
}

fn request(
    PaginateCommand {
        environment,
        page_size,
        current_page,
        order_by,
        filter,
        select,
        skip_token,
        access_token,
        ..
    }: PaginateCommand,
) -> PaginationRequest {
    PaginationRequest {
        environment,
        access_token,
        params: PaginationParams {
            page_size,
            current_page,
            order_by,
            filter,
            select,
            skip_token,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::net::SocketAddr;

    fn command(url: String) -> PaginateCommand {
        PaginateCommand {
            url,
            environment: "stage".to_string(),
            page_size: 0,
            current_page: 1,
            order_by: "inq_name".to_string(),
            filter: None,
            select: None,
            skip_token: None,
            access_token: None,
            verbose: true,
        }
    }

    #[tokio::test]
    async fn test_rejected_request_is_an_error() {
        let app = Router::new().route(
            "/api/odata/paginate",
            post(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "success": false, "error": "Invalid page size" })),
                )
            }),
        );
        let server = axum::Server::bind(&SocketAddr::from(([127, 0, 0, 1], 0)))
            .serve(app.into_make_service());
        let addr = server.local_addr();
        tokio::spawn(server);

        let result = init(command(format!("http://{addr}"))).await;
        assert!(result.unwrap_err().to_string().contains("400"));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_an_error() {
        let addr = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap();

        assert!(init(command(format!("http://{addr}"))).await.is_err());
    }

    #[test]
    fn test_request_body_matches_server_contract() {
        let request = request(PaginateCommand {
            url: "http://127.0.0.1:29988".to_string(),
            environment: "stage".to_string(),
            page_size: 50,
            current_page: 2,
            order_by: "inq_name".to_string(),
            filter: None,
            select: None,
            skip_token: Some("cursor_Smith".to_string()),
            access_token: None,
            verbose: false,
        });

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "environment": "stage",
                "accessToken": null,
                "pageSize": 50,
                "currentPage": 2,
                "orderBy": "inq_name",
                "filter": null,
                "select": null,
                "skipToken": "cursor_Smith"
            })
        );
    }
}
