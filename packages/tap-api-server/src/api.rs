use crate::{
    upstream::UpstreamClient,
    uses::{
        acquire_token, generate_query, health_check, introspect, paginate, proxy_graphql,
    },
};
use axum::{
    extract::{DefaultBodyLimit, Extension, Json},
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use std::{
    net::SocketAddr,
    sync::Arc,
    time::{Duration, Instant},
};
use tap_graphql::GraphqlError;
use tap_lib::{
    config::{TapConfig, TapConfigError},
    defaults,
    utils::{Clock, SystemClock},
};
use tap_odata::ODataError;
use thiserror::Error;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

pub type ApiResult<T> = core::result::Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("Bad request. {0}")]
    BadRequest(String),
    #[error("Error.")]
    InternalServer,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Http error {0:?}")]
    Http(#[from] HttpError),
    #[error("Configuration error {0:?}")]
    Config(#[from] TapConfigError),
    #[error("Query generation error {0:?}")]
    Graphql(#[from] GraphqlError),
    #[error("Pagination error {0:?}")]
    OData(#[from] ODataError),
    #[error("Serialization error {0:?}")]
    Serde(#[from] serde_json::Error),
    #[error("Upstream request error {0:?}")]
    Reqwest(#[from] reqwest::Error),
    #[error("Token acquisition failed with {status}")]
    TokenAcquisition { status: StatusCode, body: Value },
    #[error("Upstream responded {status} {status_text}")]
    Upstream {
        status: StatusCode,
        status_text: String,
        body: Value,
    },
    #[error("Invalid JSON response")]
    InvalidJson(String),
}

impl Default for ApiError {
    fn default() -> Self {
        ApiError::Http(HttpError::InternalServer)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut upstream_status = None;

        let (status, err_msg, details) = match self {
            ApiError::Http(HttpError::BadRequest(msg)) => {
                (StatusCode::BAD_REQUEST, msg, Value::Null)
            }
            ApiError::Config(e @ TapConfigError::UnknownEnvironment(_)) => {
                (StatusCode::BAD_REQUEST, e.to_string(), Value::Null)
            }
            ApiError::OData(e) => (StatusCode::BAD_REQUEST, e.to_string(), Value::Null),
            ApiError::Graphql(e) => {
                (StatusCode::UNPROCESSABLE_ENTITY, e.to_string(), Value::Null)
            }
            ApiError::TokenAcquisition { status, body } => (
                StatusCode::UNAUTHORIZED,
                format!("Failed to acquire access token: upstream responded {status}"),
                body,
            ),
            ApiError::Upstream {
                status,
                status_text,
                body,
            } => {
                upstream_status = Some((status.as_u16(), status_text.clone()));
                (status, format!("Upstream request failed: {status_text}"), body)
            }
            ApiError::InvalidJson(raw) => (
                StatusCode::BAD_GATEWAY,
                "Invalid JSON response".to_string(),
                Value::String(raw),
            ),
            ApiError::Reqwest(e) => (StatusCode::BAD_GATEWAY, e.to_string(), Value::Null),
            e => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error.".to_string(),
                Value::String(e.to_string()),
            ),
        };

        error!("{:?} - {}", status, err_msg);

        let mut body = json!({
            "success": false,
            "error": err_msg,
            "details": details,
        });
        if let Some((code, text)) = upstream_status {
            body["status"] = json!(code);
            body["statusText"] = json!(text);
        }

        (status, Json(body)).into_response()
    }
}

pub struct TapApi;

impl TapApi {
    /// Build the `/api` router over the given configuration.
    pub fn build(config: TapConfig, clock: Arc<dyn Clock>) -> ApiResult<Router> {
        let max_body_size = config.web_api.max_body_size;
        let client = UpstreamClient::new(Duration::from_secs(
            defaults::UPSTREAM_REQUEST_TIMEOUT_SECS,
        ))?;
        let config = Arc::new(config);
        let start_time = Arc::new(Instant::now());

        let health_route = Router::new()
            .route("/health", get(health_check))
            .layer(Extension(start_time));

        let token_route = Router::new().route("/token", post(acquire_token));

        let graphql_routes = Router::new()
            .route("/graphql", post(proxy_graphql))
            .route("/graphql/introspect", post(introspect))
            .route("/graphql/generate", post(generate_query));

        let odata_routes = Router::new()
            .route("/odata/paginate", post(paginate))
            .layer(Extension(clock));

        let api_routes = Router::new()
            .merge(health_route)
            .merge(token_route)
            .merge(graphql_routes)
            .merge(odata_routes)
            .layer(Extension(client))
            .layer(Extension(config));

        let app = Router::new()
            .nest("/api", api_routes)
            .layer(DefaultBodyLimit::max(max_body_size))
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http());

        Ok(app)
    }

    pub async fn build_and_run(config: TapConfig) -> anyhow::Result<()> {
        let listen_on = SocketAddr::try_from(&config.web_api)?;
        let base_uri = Uri::try_from(&config.web_api)?;
        let app = TapApi::build(config, Arc::new(SystemClock))?;

        info!("TAP API server listening on {listen_on} ({base_uri})");

        axum::Server::bind(&listen_on)
            .serve(app.into_make_service())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to install shutdown handler: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutting down TAP API server");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        extract::RawQuery,
        http::{header, HeaderMap, Request},
    };
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;
    use tap_lib::config::EnvironmentConfig;
    use tower::ServiceExt;

    const MISSIONARY_SCHEMA: &str =
        include_str!("../../tap-graphql/tests/fixtures/missionary_introspection.json");

    async fn fake_token(body: String) -> Json<Value> {
        assert!(body.contains("grant_type=client_credentials"));
        Json(json!({ "access_token": "t0k3n", "token_type": "Bearer", "expires_in": 3600 }))
    }

    async fn fake_token_rejected() -> (StatusCode, Json<Value>) {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "invalid_client" })),
        )
    }

    async fn fake_graphql(headers: HeaderMap, Json(body): Json<Value>) -> Json<Value> {
        assert_eq!(headers[header::AUTHORIZATION], "Bearer t0k3n");
        if body["operationName"] == "IntrospectionQuery" {
            return Json(serde_json::from_str(MISSIONARY_SCHEMA).unwrap());
        }
        Json(json!({ "data": { "echo": body["query"] } }))
    }

    async fn fake_unavailable() -> (StatusCode, &'static str) {
        (StatusCode::SERVICE_UNAVAILABLE, "maintenance window")
    }

    async fn fake_garbage() -> &'static str {
        "<html>not json</html>"
    }

    async fn fake_odata(headers: HeaderMap, RawQuery(query): RawQuery) -> Json<Value> {
        assert_eq!(headers["odata-version"], "4.0");
        let query = query.unwrap_or_default();
        assert!(query.contains("$count=true"), "{query}");
        Json(json!({
            "@odata.count": 3,
            "value": [{ "inq_name": "Adams" }, { "inq_name": "Brown" }]
        }))
    }

    async fn spawn_upstream() -> String {
        let app = Router::new()
            .route("/token", post(fake_token))
            .route("/token-rejected", post(fake_token_rejected))
            .route("/graphql", post(fake_graphql))
            .route("/graphql-unavailable", post(fake_unavailable))
            .route("/graphql-garbage", post(fake_garbage))
            .route("/odata/inq_missionaries", get(fake_odata));

        let server = axum::Server::bind(&SocketAddr::from(([127, 0, 0, 1], 0)))
            .serve(app.into_make_service());
        let addr = server.local_addr();
        tokio::spawn(server);

        format!("http://{addr}")
    }

    fn environment(base: &str, graphql: &str, token: &str) -> EnvironmentConfig {
        EnvironmentConfig {
            graphql_url: format!("{base}{graphql}"),
            odata_url: format!("{base}/odata"),
            token_url: format!("{base}{token}"),
            client_id: "tap".to_string(),
            client_secret: "secret".to_string(),
            scope: None,
        }
    }

    async fn app() -> Router {
        let base = spawn_upstream().await;
        let environments = BTreeMap::from([
            ("dev".to_string(), environment(&base, "/graphql", "/token")),
            (
                "locked".to_string(),
                environment(&base, "/graphql", "/token-rejected"),
            ),
            (
                "down".to_string(),
                environment(&base, "/graphql-unavailable", "/token"),
            ),
            (
                "broken".to_string(),
                environment(&base, "/graphql-garbage", "/token"),
            ),
            ("empty".to_string(), EnvironmentConfig::default()),
        ]);
        let config = TapConfig {
            environments,
            ..Default::default()
        };

        TapApi::build(config, Arc::new(SystemClock)).unwrap()
    }

    async fn call(app: Router, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        (status, value)
    }

    #[tokio::test]
    async fn test_health_lists_environments() {
        let (status, body) = call(app().await, "GET", "/api/health", Value::Null).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["environments"],
            json!(["broken", "dev", "down", "empty", "locked"])
        );
    }

    #[tokio::test]
    async fn test_missing_query_and_unknown_environment_are_bad_requests() {
        let (status, body) = call(
            app().await,
            "POST",
            "/api/graphql",
            json!({ "environment": "dev", "query": "  " }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], json!(false));

        let (status, _) = call(
            app().await,
            "POST",
            "/api/graphql",
            json!({ "environment": "nowhere", "query": "{ version }" }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = call(
            app().await,
            "POST",
            "/api/odata/paginate",
            json!({ "environment": "empty" }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_graphql_is_proxied_with_acquired_token() {
        let (status, body) = call(
            app().await,
            "POST",
            "/api/graphql",
            json!({ "environment": "dev", "query": "{ version }" }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "data": { "echo": "{ version }" } }));
    }

    #[tokio::test]
    async fn test_token_failure_is_unauthorized_with_upstream_body() {
        let (status, body) = call(
            app().await,
            "POST",
            "/api/graphql",
            json!({ "environment": "locked", "query": "{ version }" }),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["details"], json!({ "error": "invalid_client" }));
    }

    #[tokio::test]
    async fn test_upstream_failure_is_surfaced_verbatim() {
        let (status, body) = call(
            app().await,
            "POST",
            "/api/graphql",
            json!({ "environment": "down", "query": "{ version }" }),
        )
        .await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], json!(503));
        assert_eq!(body["statusText"], json!("Service Unavailable"));
        assert_eq!(body["details"], json!("maintenance window"));
    }

    #[tokio::test]
    async fn test_unparseable_upstream_json_is_bad_gateway() {
        let (status, body) = call(
            app().await,
            "POST",
            "/api/graphql",
            json!({ "environment": "broken", "query": "{ version }", "accessToken": "t0k3n" }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], json!("Invalid JSON response"));
        assert_eq!(body["details"], json!("<html>not json</html>"));
    }

    #[tokio::test]
    async fn test_generate_from_live_introspection() {
        let (status, body) = call(
            app().await,
            "POST",
            "/api/graphql/generate",
            json!({ "environment": "dev" }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["operationName"], json!("GetMissionary"));
        assert_eq!(
            body["document"],
            json!("query GetMissionary($id: ID!) {\n  missionary(id: $id) {\n    id\n    name\n  }\n}")
        );
    }

    #[tokio::test]
    async fn test_generate_precondition_failure_is_unprocessable() {
        let schema: Value = serde_json::from_str(MISSIONARY_SCHEMA).unwrap();
        let (status, body) = call(
            app().await,
            "POST",
            "/api/graphql/generate",
            json!({ "schema": schema, "operation": "mutation" }),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["success"], json!(false));

        let (status, _) =
            call(app().await, "POST", "/api/graphql/generate", json!({})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_generate_rejects_bounds_above_limits() {
        let schema: Value = serde_json::from_str(MISSIONARY_SCHEMA).unwrap();

        for (key, value) in [
            ("maxDepth", defaults::GENERATOR_MAX_DEPTH_LIMIT + 1),
            ("maxFields", defaults::GENERATOR_MAX_FIELDS_LIMIT + 1),
            ("maxDepth", 200_000),
        ] {
            let (status, body) = call(
                app().await,
                "POST",
                "/api/graphql/generate",
                json!({ "schema": schema, key: value }),
            )
            .await;

            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["success"], json!(false));
            assert!(body["error"].as_str().unwrap().starts_with(key));
        }

        let (status, _) = call(
            app().await,
            "POST",
            "/api/graphql/generate",
            json!({ "schema": schema, "maxDepth": defaults::GENERATOR_MAX_DEPTH_LIMIT }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_paginate_first_page() {
        let (status, body) = call(
            app().await,
            "POST",
            "/api/odata/paginate",
            json!({ "environment": "dev", "pageSize": 2 }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["totalRecords"], json!(3));
        assert_eq!(body["totalPages"], json!(2));
        assert_eq!(body["hasNextPage"], json!(true));
        assert_eq!(body["hasPreviousPage"], json!(false));
        assert_eq!(body["nextSkipToken"], json!("cursor_Brown"));
        assert!(body["queryUrl"]
            .as_str()
            .unwrap()
            .ends_with("/odata/inq_missionaries?$top=2&$orderby=inq_name&$count=true"));
    }

    #[tokio::test]
    async fn test_invalid_page_size_is_bad_request() {
        let (status, _) = call(
            app().await,
            "POST",
            "/api/odata/paginate",
            json!({ "environment": "dev", "pageSize": 0 }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
