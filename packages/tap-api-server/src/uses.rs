use crate::{
    api::{ApiResult, HttpError},
    models::{
        GenerateRequest, GraphqlProxyRequest, IntrospectRequest, TokenRequest,
        TokenResponse,
    },
    upstream::UpstreamClient,
};
use axum::extract::{Extension, Json};
use serde_json::{json, Value};
use std::{sync::Arc, time::Instant};
use tap_graphql::{
    generate_random_query, GeneratedQuery, GeneratorOptions, OperationKind, Schema,
    VariableNaming, INTROSPECTION_QUERY,
};
use tap_lib::{
    config::{EnvironmentConfig, TapConfig},
    defaults,
    utils::Clock,
};
use tap_odata::{
    request_headers, ODataCollection, ODataQuery, PaginationRequest, PaginationResponse,
};
use tracing::info;

pub(crate) async fn health_check(
    Extension(config): Extension<Arc<TapConfig>>,
    Extension(start_time): Extension<Arc<Instant>>,
) -> ApiResult<Json<Value>> {
    let uptime = start_time.elapsed().as_secs().to_string();

    Ok(Json(json!({
        "status": "OK",
        "uptime(seconds)": uptime,
        "environments": config.environment_names(),
    })))
}

pub(crate) async fn acquire_token(
    Extension(config): Extension<Arc<TapConfig>>,
    Extension(client): Extension<UpstreamClient>,
    Json(req): Json<TokenRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let env = config.environment(&req.environment)?;
    let token = client.acquire_token(env).await?;

    Ok(Json(token))
}

pub(crate) async fn proxy_graphql(
    Extension(config): Extension<Arc<TapConfig>>,
    Extension(client): Extension<UpstreamClient>,
    Json(req): Json<GraphqlProxyRequest>,
) -> ApiResult<Json<Value>> {
    if req.query.trim().is_empty() {
        return Err(HttpError::BadRequest("Missing query".to_string()).into());
    }

    let env = config.environment(&req.environment)?;
    let url = graphql_url(env)?;
    let token = client.access_token(env, req.access_token).await?;

    let mut body = json!({ "query": req.query });
    if let Some(variables) = req.variables {
        body["variables"] = variables;
    }
    if let Some(name) = req.operation_name {
        body["operationName"] = Value::String(name);
    }

    let response = client.post_graphql(url, &token, &body).await?;

    Ok(Json(response))
}

pub(crate) async fn introspect(
    Extension(config): Extension<Arc<TapConfig>>,
    Extension(client): Extension<UpstreamClient>,
    Json(req): Json<IntrospectRequest>,
) -> ApiResult<Json<Value>> {
    let env = config.environment(&req.environment)?;
    let result = introspect_schema(&client, env, req.access_token).await?;

    Ok(Json(result))
}

pub(crate) async fn generate_query(
    Extension(config): Extension<Arc<TapConfig>>,
    Extension(client): Extension<UpstreamClient>,
    Json(req): Json<GenerateRequest>,
) -> ApiResult<Json<GeneratedQuery>> {
    check_bound("maxDepth", req.max_depth, defaults::GENERATOR_MAX_DEPTH_LIMIT)?;
    check_bound("maxFields", req.max_fields, defaults::GENERATOR_MAX_FIELDS_LIMIT)?;

    let introspection = match (req.schema, req.environment) {
        (Some(schema), _) => schema,
        (None, Some(name)) => {
            let env = config.environment(&name)?;
            introspect_schema(&client, env, req.access_token).await?
        }
        (None, None) => {
            return Err(HttpError::BadRequest(
                "Provide either an introspection schema or an environment".to_string(),
            )
            .into())
        }
    };

    let schema = Schema::from_introspection_value(introspection)?;

    let defaults = GeneratorOptions::default();
    let options = GeneratorOptions {
        max_depth: req.max_depth.unwrap_or(defaults.max_depth),
        max_fields: req.max_fields.unwrap_or(defaults.max_fields),
        variable_naming: if req.namespace_variables {
            VariableNaming::FieldPath
        } else {
            VariableNaming::ArgumentName
        },
        ..defaults
    };
    let operation = req.operation.unwrap_or(OperationKind::Query);

    let generated = generate_random_query(&schema, operation, options)?;

    info!(
        "Generated {operation} {} with {} variable(s)",
        generated.operation_name,
        generated.variables.len()
    );

    Ok(Json(generated))
}

pub(crate) async fn paginate(
    Extension(config): Extension<Arc<TapConfig>>,
    Extension(client): Extension<UpstreamClient>,
    Extension(clock): Extension<Arc<dyn Clock>>,
    Json(req): Json<PaginationRequest>,
) -> ApiResult<Json<PaginationResponse>> {
    let env = config.environment(&req.environment)?;
    if env.odata_url.is_empty() {
        return Err(HttpError::BadRequest(format!(
            "Environment {:?} has no odata_url configured",
            req.environment
        ))
        .into());
    }

    let query = ODataQuery::build(&req.params)?;
    let url = query.request_url(&env.odata_url);

    let token = client.access_token(env, req.access_token).await?;
    let headers = request_headers(Some(req.params.page_size), &token)?;
    let collection: ODataCollection = client.get_odata(&url, headers).await?;

    info!(
        "Fetched {} row(s) for page {} of {:?}",
        collection.value.len(),
        req.params.current_page,
        req.environment
    );

    Ok(Json(PaginationResponse::new(
        req.environment,
        &req.params,
        url,
        collection,
        clock.as_ref(),
    )))
}

fn check_bound(name: &str, value: Option<usize>, limit: usize) -> ApiResult<()> {
    match value {
        Some(v) if v > limit => Err(HttpError::BadRequest(format!(
            "{name} must be at most {limit}, got {v}"
        ))
        .into()),
        _ => Ok(()),
    }
}

fn graphql_url(env: &EnvironmentConfig) -> ApiResult<&str> {
    if env.graphql_url.is_empty() {
        return Err(
            HttpError::BadRequest("Environment has no graphql_url configured".to_string())
                .into(),
        );
    }
    Ok(&env.graphql_url)
}

async fn introspect_schema(
    client: &UpstreamClient,
    env: &EnvironmentConfig,
    access_token: Option<String>,
) -> ApiResult<Value> {
    let url = graphql_url(env)?;
    let token = client.access_token(env, access_token).await?;
    let body = json!({
        "query": INTROSPECTION_QUERY,
        "operationName": "IntrospectionQuery",
    });

    client.post_graphql(url, &token, &body).await
}
