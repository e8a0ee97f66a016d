use crate::{
    api::{ApiError, ApiResult, HttpError},
    models::TokenResponse,
};
use reqwest::{header::HeaderMap, Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tap_lib::config::EnvironmentConfig;
use tracing::{debug, error};

/// HTTP client for the OAuth, GraphQL and OData services of an environment.
///
/// Every call is independent: tokens are not cached, concurrent callers each
/// acquire their own, and failed calls are never retried.
#[derive(Clone, Debug)]
pub struct UpstreamClient {
    http: Client,
}

impl UpstreamClient {
    pub fn new(timeout: Duration) -> ApiResult<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }

    /// Run the OAuth2 client-credentials flow against the environment's token endpoint.
    pub async fn acquire_token(&self, env: &EnvironmentConfig) -> ApiResult<TokenResponse> {
        if env.token_url.is_empty() {
            return Err(HttpError::BadRequest(
                "Environment has no token_url configured".to_string(),
            )
            .into());
        }

        let mut form = vec![
            ("grant_type", "client_credentials"),
            ("client_id", env.client_id.as_str()),
            ("client_secret", env.client_secret.as_str()),
        ];
        if let Some(scope) = env.scope.as_deref() {
            form.push(("scope", scope));
        }

        debug!("Requesting access token from {}", env.token_url);

        let response = self.http.post(&env.token_url).form(&form).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            error!("Token endpoint returned {status}");
            return Err(ApiError::TokenAcquisition {
                status,
                body: parse_body(text),
            });
        }

        serde_json::from_str(&text).map_err(|_| ApiError::InvalidJson(text))
    }

    /// Use the caller's token when given, otherwise acquire a fresh one.
    pub async fn access_token(
        &self,
        env: &EnvironmentConfig,
        supplied: Option<String>,
    ) -> ApiResult<String> {
        match supplied.filter(|t| !t.trim().is_empty()) {
            Some(token) => Ok(token),
            None => Ok(self.acquire_token(env).await?.access_token),
        }
    }

    pub async fn post_graphql(&self, url: &str, token: &str, body: &Value) -> ApiResult<Value> {
        debug!("POST {url}");
        let response = self
            .http
            .post(url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;

        read_json(response).await
    }

    pub async fn get_odata<T: DeserializeOwned>(
        &self,
        url: &str,
        headers: HeaderMap,
    ) -> ApiResult<T> {
        debug!("GET {url}");
        let response = self.http.get(url).headers(headers).send().await?;

        read_json(response).await
    }
}

/// Surface non-2xx responses with their status and body, and unparseable
/// bodies with their raw text.
async fn read_json<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        return Err(ApiError::Upstream {
            status,
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            body: parse_body(text),
        });
    }

    serde_json::from_str(&text).map_err(|_| ApiError::InvalidJson(text))
}

fn parse_body(text: String) -> Value {
    serde_json::from_str(&text).unwrap_or(Value::String(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_parse_body_keeps_raw_text() {
        assert_eq!(parse_body(r#"{"error":"x"}"#.to_string()), json!({"error": "x"}));
        assert_eq!(
            parse_body("Service Unavailable".to_string()),
            Value::String("Service Unavailable".to_string())
        );
    }

    #[tokio::test]
    async fn test_missing_token_url_fails_before_any_request() {
        let client = UpstreamClient::new(Duration::from_secs(1)).unwrap();
        let result = client.acquire_token(&EnvironmentConfig::default()).await;

        assert!(matches!(
            result,
            Err(ApiError::Http(HttpError::BadRequest(_)))
        ));
    }
}
