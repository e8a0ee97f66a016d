use serde::{Deserialize, Serialize};
use serde_json::Value;
use tap_graphql::OperationKind;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRequest {
    pub environment: String,
}

/// OAuth2 token endpoint response, returned to callers unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphqlProxyRequest {
    pub environment: String,
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub variables: Option<Value>,
    #[serde(default)]
    pub operation_name: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntrospectRequest {
    pub environment: String,
    #[serde(default)]
    pub access_token: Option<String>,
}

/// Either an inline introspection result (`schema`) or an environment to
/// introspect live.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerateRequest {
    pub environment: Option<String>,
    pub access_token: Option<String>,
    pub schema: Option<Value>,
    pub operation: Option<OperationKind>,
    pub max_depth: Option<usize>,
    pub max_fields: Option<usize>,
    pub namespace_variables: bool,
}
