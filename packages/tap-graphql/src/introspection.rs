use crate::{
    type_ref::{TypeKind, TypeRef},
    GraphqlError, GraphqlResult,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{collections::HashMap, fmt};
use strum::{AsRefStr, EnumString};

/// Introspection document sent to a GraphQL endpoint before generating queries.
///
/// Type references are unwrapped seven levels deep; anything nested deeper
/// than that cannot be resolved from the result.
pub const INTROSPECTION_QUERY: &str = r#"query IntrospectionQuery {
  __schema {
    queryType { name }
    mutationType { name }
    subscriptionType { name }
    types {
      ...FullType
    }
    directives {
      name
      description
      locations
      args {
        ...InputValue
      }
    }
  }
}

fragment FullType on __Type {
  kind
  name
  description
  fields(includeDeprecated: true) {
    name
    description
    args {
      ...InputValue
    }
    type {
      ...TypeRef
    }
    isDeprecated
    deprecationReason
  }
  inputFields {
    ...InputValue
  }
  interfaces {
    ...TypeRef
  }
  enumValues(includeDeprecated: true) {
    name
    description
    isDeprecated
    deprecationReason
  }
  possibleTypes {
    ...TypeRef
  }
}

fragment InputValue on __InputValue {
  name
  description
  type {
    ...TypeRef
  }
  defaultValue
}

fragment TypeRef on __Type {
  kind
  name
  ofType {
    kind
    name
    ofType {
      kind
      name
      ofType {
        kind
        name
        ofType {
          kind
          name
          ofType {
            kind
            name
            ofType {
              kind
              name
              ofType {
                kind
                name
              }
            }
          }
        }
      }
    }
  }
}"#;

/// The kind of operation a document executes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum OperationKind {
    Query,
    Mutation,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootTypeName {
    pub name: String,
}

/// The `__schema` object of an introspection result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    pub query_type: Option<RootTypeName>,
    #[serde(default)]
    pub mutation_type: Option<RootTypeName>,
    #[serde(default)]
    pub subscription_type: Option<RootTypeName>,
    pub types: Vec<FullType>,
}

/// A named type of the schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FullType {
    pub kind: TypeKind,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub fields: Option<Vec<Field>>,
    #[serde(default)]
    pub input_fields: Option<Vec<InputValue>>,
    #[serde(default)]
    pub interfaces: Option<Vec<TypeRef>>,
    #[serde(default)]
    pub enum_values: Option<Vec<EnumValue>>,
    #[serde(default)]
    pub possible_types: Option<Vec<TypeRef>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub args: Vec<InputValue>,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(default)]
    pub is_deprecated: bool,
    #[serde(default)]
    pub deprecation_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputValue {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(default)]
    pub default_value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumValue {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_deprecated: bool,
    #[serde(default)]
    pub deprecation_reason: Option<String>,
}

impl Field {
    /// Introspection fields (`__typename`, `__schema`, ...) and deprecated fields
    /// are never selected by generated documents.
    pub fn is_eligible(&self) -> bool {
        !self.name.starts_with("__") && !self.is_deprecated
    }
}

impl FullType {
    /// Fields that may be selected on this type.
    pub fn eligible_fields(&self) -> Vec<&Field> {
        self.fields
            .iter()
            .flatten()
            .filter(|f| f.is_eligible())
            .collect()
    }

    /// Enum members that are not deprecated.
    pub fn active_enum_values(&self) -> Vec<&EnumValue> {
        self.enum_values
            .iter()
            .flatten()
            .filter(|v| !v.is_deprecated)
            .collect()
    }
}

impl Schema {
    /// Parse an introspection result. Accepts either a full GraphQL response
    /// (`{"data": {"__schema": ...}}`) or the bare `{"__schema": ...}` object.
    pub fn from_introspection_json(json: &str) -> GraphqlResult<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_introspection_value(value)
    }

    pub fn from_introspection_value(mut value: Value) -> GraphqlResult<Self> {
        if let Some(data) = value.get_mut("data") {
            value = data.take();
        }

        match value.get_mut("__schema") {
            Some(schema) => Ok(serde_json::from_value(schema.take())?),
            None => Err(GraphqlError::MissingSchema),
        }
    }

    /// Lookup from type name to type.
    pub fn type_map(&self) -> HashMap<&str, &FullType> {
        self.types.iter().map(|t| (t.name.as_str(), t)).collect()
    }

    /// Name of the root type for the given operation, if the schema has one.
    pub fn root_type_name(&self, operation: OperationKind) -> Option<&str> {
        let root = match operation {
            OperationKind::Query => self.query_type.as_ref(),
            OperationKind::Mutation => self.mutation_type.as_ref(),
        };
        root.map(|r| r.name.as_str())
    }
}
