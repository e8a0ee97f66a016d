#![deny(unused_crate_dependencies)]

pub mod generator;
pub mod introspection;
pub mod type_ref;

pub use generator::{
    generate_random_query, GeneratedQuery, GeneratorOptions, QueryGenerator,
    VariableDefinition, VariableNaming,
};
pub use introspection::{
    EnumValue, Field, FullType, InputValue, OperationKind, Schema, INTROSPECTION_QUERY,
};
pub use type_ref::{TypeKind, TypeRef, Unwrapped, Wrapper};

use thiserror::Error;
pub type GraphqlResult<T> = Result<T, GraphqlError>;

#[derive(Debug, Error)]
pub enum GraphqlError {
    #[error("Could not parse introspection response: {0:?}")]
    IntrospectionQueryError(#[from] serde_json::Error),
    #[error("Introspection response does not contain a __schema object")]
    MissingSchema,
    #[error("Malformed type reference: {0}")]
    MalformedTypeRef(String),
    #[error("Schema does not define a {0} root type")]
    MissingRootType(OperationKind),
    #[error("Unrecognized Type: {0:?}")]
    UnrecognizedType(String),
    #[error("Root type {0:?} has no eligible fields")]
    NoEligibleFields(String),
}
