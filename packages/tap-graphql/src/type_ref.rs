//! Type references as they appear in an introspection result.
//!
//! Introspection encodes a field or argument type as a chain of `NON_NULL` and
//! `LIST` wrappers around a named type:
//!
//! ```json
//! { "kind": "NON_NULL", "name": null,
//!   "ofType": { "kind": "LIST", "name": null,
//!     "ofType": { "kind": "SCALAR", "name": "ID", "ofType": null } } }
//! ```
//!
//! [`TypeRef`] models that chain as a sum type so that the base named type and
//! the exact wrapping can both be recovered.
use crate::GraphqlError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The `__TypeKind` enum of the introspection schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TypeKind {
    Scalar,
    Object,
    Interface,
    Union,
    Enum,
    InputObject,
    List,
    NonNull,
}

impl TypeKind {
    /// Whether a field of this kind must be followed by a selection set.
    pub fn is_composite(&self) -> bool {
        matches!(self, Self::Object | Self::Interface | Self::Union)
    }

    /// Whether a field of this kind is a leaf of a selection.
    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Scalar | Self::Enum)
    }
}

/// A wrapper around a named type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wrapper {
    List,
    NonNull,
}

/// A reference to a type, possibly wrapped in lists and non-null markers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTypeRef", into = "RawTypeRef")]
pub enum TypeRef {
    Scalar(String),
    Enum(String),
    Object(String),
    Interface(String),
    Union(String),
    InputObject(String),
    List(Box<TypeRef>),
    NonNull(Box<TypeRef>),
}

/// A [`TypeRef`] with its wrappers peeled off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unwrapped<'a> {
    /// Kind of the base named type. Never `LIST` or `NON_NULL`.
    pub kind: TypeKind,

    /// Name of the base named type.
    pub name: &'a str,

    /// Wrappers from outermost to innermost.
    pub wrappers: Vec<Wrapper>,
}

impl Unwrapped<'_> {
    /// Whether any wrapper is a list.
    pub fn is_list(&self) -> bool {
        self.wrappers.contains(&Wrapper::List)
    }
}

impl TypeRef {
    pub fn named(kind: TypeKind, name: impl Into<String>) -> Result<Self, GraphqlError> {
        let name = name.into();
        Ok(match kind {
            TypeKind::Scalar => Self::Scalar(name),
            TypeKind::Enum => Self::Enum(name),
            TypeKind::Object => Self::Object(name),
            TypeKind::Interface => Self::Interface(name),
            TypeKind::Union => Self::Union(name),
            TypeKind::InputObject => Self::InputObject(name),
            TypeKind::List | TypeKind::NonNull => {
                return Err(GraphqlError::MalformedTypeRef(format!(
                    "{kind:?} cannot name a type ({name})"
                )))
            }
        })
    }

    pub fn non_null(inner: TypeRef) -> Self {
        Self::NonNull(Box::new(inner))
    }

    pub fn list(inner: TypeRef) -> Self {
        Self::List(Box::new(inner))
    }

    pub fn kind(&self) -> TypeKind {
        match self {
            Self::Scalar(_) => TypeKind::Scalar,
            Self::Enum(_) => TypeKind::Enum,
            Self::Object(_) => TypeKind::Object,
            Self::Interface(_) => TypeKind::Interface,
            Self::Union(_) => TypeKind::Union,
            Self::InputObject(_) => TypeKind::InputObject,
            Self::List(_) => TypeKind::List,
            Self::NonNull(_) => TypeKind::NonNull,
        }
    }

    /// Peel every wrapper off this reference, recording them from outermost to
    /// innermost, and return the base named type.
    pub fn unwrap(&self) -> Unwrapped<'_> {
        let mut wrappers = Vec::new();
        let mut current = self;
        loop {
            match current {
                Self::List(inner) => {
                    wrappers.push(Wrapper::List);
                    current = inner.as_ref();
                }
                Self::NonNull(inner) => {
                    wrappers.push(Wrapper::NonNull);
                    current = inner.as_ref();
                }
                Self::Scalar(name)
                | Self::Enum(name)
                | Self::Object(name)
                | Self::Interface(name)
                | Self::Union(name)
                | Self::InputObject(name) => {
                    return Unwrapped {
                        kind: current.kind(),
                        name,
                        wrappers,
                    }
                }
            }
        }
    }

    /// Name of the base named type.
    pub fn base_name(&self) -> &str {
        self.unwrap().name
    }

    /// Kind of the base named type.
    pub fn base_kind(&self) -> TypeKind {
        self.unwrap().kind
    }

    /// A `NON_NULL` reference must always be supplied.
    pub fn is_required(&self) -> bool {
        matches!(self, Self::NonNull(_))
    }
}

/// Formats the reference as GraphQL type syntax, e.g. `[ID!]!`.
impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::List(inner) => write!(f, "[{inner}]"),
            Self::NonNull(inner) => write!(f, "{inner}!"),
            _ => f.write_str(self.base_name()),
        }
    }
}

/// Wire shape of a type reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTypeRef {
    kind: TypeKind,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    of_type: Option<Box<RawTypeRef>>,
}

impl TryFrom<RawTypeRef> for TypeRef {
    type Error = GraphqlError;

    fn try_from(raw: RawTypeRef) -> Result<Self, Self::Error> {
        match raw.kind {
            TypeKind::List | TypeKind::NonNull => {
                let inner = raw.of_type.ok_or_else(|| {
                    GraphqlError::MalformedTypeRef(format!(
                        "{:?} wrapper without ofType; the introspection query does not unwrap deeply enough",
                        raw.kind
                    ))
                })?;
                let inner = TypeRef::try_from(*inner)?;
                Ok(match raw.kind {
                    TypeKind::List => Self::list(inner),
                    _ => Self::non_null(inner),
                })
            }
            kind => {
                let name = raw.name.ok_or_else(|| {
                    GraphqlError::MalformedTypeRef(format!("{kind:?} without a name"))
                })?;
                TypeRef::named(kind, name)
            }
        }
    }
}

impl From<TypeRef> for RawTypeRef {
    fn from(ty: TypeRef) -> Self {
        let kind = ty.kind();
        match ty {
            TypeRef::List(inner) | TypeRef::NonNull(inner) => RawTypeRef {
                kind,
                name: None,
                of_type: Some(Box::new(RawTypeRef::from(*inner))),
            },
            TypeRef::Scalar(name)
            | TypeRef::Enum(name)
            | TypeRef::Object(name)
            | TypeRef::Interface(name)
            | TypeRef::Union(name)
            | TypeRef::InputObject(name) => RawTypeRef {
                kind,
                name: Some(name),
                of_type: None,
            },
        }
    }
}
