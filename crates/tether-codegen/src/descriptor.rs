//!
//! Endpoint descriptors.
//!
//! Static metadata produced by the analyzer for each remote endpoint. The
//! model is deserializable so analyzer output can be loaded from JSON or
//! TOML directly.
//!

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

///
/// EndpointDescriptor
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EndpointDescriptor {
    pub service: String,
    pub name: String,

    /// Path of the user handler, e.g. `crate::hello::greet`.
    pub module_path: String,

    #[serde(default)]
    pub path: Vec<PathSegment>,

    pub shape: EndpointShape,

    #[serde(default)]
    pub access: AccessLevel,

    #[serde(default)]
    pub trace_expr_id: u32,
}

impl EndpointDescriptor {
    /// Typed endpoint with no path, request or response.
    pub fn typed(
        service: impl Into<String>,
        name: impl Into<String>,
        module_path: impl Into<String>,
    ) -> Self {
        Self {
            service: service.into(),
            name: name.into(),
            module_path: module_path.into(),
            path: Vec::new(),
            shape: EndpointShape::Typed {
                request: None,
                response: None,
            },
            access: AccessLevel::Public,
            trace_expr_id: 0,
        }
    }

    /// Raw passthrough endpoint with no path.
    pub fn raw(
        service: impl Into<String>,
        name: impl Into<String>,
        module_path: impl Into<String>,
    ) -> Self {
        Self {
            shape: EndpointShape::Raw,
            ..Self::typed(service, name, module_path)
        }
    }

    #[must_use]
    pub fn with_path(mut self, path: Vec<PathSegment>) -> Self {
        self.path = path;
        self
    }

    #[must_use]
    pub fn with_request(mut self, ty: impl Into<TypeRef>) -> Self {
        if let EndpointShape::Typed { request, .. } = &mut self.shape {
            *request = Some(ty.into());
        }
        self
    }

    #[must_use]
    pub fn with_response(mut self, ty: impl Into<TypeRef>) -> Self {
        if let EndpointShape::Typed { response, .. } = &mut self.shape {
            *response = Some(ty.into());
        }
        self
    }

    #[must_use]
    pub const fn with_access(mut self, access: AccessLevel) -> Self {
        self.access = access;
        self
    }

    #[must_use]
    pub const fn with_trace_expr_id(mut self, id: u32) -> Self {
        self.trace_expr_id = id;
        self
    }

    #[must_use]
    pub const fn is_raw(&self) -> bool {
        matches!(self.shape, EndpointShape::Raw)
    }

    #[must_use]
    pub const fn require_auth(&self) -> bool {
        matches!(self.access, AccessLevel::AuthRequired)
    }

    /// Path parameters in path order.
    pub fn params(&self) -> impl Iterator<Item = (&str, Builtin)> {
        self.path.iter().filter_map(|seg| match seg {
            PathSegment::Param { name, value_type } => Some((name.as_str(), *value_type)),
            PathSegment::Literal(_) => None,
        })
    }

    /// `service.name`, used in diagnostics.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}.{}", self.service, self.name)
    }
}

///
/// EndpointShape
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EndpointShape {
    Typed {
        #[serde(default)]
        request: Option<TypeRef>,
        #[serde(default)]
        response: Option<TypeRef>,
    },
    Raw,
}

///
/// AccessLevel
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    #[default]
    Public,
    AuthRequired,
}

///
/// PathSegment
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PathSegment {
    Literal(String),
    Param { name: String, value_type: Builtin },
}

impl PathSegment {
    pub fn literal(value: impl Into<String>) -> Self {
        Self::Literal(value.into())
    }

    pub fn param(name: impl Into<String>, value_type: Builtin) -> Self {
        Self::Param {
            name: name.into(),
            value_type,
        }
    }
}

///
/// TypeRef
/// Rust type path of a request or response struct, as written in source.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TypeRef(pub String);

impl TypeRef {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TypeRef {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for TypeRef {
    fn from(s: String) -> Self {
        Self(s)
    }
}

///
/// Builtin
///
/// Every builtin the analyzer can report. Only the scalar subset is legal
/// as a path parameter type.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Builtin {
    Any,
    Bool,
    Bytes,
    Float32,
    Float64,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Json,
    String,
    Time,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    UserId,
    Uuid,
}

impl Builtin {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::Bool => "bool",
            Self::Bytes => "bytes",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Int => "int",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Json => "json",
            Self::String => "string",
            Self::Time => "time",
            Self::Uint => "uint",
            Self::Uint8 => "uint8",
            Self::Uint16 => "uint16",
            Self::Uint32 => "uint32",
            Self::Uint64 => "uint64",
            Self::UserId => "user_id",
            Self::Uuid => "uuid",
        }
    }

    /// Whether the type may appear as a path parameter.
    #[must_use]
    pub const fn is_path_scalar(self) -> bool {
        matches!(
            self,
            Self::Bool
                | Self::Int
                | Self::Int8
                | Self::Int16
                | Self::Int32
                | Self::Int64
                | Self::String
                | Self::Uint
                | Self::Uint8
                | Self::Uint16
                | Self::Uint32
                | Self::Uint64
                | Self::Uuid
        )
    }
}

impl Display for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
