use crate::{
    config::is_ident_fragment,
    descriptor::{Builtin, EndpointDescriptor, EndpointShape, PathSegment, TypeRef},
    error::SynthError,
    template::PathTemplate,
};
use std::collections::HashSet;
use syn::{Path, Type};

///
/// ValidatedEndpoint
///
/// Descriptor checked for structural invariants, with its handler path and
/// type references parsed. Expansion consumes only this form.
///

#[derive(Debug)]
pub struct ValidatedEndpoint {
    pub service: String,
    pub name: String,
    pub handler: Path,
    pub trace_expr_id: u32,
    pub require_auth: bool,
    pub template: PathTemplate,
    pub shape: ValidatedShape,
}

///
/// ValidatedShape
///

#[derive(Debug)]
pub enum ValidatedShape {
    Typed {
        params: Vec<ParamSpec>,
        request: Option<Type>,
        response: Option<Type>,
    },
    Raw,
}

///
/// ParamSpec
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParamSpec {
    pub name: String,
    pub builtin: Builtin,
}

pub fn validate(desc: &EndpointDescriptor) -> Result<ValidatedEndpoint, SynthError> {
    let label = desc.label();

    if !is_ident_fragment(&desc.service) {
        return Err(SynthError::invalid(&label, "service", &desc.service, "not an identifier"));
    }
    if !is_ident_fragment(&desc.name) {
        return Err(SynthError::invalid(&label, "name", &desc.name, "not an identifier"));
    }

    let handler: Path = syn::parse_str(&desc.module_path).map_err(|e| {
        SynthError::invalid(&label, "module_path", &desc.module_path, e.to_string())
    })?;

    let params = validate_path(&label, &desc.path)?;

    let shape = match &desc.shape {
        EndpointShape::Raw => ValidatedShape::Raw,
        EndpointShape::Typed { request, response } => ValidatedShape::Typed {
            params,
            request: parse_type(&label, "request", request.as_ref())?,
            response: parse_type(&label, "response", response.as_ref())?,
        },
    };

    Ok(ValidatedEndpoint {
        service: desc.service.clone(),
        name: desc.name.clone(),
        handler,
        trace_expr_id: desc.trace_expr_id,
        require_auth: desc.require_auth(),
        template: PathTemplate::new(&desc.path),
        shape,
    })
}

/// Reject duplicate `(service, name)` pairs across a batch.
pub fn validate_batch(descs: &[EndpointDescriptor]) -> Result<(), SynthError> {
    let mut seen = HashSet::new();

    for desc in descs {
        if !seen.insert((desc.service.as_str(), desc.name.as_str())) {
            return Err(SynthError::DuplicateEndpoint {
                service: desc.service.clone(),
                name: desc.name.clone(),
            });
        }
    }

    Ok(())
}

fn validate_path(label: &str, path: &[PathSegment]) -> Result<Vec<ParamSpec>, SynthError> {
    let mut names = HashSet::new();
    let mut params = Vec::new();

    for segment in path {
        match segment {
            PathSegment::Literal(value) => {
                if value.is_empty() || value.contains('/') {
                    return Err(SynthError::invalid(
                        label,
                        "path literal",
                        value,
                        "must be one non-empty segment",
                    ));
                }
            }
            PathSegment::Param { name, value_type } => {
                if name.is_empty() {
                    return Err(SynthError::invalid(label, "path parameter", name, "empty name"));
                }
                if !value_type.is_path_scalar() {
                    return Err(SynthError::UnsupportedBuiltin {
                        builtin: *value_type,
                    });
                }
                if !names.insert(name.as_str()) {
                    return Err(SynthError::DuplicatePathParam {
                        endpoint: label.to_string(),
                        param: name.clone(),
                    });
                }

                params.push(ParamSpec {
                    name: name.clone(),
                    builtin: *value_type,
                });
            }
        }
    }

    Ok(params)
}

fn parse_type(
    label: &str,
    field: &'static str,
    ty: Option<&TypeRef>,
) -> Result<Option<Type>, SynthError> {
    ty.map(|ty| {
        syn::parse_str::<Type>(ty.as_str())
            .map_err(|e| SynthError::invalid(label, field, ty.as_str(), e.to_string()))
    })
    .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::AccessLevel;

    fn greet() -> EndpointDescriptor {
        EndpointDescriptor::typed("Hello", "Greet", "crate::hello::greet").with_path(vec![
            PathSegment::literal("hello"),
            PathSegment::param("name", Builtin::String),
        ])
    }

    #[test]
    fn typed_descriptor_validates() {
        let desc = greet()
            .with_response("crate::hello::Greeting")
            .with_access(AccessLevel::AuthRequired);
        let validated = validate(&desc).expect("valid");

        assert!(validated.require_auth);
        assert_eq!(validated.template.format_string(), "/hello/{}");
        let ValidatedShape::Typed {
            params,
            request,
            response,
        } = validated.shape
        else {
            panic!("expected typed shape");
        };
        assert_eq!(params.len(), 1);
        assert!(request.is_none());
        assert!(response.is_some());
    }

    #[test]
    fn bad_identifiers_are_rejected() {
        let mut desc = greet();
        desc.service = "hello-svc".to_string();
        assert!(matches!(
            validate(&desc),
            Err(SynthError::InvalidDescriptor {
                field: "service",
                ..
            })
        ));

        let mut desc = greet();
        desc.module_path = "not a path".to_string();
        assert!(matches!(
            validate(&desc),
            Err(SynthError::InvalidDescriptor {
                field: "module_path",
                ..
            })
        ));

        let desc = greet().with_request("Vec<");
        assert!(matches!(
            validate(&desc),
            Err(SynthError::InvalidDescriptor {
                field: "request",
                ..
            })
        ));
    }

    #[test]
    fn non_scalar_path_param_is_rejected() {
        let desc = greet().with_path(vec![PathSegment::param("blob", Builtin::Bytes)]);
        let err = validate(&desc).unwrap_err();

        assert!(matches!(
            err,
            SynthError::UnsupportedBuiltin {
                builtin: Builtin::Bytes
            }
        ));
    }

    #[test]
    fn duplicate_params_and_bad_literals_are_rejected() {
        let desc = greet().with_path(vec![
            PathSegment::param("id", Builtin::Int),
            PathSegment::param("id", Builtin::Int),
        ]);
        assert!(matches!(
            validate(&desc),
            Err(SynthError::DuplicatePathParam { .. })
        ));

        let desc = greet().with_path(vec![PathSegment::literal("a/b")]);
        assert!(validate(&desc).is_err());
    }

    #[test]
    fn batch_rejects_duplicate_endpoints() {
        let other = EndpointDescriptor::typed("Hello", "Other", "crate::hello::other");
        validate_batch(&[greet(), other.clone()]).expect("distinct");

        let err = validate_batch(&[greet(), other, greet()]).unwrap_err();
        assert_eq!(err.to_string(), "duplicate endpoint Hello.Greet");
    }
}
