use super::{Expander, builtin_type};
use crate::{
    descriptor::Builtin,
    error::SynthError,
    validate::{ParamSpec, ValidatedEndpoint},
};
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::Type;

///
/// Operand
/// One wrapper input: a path parameter or the request body.
///

struct Operand {
    arg: syn::Ident,
    local: syn::Ident,
    ty: TokenStream2,
    path: Option<Builtin>,
}

//
// ============================================================================
// expand - typed endpoint wrapper
// ============================================================================
//

pub fn expand(
    ex: &Expander<'_>,
    ep: &ValidatedEndpoint,
    params: &[ParamSpec],
    request: Option<&Type>,
    response: Option<&Type>,
) -> Result<TokenStream2, SynthError> {
    let rt = &ex.rt;
    let operands = operands(ex, params, request)?;

    let ident = ex.wrapper_ident(ep);
    let doc = ex.doc_attr(ep, "typed");
    let args = operands.iter().map(|op| {
        let arg = &op.arg;
        let ty = &op.ty;
        quote!(#arg: #ty)
    });
    let ret = match response {
        Some(ty) => quote!(#ty),
        None => quote!(()),
    };

    let bundle = bundle_inputs(rt, &operands);
    let call_params = ex.call_params(ep);

    let (render, path, path_segments) = render_path(ex, ep, &operands);
    let request_data = ex.request_data(
        ep,
        &quote!(::std::option::Option::Some(inputs.clone())),
        &path,
        &path_segments,
    );
    let begin_req = ex.begin_req(&request_data);

    let handler_body = handler_body(ex, ep, &operands, response.is_some());
    let recovered = ex.recovered(&handler_body);

    let isolated = ex.isolated(&quote! {
        #render
        #begin_req
        #recovered
    });

    let deliver = if response.is_some() {
        quote!(#rt::dispatch::deliver::<#ret>(response))
    } else {
        quote!(#rt::dispatch::deliver_empty(response))
    };

    tracing::trace!(
        endpoint = %format!("{}.{}", ep.service, ep.name),
        operands = operands.len(),
        "expanded typed wrapper"
    );

    Ok(quote! {
        #doc
        #[allow(non_snake_case, clippy::all, clippy::pedantic, clippy::nursery)]
        pub async fn #ident(
            ctx: #rt::Context,
            #(#args),*
        ) -> ::std::result::Result<#ret, #rt::Error> {
            #bundle
            let call = #rt::runtime::begin_call(#call_params)?;
            let response = #isolated;
            #deliver
        }
    })
}

//
// ============================================================================
// helpers
// ============================================================================
//

// Path parameters first, in path order, then the body. One running index.
fn operands(
    ex: &Expander<'_>,
    params: &[ParamSpec],
    request: Option<&Type>,
) -> Result<Vec<Operand>, SynthError> {
    let mut out = Vec::with_capacity(params.len() + usize::from(request.is_some()));

    for (i, param) in params.iter().enumerate() {
        out.push(Operand {
            arg: format_ident!("p{}", i),
            local: format_ident!("r{}", i),
            ty: builtin_type(param.builtin, &ex.rt)?,
            path: Some(param.builtin),
        });
    }

    if let Some(ty) = request {
        let i = params.len();
        out.push(Operand {
            arg: format_ident!("p{}", i),
            local: format_ident!("r{}", i),
            ty: quote!(#ty),
            path: None,
        });
    }

    Ok(out)
}

// Zero operands: explicitly empty snapshot, no serialization call.
fn bundle_inputs(rt: &TokenStream2, operands: &[Operand]) -> TokenStream2 {
    if operands.is_empty() {
        return quote! {
            let inputs: ::std::vec::Vec<u8> = ::std::vec::Vec::new();
        };
    }

    let refs = operands.iter().map(|op| {
        let arg = &op.arg;
        quote!(&#arg)
    });

    quote! {
        let inputs: ::std::vec::Vec<u8> = #rt::inputs::serialize_inputs(&(#(#refs,)*))?;
    }
}

// Returns (statements, path expr, path_segments expr).
fn render_path(
    ex: &Expander<'_>,
    ep: &ValidatedEndpoint,
    operands: &[Operand],
) -> (TokenStream2, TokenStream2, TokenStream2) {
    let rt = &ex.rt;
    let path_ops: Vec<&Operand> = operands.iter().filter(|op| op.path.is_some()).collect();

    if path_ops.is_empty() {
        let literal = ep.template.render(&[]).unwrap_or_else(|| "/".to_string());
        return (
            quote!(),
            quote!(::std::string::String::from(#literal)),
            quote!(::std::option::Option::None),
        );
    }

    let escaped: Vec<syn::Ident> = (0..path_ops.len())
        .map(|i| format_ident!("e{}", i))
        .collect();

    let escapes = path_ops.iter().zip(&escaped).map(|(op, e)| {
        let arg = &op.arg;
        match op.path {
            Some(Builtin::String) => quote! {
                let #e = #rt::path::path_escape(&#arg);
            },
            _ => quote! {
                let #e = #rt::path::path_escape(&::std::string::ToString::to_string(&#arg));
            },
        }
    });

    let fmt = ep.template.format_string();
    let keys = ep.template.param_names();
    let pairs = keys.iter().zip(&escaped).map(|(key, e)| {
        quote!(#rt::runtime::PathParam::new(#key, #e))
    });

    let render = quote! {
        #(#escapes)*
        let path = ::std::format!(#fmt, #(#escaped),*);
    };

    (
        render,
        quote!(path),
        quote!(::std::option::Option::Some(::std::vec![#(#pairs),*])),
    )
}

fn handler_body(
    ex: &Expander<'_>,
    ep: &ValidatedEndpoint,
    operands: &[Operand],
    has_response: bool,
) -> TokenStream2 {
    let rt = &ex.rt;
    let handler = &ep.handler;
    let locals: Vec<&syn::Ident> = operands.iter().map(|op| &op.local).collect();

    let decode = if operands.is_empty() {
        quote!()
    } else {
        let tys = operands.iter().map(|op| &op.ty);
        quote! {
            let (#(#locals,)*) = match #rt::inputs::copy_inputs::<(#(#tys,)*)>(&inputs) {
                ::std::result::Result::Ok(decoded) => decoded,
                ::std::result::Result::Err(err) => {
                    call.finish_req(::std::option::Option::None, ::std::option::Option::Some(&err));
                    return #rt::dispatch::CallResponse::failed(err);
                }
            };
        }
    };

    let on_ok = if has_response {
        quote! {
            ::std::result::Result::Ok(resp) => match #rt::dispatch::serialize_response(&resp) {
                ::std::result::Result::Ok(data) => {
                    call.finish_req(::std::option::Option::Some(data.as_slice()), ::std::option::Option::None);
                    #rt::dispatch::CallResponse {
                        data: ::std::option::Option::Some(data),
                        err: ::std::option::Option::None,
                    }
                }
                ::std::result::Result::Err(err) => {
                    call.finish_req(::std::option::Option::None, ::std::option::Option::Some(&err));
                    #rt::dispatch::CallResponse::failed(err)
                }
            },
        }
    } else {
        quote! {
            ::std::result::Result::Ok(()) => {
                call.finish_req(::std::option::Option::None, ::std::option::Option::None);
                #rt::dispatch::CallResponse::default()
            }
        }
    };

    quote! {
        #decode
        match #handler(ctx, #(#locals),*).await {
            #on_ok
            ::std::result::Result::Err(err) => {
                let err = #rt::Error::from(err);
                call.finish_req(::std::option::Option::None, ::std::option::Option::Some(&err));
                #rt::dispatch::CallResponse::failed(#rt::round_trip(err))
            }
        }
    }
}
