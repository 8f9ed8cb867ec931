//
// ============================================================================
// CALL LIFECYCLE INVARIANTS
// ============================================================================
//
// Every synthesized wrapper drives exactly one call through the runtime:
//
//   begin_call → isolate { begin_req → recover { decode → handler } } → finish
//
// 1. begin_call failure returns immediately; no other lifecycle call runs.
// 2. begin_req failure is stored as the call error; the handler is skipped
//    and finish_req is NOT called.
// 3. Once begin_req succeeds, finish_req runs exactly once on every path
//    (success, business error, decode error, panic) before the isolated
//    task completes.
// 4. finish runs exactly once, after the rendezvous, with the stored error.
//    A wrapper future dropped mid-call still finishes, with `Canceled`,
//    once the isolated task has signalled.
// 5. The isolated task runs under the caller's scoped runtime, so nested
//    wrapper calls report to the same runtime.
//
// tether-tests compiles the output of this module from a build script and
// runs the lifecycle tests against it.
//

mod builtin;
mod raw;
mod typed;

pub use builtin::builtin_type;

use crate::validate::{ValidatedEndpoint, ValidatedShape};
use crate::{config::SynthConfig, error::SynthError};
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};

///
/// Expander
/// Per-configuration expansion state shared by both wrapper flavors.
///

pub struct Expander<'a> {
    pub config: &'a SynthConfig,
    pub rt: TokenStream2,
}

impl<'a> Expander<'a> {
    pub fn new(config: &'a SynthConfig) -> Result<Self, SynthError> {
        let rt_path: syn::Path = syn::parse_str(&format!("::{}", config.runtime_crate))
            .map_err(|e| {
                SynthError::invalid("config", "runtime_crate", &config.runtime_crate, e.to_string())
            })?;

        Ok(Self {
            config,
            rt: quote!(#rt_path),
        })
    }

    pub fn expand(&self, ep: &ValidatedEndpoint) -> Result<TokenStream2, SynthError> {
        match &ep.shape {
            ValidatedShape::Typed {
                params,
                request,
                response,
            } => typed::expand(self, ep, params, request.as_ref(), response.as_ref()),
            ValidatedShape::Raw => Ok(raw::expand(self, ep)),
        }
    }

    // ------------------------------------------------------------------
    // shared fragments
    // ------------------------------------------------------------------

    fn wrapper_ident(&self, ep: &ValidatedEndpoint) -> syn::Ident {
        format_ident!("{}", self.config.wrapper_name(&ep.service, &ep.name))
    }

    fn doc_attr(&self, ep: &ValidatedEndpoint, flavor: &str) -> TokenStream2 {
        if !self.config.emit_docs {
            return quote!();
        }

        let doc = format!(
            " Call wrapper for the {flavor} endpoint `{}.{}`.",
            ep.service, ep.name
        );
        quote!(#[doc = #doc])
    }

    fn call_params(&self, ep: &ValidatedEndpoint) -> TokenStream2 {
        let rt = &self.rt;
        let service = &ep.service;
        let endpoint = &ep.name;
        let idx = ep.trace_expr_id;

        quote! {
            #rt::runtime::CallParams {
                service: #service,
                endpoint: #endpoint,
                endpoint_expr_idx: #idx,
            }
        }
    }

    fn request_data(
        &self,
        ep: &ValidatedEndpoint,
        inputs: &TokenStream2,
        path: &TokenStream2,
        path_segments: &TokenStream2,
    ) -> TokenStream2 {
        let rt = &self.rt;
        let service = &ep.service;
        let endpoint = &ep.name;
        let idx = ep.trace_expr_id;
        let require_auth = ep.require_auth;

        quote! {
            #rt::runtime::RequestData {
                kind: #rt::ids::RequestKind::RpcCall,
                service: #service,
                endpoint: #endpoint,
                endpoint_expr_idx: #idx,
                inputs: #inputs,
                path: #path,
                path_segments: #path_segments,
                require_auth: #require_auth,
            }
        }
    }

    /// Begin-request inside the isolated task; failure ends the task.
    fn begin_req(&self, request_data: &TokenStream2) -> TokenStream2 {
        let rt = &self.rt;

        quote! {
            if let ::std::result::Result::Err(err) = call.begin_req(&ctx, #request_data) {
                return #rt::dispatch::CallResponse::failed(err);
            }
        }
    }

    /// Run `body` under panic recovery; a panic becomes an `Internal` error.
    fn recovered(&self, body: &TokenStream2) -> TokenStream2 {
        let rt = &self.rt;

        quote! {
            let outcome = #rt::dispatch::recover({
                let call = ::std::sync::Arc::clone(&call);
                async move { #body }
            })
            .await;

            match outcome {
                ::std::result::Result::Ok(response) => response,
                ::std::result::Result::Err(panic) => {
                    let err = #rt::dispatch::panic_error(&panic);
                    call.finish_req(::std::option::Option::None, ::std::option::Option::Some(&err));
                    #rt::dispatch::CallResponse::failed(err)
                }
            }
        }
    }

    /// Spawn the isolated task around `body`, wait for it and finish the call.
    /// Evaluates to the task's `CallResponse`.
    fn isolated(&self, body: &TokenStream2) -> TokenStream2 {
        let rt = &self.rt;

        quote! {
            #rt::dispatch::isolate(&call, {
                let call = ::std::sync::Arc::clone(&call);
                async move { #body }
            })
            .await
        }
    }
}
