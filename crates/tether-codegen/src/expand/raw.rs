use super::Expander;
use crate::validate::ValidatedEndpoint;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;

//
// ============================================================================
// expand - raw passthrough wrapper
// ============================================================================
//
// The handler writes straight to the response writer; a MetricsWriter shim
// captures the status. Status >= 400 is the only business-error signal.
//

pub fn expand(ex: &Expander<'_>, ep: &ValidatedEndpoint) -> TokenStream2 {
    let rt = &ex.rt;
    let handler = &ep.handler;

    let ident = ex.wrapper_ident(ep);
    let doc = ex.doc_attr(ep, "raw");
    let call_params = ex.call_params(ep);

    let request_data = ex.request_data(
        ep,
        &quote!(::std::option::Option::None),
        &quote!(::std::string::ToString::to_string(req.path())),
        &quote!(::std::option::Option::None),
    );
    let begin_req = ex.begin_req(&request_data);

    let recovered = ex.recovered(&quote! {
        let mut w = #rt::raw::MetricsWriter::new(w);
        #handler(&mut w, req).await;
        let metrics = w.into_metrics();

        if metrics.is_error() {
            let err = #rt::Error::unknown(::std::format!("response status code {}", metrics.code));
            call.finish_req(::std::option::Option::None, ::std::option::Option::Some(&err));
            #rt::dispatch::CallResponse::failed(#rt::round_trip(err))
        } else {
            let data = (!metrics.body.is_empty()).then_some(metrics.body);
            call.finish_req(data.as_deref(), ::std::option::Option::None);
            #rt::dispatch::CallResponse { data, err: ::std::option::Option::None }
        }
    });

    let isolated = ex.isolated(&quote! {
        let ctx = ::std::clone::Clone::clone(req.context());
        #begin_req
        #recovered
    });

    tracing::trace!(
        endpoint = %format!("{}.{}", ep.service, ep.name),
        "expanded raw wrapper"
    );

    quote! {
        #doc
        #[allow(non_snake_case, clippy::all, clippy::pedantic, clippy::nursery)]
        pub async fn #ident(
            w: ::std::boxed::Box<dyn #rt::raw::ResponseWriter>,
            req: #rt::raw::Request,
        ) {
            let ::std::result::Result::Ok(call) = #rt::runtime::begin_call(#call_params) else {
                return;
            };
            #isolated;
        }
    }
}
