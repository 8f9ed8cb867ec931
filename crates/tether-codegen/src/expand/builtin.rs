use crate::{descriptor::Builtin, error::SynthError};
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;

/// Rust type used for a path parameter of `builtin` type.
///
/// Go-style `int`/`uint` are pinned to 64 bits. `rt` is the runtime crate
/// path, which re-exports `Uuid`.
pub fn builtin_type(builtin: Builtin, rt: &TokenStream2) -> Result<TokenStream2, SynthError> {
    let ty = match builtin {
        Builtin::String => quote!(::std::string::String),
        Builtin::Bool => quote!(bool),
        Builtin::Int8 => quote!(i8),
        Builtin::Int16 => quote!(i16),
        Builtin::Int32 => quote!(i32),
        Builtin::Int64 | Builtin::Int => quote!(i64),
        Builtin::Uint8 => quote!(u8),
        Builtin::Uint16 => quote!(u16),
        Builtin::Uint32 => quote!(u32),
        Builtin::Uint64 | Builtin::Uint => quote!(u64),
        Builtin::Uuid => quote!(#rt::types::Uuid),
        Builtin::Any
        | Builtin::Bytes
        | Builtin::Float32
        | Builtin::Float64
        | Builtin::Json
        | Builtin::Time
        | Builtin::UserId => return Err(SynthError::UnsupportedBuiltin { builtin }),
    };

    Ok(ty)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(builtin: Builtin) -> String {
        builtin_type(builtin, &quote!(::tether_core))
            .expect("scalar")
            .to_string()
    }

    #[test]
    fn scalars_map_to_rust_types() {
        assert_eq!(rendered(Builtin::Bool), "bool");
        assert_eq!(rendered(Builtin::Int), "i64");
        assert_eq!(rendered(Builtin::Int8), "i8");
        assert_eq!(rendered(Builtin::Uint), "u64");
        assert_eq!(rendered(Builtin::Uint16), "u16");
        assert_eq!(rendered(Builtin::String), ":: std :: string :: String");
        assert_eq!(rendered(Builtin::Uuid), ":: tether_core :: types :: Uuid");
    }

    #[test]
    fn every_path_scalar_maps_and_nothing_else_does() {
        let all = [
            Builtin::Any,
            Builtin::Bool,
            Builtin::Bytes,
            Builtin::Float32,
            Builtin::Float64,
            Builtin::Int,
            Builtin::Int8,
            Builtin::Int16,
            Builtin::Int32,
            Builtin::Int64,
            Builtin::Json,
            Builtin::String,
            Builtin::Time,
            Builtin::Uint,
            Builtin::Uint8,
            Builtin::Uint16,
            Builtin::Uint32,
            Builtin::Uint64,
            Builtin::UserId,
            Builtin::Uuid,
        ];

        for builtin in all {
            let mapped = builtin_type(builtin, &quote!(::tether_core));
            assert_eq!(mapped.is_ok(), builtin.is_path_scalar(), "{builtin}");
        }
    }
}
