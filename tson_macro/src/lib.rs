extern crate proc_macro;
extern crate proc_macro2;

/// Support for struct auto-derive.
mod struct_impl;

use proc_macro::TokenStream;
use syn::*;

/// Derives `TsonRep` and `TsonRecord` for a struct with named fields.
///
/// Attributes:
///
/// * `#[tson(name = "...")]` on the struct sets the registered record name, which defaults to
///   the struct's identifier.
/// * `#[tson(rename = "...")]` on a field sets its wire name, which defaults to the field's
///   identifier.
/// * `#[tson(skip)]` on a field leaves it out of serialization; it is rebuilt with
///   `Default::default()`.
#[proc_macro_derive(TsonRep, attributes(tson))]
pub fn tson_rep_derive(input: TokenStream) -> TokenStream {
    // Construct a representation of Rust code as a syntax tree
    // that we can manipulate
    let ast = parse_macro_input!(input as DeriveInput);

    // Build the trait implementations
    impl_tson_rep_macro(&ast)
        .unwrap_or_else(Error::into_compile_error)
        .into()
}

fn impl_tson_rep_macro(ast: &DeriveInput) -> Result<proc_macro2::TokenStream> {
    match &ast.data {
        Data::Struct(sd) => struct_impl::tson_rep(ast, sd),
        _ => Err(Error::new_spanned(
            &ast.ident,
            "TsonRep can only be derived for structs with named fields",
        )),
    }
}
