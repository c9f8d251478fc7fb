use proc_macro::TokenStream;
use quote::quote;
use syn::{DeriveInput, parse_macro_input};

pub fn derive_component(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);

    let name = &ast.ident;
    let (impl_generics, type_generics, where_clause) = ast.generics.split_for_impl();

    // `::cadence_engine` resolves inside the engine crate through
    // `extern crate self as cadence_engine;` in its lib.rs.
    TokenStream::from(quote! {
        impl #impl_generics ::cadence_engine::ecs::Component for #name #type_generics #where_clause {
        }
    })
}
