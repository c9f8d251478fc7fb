//! Derive macros for `cadence_engine`.

mod component;

use proc_macro::TokenStream;

/// Implement the `Component` marker trait. The type must be `'static + Send + Sync`.
#[proc_macro_derive(Component)]
pub fn derive_component(item: TokenStream) -> TokenStream {
    component::derive_component(item)
}
