use proc_macro::TokenStream;

mod component;
mod util;

#[proc_macro_derive(Component, attributes(component))]
pub fn component(input: TokenStream) -> TokenStream {
    component::derive(input.into()).unwrap_or_else(|err| err.to_compile_error()).into()
}
