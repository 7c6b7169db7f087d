use proc_macro2::TokenStream;
use quote::quote;
use syn::Result;

use crate::util::{self, Opts};

pub(crate) fn derive(input: TokenStream) -> Result<TokenStream> {
    let input: syn::DeriveInput = syn::parse2(input)?;
    let opts = Opts::parse(&input.attrs, "component")?;

    let crate_name = opts.crate_name();
    let name = match &opts.name {
        Some(name) => name.value(),
        None => util::lower_camel(&input.ident),
    };

    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics #crate_name::Component for #ident #ty_generics #where_clause {
            const NAME: &'static str = #name;
        }
    })
}
