use proc_macro2::TokenStream;
use quote::{quote, ToTokens};
use syn::spanned::Spanned;
use syn::{Error, Result};

/// Options accepted in `#[component(...)]` attributes.
#[derive(Default)]
pub(crate) struct Opts {
    /// The path to the tessera crate, `::tessera` if absent.
    pub(crate) tessera_as: Option<TokenStream>,
    /// The JSON key of the component.
    pub(crate) name:       Option<syn::LitStr>,
}

impl Opts {
    pub(crate) fn parse(attrs: &[syn::Attribute], attr_name: &str) -> Result<Self> {
        let mut opts = Self::default();

        for attr in attrs {
            if !attr.path().is_ident(attr_name) {
                continue;
            }

            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("tessera_as") {
                    let inner;
                    syn::parenthesized!(inner in meta.input);
                    let path: TokenStream = inner.parse()?;
                    set_once(&mut opts.tessera_as, path, meta.path.span())
                } else if meta.path.is_ident("name") {
                    let name: syn::LitStr = meta.value()?.parse()?;
                    if name.value().is_empty() {
                        return Err(Error::new(name.span(), "component name must not be empty"));
                    }
                    set_once(&mut opts.name, name, meta.path.span())
                } else {
                    Err(meta.error(format!(
                        "unsupported option {}",
                        meta.path.to_token_stream()
                    )))
                }
            })?;
        }

        Ok(opts)
    }

    pub(crate) fn crate_name(&self) -> TokenStream {
        match &self.tessera_as {
            Some(ts) => ts.clone(),
            None => quote!(::tessera),
        }
    }
}

fn set_once<T>(slot: &mut Option<T>, value: T, span: proc_macro2::Span) -> Result<()> {
    if slot.is_some() {
        return Err(Error::new(span, "option specified twice"));
    }
    *slot = Some(value);
    Ok(())
}

/// Converts a type name to lowerCamelCase, e.g. `RenderModel` to `renderModel`.
pub(crate) fn lower_camel(ident: &syn::Ident) -> String {
    let ident = ident.to_string();
    let mut chars = ident.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => ident,
    }
}
