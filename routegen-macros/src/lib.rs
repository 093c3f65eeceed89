//! Route marker attributes.
//!
//! `routegen-build` reads the markers from source at build time. Here they
//! reject malformed arguments early, with a span pointing at the mistake, and
//! otherwise leave the item as written apart from a default-construction check
//! for each configurator the marker names.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use routegen_build::{MarkerArgs, MarkerShape};
use syn::parse::{ParseStream, Parser};
use syn::{Attribute, Data, DeriveInput, ItemFn, Signature, Stmt, Visibility};

#[proc_macro_attribute]
pub fn get(attr: TokenStream, item: TokenStream) -> TokenStream {
    route_marker(attr, item, MarkerShape::Plain)
}

#[proc_macro_attribute]
pub fn post(attr: TokenStream, item: TokenStream) -> TokenStream {
    route_marker(attr, item, MarkerShape::Plain)
}

#[proc_macro_attribute]
pub fn put(attr: TokenStream, item: TokenStream) -> TokenStream {
    route_marker(attr, item, MarkerShape::Plain)
}

#[proc_macro_attribute]
pub fn delete(attr: TokenStream, item: TokenStream) -> TokenStream {
    route_marker(attr, item, MarkerShape::Plain)
}

#[proc_macro_attribute]
pub fn get_with(attr: TokenStream, item: TokenStream) -> TokenStream {
    route_marker(attr, item, MarkerShape::Bound)
}

#[proc_macro_attribute]
pub fn post_with(attr: TokenStream, item: TokenStream) -> TokenStream {
    route_marker(attr, item, MarkerShape::Bound)
}

#[proc_macro_attribute]
pub fn put_with(attr: TokenStream, item: TokenStream) -> TokenStream {
    route_marker(attr, item, MarkerShape::Bound)
}

#[proc_macro_attribute]
pub fn delete_with(attr: TokenStream, item: TokenStream) -> TokenStream {
    route_marker(attr, item, MarkerShape::Bound)
}

/// Marks the type that receives `register_generated_endpoints`.
#[proc_macro_attribute]
pub fn generate_endpoints(attr: TokenStream, item: TokenStream) -> TokenStream {
    let item = TokenStream2::from(item);
    let result = check_target(attr.into(), item.clone()).map(|()| item.clone());
    expand(result, item)
}

fn route_marker(attr: TokenStream, item: TokenStream, shape: MarkerShape) -> TokenStream {
    let item = TokenStream2::from(item);
    let result = route_expansion(attr.into(), item.clone(), shape);
    expand(result, item)
}

fn route_expansion(
    attr: TokenStream2,
    item: TokenStream2,
    shape: MarkerShape,
) -> syn::Result<TokenStream2> {
    let args = MarkerArgs::parse_tokens(attr, shape)?;
    args.validate()?;
    parse_fn_signature.parse2(item.clone())?;
    Ok(reference_configurators(&args, item))
}

/// Names every configurator at the top of the handler body. Imports that
/// only the generated registration uses stay in use, and a configurator
/// without `Default` fails at the marker instead of inside generated code.
/// Functions without a body come back unchanged.
fn reference_configurators(args: &MarkerArgs, item: TokenStream2) -> TokenStream2 {
    let mut checks: Vec<Stmt> = args
        .bound
        .iter()
        .chain(args.configurator.iter())
        .map(|path| -> Stmt {
            syn::parse_quote!(let _ = <#path as ::core::default::Default>::default;)
        })
        .collect();
    if checks.is_empty() {
        return item;
    }

    match syn::parse2::<ItemFn>(item.clone()) {
        Ok(mut function) => {
            checks.append(&mut function.block.stmts);
            function.block.stmts = checks;
            quote!(#function)
        }
        Err(_) => item,
    }
}

fn check_target(attr: TokenStream2, item: TokenStream2) -> syn::Result<()> {
    if !attr.is_empty() {
        return Err(syn::Error::new_spanned(
            attr,
            "#[generate_endpoints] takes no arguments",
        ));
    }

    let input: DeriveInput = syn::parse2(item)?;
    if let Data::Union(data) = &input.data {
        return Err(syn::Error::new(
            data.union_token.span,
            "#[generate_endpoints] applies to structs and enums",
        ));
    }
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "#[generate_endpoints] cannot be placed on a generic type",
        ));
    }
    Ok(())
}

/// Accepts free functions, associated functions and trait methods, with or
/// without a body.
fn parse_fn_signature(input: ParseStream<'_>) -> syn::Result<Signature> {
    input.call(Attribute::parse_outer)?;
    input.parse::<Visibility>()?;
    let sig: Signature = input.parse()?;
    input.parse::<TokenStream2>()?;
    Ok(sig)
}

/// On error the item comes back unchanged so a bad marker yields one error
/// instead of a cascade of unresolved names.
fn expand(result: syn::Result<TokenStream2>, item: TokenStream2) -> TokenStream {
    match result {
        Ok(expanded) => expanded.into(),
        Err(err) => {
            let error = err.to_compile_error();
            quote!(#error #item).into()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expand_route(attr: TokenStream2, item: TokenStream2, shape: MarkerShape) -> ItemFn {
        syn::parse2(route_expansion(attr, item, shape).unwrap()).unwrap()
    }

    #[test]
    fn test_configurators_are_referenced_in_the_body() {
        let function = expand_route(
            quote!(AuthConfigurator, "member/products", configurator = AuditConfigurator),
            quote!(pub async fn buy(&self, req: Request) -> Response { todo!() }),
            MarkerShape::Bound,
        );

        let stmts: Vec<String> = function
            .block
            .stmts
            .iter()
            .map(|stmt| quote!(#stmt).to_string())
            .collect();
        assert_eq!(stmts.len(), 3);
        assert_eq!(
            stmts[0],
            quote!(let _ = <AuthConfigurator as ::core::default::Default>::default;).to_string()
        );
        assert_eq!(
            stmts[1],
            quote!(let _ = <AuditConfigurator as ::core::default::Default>::default;).to_string()
        );
        assert_eq!(function.sig.ident, "buy");
    }

    #[test]
    fn test_items_without_configurator_are_untouched() {
        let item = quote!(pub fn get_by_id(req: Request) -> Response { todo!() });
        let expanded = route_expansion(quote!("products/{id}"), item.clone(), MarkerShape::Plain)
            .unwrap();
        assert_eq!(expanded.to_string(), item.to_string());
    }

    #[test]
    fn test_bodiless_declaration_is_untouched() {
        let item = quote!(fn member(&self, req: Request) -> Response;);
        let expanded = route_expansion(
            quote!("member", configurator = AuthConfigurator),
            item.clone(),
            MarkerShape::Plain,
        )
        .unwrap();
        assert_eq!(expanded.to_string(), item.to_string());
    }

    #[test]
    fn test_malformed_marker_is_rejected() {
        let err = route_expansion(
            quote!("x", colour = "red"),
            quote!(fn f() {}),
            MarkerShape::Plain,
        )
        .unwrap_err();
        assert!(err.to_string().contains("colour"));
    }
}
