use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, spanned::Spanned, Ident, ItemFn, LitStr};

const USAGE: &str = "rxhub_macro::test only accepts: #[rxhub_macro::test], \
                     #[rxhub_macro::test(local)], #[rxhub_macro::test(shared)], or string \
                     equivalents";

/// Marks a hub test.
///
/// Sync functions become plain `#[test]`s. Async functions run on tokio:
/// `local` (the default) uses the current-thread runtime, `shared` uses the
/// multi-threaded runtime so producers and consumers really run in parallel.
#[proc_macro_attribute]
pub fn test(attr: TokenStream, item: TokenStream) -> TokenStream {
  let input = parse_macro_input!(item as ItemFn);
  let is_async = input.sig.asyncness.is_some();
  let raw_args = proc_macro2::TokenStream::from(attr);

  if !is_async {
    if !raw_args.is_empty() {
      return syn::Error::new(
        raw_args.span(),
        "rxhub_macro::test flavor args are only supported for async tests",
      )
      .to_compile_error()
      .into();
    }
    return quote!(#[test] #input).into();
  }

  let flavor = if raw_args.is_empty() {
    None
  } else if let Ok(ident) = syn::parse2::<Ident>(raw_args.clone()) {
    Some((ident.to_string(), ident.span()))
  } else if let Ok(lit) = syn::parse2::<LitStr>(raw_args.clone()) {
    Some((lit.value(), lit.span()))
  } else {
    return syn::Error::new(raw_args.span(), USAGE)
      .to_compile_error()
      .into();
  };

  let tokio_args = match flavor.as_ref().map(|(name, span)| (name.as_str(), *span)) {
    None | Some(("local", _)) => quote!(flavor = "current_thread"),
    Some(("shared", _)) => quote!(flavor = "multi_thread", worker_threads = 4),
    Some((_, span)) => return syn::Error::new(span, USAGE).to_compile_error().into(),
  };

  quote!(#[tokio::test(#tokio_args)] #input).into()
}
