//! Attribute macros for the `offload` crate.
//!
//! Each macro takes an `async fn` and turns it into a synchronous function
//! that drives the body with `offload::future::block_on`. There is no
//! background runtime to set up, so the expansion is exactly that call.

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Error, ItemFn};

#[derive(Clone, Copy)]
enum Entry {
  Main,
  Test,
  InternalTest,
}

/// Turns `async fn main` into a plain `fn main` driven by
/// `offload::future::block_on`.
#[proc_macro_attribute]
pub fn main(_: TokenStream, function: TokenStream) -> TokenStream {
  expand(parse_macro_input!(function as ItemFn), Entry::Main)
}

/// Turns an `async fn` into a `#[test]` driven by
/// `offload::future::block_on`.
#[proc_macro_attribute]
pub fn test(_: TokenStream, function: TokenStream) -> TokenStream {
  expand(parse_macro_input!(function as ItemFn), Entry::Test)
}

/// Like [`macro@test`] but expands with `crate::` paths, for tests that live
/// inside the `offload` crate itself.
#[proc_macro_attribute]
pub fn internal_test(_: TokenStream, function: TokenStream) -> TokenStream {
  expand(parse_macro_input!(function as ItemFn), Entry::InternalTest)
}

fn expand(function: ItemFn, entry: Entry) -> TokenStream {
  if function.sig.asyncness.is_none() {
    return Error::new_spanned(&function.sig.fn_token, "expected an `async fn`")
      .to_compile_error()
      .into();
  }

  let attrs = &function.attrs;
  let vis = &function.vis;
  let ident = &function.sig.ident;
  let inputs = &function.sig.inputs;
  let output = &function.sig.output;
  let block = &function.block;

  let block_on = match entry {
    Entry::InternalTest => quote! { crate::future::block_on },
    Entry::Main | Entry::Test => quote! { offload::future::block_on },
  };

  let test_attribute = match entry {
    Entry::Main => quote! {},
    Entry::Test | Entry::InternalTest => quote! { #[test] },
  };

  let expanded = quote! {
    #(#attrs)*
    #test_attribute
    #vis fn #ident(#inputs) #output {
      #block_on(async #block)
    }
  };

  expanded.into()
}
