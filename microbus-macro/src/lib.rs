/*
 * Copyright (c) 2024. Govcraft
 *
 * Licensed under either of
 *   * Apache License, Version 2.0 (the "License");
 *     you may not use this file except in compliance with the License.
 *     You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0
 *   * MIT license: http://opensource.org/licenses/MIT
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the applicable License for the specific language governing permissions and
 * limitations under that License.
 */
#![forbid(unsafe_code)]

//! Microbus Macro Library
//!
//! Attribute macros that remove the boilerplate from message and worker state
//! definitions.
//!
//! # Message Macros
//!
//! ```ignore
//! // An event whose handler answers with a `String`.
//! #[bus_event(String)]
//! pub struct Ping;
//!
//! // A notification delivered to every subscriber.
//! #[bus_broadcast]
//! pub struct Tick {
//!     pub at: u64,
//! }
//! ```
//!
//! # Worker Macro
//!
//! ```ignore
//! #[bus_worker]
//! pub struct Counter {
//!     count: i32,
//! }
//! ```

use proc_macro::TokenStream;

use quote::quote;
use syn::{parse_macro_input, DeriveInput, Type};

fn has_derive(input: &DeriveInput, trait_name: &str) -> bool {
    input.attrs.iter().any(|attr| {
        if attr.path().is_ident("derive") {
            let mut found = false;
            let _ = attr.parse_nested_meta(|meta| {
                if meta.path.is_ident(trait_name) {
                    found = true;
                }
                Ok(())
            });
            found
        } else {
            false
        }
    })
}

/// Builds `#[derive(...)]` for whichever of `wanted` the input does not derive yet.
fn missing_derives(input: &DeriveInput, wanted: &[&str]) -> proc_macro2::TokenStream {
    let traits: Vec<_> = wanted
        .iter()
        .filter(|name| !has_derive(input, name))
        .map(|name| syn::Ident::new(name, proc_macro2::Span::call_site()))
        .collect();
    if traits.is_empty() {
        quote!()
    } else {
        quote!(#[derive(#(#traits),*)])
    }
}

/// Configuration options parsed from `#[bus_worker(...)]` attributes.
#[derive(Default)]
struct WorkerConfig {
    /// Skip deriving Default (user will implement it manually).
    no_default: bool,
}

impl WorkerConfig {
    fn parse(attr: &TokenStream) -> Self {
        let mut config = Self::default();
        let attr_string = attr.to_string();
        for part in attr_string.split(',') {
            if part.trim() == "no_default" {
                config.no_default = true;
            }
        }
        config
    }
}

/// Turns a struct or enum into a request/response event.
///
/// The attribute argument is the reply type the handling worker completes the
/// event with. The macro derives `Clone` and `Debug` when missing, implements
/// `microbus::prelude::Event` with `type Reply = <argument>`, and asserts at
/// compile time that the type is `Send + Sync + 'static`.
///
/// ```ignore
/// #[bus_event(Vec<u32>)]
/// pub struct DetectObjects {
///     pub tick: u64,
/// }
/// ```
#[proc_macro_attribute]
pub fn bus_event(attr: TokenStream, item: TokenStream) -> TokenStream {
    let reply: Type = if attr.is_empty() {
        syn::parse_quote!(())
    } else {
        parse_macro_input!(attr as Type)
    };
    let input = parse_macro_input!(item as DeriveInput);

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let derives = missing_derives(&input, &["Clone", "Debug"]);
    let assert_ident = quote::format_ident!("_AssertBusEvent_{}", name);

    let expanded = quote! {
        #derives
        #input

        impl #impl_generics ::microbus::prelude::Event for #name #ty_generics #where_clause {
            type Reply = #reply;
        }

        #[doc(hidden)]
        #[allow(dead_code, non_camel_case_types, non_snake_case, clippy::needless_lifetimes)]
        const _: () = {
            fn #assert_ident #impl_generics () #where_clause {
                fn assert_bounds<T: Send + Sync + 'static>() {}
                assert_bounds::<#name #ty_generics>();
                assert_bounds::<#reply>();
            }
        };
    };

    TokenStream::from(expanded)
}

/// Turns a struct or enum into a broadcast.
///
/// Derives `Clone` and `Debug` when missing, implements
/// `microbus::prelude::Broadcast` and asserts `Send + Sync + 'static`.
#[proc_macro_attribute]
pub fn bus_broadcast(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let derives = missing_derives(&input, &["Clone", "Debug"]);
    let assert_ident = quote::format_ident!("_AssertBusBroadcast_{}", name);

    let expanded = quote! {
        #derives
        #input

        impl #impl_generics ::microbus::prelude::Broadcast for #name #ty_generics #where_clause {}

        #[doc(hidden)]
        #[allow(dead_code, non_camel_case_types, non_snake_case, clippy::needless_lifetimes)]
        const _: () = {
            fn #assert_ident #impl_generics () #where_clause {
                fn assert_bounds<T: Send + Sync + 'static>() {}
                assert_bounds::<#name #ty_generics>();
            }
        };
    };

    TokenStream::from(expanded)
}

/// Derives the boilerplate for a worker's state type.
///
/// Expands to `#[derive(Default, Debug)]` (only the traits not already present)
/// and a compile-time assertion that the type is `Send + 'static`. Use
/// `#[bus_worker(no_default)]` when `Default` is implemented by hand.
///
/// ```ignore
/// #[bus_worker]
/// pub struct Tracker {
///     seen: Vec<u64>,
/// }
/// ```
#[proc_macro_attribute]
pub fn bus_worker(attr: TokenStream, item: TokenStream) -> TokenStream {
    let config = WorkerConfig::parse(&attr);
    let input = parse_macro_input!(item as DeriveInput);

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let derives = if config.no_default {
        missing_derives(&input, &["Debug"])
    } else {
        missing_derives(&input, &["Default", "Debug"])
    };
    let assert_ident = quote::format_ident!("_AssertBusWorker_{}", name);

    let expanded = quote! {
        #derives
        #input

        #[doc(hidden)]
        #[allow(dead_code, non_camel_case_types, non_snake_case, clippy::needless_lifetimes)]
        const _: () = {
            fn #assert_ident #impl_generics () #where_clause {
                fn assert_bounds<T: Send + 'static>() {}
                assert_bounds::<#name #ty_generics>();
            }
        };
    };

    TokenStream::from(expanded)
}
