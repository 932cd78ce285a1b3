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

//! The `#[bus_test]` attribute.
//!
//! Wraps an `async fn` test in a dedicated multi-thread tokio runtime, installs a
//! panic hook that records where a worker task panicked, and fails the test with
//! that location even when the panic happened on a worker task rather than on the
//! test body itself. The hook that was installed before the test is put back
//! once the test finishes.

use proc_macro::TokenStream;

use quote::quote;
use syn::{parse_macro_input, ItemFn};

#[proc_macro_attribute]
pub fn bus_test(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    let vis = &input.vis;
    let sig = &input.sig;
    let body = &input.block;
    let attrs = &input.attrs;
    let name = &sig.ident;
    let inputs = &sig.inputs;
    let output = &sig.output;

    if sig.asyncness.is_none() {
        return syn::Error::new_spanned(sig.fn_token, "#[bus_test] requires an async fn")
            .to_compile_error()
            .into();
    }

    let async_name = syn::Ident::new(&format!("__{name}_async"), name.span());
    let finish = match output {
        syn::ReturnType::Default => quote!(result),
        syn::ReturnType::Type(..) => quote!(result.unwrap()),
    };

    let output = quote! {
        #[test]
        #(#attrs)*
        #vis fn #name() {
            use std::sync::atomic::{AtomicBool, Ordering};
            use std::sync::Arc;
            use std::panic;

            #[derive(Clone, Default)]
            struct PanicRecord {
                occurred: Arc<AtomicBool>,
                message: Arc<::microbus_test::__private::parking_lot::Mutex<Option<String>>>,
                location: Arc<::microbus_test::__private::parking_lot::Mutex<Option<String>>>,
            }

            let record = PanicRecord::default();
            let hook_record = record.clone();

            let orig_hook = Arc::new(panic::take_hook());
            let chained_hook = Arc::clone(&orig_hook);
            panic::set_hook(Box::new(move |info| {
                hook_record.occurred.store(true, Ordering::SeqCst);
                let message = info
                    .payload()
                    .downcast_ref::<&str>()
                    .map(|s| (*s).to_string())
                    .or_else(|| info.payload().downcast_ref::<String>().cloned());
                *hook_record.message.lock() = message.clone();
                *hook_record.location.lock() = info
                    .location()
                    .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()));
                ::microbus_test::__private::tracing::error!(
                    "Panic: {}",
                    message
                        .unwrap_or_else(|| "No error message".to_string())
                        .trim()
                        .replace('\n', " ")
                );
                (**chained_hook)(info);
            }));

            let runtime = ::microbus_test::__private::tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .expect("failed to build the test runtime");

            let result = runtime.block_on(async {
                let test_span = ::microbus_test::__private::tracing::info_span!("bus_test", name = stringify!(#name));
                let _enter = test_span.enter();
                #async_name().await
            });

            // Workers still parked in their loops are dropped here.
            runtime.shutdown_timeout(std::time::Duration::from_secs(1));
            // The hook is process-wide: tests running in parallel share it, so a
            // panic in one of them can also be recorded by another.
            let _ = panic::take_hook();
            panic::set_hook(Box::new(move |info| (**orig_hook)(info)));

            if record.occurred.load(Ordering::SeqCst) {
                let location = record
                    .location
                    .lock()
                    .clone()
                    .unwrap_or_else(|| "unknown location".to_string());
                let message = record
                    .message
                    .lock()
                    .clone()
                    .unwrap_or_else(|| "No error message".to_string());
                panic!("Panic at {}: {}", location, message.trim().replace('\n', " "));
            }

            #finish
        }

        async fn #async_name(#inputs) #output #body
    };

    output.into()
}
