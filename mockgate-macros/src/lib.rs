//! Procedural macros for mockgate
//!
//! This crate provides the `#[mockgate::test]` attribute macro for writing
//! async tests with a pre-configured completion gate.
//!
//! # Example
//!
//! ```rust,ignore
//! use mockgate::gate::CompletionGate;
//!
//! #[mockgate::test(deadline = 5)]
//! async fn my_test(gate: CompletionGate) {
//!     let report = gate
//!         .run_deferred_style(|| async { Ok::<_, String>(42) })
//!         .await;
//!     assert!(report.is_clean());
//! }
//! ```

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    parse::{Parse, ParseStream},
    parse_macro_input, FnArg, Ident, ItemFn, Lit, Pat, Token, Type,
};

/// Configuration options for the test macro.
#[derive(Default)]
struct TestConfig {
    /// Deadline for the injected gate, in seconds
    deadline_secs: Option<u64>,
    /// Declared assertion count for the injected gate
    expect_assertions: Option<usize>,
    /// Whether to start the tokio clock paused (default: false)
    start_paused: bool,
    /// Flavor for the tokio runtime ("current_thread" or "multi_thread")
    flavor: Option<String>,
}

impl Parse for TestConfig {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut config = TestConfig::default();

        while !input.is_empty() {
            let ident: Ident = input.parse()?;
            input.parse::<Token![=]>()?;

            match ident.to_string().as_str() {
                "deadline" => {
                    let lit: Lit = input.parse()?;
                    if let Lit::Int(i) = lit {
                        config.deadline_secs = Some(i.base10_parse()?);
                    }
                }
                "expect_assertions" => {
                    let lit: Lit = input.parse()?;
                    if let Lit::Int(i) = lit {
                        config.expect_assertions = Some(i.base10_parse()?);
                    }
                }
                "start_paused" => {
                    let lit: Lit = input.parse()?;
                    if let Lit::Bool(b) = lit {
                        config.start_paused = b.value();
                    }
                }
                "flavor" => {
                    let lit: Lit = input.parse()?;
                    if let Lit::Str(s) = lit {
                        config.flavor = Some(s.value());
                    }
                }
                _ => {
                    return Err(syn::Error::new(
                        ident.span(),
                        format!("unknown attribute: {ident}"),
                    ));
                }
            }

            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }

        Ok(config)
    }
}

/// Determines if a function parameter is requesting a `CompletionGate`.
fn is_gate_param(arg: &FnArg) -> bool {
    if let FnArg::Typed(pat_type) = arg {
        if let Type::Path(type_path) = &*pat_type.ty {
            if let Some(segment) = type_path.path.segments.last() {
                return segment.ident == "CompletionGate";
            }
        }
    }
    false
}

/// Extracts the parameter name from a function argument.
fn get_param_name(arg: &FnArg) -> Option<&Pat> {
    if let FnArg::Typed(pat_type) = arg {
        Some(&pat_type.pat)
    } else {
        None
    }
}

/// Test attribute macro for async tests with a pre-configured completion
/// gate.
///
/// The macro wraps the function in `#[tokio::test]`. Adding a
/// `gate: CompletionGate` parameter injects a gate built from the
/// attribute options:
///
/// - `deadline = 5` - gate deadline in seconds
/// - `expect_assertions = 1` - declared assertion count for the gate
/// - `start_paused = true` - start the tokio clock paused, so deadlines
///   resolve in virtual time
/// - `flavor = "multi_thread"` - tokio runtime flavor
///
/// ```rust,ignore
/// #[mockgate::test(deadline = 5, expect_assertions = 1, start_paused = true)]
/// async fn rejects_with_error(gate: CompletionGate) {
///     let assertions = gate.assertions();
///     let report = gate
///         .run_suspending_style(async move {
///             assertions.truthy(true)?;
///             Ok::<_, mockgate::Error>(())
///         })
///         .await;
///     assert!(report.is_clean());
/// }
/// ```
#[proc_macro_attribute]
pub fn test(attr: TokenStream, item: TokenStream) -> TokenStream {
    let config = parse_macro_input!(attr as TestConfig);
    let input = parse_macro_input!(item as ItemFn);

    expand_test(config, input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand_test(config: TestConfig, input: ItemFn) -> syn::Result<TokenStream2> {
    let name = &input.sig.ident;
    let body = &input.block;
    let attrs = &input.attrs;
    let vis = &input.vis;

    // The gate only makes sense around an async body
    if input.sig.asyncness.is_none() {
        return Err(syn::Error::new_spanned(
            &input.sig,
            "test function must be async",
        ));
    }

    // Check for a gate parameter
    let gate_param_name = input
        .sig
        .inputs
        .iter()
        .find(|arg| is_gate_param(arg))
        .and_then(get_param_name);

    // Generate gate initialization
    let gate_init = if let Some(gate_name) = gate_param_name {
        let mut ctor = quote! { ::mockgate::gate::CompletionGate::new() };
        if let Some(secs) = config.deadline_secs {
            ctor = quote! {
                #ctor.with_deadline(::std::time::Duration::from_secs(#secs))
            };
        }
        if let Some(count) = config.expect_assertions {
            ctor = quote! { #ctor.expect_assertions(#count) };
        }
        quote! { let #gate_name = #ctor; }
    } else {
        quote! {}
    };

    // Assemble the tokio::test attribute from the runtime options
    let mut tokio_args: Vec<TokenStream2> = Vec::new();
    if let Some(flavor) = config.flavor.as_deref() {
        match flavor {
            "multi_thread" => tokio_args.push(quote! { flavor = "multi_thread" }),
            "current_thread" => {}
            _ => {
                return Err(syn::Error::new(
                    proc_macro2::Span::call_site(),
                    format!(
                        "unsupported flavor: {flavor}. Use \"current_thread\" or \"multi_thread\""
                    ),
                ));
            }
        }
    }
    if config.start_paused {
        tokio_args.push(quote! { start_paused = true });
    }

    let tokio_attr = if tokio_args.is_empty() {
        quote! { #[::tokio::test] }
    } else {
        quote! { #[::tokio::test(#(#tokio_args),*)] }
    };

    Ok(quote! {
        #tokio_attr
        #(#attrs)*
        #vis async fn #name() {
            #gate_init
            #body
        }
    })
}

#[cfg(test)]
mod tests {
    use super::TestConfig;

    #[::core::prelude::v1::test]
    fn config_parse_empty() {
        let config: TestConfig = syn::parse_str("").unwrap();
        assert!(config.deadline_secs.is_none());
        assert!(config.expect_assertions.is_none());
        assert!(!config.start_paused);
        assert!(config.flavor.is_none());
    }

    #[::core::prelude::v1::test]
    fn config_parse_deadline() {
        let config: TestConfig = syn::parse_str("deadline = 5").unwrap();
        assert_eq!(config.deadline_secs, Some(5));
    }

    #[::core::prelude::v1::test]
    fn config_parse_multiple() {
        let config: TestConfig =
            syn::parse_str("deadline = 5, expect_assertions = 1, start_paused = true").unwrap();
        assert_eq!(config.deadline_secs, Some(5));
        assert_eq!(config.expect_assertions, Some(1));
        assert!(config.start_paused);
    }

    #[::core::prelude::v1::test]
    fn config_rejects_unknown_keys() {
        let result: syn::Result<TestConfig> = syn::parse_str("runtime = \"tokio\"");
        assert!(result.is_err());
    }
}
