use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use quote::quote_spanned;
use std::path::Path;

/// Turns a function into a `#[test]` that runs the `http request` blocks of
/// a markdown document and fails unless every request passes.
///
/// The function body runs first and can be used to start whatever the
/// document talks to. An optional second argument names a
/// `fn(&mut mdhttp::RunnerConfiguration)` applied before the run.
///
/// ```ignore
/// #[markdown_http_test("docs/api.md", configure)]
/// fn api_walkthrough() {
///     start_server();
/// }
/// ```
#[proc_macro_attribute]
pub fn markdown_http_test(attrs: TokenStream, item: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(item as syn::ItemFn);
    let args = syn::parse_macro_input!(attrs as syn::AttributeArgs);

    let signature = &input.sig;
    let block = &input.block;
    let attributes = &input.attrs;

    let markdown_name: String;

    if args.is_empty() || args.len() > 2 {
        return quote! {
            compile_error!("A markdown path and an optional configuration function should be passed to the macro");
        }
        .into();
    }

    if let syn::NestedMeta::Lit(syn::Lit::Str(parsed_markdown_name)) = &args[0] {
        markdown_name = parsed_markdown_name.value();
        if let Err(stream) = validate_markdown_path(&markdown_name, parsed_markdown_name.span()) {
            return stream.into();
        }
    } else {
        return quote! {
            compile_error!("The first argument should be a string literal!");
        }
        .into();
    }

    let configure = match args.get(1) {
        None => quote! {},
        Some(syn::NestedMeta::Meta(syn::Meta::Path(function_path))) => quote! {
            #function_path(&mut __mdhttp_configuration);
        },
        Some(_) => {
            return quote! {
                compile_error!("The second argument should be a configuration function!");
            }
            .into();
        }
    };

    let output = quote! {
        #[test]
        #(#attributes)*
        #signature {
            #block

            #[allow(unused_mut)]
            let mut __mdhttp_configuration = ::mdhttp::RunnerConfiguration::new(
                ::std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join(#markdown_name)
            );
            #configure

            match ::mdhttp::run_blocking(__mdhttp_configuration) {
                Ok(summary) => assert!(summary.is_success(), "mdhttp: {}", summary),
                Err(e) => panic!("mdhttp error: {}", e),
            }
        }
    };

    TokenStream::from(output)
}

fn validate_markdown_path<P: AsRef<Path>>(
    path: P,
    span: Span,
) -> Result<(), proc_macro2::TokenStream> {
    if !path.as_ref().to_string_lossy().ends_with(".md") {
        return Err(quote_spanned! {span=>
            compile_error!("The path should point to a .md file!");
        });
    }

    Ok(())
}
