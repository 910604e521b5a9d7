#![doc = include_str!("../README.md")]

use unsynn::*;

keyword! {
    KFn = "fn";
}

unsynn! {
    struct UntilFn {
        items: Any<Cons<Except<KFn>, TokenTree>>,
    }

    struct UntilBody {
        items: Any<Cons<Except<BraceGroup>, TokenTree>>,
    }

    struct Body {
        items: BraceGroup,
    }

    struct FunctionDecl {
        until_fn: UntilFn, _fn: KFn, name: Ident,
        until_body: UntilBody, body: Body
    }
}

impl quote::ToTokens for UntilFn {
    fn to_tokens(&self, tokens: &mut unsynn::TokenStream) {
        self.items.to_tokens(tokens)
    }
}

impl quote::ToTokens for UntilBody {
    fn to_tokens(&self, tokens: &mut unsynn::TokenStream) {
        self.items.to_tokens(tokens)
    }
}

impl quote::ToTokens for Body {
    fn to_tokens(&self, tokens: &mut unsynn::TokenStream) {
        tokens.extend(self.items.0.stream())
    }
}

/// Maps `#[test(debug)]` and friends to the log level the test runs with
fn level_filter(attr: TokenStream) -> core::result::Result<Option<Ident>, String> {
    let mut tokens = attr.into_iter();
    let Some(first) = tokens.next() else {
        return Ok(None);
    };
    if let Some(extra) = tokens.next() {
        return Err(format!("unexpected `{extra}` after the log level"));
    }
    let TokenTree::Ident(level) = first else {
        return Err(format!("expected a log level, found `{first}`"));
    };
    let filter = match level.to_string().as_str() {
        "off" => "Off",
        "error" => "Error",
        "warn" => "Warn",
        "info" => "Info",
        "debug" => "Debug",
        "trace" => "Trace",
        other => return Err(format!("unknown log level `{other}`")),
    };
    Ok(Some(Ident::new(filter, level.span())))
}

/// Runs the function as a test returning `eyre::Result<()>`, with logging
/// and colored backtraces installed.
///
/// `#[test(debug)]` caps the log level; the default is `trace`.
#[proc_macro_attribute]
pub fn test(
    attr: proc_macro::TokenStream,
    item: proc_macro::TokenStream,
) -> proc_macro::TokenStream {
    let filter = match level_filter(TokenStream::from(attr)) {
        Ok(filter) => filter,
        Err(message) => {
            return quote::quote! { ::core::compile_error!(#message); }.into();
        }
    };

    let item = TokenStream::from(item);
    let mut i = item.to_token_iter();
    let fdecl = match i.parse::<FunctionDecl>() {
        Ok(fdecl) => fdecl,
        Err(_) => {
            return quote::quote! {
                ::core::compile_error!("#[test] expects a function with a body");
            }
            .into();
        }
    };

    let FunctionDecl {
        until_fn,
        _fn,
        name,
        until_body,
        body,
    } = fdecl;

    let setup = match filter {
        Some(filter) => quote::quote! {
            ::fastbind_testhelpers::setup_with_level(::fastbind_testhelpers::LevelFilter::#filter);
        },
        None => quote::quote! {
            ::fastbind_testhelpers::setup();
        },
    };

    quote::quote! {
        #[::core::prelude::rust_2024::test]
        #until_fn fn #name #until_body -> ::fastbind_testhelpers::eyre::Result<()> {
            #setup

            #body

            Ok(())
        }
    }
    .into()
}
