//! Procedural macros for the Baton runtime.
//!
//! - `#[baton::main]` turns an `async fn main` into a synchronous entry point.
//! - `#[baton::test]` turns an `async fn` into a `#[test]` driven by a runtime.
//! - `join!` polls several futures concurrently inside the current task.
//!
//! All three are re-exported by the `baton` crate.

mod utils;

use proc_macro::{TokenStream, TokenTree};

/// Awaits several futures concurrently and returns their outputs as a tuple.
///
/// Futures are polled in argument order on every wake-up of the enclosing
/// task, so the first argument is always the first to start.
#[proc_macro]
pub fn join(input: TokenStream) -> TokenStream {
    let args = utils::split_args(input);
    let count = args.len();

    if count == 0 {
        return "()".parse().unwrap();
    }

    if count == 1 {
        let expr = utils::tokens_to_string(&args[0]);
        return format!("{{ ({expr}).await }}").parse().unwrap();
    }

    let mut output = String::new();
    output.push_str("{\n");

    for (i, expr_tokens) in args.iter().enumerate() {
        let idx = i + 1;
        let expr = utils::tokens_to_string(expr_tokens);
        output.push_str(&format!(
            "let mut __f{idx} = (::std::boxed::Box::pin({expr}), ::core::option::Option::None::<_>, false);\n"
        ));
    }

    output.push_str("::std::future::poll_fn(move |cx| {\n");
    output.push_str("    use ::std::future::Future;\n");
    output.push_str("    use ::std::task::Poll;\n");

    for i in 1..=count {
        output.push_str(&format!(
            "    if !__f{i}.2 {{\n\
                    if let Poll::Ready(val) = __f{i}.0.as_mut().poll(cx) {{\n\
                        __f{i}.1 = ::core::option::Option::Some(val);\n\
                        __f{i}.2 = true;\n\
                    }}\n\
                }}\n"
        ));
    }

    let all_done = (1..=count)
        .map(|i| format!("__f{i}.2"))
        .collect::<Vec<_>>()
        .join(" && ");

    output.push_str(&format!("    if {all_done} {{\n"));
    output.push_str("        Poll::Ready((\n");

    for i in 1..=count {
        output.push_str(&format!("            __f{i}.1.take().unwrap(),\n"));
    }

    output.push_str("        ))\n");
    output.push_str("    } else {\n");
    output.push_str("        Poll::Pending\n");
    output.push_str("    }\n");
    output.push_str("}).await\n");
    output.push_str("}\n");

    match output.parse::<TokenStream>() {
        Ok(ts) => ts,
        Err(err) => {
            let msg = format!("join macro error: {}", err);
            format!("compile_error!(\"{}\");", msg).parse().unwrap()
        }
    }
}

/// Runs an `async fn main` on a fresh runtime.
///
/// Accepts an optional `queue_capacity = N` argument forwarded to
/// `RuntimeBuilder::queue_capacity`.
#[proc_macro_attribute]
pub fn main(attr: TokenStream, item: TokenStream) -> TokenStream {
    let builder = utils::runtime_builder(&attr.to_string());

    match utils::wrap_async_body(item, &builder) {
        Some(tokens) => tokens.into_iter().collect(),
        None => TokenStream::new(),
    }
}

/// Runs an `async fn` test on a fresh runtime.
///
/// Accepts the same `queue_capacity = N` argument as `#[baton::main]`.
#[proc_macro_attribute]
pub fn test(attr: TokenStream, item: TokenStream) -> TokenStream {
    let builder = utils::runtime_builder(&attr.to_string());

    let Some(tokens) = utils::wrap_async_body(item, &builder) else {
        return TokenStream::new();
    };

    let test_attr: TokenStream = "#[::core::prelude::v1::test]".parse().unwrap();
    let mut result: Vec<TokenTree> = test_attr.into_iter().collect();
    result.extend(tokens);

    result.into_iter().collect()
}
