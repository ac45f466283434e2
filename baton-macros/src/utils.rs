use proc_macro::{Delimiter, Group, TokenStream, TokenTree};

/// Splits a `TokenStream` into comma-separated arguments.
///
/// Each argument is returned as a `Vec<TokenTree>`.
/// Commas at the top level are used as separators.
///
/// This function does **not** attempt to handle nested structures;
/// it assumes the input has already been tokenized appropriately
/// by the macro entry point.
pub(crate) fn split_args(input: TokenStream) -> Vec<Vec<TokenTree>> {
    let mut args = Vec::new();
    let mut current = Vec::new();

    for token in input {
        match &token {
            TokenTree::Punct(p) if p.as_char() == ',' => {
                if !current.is_empty() {
                    args.push(current);
                    current = Vec::new();
                }
            }
            _ => current.push(token),
        }
    }

    if !current.is_empty() {
        args.push(current);
    }

    args
}

/// Converts a slice of tokens into a Rust source string.
///
/// Token order is preserved. A space is inserted between two consecutive
/// word-like tokens (identifiers and literals) so they are not merged on
/// re-parsing, e.g. `1 as usize` must not become `1asusize`.
pub(crate) fn tokens_to_string(tokens: &[TokenTree]) -> String {
    let mut out = String::new();
    let mut prev_was_word = false;

    for t in tokens {
        let is_word = matches!(t, TokenTree::Ident(_) | TokenTree::Literal(_));

        if prev_was_word && is_word {
            out.push(' ');
        }

        out.push_str(&t.to_string());
        prev_was_word = is_word;
    }

    out
}

/// Builds the runtime constructor expression for `main`/`test` attributes.
///
/// The only recognised argument is `queue_capacity = N`; anything else is
/// ignored.
pub(crate) fn runtime_builder(attr: &str) -> String {
    let mut builder = String::from("::baton::RuntimeBuilder::new()");

    for part in attr.split(',') {
        let part = part.trim();
        if let Some(v) = part.strip_prefix("queue_capacity") {
            let v = v.trim().trim_start_matches('=').trim();
            if let Ok(n) = v.parse::<usize>() {
                builder.push_str(&format!(".queue_capacity({n})"));
            }
        }
    }

    builder.push_str(".build()");
    builder
}

/// Strips `async` from a function item and wraps its body in
/// `runtime.block_on(async move { ... })`.
///
/// Returns `None` if the item has no brace-delimited body.
pub(crate) fn wrap_async_body(item: TokenStream, builder: &str) -> Option<Vec<TokenTree>> {
    let mut tokens: Vec<TokenTree> = item.into_iter().collect();

    if let Some(pos) = tokens
        .iter()
        .position(|t| matches!(t, TokenTree::Ident(id) if id.to_string() == "async"))
    {
        tokens.remove(pos);
    }

    let pos = tokens
        .iter()
        .rposition(|t| matches!(t, TokenTree::Group(g) if g.delimiter() == Delimiter::Brace))?;

    let block = match &tokens[pos] {
        TokenTree::Group(g) => g.stream().to_string(),
        _ => unreachable!(),
    };

    let new_block = format!(
        "{{
            let runtime = {builder};
            runtime.block_on(async move {{ {block} }})
        }}"
    );

    tokens[pos] = TokenTree::Group(Group::new(Delimiter::Brace, new_block.parse().ok()?));

    Some(tokens)
}
