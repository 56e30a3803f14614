// Copyright 2026 Paul Adamson
// Licensed under the Apache License, Version 2.0
//
// Function source reconstruction
//
// Functions reach the browser as source text. Arrow functions and
// `function` expressions can be sent as-is; method shorthand
// (`foo(a) { ... }`, `async foo() { ... }`) is not a standalone expression
// and is rewritten into a `function` expression first. Exactly one rewrite
// is attempted.

use crate::error::{Error, Result};
use regex::Regex;
use std::sync::LazyLock;

/// Script URL attached to every evaluated script for debugger attribution.
pub const EVALUATION_SCRIPT_URL: &str = "__cdp_bridge_evaluation_script__";

static SOURCE_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[\x20\t]*//[@#] sourceURL=\s*(\S*?)\s*$").expect("valid sourceURL regex")
});

static FUNCTION_HEAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(async\s+)?function(?:\s*\(|\s*\*\s*(?:[A-Za-z_$][\w$]*)?\s*\(|\s+[A-Za-z_$][\w$]*\s*\()",
    )
    .expect("valid function head regex")
});

static SIMPLE_ARROW_HEAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(async\s+)?[A-Za-z_$][\w$]*\s*=>").expect("valid arrow head regex")
});

static ASYNC_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^async\s+").expect("valid async prefix regex"));

// `async(a) => a` needs no space before the parameter list
static ASYNC_ARROW_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^async\s*\(").expect("valid async arrow regex"));

/// Appends the sourceURL marker unless the script already names one.
pub fn with_source_url(expression: &str) -> String {
    if SOURCE_URL_REGEX.is_match(expression) {
        expression.to_string()
    } else {
        format!("{}\n//# sourceURL={}", expression, EVALUATION_SCRIPT_URL)
    }
}

/// Function declaration text sent with `Runtime.callFunctionOn`.
pub fn with_function_source_url(function_text: &str) -> String {
    format!("{}\n//# sourceURL={}\n", function_text, EVALUATION_SCRIPT_URL)
}

/// The ordered rewrites tried for a function's source: the text itself,
/// then the method-shorthand rewrite.
pub fn candidates(source: &str) -> [String; 2] {
    let source = source.trim();
    let rewritten = match ASYNC_PREFIX.find(source) {
        Some(prefix) => format!("async function {}", &source[prefix.end()..]),
        None => format!("function {}", source),
    };
    [source.to_string(), rewritten]
}

/// Picks the first candidate that reads as a standalone function expression.
///
/// Fails with [`Error::UnserializableFunction`] when neither the original
/// text nor its rewrite qualifies.
pub fn serialize_function(source: &str) -> Result<String> {
    candidates(source)
        .into_iter()
        .find(|candidate| is_function_expression(candidate))
        .ok_or(Error::UnserializableFunction)
}

/// Whether `text` is a function expression or an arrow function.
pub fn is_function_expression(text: &str) -> bool {
    let text = text.trim();
    if text.is_empty() {
        return false;
    }
    if FUNCTION_HEAD.is_match(text) {
        return text.ends_with('}');
    }
    if let Some(head) = SIMPLE_ARROW_HEAD.find(text) {
        return !text[head.end()..].trim().is_empty();
    }
    is_parenthesized_arrow(text)
}

// `(a, b) => ...` and `async (a) => ...`
fn is_parenthesized_arrow(text: &str) -> bool {
    let rest = match ASYNC_ARROW_PREFIX.find(text) {
        Some(prefix) => &text[prefix.end() - 1..],
        None => text,
    };
    let Some(close) = matching_paren(rest) else {
        return false;
    };
    let after = rest[close + 1..].trim_start();
    match after.strip_prefix("=>") {
        Some(body) => !body.trim().is_empty(),
        None => false,
    }
}

// Byte index of the paren closing the one `text` starts with.
fn matching_paren(text: &str) -> Option<usize> {
    if !text.starts_with('(') {
        return None;
    }
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (index, ch) in text.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == q {
                quote = None;
            }
            continue;
        }
        match ch {
            '\'' | '"' | '`' => quote = Some(ch),
            '(' => depth += 1,
            ')' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(index);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arrow_functions_pass_through() {
        for source in [
            "() => 1",
            "(a, b) => a + b",
            "x => x * 2",
            "async () => await fetch('/')",
            "async el => el.textContent",
            "(node, [a, b] = [1, (2)]) => { return node; }",
            "(s = ')') => s",
            "async(a) => a",
            "async  (a, b) => a + b",
        ] {
            assert_eq!(serialize_function(source).unwrap(), source, "{source}");
        }
    }

    #[test]
    fn test_function_expressions_pass_through() {
        for source in [
            "function() { return 1; }",
            "function named(a) { return a; }",
            "async function (x) { return x; }",
            "function* gen() { yield 1; }",
            "function*() { yield 1; }",
            "function (a) { return a; }",
        ] {
            assert_eq!(serialize_function(source).unwrap(), source, "{source}");
        }
    }

    #[test]
    fn test_method_shorthand_gets_function_prefix() {
        assert_eq!(
            serialize_function("foo(a) { return a; }").unwrap(),
            "function foo(a) { return a; }"
        );
        for name in ["functionName", "functional", "function$x", "asyncFoo"] {
            let source = format!("{name}(a) {{ return a; }}");
            assert_eq!(
                serialize_function(&source).unwrap(),
                format!("function {source}"),
                "{source}"
            );
        }
        assert_eq!(
            serialize_function("async functionName() { return 1; }").unwrap(),
            "async function functionName() { return 1; }"
        );
    }

    #[test]
    fn test_async_method_shorthand_reinserts_async() {
        assert_eq!(
            serialize_function("async foo() { return 1; }").unwrap(),
            "async function foo() { return 1; }"
        );
    }

    #[test]
    fn test_unserializable_after_both_candidates() {
        for source in ["document.title", "", "{ a: 1 }", "(a) =>", "get x() { return 1; }"] {
            assert!(
                matches!(serialize_function(source), Err(Error::UnserializableFunction)),
                "{source:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_candidates_are_ordered() {
        let [first, second] = candidates("  bar() {}  ");
        assert_eq!(first, "bar() {}");
        assert_eq!(second, "function bar() {}");
    }

    #[test]
    fn test_source_url_appended_once() {
        let marked = with_source_url("1 + 1");
        assert_eq!(marked, format!("1 + 1\n//# sourceURL={}", EVALUATION_SCRIPT_URL));
        assert_eq!(with_source_url(&marked), marked);

        let custom = "window.x\n  //@ sourceURL=custom.js  ";
        assert_eq!(with_source_url(custom), custom);
    }

    #[test]
    fn test_function_source_url_suffix() {
        assert_eq!(
            with_function_source_url("() => 1"),
            format!("() => 1\n//# sourceURL={}\n", EVALUATION_SCRIPT_URL)
        );
    }
}
