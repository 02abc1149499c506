//! Source transformation: extraction of embedded reference directives and
//! import statements, and synthesis of the wrapper scaffold that lets a bare
//! async expression compile as a library.

use once_cell::sync::Lazy;
use regex::Regex;

/// `#r "token"` at line start (leading whitespace and an optional line
/// comment marker tolerated).
static REFERENCE_DIRECTIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^[ \t]*(?://)?\#r[ \t]+"([^"]+)""#).expect("reference directive pattern")
});

/// `using <namespace>;` at line start.
static USING_STATEMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*(using[ \t]+[^ \t]+[ \t]*;)").expect("using pattern"));

/// Remove every reference directive from the source and collect its tokens
/// in first-to-last order of appearance. Returns the stripped source and the
/// tokens.
pub fn extract_references(source: &str) -> (String, Vec<String>) {
    let mut source = source.to_string();
    let mut tokens = Vec::new();
    while let Some(captures) = REFERENCE_DIRECTIVE.captures(&source) {
        let matched = captures.get(0).expect("whole match");
        tokens.push(captures[1].to_string());
        source.replace_range(matched.range(), "");
    }
    (source, tokens)
}

/// Remove every import statement from the source and concatenate them, in
/// order, into a prefix string. Returns the stripped source and the prefix.
pub fn extract_usings(source: &str) -> (String, String) {
    let mut source = source.to_string();
    let mut usings = String::new();
    while let Some(captures) = USING_STATEMENT.captures(&source) {
        let matched = captures.get(0).expect("whole match");
        usings.push_str(&captures[1]);
        source.replace_range(matched.range(), "");
    }
    (source, usings)
}

/// Wrap a bare async expression in the fixed library scaffold: one class
/// with one async method that binds the expression to a function-typed local
/// and invokes it with the method's input parameter.
pub fn synthesize_wrapper(usings: &str, body: &str) -> String {
    format!(
        r#"{usings}
using System;
using System.Threading.Tasks;

public class Startup
{{
    public async Task<object> Invoke(object ___input)
    {{
        Func<object, Task<object>> func = {body};
#line hidden
        return await func(___input);
    }}
}}
"#
    )
}
