//! Glob matching for alias keys and `sideEffects` patterns.
//!
//! Alias keys need capture groups (`"./components/*": "./shared/$1"`), which
//! `glob::Pattern` does not offer, so alias globs are compiled to a
//! `regex_lite::Regex` with one group per wildcard. `sideEffects` only needs a
//! yes/no answer and uses `glob::Pattern` directly.

use glob::{MatchOptions, Pattern};
use regex_lite::Regex;

/// Whether a string contains glob syntax.
#[must_use]
pub fn is_glob(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.iter().enumerate().any(|(i, b)| match b {
        b'*' | b'?' => true,
        b'[' => s[i..].contains(']'),
        b'{' => s[i..].contains('}'),
        b'(' => i > 0 && matches!(bytes[i - 1], b'!' | b'@' | b'+'),
        _ => false,
    })
}

/// Compile a glob into an anchored regex with one capture group per
/// wildcard, brace set, and `?`.
///
/// - `**` matches across separators
/// - `*` matches within one path segment
/// - `?` matches one non-separator character
/// - `{a,b}` matches either alternative
/// - `[...]` is passed through as a character class
#[must_use]
pub fn glob_to_regex(glob: &str) -> Option<Regex> {
    let chars: Vec<char> = glob.chars().collect();
    let mut re = String::with_capacity(glob.len() * 2 + 2);
    re.push('^');

    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match c {
            '*' => {
                if chars.get(i + 1) == Some(&'*') {
                    re.push_str("(.*)");
                    i += 1;
                } else {
                    re.push_str("([^/]*)");
                }
            }
            '?' => re.push_str("([^/])"),
            '{' => {
                let close = chars[i..].iter().position(|&ch| ch == '}')? + i;
                let body: String = chars[i + 1..close].iter().collect();
                let alternatives: Vec<String> =
                    body.split(',').map(regex_lite::escape).collect();
                re.push('(');
                re.push_str(&alternatives.join("|"));
                re.push(')');
                i = close;
            }
            '[' => {
                let close = chars[i..].iter().position(|&ch| ch == ']')? + i;
                let body: String = chars[i + 1..close].iter().collect();
                re.push('[');
                if let Some(negated) = body.strip_prefix('!') {
                    re.push('^');
                    re.push_str(negated);
                } else {
                    re.push_str(&body);
                }
                re.push(']');
                i = close;
            }
            _ => re.push_str(&regex_lite::escape(&c.to_string())),
        }
        i += 1;
    }

    re.push('$');
    Regex::new(&re).ok()
}

/// Rewrite `value` using the captures of `glob` against `input`.
///
/// `$1`, `$2`, ... in `value` are replaced by the corresponding wildcard
/// captures. Returns `None` if the glob does not match.
#[must_use]
pub fn substitute(glob: &str, input: &str, value: &str) -> Option<String> {
    let re = glob_to_regex(glob)?;
    if !re.is_match(input) {
        return None;
    }
    // `$1abc` would be read as a group named `1abc`; brace every reference.
    let template = brace_group_refs(value);
    Some(re.replace(input, template.as_str()).into_owned())
}

fn brace_group_refs(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 4);
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '$' && chars.peek().is_some_and(char::is_ascii_digit) {
            out.push_str("${");
            while let Some(&d) = chars.peek() {
                if !d.is_ascii_digit() {
                    break;
                }
                out.push(d);
                chars.next();
            }
            out.push('}');
        } else {
            out.push(c);
        }
    }
    out
}

/// Match a path relative to a package root against a `sideEffects` glob.
///
/// Patterns without a `/` match the base name, so `*.css` matches
/// `styles/app.css`.
#[must_use]
pub fn matches_side_effects(pattern: &str, relative: &str) -> bool {
    let pattern = pattern.strip_prefix("./").unwrap_or(pattern);
    let relative = relative.strip_prefix("./").unwrap_or(relative);

    let target = if pattern.contains('/') {
        relative
    } else {
        relative.rsplit('/').next().unwrap_or(relative)
    };

    let options = MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    };

    match Pattern::new(pattern) {
        Ok(p) => p.matches_with(target, options),
        Err(_) => pattern == target,
    }
}
