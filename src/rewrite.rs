// SPDX-FileCopyrightText: 2025 Alexandre Gomes Gaigalas <alganet@gmail.com>
//
// SPDX-License-Identifier: ISC

//! Pure string transforms shared by the proxy and the build injector.

use regex::Regex;

/// Escape a string for safe embedding into generated HTML markup.
///
/// Covers the characters that can break out of attribute values or element
/// content: `& < > " ' \``. Everything else passes through verbatim.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '`' => out.push_str("&#96;"),
            _ => out.push(c),
        }
    }
    out
}

/// Rewrite every reference to `old_host` in a text body to `new_host`.
///
/// A reference is the host preceded by an optional `http:`/`https:` protocol
/// and a literal `//`, including the `\/\/` form found in JSON-escaped and
/// XML-embedded URLs. The slash style is kept exactly as matched. The matched
/// protocol (or its absence) is kept when `new_protocol` is `None` and
/// replaced when it is `Some` (e.g. `Some("https:")`).
pub fn replace_host(
    input: &str,
    old_host: &str,
    new_host: &str,
    new_protocol: Option<&str>,
) -> String {
    let pattern = format!(r"(https?:)?(\\/\\/|//){}", regex::escape(old_host));
    let re = match Regex::new(&pattern) {
        Ok(re) => re,
        Err(_) => return input.to_string(),
    };
    re.replace_all(input, |caps: &regex::Captures<'_>| {
        let protocol = match new_protocol {
            Some(p) => p,
            None => caps.get(1).map(|m| m.as_str()).unwrap_or(""),
        };
        format!("{protocol}{}{new_host}", &caps[2])
    })
    .into_owned()
}
