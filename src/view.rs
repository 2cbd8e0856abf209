// SPDX-FileCopyrightText: 2025 Alexandre Gomes Gaigalas <alganet@gmail.com>
//
// SPDX-License-Identifier: ISC

//! Dev/preview mode signalling through the `view` query parameter.
//!
//! Blogger uses `view` to select template branches; this proxy additionally
//! smuggles its own mode through the same parameter so the origin (and the
//! proxy itself, when a redirect bounces back) can tell proxied traffic from
//! an ordinary visit. Dash-prefixed view names are the reserved internal
//! namespace.

use url::Url;

/// Which injection strategy the proxy runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServeMode {
    /// Live development: inject a module script tag for the entry file.
    Dev,
    /// Preview of a build: reinject the tags baked into the built template.
    Preview,
}

impl ServeMode {
    /// Reserved suffix appended to the `view` parameter on outbound requests.
    pub fn suffix(self) -> &'static str {
        match self {
            ServeMode::Dev => "-DevServer",
            ServeMode::Preview => "-PreviewServer",
        }
    }
}

const MODE_SUFFIXES: &[&str] = &["-DevServer", "-PreviewServer"];

/// Overwrite the `view` parameter to carry the mode suffix.
///
/// An existing dash-prefixed (internal) view name is kept in front of the
/// suffix; a visitor-facing name is replaced outright. The parameter is added
/// when absent. Other parameters and their order are untouched.
pub fn rewrite_view_param(url: &mut Url, mode: ServeMode) {
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let mut out: Vec<(String, String)> = Vec::with_capacity(pairs.len() + 1);
    let mut seen = false;
    for (k, v) in pairs {
        if k == "view" {
            if seen {
                continue;
            }
            seen = true;
            let kept = if v.starts_with('-') { v.as_str() } else { "" };
            out.push((k, format!("{kept}{}", mode.suffix())));
        } else {
            out.push((k, v));
        }
    }
    if !seen {
        out.push(("view".to_string(), mode.suffix().to_string()));
    }
    set_query(url, &out);
}

/// Remove the internal mode suffix from the `view` parameter, restoring the
/// original view name or dropping the parameter when nothing remains.
pub fn strip_view_suffix(url: &mut Url) {
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let mut out: Vec<(String, String)> = Vec::with_capacity(pairs.len());
    for (k, v) in pairs {
        if k == "view" {
            if let Some(stripped) = strip_suffix_any(&v) {
                if !stripped.is_empty() {
                    out.push((k, stripped.to_string()));
                }
                continue;
            }
        }
        out.push((k, v));
    }
    if out.is_empty() {
        url.set_query(None);
    } else {
        set_query(url, &out);
    }
}

fn strip_suffix_any(view: &str) -> Option<&str> {
    MODE_SUFFIXES.iter().find_map(|s| view.strip_suffix(s))
}

fn set_query(url: &mut Url, pairs: &[(String, String)]) {
    url.query_pairs_mut()
        .clear()
        .extend_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())));
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn url(s: &str) -> Url {
        Url::parse(s).expect("test url")
    }

    #[rstest]
    #[case("https://blog.example/foo?view=bar", ServeMode::Dev, Some("-DevServer"))]
    #[case("https://blog.example/foo", ServeMode::Dev, Some("-DevServer"))]
    #[case("https://blog.example/foo?view=bar", ServeMode::Preview, Some("-PreviewServer"))]
    #[case("https://blog.example/foo?view=-mobile", ServeMode::Dev, Some("-mobile-DevServer"))]
    fn rewrite_sets_mode_suffix(
        #[case] input: &str,
        #[case] mode: ServeMode,
        #[case] expected: Option<&str>,
    ) {
        let mut u = url(input);
        rewrite_view_param(&mut u, mode);
        let view = u
            .query_pairs()
            .find(|(k, _)| k == "view")
            .map(|(_, v)| v.into_owned());
        assert_eq!(view.as_deref(), expected);
    }

    #[test]
    fn rewrite_keeps_other_params_in_place() {
        let mut u = url("https://blog.example/search?q=rust&view=flipcard&max-results=5");
        rewrite_view_param(&mut u, ServeMode::Dev);
        assert_eq!(u.query(), Some("q=rust&view=-DevServer&max-results=5"));
    }

    #[test]
    fn strip_restores_original_view_name() {
        let mut u = url("https://blog.example/foo?view=-mobile-DevServer");
        strip_view_suffix(&mut u);
        assert_eq!(u.query(), Some("view=-mobile"));
    }

    #[test]
    fn strip_removes_empty_view_param() {
        let mut u = url("https://blog.example/foo?view=-DevServer");
        strip_view_suffix(&mut u);
        assert_eq!(u.query(), None);
    }

    #[test]
    fn strip_handles_preview_suffix() {
        let mut u = url("https://blog.example/foo?a=1&view=-PreviewServer");
        strip_view_suffix(&mut u);
        assert_eq!(u.query(), Some("a=1"));
    }

    #[test]
    fn strip_leaves_foreign_view_values_alone() {
        let mut u = url("https://blog.example/foo?view=flipcard");
        strip_view_suffix(&mut u);
        assert_eq!(u.query(), Some("view=flipcard"));
    }
}
