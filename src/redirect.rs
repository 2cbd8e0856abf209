// SPDX-FileCopyrightText: 2025 Alexandre Gomes Gaigalas <alganet@gmail.com>
//
// SPDX-License-Identifier: ISC

//! `Location` header rewriting for proxied redirects.

use url::Url;

use crate::headers::ForwardedOrigin;
use crate::view::strip_view_suffix;

fn authority(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}

/// Rewrite a redirect target back into developer-facing space.
///
/// The target is resolved against the proxied URL. Redirects landing on the
/// developer host or on the proxied origin are internal: the mode suffix is
/// stripped from the `view` parameter and only path + query + fragment are
/// emitted, keeping the browser on its own origin. Anything else resolves to
/// the absolute target with its host untouched. An unparsable target passes
/// through unchanged.
pub fn rewrite_location(
    location: &str,
    proxied_url: &Url,
    forward: Option<&ForwardedOrigin>,
    origin: &Url,
) -> String {
    let Ok(mut resolved) = proxied_url.join(location) else {
        return location.to_string();
    };
    let Some(resolved_authority) = authority(&resolved) else {
        return resolved.to_string();
    };

    let matches_forward =
        forward.is_some_and(|f| f.host.eq_ignore_ascii_case(&resolved_authority));
    let matches_origin =
        authority(origin).is_some_and(|a| a.eq_ignore_ascii_case(&resolved_authority));
    if !matches_forward && !matches_origin {
        return resolved.to_string();
    }

    strip_view_suffix(&mut resolved);
    let mut out = resolved.path().to_string();
    if let Some(query) = resolved.query() {
        if !query.is_empty() {
            out.push('?');
            out.push_str(query);
        }
    }
    if let Some(fragment) = resolved.fragment() {
        out.push('#');
        out.push_str(fragment);
    }
    out
}
