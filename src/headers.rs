// SPDX-FileCopyrightText: 2025 Alexandre Gomes Gaigalas <alganet@gmail.com>
//
// SPDX-License-Identifier: ISC

//! Header bridging between the inbound connection and the proxied request,
//! plus detection of the developer-facing origin.

use hyper::header::HeaderMap;

// RFC 7230 Section 6.1: hop-by-hop headers must not be forwarded by proxies.
static HOP_BY_HOP_HEADERS: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Response headers forwarded to the developer-facing client. Everything not
/// named here is dropped; `location` additionally goes through the redirect
/// rewriter.
pub const RESPONSE_ALLOW_LIST: &[&str] = &["content-type", "x-robots-tag", "date", "location"];

pub fn is_allowed_response_header(name: &str) -> bool {
    RESPONSE_ALLOW_LIST
        .iter()
        .any(|h| name.eq_ignore_ascii_case(h))
}

/// Copy inbound request headers onto the outbound proxied request.
///
/// Multi-value headers keep every value. `Host` is dropped (the client sets
/// it from the target URL), as are hop-by-hop headers.
pub fn bridge_request_headers(headers: &HeaderMap) -> HeaderMap {
    let mut out = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers.iter() {
        let name_str = name.as_str();
        if name_str == "host" || HOP_BY_HOP_HEADERS.contains(&name_str) {
            continue;
        }
        out.append(name.clone(), value.clone());
    }
    out
}

/// Developer-facing origin responses should be rewritten toward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardedOrigin {
    /// Protocol in `https:` form, ready to prefix a protocol-relative URL.
    pub protocol: String,
    /// Authority (`host[:port]`) the developer's browser is talking to.
    pub host: String,
}

fn first_header_value(value: &str) -> &str {
    value.split(',').next().unwrap_or(value).trim()
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Resolve the developer-facing protocol and host from forwarding headers,
/// falling back to the listener's own transport and the `Host` header.
/// `None` when no host can be determined at all.
pub fn forwarded_origin(headers: &HeaderMap, secure: bool) -> Option<ForwardedOrigin> {
    let protocol = header_str(headers, "x-forwarded-proto")
        .map(first_header_value)
        .filter(|p| !p.is_empty())
        .map(|p| format!("{p}:"))
        .unwrap_or_else(|| if secure { "https:".into() } else { "http:".into() });

    let host = header_str(headers, "x-forwarded-host")
        .map(first_header_value)
        .filter(|h| !h.is_empty())
        .or_else(|| {
            header_str(headers, "host")
                .map(first_header_value)
                .filter(|h| !h.is_empty())
        })?
        .to_string();

    Some(ForwardedOrigin { protocol, host })
}
