// SPDX-FileCopyrightText: 2025 Alexandre Gomes Gaigalas <alganet@gmail.com>
//
// SPDX-License-Identifier: ISC

//! Response body classification by content type.

/// How a proxied response body gets rewritten before it is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    /// `text/html`: host rewriting plus head injection.
    Html,
    /// Other text-like types (XML, JSON, plain text): host rewriting only.
    Text,
    /// Everything else passes through byte-for-byte.
    Binary,
}

impl BodyKind {
    pub fn from_content_type(content_type: Option<&str>) -> Self {
        let Some(raw) = content_type else {
            return BodyKind::Binary;
        };
        let mime = raw.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
        if mime.starts_with("text/html") {
            return BodyKind::Html;
        }
        if mime.starts_with("text/") {
            return BodyKind::Text;
        }
        if let Some(subtype) = mime.strip_prefix("application/") {
            if subtype == "xml"
                || subtype == "json"
                || subtype.ends_with("+xml")
                || subtype.ends_with("+json")
            {
                return BodyKind::Text;
            }
        }
        BodyKind::Binary
    }
}
