// SPDX-FileCopyrightText: 2025 Alexandre Gomes Gaigalas <alganet@gmail.com>
//
// SPDX-License-Identifier: ISC

//! Markup generation for head injection and the synthesized error page.

use crate::markers;
use crate::rewrite::escape_html;

/// `<script type="module">` tag for a served module path.
pub fn module_script_tag(src: &str) -> String {
    format!(
        r#"<script type="module" src="{}"></script>"#,
        escape_html(src)
    )
}

/// `<link rel="stylesheet">` tag for an emitted stylesheet.
pub fn stylesheet_link_tag(href: &str) -> String {
    format!(r#"<link rel="stylesheet" href="{}">"#, escape_html(href))
}

/// Head markup injected during live development: one module script tag
/// loading the frontend entry straight from the dev server root.
pub fn dev_head_markup(entry_rel: &str) -> String {
    module_script_tag(&format!("/{entry_rel}"))
}

/// Replace the bare marker region of a rendered HTML document.
pub fn inject_into_html(html: &str, markup: &str) -> String {
    markers::replace_head_comment(html, markup, false)
}

/// Error page returned when the upstream fetch fails. Keeps the dev session
/// alive with a reload button instead of surfacing a raw error.
pub fn error_page(url: &str) -> String {
    format!(
        "<!DOCTYPE html>\n\
         <html>\n\
         <head><meta charset=\"utf-8\"><title>500 Internal Server Error</title></head>\n\
         <body>\n\
         <h1>500 Internal Server Error</h1>\n\
         <p>Could not reach <code>{}</code>.</p>\n\
         <p><button onclick=\"location.reload()\">Reload</button></p>\n\
         </body>\n\
         </html>\n",
        escape_html(url)
    )
}
