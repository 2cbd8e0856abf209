// SPDX-FileCopyrightText: 2025 Alexandre Gomes Gaigalas <alganet@gmail.com>
//
// SPDX-License-Identifier: ISC

//! Sentinel comment pair delimiting the head injection region.
//!
//! Two dialects coexist. Rendered HTML carries the bare comment markers; raw
//! template XML wraps each marker in a `<b:comment>` directive so the Blogger
//! engine never emits the sentinel as visible markup from one of its
//! conditional branches. Callers pick the dialect for the document they hold.

pub const HEAD_BEGIN: &str = "<!--blogger-plugin:head:begin-->";
pub const HEAD_END: &str = "<!--blogger-plugin:head:end-->";

pub const HEAD_BEGIN_TEMPLATE: &str = "<b:comment><!--blogger-plugin:head:begin--></b:comment>";
pub const HEAD_END_TEMPLATE: &str = "<b:comment><!--blogger-plugin:head:end--></b:comment>";

fn marker_pair(wrapped: bool) -> (&'static str, &'static str) {
    if wrapped {
        (HEAD_BEGIN_TEMPLATE, HEAD_END_TEMPLATE)
    } else {
        (HEAD_BEGIN, HEAD_END)
    }
}

// First begin marker, then the first end marker after it. Returns the byte
// range of the content strictly between the two.
fn find_region(input: &str, begin: &str, end: &str) -> Option<(usize, usize)> {
    let begin_at = input.find(begin)?;
    let content_start = begin_at + begin.len();
    let end_rel = input[content_start..].find(end)?;
    Some((content_start, content_start + end_rel))
}

/// Extract the text strictly between the first marker pair, or `None` when
/// no complete pair exists.
pub fn head_comment(input: &str, wrapped: bool) -> Option<&str> {
    let (begin, end) = marker_pair(wrapped);
    let (start, stop) = find_region(input, begin, end)?;
    Some(&input[start..stop])
}

/// Replace the content of the first marker pair, keeping the markers
/// themselves. Input without a complete pair is returned unchanged.
pub fn replace_head_comment(input: &str, replacement: &str, wrapped: bool) -> String {
    let (begin, end) = marker_pair(wrapped);
    match find_region(input, begin, end) {
        Some((start, stop)) => {
            let mut out = String::with_capacity(input.len() + replacement.len());
            out.push_str(&input[..start]);
            out.push_str(replacement);
            out.push_str(&input[stop..]);
            out
        }
        None => input.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare_doc(content: &str) -> String {
        format!("<head>{HEAD_BEGIN}{content}{HEAD_END}</head>")
    }

    #[test]
    fn absent_markers_extract_none() {
        assert_eq!(head_comment("<head></head>", false), None);
        assert_eq!(head_comment("<head></head>", true), None);
    }

    #[test]
    fn absent_markers_replace_is_identity() {
        let input = "<head></head>";
        assert_eq!(replace_head_comment(input, "x", false), input);
    }

    #[test]
    fn begin_without_end_is_incomplete() {
        let input = format!("<head>{HEAD_BEGIN}dangling</head>");
        assert_eq!(head_comment(&input, false), None);
        assert_eq!(replace_head_comment(&input, "x", false), input);
    }

    #[test]
    fn extracts_content_between_markers() {
        let input = bare_doc("<script></script>");
        assert_eq!(head_comment(&input, false), Some("<script></script>"));
    }

    #[test]
    fn replace_preserves_markers() {
        let out = replace_head_comment(&bare_doc("old"), "new", false);
        assert_eq!(out, bare_doc("new"));
    }

    #[test]
    fn extract_after_replace_returns_replacement() {
        let out = replace_head_comment(&bare_doc("old"), "<link>", false);
        assert_eq!(head_comment(&out, false), Some("<link>"));
    }

    #[test]
    fn duplicate_pairs_touch_only_the_first() {
        let input = format!("{}{}", bare_doc("one"), bare_doc("two"));
        assert_eq!(head_comment(&input, false), Some("one"));
        let out = replace_head_comment(&input, "X", false);
        assert_eq!(out, format!("{}{}", bare_doc("X"), bare_doc("two")));
    }

    #[test]
    fn wrapped_dialect_matches_template_markers() {
        let input =
            format!("<b:skin/>{HEAD_BEGIN_TEMPLATE}<b:tag/>{HEAD_END_TEMPLATE}<b:section/>");
        assert_eq!(head_comment(&input, true), Some("<b:tag/>"));
        let out = replace_head_comment(&input, "<link>", true);
        assert_eq!(
            out,
            format!("<b:skin/>{HEAD_BEGIN_TEMPLATE}<link>{HEAD_END_TEMPLATE}<b:section/>")
        );
    }

    #[test]
    fn wrapped_lookup_ignores_bare_only_markers() {
        let input = bare_doc("content");
        assert_eq!(head_comment(&input, true), None);
    }
}
