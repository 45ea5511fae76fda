//! Integration tests for serialization: compact and pretty output, media
//! block grouping, selector-list re-joining, and round-trip stability.

use csscade::{FormatOptions, ParseOptions, parse, parse_with_options};

fn with_lists(css: &str) -> csscade::Stylesheet {
    let opts = ParseOptions {
        selector_lists: true,
        ..ParseOptions::default()
    };
    parse_with_options(css, &opts).unwrap()
}

// ============================================================================
// COMPACT OUTPUT
// ============================================================================

#[test]
fn test_compact_single_rule() {
    let sheet = parse("h1 { color: red; margin: 0; }").unwrap();
    assert_eq!(
        sheet.to_css(&FormatOptions::default()),
        "h1 { color: red; margin: 0; }\n"
    );
}

#[test]
fn test_compact_empty_rule() {
    let sheet = parse("h1 { }").unwrap();
    assert_eq!(sheet.to_css(&FormatOptions::default()), "h1 { }\n");
}

#[test]
fn test_important_is_rendered() {
    let sheet = parse("h1 { color: red !important; }").unwrap();
    assert_eq!(
        sheet.to_css(&FormatOptions::default()),
        "h1 { color: red !important; }\n"
    );
}

#[test]
fn test_display_uses_compact_format() {
    let sheet = parse("h1 { color: red; }").unwrap();
    assert_eq!(sheet.to_string(), "h1 { color: red; }\n");
}

// ============================================================================
// PRETTY OUTPUT
// ============================================================================

#[test]
fn test_pretty_single_rule() {
    let sheet = parse("h1 { color: red; margin: 0; }").unwrap();
    assert_eq!(
        sheet.to_css(&FormatOptions::pretty()),
        "h1 {\n  color: red;\n  margin: 0;\n}\n"
    );
}

#[test]
fn test_pretty_wraps_long_selector_lists() {
    let css = ".alpha-component, .beta-component, .gamma-component { color: red; }";
    let sheet = with_lists(css);
    let opts = FormatOptions {
        max_line_length: 30,
        ..FormatOptions::pretty()
    };
    let out = sheet.to_css(&opts);
    assert!(out.contains(",\n"));
    assert!(out.starts_with(".alpha-component,\n"));
}

// ============================================================================
// SELECTOR-LIST GROUPING
// ============================================================================

#[test]
fn test_selector_list_is_rejoined() {
    let sheet = with_lists("h1, h2 { color: red; }");
    assert_eq!(
        sheet.to_css(&FormatOptions::default()),
        "h1, h2 { color: red; }\n"
    );
}

#[test]
fn test_untracked_lists_serialize_separately() {
    let sheet = parse("h1, h2 { color: red; }").unwrap();
    assert_eq!(
        sheet.to_css(&FormatOptions::default()),
        "h1 { color: red; }\nh2 { color: red; }\n"
    );
}

#[test]
fn test_divergent_members_are_emitted_separately() {
    let flat = with_lists("h1, h2, h3 { color: red; } h3 { color: blue; }").flatten();
    assert_eq!(
        flat.to_css(&FormatOptions::default()),
        "h1, h2 { color: red; }\nh3 { color: blue; }\n"
    );
}

// ============================================================================
// MEDIA BLOCKS
// ============================================================================

#[test]
fn test_media_block_wraps_rules() {
    let sheet = parse("@media print { h1 { color: red; } }").unwrap();
    assert_eq!(
        sheet.to_css(&FormatOptions::default()),
        "@media print {\n  h1 { color: red; }\n}\n"
    );
}

#[test]
fn test_consecutive_rules_share_one_media_block() {
    let css = "@media print { h1 { color: red; } h2 { color: blue; } }";
    let sheet = parse(css).unwrap();
    let out = sheet.to_css(&FormatOptions::default());
    assert_eq!(out.matches("@media print").count(), 1);
    assert_eq!(
        out,
        "@media print {\n  h1 { color: red; }\n  h2 { color: blue; }\n}\n"
    );
}

#[test]
fn test_context_change_closes_and_reopens() {
    let css = "@media print { h1 { color: red; } } \
               h2 { color: blue; } \
               @media screen { h3 { color: green; } }";
    let out = parse(css).unwrap().to_css(&FormatOptions::default());
    assert_eq!(
        out,
        "@media print {\n  h1 { color: red; }\n}\n\
         h2 { color: blue; }\n\
         @media screen {\n  h3 { color: green; }\n}\n"
    );
}

#[test]
fn test_media_query_list_is_rendered() {
    let sheet = parse("@media screen, print { h1 { color: red; } }").unwrap();
    let out = sheet.to_css(&FormatOptions::default());
    assert!(out.starts_with("@media screen, print {\n"));
}

// ============================================================================
// AT-RULES, CHARSET, IMPORTS
// ============================================================================

#[test]
fn test_charset_and_imports_come_first() {
    let css = "@charset \"UTF-8\"; @import url(\"a.css\") print; h1 { color: red; }";
    let out = parse(css).unwrap().to_css(&FormatOptions::default());
    assert_eq!(
        out,
        "@charset \"UTF-8\";\n@import url(\"a.css\") print;\nh1 { color: red; }\n"
    );
}

#[test]
fn test_keyframes_are_re_nested() {
    let css = "@keyframes spin { 0% { opacity: 0; } 100% { opacity: 1; } }";
    let out = parse(css).unwrap().to_css(&FormatOptions::default());
    assert_eq!(
        out,
        "@keyframes spin {\n  0% { opacity: 0; }\n  100% { opacity: 1; }\n}\n"
    );
}

#[test]
fn test_font_face_is_rendered() {
    let css = "@font-face { font-family: Mono; src: url(mono.woff2); }";
    let out = parse(css).unwrap().to_css(&FormatOptions::default());
    assert_eq!(
        out,
        "@font-face { font-family: Mono; src: url(mono.woff2); }\n"
    );
}

#[test]
fn test_layer_statement_is_rendered() {
    let out = parse("@layer base, components;")
        .unwrap()
        .to_css(&FormatOptions::default());
    assert_eq!(out, "@layer base, components;\n");
}

// ============================================================================
// ROUND-TRIP STABILITY
// ============================================================================

#[test]
fn test_serialization_is_stable_under_reparse() {
    let css = "@charset \"UTF-8\"; \
               h1, h2 { color: red; } \
               @media print { h3 { margin: 1px 2px; } } \
               @keyframes k { 0% { top: 0; } }";
    let opts = ParseOptions {
        selector_lists: true,
        ..ParseOptions::default()
    };
    let fmt = FormatOptions::default();

    let first = parse_with_options(css, &opts).unwrap().to_css(&fmt);
    let second = parse_with_options(&first, &opts).unwrap().to_css(&fmt);
    assert_eq!(first, second);
}
