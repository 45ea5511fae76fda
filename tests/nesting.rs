//! Integration tests for nesting resolution: `&` substitution, implicit
//! descendant nesting, comma-list products, and the recursion ceiling.

use csscade::{CssError, Limits, ParseOptions, parse, parse_with_options};

// ============================================================================
// PARENT SELECTOR (&)
// ============================================================================

#[test]
fn test_ampersand_is_substituted() {
    let css = ".button { color: white; &.active { color: green; } }";
    let sheet = parse(css).unwrap();
    let rules: Vec<_> = sheet.rules().collect();
    assert_eq!(rules.len(), 2);
    assert_eq!(rules[0].selector, ".button");
    assert_eq!(rules[1].selector, ".button.active");
}

#[test]
fn test_ampersand_pseudo_class() {
    let css = "a { color: blue; &:hover { color: red; } }";
    let sheet = parse(css).unwrap();
    let rules: Vec<_> = sheet.rules().collect();
    assert_eq!(rules[1].selector, "a:hover");
}

#[test]
fn test_parent_emitted_before_children() {
    let css = ".card { padding: 0; .title { color: red; } .body { color: gray; } }";
    let sheet = parse(css).unwrap();
    let selectors: Vec<_> = sheet.rules().map(|r| r.selector.as_str()).collect();
    assert_eq!(selectors, vec![".card", ".card .title", ".card .body"]);
}

// ============================================================================
// IMPLICIT DESCENDANT NESTING
// ============================================================================

#[test]
fn test_bare_nested_selector_becomes_descendant() {
    let css = "#card { .title { color: red; } }";
    let sheet = parse(css).unwrap();
    // The parent block has no declarations of its own, so only the nested
    // rule is emitted.
    assert_eq!(sheet.len(), 1);
    assert_eq!(sheet.rules().next().unwrap().selector, "#card .title");
}

#[test]
fn test_deeply_nested_selectors_accumulate() {
    let css = "nav { ul { li { color: red; } } }";
    let sheet = parse(css).unwrap();
    assert_eq!(sheet.rules().next().unwrap().selector, "nav ul li");
}

#[test]
fn test_comma_lists_take_the_product() {
    let css = ".a, .b { &:hover { color: red; } }";
    let sheet = parse(css).unwrap();
    let selectors: Vec<_> = sheet.rules().map(|r| r.selector.as_str()).collect();
    assert_eq!(selectors, vec![".a:hover", ".b:hover"]);
}

#[test]
fn test_nested_rules_flatten_like_flat_ones() {
    let css = ".btn { color: red; &.primary { color: blue; } } \
               .btn.primary { margin: 0; }";
    let flat = parse(css).unwrap().flatten();
    let primary = flat
        .rules()
        .find(|r| r.selector == ".btn.primary")
        .unwrap();
    assert_eq!(primary.declarations.len(), 2);
}

// ============================================================================
// RECURSION CEILING
// ============================================================================

#[test]
fn test_nesting_depth_ceiling_is_enforced() {
    let mut css = String::new();
    for _ in 0..80 {
        css.push_str("a {");
    }
    css.push_str("color: red;");
    for _ in 0..80 {
        css.push('}');
    }
    let err = parse(&css).unwrap_err();
    assert!(matches!(err, CssError::NestingTooDeep { .. }));
}

#[test]
fn test_depth_within_ceiling_parses() {
    let opts = ParseOptions {
        limits: Limits {
            max_nesting_depth: 8,
            ..Limits::default()
        },
        ..ParseOptions::default()
    };
    let css = "a { b { c { color: red; } } }";
    let sheet = parse_with_options(css, &opts).unwrap();
    assert_eq!(sheet.rules().next().unwrap().selector, "a b c");
}
