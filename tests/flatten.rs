//! Integration tests for cascade flattening: precedence, shorthand folding,
//! selector-list divergence, idempotence, and invariants.

use csscade::{FormatOptions, ParseOptions, parse, parse_with_options};

fn with_lists(css: &str) -> csscade::Stylesheet {
    let opts = ParseOptions {
        selector_lists: true,
        ..ParseOptions::default()
    };
    parse_with_options(css, &opts).unwrap()
}

// ============================================================================
// PRECEDENCE
// ============================================================================

#[test]
fn test_later_wins_at_equal_specificity() {
    let flat = parse(".t { color: red; } .t { color: blue; }").unwrap().flatten();
    let rule = flat.rules().next().unwrap();
    assert_eq!(rule.declarations.len(), 1);
    assert_eq!(rule.declarations[0].value, "blue");
}

#[test]
fn test_important_dominates_source_order() {
    let flat = parse(".t { color: red !important; } .t { color: blue; }")
        .unwrap()
        .flatten();
    let decl = &flat.rules().next().unwrap().declarations[0];
    assert_eq!(decl.value, "red");
    assert!(decl.important);
}

#[test]
fn test_later_important_beats_earlier_important() {
    let flat = parse(".t { color: red !important; } .t { color: blue !important; }")
        .unwrap()
        .flatten();
    assert_eq!(flat.rules().next().unwrap().declarations[0].value, "blue");
}

#[test]
fn test_unrelated_properties_accumulate() {
    let flat = parse(".t { color: red; } .t { top: 0; }").unwrap().flatten();
    let rule = flat.rules().next().unwrap();
    assert_eq!(rule.declarations.len(), 2);
}

// ============================================================================
// SHORTHAND FOLDING
// ============================================================================

#[test]
fn test_longhands_contract_to_margin_shorthand() {
    let css = ".t { margin-top: 10px; margin-right: 10px; \
               margin-bottom: 10px; margin-left: 10px; }";
    let flat = parse(css).unwrap().flatten();
    let rule = flat.rules().next().unwrap();
    assert_eq!(rule.declarations.len(), 1);
    assert_eq!(rule.declarations[0].property, "margin");
    assert_eq!(rule.declarations[0].value, "10px");
}

#[test]
fn test_shorthand_overridden_by_later_longhand() {
    let flat = parse(".t { margin: 0; margin-top: 5px; }").unwrap().flatten();
    let rule = flat.rules().next().unwrap();
    assert_eq!(rule.declarations.len(), 1);
    assert_eq!(rule.declarations[0].value, "5px 0 0");
}

#[test]
fn test_border_contracts_through_component_shorthands() {
    let flat = parse(".t { border: 1px solid red; }").unwrap().flatten();
    let rule = flat.rules().next().unwrap();
    assert_eq!(rule.declarations.len(), 1);
    assert_eq!(rule.declarations[0].property, "border");
    assert_eq!(rule.declarations[0].value, "1px solid red");
}

#[test]
fn test_mixed_importance_blocks_contraction() {
    let flat = parse(".t { margin: 0; } .t { margin-top: 5px !important; }")
        .unwrap()
        .flatten();
    let rule = flat.rules().next().unwrap();
    // Four longhands remain because the flags disagree.
    assert_eq!(rule.declarations.len(), 4);
    let top = rule
        .declarations
        .iter()
        .find(|d| d.property == "margin-top")
        .unwrap();
    assert_eq!(top.value, "5px");
    assert!(top.important);
}

#[test]
fn test_important_shorthand_stays_important() {
    let flat = parse(".t { margin: 0 !important; }").unwrap().flatten();
    let decl = &flat.rules().next().unwrap().declarations[0];
    assert_eq!(decl.property, "margin");
    assert!(decl.important);
}

// ============================================================================
// SELECTOR-LIST DIVERGENCE
// ============================================================================

#[test]
fn test_list_survives_when_members_stay_identical() {
    let flat = with_lists("h1, h2 { color: red; }").flatten();
    let rules: Vec<_> = flat.rules().collect();
    assert_eq!(rules.len(), 2);
    assert!(rules[0].selector_list_id.is_some());
    assert_eq!(rules[0].selector_list_id, rules[1].selector_list_id);
}

#[test]
fn test_divergent_member_clears_all_list_ids() {
    let flat = with_lists("h1, h2, h3 { color: red; } h3 { color: blue; }").flatten();
    let rules: Vec<_> = flat.rules().collect();
    assert_eq!(rules.len(), 3);

    let h3 = rules.iter().find(|r| r.selector == "h3").unwrap();
    assert_eq!(h3.declarations[0].value, "blue");
    assert_eq!(h3.selector_list_id, None);

    // h1 and h2 still agree, so their grouping survives.
    let h1 = rules.iter().find(|r| r.selector == "h1").unwrap();
    let h2 = rules.iter().find(|r| r.selector == "h2").unwrap();
    assert!(h1.selector_list_id.is_some());
    assert_eq!(h1.selector_list_id, h2.selector_list_id);
}

#[test]
fn test_divergence_by_declarations_clears_whole_list() {
    let flat = with_lists("h1, h2 { color: red; } h1 { color: blue; }").flatten();
    let rules: Vec<_> = flat.rules().collect();
    assert!(rules.iter().all(|r| r.selector_list_id.is_none()));
}

// ============================================================================
// STRUCTURE
// ============================================================================

#[test]
fn test_flatten_is_idempotent() {
    let css = "@charset \"UTF-8\"; \
               h1, h2 { margin: 1px 2px; } \
               @media print { h1 { color: red; } h1 { color: blue; } } \
               @keyframes k { 0% { top: 0; } } \
               .x { border-width: 1px; border-style: solid; border-color: red; }";
    let opts = ParseOptions {
        selector_lists: true,
        ..ParseOptions::default()
    };
    let once = parse_with_options(css, &opts).unwrap().flatten();
    let twice = once.flatten();
    let fmt = FormatOptions::default();
    assert_eq!(once.to_css(&fmt), twice.to_css(&fmt));
}

#[test]
fn test_flatten_preserves_sequential_ids() {
    let css = "a { top: 0; } @keyframes k { 0% { top: 0; } } a { left: 0; } b { top: 0; }";
    let flat = parse(css).unwrap().flatten();
    for (i, item) in flat.items.iter().enumerate() {
        assert_eq!(item.id(), i);
    }
    // Group `a` keeps its first slot, the at-rule keeps its relative one.
    assert_eq!(flat.items.len(), 3);
    assert!(flat.items[1].as_at_rule().is_some());
}

#[test]
fn test_flatten_in_place_matches_pure_flatten() {
    let css = ".t { color: red; } .t { color: blue; }";
    let pure = parse(css).unwrap().flatten();
    let mut in_place = parse(css).unwrap();
    in_place.flatten_in_place();
    let fmt = FormatOptions::default();
    assert_eq!(pure.to_css(&fmt), in_place.to_css(&fmt));
}

#[test]
fn test_charset_and_imports_are_carried() {
    let css = "@charset \"UTF-8\"; @import url(\"a.css\"); h1 { color: red; }";
    let flat = parse(css).unwrap().flatten();
    assert_eq!(flat.charset.as_deref(), Some("UTF-8"));
    assert_eq!(flat.imports.len(), 1);
}
