//! Shorthand algebra: expansion of shorthand declarations into their
//! longhands, and opportunistic contraction of a longhand set back into the
//! shortest legal shorthand.
//!
//! Both operations are pure functions over property/value strings. Value
//! tokenization is paren- and quote-aware, so `calc()` expressions, quoted
//! font names, and function arguments stay atomic.
//!
//! The property tables are process-wide immutable statics, initialized once
//! and safe for concurrent reads.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use phf::{phf_map, phf_set};

use crate::parser::scan::value_tokens;
use crate::parser::stylesheet::Declaration;

/// Four-sided shorthand families, each mapping to its top/right/bottom/left
/// longhands.
static BOX_SIDES: phf::Map<&'static str, [&'static str; 4]> = phf_map! {
    "margin" => ["margin-top", "margin-right", "margin-bottom", "margin-left"],
    "padding" => ["padding-top", "padding-right", "padding-bottom", "padding-left"],
    "border-width" => [
        "border-top-width",
        "border-right-width",
        "border-bottom-width",
        "border-left-width",
    ],
    "border-style" => [
        "border-top-style",
        "border-right-style",
        "border-bottom-style",
        "border-left-style",
    ],
    "border-color" => [
        "border-top-color",
        "border-right-color",
        "border-bottom-color",
        "border-left-color",
    ],
};

/// Contraction visits the four-sided families in a fixed order so output is
/// deterministic regardless of table layout.
const BOX_FAMILIES: [&str; 5] = [
    "margin",
    "padding",
    "border-width",
    "border-style",
    "border-color",
];

/// Edge shorthands, each mapping to its width/style/color longhands.
static BORDER_EDGES: phf::Map<&'static str, [&'static str; 3]> = phf_map! {
    "border-top" => ["border-top-width", "border-top-style", "border-top-color"],
    "border-right" => ["border-right-width", "border-right-style", "border-right-color"],
    "border-bottom" => ["border-bottom-width", "border-bottom-style", "border-bottom-color"],
    "border-left" => ["border-left-width", "border-left-style", "border-left-color"],
};

static BORDER_STYLES: phf::Set<&'static str> = phf_set! {
    "none", "hidden", "dotted", "dashed", "solid", "double", "groove",
    "ridge", "inset", "outset",
};

static BORDER_WIDTH_KEYWORDS: phf::Set<&'static str> = phf_set! {
    "thin", "medium", "thick",
};

static FONT_STYLES: phf::Set<&'static str> = phf_set! { "italic", "oblique" };

static FONT_VARIANTS: phf::Set<&'static str> = phf_set! { "small-caps" };

static FONT_WEIGHTS: phf::Set<&'static str> = phf_set! {
    "bold", "bolder", "lighter",
    "100", "200", "300", "400", "500", "600", "700", "800", "900",
};

static FONT_SIZE_KEYWORDS: phf::Set<&'static str> = phf_set! {
    "xx-small", "x-small", "small", "medium", "large", "x-large",
    "xx-large", "smaller", "larger",
};

static LIST_STYLE_TYPES: phf::Set<&'static str> = phf_set! {
    "disc", "circle", "square", "decimal", "decimal-leading-zero",
    "lower-roman", "upper-roman", "lower-alpha", "upper-alpha",
    "lower-greek", "lower-latin", "upper-latin", "armenian", "georgian",
    "none",
};

static LIST_STYLE_POSITIONS: phf::Set<&'static str> = phf_set! {
    "inside", "outside",
};

static BACKGROUND_REPEATS: phf::Set<&'static str> = phf_set! {
    "repeat", "repeat-x", "repeat-y", "no-repeat",
};

static BACKGROUND_ATTACHMENTS: phf::Set<&'static str> = phf_set! {
    "scroll", "fixed",
};

static POSITION_KEYWORDS: phf::Set<&'static str> = phf_set! {
    "left", "right", "top", "bottom", "center",
};

static NAMED_COLORS: phf::Set<&'static str> = phf_set! {
    "aqua", "azure", "beige", "black", "blue", "brown", "coral", "crimson",
    "cyan", "fuchsia", "gold", "gray", "grey", "green", "indigo", "ivory",
    "khaki", "lavender", "lime", "magenta", "maroon", "navy", "olive",
    "orange", "orchid", "pink", "plum", "purple", "red", "salmon", "silver",
    "snow", "tan", "teal", "turquoise", "violet", "white", "yellow",
    "darkred", "darkblue", "darkgreen", "darkgray", "lightgray", "lightblue",
    "lightgreen", "transparent", "currentcolor",
};

/// Reverse lookup from a four-sided longhand to its owning family and side
/// index, derived from `BOX_SIDES` on first use.
static SIDE_OF: Lazy<HashMap<&'static str, (&'static str, usize)>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for (family, sides) in BOX_SIDES.entries() {
        for (index, side) in sides.iter().enumerate() {
            map.insert(*side, (*family, index));
        }
    }
    map
});

/// Whether a property is a shorthand this module knows how to expand.
pub fn is_shorthand(property: &str) -> bool {
    BOX_SIDES.contains_key(property)
        || BORDER_EDGES.contains_key(property)
        || matches!(property, "border" | "font" | "list-style" | "background")
}

/// Expands a shorthand declaration into its longhands, in canonical order.
///
/// Returns `None` for properties that are not shorthands and for values
/// that do not fit the shorthand's grammar, in which case the declaration
/// should be kept literally.
///
/// # Examples
///
/// ```
/// use csscade::expand;
///
/// let longhands = expand("margin", "10px 20px").unwrap();
/// assert_eq!(longhands[0], ("margin-top".to_string(), "10px".to_string()));
/// assert_eq!(longhands[1], ("margin-right".to_string(), "20px".to_string()));
/// assert_eq!(longhands[2], ("margin-bottom".to_string(), "10px".to_string()));
/// assert_eq!(longhands[3], ("margin-left".to_string(), "20px".to_string()));
/// ```
pub fn expand(property: &str, value: &str) -> Option<Vec<(String, String)>> {
    if let Some(sides) = BOX_SIDES.get(property) {
        return expand_box(sides, value);
    }
    if let Some(parts) = BORDER_EDGES.get(property) {
        return expand_border_like(parts, value);
    }
    match property {
        "border" => expand_border_like(&["border-width", "border-style", "border-color"], value),
        "font" => expand_font(value),
        "list-style" => expand_list_style(value),
        "background" => expand_background(value),
        _ => None,
    }
}

/// Contracts a longhand set back into one shorthand declaration.
///
/// All entries must belong to a single shorthand family and share the same
/// `!important` flag; four-sided families additionally require all four
/// sides, and `font` requires at least size and family. Border contraction
/// requires the style component; width or color alone stay as
/// `border-width` / `border-color`.
pub fn contract(longhands: &[Declaration]) -> Option<Declaration> {
    let first = longhands.first()?;
    let important = first.important;
    if !longhands.iter().all(|d| d.important == important) {
        return None;
    }
    let property = first.property.as_str();
    if let Some(&(family, _)) = SIDE_OF.get(property) {
        return contract_box(family, longhands, important);
    }
    if property == "font-family" || property == "line-height" || property.starts_with("font-") {
        return contract_font(longhands, important);
    }
    if property.starts_with("list-style-") {
        return contract_list_style(longhands, important);
    }
    if property.starts_with("background-") {
        return contract_background(longhands, important);
    }
    if matches!(property, "border-width" | "border-style" | "border-color") {
        return contract_border(longhands, important);
    }
    None
}

/// Runs every contraction family over an ordered declaration list,
/// replacing contracted longhands with the shorthand at the first
/// longhand's position.
pub(crate) fn contract_all(mut decls: Vec<Declaration>) -> Vec<Declaration> {
    for family in BOX_FAMILIES {
        if let Some(sides) = BOX_SIDES.get(family) {
            contract_in_place(&mut decls, &sides[..]);
        }
    }
    contract_in_place(&mut decls, &["border-width", "border-style", "border-color"]);
    contract_in_place(
        &mut decls,
        &[
            "font-style",
            "font-variant",
            "font-weight",
            "font-size",
            "line-height",
            "font-family",
        ],
    );
    contract_in_place(
        &mut decls,
        &["list-style-type", "list-style-position", "list-style-image"],
    );
    contract_in_place(
        &mut decls,
        &[
            "background-color",
            "background-image",
            "background-repeat",
            "background-attachment",
            "background-position",
        ],
    );
    decls
}

// ---------------------------------------------------------------------
// Expansion
// ---------------------------------------------------------------------

fn expand_box(sides: &[&'static str; 4], value: &str) -> Option<Vec<(String, String)>> {
    let tokens = value_tokens(value);
    let (top, right, bottom, left) = match tokens.len() {
        1 => (tokens[0], tokens[0], tokens[0], tokens[0]),
        2 => (tokens[0], tokens[1], tokens[0], tokens[1]),
        3 => (tokens[0], tokens[1], tokens[2], tokens[1]),
        4 => (tokens[0], tokens[1], tokens[2], tokens[3]),
        _ => return None,
    };
    Some(vec![
        (sides[0].to_string(), top.to_string()),
        (sides[1].to_string(), right.to_string()),
        (sides[2].to_string(), bottom.to_string()),
        (sides[3].to_string(), left.to_string()),
    ])
}

/// Shared by `border` and the edge shorthands: classify each token as a
/// width, style, or color and emit the matching longhand.
fn expand_border_like(parts: &[&'static str; 3], value: &str) -> Option<Vec<(String, String)>> {
    let mut width = None;
    let mut style = None;
    let mut color = None;
    for token in value_tokens(value) {
        let lower = token.to_ascii_lowercase();
        if BORDER_STYLES.contains(lower.as_str()) {
            style = Some(token);
        } else if BORDER_WIDTH_KEYWORDS.contains(lower.as_str()) || is_dimension(token) {
            width = Some(token);
        } else {
            color = Some(token);
        }
    }
    let mut out = Vec::new();
    if let Some(w) = width {
        out.push((parts[0].to_string(), w.to_string()));
    }
    if let Some(s) = style {
        out.push((parts[1].to_string(), s.to_string()));
    }
    if let Some(c) = color {
        out.push((parts[2].to_string(), c.to_string()));
    }
    if out.is_empty() { None } else { Some(out) }
}

fn expand_font(value: &str) -> Option<Vec<(String, String)>> {
    let tokens = value_tokens(value);
    let mut out = Vec::new();
    let mut index = 0;

    // Optional style/variant/weight prelude; bare `normal` is an explicit
    // default and expands to nothing.
    while index < tokens.len() {
        let lower = tokens[index].to_ascii_lowercase();
        if FONT_STYLES.contains(lower.as_str()) {
            out.push(("font-style".to_string(), tokens[index].to_string()));
        } else if FONT_VARIANTS.contains(lower.as_str()) {
            out.push(("font-variant".to_string(), tokens[index].to_string()));
        } else if FONT_WEIGHTS.contains(lower.as_str()) {
            out.push(("font-weight".to_string(), tokens[index].to_string()));
        } else if lower != "normal" {
            break;
        }
        index += 1;
    }

    let size_token = tokens.get(index)?;
    let (size, line_height) = match size_token.split_once('/') {
        Some((s, lh)) => (s, Some(lh)),
        None => (*size_token, None),
    };
    if !is_font_size(size) {
        return None;
    }
    out.push(("font-size".to_string(), size.to_string()));
    if let Some(lh) = line_height {
        out.push(("line-height".to_string(), lh.to_string()));
    }

    let family = tokens[index + 1..].join(" ");
    if family.is_empty() {
        return None;
    }
    out.push(("font-family".to_string(), family));
    Some(out)
}

fn expand_list_style(value: &str) -> Option<Vec<(String, String)>> {
    let mut style_type = None;
    let mut position = None;
    let mut image = None;
    for token in value_tokens(value) {
        let lower = token.to_ascii_lowercase();
        if LIST_STYLE_POSITIONS.contains(lower.as_str()) {
            position = Some(token);
        } else if lower.starts_with("url(") {
            image = Some(token);
        } else if LIST_STYLE_TYPES.contains(lower.as_str()) {
            // A second `none` refers to the image.
            if style_type.is_none() {
                style_type = Some(token);
            } else if lower == "none" {
                image = Some(token);
            }
        } else {
            return None;
        }
    }
    let mut out = Vec::new();
    if let Some(t) = style_type {
        out.push(("list-style-type".to_string(), t.to_string()));
    }
    if let Some(p) = position {
        out.push(("list-style-position".to_string(), p.to_string()));
    }
    if let Some(i) = image {
        out.push(("list-style-image".to_string(), i.to_string()));
    }
    if out.is_empty() { None } else { Some(out) }
}

fn expand_background(value: &str) -> Option<Vec<(String, String)>> {
    let mut color = None;
    let mut image = None;
    let mut repeat = None;
    let mut attachment = None;
    let mut position: Vec<&str> = Vec::new();
    for token in value_tokens(value) {
        let lower = token.to_ascii_lowercase();
        if lower.starts_with("url(") || lower.contains("gradient(") || lower == "none" {
            image = Some(token);
        } else if BACKGROUND_REPEATS.contains(lower.as_str()) {
            repeat = Some(token);
        } else if BACKGROUND_ATTACHMENTS.contains(lower.as_str()) {
            attachment = Some(token);
        } else if POSITION_KEYWORDS.contains(lower.as_str()) || is_dimension(token) {
            position.push(token);
        } else if is_color(token) {
            color = Some(token);
        } else {
            return None;
        }
    }
    let mut out = Vec::new();
    if let Some(c) = color {
        out.push(("background-color".to_string(), c.to_string()));
    }
    if let Some(i) = image {
        out.push(("background-image".to_string(), i.to_string()));
    }
    if let Some(r) = repeat {
        out.push(("background-repeat".to_string(), r.to_string()));
    }
    if let Some(a) = attachment {
        out.push(("background-attachment".to_string(), a.to_string()));
    }
    if !position.is_empty() {
        out.push(("background-position".to_string(), position.join(" ")));
    }
    if out.is_empty() { None } else { Some(out) }
}

// ---------------------------------------------------------------------
// Contraction
// ---------------------------------------------------------------------

fn find<'a>(longhands: &'a [Declaration], property: &str) -> Option<&'a Declaration> {
    // Last occurrence wins, matching cascade order.
    longhands.iter().rev().find(|d| d.property == property)
}

fn contract_box(
    family: &'static str,
    longhands: &[Declaration],
    important: bool,
) -> Option<Declaration> {
    let sides = BOX_SIDES.get(family)?;
    let top = find(longhands, sides[0])?;
    let right = find(longhands, sides[1])?;
    let bottom = find(longhands, sides[2])?;
    let left = find(longhands, sides[3])?;
    let value = shortest_box_form(&top.value, &right.value, &bottom.value, &left.value);
    Some(Declaration::new(family, &value, important))
}

/// The standard top/right/bottom/left reduction to the shortest legal form.
fn shortest_box_form(top: &str, right: &str, bottom: &str, left: &str) -> String {
    if top == right && right == bottom && bottom == left {
        top.to_string()
    } else if top == bottom && right == left {
        format!("{top} {right}")
    } else if right == left {
        format!("{top} {right} {bottom}")
    } else {
        format!("{top} {right} {bottom} {left}")
    }
}

fn contract_border(longhands: &[Declaration], important: bool) -> Option<Declaration> {
    let style = find(longhands, "border-style")?;
    let width = find(longhands, "border-width");
    let color = find(longhands, "border-color");
    // Bare `border` cannot express per-side variation, so every component
    // must be a single token.
    for decl in [Some(style), width, color].into_iter().flatten() {
        if value_tokens(&decl.value).len() != 1 {
            return None;
        }
    }
    let mut parts = Vec::new();
    if let Some(w) = width {
        parts.push(w.value.as_str());
    }
    parts.push(style.value.as_str());
    if let Some(c) = color {
        parts.push(c.value.as_str());
    }
    Some(Declaration::new("border", &parts.join(" "), important))
}

fn contract_font(longhands: &[Declaration], important: bool) -> Option<Declaration> {
    let size = find(longhands, "font-size")?;
    let family = find(longhands, "font-family")?;
    // Any font longhand outside the shorthand grammar blocks contraction.
    for decl in longhands {
        if !matches!(
            decl.property.as_str(),
            "font-style" | "font-variant" | "font-weight" | "font-size" | "line-height"
                | "font-family"
        ) {
            return None;
        }
    }
    let mut parts = Vec::new();
    for prop in ["font-style", "font-variant", "font-weight"] {
        if let Some(d) = find(longhands, prop) {
            parts.push(d.value.clone());
        }
    }
    match find(longhands, "line-height") {
        Some(lh) => parts.push(format!("{}/{}", size.value, lh.value)),
        None => parts.push(size.value.clone()),
    }
    parts.push(family.value.clone());
    Some(Declaration::new("font", &parts.join(" "), important))
}

fn contract_list_style(longhands: &[Declaration], important: bool) -> Option<Declaration> {
    let components = [
        find(longhands, "list-style-type"),
        find(longhands, "list-style-position"),
        find(longhands, "list-style-image"),
    ];
    let present: Vec<&Declaration> = components.into_iter().flatten().collect();
    if present.len() < 2 {
        return None;
    }
    let value = present
        .iter()
        .map(|d| d.value.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    Some(Declaration::new("list-style", &value, important))
}

fn contract_background(longhands: &[Declaration], important: bool) -> Option<Declaration> {
    let components = [
        find(longhands, "background-color"),
        find(longhands, "background-image"),
        find(longhands, "background-repeat"),
        find(longhands, "background-attachment"),
        find(longhands, "background-position"),
    ];
    let present: Vec<&Declaration> = components.into_iter().flatten().collect();
    if present.len() < 2 {
        return None;
    }
    let value = present
        .iter()
        .map(|d| d.value.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    Some(Declaration::new("background", &value, important))
}

/// Replaces the members of one contraction family inside an ordered
/// declaration list with their shorthand, at the first member's position.
fn contract_in_place(decls: &mut Vec<Declaration>, members: &[&str]) {
    let indices: Vec<usize> = decls
        .iter()
        .enumerate()
        .filter(|(_, d)| members.contains(&d.property.as_str()))
        .map(|(i, _)| i)
        .collect();
    if indices.is_empty() {
        return;
    }
    let subset: Vec<Declaration> = indices.iter().map(|&i| decls[i].clone()).collect();
    let Some(shorthand) = contract(&subset) else {
        return;
    };
    let first = indices[0];
    for &i in indices.iter().skip(1).rev() {
        decls.remove(i);
    }
    decls[first] = shorthand;
}

// ---------------------------------------------------------------------
// Token classification
// ---------------------------------------------------------------------

/// A numeric token with an optional unit or percent sign, or a math
/// function that resolves to one.
fn is_dimension(token: &str) -> bool {
    let lower = token.to_ascii_lowercase();
    if lower.starts_with("calc(")
        || lower.starts_with("var(")
        || lower.starts_with("min(")
        || lower.starts_with("max(")
        || lower.starts_with("clamp(")
    {
        return true;
    }
    let mut chars = token.chars().peekable();
    if matches!(chars.peek(), Some('+') | Some('-')) {
        chars.next();
    }
    let mut digits = false;
    while matches!(chars.peek(), Some(c) if c.is_ascii_digit()) {
        chars.next();
        digits = true;
    }
    if chars.peek() == Some(&'.') {
        chars.next();
        while matches!(chars.peek(), Some(c) if c.is_ascii_digit()) {
            chars.next();
            digits = true;
        }
    }
    if !digits {
        return false;
    }
    let rest: String = chars.collect();
    rest.is_empty() || rest == "%" || rest.chars().all(|c| c.is_ascii_alphabetic())
}

fn is_font_size(token: &str) -> bool {
    is_dimension(token) || FONT_SIZE_KEYWORDS.contains(token.to_ascii_lowercase().as_str())
}

fn is_color(token: &str) -> bool {
    let lower = token.to_ascii_lowercase();
    lower.starts_with('#')
        || lower.starts_with("rgb(")
        || lower.starts_with("rgba(")
        || lower.starts_with("hsl(")
        || lower.starts_with("hsla(")
        || NAMED_COLORS.contains(lower.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decl(property: &str, value: &str) -> Declaration {
        Declaration::new(property, value, false)
    }

    #[test]
    fn expand_margin_counts() {
        let one = expand("margin", "10px").unwrap();
        assert!(one.iter().all(|(_, v)| v == "10px"));

        let three = expand("margin", "1px 2px 3px").unwrap();
        assert_eq!(three[3], ("margin-left".to_string(), "2px".to_string()));

        assert!(expand("margin", "1px 2px 3px 4px 5px").is_none());
    }

    #[test]
    fn expand_border_classifies_tokens() {
        let parts = expand("border", "1px solid red").unwrap();
        assert_eq!(parts[0], ("border-width".to_string(), "1px".to_string()));
        assert_eq!(parts[1], ("border-style".to_string(), "solid".to_string()));
        assert_eq!(parts[2], ("border-color".to_string(), "red".to_string()));

        let edge = expand("border-left", "dotted").unwrap();
        assert_eq!(edge, vec![("border-left-style".to_string(), "dotted".to_string())]);
    }

    #[test]
    fn expand_font_requires_size_and_family() {
        let parts = expand("font", "italic bold 12px/1.5 Georgia, serif").unwrap();
        assert!(parts.contains(&("font-size".to_string(), "12px".to_string())));
        assert!(parts.contains(&("line-height".to_string(), "1.5".to_string())));
        assert!(parts.contains(&("font-family".to_string(), "Georgia, serif".to_string())));

        assert!(expand("font", "bold").is_none());
    }

    #[test]
    fn contract_box_shortest_form() {
        let sides = [
            decl("margin-top", "10px"),
            decl("margin-right", "10px"),
            decl("margin-bottom", "10px"),
            decl("margin-left", "10px"),
        ];
        let margin = contract(&sides).unwrap();
        assert_eq!(margin.property, "margin");
        assert_eq!(margin.value, "10px");

        let sides = [
            decl("margin-top", "1px"),
            decl("margin-right", "2px"),
            decl("margin-bottom", "1px"),
            decl("margin-left", "2px"),
        ];
        assert_eq!(contract(&sides).unwrap().value, "1px 2px");
    }

    #[test]
    fn contract_requires_all_sides() {
        let sides = [decl("margin-top", "10px"), decl("margin-right", "10px")];
        assert!(contract(&sides).is_none());
    }

    #[test]
    fn contract_requires_matching_importance() {
        let sides = [
            decl("padding-top", "1px"),
            decl("padding-right", "1px"),
            decl("padding-bottom", "1px"),
            Declaration::new("padding-left", "1px", true),
        ];
        assert!(contract(&sides).is_none());
    }

    #[test]
    fn border_needs_style() {
        let widths = [decl("border-width", "1px"), decl("border-color", "red")];
        assert!(contract(&widths).is_none());

        let full = [
            decl("border-width", "1px"),
            decl("border-style", "solid"),
            decl("border-color", "red"),
        ];
        assert_eq!(contract(&full).unwrap().value, "1px solid red");
    }

    #[test]
    fn expand_contract_round_trip() {
        let longhands = expand("margin", "10px").unwrap();
        let decls: Vec<Declaration> = longhands
            .iter()
            .map(|(p, v)| decl(p, v))
            .collect();
        let margin = contract(&decls).unwrap();
        assert_eq!(expand(&margin.property, &margin.value).unwrap(), longhands);
    }
}
