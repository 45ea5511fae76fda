//! Rendering a stylesheet back to CSS text.
//!
//! The serializer walks the item sequence in id order, consulting the media
//! index to open and close `@media` blocks only when the context actually
//! changes, and re-joining consecutive rules that still share a
//! `selector_list_id` into one comma-separated selector line.

use crate::options::FormatOptions;
use crate::parser::stylesheet::{AtRule, AtRuleContent, Declaration, Item, Stylesheet};

pub fn to_css(sheet: &Stylesheet, opts: &FormatOptions) -> String {
    let mut out = String::new();

    if let Some(charset) = &sheet.charset {
        out.push_str("@charset \"");
        out.push_str(charset);
        out.push_str("\";\n");
    }
    for import in &sheet.imports {
        out.push_str("@import url(\"");
        out.push_str(&import.url);
        out.push_str("\")");
        if !import.media.is_empty() {
            out.push(' ');
            out.push_str(&import.media.join(", "));
        }
        out.push_str(";\n");
    }

    let mut open_context: Option<String> = None;
    let mut i = 0;
    while i < sheet.items.len() {
        let item = &sheet.items[i];
        let context = media_context(sheet, item.id());
        if context != open_context {
            if open_context.is_some() {
                out.push_str("}\n");
            }
            if let Some(ctx) = &context {
                out.push_str("@media ");
                out.push_str(ctx);
                out.push_str(" {\n");
            }
            open_context = context.clone();
        }
        let level = usize::from(open_context.is_some());

        match item {
            Item::AtRule(at) => {
                emit_at_rule(&mut out, at, level, opts);
                i += 1;
            }
            Item::Rule(rule) => {
                let mut selectors = vec![rule.selector.as_str()];
                let mut j = i + 1;
                if let Some(list) = rule.selector_list_id {
                    while let Some(Item::Rule(next)) = sheet.items.get(j) {
                        if next.selector_list_id != Some(list)
                            || media_context(sheet, next.id) != context
                        {
                            break;
                        }
                        selectors.push(next.selector.as_str());
                        j += 1;
                    }
                }
                emit_rule(&mut out, &selectors, &rule.declarations, level, opts);
                i = j;
            }
        }
    }
    if open_context.is_some() {
        out.push_str("}\n");
    }
    out
}

/// The comma-joined media query text a rule sits under, `None` when
/// unconditional.
fn media_context(sheet: &Stylesheet, id: usize) -> Option<String> {
    let ids = sheet.media.media_for(id);
    if ids.is_empty() {
        return None;
    }
    Some(
        ids.iter()
            .map(|&m| sheet.media.query_text(m))
            .collect::<Vec<_>>()
            .join(", "),
    )
}

fn emit_rule(
    out: &mut String,
    selectors: &[&str],
    declarations: &[Declaration],
    level: usize,
    opts: &FormatOptions,
) {
    let pad = " ".repeat(opts.indent * level);
    let joined = selectors.join(", ");
    let selector_line = if opts.pretty && pad.len() + joined.len() + 2 > opts.max_line_length {
        selectors.join(&format!(",\n{pad}"))
    } else {
        joined
    };

    if opts.pretty {
        let inner = " ".repeat(opts.indent * (level + 1));
        out.push_str(&pad);
        out.push_str(&selector_line);
        out.push_str(" {\n");
        for decl in declarations {
            out.push_str(&inner);
            out.push_str(&decl.to_string());
            out.push_str(";\n");
        }
        out.push_str(&pad);
        out.push_str("}\n");
    } else {
        out.push_str(&pad);
        out.push_str(&selector_line);
        out.push_str(" { ");
        for decl in declarations {
            out.push_str(&decl.to_string());
            out.push_str("; ");
        }
        out.push_str("}\n");
    }
}

fn emit_at_rule(out: &mut String, at: &AtRule, level: usize, opts: &FormatOptions) {
    let pad = " ".repeat(opts.indent * level);
    match &at.content {
        AtRuleContent::Empty => {
            out.push_str(&pad);
            out.push_str(&at.selector);
            out.push_str(";\n");
        }
        AtRuleContent::Declarations(declarations) => {
            emit_rule(out, &[at.selector.as_str()], declarations, level, opts);
        }
        AtRuleContent::Rules(rules) => {
            out.push_str(&pad);
            out.push_str(&at.selector);
            out.push_str(" {\n");
            for rule in rules {
                emit_rule(
                    out,
                    &[rule.selector.as_str()],
                    &rule.declarations,
                    level + 1,
                    opts,
                );
            }
            out.push_str(&pad);
            out.push_str("}\n");
        }
    }
}
