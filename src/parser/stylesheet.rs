//! Core data structures for declarations, rules, at-rules, and the
//! stylesheet that owns them.

use std::fmt;

use once_cell::unsync::OnceCell;

use crate::error::CssError;
use crate::options::{FormatOptions, Limits, ParseOptions};
use crate::parser::media::{MediaId, MediaIndex};
use crate::parser::{cascade, selectors, serialize};

/// A single `property: value` pair.
///
/// Property names are lower-cased ASCII at construction, so they compare
/// case-insensitively by ordinary equality. Values keep their original case;
/// whitespace is normalized only at boundaries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Declaration {
    pub property: String,
    pub value: String,
    pub important: bool,
}

impl Declaration {
    pub fn new(property: &str, value: &str, important: bool) -> Self {
        Declaration {
            property: property.trim().to_ascii_lowercase(),
            value: value.trim().to_string(),
            important,
        }
    }
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.property, self.value)?;
        if self.important {
            f.write_str(" !important")?;
        }
        Ok(())
    }
}

/// A style rule: one selector with its declarations.
///
/// `id` equals the rule's position in the owning sequence, so lookup by id
/// is O(1). A rule that originated from a comma-separated selector list
/// carries the list's shared `selector_list_id`.
#[derive(Clone, Debug)]
pub struct Rule {
    pub id: usize,
    pub selector: String,
    pub declarations: Vec<Declaration>,
    pub selector_list_id: Option<usize>,
    specificity: OnceCell<u32>,
}

impl Rule {
    pub fn new(id: usize, selector: String, declarations: Vec<Declaration>) -> Self {
        Rule {
            id,
            selector,
            declarations,
            selector_list_id: None,
            specificity: OnceCell::new(),
        }
    }

    /// The selector's specificity, computed on first access and cached for
    /// the rule's lifetime.
    pub fn specificity(&self) -> u32 {
        *self
            .specificity
            .get_or_init(|| selectors::specificity(&self.selector))
    }
}

/// Body of an [`AtRule`].
#[derive(Clone, Debug)]
pub enum AtRuleContent {
    /// Block-structured at-rules (`@keyframes`, `@supports`, ...). Nested
    /// rules carry local ids 0..n within the at-rule.
    Rules(Vec<Rule>),
    /// Flat at-rules (`@font-face`, `@page`, ...).
    Declarations(Vec<Declaration>),
    /// Statement at-rules without a block (`@layer a, b;`).
    Empty,
}

/// An at-rule, opaque to the cascade engine and passed through unchanged.
///
/// `selector` holds the full prelude, e.g. `@keyframes spin`.
#[derive(Clone, Debug)]
pub struct AtRule {
    pub id: usize,
    pub selector: String,
    pub content: AtRuleContent,
}

/// One slot in the stylesheet's ordered sequence.
#[derive(Clone, Debug)]
pub enum Item {
    Rule(Rule),
    AtRule(AtRule),
}

impl Item {
    pub fn id(&self) -> usize {
        match self {
            Item::Rule(rule) => rule.id,
            Item::AtRule(at) => at.id,
        }
    }

    pub(crate) fn set_id(&mut self, id: usize) {
        match self {
            Item::Rule(rule) => rule.id = id,
            Item::AtRule(at) => at.id = id,
        }
    }

    pub fn as_rule(&self) -> Option<&Rule> {
        match self {
            Item::Rule(rule) => Some(rule),
            Item::AtRule(_) => None,
        }
    }

    pub fn as_at_rule(&self) -> Option<&AtRule> {
        match self {
            Item::Rule(_) => None,
            Item::AtRule(at) => Some(at),
        }
    }
}

/// An `@import` reference awaiting resolution by the caller's loader.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportRef {
    pub url: String,
    /// Media queries the import was scoped to, e.g. `@import url(x) print;`.
    pub media: Vec<String>,
}

/// A parsed stylesheet: the rule/at-rule sequence, the media index, an
/// optional charset, and unresolved import references.
///
/// For every position `i`, `items[i].id() == i`.
#[derive(Clone, Debug)]
pub struct Stylesheet {
    pub items: Vec<Item>,
    pub media: MediaIndex,
    pub charset: Option<String>,
    pub imports: Vec<ImportRef>,
    pub(crate) next_list_id: usize,
}

impl Stylesheet {
    pub fn new() -> Self {
        Stylesheet {
            items: Vec::new(),
            media: MediaIndex::new(),
            charset: None,
            imports: Vec::new(),
            next_list_id: 0,
        }
    }

    /// Parses CSS source with default (lenient) options.
    pub fn parse(text: &str) -> Result<Self, CssError> {
        crate::parser::parse(text)
    }

    /// Parses CSS source with explicit options.
    pub fn parse_with_options(text: &str, opts: &ParseOptions) -> Result<Self, CssError> {
        crate::parser::parse_with_options(text, opts)
    }

    /// Parses `css` and appends its rules, keeping ids sequential.
    pub fn add_block(&mut self, css: &str, opts: &ParseOptions) -> Result<(), CssError> {
        let other = crate::parser::parse_with_options(css, opts)?;
        self.merge(other, &[]);
        Ok(())
    }

    /// Like [`add_block`](Self::add_block), but forces the appended rules
    /// into the given media context.
    pub fn add_block_with_media(
        &mut self,
        css: &str,
        media: &[&str],
        opts: &ParseOptions,
    ) -> Result<(), CssError> {
        let other = crate::parser::parse_with_options(css, opts)?;
        let media: Vec<String> = media.iter().map(|m| m.to_string()).collect();
        self.merge(other, &media);
        Ok(())
    }

    /// Iterates top-level style rules in id order.
    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.items.iter().filter_map(Item::as_rule)
    }

    /// Every selector alongside its specificity, in id order.
    pub fn selectors(&self) -> impl Iterator<Item = (&str, u32)> {
        self.rules().map(|r| (r.selector.as_str(), r.specificity()))
    }

    /// Rules registered under the given media query text. `":all"` answers
    /// the unconditional rules.
    pub fn rules_for_media(&self, query: &str) -> Vec<&Rule> {
        self.media
            .rules_for(query)
            .iter()
            .filter_map(|&id| self.items.get(id).and_then(Item::as_rule))
            .collect()
    }

    /// Rules whose selector text equals `selector`.
    pub fn rules_with_selector(&self, selector: &str) -> Vec<&Rule> {
        self.rules().filter(|r| r.selector == selector).collect()
    }

    /// Declarations of every rule matching `selector`, in source order.
    pub fn declarations_for(&self, selector: &str) -> Vec<&Declaration> {
        self.rules_with_selector(selector)
            .into_iter()
            .flat_map(|r| r.declarations.iter())
            .collect()
    }

    /// Resolves the cascade into a new stylesheet: one rule per
    /// (selector, media context) group, one winning value per property,
    /// shorthands re-contracted where legal.
    pub fn flatten(&self) -> Stylesheet {
        cascade::flatten(self)
    }

    /// In-place variant of [`flatten`](Self::flatten).
    pub fn flatten_in_place(&mut self) {
        *self = cascade::flatten(self);
    }

    /// Serializes back to CSS text.
    pub fn to_css(&self, opts: &FormatOptions) -> String {
        serialize::to_css(self, opts)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.charset.is_none() && self.imports.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Appends `other`'s items, offsetting their ids past this sheet's so
    /// the sequential-id invariant holds, re-interning media identifiers,
    /// and remapping selector-list ids. The receiving sheet's charset wins.
    ///
    /// When `media_override` is non-empty, appended rules that carried no
    /// media context of their own are registered under those queries.
    pub(crate) fn merge(&mut self, other: Stylesheet, media_override: &[String]) {
        let offset = self.items.len();
        let list_base = self.next_list_id;
        let limit = Limits::default().max_media_queries;

        let override_ids: Vec<MediaId> = media_override
            .iter()
            .filter_map(|q| self.media.intern(q, limit).ok())
            .collect();

        for mut item in other.items {
            let old_id = item.id();
            let new_id = offset + old_id;
            item.set_id(new_id);
            if let Item::Rule(rule) = &mut item {
                if let Some(list) = rule.selector_list_id {
                    rule.selector_list_id = Some(list_base + list);
                }
            }

            let carried = other.media.media_for(old_id);
            if carried.is_empty() {
                if override_ids.is_empty() {
                    self.media.register(new_id, MediaId::ALL);
                } else {
                    for &id in &override_ids {
                        self.media.register(new_id, id);
                    }
                }
            } else {
                for &id in carried {
                    let query = other.media.query_text(id).to_string();
                    let new_media = self.media.intern_known(&query);
                    self.media.register(new_id, new_media);
                }
            }
            self.items.push(item);
        }

        if self.charset.is_none() {
            self.charset = other.charset;
        }
        self.imports.extend(other.imports);
        self.next_list_id = list_base + other.next_list_id;
    }
}

impl Default for Stylesheet {
    fn default() -> Self {
        Stylesheet::new()
    }
}

impl fmt::Display for Stylesheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css(&FormatOptions::default()))
    }
}
