//! CSS parsing and stylesheet data structures.
//!
//! This module provides the core parsing functionality for CSS source text,
//! including:
//!
//! - [`parse`] / [`parse_with_options`]: Main entry points
//! - [`Stylesheet`]: Represents a complete parsed stylesheet
//! - [`Rule`] / [`AtRule`]: The two kinds of top-level items
//! - [`Declaration`]: A property-value pair like `color: red`
//!
//! ## Submodules
//!
//! - [`cascade`]: Cascade resolution and stylesheet flattening
//! - [`imports`]: The `@import` resolution contract
//! - [`media`]: Media-query identifier interning and indexing
//! - [`selectors`]: Selector tokens and the specificity calculator
//! - [`serialize`]: Rendering back to CSS text
//! - [`shorthand`]: Shorthand expansion and contraction
//! - [`stylesheet`]: Core data structures for rules and declarations
//!
//! ## Parsing model
//!
//! The parser is a single left-to-right scan tracking brace nesting, an
//! explicit stack of active media queries (nested `@media` is supported),
//! paren depth, and comment/quoted-string state, so commas and semicolons
//! inside `calc()`, `url()`, strings, or comments are inert. It is lenient
//! by default: malformed constructs are skipped with a warning unless the
//! corresponding strict check is enabled. Hard resource ceilings are
//! enforced unconditionally.
//!
//! ## Example
//!
//! ```rust
//! use csscade::parse;
//!
//! let sheet = parse(".note { color: red; margin: 0; }").unwrap();
//! let rule = sheet.rules().next().unwrap();
//!
//! assert_eq!(rule.selector, ".note");
//! assert_eq!(rule.declarations.len(), 2);
//! ```

pub mod cascade;
pub mod imports;
pub mod media;
pub(crate) mod scan;
pub mod selectors;
pub mod serialize;
pub mod shorthand;
pub mod stylesheet;

pub use crate::parser::media::{MediaId, MediaIndex};
pub use crate::parser::selectors::specificity;
pub use crate::parser::shorthand::{contract, expand, is_shorthand};
pub use crate::parser::stylesheet::{
    AtRule, AtRuleContent, Declaration, ImportRef, Item, Rule, Stylesheet,
};

use log::{debug, warn};

use crate::error::{CssError, ParseErrorKind};
use crate::options::{Checks, ParseOptions};
use crate::parser::scan::{normalize_ws, split_important, split_top_level};

/// Parses CSS source with default (lenient) options.
pub fn parse(text: &str) -> Result<Stylesheet, CssError> {
    parse_with_options(text, &ParseOptions::default())
}

/// Parses CSS source with explicit options.
pub fn parse_with_options(text: &str, opts: &ParseOptions) -> Result<Stylesheet, CssError> {
    if text.len() > opts.limits.max_input_size {
        return Err(CssError::InputTooLarge {
            size: text.len(),
            limit: opts.limits.max_input_size,
        });
    }
    let mut parser = Parser::new(text, opts);
    parser.run()?;
    debug!(
        "parsed {} items under {} media queries",
        parser.sheet.items.len(),
        parser.sheet.media.queries().count(),
    );
    Ok(parser.sheet)
}

/// What ended a boundary-delimited read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Term {
    /// A top-level `{` (consumed).
    Open,
    /// A top-level `;` (consumed).
    Semi,
    /// A top-level `}` (left pending for the caller).
    Close,
    Eof,
}

/// A rule awaiting emission: its full selector text (possibly a comma
/// list) and declarations. Nesting resolution produces several drafts per
/// source block, parent first.
struct RuleDraft {
    selector: String,
    declarations: Vec<Declaration>,
}

struct Parser<'o> {
    opts: &'o ParseOptions,
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
    sheet: Stylesheet,
    /// Active `@media` contexts, innermost last. Each frame holds the ids
    /// of one comma-separated query list.
    media_stack: Vec<Vec<MediaId>>,
    /// Whether any rule or at-rule has been emitted; gates `@import`.
    seen_rule: bool,
}

impl<'o> Parser<'o> {
    fn new(text: &str, opts: &'o ParseOptions) -> Self {
        Parser {
            opts,
            chars: text.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
            sheet: Stylesheet::new(),
            media_stack: Vec::new(),
            seen_rule: false,
        }
    }

    // -- low-level cursor ------------------------------------------------

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek2(&self) -> Option<char> {
        self.chars.get(self.pos + 1).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn skip_comment(&mut self) {
        // Caller saw "/*".
        self.bump();
        self.bump();
        loop {
            match self.bump() {
                Some('*') if self.peek() == Some('/') => {
                    self.bump();
                    return;
                }
                Some(_) => {}
                // An unterminated comment swallows the rest of the input.
                None => return,
            }
        }
    }

    fn skip_ws_and_comments(&mut self) {
        loop {
            while matches!(self.peek(), Some(c) if c.is_whitespace()) {
                self.bump();
            }
            if self.peek() == Some('/') && self.peek2() == Some('*') {
                self.skip_comment();
            } else {
                return;
            }
        }
    }

    /// Raises when the given strict check is enabled, warns otherwise.
    fn check(
        &self,
        flag: Checks,
        reason: ParseErrorKind,
        line: usize,
        column: usize,
    ) -> Result<(), CssError> {
        if self.opts.raise_errors && self.opts.checks.contains(flag) {
            return Err(CssError::Parse {
                line,
                column,
                reason,
            });
        }
        warn!("tolerated {reason} at line {line}, column {column}");
        Ok(())
    }

    /// Reads text up to the next top-level `{`, `;`, `}`, or end of input.
    /// `{` and `;` are consumed; `}` is left pending so enclosing blocks
    /// can see their own terminator. Comments are dropped (acting as
    /// separators); quotes and parens shield their content.
    fn read_until_boundary(&mut self) -> (String, Term) {
        let mut buf = String::new();
        let mut depth = 0usize;
        let mut quote: Option<char> = None;
        let mut escaped = false;
        loop {
            let Some(c) = self.peek() else {
                return (buf, Term::Eof);
            };
            if escaped {
                buf.push(c);
                self.bump();
                escaped = false;
                continue;
            }
            if c == '\\' {
                buf.push(c);
                self.bump();
                escaped = true;
                continue;
            }
            if let Some(q) = quote {
                // A raw newline ends the string state leniently.
                if c == q || c == '\n' {
                    quote = None;
                }
                buf.push(c);
                self.bump();
                continue;
            }
            match c {
                '"' | '\'' => {
                    quote = Some(c);
                    buf.push(c);
                    self.bump();
                }
                '/' if self.peek2() == Some('*') => {
                    self.skip_comment();
                    buf.push(' ');
                }
                '(' | '[' => {
                    depth += 1;
                    buf.push(c);
                    self.bump();
                }
                ')' | ']' => {
                    depth = depth.saturating_sub(1);
                    buf.push(c);
                    self.bump();
                }
                '{' if depth == 0 => {
                    self.bump();
                    return (buf, Term::Open);
                }
                '}' if depth == 0 => {
                    return (buf, Term::Close);
                }
                ';' if depth == 0 => {
                    self.bump();
                    return (buf, Term::Semi);
                }
                _ => {
                    buf.push(c);
                    self.bump();
                }
            }
        }
    }

    fn read_ident(&mut self) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                out.push(c);
                self.bump();
            } else {
                break;
            }
        }
        out
    }

    /// Consumes the body of an already-opened block, balanced.
    fn skip_block(&mut self) {
        let mut depth = 1usize;
        let mut quote: Option<char> = None;
        let mut escaped = false;
        loop {
            if quote.is_none() && self.peek() == Some('/') && self.peek2() == Some('*') {
                self.skip_comment();
                continue;
            }
            let Some(c) = self.bump() else { return };
            if escaped {
                escaped = false;
                continue;
            }
            match c {
                '\\' => escaped = true,
                q @ ('"' | '\'') => {
                    if quote == Some(q) {
                        quote = None;
                    } else if quote.is_none() {
                        quote = Some(q);
                    }
                }
                _ if quote.is_some() => {}
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return;
                    }
                }
                _ => {}
            }
        }
    }

    /// Skips an at-rule whose kind is unknown or misplaced: either a
    /// statement ending in `;` or a balanced block.
    fn skip_at_construct(&mut self) {
        let (_, term) = self.read_until_boundary();
        if matches!(term, Term::Open) {
            self.skip_block();
        }
    }

    // -- top level -------------------------------------------------------

    fn run(&mut self) -> Result<(), CssError> {
        loop {
            self.skip_ws_and_comments();
            match self.peek() {
                None => return Ok(()),
                Some('@') => self.parse_at_rule(0)?,
                Some('}') => {
                    warn!(
                        "ignoring stray '}}' at line {}, column {}",
                        self.line, self.column
                    );
                    self.bump();
                }
                Some(_) => self.parse_style_rule(0)?,
            }
        }
    }

    fn parse_style_rule(&mut self, depth: usize) -> Result<(), CssError> {
        let (line, column) = (self.line, self.column);
        let (raw, term) = self.read_until_boundary();
        match term {
            Term::Open => {
                let selector = normalize_ws(&raw);
                let drafts = self.parse_rule_block(selector, depth)?;
                self.emit_drafts(drafts);
                Ok(())
            }
            Term::Semi | Term::Close | Term::Eof => {
                if !raw.trim().is_empty() {
                    self.check(
                        Checks::MALFORMED_DECLARATIONS,
                        ParseErrorKind::MalformedDeclaration,
                        line,
                        column,
                    )?;
                }
                Ok(())
            }
        }
    }

    /// Parses the body of a style rule, resolving nested rules to flat
    /// selectors. Returns the drafts in emission order, parent first.
    fn parse_rule_block(
        &mut self,
        selector: String,
        depth: usize,
    ) -> Result<Vec<RuleDraft>, CssError> {
        if depth >= self.opts.limits.max_nesting_depth {
            return Err(CssError::NestingTooDeep {
                line: self.line,
                limit: self.opts.limits.max_nesting_depth,
            });
        }
        self.validate_selector(&selector)?;

        let mut declarations = Vec::new();
        let mut children: Vec<RuleDraft> = Vec::new();
        loop {
            self.skip_ws_and_comments();
            let (line, column) = (self.line, self.column);
            match self.peek() {
                None => {
                    self.check(
                        Checks::UNCLOSED_BLOCKS,
                        ParseErrorKind::UnclosedBlock,
                        line,
                        column,
                    )?;
                    if !self.opts.fix_braces {
                        return Ok(Vec::new());
                    }
                    break;
                }
                Some('}') => {
                    self.bump();
                    break;
                }
                Some('@') => {
                    // At-rules have no id slot inside a style rule body.
                    self.check(
                        Checks::MALFORMED_AT_RULES,
                        ParseErrorKind::MalformedAtRule,
                        line,
                        column,
                    )?;
                    self.bump();
                    self.read_ident();
                    self.skip_at_construct();
                }
                Some(_) => {
                    let (text, term) = self.read_until_boundary();
                    match term {
                        Term::Semi => {
                            if let Some(d) = self.declaration_from(&text, line, column)? {
                                declarations.push(d);
                            }
                        }
                        Term::Close => {
                            if let Some(d) = self.declaration_from(&text, line, column)? {
                                declarations.push(d);
                            }
                            self.bump();
                            break;
                        }
                        Term::Open => {
                            let child = combine_nested_selector(&selector, &normalize_ws(&text));
                            children.extend(self.parse_rule_block(child, depth + 1)?);
                        }
                        Term::Eof => {
                            self.check(
                                Checks::UNCLOSED_BLOCKS,
                                ParseErrorKind::UnclosedBlock,
                                line,
                                column,
                            )?;
                            if !self.opts.fix_braces {
                                return Ok(Vec::new());
                            }
                            if let Some(d) = self.declaration_from(&text, line, column)? {
                                declarations.push(d);
                            }
                            break;
                        }
                    }
                }
            }
        }

        let mut out = Vec::new();
        if !declarations.is_empty() || children.is_empty() {
            out.push(RuleDraft {
                selector,
                declarations,
            });
        }
        out.extend(children);
        Ok(out)
    }

    fn validate_selector(&self, selector: &str) -> Result<(), CssError> {
        let (line, column) = (self.line, self.column);
        if selector.is_empty() {
            return self.check(
                Checks::INVALID_SELECTORS,
                ParseErrorKind::InvalidSelector,
                line,
                column,
            );
        }
        for segment in split_top_level(selector, ',') {
            if segment.trim().is_empty() {
                self.check(
                    Checks::INVALID_SELECTORS,
                    ParseErrorKind::InvalidSelector,
                    line,
                    column,
                )?;
            } else if !selectors::is_well_formed(segment) {
                self.check(
                    Checks::INVALID_SELECTOR_SYNTAX,
                    ParseErrorKind::InvalidSelectorSyntax,
                    line,
                    column,
                )?;
            }
        }
        Ok(())
    }

    fn declaration_from(
        &self,
        text: &str,
        line: usize,
        column: usize,
    ) -> Result<Option<Declaration>, CssError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        let Some(colon) = trimmed.find(':') else {
            self.check(
                Checks::MALFORMED_DECLARATIONS,
                ParseErrorKind::MalformedDeclaration,
                line,
                column,
            )?;
            return Ok(None);
        };
        let property = trimmed[..colon].trim();
        if property.is_empty()
            || !property.is_ascii()
            || property.chars().any(|c| c.is_whitespace())
        {
            self.check(
                Checks::MALFORMED_DECLARATIONS,
                ParseErrorKind::MalformedDeclaration,
                line,
                column,
            )?;
            return Ok(None);
        }
        if property.len() > self.opts.limits.max_property_length {
            return Err(CssError::PropertyTooLong {
                line,
                limit: self.opts.limits.max_property_length,
            });
        }
        let (value, important) = split_important(&trimmed[colon + 1..]);
        let value = normalize_ws(value);
        if value.len() > self.opts.limits.max_value_length {
            return Err(CssError::ValueTooLong {
                line,
                limit: self.opts.limits.max_value_length,
            });
        }
        if value.is_empty() {
            self.check(Checks::EMPTY_VALUES, ParseErrorKind::EmptyValue, line, column)?;
            return Ok(None);
        }
        Ok(Some(Declaration::new(property, &value, important)))
    }

    /// Splits each draft's selector on top-level commas and emits one rule
    /// per segment, all sharing one duplicated declaration list and, when
    /// tracking is on, one fresh `selector_list_id`.
    fn emit_drafts(&mut self, drafts: Vec<RuleDraft>) {
        for draft in drafts {
            let segments: Vec<String> = split_top_level(&draft.selector, ',')
                .into_iter()
                .map(normalize_ws)
                .filter(|s| !s.is_empty())
                .collect();
            if segments.is_empty() {
                continue;
            }
            let list_id = if self.opts.selector_lists && segments.len() > 1 {
                let id = self.sheet.next_list_id;
                self.sheet.next_list_id += 1;
                Some(id)
            } else {
                None
            };
            for segment in segments {
                let id = self.sheet.items.len();
                let mut rule = Rule::new(id, segment, draft.declarations.clone());
                rule.selector_list_id = list_id;
                self.register_media(id);
                self.sheet.items.push(Item::Rule(rule));
            }
            self.seen_rule = true;
        }
    }

    /// Registers an item under the innermost active media frame, or the
    /// unconditional sentinel outside any `@media`.
    fn register_media(&mut self, id: usize) {
        let frame = match self.media_stack.last() {
            Some(frame) if !frame.is_empty() => frame.clone(),
            _ => {
                self.sheet.media.register(id, MediaId::ALL);
                return;
            }
        };
        for m in frame {
            self.sheet.media.register(id, m);
        }
    }

    // -- at-rules --------------------------------------------------------

    fn parse_at_rule(&mut self, depth: usize) -> Result<(), CssError> {
        let (line, column) = (self.line, self.column);
        self.bump(); // '@'
        let name = self.read_ident().to_ascii_lowercase();
        match name.as_str() {
            "charset" => self.parse_charset(line, column),
            "import" => self.parse_import(line, column),
            "media" => self.parse_media(depth, line, column),
            "font-face" | "page" | "property" | "counter-style" => {
                self.parse_flat_at_rule(&name, line, column)
            }
            "keyframes" | "supports" | "layer" | "container" | "scope" => {
                self.parse_block_at_rule(&name, depth, line, column)
            }
            _ => {
                self.check(
                    Checks::MALFORMED_AT_RULES,
                    ParseErrorKind::MalformedAtRule,
                    line,
                    column,
                )?;
                self.skip_at_construct();
                Ok(())
            }
        }
    }

    fn parse_charset(&mut self, line: usize, column: usize) -> Result<(), CssError> {
        let (text, term) = self.read_until_boundary();
        if term == Term::Open {
            self.check(
                Checks::MALFORMED_AT_RULES,
                ParseErrorKind::MalformedAtRule,
                line,
                column,
            )?;
            self.skip_block();
            return Ok(());
        }
        let already_started = self.seen_rule
            || self.sheet.charset.is_some()
            || !self.sheet.imports.is_empty();
        if already_started {
            // `@charset` is only recognized as the very first construct.
            return self.check(
                Checks::MALFORMED_AT_RULES,
                ParseErrorKind::MalformedAtRule,
                line,
                column,
            );
        }
        let value = text.trim().trim_matches(|c| c == '"' || c == '\'');
        if value.is_empty() {
            return self.check(
                Checks::MALFORMED_AT_RULES,
                ParseErrorKind::MalformedAtRule,
                line,
                column,
            );
        }
        self.sheet.charset = Some(value.to_string());
        Ok(())
    }

    fn parse_import(&mut self, line: usize, column: usize) -> Result<(), CssError> {
        let (text, term) = self.read_until_boundary();
        if term == Term::Open {
            self.check(
                Checks::MALFORMED_AT_RULES,
                ParseErrorKind::MalformedAtRule,
                line,
                column,
            )?;
            self.skip_block();
            return Ok(());
        }
        if self.seen_rule {
            // Imports must precede all rules. A late one is dropped with
            // only a warning, never an error.
            warn!("ignoring @import after rules at line {line}, column {column}");
            return Ok(());
        }
        match parse_import_target(&text) {
            Some((url, media)) => {
                self.sheet.imports.push(ImportRef { url, media });
                Ok(())
            }
            None => self.check(
                Checks::MALFORMED_AT_RULES,
                ParseErrorKind::MalformedAtRule,
                line,
                column,
            ),
        }
    }

    fn parse_media(&mut self, depth: usize, line: usize, column: usize) -> Result<(), CssError> {
        if depth >= self.opts.limits.max_nesting_depth {
            return Err(CssError::NestingTooDeep {
                line,
                limit: self.opts.limits.max_nesting_depth,
            });
        }
        let (prelude, term) = self.read_until_boundary();
        if term != Term::Open {
            return self.check(
                Checks::MALFORMED_AT_RULES,
                ParseErrorKind::MalformedAtRule,
                line,
                column,
            );
        }
        let mut frame = Vec::new();
        for query in split_top_level(&prelude, ',') {
            let query = normalize_ws(query);
            if query.is_empty() {
                continue;
            }
            frame.push(
                self.sheet
                    .media
                    .intern(&query, self.opts.limits.max_media_queries)?,
            );
        }
        self.media_stack.push(frame);
        let result = self.parse_media_body(depth);
        self.media_stack.pop();
        result
    }

    fn parse_media_body(&mut self, depth: usize) -> Result<(), CssError> {
        loop {
            self.skip_ws_and_comments();
            let (line, column) = (self.line, self.column);
            match self.peek() {
                None => {
                    return self.check(
                        Checks::UNCLOSED_BLOCKS,
                        ParseErrorKind::UnclosedBlock,
                        line,
                        column,
                    );
                }
                Some('}') => {
                    self.bump();
                    return Ok(());
                }
                Some('@') => self.parse_at_rule(depth + 1)?,
                Some(_) => self.parse_style_rule(depth + 1)?,
            }
        }
    }

    fn parse_flat_at_rule(
        &mut self,
        name: &str,
        line: usize,
        column: usize,
    ) -> Result<(), CssError> {
        let (prelude, term) = self.read_until_boundary();
        if term != Term::Open {
            return self.check(
                Checks::MALFORMED_AT_RULES,
                ParseErrorKind::MalformedAtRule,
                line,
                column,
            );
        }
        let declarations = self.parse_declaration_list()?;
        self.push_at_rule(name, &prelude, AtRuleContent::Declarations(declarations));
        Ok(())
    }

    fn parse_block_at_rule(
        &mut self,
        name: &str,
        depth: usize,
        line: usize,
        column: usize,
    ) -> Result<(), CssError> {
        if depth >= self.opts.limits.max_nesting_depth {
            return Err(CssError::NestingTooDeep {
                line,
                limit: self.opts.limits.max_nesting_depth,
            });
        }
        let (prelude, term) = self.read_until_boundary();
        match term {
            // Statement form, e.g. `@layer base, components;`.
            Term::Semi => {
                self.push_at_rule(name, &prelude, AtRuleContent::Empty);
                Ok(())
            }
            Term::Open => {
                let rules = self.parse_nested_rules()?;
                self.push_at_rule(name, &prelude, AtRuleContent::Rules(rules));
                Ok(())
            }
            Term::Close | Term::Eof => self.check(
                Checks::MALFORMED_AT_RULES,
                ParseErrorKind::MalformedAtRule,
                line,
                column,
            ),
        }
    }

    /// Declaration list of a flat at-rule body (`@font-face`, `@page`, ...).
    fn parse_declaration_list(&mut self) -> Result<Vec<Declaration>, CssError> {
        let mut declarations = Vec::new();
        loop {
            self.skip_ws_and_comments();
            let (line, column) = (self.line, self.column);
            match self.peek() {
                None => {
                    self.check(
                        Checks::UNCLOSED_BLOCKS,
                        ParseErrorKind::UnclosedBlock,
                        line,
                        column,
                    )?;
                    if !self.opts.fix_braces {
                        declarations.clear();
                    }
                    return Ok(declarations);
                }
                Some('}') => {
                    self.bump();
                    return Ok(declarations);
                }
                Some(_) => {
                    let (text, term) = self.read_until_boundary();
                    match term {
                        Term::Semi => {
                            if let Some(d) = self.declaration_from(&text, line, column)? {
                                declarations.push(d);
                            }
                        }
                        Term::Close => {
                            if let Some(d) = self.declaration_from(&text, line, column)? {
                                declarations.push(d);
                            }
                            self.bump();
                            return Ok(declarations);
                        }
                        Term::Open => {
                            self.check(
                                Checks::MALFORMED_AT_RULES,
                                ParseErrorKind::MalformedAtRule,
                                line,
                                column,
                            )?;
                            self.skip_block();
                        }
                        Term::Eof => {
                            self.check(
                                Checks::UNCLOSED_BLOCKS,
                                ParseErrorKind::UnclosedBlock,
                                line,
                                column,
                            )?;
                            if self.opts.fix_braces {
                                if let Some(d) = self.declaration_from(&text, line, column)? {
                                    declarations.push(d);
                                }
                            } else {
                                declarations.clear();
                            }
                            return Ok(declarations);
                        }
                    }
                }
            }
        }
    }

    /// Nested rule list of a block at-rule body (`@keyframes` frames,
    /// `@supports` rules, ...). Nested rules carry local ids 0..n.
    fn parse_nested_rules(&mut self) -> Result<Vec<Rule>, CssError> {
        let mut rules = Vec::new();
        loop {
            self.skip_ws_and_comments();
            let (line, column) = (self.line, self.column);
            match self.peek() {
                None => {
                    self.check(
                        Checks::UNCLOSED_BLOCKS,
                        ParseErrorKind::UnclosedBlock,
                        line,
                        column,
                    )?;
                    if !self.opts.fix_braces {
                        rules.clear();
                    }
                    return Ok(rules);
                }
                Some('}') => {
                    self.bump();
                    return Ok(rules);
                }
                Some('@') => {
                    self.check(
                        Checks::MALFORMED_AT_RULES,
                        ParseErrorKind::MalformedAtRule,
                        line,
                        column,
                    )?;
                    self.bump();
                    self.read_ident();
                    self.skip_at_construct();
                }
                Some(_) => {
                    let (raw, term) = self.read_until_boundary();
                    match term {
                        Term::Open => {
                            let declarations = self.parse_declaration_list()?;
                            let selector = normalize_ws(&raw);
                            if !selector.is_empty() {
                                rules.push(Rule::new(rules.len(), selector, declarations));
                            }
                        }
                        Term::Semi | Term::Close => {
                            if !raw.trim().is_empty() {
                                self.check(
                                    Checks::MALFORMED_DECLARATIONS,
                                    ParseErrorKind::MalformedDeclaration,
                                    line,
                                    column,
                                )?;
                            }
                        }
                        Term::Eof => {
                            self.check(
                                Checks::UNCLOSED_BLOCKS,
                                ParseErrorKind::UnclosedBlock,
                                line,
                                column,
                            )?;
                            if !self.opts.fix_braces {
                                rules.clear();
                            }
                            return Ok(rules);
                        }
                    }
                }
            }
        }
    }

    fn push_at_rule(&mut self, name: &str, prelude: &str, content: AtRuleContent) {
        let prelude = normalize_ws(prelude);
        let selector = if prelude.is_empty() {
            format!("@{name}")
        } else {
            format!("@{name} {prelude}")
        };
        let id = self.sheet.items.len();
        self.register_media(id);
        self.sheet.items.push(Item::AtRule(AtRule {
            id,
            selector,
            content,
        }));
        self.seen_rule = true;
    }
}

/// Resolves a nested selector against its parent: `&` is substituted, a
/// bare child selector becomes a descendant. Both sides may be comma
/// lists; the product is taken.
fn combine_nested_selector(parent: &str, child: &str) -> String {
    let mut combined = Vec::new();
    for p in split_top_level(parent, ',') {
        let p = p.trim();
        for c in split_top_level(child, ',') {
            let c = c.trim();
            if c.is_empty() {
                continue;
            }
            if c.contains('&') {
                combined.push(c.replace('&', p));
            } else {
                combined.push(format!("{p} {c}"));
            }
        }
    }
    combined.join(", ")
}

/// Extracts the target and optional media list from an `@import` prelude:
/// `url("x.css") print, screen` or `"x.css"` or a bare token.
fn parse_import_target(text: &str) -> Option<(String, Vec<String>)> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let (url, rest) = if text.len() >= 4 && text[..4].eq_ignore_ascii_case("url(") {
        let inner = &text[4..];
        let end = inner.find(')')?;
        let url = inner[..end].trim().trim_matches(|c| c == '"' || c == '\'');
        (url.to_string(), &inner[end + 1..])
    } else if let Some(quote) = text.chars().next().filter(|c| *c == '"' || *c == '\'') {
        let inner = &text[1..];
        let end = inner.find(quote)?;
        (inner[..end].to_string(), &inner[end + 1..])
    } else {
        let end = text.find(char::is_whitespace).unwrap_or(text.len());
        (text[..end].to_string(), &text[end..])
    };
    if url.is_empty() {
        return None;
    }
    let media: Vec<String> = split_top_level(rest, ',')
        .into_iter()
        .map(normalize_ws)
        .filter(|m| !m.is_empty())
        .collect();
    Some((url, media))
}
