//! # csscade — CSS parse / cascade / serialize engine
//!
//! A structured, queryable model for CSS source text. This crate provides:
//!
//! - **Parsing**: Convert CSS text into a [`Stylesheet`] of rules and
//!   at-rules, with media-query membership tracked per rule
//! - **Cascade**: Flatten the stylesheet to one winning value per property,
//!   honoring specificity, `!important`, and source order
//! - **Shorthand algebra**: [`expand`] shorthands into longhands and
//!   [`contract`] longhand sets back to the shortest legal shorthand
//! - **Serialization**: Render the model back to CSS, re-grouping selector
//!   lists and `@media` blocks
//!
//! ## Quick Start
//!
//! ```rust
//! use csscade::{FormatOptions, parse};
//!
//! let source = "
//!     .title { margin-top: 10px; margin-right: 10px;
//!              margin-bottom: 10px; margin-left: 10px; }
//!     .title { color: red; }
//!     .title { color: blue; }
//! ";
//!
//! let sheet = parse(source).unwrap();
//! let flat = sheet.flatten();
//!
//! let css = flat.to_css(&FormatOptions::default());
//! assert_eq!(css, ".title { margin: 10px; color: blue; }\n");
//! ```
//!
//! ## Supported Features
//!
//! ### Parsing
//! - Lenient by default; strictness is opt-in per malformation class via
//!   [`ParseOptions`] and [`Checks`]
//! - Nested `@media` with interned query identifiers
//! - Nesting syntax (`&`, implicit descendant) resolved to flat selectors
//! - At-rules: `@media`, `@import`, `@charset`, `@font-face`, `@keyframes`,
//!   `@supports`, `@page`, `@layer`, `@container`, `@property`, `@scope`,
//!   `@counter-style`
//! - Hard ceilings on input size, nesting depth, property/value length, and
//!   distinct media queries, enforced against untrusted input
//!
//! ### Shorthands
//! - `margin`, `padding`, `border`, `border-width`/`-style`/`-color`,
//!   `border-top`/`-right`/`-bottom`/`-left`, `font`, `list-style`,
//!   `background`
//!
//! ## Concurrency
//!
//! All operations are synchronous, in-memory transformations. Independent
//! [`Stylesheet`] values may be processed on different threads freely; the
//! only shared state is the immutable static shorthand tables.
//!
//! ## Modules
//!
//! - [`parser`]: Parsing, cascade, media index, shorthand algebra,
//!   serialization, and the import contract
//! - [`options`]: Parse, check, limit, and format options
//! - [`error`]: Error types for parse failures and resource ceilings

pub mod error;
pub mod options;
pub mod parser;

pub use error::{CssError, ParseErrorKind};
pub use options::{Checks, FormatOptions, Limits, ParseOptions};
pub use parser::imports::{ImportLoader, ImportPolicy, resolve_imports, resolve_imports_with_options};
pub use parser::media::{MediaId, MediaIndex};
pub use parser::selectors::specificity;
pub use parser::shorthand::{contract, expand, is_shorthand};
pub use parser::stylesheet::{
    AtRule, AtRuleContent, Declaration, ImportRef, Item, Rule, Stylesheet,
};
pub use parser::{parse, parse_with_options};
