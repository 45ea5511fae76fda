//! Error types for CSS parsing and processing.
//!
//! Parsing is lenient by default: malformed constructs are skipped or
//! auto-corrected and only escalate to an error when the caller opts into the
//! corresponding strict check. Resource ceilings (input size, nesting depth,
//! property/value length, media-query count) are enforced unconditionally and
//! always raise.

use std::fmt;

use thiserror::Error;

/// Reason code carried by a [`CssError::Parse`] error.
///
/// Each variant corresponds to one of the granular strict-validation checks
/// in [`Checks`](crate::options::Checks); a variant is only ever raised when
/// its check is enabled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// A declaration had a property but no value (`color:;`).
    EmptyValue,
    /// A declaration without a `:` separator, or an unparsable fragment
    /// where a declaration was expected.
    MalformedDeclaration,
    /// An empty selector, or an empty segment in a selector list (`h1,,h2`).
    InvalidSelector,
    /// A selector containing structurally invalid syntax, such as
    /// unbalanced brackets.
    InvalidSelectorSyntax,
    /// An at-rule that is misplaced, truncated, or unrecognized.
    MalformedAtRule,
    /// A block left unclosed at end of input.
    UnclosedBlock,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ParseErrorKind::EmptyValue => "empty declaration value",
            ParseErrorKind::MalformedDeclaration => "malformed declaration",
            ParseErrorKind::InvalidSelector => "invalid selector",
            ParseErrorKind::InvalidSelectorSyntax => "invalid selector syntax",
            ParseErrorKind::MalformedAtRule => "malformed at-rule",
            ParseErrorKind::UnclosedBlock => "unclosed block",
        };
        f.write_str(text)
    }
}

/// Errors that can occur while parsing, merging, or resolving imports.
///
/// # Examples
///
/// ```rust
/// use csscade::{CssError, ParseOptions, parse_with_options};
///
/// let opts = ParseOptions {
///     raise_errors: true,
///     ..ParseOptions::default()
/// };
/// let result = parse_with_options("h1 { color: }", &opts);
/// assert!(matches!(result, Err(CssError::Parse { .. })));
/// ```
#[derive(Error, Debug)]
pub enum CssError {
    /// Malformed input rejected by an enabled strict check.
    #[error("CSS syntax error at line {line}, column {column}: {reason}")]
    Parse {
        line: usize,
        column: usize,
        reason: ParseErrorKind,
    },

    /// The input text exceeds the configured size ceiling.
    #[error("input is {size} bytes, over the {limit} byte limit")]
    InputTooLarge { size: usize, limit: usize },

    /// A property name exceeds the configured length ceiling.
    #[error("property name at line {line} exceeds {limit} characters")]
    PropertyTooLong { line: usize, limit: usize },

    /// A declaration value exceeds the configured length ceiling.
    #[error("value at line {line} exceeds {limit} characters")]
    ValueTooLong { line: usize, limit: usize },

    /// The stylesheet interns more distinct media queries than allowed.
    #[error("stylesheet uses more than {limit} distinct media queries")]
    TooManyMediaQueries { limit: usize },

    /// Block nesting went past the configured recursion ceiling.
    #[error("nesting at line {line} exceeds the depth limit of {limit}")]
    NestingTooDeep { line: usize, limit: usize },

    /// An `@import` chain went past the policy's `max_depth`.
    #[error("import chain exceeds the depth limit of {limit}")]
    ImportDepthExceeded { limit: usize },

    /// An `@import` refers, directly or indirectly, back to a stylesheet
    /// that is still being resolved.
    #[error("circular import: {url}")]
    CircularImport { url: String },

    /// The import URL's scheme is not in the policy's allow list.
    #[error("import scheme not allowed: {url}")]
    SchemeNotAllowed { url: String },

    /// The import URL's file extension is not in the policy's allow list.
    #[error("import extension not allowed: {url}")]
    ExtensionNotAllowed { url: String },

    /// The caller-supplied loader failed to produce CSS text.
    #[error("failed to load import {url}: {reason}")]
    ImportFailed { url: String, reason: String },
}
