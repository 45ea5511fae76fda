//! Configuration surface: parse options, strict-validation checks, resource
//! ceilings, and serializer formatting.

use bitflags::bitflags;

bitflags! {
    /// Granular strict-validation checks.
    ///
    /// Each flag independently toggles whether a specific class of
    /// malformation raises a [`CssError::Parse`](crate::CssError::Parse)
    /// (when [`ParseOptions::raise_errors`] is on) or is silently tolerated.
    ///
    /// # Example
    ///
    /// ```
    /// use csscade::Checks;
    ///
    /// let mut checks = Checks::empty();
    /// checks |= Checks::EMPTY_VALUES;
    /// checks |= Checks::UNCLOSED_BLOCKS;
    ///
    /// assert!(checks.contains(Checks::EMPTY_VALUES));
    /// assert!(!checks.contains(Checks::MALFORMED_AT_RULES));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Checks: u8 {
        /// Declarations with a property but no value.
        const EMPTY_VALUES            = 0b0000_0001;
        /// Declarations without a `:`, or unparsable fragments.
        const MALFORMED_DECLARATIONS  = 0b0000_0010;
        /// Empty selectors or empty selector-list segments.
        const INVALID_SELECTORS       = 0b0000_0100;
        /// Structurally broken selectors (unbalanced brackets etc).
        const INVALID_SELECTOR_SYNTAX = 0b0000_1000;
        /// Misplaced, truncated, or unrecognized at-rules.
        const MALFORMED_AT_RULES      = 0b0001_0000;
        /// Blocks left unclosed at end of input.
        const UNCLOSED_BLOCKS         = 0b0010_0000;
    }
}

impl Default for Checks {
    fn default() -> Self {
        Checks::all()
    }
}

/// Hard resource ceilings enforced during parsing.
///
/// These bound worst-case CPU and memory on adversarial input. Unlike the
/// [`Checks`] toggles they are not optional: exceeding a ceiling always
/// aborts the parse with a typed error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Limits {
    /// Maximum input size in bytes.
    pub max_input_size: usize,
    /// Maximum block nesting depth (braces, nested rules, nested `@media`).
    pub max_nesting_depth: usize,
    /// Maximum property name length in characters.
    pub max_property_length: usize,
    /// Maximum declaration value length in characters.
    pub max_value_length: usize,
    /// Maximum number of distinct media-query identifiers per stylesheet.
    pub max_media_queries: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_input_size: 8 * 1024 * 1024,
            max_nesting_depth: 64,
            max_property_length: 512,
            max_value_length: 16 * 1024,
            max_media_queries: 1024,
        }
    }
}

/// Options accepted by [`parse_with_options`](crate::parse_with_options) and
/// [`Stylesheet::add_block`](crate::Stylesheet::add_block).
///
/// The defaults never raise on malformed CSS, matching the tolerance
/// real-world CSS consumers expect; callers opt into strictness per check.
#[derive(Clone, Debug)]
pub struct ParseOptions {
    /// Master switch: when off, every check merely logs a warning.
    pub raise_errors: bool,
    /// Which malformation classes escalate to errors when `raise_errors`
    /// is on.
    pub checks: Checks,
    /// Auto-close blocks left open at end of input, keeping their content.
    /// When off, the unterminated trailing content is dropped instead.
    pub fix_braces: bool,
    /// Track comma-separated selector lists so that rules originating from
    /// one list can be re-grouped on serialization.
    pub selector_lists: bool,
    /// Resource ceilings.
    pub limits: Limits,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            raise_errors: false,
            checks: Checks::default(),
            fix_braces: false,
            selector_lists: false,
            limits: Limits::default(),
        }
    }
}

impl ParseOptions {
    /// Options with every strict check raising and selector-list tracking on.
    pub fn strict() -> Self {
        ParseOptions {
            raise_errors: true,
            selector_lists: true,
            ..ParseOptions::default()
        }
    }
}

/// Serializer formatting options.
#[derive(Clone, Copy, Debug)]
pub struct FormatOptions {
    /// One declaration per line instead of one rule per line.
    pub pretty: bool,
    /// Spaces per indentation level.
    pub indent: usize,
    /// Maximum rendered line length before a comma-joined selector list is
    /// wrapped. Only consulted in pretty mode.
    pub max_line_length: usize,
}

impl Default for FormatOptions {
    fn default() -> Self {
        FormatOptions {
            pretty: false,
            indent: 2,
            max_line_length: 78,
        }
    }
}

impl FormatOptions {
    /// Pretty-printing with the default indent and line length.
    pub fn pretty() -> Self {
        FormatOptions {
            pretty: true,
            ..FormatOptions::default()
        }
    }
}
