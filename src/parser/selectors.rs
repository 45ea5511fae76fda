//! Selector tokens and the specificity calculator.
//!
//! Specificity follows the W3C weighting: ID selectors count 100, class,
//! attribute, and pseudo-class selectors count 10, type selectors and
//! pseudo-elements count 1. The universal selector and combinators count 0.
//! `:not(X)` contributes nothing itself but its argument is scored
//! recursively.
//!
//! The calculator is total: any string input yields a best-effort count, so
//! malformed selectors degrade instead of erroring.

use nom::IResult;
use nom::bytes::complete::take_while1;

/// Parses a CSS identifier (alphanumerics, dashes, underscores, escapes,
/// and non-ASCII characters).
pub(crate) fn ident(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| {
        c.is_alphanumeric() || c == '-' || c == '_' || c == '\\' || !c.is_ascii()
    })(input)
}

/// Computes the integer specificity of a selector.
///
/// # Examples
///
/// ```
/// use csscade::specificity;
///
/// assert_eq!(specificity("li"), 1);
/// assert_eq!(specificity("li.red.level"), 21);
/// assert_eq!(specificity("#x34y"), 100);
/// assert_eq!(specificity("#s12:not(foo)"), 101);
/// assert_eq!(specificity("ul ol+li"), 3);
/// ```
pub fn specificity(selector: &str) -> u32 {
    specificity_at(selector, 0)
}

/// Recursion ceiling for `:not()` arguments; deeper nesting scores as 0
/// rather than risking the stack on adversarial input.
const MAX_NOT_DEPTH: usize = 32;

fn specificity_at(selector: &str, depth: usize) -> u32 {
    let mut total: u32 = 0;
    let mut pos = 0usize;

    while pos < selector.len() {
        let rest = &selector[pos..];
        let c = match rest.chars().next() {
            Some(c) => c,
            None => break,
        };
        match c {
            '#' => {
                pos += consume_ident(&rest[1..]) + 1;
                total = total.saturating_add(100);
            }
            '.' => {
                pos += consume_ident(&rest[1..]) + 1;
                total = total.saturating_add(10);
            }
            '[' => {
                pos += skip_balanced(rest, '[', ']');
                total = total.saturating_add(10);
            }
            ':' => {
                if rest.starts_with("::") {
                    pos += consume_ident(&rest[2..]) + 2;
                    total = total.saturating_add(1);
                } else {
                    let name_len = consume_ident(&rest[1..]);
                    let name = &rest[1..1 + name_len];
                    let after = &rest[1 + name_len..];
                    if name.eq_ignore_ascii_case("not") && after.starts_with('(') {
                        let arg_len = skip_balanced(after, '(', ')');
                        if depth < MAX_NOT_DEPTH {
                            let inner = inner_of(&after[..arg_len]);
                            total = total.saturating_add(specificity_at(inner, depth + 1));
                        }
                        pos += 1 + name_len + arg_len;
                    } else if after.starts_with('(') {
                        // Functional pseudo-class like :nth-child(2n).
                        pos += 1 + name_len + skip_balanced(after, '(', ')');
                        total = total.saturating_add(10);
                    } else {
                        // Legacy single-colon pseudo-elements weigh like
                        // type selectors.
                        pos += 1 + name_len;
                        total = total.saturating_add(if is_legacy_pseudo_element(name) {
                            1
                        } else {
                            10
                        });
                    }
                }
            }
            '*' | '>' | '+' | '~' | ',' => pos += c.len_utf8(),
            c if c.is_whitespace() => pos += c.len_utf8(),
            '(' => pos += skip_balanced(rest, '(', ')'),
            _ => match ident(rest) {
                Ok((_, name)) => {
                    pos += name.len();
                    total = total.saturating_add(1);
                }
                Err(_) => pos += c.len_utf8(),
            },
        }
    }
    total
}

/// Quick structural screen used by the strict selector checks: balanced
/// brackets and parens, and no characters that cannot appear in a selector.
pub(crate) fn is_well_formed(selector: &str) -> bool {
    let mut paren: i32 = 0;
    let mut bracket: i32 = 0;
    let mut quote: Option<char> = None;
    for c in selector.chars() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '(' => paren += 1,
            ')' => paren -= 1,
            '[' => bracket += 1,
            ']' => bracket -= 1,
            '{' | '}' | ';' | '@' => return false,
            _ => {}
        }
        if paren < 0 || bracket < 0 {
            return false;
        }
    }
    paren == 0 && bracket == 0 && quote.is_none()
}

/// CSS1/CSS2 pseudo-elements that are still written with a single colon.
fn is_legacy_pseudo_element(name: &str) -> bool {
    name.eq_ignore_ascii_case("before")
        || name.eq_ignore_ascii_case("after")
        || name.eq_ignore_ascii_case("first-line")
        || name.eq_ignore_ascii_case("first-letter")
}

/// Byte length of the identifier at the start of `input`, zero if none.
fn consume_ident(input: &str) -> usize {
    match ident(input) {
        Ok((_, name)) => name.len(),
        Err(_) => 0,
    }
}

/// Byte length of a balanced `open`..`close` span starting at `input[0]`,
/// including both delimiters. Unbalanced input consumes to the end.
fn skip_balanced(input: &str, open: char, close: char) -> usize {
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    for (i, c) in input.char_indices() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        if c == '"' || c == '\'' {
            quote = Some(c);
        } else if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth == 0 {
                return i + c.len_utf8();
            }
        }
    }
    input.len()
}

/// The content between the outermost delimiter pair of `span`, which must
/// start with the opening delimiter.
fn inner_of(span: &str) -> &str {
    let mut chars = span.char_indices();
    let start = match chars.next() {
        Some((_, c)) => c.len_utf8(),
        None => return span,
    };
    let end = span
        .char_indices()
        .last()
        .map(|(i, _)| i)
        .unwrap_or(span.len());
    if end > start { &span[start..end] } else { "" }
}
