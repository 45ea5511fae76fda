//! The `@import` resolution contract.
//!
//! Fetching is the caller's concern: the engine asks an [`ImportLoader`]
//! for CSS text and is responsible only for policy enforcement (scheme,
//! extension, recursion depth), cycle detection across the in-flight chain,
//! and merging the imported rules into the importer's id space with an
//! offset so ids stay sequential.

use log::debug;

use crate::error::CssError;
use crate::options::ParseOptions;
use crate::parser::stylesheet::Stylesheet;

/// Caller-supplied limits on what may be imported and how deep.
#[derive(Clone, Debug)]
pub struct ImportPolicy {
    /// URL schemes that may be loaded. URLs without a scheme (relative
    /// paths) are always allowed.
    pub allowed_schemes: Vec<String>,
    /// Permitted file extensions. An empty list lifts the restriction.
    pub extensions: Vec<String>,
    /// Maximum import chain depth.
    pub max_depth: usize,
}

impl Default for ImportPolicy {
    fn default() -> Self {
        ImportPolicy {
            allowed_schemes: vec!["http".to_string(), "https".to_string(), "file".to_string()],
            extensions: vec!["css".to_string()],
            max_depth: 8,
        }
    }
}

/// The I/O collaborator that fetches CSS text. Timeouts, redirects, and
/// caching are its concern, not the engine's.
pub trait ImportLoader {
    fn load(&mut self, url: &str) -> Result<String, String>;
}

/// Recursively resolves every pending `@import` of `sheet`, merging the
/// fetched stylesheets into its rule-id space.
pub fn resolve_imports(
    sheet: &mut Stylesheet,
    loader: &mut dyn ImportLoader,
    policy: &ImportPolicy,
) -> Result<(), CssError> {
    resolve_imports_with_options(sheet, loader, policy, &ParseOptions::default())
}

/// Like [`resolve_imports`], parsing fetched text with explicit options.
pub fn resolve_imports_with_options(
    sheet: &mut Stylesheet,
    loader: &mut dyn ImportLoader,
    policy: &ImportPolicy,
    opts: &ParseOptions,
) -> Result<(), CssError> {
    let mut chain: Vec<String> = Vec::new();
    resolve_level(sheet, loader, policy, opts, &mut chain, 0)
}

fn resolve_level(
    sheet: &mut Stylesheet,
    loader: &mut dyn ImportLoader,
    policy: &ImportPolicy,
    opts: &ParseOptions,
    chain: &mut Vec<String>,
    depth: usize,
) -> Result<(), CssError> {
    let imports = std::mem::take(&mut sheet.imports);
    for import in imports {
        if depth >= policy.max_depth {
            return Err(CssError::ImportDepthExceeded {
                limit: policy.max_depth,
            });
        }
        check_policy(&import.url, policy)?;
        if chain.iter().any(|u| u == &import.url) {
            return Err(CssError::CircularImport { url: import.url });
        }

        let text = loader.load(&import.url).map_err(|reason| CssError::ImportFailed {
            url: import.url.clone(),
            reason,
        })?;
        let mut imported = Stylesheet::parse_with_options(&text, opts)?;

        chain.push(import.url.clone());
        resolve_level(&mut imported, loader, policy, opts, chain, depth + 1)?;
        chain.pop();

        debug!(
            "merging {} imported items from {}",
            imported.items.len(),
            import.url
        );
        sheet.merge(imported, &import.media);
    }
    Ok(())
}

fn check_policy(url: &str, policy: &ImportPolicy) -> Result<(), CssError> {
    if let Some(scheme) = scheme_of(url) {
        if !policy
            .allowed_schemes
            .iter()
            .any(|s| s.eq_ignore_ascii_case(scheme))
        {
            return Err(CssError::SchemeNotAllowed {
                url: url.to_string(),
            });
        }
    }
    if !policy.extensions.is_empty() {
        match extension_of(url) {
            Some(ext) if policy.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)) => {}
            _ => {
                return Err(CssError::ExtensionNotAllowed {
                    url: url.to_string(),
                });
            }
        }
    }
    Ok(())
}

fn scheme_of(url: &str) -> Option<&str> {
    let colon = url.find(':')?;
    let scheme = &url[..colon];
    let valid = !scheme.is_empty()
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.');
    if valid { Some(scheme) } else { None }
}

fn extension_of(url: &str) -> Option<&str> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let name = path.rsplit('/').next().unwrap_or(path);
    let dot = name.rfind('.')?;
    Some(&name[dot + 1..])
}
