//! Resource paths and placeholder resolution for theme/skin documents.
//!
//! Theme and skin documents reference their own bundle with tokens:
//!
//! - `<theme-path>`: absolute URL of the theme bundle
//! - `<skin-path>`: absolute URL of the skin bundle (skin documents only)
//! - `<resource-N>`: entry `N` of the document's `resources` array
//!
//! Resolution walks the parsed JSON tree and rewrites string values; object
//! keys are never touched. Path tokens are substituted first (including
//! inside `resources`), then resource tokens, then `resources` is dropped.

use serde_json::Value;

use themecat_net::encode_uri;
use themecat_types::error::{CatalogError, Result};

/// File name of a theme document inside its bundle.
pub const THEME_DOCUMENT: &str = "theme.json";
/// File name of a skin document inside its bundle.
pub const SKIN_DOCUMENT: &str = "skin.json";

const THEME_PATH_TOKEN: &str = "<theme-path>";
const SKIN_PATH_TOKEN: &str = "<skin-path>";
const RESOURCE_TOKEN_PREFIX: &str = "<resource-";

/// Relative bundle path of a theme.
pub fn theme_resource_path(theme_name: &str) -> String {
    format!("/themes/{theme_name}")
}

/// Relative bundle path of a skin within a theme.
pub fn skin_resource_path(theme_name: &str, skin_name: &str) -> String {
    format!("/themes/{theme_name}/skins/{skin_name}")
}

/// Prefix `path` with `base` (local application directory or service URL)
/// and percent-encode the result.
pub fn absolute_url(base: &str, path: &str) -> String {
    encode_uri(&format!("{}{path}", base.trim_end_matches('/')))
}

/// What to do with placeholder tokens nothing could substitute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlaceholderPolicy {
    /// Leave them in place and log a warning.
    #[default]
    Verbatim,
    /// Fail the load.
    Strict,
}

/// Substitution values for the path tokens of one document.
#[derive(Debug, Clone)]
pub struct PathTokens {
    pub theme_url: String,
    /// `None` for theme documents, which have no `<skin-path>`.
    pub skin_url: Option<String>,
}

impl PathTokens {
    pub fn for_theme(base: &str, theme_name: &str) -> Self {
        Self {
            theme_url: absolute_url(base, &theme_resource_path(theme_name)),
            skin_url: None,
        }
    }

    pub fn for_skin(base: &str, theme_name: &str, skin_name: &str) -> Self {
        Self {
            theme_url: absolute_url(base, &theme_resource_path(theme_name)),
            skin_url: Some(absolute_url(base, &skin_resource_path(theme_name, skin_name))),
        }
    }
}

/// Resolve every placeholder in `doc` and strip its `resources` array.
///
/// `label` names the document in errors and logs.
pub fn resolve_document(
    mut doc: Value,
    tokens: &PathTokens,
    policy: PlaceholderPolicy,
    label: &str,
) -> Result<Value> {
    if !doc.is_object() {
        return Err(CatalogError::Load(format!(
            "{label}: document is not a JSON object"
        )));
    }

    rewrite_strings(&mut doc, &|s| substitute_paths(s, tokens));

    let resources = take_resources(&mut doc, label)?;
    if !resources.is_empty() {
        rewrite_strings(&mut doc, &|s| substitute_resources(s, &resources));
    }

    let mut leftovers = Vec::new();
    collect_placeholders(&doc, &mut leftovers);
    if !leftovers.is_empty() {
        leftovers.sort();
        leftovers.dedup();
        match policy {
            PlaceholderPolicy::Verbatim => {
                log::warn!("{label}: unresolved placeholders left verbatim: {leftovers:?}");
            },
            PlaceholderPolicy::Strict => {
                return Err(CatalogError::Load(format!(
                    "{label}: unresolved placeholders {leftovers:?}"
                )));
            },
        }
    }

    Ok(doc)
}

/// Apply `f` to every string value in the tree; `Some` replaces the string.
fn rewrite_strings(value: &mut Value, f: &dyn Fn(&str) -> Option<String>) {
    match value {
        Value::String(s) => {
            if let Some(replaced) = f(s) {
                *s = replaced;
            }
        },
        Value::Array(items) => items.iter_mut().for_each(|v| rewrite_strings(v, f)),
        Value::Object(map) => map.values_mut().for_each(|v| rewrite_strings(v, f)),
        _ => {},
    }
}

fn substitute_paths(s: &str, tokens: &PathTokens) -> Option<String> {
    let has_theme = s.contains(THEME_PATH_TOKEN);
    let has_skin = tokens.skin_url.is_some() && s.contains(SKIN_PATH_TOKEN);
    if !has_theme && !has_skin {
        return None;
    }
    let mut out = s.replace(THEME_PATH_TOKEN, &tokens.theme_url);
    if let Some(ref skin_url) = tokens.skin_url {
        out = out.replace(SKIN_PATH_TOKEN, skin_url);
    }
    Some(out)
}

/// Replace each `<resource-N>` with `resources[N]`. Out-of-range indices
/// stay as they are. Substituted text is not rescanned.
fn substitute_resources(s: &str, resources: &[String]) -> Option<String> {
    if !s.contains(RESOURCE_TOKEN_PREFIX) {
        return None;
    }
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find(RESOURCE_TOKEN_PREFIX) {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        match parse_resource_token(tail) {
            Some((index, len)) if index < resources.len() => {
                out.push_str(&resources[index]);
                rest = &tail[len..];
            },
            _ => {
                out.push_str(RESOURCE_TOKEN_PREFIX);
                rest = &tail[RESOURCE_TOKEN_PREFIX.len()..];
            },
        }
    }
    out.push_str(rest);
    Some(out)
}

/// Parse `<resource-N>` at the start of `s`: `(N, token length)`.
fn parse_resource_token(s: &str) -> Option<(usize, usize)> {
    let digits = s.strip_prefix(RESOURCE_TOKEN_PREFIX)?;
    let end = digits.find('>')?;
    let number = &digits[..end];
    if number.is_empty() || !number.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let index = number.parse().ok()?;
    Some((index, RESOURCE_TOKEN_PREFIX.len() + end + 1))
}

/// Remove and return the `resources` array. A missing array is empty.
fn take_resources(doc: &mut Value, label: &str) -> Result<Vec<String>> {
    let Some(raw) = doc.as_object_mut().and_then(|m| m.remove("resources")) else {
        return Ok(Vec::new());
    };
    match raw {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::String(s) => Ok(s),
                other => Err(CatalogError::Load(format!(
                    "{label}: resources[{i}] is not a string: {other}"
                ))),
            })
            .collect(),
        other => Err(CatalogError::Load(format!(
            "{label}: resources is not an array: {other}"
        ))),
    }
}

fn collect_placeholders(value: &Value, found: &mut Vec<String>) {
    match value {
        Value::String(s) => found.extend(find_placeholders(s).into_iter().map(str::to_string)),
        Value::Array(items) => items.iter().for_each(|v| collect_placeholders(v, found)),
        Value::Object(map) => map.values().for_each(|v| collect_placeholders(v, found)),
        _ => {},
    }
}

/// Every well-formed placeholder token in `s`.
fn find_placeholders(s: &str) -> Vec<&str> {
    let mut found = Vec::new();
    let mut offset = 0;
    while let Some(rel) = s[offset..].find('<') {
        let start = offset + rel;
        let Some(close) = s[start..].find('>') else {
            break;
        };
        let candidate = &s[start..start + close + 1];
        let known = candidate == THEME_PATH_TOKEN
            || candidate == SKIN_PATH_TOKEN
            || parse_resource_token(candidate).is_some();
        if known {
            found.push(candidate);
            offset = start + candidate.len();
        } else {
            offset = start + 1;
        }
    }
    found
}
