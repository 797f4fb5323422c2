use std::borrow::Cow;
use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::ParseError;

/// Supported document serialization formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Yaml,
    Toml,
    Unknown,
}

impl ConfigFormat {
    pub fn detect_from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ConfigFormat::Json,
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                ConfigFormat::Yaml
            }
            Some(ext) if ext.eq_ignore_ascii_case("toml") => ConfigFormat::Toml,
            _ => ConfigFormat::Unknown,
        }
    }
}

// `$$` escapes a literal `$`; `${VAR}`, `${env:VAR}` and `${VAR:-fallback}`
// are references.
static ENV_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\$|\$\{(?:env:)?([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
        .expect("env reference pattern")
});

/// Expand environment references using the process environment.
pub fn substitute_env_vars(input: &str) -> Cow<'_, str> {
    substitute_env_vars_with(input, |name| std::env::var(name).ok())
}

/// Expand environment references using `lookup`. Unset variables without a
/// fallback expand to the empty string.
pub fn substitute_env_vars_with<F>(input: &str, lookup: F) -> Cow<'_, str>
where
    F: Fn(&str) -> Option<String>,
{
    ENV_REFERENCE.replace_all(input, |caps: &Captures<'_>| {
        let Some(name) = caps.get(1) else {
            return "$".to_string();
        };
        match lookup(name.as_str()) {
            Some(value) => value,
            None => {
                let fallback = caps.get(2).map(|m| m.as_str());
                if fallback.is_none() {
                    tracing::debug!(variable = name.as_str(), "unset environment reference");
                }
                fallback.unwrap_or_default().to_string()
            }
        }
    })
}

fn parse_value(input: &str, format: ConfigFormat) -> Result<Value, ParseError> {
    match format {
        ConfigFormat::Json => serde_json::from_str(input).map_err(ParseError::Json),
        ConfigFormat::Yaml => serde_yaml::from_str(input).map_err(ParseError::Yaml),
        ConfigFormat::Toml => toml::from_str(input).map_err(ParseError::Toml),
        ConfigFormat::Unknown => match serde_json::from_str(input) {
            Ok(value) => Ok(value),
            Err(_) => serde_yaml::from_str(input).map_err(ParseError::Yaml),
        },
    }
}

/// Expand environment references inside string leaves of a parsed tree.
///
/// Keys and structure are never rewritten. A string that is exactly one
/// reference takes the type of what it expands to when that is a number or
/// a bool, and becomes null when it expands to nothing.
pub fn expand_env_vars_with<F>(value: Value, lookup: &F) -> Value
where
    F: Fn(&str) -> Option<String>,
{
    match value {
        Value::String(raw) => expand_scalar(raw, lookup),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| expand_env_vars_with(item, lookup))
                .collect(),
        ),
        Value::Object(entries) => Value::Object(
            entries
                .into_iter()
                .map(|(key, item)| (key, expand_env_vars_with(item, lookup)))
                .collect(),
        ),
        other => other,
    }
}

fn expand_scalar<F>(raw: String, lookup: &F) -> Value
where
    F: Fn(&str) -> Option<String>,
{
    let whole_reference = ENV_REFERENCE
        .captures(&raw)
        .and_then(|caps| caps.get(0).zip(caps.get(1)))
        .is_some_and(|(whole, _)| whole.start() == 0 && whole.end() == raw.len());
    let expanded = match substitute_env_vars_with(&raw, lookup) {
        Cow::Borrowed(_) => return Value::String(raw),
        Cow::Owned(expanded) => expanded,
    };
    if !whole_reference {
        return Value::String(expanded);
    }
    if expanded.is_empty() {
        return Value::Null;
    }
    match serde_yaml::from_str::<Value>(&expanded) {
        Ok(typed @ (Value::Number(_) | Value::Bool(_))) => typed,
        _ => Value::String(expanded),
    }
}

/// Parse a document, then expand environment references in its strings.
pub fn parse<M: DeserializeOwned>(input: &str, format: ConfigFormat) -> Result<M, ParseError> {
    parse_with(input, format, |name| std::env::var(name).ok())
}

/// Like [`parse`], resolving references through `lookup`.
pub fn parse_with<M, F>(input: &str, format: ConfigFormat, lookup: F) -> Result<M, ParseError>
where
    M: DeserializeOwned,
    F: Fn(&str) -> Option<String>,
{
    let value = expand_env_vars_with(parse_value(input, format)?, &lookup);
    serde_json::from_value(value).map_err(ParseError::Shape)
}

/// Parse a document from disk; the format is inferred from the extension.
pub fn parse_path<M: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<M, ParseError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&raw, ConfigFormat::detect_from_path(path))
}
