// SPDX-FileCopyrightText: 2026 Strato Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Figment-to-miette error bridge with "did you mean?" suggestions.
//!
//! Figment reports every deserialization problem in one error chain. Each
//! entry becomes a [`ConfigError`] carrying, when the offending key can be
//! located in a TOML source, a labelled span for miette to render.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Minimum Jaro-Winkler similarity for a key suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// A TOML document that contributed to the loaded configuration.
#[derive(Debug, Clone)]
pub struct ConfigSource {
    /// Display path (file path or `<inline>`).
    pub path: String,
    /// Full document text.
    pub content: String,
}

impl ConfigSource {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// A configuration error with rich diagnostic information.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// An unknown key was found in the configuration.
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(
        code(strato::config::unknown_key),
        help("{}", unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        /// The unrecognized key name.
        key: String,
        /// Closest valid key, if one is similar enough.
        suggestion: Option<String>,
        /// Comma-separated valid keys for the section.
        valid_keys: String,
        /// Location of the offending key.
        #[label("not a recognized key")]
        span: Option<SourceSpan>,
        /// Source document for context display.
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A configuration value has the wrong type.
    #[error("invalid type for `{key}`: {detail}")]
    #[diagnostic(code(strato::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        /// Dotted path of the key.
        key: String,
        /// Description of the mismatch.
        detail: String,
        /// What type was expected.
        expected: String,
    },

    /// A required configuration key is missing.
    #[error("missing required key `{key}`")]
    #[diagnostic(
        code(strato::config::missing_key),
        help("add `{key} = <value>` to your strato.toml")
    )]
    MissingKey {
        /// The missing key name.
        key: String,
    },

    /// A semantic validation failure.
    #[error("validation error: {message}")]
    #[diagnostic(code(strato::config::validation))]
    Validation {
        /// Description of the validation failure.
        message: String,
    },

    /// Any other configuration error.
    #[error("configuration error: {0}")]
    #[diagnostic(code(strato::config::other))]
    Other(String),
}

fn unknown_key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    match suggestion {
        Some(s) => format!("did you mean `{s}`? Valid keys: {valid_keys}"),
        None => format!("valid keys: {valid_keys}"),
    }
}

/// Convert a `figment::Error` chain into `ConfigError` diagnostics.
pub fn figment_to_config_errors(err: figment::Error, sources: &[ConfigSource]) -> Vec<ConfigError> {
    use figment::error::Kind;

    err.into_iter()
        .map(|error| match &error.kind {
            Kind::UnknownField(field, expected) => {
                let section: Vec<String> = error.path.iter().map(|s| s.to_string()).collect();
                let (span, src) = match origin_of(&error, sources) {
                    Some(source) => match locate_key(&source.content, &section, field) {
                        Some(offset) => (
                            Some(SourceSpan::new(offset.into(), field.len())),
                            Some(NamedSource::new(&source.path, source.content.clone())),
                        ),
                        None => (None, None),
                    },
                    None => (None, None),
                };
                ConfigError::UnknownKey {
                    key: field.clone(),
                    suggestion: suggest_key(field, expected),
                    valid_keys: expected.join(", "),
                    span,
                    src,
                }
            }
            Kind::MissingField(field) => ConfigError::MissingKey {
                key: field.to_string(),
            },
            Kind::InvalidType(actual, expected) => ConfigError::InvalidType {
                key: error.path.join("."),
                detail: format!("found {actual}, expected {expected}"),
                expected: expected.to_string(),
            },
            _ => ConfigError::Other(error.to_string()),
        })
        .collect()
}

/// Pick the source document an error was read from, falling back to the only
/// source when there is exactly one (inline strings carry no file metadata).
fn origin_of<'a>(error: &figment::Error, sources: &'a [ConfigSource]) -> Option<&'a ConfigSource> {
    let path = error
        .metadata
        .as_ref()
        .and_then(|m| m.source.as_ref())
        .and_then(|s| match s {
            figment::Source::File(path) => Some(path.display().to_string()),
            _ => None,
        });

    match path {
        Some(path) => sources.iter().find(|s| s.path == path),
        None if sources.len() == 1 => sources.first(),
        None => None,
    }
}

/// Find the byte offset of `field` inside the section named by `path`.
///
/// Both `[section]` tables and `[[section]]` array tables are recognized; for
/// array tables the first occurrence of the key after any header is returned.
/// Top-level fields are searched from the start of the document.
pub fn locate_key(content: &str, path: &[String], field: &str) -> Option<usize> {
    let start = match path.first() {
        None => 0,
        Some(section) => {
            let array_header = format!("[[{section}]]");
            let table_header = format!("[{section}]");
            content
                .find(&array_header)
                .map(|pos| pos + array_header.len())
                .or_else(|| content.find(&table_header).map(|pos| pos + table_header.len()))?
        }
    };

    let mut offset = start;
    for line in content[start..].split_inclusive('\n') {
        let trimmed = line.trim_start();
        if let Some(rest) = trimmed.strip_prefix(field)
            && rest.trim_start().starts_with('=')
        {
            return Some(offset + (line.len() - trimmed.len()));
        }
        offset += line.len();
    }
    None
}

/// Suggest the valid key closest to `unknown`, if any clears the threshold.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    valid_keys
        .iter()
        .map(|key| (strsim::jaro_winkler(unknown, key), *key))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, key)| key.to_string())
}

/// Render `ConfigError`s to stderr using miette's graphical handler.
pub fn render_errors(errors: &[ConfigError]) {
    use miette::GraphicalReportHandler;

    let handler = GraphicalReportHandler::new();
    for error in errors {
        let mut buf = String::new();
        if handler.render_report(&mut buf, error as &dyn Diagnostic).is_ok() {
            eprint!("{buf}");
        } else {
            eprintln!("Error: {error}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggest_naem_for_name() {
        let valid = &["name", "log_level"];
        assert_eq!(suggest_key("naem", valid), Some("name".to_string()));
    }

    #[test]
    fn suggest_stop_timeout_for_typo() {
        let valid = &["stop_timeout_secs", "filter_start_timeout_secs"];
        assert_eq!(
            suggest_key("stop_timout_secs", valid),
            Some("stop_timeout_secs".to_string())
        );
    }

    #[test]
    fn no_suggestion_for_distant_typo() {
        let valid = &["name", "log_level"];
        assert_eq!(suggest_key("zzzzzz", valid), None);
    }

    #[test]
    fn locate_key_in_table() {
        let content = "[lifecycle]\nstop_timout_secs = 10\n";
        let path = vec!["lifecycle".to_string()];
        let o = locate_key(content, &path, "stop_timout_secs").expect("key should be located");
        assert_eq!(&content[o..o + 16], "stop_timout_secs");
    }

    #[test]
    fn locate_key_in_array_table() {
        let content = "[host]\nname = \"x\"\n\n[[associations]]\nfilter = \"f\"\n  facade = \"h\"\n";
        let path = vec!["associations".to_string()];
        let o = locate_key(content, &path, "facade").expect("key should be located");
        assert_eq!(&content[o..o + 6], "facade");
    }

    #[test]
    fn locate_key_missing_section() {
        let content = "[host]\nname = \"x\"\n";
        let path = vec!["lifecycle".to_string()];
        assert_eq!(locate_key(content, &path, "name"), None);
    }
}
