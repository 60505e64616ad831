// SPDX-FileCopyrightText: 2026 spref Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turning figment failures into miette diagnostics.
//!
//! Each figment error becomes one [`ConfigError`]. Where the offending key can
//! be found in a TOML source, the diagnostic carries a labelled span; unknown
//! keys also get the closest valid key by Jaro-Winkler similarity.

#![allow(unused_assignments)] // emitted by the Diagnostic derive

use figment::error::Kind;
use miette::{Diagnostic, GraphicalReportHandler, NamedSource, SourceSpan};
use thiserror::Error;

/// Scores at or below this are not offered as suggestions.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// A TOML source as `(display path, contents)`.
pub type TomlSource = (String, String);

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("`{key}` is not a recognised setting")]
    #[diagnostic(
        code(spref::config::unknown_key),
        help("{}", unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        key: String,
        suggestion: Option<String>,
        /// Keys accepted in the same table, comma separated.
        valid_keys: String,
        #[label("unknown key")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("`{key}` has the wrong type: {detail}")]
    #[diagnostic(code(spref::config::invalid_type), help("use a value of type {expected}"))]
    InvalidType {
        key: String,
        detail: String,
        expected: String,
        #[label("wrong type")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("required setting `{key}` is missing")]
    #[diagnostic(code(spref::config::missing_key), help("set `{key}` in spref.toml"))]
    MissingKey { key: String },

    /// Parsed fine but failed a semantic check.
    #[error("invalid configuration: {message}")]
    #[diagnostic(code(spref::config::validation))]
    Validation { message: String },

    #[error("configuration error: {0}")]
    #[diagnostic(code(spref::config::other))]
    Other(String),
}

fn unknown_key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    let listing = format!("accepted keys here: {valid_keys}");
    match suggestion {
        Some(close) => format!("did you mean `{close}`? {listing}"),
        None => listing,
    }
}

/// Convert every error carried by `err`.
pub fn figment_to_config_errors(err: figment::Error, sources: &[TomlSource]) -> Vec<ConfigError> {
    err.into_iter().map(|error| convert(&error, sources)).collect()
}

fn convert(error: &figment::Error, sources: &[TomlSource]) -> ConfigError {
    match &error.kind {
        Kind::UnknownField(field, accepted) => {
            let (span, src) = split(locate(error, field, sources));
            ConfigError::UnknownKey {
                key: field.clone(),
                suggestion: suggest_key(field, *accepted),
                valid_keys: accepted.join(", "),
                span,
                src,
            }
        }
        Kind::MissingField(field) => ConfigError::MissingKey {
            key: field.to_string(),
        },
        Kind::InvalidType(found, expected) => {
            let dotted = error.path.join(".");
            let located = error
                .path
                .last()
                .and_then(|field| locate(error, field, sources));
            let (span, src) = split(located);
            ConfigError::InvalidType {
                key: dotted,
                detail: format!("found {found}"),
                expected: expected.to_string(),
                span,
                src,
            }
        }
        _ => ConfigError::Other(error.to_string()),
    }
}

fn split<A, B>(pair: Option<(A, B)>) -> (Option<A>, Option<B>) {
    match pair {
        Some((a, b)) => (Some(a), Some(b)),
        None => (None, None),
    }
}

/// Pick the TOML source the error came from and find `field` in it.
///
/// Errors from inline strings have no file metadata; with exactly one source
/// that source is assumed.
fn locate(
    error: &figment::Error,
    field: &str,
    sources: &[TomlSource],
) -> Option<(SourceSpan, NamedSource<String>)> {
    let origin = error.metadata.as_ref().and_then(|meta| match &meta.source {
        Some(figment::Source::File(path)) => Some(path.display().to_string()),
        _ => None,
    });

    let (name, content) = match (origin, sources) {
        (Some(path), _) => sources.iter().find(|(name, _)| *name == path)?,
        (None, [only]) => only,
        (None, _) => return None,
    };

    let offset = find_key_offset(content, &error.path, field)?;
    Some((
        SourceSpan::new(offset.into(), field.len()),
        NamedSource::new(name, content.clone()),
    ))
}

/// Byte offset of `field` as a key under the table named by `path[0]`.
///
/// With an empty path the search starts at the top of the document. The
/// search stops at the next table header.
pub fn find_key_offset(content: &str, path: &[String], field: &str) -> Option<usize> {
    let mut offset = match path.first() {
        Some(table) => {
            let header = format!("[{table}]");
            content.find(&header)? + header.len()
        }
        None => 0,
    };

    for line in content[offset..].split_inclusive('\n') {
        let body = line.trim_start();
        if body.starts_with('[') {
            break;
        }
        let is_key = body
            .strip_prefix(field)
            .is_some_and(|after| after.trim_start().starts_with('='));
        if is_key {
            return Some(offset + (line.len() - body.len()));
        }
        offset += line.len();
    }
    None
}

/// The valid key closest to `unknown`, if any is close enough.
pub fn suggest_key<S: AsRef<str>>(unknown: &str, valid_keys: &[S]) -> Option<String> {
    valid_keys
        .iter()
        .map(|key| (strsim::jaro_winkler(unknown, key.as_ref()), key.as_ref()))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, key)| key.to_string())
}

/// Print each error to stderr as a graphical miette report.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = GraphicalReportHandler::new();
    for error in errors {
        let mut rendered = String::new();
        match handler.render_report(&mut rendered, error) {
            Ok(()) => eprint!("{rendered}"),
            Err(_) => eprintln!("error: {error}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn close_typo_gets_a_suggestion() {
        assert_eq!(
            suggest_key("nmae", &["name", "database_path", "wal_mode"]).as_deref(),
            Some("name")
        );
        assert_eq!(
            suggest_key("should_overide", &["path", "should_override", "merge_when"]).as_deref(),
            Some("should_override")
        );
    }

    #[test]
    fn distant_typo_gets_none() {
        assert_eq!(suggest_key("zzzzzz", &["passphrase", "key_hex"]), None);
    }

    #[test]
    fn key_is_found_under_its_table() {
        let content = "[logging]\nnmae = 1\n[store]\n  nmae = \"x\"\n";
        let offset = find_key_offset(content, &["store".to_string()], "nmae").unwrap();
        assert_eq!(offset, content.rfind("nmae").unwrap());
    }

    #[test]
    fn longer_key_with_same_prefix_is_not_matched() {
        let content = "[store]\nname_extra = 1\nname = \"x\"\n";
        let offset = find_key_offset(content, &["store".to_string()], "name").unwrap();
        assert_eq!(&content[offset..offset + 6], "name =");
    }

    #[test]
    fn search_stops_at_next_table() {
        let content = "[store]\nname = \"x\"\n[logging]\nlevel = \"info\"\n";
        assert_eq!(find_key_offset(content, &["store".to_string()], "level"), None);
    }

    #[test]
    fn help_lists_accepted_keys() {
        assert_eq!(
            unknown_key_help(Some("name"), "name, wal_mode"),
            "did you mean `name`? accepted keys here: name, wal_mode"
        );
        assert_eq!(unknown_key_help(None, "level"), "accepted keys here: level");
    }
}
