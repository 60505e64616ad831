// SPDX-FileCopyrightText: 2026 spref Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Declarative defaults documents.
//!
//! A defaults document is XML with a root element of any name whose direct
//! children declare typed values:
//!
//! ```xml
//! <defaults>
//!     <string name="greeting">hi</string>
//!     <integer name="retries">3</integer>
//!     <float name="ratio">0.5</float>
//!     <long name="quota">5000000000</long>
//!     <boolean name="enabled">true</boolean>
//! </defaults>
//! ```
//!
//! Other element names and deeper nesting are ignored. String bodies are kept
//! verbatim; numeric and boolean bodies are trimmed. A numeric body that does
//! not parse becomes the kind's `-1` sentinel.

use std::fs::File;
use std::io::{BufRead, BufReader, Cursor};
use std::path::{Path, PathBuf};

use quick_xml::encoding::Decoder;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesRef, BytesStart, Event};
use quick_xml::Reader;
use serde::Serialize;
use spref_core::{PrefValue, SprefError, INVALID_FLOAT, INVALID_INT, INVALID_LONG};
use tracing::{debug, warn};

use crate::tags::is_tag_key;

/// A typed default value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum DefaultValue {
    String(String),
    Integer(i32),
    Float(f32),
    Long(i64),
    Boolean(bool),
}

impl DefaultValue {
    /// The XML element name declaring this kind.
    pub fn element_name(&self) -> &'static str {
        match self {
            DefaultValue::String(_) => "string",
            DefaultValue::Integer(_) => "integer",
            DefaultValue::Float(_) => "float",
            DefaultValue::Long(_) => "long",
            DefaultValue::Boolean(_) => "boolean",
        }
    }
}

impl From<DefaultValue> for PrefValue {
    fn from(value: DefaultValue) -> Self {
        match value {
            DefaultValue::String(s) => PrefValue::String(s),
            DefaultValue::Integer(v) => PrefValue::Int(v),
            DefaultValue::Float(v) => PrefValue::Float(v),
            DefaultValue::Long(v) => PrefValue::Long(v),
            DefaultValue::Boolean(v) => PrefValue::Bool(v),
        }
    }
}

/// One `name`/value declaration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DefaultEntry {
    pub name: String,
    #[serde(flatten)]
    pub value: DefaultValue,
    /// True when the body did not parse and the sentinel was substituted.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub substituted: bool,
}

/// Typed default entries in document order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DefaultsDocument {
    entries: Vec<DefaultEntry>,
    #[serde(skip)]
    skipped: usize,
}

/// Where a defaults document is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultsSource {
    File(PathBuf),
    /// A document compiled into the program or built in memory.
    Bytes(Vec<u8>),
}

impl DefaultsSource {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        DefaultsSource::File(path.into())
    }

    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        DefaultsSource::Bytes(bytes.into())
    }

    fn describe(&self) -> String {
        match self {
            DefaultsSource::File(path) => path.display().to_string(),
            DefaultsSource::Bytes(bytes) => format!("<{} embedded bytes>", bytes.len()),
        }
    }
}

/// Element kinds recognised as entries.
#[derive(Debug, Clone, Copy)]
enum EntryKind {
    String,
    Integer,
    Float,
    Long,
    Boolean,
}

impl EntryKind {
    fn from_element(name: &[u8]) -> Option<Self> {
        match name {
            b"string" => Some(EntryKind::String),
            b"integer" => Some(EntryKind::Integer),
            b"float" => Some(EntryKind::Float),
            b"long" => Some(EntryKind::Long),
            b"boolean" => Some(EntryKind::Boolean),
            _ => None,
        }
    }

    /// Convert a body to a value. The flag is true if the sentinel was used.
    fn value_from_body(self, body: &str) -> (DefaultValue, bool) {
        let trimmed = body.trim();
        match self {
            EntryKind::String => (DefaultValue::String(body.to_string()), false),
            EntryKind::Integer => match trimmed.parse() {
                Ok(v) => (DefaultValue::Integer(v), false),
                Err(_) => (DefaultValue::Integer(INVALID_INT), true),
            },
            EntryKind::Float => match trimmed.parse() {
                Ok(v) => (DefaultValue::Float(v), false),
                Err(_) => (DefaultValue::Float(INVALID_FLOAT), true),
            },
            EntryKind::Long => match trimmed.parse() {
                Ok(v) => (DefaultValue::Long(v), false),
                Err(_) => (DefaultValue::Long(INVALID_LONG), true),
            },
            EntryKind::Boolean => (
                DefaultValue::Boolean(trimmed.eq_ignore_ascii_case("true")),
                false,
            ),
        }
    }
}

/// An entry element currently being read.
struct OpenEntry {
    kind: EntryKind,
    name: Option<String>,
    body: String,
    /// Depth of nested elements inside the entry; text is only taken at zero.
    nested: usize,
}

impl DefaultsDocument {
    /// Read a document from `source`.
    pub fn load(source: &DefaultsSource) -> Result<Self, SprefError> {
        match source {
            DefaultsSource::File(path) => Self::from_path(path),
            DefaultsSource::Bytes(bytes) => Self::parse(Cursor::new(bytes.as_slice())),
        }
        .map_err(|e| match e {
            SprefError::Defaults(msg) => {
                SprefError::Defaults(format!("{}: {msg}", source.describe()))
            }
            other => other,
        })
    }

    pub fn from_path(path: &Path) -> Result<Self, SprefError> {
        let file = File::open(path).map_err(|e| SprefError::Defaults(format!("cannot open: {e}")))?;
        Self::parse(BufReader::new(file))
    }

    pub fn parse_str(xml: &str) -> Result<Self, SprefError> {
        Self::parse(xml.as_bytes())
    }

    /// Parse a document from a reader. The reader is consumed.
    pub fn parse<R: BufRead>(reader: R) -> Result<Self, SprefError> {
        let mut reader = Reader::from_reader(reader);
        let mut doc = DefaultsDocument::default();
        let mut buf = Vec::new();
        let mut depth = 0usize;
        let mut seen_root = false;
        let mut open: Option<OpenEntry> = None;

        loop {
            let event = reader.read_event_into(&mut buf).map_err(malformed)?;
            let decoder = reader.decoder();
            match event {
                Event::Start(ref e) => {
                    if depth == 0 && seen_root {
                        return Err(SprefError::Defaults(
                            "document has more than one root element".to_string(),
                        ));
                    }
                    if depth == 0 {
                        seen_root = true;
                    } else if let Some(entry) = open.as_mut() {
                        entry.nested += 1;
                    } else if depth == 1 {
                        open = start_entry(e, decoder)?;
                    }
                    depth += 1;
                }
                Event::Empty(ref e) => {
                    if depth == 0 {
                        if seen_root {
                            return Err(SprefError::Defaults(
                                "document has more than one root element".to_string(),
                            ));
                        }
                        seen_root = true;
                    } else if depth == 1 && open.is_none() {
                        if let Some(entry) = start_entry(e, decoder)? {
                            doc.finish_entry(entry);
                        }
                    }
                }
                Event::End(_) => {
                    depth = depth.saturating_sub(1);
                    let closes_entry = match open.as_mut() {
                        Some(entry) if entry.nested > 0 => {
                            entry.nested -= 1;
                            false
                        }
                        Some(_) => depth == 1,
                        None => false,
                    };
                    if closes_entry {
                        if let Some(entry) = open.take() {
                            doc.finish_entry(entry);
                        }
                    }
                }
                Event::Text(ref t) => {
                    let text = decoder.decode(t).map_err(malformed)?;
                    if let Some(entry) = open.as_mut().filter(|entry| entry.nested == 0) {
                        entry.body.push_str(&text);
                    }
                }
                Event::CData(ref t) => {
                    let text = decoder.decode(t).map_err(malformed)?;
                    if let Some(entry) = open.as_mut().filter(|entry| entry.nested == 0) {
                        entry.body.push_str(&text);
                    }
                }
                Event::GeneralRef(ref r) => {
                    let resolved = resolve_reference(r, decoder)?;
                    if let Some(entry) = open.as_mut().filter(|entry| entry.nested == 0) {
                        entry.body.push_str(&resolved);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        if !seen_root {
            return Err(SprefError::Defaults("document has no root element".to_string()));
        }
        if depth != 0 {
            return Err(SprefError::Defaults("unexpected end of document".to_string()));
        }

        debug!(entries = doc.entries.len(), skipped = doc.skipped, "defaults document parsed");
        Ok(doc)
    }

    pub fn entries(&self) -> &[DefaultEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<DefaultEntry> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries dropped for a missing or reserved name.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    fn finish_entry(&mut self, entry: OpenEntry) {
        let Some(name) = entry.name else {
            warn!(element = ?entry.kind, "defaults entry without a name attribute skipped");
            self.skipped += 1;
            return;
        };
        if is_tag_key(&name) {
            warn!(key = %name, "defaults entry uses the reserved tag prefix -- skipped");
            self.skipped += 1;
            return;
        }

        let (value, substituted) = entry.kind.value_from_body(&entry.body);
        if substituted {
            warn!(key = %name, element = value.element_name(), "unparsable default body -- using sentinel");
        }
        self.entries.push(DefaultEntry {
            name,
            value,
            substituted,
        });
    }
}

fn malformed(e: impl std::fmt::Display) -> SprefError {
    SprefError::Defaults(format!("malformed XML: {e}"))
}

fn start_entry(e: &BytesStart<'_>, decoder: Decoder) -> Result<Option<OpenEntry>, SprefError> {
    let Some(kind) = EntryKind::from_element(e.name().as_ref()) else {
        return Ok(None);
    };
    let mut name = None;
    for attr in e.attributes() {
        let attr = attr.map_err(malformed)?;
        if attr.key.as_ref() == b"name" {
            name = Some(attr.decode_and_unescape_value(decoder).map_err(malformed)?.into_owned());
        }
    }
    Ok(Some(OpenEntry {
        kind,
        name,
        body: String::new(),
        nested: 0,
    }))
}

/// Expand a character or predefined entity reference. Anything else is an error.
fn resolve_reference(r: &BytesRef<'_>, decoder: Decoder) -> Result<String, SprefError> {
    if let Some(c) = r.resolve_char_ref().map_err(malformed)? {
        return Ok(c.to_string());
    }
    let name = decoder.decode(r).map_err(malformed)?;
    resolve_predefined_entity(&name)
        .map(str::to_string)
        .ok_or_else(|| malformed(format_args!("undefined entity `&{name};`")))
}
