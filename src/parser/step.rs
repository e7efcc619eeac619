//! ISO 10303-21 (STEP physical file) reader and writer.
//!
//! Parses the clear-text encoding used by IFC files into header records and
//! typed instances, and serializes them back. Only simple instances are
//! supported; complex (multi-type) instances are rejected with an error.

use chrono::Utc;
use std::collections::HashSet;
use std::fmt::{self, Write as _};
use thiserror::Error;

use crate::models::{AttributeValue, EntityId};

/// Errors raised while reading a STEP file.
#[derive(Debug, Error)]
pub enum StepError {
    /// Malformed input at a given line
    #[error("line {line}: {message}")]
    Syntax {
        /// 1-based line of the offending token
        line: usize,
        /// What was expected or found
        message: String,
    },

    /// Input ended inside a construct
    #[error("unexpected end of file while reading {0}")]
    UnexpectedEof(&'static str),

    /// The same instance id was declared twice
    #[error("instance {0} is declared more than once")]
    DuplicateInstance(EntityId),
}

/// One record of the HEADER section, e.g. `FILE_SCHEMA(('IFC4'))`.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderRecord {
    /// Record keyword
    pub keyword: String,
    /// Record parameters
    pub args: Vec<AttributeValue>,
}

/// A simple entity instance of the DATA section.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    /// Uppercase entity type name, e.g. `IFCSTYLEDITEM`
    pub kind: String,
    /// Positional attributes
    pub args: Vec<AttributeValue>,
}

impl Instance {
    /// Creates an instance, normalizing the type name to uppercase.
    pub fn new(kind: &str, args: Vec<AttributeValue>) -> Self {
        Self {
            kind: kind.to_ascii_uppercase(),
            args,
        }
    }

    /// Attribute at `index`, or `$` when the instance is shorter.
    #[must_use]
    pub fn arg(&self, index: usize) -> &AttributeValue {
        self.args.get(index).unwrap_or(&AttributeValue::Null)
    }
}

/// Contents of a parsed STEP file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepFile {
    /// HEADER section records in file order
    pub header: Vec<HeaderRecord>,
    /// DATA section instances in file order
    pub instances: Vec<(EntityId, Instance)>,
}

impl StepFile {
    /// First schema named by `FILE_SCHEMA`, if any.
    #[must_use]
    pub fn schema(&self) -> Option<&str> {
        header_schema(&self.header)
    }
}

/// First schema named by the `FILE_SCHEMA` record of a header.
#[must_use]
pub fn header_schema(header: &[HeaderRecord]) -> Option<&str> {
    header
        .iter()
        .find(|record| record.keyword == "FILE_SCHEMA")
        .and_then(|record| record.args.first())
        .and_then(|schemas| schemas.as_list().first())
        .and_then(AttributeValue::as_str)
}

/// Parses STEP text.
///
/// # Errors
///
/// Returns [`StepError`] on malformed input, complex instances, binary
/// literals, or duplicate instance ids.
pub fn parse(text: &str) -> Result<StepFile, StepError> {
    let mut parser = Parser::new(text);
    let mut file = StepFile::default();

    parser.expect_keyword("ISO-10303-21")?;
    parser.expect(b';')?;
    parser.expect_keyword("HEADER")?;
    parser.expect(b';')?;

    loop {
        let keyword = parser.keyword()?;
        if keyword == "ENDSEC" {
            parser.expect(b';')?;
            break;
        }
        let args = parser.args()?;
        parser.expect(b';')?;
        file.header.push(HeaderRecord { keyword, args });
    }

    let mut seen = HashSet::new();
    loop {
        let keyword = parser.keyword()?;
        match keyword.as_str() {
            "DATA" => {
                if parser.peek()? == Some(b'(') {
                    parser.args()?;
                }
                parser.expect(b';')?;
                parser.data_section(&mut file.instances, &mut seen)?;
            }
            "END-ISO-10303-21" => {
                parser.expect(b';')?;
                break;
            }
            other => return Err(parser.error(format!("expected DATA section, found {other}"))),
        }
    }

    Ok(file)
}

/// Header records for a file that did not come with one.
#[must_use]
pub fn default_header(schema: &str, file_name: &str) -> Vec<HeaderRecord> {
    let timestamp = Utc::now().format("%Y-%m-%dT%H:%M:%S").to_string();
    let app = AttributeValue::string(crate::constants::APP_BINARY_NAME);
    vec![
        HeaderRecord {
            keyword: "FILE_DESCRIPTION".to_string(),
            args: vec![
                AttributeValue::List(vec![AttributeValue::string(
                    "ViewDefinition [CoordinationView]",
                )]),
                AttributeValue::string("2;1"),
            ],
        },
        HeaderRecord {
            keyword: "FILE_NAME".to_string(),
            args: vec![
                AttributeValue::string(file_name),
                AttributeValue::String(timestamp),
                AttributeValue::List(vec![AttributeValue::string("")]),
                AttributeValue::List(vec![AttributeValue::string("")]),
                app.clone(),
                app,
                AttributeValue::string(""),
            ],
        },
        HeaderRecord {
            keyword: "FILE_SCHEMA".to_string(),
            args: vec![AttributeValue::List(vec![AttributeValue::string(schema)])],
        },
    ]
}

/// Serializes a header and instances as STEP text.
///
/// # Errors
///
/// Only fails if the underlying writer fails.
pub fn write_to<'a, W, I>(out: &mut W, header: &[HeaderRecord], instances: I) -> fmt::Result
where
    W: fmt::Write,
    I: IntoIterator<Item = (EntityId, &'a Instance)>,
{
    out.write_str("ISO-10303-21;\nHEADER;\n")?;
    for record in header {
        out.write_str(&record.keyword)?;
        write_args(out, &record.args)?;
        out.write_str(";\n")?;
    }
    out.write_str("ENDSEC;\nDATA;\n")?;
    for (id, instance) in instances {
        write!(out, "{id}={}", instance.kind)?;
        write_args(out, &instance.args)?;
        out.write_str(";\n")?;
    }
    out.write_str("ENDSEC;\nEND-ISO-10303-21;\n")
}

fn write_args<W: fmt::Write>(out: &mut W, args: &[AttributeValue]) -> fmt::Result {
    out.write_char('(')?;
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            out.write_char(',')?;
        }
        write!(out, "{arg}")?;
    }
    out.write_char(')')
}

/// Renders the value as a STEP literal.
impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_char('$'),
            Self::Derived => f.write_char('*'),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Real(value) => f.write_str(&format_real(*value)),
            Self::String(value) => write!(f, "'{}'", encode_string(value)),
            Self::Enum(value) => write!(f, ".{value}."),
            Self::Ref(id) => write!(f, "{id}"),
            Self::List(items) => write_args(f, items),
            Self::Typed(name, inner) => write!(f, "{name}({inner})"),
        }
    }
}

/// Formats a real so it always carries a decimal point (`1.0`, `0.5`, `1.E-7`).
#[must_use]
pub fn format_real(value: f64) -> String {
    if !value.is_finite() {
        return "0.".to_string();
    }
    let text = format!("{value:?}");
    match text.split_once('e') {
        Some((mantissa, exponent)) if mantissa.contains('.') => format!("{mantissa}E{exponent}"),
        Some((mantissa, exponent)) => format!("{mantissa}.E{exponent}"),
        None => text,
    }
}

/// Escapes a string for a STEP literal (without the surrounding quotes).
///
/// Non-ASCII characters are written as `\X2\` UTF-16 runs.
#[must_use]
pub fn encode_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut wide: Vec<u16> = Vec::new();
    for ch in value.chars() {
        if ch.is_ascii() && !ch.is_ascii_control() {
            flush_wide(&mut out, &mut wide);
            match ch {
                '\'' => out.push_str("''"),
                '\\' => out.push_str("\\\\"),
                _ => out.push(ch),
            }
        } else {
            let mut buf = [0u16; 2];
            wide.extend_from_slice(ch.encode_utf16(&mut buf));
        }
    }
    flush_wide(&mut out, &mut wide);
    out
}

fn flush_wide(out: &mut String, wide: &mut Vec<u16>) {
    if wide.is_empty() {
        return;
    }
    out.push_str("\\X2\\");
    for unit in wide.drain(..) {
        let _ = write!(out, "{unit:04X}");
    }
    out.push_str("\\X0\\");
}

/// Decodes the escapes of a STEP string literal body (`''` already folded).
#[must_use]
pub fn decode_string(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(idx) = rest.find('\\') {
        out.push_str(&rest[..idx]);
        rest = &rest[idx..];
        match decode_escape(rest) {
            Some((decoded, consumed)) => {
                out.push_str(&decoded);
                rest = &rest[consumed..];
            }
            None => {
                out.push('\\');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Decodes one escape at the start of `text`, returning the text and the
/// number of bytes consumed.
fn decode_escape(text: &str) -> Option<(String, usize)> {
    if text.starts_with("\\\\") {
        return Some(("\\".to_string(), 2));
    }
    if let Some(tail) = text.strip_prefix("\\X2\\") {
        let end = tail.find("\\X0\\")?;
        let units = hex_units(&tail[..end], 4)?
            .into_iter()
            .map(u16::try_from)
            .collect::<Result<Vec<_>, _>>()
            .ok()?;
        return Some((String::from_utf16_lossy(&units), 4 + end + 4));
    }
    if let Some(tail) = text.strip_prefix("\\X4\\") {
        let end = tail.find("\\X0\\")?;
        let decoded = hex_units(&tail[..end], 8)?
            .into_iter()
            .map(|unit| char::from_u32(unit).unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect();
        return Some((decoded, 4 + end + 4));
    }
    if let Some(tail) = text.strip_prefix("\\X\\") {
        let byte = u8::from_str_radix(tail.get(..2)?, 16).ok()?;
        return Some((char::from(byte).to_string(), 5));
    }
    if let Some(tail) = text.strip_prefix("\\S\\") {
        let ch = tail.chars().next().filter(char::is_ascii)?;
        return Some((char::from(ch as u8 + 0x80).to_string(), 4));
    }
    if text.starts_with("\\P") && text.get(3..4) == Some("\\") {
        return Some((String::new(), 4));
    }
    None
}

fn hex_units(text: &str, width: usize) -> Option<Vec<u32>> {
    if text.len() % width != 0 || !text.is_ascii() {
        return None;
    }
    (0..text.len())
        .step_by(width)
        .map(|start| u32::from_str_radix(&text[start..start + width], 16).ok())
        .collect()
}

struct Parser<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            bytes: text.as_bytes(),
            pos: 0,
        }
    }

    fn line(&self) -> usize {
        self.bytes[..self.pos].iter().filter(|&&b| b == b'\n').count() + 1
    }

    fn error(&self, message: impl Into<String>) -> StepError {
        StepError::Syntax {
            line: self.line(),
            message: message.into(),
        }
    }

    fn skip_trivia(&mut self) -> Result<(), StepError> {
        loop {
            while self
                .bytes
                .get(self.pos)
                .is_some_and(u8::is_ascii_whitespace)
            {
                self.pos += 1;
            }
            if self.bytes[self.pos..].starts_with(b"/*") {
                let end = self.text[self.pos + 2..]
                    .find("*/")
                    .ok_or(StepError::UnexpectedEof("comment"))?;
                self.pos += 2 + end + 2;
                continue;
            }
            return Ok(());
        }
    }

    fn peek(&mut self) -> Result<Option<u8>, StepError> {
        self.skip_trivia()?;
        Ok(self.bytes.get(self.pos).copied())
    }

    fn expect(&mut self, byte: u8) -> Result<(), StepError> {
        match self.peek()? {
            Some(found) if found == byte => {
                self.pos += 1;
                Ok(())
            }
            Some(found) => Err(self.error(format!(
                "expected '{}', found '{}'",
                char::from(byte),
                char::from(found)
            ))),
            None => Err(StepError::UnexpectedEof("statement")),
        }
    }

    fn keyword(&mut self) -> Result<String, StepError> {
        match self.peek()? {
            Some(b) if b.is_ascii_alphabetic() || b == b'!' => {}
            Some(found) => {
                return Err(self.error(format!("expected keyword, found '{}'", char::from(found))))
            }
            None => return Err(StepError::UnexpectedEof("keyword")),
        }
        let start = self.pos;
        self.pos += 1;
        while self
            .bytes
            .get(self.pos)
            .is_some_and(|&b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
        {
            self.pos += 1;
        }
        Ok(self.text[start..self.pos].to_ascii_uppercase())
    }

    fn expect_keyword(&mut self, expected: &str) -> Result<(), StepError> {
        let found = self.keyword()?;
        if found == expected {
            Ok(())
        } else {
            Err(self.error(format!("expected {expected}, found {found}")))
        }
    }

    fn data_section(
        &mut self,
        instances: &mut Vec<(EntityId, Instance)>,
        seen: &mut HashSet<EntityId>,
    ) -> Result<(), StepError> {
        loop {
            match self.peek()? {
                Some(b'#') => {
                    self.pos += 1;
                    let id = EntityId(self.integer()?);
                    self.expect(b'=')?;
                    if self.peek()? == Some(b'(') {
                        return Err(self.error(format!("complex instance {id} is not supported")));
                    }
                    let kind = self.keyword()?;
                    let args = self.args()?;
                    self.expect(b';')?;
                    if !seen.insert(id) {
                        return Err(StepError::DuplicateInstance(id));
                    }
                    instances.push((id, Instance { kind, args }));
                }
                Some(_) => {
                    self.expect_keyword("ENDSEC")?;
                    return self.expect(b';');
                }
                None => return Err(StepError::UnexpectedEof("DATA section")),
            }
        }
    }

    fn args(&mut self) -> Result<Vec<AttributeValue>, StepError> {
        self.expect(b'(')?;
        let mut values = Vec::new();
        if self.peek()? == Some(b')') {
            self.pos += 1;
            return Ok(values);
        }
        loop {
            values.push(self.value()?);
            match self.peek()? {
                Some(b',') => self.pos += 1,
                Some(b')') => {
                    self.pos += 1;
                    return Ok(values);
                }
                Some(found) => {
                    return Err(self.error(format!(
                        "expected ',' or ')', found '{}'",
                        char::from(found)
                    )))
                }
                None => return Err(StepError::UnexpectedEof("parameter list")),
            }
        }
    }

    fn value(&mut self) -> Result<AttributeValue, StepError> {
        let Some(first) = self.peek()? else {
            return Err(StepError::UnexpectedEof("value"));
        };
        match first {
            b'$' => {
                self.pos += 1;
                Ok(AttributeValue::Null)
            }
            b'*' => {
                self.pos += 1;
                Ok(AttributeValue::Derived)
            }
            b'\'' => self.string().map(AttributeValue::String),
            b'.' => self.enumeration(),
            b'#' => {
                self.pos += 1;
                Ok(AttributeValue::Ref(EntityId(self.integer()?)))
            }
            b'(' => self.args().map(AttributeValue::List),
            b'"' => Err(self.error("binary literals are not supported")),
            b'0'..=b'9' | b'-' | b'+' => self.number(),
            b if b.is_ascii_alphabetic() => {
                let name = self.keyword()?;
                let mut inner = self.args()?.into_iter();
                match (inner.next(), inner.next()) {
                    (Some(value), None) => Ok(AttributeValue::Typed(name, Box::new(value))),
                    _ => Err(self.error(format!("typed value {name} must wrap exactly one value"))),
                }
            }
            other => Err(self.error(format!("unexpected character '{}'", char::from(other)))),
        }
    }

    fn string(&mut self) -> Result<String, StepError> {
        self.pos += 1;
        let start = self.pos;
        let mut raw = String::new();
        let mut chunk_start = start;
        loop {
            match self.bytes.get(self.pos) {
                None => return Err(StepError::UnexpectedEof("string literal")),
                Some(b'\'') if self.bytes.get(self.pos + 1) == Some(&b'\'') => {
                    raw.push_str(&self.text[chunk_start..=self.pos]);
                    self.pos += 2;
                    chunk_start = self.pos;
                }
                Some(b'\'') => {
                    raw.push_str(&self.text[chunk_start..self.pos]);
                    self.pos += 1;
                    return Ok(decode_string(&raw));
                }
                Some(_) => self.pos += 1,
            }
        }
    }

    fn enumeration(&mut self) -> Result<AttributeValue, StepError> {
        self.pos += 1;
        let start = self.pos;
        while self
            .bytes
            .get(self.pos)
            .is_some_and(|&b| b.is_ascii_alphanumeric() || b == b'_')
        {
            self.pos += 1;
        }
        let name = self.text[start..self.pos].to_ascii_uppercase();
        if self.bytes.get(self.pos) != Some(&b'.') || name.is_empty() {
            return Err(self.error("malformed enumeration literal"));
        }
        self.pos += 1;
        Ok(AttributeValue::Enum(name))
    }

    fn integer(&mut self) -> Result<u64, StepError> {
        let start = self.pos;
        while self.bytes.get(self.pos).is_some_and(u8::is_ascii_digit) {
            self.pos += 1;
        }
        self.text[start..self.pos]
            .parse()
            .map_err(|_| self.error("expected instance number"))
    }

    fn number(&mut self) -> Result<AttributeValue, StepError> {
        let start = self.pos;
        self.pos += 1;
        while self
            .bytes
            .get(self.pos)
            .is_some_and(|&b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'))
        {
            self.pos += 1;
        }
        let text = &self.text[start..self.pos];
        if text.contains(['.', 'e', 'E']) {
            text.parse()
                .map(AttributeValue::Real)
                .map_err(|_| self.error(format!("malformed real '{text}'")))
        } else {
            text.parse()
                .map(AttributeValue::Integer)
                .map_err(|_| self.error(format!("malformed integer '{text}'")))
        }
    }
}
