//! Textual form of a [`ClassificationIndex`].
//!
//! ```text
//! # 6.5.0
//! /,PUBLIC
//! /libs/foundation,FINAL,"Use the core components instead, see docs"
//! ```
//!
//! The first line is a `#` comment holding the label. Every record is
//! `path,LEVEL[,remark]` with RFC 4180 quoting and CRLF terminators. Only
//! 7-bit ASCII is accepted in either direction.

use std::io::{self, Read, Write};
use std::str::FromStr;

use contentclass_core::ContentClassification;
use csv::{ReaderBuilder, StringRecord, Terminator, WriterBuilder};
use tracing::{debug, warn};

use crate::error::{MapError, MapResult};
use crate::index::ClassificationIndex;

const COMMENT: u8 = b'#';

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// Parses an index. `origin` names the source in errors and logs.
pub fn read_index<R: Read>(mut reader: R, origin: &str) -> MapResult<ClassificationIndex> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    if let Some(position) = bytes.iter().position(|b| !b.is_ascii()) {
        let line = bytes[..position].iter().filter(|&&b| b == b'\n').count() + 1;
        return Err(MapError::Encoding(format!(
            "non-ASCII character in line {line} of '{origin}'"
        )));
    }
    let text = String::from_utf8(bytes).map_err(|e| MapError::Encoding(e.to_string()))?;

    let (label, body, skipped_lines) = split_label(&text);
    let mut index = ClassificationIndex::new(label);

    let mut csv = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .comment(Some(COMMENT))
        .from_reader(body.as_bytes());

    let mut record = StringRecord::new();
    loop {
        let more = csv.read_record(&mut record).map_err(|e| {
            let line = e.position().map_or(0, |p| p.line()) + skipped_lines;
            parse_error(origin, line, e.to_string())
        })?;
        if !more {
            break;
        }
        let line = record.position().map_or(0, |p| p.line()) + skipped_lines;
        apply_record(&mut index, &record, origin, line)?;
    }

    debug!(
        origin,
        label = index.label(),
        entries = index.len(),
        "read classification map"
    );
    Ok(index)
}

/// Splits off the leading label comment. Returns the label, the remaining
/// text and the number of lines consumed.
fn split_label(text: &str) -> (&str, &str, u64) {
    if !text.as_bytes().starts_with(&[COMMENT]) {
        return ("", text, 0);
    }
    let (first, rest) = match text.find('\n') {
        Some(end) => (&text[..end], &text[end + 1..]),
        None => (text, ""),
    };
    (first[1..].trim(), rest, 1)
}

fn apply_record(
    index: &mut ClassificationIndex,
    record: &StringRecord,
    origin: &str,
    line: u64,
) -> MapResult<()> {
    if record.len() < 2 {
        return Err(parse_error(
            origin,
            line,
            format!("expected at least 2 fields but found {}", record.len()),
        ));
    }
    if record.len() > 3 {
        warn!(
            origin,
            line,
            fields = record.len(),
            "ignoring fields beyond the third"
        );
    }
    let resource_path = &record[0];
    let classification = ContentClassification::from_str(&record[1])
        .map_err(|e| parse_error(origin, line, e.to_string()))?;
    index
        .put(resource_path, classification, record.get(2))
        .map_err(|e| parse_error(origin, line, e.to_string()))
}

fn parse_error(origin: &str, line: u64, message: String) -> MapError {
    MapError::Parse {
        origin: origin.to_string(),
        line,
        message,
    }
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

/// Writes `index` in path order. The remark column is only present for
/// entries with a remark.
pub fn write_index<W: Write>(index: &ClassificationIndex, mut writer: W) -> MapResult<()> {
    let label = index.label().replace(['\r', '\n'], " ");
    ensure_ascii(&label)?;
    if label.is_empty() {
        writer.write_all(b"#\r\n")?;
    } else {
        write!(writer, "# {label}\r\n")?;
    }

    let mut csv = WriterBuilder::new()
        .flexible(true)
        .terminator(Terminator::CRLF)
        .from_writer(writer);
    for (resource_path, entry) in index.iter() {
        ensure_ascii(resource_path)?;
        let name = entry.classification.name();
        match &entry.remark {
            Some(remark) => {
                ensure_ascii(remark)?;
                csv.write_record([resource_path, name, remark.as_str()])
            }
            None => csv.write_record([resource_path, name]),
        }
        .map_err(io::Error::from)?;
    }
    csv.flush()?;
    Ok(())
}

fn ensure_ascii(value: &str) -> MapResult<()> {
    if value.is_ascii() {
        Ok(())
    } else {
        Err(MapError::Encoding(format!(
            "'{value}' contains non-ASCII characters"
        )))
    }
}
