//! Triples table: the tab-separated `subject / predicate / object` export
//! consumed by the embedding trainer and the analysis stage.
//!
//! Fields holding a tab, a line break or a double quote are wrapped in
//! double quotes with inner quotes doubled, so literal values survive the
//! round trip.

use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ExportError;

/// Result type for export operations.
pub type ExportResult<T> = std::result::Result<T, ExportError>;

pub const HEADER: [&str; 3] = ["subject", "predicate", "object"];

/// One row of the triples table. IRIs and literal values as plain strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TripleRow {
    pub subject: String,
    pub predicate: String,
    pub object: String,
}

fn needs_quoting(field: &str) -> bool {
    field.contains(['\t', '\n', '\r', '"'])
}

fn write_field<W: Write>(w: &mut W, field: &str) -> std::io::Result<()> {
    if needs_quoting(field) {
        write!(w, "\"{}\"", field.replace('"', "\"\""))
    } else {
        w.write_all(field.as_bytes())
    }
}

/// Write the header and every row.
pub fn write_tsv<W: Write>(rows: &[TripleRow], mut writer: W) -> std::io::Result<W> {
    writeln!(writer, "{}", HEADER.join("\t"))?;
    for row in rows {
        write_field(&mut writer, &row.subject)?;
        writer.write_all(b"\t")?;
        write_field(&mut writer, &row.predicate)?;
        writer.write_all(b"\t")?;
        write_field(&mut writer, &row.object)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(writer)
}

/// Write the table to `path`, creating parent directories.
pub fn write_tsv_file(rows: &[TripleRow], path: &Path) -> ExportResult<()> {
    let io_err = |e| ExportError::Io {
        path: path.display().to_string(),
        source: e,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    let file = std::fs::File::create(path).map_err(io_err)?;
    write_tsv(rows, std::io::BufWriter::new(file)).map_err(io_err)?;
    tracing::info!(path = %path.display(), rows = rows.len(), "wrote triples table");
    Ok(())
}

/// Read a triples table. A leading header row is skipped.
pub fn read_tsv(path: &Path) -> ExportResult<Vec<TripleRow>> {
    let content = std::fs::read_to_string(path).map_err(|e| ExportError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_tsv(&content, &path.display().to_string())
}

/// Parse table text; `origin` names the input in errors.
pub fn parse_tsv(content: &str, origin: &str) -> ExportResult<Vec<TripleRow>> {
    let mut rows = Vec::new();
    for (line, record) in records(content) {
        if record.len() == 1 && record[0].is_empty() {
            continue;
        }
        if rows.is_empty() && line == 1 && record == HEADER {
            continue;
        }
        let [subject, predicate, object]: [String; 3] =
            record.try_into().map_err(|r: Vec<String>| ExportError::Malformed {
                path: origin.to_string(),
                line,
                columns: r.len(),
            })?;
        rows.push(TripleRow {
            subject,
            predicate,
            object,
        });
    }
    Ok(rows)
}

/// Split into records of fields, honouring quoted fields that span lines.
/// Each record carries the line number it starts on.
fn records(content: &str) -> Vec<(usize, Vec<String>)> {
    let mut out = Vec::new();
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut line = 1usize;
    let mut start = 1usize;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' if field.is_empty() => in_quotes = true,
            '\n' if in_quotes => {
                field.push(c);
                line += 1;
            }
            '\t' if !in_quotes => fields.push(std::mem::take(&mut field)),
            '\n' => {
                if field.ends_with('\r') {
                    field.pop();
                }
                fields.push(std::mem::take(&mut field));
                out.push((start, std::mem::take(&mut fields)));
                line += 1;
                start = line;
            }
            _ => field.push(c),
        }
    }
    if !field.is_empty() || !fields.is_empty() {
        fields.push(field);
        out.push((start, fields));
    }
    out
}
