//! CSV loading and writing, encoding, and delimiter resolution.
//!
//! All file I/O for the `clean`, `profile` and `audit` commands goes through
//! this module:
//!
//! - **Delimiter resolution**: `.tsv` selects tab, anything else selects
//!   comma. An explicit `--delimiter` always wins.
//! - **Encoding**: input is decoded with `encoding_rs` and defaults to
//!   UTF-8. A leading byte-order mark is dropped from the first header.
//! - **Loading**: rows are read with a flexible reader, so short rows pad
//!   with nulls and wide rows widen the header. The source bytes are
//!   fingerprinted with SHA-256 while they are in memory.
//! - **Writing**: cleaned output quotes only where needed and writes nulls
//!   as empty fields.

use std::{
    fs::{self, File},
    io::BufWriter,
    path::Path,
};

use anyhow::{Context, Result, anyhow};
use csv::QuoteStyle;
use encoding_rs::{Encoding, UTF_8};
use log::debug;
use sha2::{Digest, Sha256};

use crate::frame::{RawTable, Table};

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';

const BOM: char = '\u{feff}';

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'"))
    } else {
        Ok(UTF_8)
    }
}

pub fn resolve_input_delimiter(path: &Path, provided: Option<u8>) -> u8 {
    provided.unwrap_or_else(|| match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => DEFAULT_TSV_DELIMITER,
        _ => DEFAULT_CSV_DELIMITER,
    })
}

pub fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b'\t' => "\\t".to_string(),
        other => (other as char).to_string(),
    }
}

pub fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> Result<String> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        Err(anyhow!(
            "Failed to decode text with encoding {}",
            encoding.name()
        ))
    } else {
        Ok(text.into_owned())
    }
}

pub fn decode_record(record: &csv::ByteRecord, encoding: &'static Encoding) -> Result<Vec<String>> {
    record
        .iter()
        .map(|field| decode_bytes(field, encoding))
        .collect()
}

/// Hex-encoded SHA-256 of `bytes`.
pub fn fingerprint(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    digest.iter().map(|byte| format!("{byte:02x}")).collect()
}

#[derive(Debug, Clone)]
pub struct LoadedSource {
    pub table: RawTable,
    pub fingerprint: String,
}

pub fn load_source(
    path: &Path,
    delimiter: u8,
    encoding: &'static Encoding,
) -> Result<LoadedSource> {
    let bytes = fs::read(path).with_context(|| format!("Reading input file {path:?}"))?;
    let fingerprint = fingerprint(&bytes);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(true)
        .from_reader(bytes.as_slice());

    let header_record = reader
        .byte_headers()
        .with_context(|| format!("Reading header row from {path:?}"))?
        .clone();
    let mut headers = decode_record(&header_record, encoding)
        .with_context(|| format!("Decoding header row from {path:?}"))?;
    if let Some(first) = headers.first_mut() {
        if let Some(stripped) = first.strip_prefix(BOM) {
            *first = stripped.to_string();
        }
    }

    let mut rows = Vec::new();
    let mut record = csv::ByteRecord::new();
    while reader
        .read_byte_record(&mut record)
        .with_context(|| format!("Reading row {} from {path:?}", rows.len() + 2))?
    {
        let row = decode_record(&record, encoding)
            .with_context(|| format!("Decoding row {} from {path:?}", rows.len() + 2))?;
        rows.push(row);
    }
    debug!(
        "Loaded {} row(s) x {} header(s) from {path:?}",
        rows.len(),
        headers.len()
    );

    Ok(LoadedSource {
        table: Table::from_rows(headers, rows),
        fingerprint,
    })
}

pub fn write_table(path: &Path, table: &Table, delimiter: u8) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Creating output file {path:?}"))?;
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .quote_style(QuoteStyle::Necessary)
        .double_quote(true)
        .from_writer(BufWriter::new(file));

    writer
        .write_record(table.headers())
        .with_context(|| format!("Writing headers to {path:?}"))?;
    for row in table.rows() {
        writer
            .write_record(row.iter().map(|cell| cell.unwrap_or("")))
            .with_context(|| format!("Writing row to {path:?}"))?;
    }
    writer
        .flush()
        .with_context(|| format!("Flushing output file {path:?}"))?;
    Ok(())
}
