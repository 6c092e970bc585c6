use std::collections::BTreeMap;

use encoding_rs::{UTF_16BE, UTF_16LE};
use lopdf::content::Content;
use lopdf::{Document, Object};
use tracing::warn;

use crate::error::ExtractError;
use crate::model::{Record, RecordSet};

fn split_text_into_pages(raw_text: &str) -> Vec<String> {
    let mut pages = raw_text
        .split('\u{000C}')
        .map(str::to_string)
        .collect::<Vec<_>>();
    if pages.last().is_some_and(String::is_empty) {
        pages.pop();
    }
    pages
}

fn looks_decoding_broken(text: &str) -> bool {
    if text.contains("?Identity-H Unimplemented?") {
        return true;
    }

    let total = text.chars().count();
    if total == 0 {
        return false;
    }

    let replacement = text.matches('\u{FFFD}').count();
    let control = text
        .chars()
        .filter(|ch| ch.is_control() && !matches!(ch, '\n' | '\r' | '\t'))
        .count();
    replacement * 8 > total || control * 5 > total
}

fn decode_string_bytes(encoding: Option<&str>, bytes: &[u8]) -> String {
    let decoded = Document::decode_text(encoding, bytes);
    if !looks_decoding_broken(&decoded) {
        return decoded;
    }

    let (utf16_encoding, utf16_bytes) = if bytes.len() > 2 && bytes.starts_with(&[0xFE, 0xFF]) {
        (UTF_16BE, &bytes[2..])
    } else if bytes.len() > 2 && bytes.starts_with(&[0xFF, 0xFE]) {
        (UTF_16LE, &bytes[2..])
    } else {
        (UTF_16BE, bytes)
    };
    let (utf16, had_errors) = utf16_encoding.decode_without_bom_handling(utf16_bytes);
    if !had_errors && !utf16.is_empty() {
        return utf16.into_owned();
    }

    String::from_utf8_lossy(bytes).to_string()
}

fn collect_op_text(out: &mut String, encoding: Option<&str>, operands: &[Object]) {
    for operand in operands {
        match operand {
            Object::String(bytes, _) => out.push_str(&decode_string_bytes(encoding, bytes)),
            Object::Array(items) => collect_op_text(out, encoding, items),
            // Large kerning adjustments stand in for inter-cell gaps.
            Object::Integer(value) if *value < -100 => out.push(' '),
            _ => {}
        }
    }
}

/// Walks a page's content stream and rebuilds its text line by line.
///
/// Show-text runs within one line are concatenated with single spaces; the
/// text-positioning operators (`Td`, `TD`, `T*`, `ET`) mark line boundaries.
/// Row detection downstream depends entirely on these boundaries surviving in
/// the producer's content stream.
fn extract_page_text(document: &Document, page_id: lopdf::ObjectId) -> Option<String> {
    let raw_content = document.get_page_content(page_id).ok()?;
    let content = Content::decode(&raw_content).ok()?;
    let encodings = document
        .get_page_fonts(page_id)
        .into_iter()
        .map(|(name, font)| (name, font.get_font_encoding()))
        .collect::<BTreeMap<Vec<u8>, &str>>();

    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_encoding = None;
    for operation in content.operations {
        match operation.operator.as_str() {
            "Tf" => {
                if let Some(font_name) = operation
                    .operands
                    .first()
                    .and_then(|operand| operand.as_name().ok())
                {
                    current_encoding = encodings.get(font_name).copied();
                }
            }
            "Tj" | "TJ" | "'" | "\"" => {
                let mut run = String::new();
                collect_op_text(&mut run, current_encoding, &operation.operands);
                if !run.is_empty() {
                    if !current.is_empty() {
                        current.push(' ');
                    }
                    current.push_str(&run);
                }
            }
            "T*" | "Td" | "TD" | "ET" => {
                if !current.trim().is_empty() {
                    lines.push(std::mem::take(&mut current));
                } else {
                    current.clear();
                }
            }
            _ => {}
        }
    }
    if !current.trim().is_empty() {
        lines.push(current);
    }

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

/// Parses one page's text blob into records.
///
/// The first non-blank line is the header line; its whitespace-separated
/// tokens, lower-cased, become the column names. A later line is accepted as
/// a data row only when its token count exactly matches the header's. Lines
/// with any other arity are dropped, which trades away rows whose cell values
/// contain spaces in exchange for never emitting misaligned data.
fn parse_page_records(text: &str) -> Vec<Record> {
    let mut lines = text.lines().map(str::trim).filter(|line| !line.is_empty());
    let Some(header_line) = lines.next() else {
        return Vec::new();
    };
    let headers = header_line
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>();
    if headers.is_empty() {
        return Vec::new();
    }

    let mut records = Vec::new();
    for line in lines {
        let values = line.split_whitespace().collect::<Vec<_>>();
        if values.len() != headers.len() {
            continue;
        }
        records.push(
            headers
                .iter()
                .zip(&values)
                .map(|(name, value)| (name.clone(), (*value).to_string()))
                .collect(),
        );
    }
    records
}

/// Extracts table rows from every page of a PDF, in page order.
pub(crate) fn extract_records(bytes: &[u8]) -> Result<RecordSet, ExtractError> {
    let document = Document::load_mem(bytes)?;
    let pages_map = document.get_pages();

    // Whole-document extraction as a fallback for producers whose content
    // streams defeat the page walker; only usable when its form-feed page
    // breaks line up with the real page count.
    let fallback_pages = pdf_extract::extract_text_from_mem(bytes)
        .ok()
        .map(|text| split_text_into_pages(&text))
        .filter(|pages| pages.len() == pages_map.len());

    let mut records = Vec::new();
    for (index, (page_no, page_id)) in pages_map.iter().enumerate() {
        let text = extract_page_text(&document, *page_id).or_else(|| {
            fallback_pages
                .as_ref()
                .and_then(|pages| pages.get(index).cloned())
                .filter(|text| !text.trim().is_empty())
        });

        let Some(text) = text else {
            warn!(page = *page_no, "no extractable text on page");
            continue;
        };
        records.extend(parse_page_records(&text));
    }

    Ok(RecordSet::new(records))
}
