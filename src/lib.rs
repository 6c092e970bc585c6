//! Reconciles two tabular documents (XLSX workbooks or text PDFs) by their
//! shared columns and renders the merged table back out as a paginated PDF.
//!
//! The pipeline is extract -> merge -> render: each input buffer becomes an
//! ordered [`RecordSet`], the two sets are matched one-to-one on the columns
//! they have in common, and the merged rows are laid out on fixed-size pages.
//! All state is scoped to a single [`process`] call; nothing persists.

mod csv_out;
mod error;
mod merge;
mod model;
mod pdf_table;
mod render;
mod spreadsheet;

use tracing::debug;

pub use crate::error::{ExtractError, PipelineError, RenderError};
pub use crate::merge::merge_record_sets;
pub use crate::model::{DocumentKind, DocumentSide, MergeReport, Record, RecordSet};

/// Default file name for the rendered result.
pub const DEFAULT_OUTPUT_FILENAME: &str = "hasil_penggabungan.pdf";

/// Everything one processing request produces: the merged rows for display,
/// the rendered PDF for download, and a summary report.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedResult {
    pub records: Vec<Record>,
    pub pdf: Vec<u8>,
    pub report: MergeReport,
}

/// Parses one input buffer into records according to its declared kind.
///
/// # Errors
///
/// Returns [`ExtractError`] when the buffer cannot be parsed as the declared
/// document type. This is not retried; it surfaces to the caller.
pub fn extract_records(bytes: &[u8], kind: DocumentKind) -> Result<RecordSet, ExtractError> {
    match kind {
        DocumentKind::Spreadsheet => spreadsheet::extract_records(bytes),
        DocumentKind::Pdf => pdf_table::extract_records(bytes),
    }
}

/// Renders merged rows into a paginated PDF byte stream.
///
/// # Errors
///
/// Returns [`RenderError`] only for serialization failures; an empty input
/// still renders a valid single-page document.
pub fn render_merged_pdf(records: &[Record]) -> Result<Vec<u8>, RenderError> {
    render::render_pdf(records)
}

/// Serializes merged rows as CSV for inspection.
///
/// # Errors
///
/// Returns [`PipelineError::Csv`] when the writer fails.
pub fn merged_to_csv(records: &[Record]) -> Result<String, PipelineError> {
    csv_out::merged_to_csv_string(records)
}

/// Runs the whole pipeline for one request: extract both inputs, merge, and
/// render. There is no partial success; the first failing step aborts the
/// request with the failing document identified.
///
/// # Errors
///
/// [`PipelineError::Extraction`] when either input cannot be parsed, tagged
/// with its [`DocumentSide`]; [`PipelineError::Render`] when the result
/// document cannot be serialized. Business-level mismatches (no shared
/// columns, no matching rows) are not errors and yield an empty result.
pub fn process(
    left: &[u8],
    left_kind: DocumentKind,
    right: &[u8],
    right_kind: DocumentKind,
) -> Result<MergedResult, PipelineError> {
    let left_set = extract_records(left, left_kind).map_err(|source| PipelineError::Extraction {
        side: DocumentSide::Left,
        source,
    })?;
    let right_set =
        extract_records(right, right_kind).map_err(|source| PipelineError::Extraction {
            side: DocumentSide::Right,
            source,
        })?;
    debug!(
        left_rows = left_set.len(),
        right_rows = right_set.len(),
        "extraction complete"
    );

    let (records, common_columns) = merge::merge_with_columns(&left_set, &right_set);
    debug!(merged_rows = records.len(), "merge complete");

    let pdf = render::render_pdf(&records)?;

    let report = MergeReport {
        left_rows: left_set.len(),
        right_rows: right_set.len(),
        merged_rows: records.len(),
        common_columns,
    };
    Ok(MergedResult {
        records,
        pdf,
        report,
    })
}
