use thiserror::Error;

use crate::model::DocumentSide;

/// Failure to parse a supplied buffer as its declared document type.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to load PDF: {0}")]
    PdfLoad(#[from] lopdf::Error),

    #[error("failed to read workbook: {0}")]
    Workbook(#[from] calamine::Error),
}

/// Unrecoverable failure while serializing the result document.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to build result PDF: {0}")]
    Pdf(#[from] lopdf::Error),
}

/// Top-level pipeline failure, attributed to the step where it occurred.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to extract the {side} document: {source}")]
    Extraction {
        side: DocumentSide,
        #[source]
        source: ExtractError,
    },

    #[error("failed to render merged result: {0}")]
    Render(#[from] RenderError),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),
}
