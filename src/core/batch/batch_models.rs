// Batch domain models - the in-memory sheet and its storage port.
//
// Cell values are kept as display strings; the store decides how to type
// them when writing.

use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SheetError {
    #[error("failed to open spreadsheet: {0}")]
    Open(String),

    #[error("spreadsheet has no worksheets")]
    NoWorksheet,

    #[error("spreadsheet has no header row")]
    Empty,

    #[error("failed to write spreadsheet: {0}")]
    Write(String),
}

/// One tabular sheet: a header row plus data rows. Every row has exactly
/// `headers.len()` cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleSheet {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SampleSheet {
    /// Index of the column with this exact header, if present.
    pub fn column_index(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }

    /// Append a column with a default cell value in every row. Returns the
    /// new column's index.
    pub fn push_column(&mut self, header: &str, default: &str) -> usize {
        self.headers.push(header.to_string());
        for row in &mut self.rows {
            row.push(default.to_string());
        }
        self.headers.len() - 1
    }
}

/// Trait for loading and saving sample sheets.
///
/// Following the same pattern as ModerationApi in the moderation module.
pub trait SampleSheetStore: Send + Sync {
    fn load(&self, path: &Path) -> Result<SampleSheet, SheetError>;

    fn save(&self, sheet: &SampleSheet, path: &Path) -> Result<(), SheetError>;
}

// Blanket implementation for Arc<S>
// This allows sharing one store between the batch service and anything that
// wants to inspect what was written (tests do).
impl<S: SampleSheetStore> SampleSheetStore for std::sync::Arc<S> {
    fn load(&self, path: &Path) -> Result<SampleSheet, SheetError> {
        (**self).load(path)
    }

    fn save(&self, sheet: &SampleSheet, path: &Path) -> Result<(), SheetError> {
        (**self).save(sheet, path)
    }
}
