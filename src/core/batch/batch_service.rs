// Batch service - runs the moderation workflow over every row of a sheet.
//
// Per-row failures are isolated: a row that errors gets its status cell set
// to "Error" and the batch moves on. Only file-level problems (unreadable
// input, missing required column) abort the run.

use super::batch_models::{SampleSheet, SampleSheetStore, SheetError};
use crate::core::moderation::{ModerationApi, ModerationService, SampleStatus};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Header of the input column holding the text to moderate. The sheets this
/// tool processes have always used the French label.
pub const REQUIRED_COLUMN: &str = "Données à tester";

pub const REJECTION_RATE_COLUMN: &str = "Taux de rejet (%)";
pub const CATEGORY_COLUMN: &str = "Catégorie";
pub const STATUS_COLUMN: &str = "Status";

/// Fixed output location, overwritten on every run.
pub const OUTPUT_FILE: &str = "SyntheticDataResult.xlsx";

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("required column '{header}' is missing from the input file")]
    MissingColumn { header: String },

    #[error("sheet error: {0}")]
    Sheet(#[from] SheetError),
}

// ============================================================================
// CORE SERVICE
// ============================================================================

/// What a finished batch run looked like.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub output_path: PathBuf,
}

/// Batch runner: one moderation cycle per row, results written into three
/// appended columns.
pub struct BatchService<M: ModerationApi, S: SampleSheetStore> {
    moderation: ModerationService<M>,
    store: S,
    output_path: PathBuf,
}

impl<M: ModerationApi, S: SampleSheetStore> BatchService<M, S> {
    pub fn new(moderation: ModerationService<M>, store: S) -> Self {
        Self::with_output_path(moderation, store, PathBuf::from(OUTPUT_FILE))
    }

    pub fn with_output_path(
        moderation: ModerationService<M>,
        store: S,
        output_path: PathBuf,
    ) -> Self {
        Self {
            moderation,
            store,
            output_path,
        }
    }

    /// Process every row of the input file and save the augmented sheet.
    ///
    /// The required-column check happens before any row is submitted, so a
    /// malformed file never costs an API call.
    pub async fn run(&self, input: &Path) -> Result<BatchSummary, BatchError> {
        let mut sheet = self.store.load(input)?;

        let text_col =
            sheet
                .column_index(REQUIRED_COLUMN)
                .ok_or_else(|| BatchError::MissingColumn {
                    header: REQUIRED_COLUMN.to_string(),
                })?;

        let rate_col = sheet.push_column(REJECTION_RATE_COLUMN, "0");
        let category_col = sheet.push_column(CATEGORY_COLUMN, "");
        let status_col = sheet.push_column(STATUS_COLUMN, "");

        let total = sheet.rows.len();
        let mut succeeded = 0;

        for index in 0..total {
            let text = sheet.rows[index][text_col].clone();
            tracing::info!(row = index + 1, total, "processing row");

            match self.moderation.moderate_and_interpret(&text).await {
                Ok(outcome) => {
                    let row = &mut sheet.rows[index];
                    row[rate_col] = outcome.rejection_percentage.to_string();
                    row[category_col] = outcome.category;
                    row[status_col] = outcome.status.to_string();
                    succeeded += 1;
                }
                Err(err) => {
                    // Rate and category cells keep their defaults.
                    tracing::warn!(row = index, "error processing row: {err}");
                    sheet.rows[index][status_col] = SampleStatus::Error.to_string();
                }
            }
        }

        self.store.save(&sheet, &self.output_path)?;
        tracing::info!(path = %self.output_path.display(), "results saved");

        Ok(BatchSummary {
            total,
            succeeded,
            failed: total - succeeded,
            output_path: self.output_path.clone(),
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================
