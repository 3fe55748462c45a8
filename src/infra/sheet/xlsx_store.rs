use calamine::{open_workbook, Data, Reader, Xlsx};
use rust_xlsxwriter::Workbook;
use std::path::Path;

use crate::core::batch::{SampleSheet, SampleSheetStore, SheetError};

/// Reads and writes `.xlsx` workbooks. Only the first worksheet is used.
///
/// Cells are normalized to strings on load. On save, anything that parses as
/// a number is written as a numeric cell so the rejection-rate column stays
/// numeric in the output workbook.
#[derive(Debug, Default, Clone)]
pub struct XlsxSheetStore;

impl XlsxSheetStore {
    pub fn new() -> Self {
        Self
    }

    fn cell_to_string(cell: &Data) -> String {
        match cell {
            Data::Empty => String::new(),
            other => other.to_string(),
        }
    }
}

impl SampleSheetStore for XlsxSheetStore {
    fn load(&self, path: &Path) -> Result<SampleSheet, SheetError> {
        let mut workbook: Xlsx<_> =
            open_workbook(path).map_err(|e: calamine::XlsxError| SheetError::Open(e.to_string()))?;

        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or(SheetError::NoWorksheet)?;

        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| SheetError::Open(e.to_string()))?;

        let mut rows = range.rows();
        let headers: Vec<String> = rows
            .next()
            .ok_or(SheetError::Empty)?
            .iter()
            .map(Self::cell_to_string)
            .collect();

        let rows = rows
            .map(|row| {
                let mut cells: Vec<String> = row.iter().map(Self::cell_to_string).collect();
                // calamine trims trailing empties; keep rows rectangular.
                cells.resize(headers.len(), String::new());
                cells
            })
            .collect();

        Ok(SampleSheet { headers, rows })
    }

    fn save(&self, sheet: &SampleSheet, path: &Path) -> Result<(), SheetError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();

        for (col, header) in sheet.headers.iter().enumerate() {
            worksheet
                .write_string(0, col as u16, header)
                .map_err(|e| SheetError::Write(e.to_string()))?;
        }

        for (r, row) in sheet.rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                let row_idx = (r + 1) as u32;
                let col_idx = c as u16;
                if let Ok(value) = cell.parse::<f64>() {
                    worksheet
                        .write_number(row_idx, col_idx, value)
                        .map_err(|e| SheetError::Write(e.to_string()))?;
                } else {
                    worksheet
                        .write_string(row_idx, col_idx, cell)
                        .map_err(|e| SheetError::Write(e.to_string()))?;
                }
            }
        }

        workbook
            .save(path)
            .map_err(|e| SheetError::Write(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_sheet() -> SampleSheet {
        SampleSheet {
            headers: vec!["Données à tester".to_string(), "Status".to_string()],
            rows: vec![
                vec!["bonjour".to_string(), "validated".to_string()],
                vec!["50".to_string(), "rejected".to_string()],
            ],
        }
    }

    #[test]
    fn test_round_trip_preserves_headers_and_cells() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("result.xlsx");
        let store = XlsxSheetStore::new();

        store.save(&sample_sheet(), &path).unwrap();
        let loaded = store.load(&path).unwrap();

        assert_eq!(loaded, sample_sheet());
    }

    #[test]
    fn test_save_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("result.xlsx");
        let store = XlsxSheetStore::new();

        store.save(&sample_sheet(), &path).unwrap();

        let smaller = SampleSheet {
            headers: vec!["Only".to_string()],
            rows: vec![vec!["one".to_string()]],
        };
        store.save(&smaller, &path).unwrap();

        let loaded = store.load(&path).unwrap();
        assert_eq!(loaded, smaller);
    }

    #[test]
    fn test_load_missing_file_is_an_open_error() {
        let store = XlsxSheetStore::new();
        let err = store.load(Path::new("no-such-file.xlsx")).unwrap_err();
        assert!(matches!(err, SheetError::Open(_)));
    }
}
