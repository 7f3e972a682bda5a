//! CSV Data Loader Module
//! Handles CSV file loading and column checks using Polars.

use super::dataset::StudentDataset;
use super::processor::ProcessorError;
use super::record::REQUIRED_COLUMNS;
use polars::prelude::*;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("Missing required column: {0}")]
    MissingColumn(String),
    #[error("Failed to read student records: {0}")]
    Records(#[from] ProcessorError),
    #[error("No data loaded")]
    NoData,
}

/// Handles CSV file loading with Polars.
pub struct DataLoader {
    dataset: Option<StudentDataset>,
    file_path: Option<PathBuf>,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    pub fn new() -> Self {
        Self {
            dataset: None,
            file_path: None,
        }
    }

    /// Read a CSV file into a DataFrame.
    pub fn read_csv(file_path: &Path) -> Result<DataFrame, LoaderError> {
        let df = LazyCsvReader::new(file_path)
            .with_infer_schema_length(Some(10000))
            .with_ignore_errors(true)
            .finish()?
            .collect()?;
        debug!(path = %file_path.display(), rows = df.height(), "csv read");
        Ok(df)
    }

    /// Read CSV content already held in memory.
    pub fn read_csv_bytes(bytes: &[u8]) -> Result<DataFrame, LoaderError> {
        let df = CsvReadOptions::default()
            .with_infer_schema_length(Some(10000))
            .with_ignore_errors(true)
            .into_reader_with_file_handle(Cursor::new(bytes.to_vec()))
            .finish()?;
        Ok(df)
    }

    /// Fail with the first required column the DataFrame lacks.
    pub fn check_columns(df: &DataFrame) -> Result<(), LoaderError> {
        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        for required in REQUIRED_COLUMNS {
            if !names.iter().any(|n| n == required) {
                return Err(LoaderError::MissingColumn(required.to_string()));
            }
        }
        Ok(())
    }

    /// Load a CSV file and keep the resulting dataset.
    pub fn load_csv(&mut self, file_path: &Path) -> Result<&StudentDataset, LoaderError> {
        let df = Self::read_csv(file_path)?;
        let dataset = StudentDataset::from_frame(df)?;
        info!(
            path = %file_path.display(),
            records = dataset.len(),
            tracks = dataset.tracks().len(),
            "dataset loaded"
        );

        self.file_path = Some(file_path.to_path_buf());
        self.dataset = Some(dataset);
        self.dataset.as_ref().ok_or(LoaderError::NoData)
    }

    /// Get the loaded dataset.
    pub fn dataset(&self) -> Option<&StudentDataset> {
        self.dataset.as_ref()
    }

    /// Get file path.
    pub fn file_path(&self) -> Option<&PathBuf> {
        self.file_path.as_ref()
    }

    /// Set dataset directly (used for async loading)
    pub fn set_dataset(&mut self, dataset: StudentDataset, file_path: PathBuf) {
        self.dataset = Some(dataset);
        self.file_path = Some(file_path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
student_id,track,graduated_flag,attendance_rate,exams_score,employment_status,freelancing_income_usd_total
1,Web,1,0.9,80,Freelancer,1200
2,Data,0,0.5,60,Unemployed,0
3,Web,1,0.8,,Full-time,0
";

    #[test]
    fn test_read_csv_bytes() {
        let df = DataLoader::read_csv_bytes(CSV.as_bytes()).unwrap();
        assert_eq!(df.height(), 3);
        assert!(DataLoader::check_columns(&df).is_ok());
    }

    #[test]
    fn test_missing_column() {
        let df = DataLoader::read_csv_bytes(b"track,exams_score\nWeb,70\n").unwrap();
        match DataLoader::check_columns(&df) {
            Err(LoaderError::MissingColumn(name)) => assert_eq!(name, "graduated_flag"),
            other => panic!("expected missing column, got {:?}", other),
        }
    }

    #[test]
    fn test_load_csv_from_file() {
        let path = std::env::temp_dir().join(format!(
            "student_kpi_loader_{}.csv",
            std::process::id()
        ));
        std::fs::write(&path, CSV).unwrap();

        let mut loader = DataLoader::new();
        let dataset = loader.load_csv(&path).unwrap();
        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.tracks(), ["Data", "Web"]);
        assert_eq!(loader.file_path(), Some(&path));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_load_missing_file() {
        let mut loader = DataLoader::new();
        assert!(loader
            .load_csv(Path::new("/nonexistent/student_kpi.csv"))
            .is_err());
        assert!(loader.dataset().is_none());
    }
}
