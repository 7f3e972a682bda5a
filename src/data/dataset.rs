//! Loaded student table: the raw DataFrame plus typed records.

use super::loader::{DataLoader, LoaderError};
use super::processor::{DataProcessor, ProcessorError, TrackFilter};
use super::record::StudentRecord;
use polars::prelude::*;

/// Immutable dataset for one dashboard render cycle.
#[derive(Clone)]
pub struct StudentDataset {
    frame: DataFrame,
    records: Vec<StudentRecord>,
    tracks: Vec<String>,
}

impl StudentDataset {
    /// Check required columns and materialize records.
    pub fn from_frame(frame: DataFrame) -> Result<Self, LoaderError> {
        DataLoader::check_columns(&frame)?;
        let records = DataProcessor::to_records(&frame)?;
        let tracks = DataProcessor::tracks(&records);
        Ok(Self {
            frame,
            records,
            tracks,
        })
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn records(&self) -> &[StudentRecord] {
        &self.records
    }

    /// Sorted distinct track labels.
    pub fn tracks(&self) -> &[String] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Subset for one track. `All` returns a copy of the whole dataset.
    pub fn filtered(&self, filter: &TrackFilter) -> Result<StudentDataset, ProcessorError> {
        if *filter == TrackFilter::All {
            return Ok(self.clone());
        }

        let frame = DataProcessor::filter_frame(&self.frame, filter)?;
        let records: Vec<StudentRecord> = self
            .records
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        let tracks = DataProcessor::tracks(&records);

        Ok(Self {
            frame,
            records,
            tracks,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> StudentDataset {
        let frame = polars::df!(
            "track" => [Some("Web"), Some("Data"), None, Some("Web")],
            "graduated_flag" => [true, false, true, false],
            "attendance_rate" => [0.9, 0.5, 0.8, 0.7],
            "exams_score" => [80.0, 60.0, 75.0, 70.0],
            "employment_status" => ["Freelancer", "Intern", "Full-time", "Freelancer"],
            "freelancing_income_usd_total" => [1200.0, 0.0, 0.0, 800.0]
        )
        .unwrap();
        StudentDataset::from_frame(frame).unwrap()
    }

    #[test]
    fn test_tracks_drop_missing() {
        assert_eq!(dataset().tracks(), ["Data", "Web"]);
    }

    #[test]
    fn test_filtered_frame_and_records_agree() {
        let web = dataset()
            .filtered(&TrackFilter::Track("Web".to_string()))
            .unwrap();
        assert_eq!(web.len(), 2);
        assert_eq!(web.frame().height(), 2);
        assert!(web.records().iter().all(|r| r.in_track("Web")));
        assert_eq!(web.tracks(), ["Web"]);
    }

    #[test]
    fn test_filtered_frame_matches_records_with_padded_labels() {
        let csv = "\
track,graduated_flag,attendance_rate,exams_score,employment_status,freelancing_income_usd_total
Web,1,0.9,80,Freelancer,1200
Web ,0,0.6,65,Freelancer,300
Data,1,0.8,75,Intern,0
";
        let frame = DataLoader::read_csv_bytes(csv.as_bytes()).unwrap();
        let ds = StudentDataset::from_frame(frame).unwrap();
        assert_eq!(ds.tracks(), ["Data", "Web", "Web "]);

        let web = ds.filtered(&TrackFilter::Track("Web".to_string())).unwrap();
        assert_eq!(web.len(), web.frame().height());
        assert_eq!(web.len(), 1);

        let padded = ds
            .filtered(&TrackFilter::Track("Web ".to_string()))
            .unwrap();
        assert_eq!(padded.len(), padded.frame().height());
        assert_eq!(padded.len(), 1);
    }

    #[test]
    fn test_filtered_all_is_identity() {
        let ds = dataset();
        let all = ds.filtered(&TrackFilter::All).unwrap();
        assert_eq!(all.records(), ds.records());
    }

    #[test]
    fn test_from_frame_requires_columns() {
        let frame = polars::df!("track" => ["Web"]).unwrap();
        assert!(matches!(
            StudentDataset::from_frame(frame),
            Err(LoaderError::MissingColumn(_))
        ));
    }
}
