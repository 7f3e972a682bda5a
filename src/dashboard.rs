//! One full dashboard render: filter the dataset, compute every KPI and
//! chart series. Rebuilt from scratch whenever the filter changes.

use crate::config::DashboardConfig;
use crate::data::{DataProcessor, ProcessorError, StudentDataset, TrackFilter};
use crate::stats::{
    correlation_matrix, CorrelationMatrix, DistributionCalculator, EmploymentBreakdown,
    Histogram, KpiCalculator, KpiSummary, ScatterSeries, TrackIncome,
};
use serde::Serialize;
use tracing::debug;

/// Options affecting what a snapshot covers.
#[derive(Debug, Clone)]
pub struct SnapshotOptions {
    pub histogram_bins: usize,
    pub scope_details_to_track: bool,
    pub calculator: KpiCalculator,
}

impl Default for SnapshotOptions {
    fn default() -> Self {
        Self::from_config(&DashboardConfig::default())
    }
}

impl SnapshotOptions {
    pub fn from_config(config: &DashboardConfig) -> Self {
        Self {
            histogram_bins: config.histogram_bins,
            scope_details_to_track: config.scope_details_to_track,
            calculator: KpiCalculator::with_employed(&config.employed_statuses),
        }
    }
}

/// Everything the presenter draws.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub filter_label: String,
    pub summary: KpiSummary,
    /// Headline bar chart, always over the filtered records.
    pub income_by_track: Vec<TrackIncome>,
    /// Label of the record set behind the detail charts.
    pub details_label: String,
    pub exam_histogram: Histogram,
    pub attendance_vs_exam: Vec<ScatterSeries>,
    pub employment_by_track: EmploymentBreakdown,
    pub detail_income_by_track: Vec<TrackIncome>,
    pub correlation: CorrelationMatrix,
}

impl DashboardSnapshot {
    pub fn compute(
        dataset: &StudentDataset,
        filter: &TrackFilter,
        options: &SnapshotOptions,
    ) -> Result<Self, ProcessorError> {
        let filtered = dataset.filtered(filter)?;
        let summary = options.calculator.summary(filtered.records());
        let income_by_track = KpiCalculator::freelance_income_by_track(filtered.records());

        let (details, details_label) = if options.scope_details_to_track {
            (&filtered, filter.label().to_string())
        } else {
            (dataset, TrackFilter::All.label().to_string())
        };

        let records = details.records();
        let numeric = DataProcessor::numeric_columns(details.frame())?;

        let snapshot = Self {
            filter_label: filter.label().to_string(),
            summary,
            income_by_track,
            details_label,
            exam_histogram: DistributionCalculator::exam_histogram(records, options.histogram_bins),
            attendance_vs_exam: DistributionCalculator::attendance_vs_exam(records),
            employment_by_track: DistributionCalculator::employment_by_track(records),
            detail_income_by_track: KpiCalculator::freelance_income_by_track(records),
            correlation: correlation_matrix(&numeric),
        };

        debug!(
            filter = %snapshot.filter_label,
            records = snapshot.summary.record_count,
            exam_scores = snapshot.exam_histogram.total(),
            numeric_columns = snapshot.correlation.columns.len(),
            "dashboard snapshot computed"
        );
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> StudentDataset {
        let frame = polars::df!(
            "track" => ["Web", "Web", "Data", "Data", "Mobile"],
            "graduated_flag" => [1i64, 0, 1, 1, 0],
            "attendance_rate" => [0.9, 0.6, 0.8, 0.7, 0.4],
            "exams_score" => [85.0, 60.0, 78.0, 70.0, 40.0],
            "employment_status" => ["Freelancer", "Unemployed", "Freelancer", "Full-time", "Intern"],
            "freelancing_income_usd_total" => [1500.0, 0.0, 900.0, 0.0, 0.0]
        )
        .unwrap();
        StudentDataset::from_frame(frame).unwrap()
    }

    #[test]
    fn test_filtered_kpis_match_manual_filter() {
        let ds = dataset();
        let filter = TrackFilter::Track("Data".to_string());
        let options = SnapshotOptions::default();
        let snapshot = DashboardSnapshot::compute(&ds, &filter, &options).unwrap();

        let manual: Vec<_> = ds
            .records()
            .iter()
            .filter(|r| r.in_track("Data"))
            .cloned()
            .collect();
        assert_eq!(snapshot.summary, options.calculator.summary(&manual));
        assert_eq!(snapshot.summary.record_count, 2);
        assert_eq!(snapshot.filter_label, "Data");
    }

    #[test]
    fn test_details_default_to_all_records() {
        let ds = dataset();
        let snapshot = DashboardSnapshot::compute(
            &ds,
            &TrackFilter::Track("Web".to_string()),
            &SnapshotOptions::default(),
        )
        .unwrap();

        assert_eq!(snapshot.details_label, "All Tracks");
        assert_eq!(snapshot.exam_histogram.total(), 5);
        assert_eq!(snapshot.attendance_vs_exam.len(), 3);
        assert_eq!(snapshot.income_by_track.len(), 1);
        assert_eq!(snapshot.detail_income_by_track.len(), 2);
        assert_eq!(snapshot.correlation.columns.len(), 4);
    }

    #[test]
    fn test_details_scoped_to_track() {
        let options = SnapshotOptions {
            scope_details_to_track: true,
            ..SnapshotOptions::default()
        };
        let snapshot =
            DashboardSnapshot::compute(&dataset(), &TrackFilter::Track("Web".into()), &options)
                .unwrap();

        assert_eq!(snapshot.details_label, "Web");
        assert_eq!(snapshot.exam_histogram.total(), 2);
        assert_eq!(snapshot.employment_by_track.tracks, ["Web"]);
    }

    #[test]
    fn test_track_without_freelancers() {
        let snapshot = DashboardSnapshot::compute(
            &dataset(),
            &TrackFilter::Track("Mobile".to_string()),
            &SnapshotOptions::default(),
        )
        .unwrap();
        assert!(snapshot.income_by_track.is_empty());
        assert_eq!(snapshot.summary.freelancer_pct, Some(0.0));
    }

    #[test]
    fn test_unknown_track_is_all_undefined() {
        let snapshot = DashboardSnapshot::compute(
            &dataset(),
            &TrackFilter::Track("Cloud".to_string()),
            &SnapshotOptions::default(),
        )
        .unwrap();
        assert_eq!(snapshot.summary.record_count, 0);
        assert_eq!(snapshot.summary.graduation_rate, None);
        assert_eq!(snapshot.summary.avg_exam, None);
        assert!(snapshot.income_by_track.is_empty());
    }
}
