//! KPI Calculator Module
//! Scalar KPIs and per-track freelance income over a set of student records.

use crate::data::{EmploymentStatus, StudentRecord};
use serde::Serialize;
use statrs::statistics::Statistics;
use std::collections::BTreeMap;

/// Unit a KPI is displayed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KpiUnit {
    Percent,
    Score,
}

/// One dashboard card.
#[derive(Debug, Clone, PartialEq)]
pub struct KpiCard {
    pub title: &'static str,
    pub value: Option<f64>,
    pub unit: KpiUnit,
}

impl KpiCard {
    /// One decimal place, `%` suffix for percentages, `N/A` when undefined.
    pub fn display_value(&self) -> String {
        match (self.value, self.unit) {
            (None, _) => "N/A".to_string(),
            (Some(v), KpiUnit::Percent) => format!("{:.1}%", v),
            (Some(v), KpiUnit::Score) => format!("{:.1}", v),
        }
    }
}

/// Scalar KPIs for one render. `None` means the value is undefined
/// because no record contributed to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiSummary {
    pub record_count: usize,
    pub graduation_rate: Option<f64>,
    pub employment_rate: Option<f64>,
    pub freelancer_pct: Option<f64>,
    pub avg_exam: Option<f64>,
    pub attendance_rate: Option<f64>,
}

impl KpiSummary {
    /// Cards in display order: three on the first row, two on the second.
    pub fn cards(&self) -> [KpiCard; 5] {
        [
            KpiCard {
                title: "Graduation Rate",
                value: self.graduation_rate,
                unit: KpiUnit::Percent,
            },
            KpiCard {
                title: "Employment Rate",
                value: self.employment_rate,
                unit: KpiUnit::Percent,
            },
            KpiCard {
                title: "Freelancers %",
                value: self.freelancer_pct,
                unit: KpiUnit::Percent,
            },
            KpiCard {
                title: "Average Exam Score",
                value: self.avg_exam,
                unit: KpiUnit::Score,
            },
            KpiCard {
                title: "Average Attendance",
                value: self.attendance_rate,
                unit: KpiUnit::Percent,
            },
        ]
    }
}

/// Average freelance income of one track.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackIncome {
    pub track: String,
    pub avg_income: f64,
    pub freelancers: usize,
}

/// Computes KPIs over student records.
#[derive(Debug, Clone)]
pub struct KpiCalculator {
    employed: Vec<EmploymentStatus>,
}

impl Default for KpiCalculator {
    fn default() -> Self {
        Self {
            employed: EmploymentStatus::DEFAULT_EMPLOYED.to_vec(),
        }
    }
}

impl KpiCalculator {
    /// Calculator with a custom employed set, given as CSV labels.
    pub fn with_employed<S: AsRef<str>>(labels: &[S]) -> Self {
        Self {
            employed: labels
                .iter()
                .map(|l| EmploymentStatus::from_label(l.as_ref()))
                .collect(),
        }
    }

    /// Mean of the observed values, `None` if there are none.
    pub fn mean_of<I: IntoIterator<Item = f64>>(values: I) -> Option<f64> {
        let values: Vec<f64> = values.into_iter().collect();
        if values.is_empty() {
            return None;
        }
        Some(values.iter().mean())
    }

    /// Percentage of records matching `pred`. Every record counts in the
    /// denominator, including ones with missing fields.
    pub fn percentage_of<F>(records: &[StudentRecord], pred: F) -> Option<f64>
    where
        F: Fn(&StudentRecord) -> bool,
    {
        if records.is_empty() {
            return None;
        }
        let hits = records.iter().filter(|r| pred(r)).count();
        Some(hits as f64 / records.len() as f64 * 100.0)
    }

    pub fn graduation_rate(records: &[StudentRecord]) -> Option<f64> {
        Self::mean_of(
            records
                .iter()
                .filter_map(|r| r.graduated)
                .map(|g| if g { 1.0 } else { 0.0 }),
        )
        .map(|m| m * 100.0)
    }

    pub fn attendance_rate(records: &[StudentRecord]) -> Option<f64> {
        Self::mean_of(records.iter().filter_map(|r| r.attendance_rate)).map(|m| m * 100.0)
    }

    pub fn avg_exam(records: &[StudentRecord]) -> Option<f64> {
        Self::mean_of(records.iter().filter_map(|r| r.exam_score))
    }

    pub fn freelancer_pct(records: &[StudentRecord]) -> Option<f64> {
        Self::percentage_of(records, StudentRecord::is_freelancer)
    }

    pub fn employment_rate(&self, records: &[StudentRecord]) -> Option<f64> {
        Self::percentage_of(records, |r| {
            r.employment_status
                .as_ref()
                .is_some_and(|s| self.employed.contains(s))
        })
    }

    /// All scalar KPIs for a record set.
    pub fn summary(&self, records: &[StudentRecord]) -> KpiSummary {
        KpiSummary {
            record_count: records.len(),
            graduation_rate: Self::graduation_rate(records),
            employment_rate: self.employment_rate(records),
            freelancer_pct: Self::freelancer_pct(records),
            avg_exam: Self::avg_exam(records),
            attendance_rate: Self::attendance_rate(records),
        }
    }

    /// Mean freelance income per track over Freelancer records only.
    /// Tracks without a freelancer income observation get no entry.
    pub fn freelance_income_by_track(records: &[StudentRecord]) -> Vec<TrackIncome> {
        let mut by_track: BTreeMap<&str, Vec<f64>> = BTreeMap::new();

        for record in records.iter().filter(|r| r.is_freelancer()) {
            if let (Some(track), Some(income)) =
                (record.track.as_deref(), record.freelancing_income_usd)
            {
                by_track.entry(track).or_default().push(income);
            }
        }

        by_track
            .into_iter()
            .filter_map(|(track, incomes)| {
                let freelancers = incomes.len();
                Self::mean_of(incomes).map(|avg_income| TrackIncome {
                    track: track.to_string(),
                    avg_income,
                    freelancers,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(track: &str, graduated: bool, status: &str, income: f64) -> StudentRecord {
        StudentRecord {
            track: Some(track.to_string()),
            graduated: Some(graduated),
            attendance_rate: Some(0.8),
            exam_score: Some(70.0),
            employment_status: Some(EmploymentStatus::from_label(status)),
            freelancing_income_usd: Some(income),
        }
    }

    #[test]
    fn test_graduation_rate_six_of_ten() {
        let records: Vec<StudentRecord> = (0..10)
            .map(|i| record("Web", i < 6, "Intern", 0.0))
            .collect();
        let rate = KpiCalculator::graduation_rate(&records).unwrap();
        assert!((rate - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_set_is_undefined() {
        let summary = KpiCalculator::default().summary(&[]);
        assert_eq!(summary.record_count, 0);
        assert_eq!(summary.graduation_rate, None);
        assert_eq!(summary.employment_rate, None);
        assert_eq!(summary.freelancer_pct, None);
        assert_eq!(summary.avg_exam, None);
        assert_eq!(summary.attendance_rate, None);
        assert!(summary.cards().iter().all(|c| c.display_value() == "N/A"));
    }

    #[test]
    fn test_percentages_in_range() {
        let records = vec![
            record("Web", true, "Freelancer", 500.0),
            record("Web", false, "Unemployed", 0.0),
            record("Data", true, "Full-time", 0.0),
            record("Data", true, "Part-time", 0.0),
            StudentRecord::default(),
        ];
        let summary = KpiCalculator::default().summary(&records);
        for value in [
            summary.graduation_rate,
            summary.employment_rate,
            summary.freelancer_pct,
            summary.attendance_rate,
        ] {
            let v = value.unwrap();
            assert!((0.0..=100.0).contains(&v), "{} out of range", v);
        }
        // Missing status counts in the denominator
        assert!((summary.employment_rate.unwrap() - 60.0).abs() < 1e-9);
        assert!((summary.freelancer_pct.unwrap() - 20.0).abs() < 1e-9);
        // Missing flag is skipped by the mean
        assert!((summary.graduation_rate.unwrap() - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_custom_employed_set() {
        let records = vec![
            record("Web", true, "Intern", 0.0),
            record("Web", true, "Full-time", 0.0),
        ];
        let calc = KpiCalculator::with_employed(&["Full-time"]);
        assert!((calc.employment_rate(&records).unwrap() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_income_uses_freelancers_only() {
        let records = vec![
            record("Web", true, "Freelancer", 1000.0),
            record("Web", true, "Freelancer", 3000.0),
            record("Web", true, "Full-time", 90000.0),
            record("Data", true, "Freelancer", 500.0),
            record("Mobile", true, "Intern", 700.0),
        ];
        let income = KpiCalculator::freelance_income_by_track(&records);
        assert_eq!(
            income,
            vec![
                TrackIncome {
                    track: "Data".to_string(),
                    avg_income: 500.0,
                    freelancers: 1
                },
                TrackIncome {
                    track: "Web".to_string(),
                    avg_income: 2000.0,
                    freelancers: 2
                },
            ]
        );
        // Mobile has no freelancers and therefore no entry
        assert!(income.iter().all(|t| t.track != "Mobile"));
    }

    #[test]
    fn test_card_formatting() {
        let summary = KpiSummary {
            record_count: 3,
            graduation_rate: Some(66.6666),
            employment_rate: Some(100.0),
            freelancer_pct: Some(0.0),
            avg_exam: Some(72.24),
            attendance_rate: Some(81.04),
        };
        let values: Vec<String> = summary.cards().iter().map(KpiCard::display_value).collect();
        assert_eq!(values, ["66.7%", "100.0%", "0.0%", "72.2", "81.0%"]);
    }
}
