//! Chart series derived from student records.

use crate::data::StudentRecord;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

pub const DEFAULT_HISTOGRAM_BINS: usize = 20;

/// One equal-width histogram bin, `[lower, upper)` except the last which is closed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Histogram {
    pub bins: Vec<HistogramBin>,
}

impl Histogram {
    pub fn total(&self) -> usize {
        self.bins.iter().map(|b| b.count).sum()
    }

    pub fn max_count(&self) -> usize {
        self.bins.iter().map(|b| b.count).max().unwrap_or(0)
    }
}

/// Attendance (percent) against exam score for one track.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterSeries {
    pub track: String,
    pub points: Vec<[f64; 2]>,
}

/// Record counts per track and employment status.
/// `counts[t][s]` belongs to `tracks[t]` and `statuses[s]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EmploymentBreakdown {
    pub tracks: Vec<String>,
    pub statuses: Vec<String>,
    pub counts: Vec<Vec<usize>>,
}

impl EmploymentBreakdown {
    pub fn track_total(&self, track_idx: usize) -> usize {
        self.counts.get(track_idx).map(|c| c.iter().sum()).unwrap_or(0)
    }

    pub fn max_track_total(&self) -> usize {
        (0..self.tracks.len())
            .map(|t| self.track_total(t))
            .max()
            .unwrap_or(0)
    }
}

/// Builds the chart series of the detail section.
pub struct DistributionCalculator;

impl DistributionCalculator {
    /// Equal-width histogram between min and max. A single distinct value
    /// gets one unit-wide bin centred on it.
    pub fn histogram(values: &[f64], bins: usize) -> Histogram {
        let values: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if values.is_empty() || bins == 0 {
            return Histogram::default();
        }

        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        if max == min {
            return Histogram {
                bins: vec![HistogramBin {
                    lower: min - 0.5,
                    upper: max + 0.5,
                    count: values.len(),
                }],
            };
        }

        let width = (max - min) / bins as f64;
        let mut counts = vec![0usize; bins];
        for v in &values {
            let idx = (((v - min) / width).floor() as usize).min(bins - 1);
            counts[idx] += 1;
        }

        Histogram {
            bins: counts
                .into_iter()
                .enumerate()
                .map(|(i, count)| HistogramBin {
                    lower: min + i as f64 * width,
                    upper: min + (i + 1) as f64 * width,
                    count,
                })
                .collect(),
        }
    }

    /// Histogram of observed exam scores.
    pub fn exam_histogram(records: &[StudentRecord], bins: usize) -> Histogram {
        let scores: Vec<f64> = records.iter().filter_map(|r| r.exam_score).collect();
        Self::histogram(&scores, bins)
    }

    /// One scatter series per track, ordered by track label. Records
    /// missing the track, attendance or score are left out.
    pub fn attendance_vs_exam(records: &[StudentRecord]) -> Vec<ScatterSeries> {
        let mut by_track: BTreeMap<&str, Vec<[f64; 2]>> = BTreeMap::new();

        for r in records {
            if let (Some(track), Some(attendance), Some(score)) =
                (r.track.as_deref(), r.attendance_rate, r.exam_score)
            {
                by_track
                    .entry(track)
                    .or_default()
                    .push([attendance * 100.0, score]);
            }
        }

        by_track
            .into_iter()
            .map(|(track, points)| ScatterSeries {
                track: track.to_string(),
                points,
            })
            .collect()
    }

    /// Count records per (track, status); both axes sorted by label.
    pub fn employment_by_track(records: &[StudentRecord]) -> EmploymentBreakdown {
        let mut tracks = BTreeSet::new();
        let mut statuses = BTreeSet::new();
        let mut counts: BTreeMap<(&str, &str), usize> = BTreeMap::new();

        for r in records {
            if let (Some(track), Some(status)) = (r.track.as_deref(), r.employment_status.as_ref())
            {
                tracks.insert(track);
                statuses.insert(status.label());
                *counts.entry((track, status.label())).or_default() += 1;
            }
        }

        let tracks: Vec<&str> = tracks.into_iter().collect();
        let statuses: Vec<&str> = statuses.into_iter().collect();
        let grid = tracks
            .iter()
            .map(|t| {
                statuses
                    .iter()
                    .map(|s| counts.get(&(*t, *s)).copied().unwrap_or(0))
                    .collect()
            })
            .collect();

        EmploymentBreakdown {
            tracks: tracks.into_iter().map(str::to_string).collect(),
            statuses: statuses.into_iter().map(str::to_string).collect(),
            counts: grid,
        }
    }
}
