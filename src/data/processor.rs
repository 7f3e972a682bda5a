//! Data Processor Module
//! Track filtering and column extraction from the loaded DataFrame.

use super::record::{
    EmploymentStatus, StudentRecord, ATTENDANCE_COL, EMPLOYMENT_COL, EXAM_COL, GRADUATED_COL,
    INCOME_COL, TRACK_COL,
};
use polars::prelude::*;
use std::collections::BTreeSet;
use thiserror::Error;

pub const ALL_TRACKS_LABEL: &str = "All Tracks";

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// Track selection applied before KPIs are computed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TrackFilter {
    #[default]
    All,
    Track(String),
}

impl TrackFilter {
    /// Build a filter from a selector label. "All Tracks" maps to `All`.
    pub fn from_label(label: &str) -> Self {
        if label == ALL_TRACKS_LABEL {
            TrackFilter::All
        } else {
            TrackFilter::Track(label.to_string())
        }
    }

    pub fn label(&self) -> &str {
        match self {
            TrackFilter::All => ALL_TRACKS_LABEL,
            TrackFilter::Track(name) => name,
        }
    }

    pub fn matches(&self, record: &StudentRecord) -> bool {
        match self {
            TrackFilter::All => true,
            TrackFilter::Track(name) => record.in_track(name),
        }
    }
}

/// Handles filtering and typed extraction of student columns.
pub struct DataProcessor;

impl DataProcessor {
    /// Apply a track filter to the DataFrame.
    pub fn filter_frame(df: &DataFrame, filter: &TrackFilter) -> Result<DataFrame, ProcessorError> {
        match filter {
            TrackFilter::All => Ok(df.clone()),
            TrackFilter::Track(name) => {
                let filtered = df
                    .clone()
                    .lazy()
                    .filter(col(TRACK_COL).cast(DataType::String).eq(lit(name.as_str())))
                    .collect()?;
                Ok(filtered)
            }
        }
    }

    /// Column values as floats; nulls and unparsable cells are `None`.
    pub fn float_values(df: &DataFrame, column: &str) -> Result<Vec<Option<f64>>, ProcessorError> {
        let casted = df.column(column)?.cast(&DataType::Float64)?;
        let values = casted
            .as_materialized_series()
            .f64()?
            .into_iter()
            .map(|v| v.filter(|x| !x.is_nan()))
            .collect();
        Ok(values)
    }

    /// Column values as strings, exactly as stored. Labels are never
    /// trimmed so record filters agree with `filter_frame`.
    pub fn string_values(
        df: &DataFrame,
        column: &str,
    ) -> Result<Vec<Option<String>>, ProcessorError> {
        let casted = df.column(column)?.cast(&DataType::String)?;
        let values = casted
            .as_materialized_series()
            .str()?
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect();
        Ok(values)
    }

    /// Boolean flags stored as bool, 0/1 numbers or "true"/"false" text.
    pub fn flag_values(df: &DataFrame, column: &str) -> Result<Vec<Option<bool>>, ProcessorError> {
        if df.column(column)?.dtype() == &DataType::String {
            let values = Self::string_values(df, column)?
                .into_iter()
                .map(|v| match v?.trim().to_ascii_lowercase().as_str() {
                    "true" | "yes" | "1" => Some(true),
                    "false" | "no" | "0" => Some(false),
                    _ => None,
                })
                .collect();
            return Ok(values);
        }

        let values = Self::float_values(df, column)?
            .into_iter()
            .map(|v| v.map(|flag| flag != 0.0))
            .collect();
        Ok(values)
    }

    /// Materialize typed records from the required columns.
    pub fn to_records(df: &DataFrame) -> Result<Vec<StudentRecord>, ProcessorError> {
        let tracks = Self::string_values(df, TRACK_COL)?;
        let graduated = Self::flag_values(df, GRADUATED_COL)?;
        let attendance = Self::float_values(df, ATTENDANCE_COL)?;
        let exams = Self::float_values(df, EXAM_COL)?;
        let statuses = Self::string_values(df, EMPLOYMENT_COL)?;
        let incomes = Self::float_values(df, INCOME_COL)?;

        let records = (0..df.height())
            .map(|i| StudentRecord {
                track: tracks[i].clone().filter(|t| !t.is_empty()),
                graduated: graduated[i],
                attendance_rate: attendance[i],
                exam_score: exams[i],
                employment_status: statuses[i]
                    .as_deref()
                    .filter(|s| !s.is_empty())
                    .map(EmploymentStatus::from_label),
                freelancing_income_usd: incomes[i],
            })
            .collect();

        Ok(records)
    }

    /// Names of numeric (integer or float) columns. Booleans are excluded.
    pub fn numeric_column_names(df: &DataFrame) -> Vec<String> {
        df.get_columns()
            .iter()
            .filter(|col| {
                matches!(
                    col.dtype(),
                    DataType::Float32
                        | DataType::Float64
                        | DataType::Int8
                        | DataType::Int16
                        | DataType::Int32
                        | DataType::Int64
                        | DataType::UInt8
                        | DataType::UInt16
                        | DataType::UInt32
                        | DataType::UInt64
                )
            })
            .map(|col| col.name().to_string())
            .collect()
    }

    /// Every numeric column with its values, in DataFrame column order.
    pub fn numeric_columns(
        df: &DataFrame,
    ) -> Result<Vec<(String, Vec<Option<f64>>)>, ProcessorError> {
        Self::numeric_column_names(df)
            .into_iter()
            .map(|name| {
                let values = Self::float_values(df, &name)?;
                Ok((name, values))
            })
            .collect()
    }

    /// Sorted distinct track labels, missing values dropped.
    pub fn tracks(records: &[StudentRecord]) -> Vec<String> {
        records
            .iter()
            .filter_map(|r| r.track.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
