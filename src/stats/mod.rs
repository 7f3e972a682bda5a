//! Stats module - KPI and chart series computation

mod calculator;
mod correlation;
mod distribution;

pub use calculator::{KpiCalculator, KpiCard, KpiSummary, TrackIncome};
pub use correlation::{correlation_matrix, CorrelationMatrix};
pub use distribution::{
    DistributionCalculator, EmploymentBreakdown, Histogram, ScatterSeries, DEFAULT_HISTOGRAM_BINS,
};
