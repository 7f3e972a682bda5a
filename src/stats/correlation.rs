//! Pearson correlation matrix over numeric columns.

use rayon::prelude::*;
use serde::Serialize;
use statrs::statistics::Statistics;

/// Square matrix, `values[i][j]` correlates `columns[i]` with `columns[j]`.
/// `None` marks pairs with too few observations or zero variance.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.values.get(row)?.get(col).copied().flatten()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Pearson correlation using pairwise-complete observations.
pub fn pearson(a: &[Option<f64>], b: &[Option<f64>]) -> Option<f64> {
    let (xs, ys): (Vec<f64>, Vec<f64>) = a
        .iter()
        .zip(b.iter())
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .unzip();

    if xs.len() < 2 {
        return None;
    }

    let cov = xs.iter().covariance(ys.iter());
    let denom = xs.iter().std_dev() * ys.iter().std_dev();
    if denom == 0.0 || !denom.is_finite() || !cov.is_finite() {
        return None;
    }
    Some((cov / denom).clamp(-1.0, 1.0))
}

/// Compute the full matrix, column pairs in parallel.
pub fn correlation_matrix(columns: &[(String, Vec<Option<f64>>)]) -> CorrelationMatrix {
    let n = columns.len();
    let pairs: Vec<(usize, usize)> = (0..n).flat_map(|i| (i..n).map(move |j| (i, j))).collect();

    let results: Vec<(usize, usize, Option<f64>)> = pairs
        .par_iter()
        .map(|&(i, j)| {
            let r = pearson(&columns[i].1, &columns[j].1);
            // Exact 1.0 on the diagonal whenever the column is defined
            let r = if i == j { r.map(|_| 1.0) } else { r };
            (i, j, r)
        })
        .collect();

    let mut values = vec![vec![None; n]; n];
    for (i, j, r) in results {
        values[i][j] = r;
        values[j][i] = r;
    }

    CorrelationMatrix {
        columns: columns.iter().map(|(name, _)| name.clone()).collect(),
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col(name: &str, values: &[f64]) -> (String, Vec<Option<f64>>) {
        (name.to_string(), values.iter().map(|v| Some(*v)).collect())
    }

    #[test]
    fn test_perfect_correlations() {
        let a: Vec<Option<f64>> = [1.0, 2.0, 3.0, 4.0].iter().map(|v| Some(*v)).collect();
        let b: Vec<Option<f64>> = [2.0, 4.0, 6.0, 8.0].iter().map(|v| Some(*v)).collect();
        let c: Vec<Option<f64>> = [4.0, 3.0, 2.0, 1.0].iter().map(|v| Some(*v)).collect();
        assert!((pearson(&a, &b).unwrap() - 1.0).abs() < 1e-9);
        assert!((pearson(&a, &c).unwrap() + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_pairwise_complete() {
        let a = vec![Some(1.0), Some(2.0), None, Some(4.0)];
        let b = vec![Some(1.0), Some(2.0), Some(100.0), Some(4.0)];
        assert!((pearson(&a, &b).unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_undefined_cases() {
        let constant = vec![Some(5.0), Some(5.0), Some(5.0)];
        let other = vec![Some(1.0), Some(2.0), Some(3.0)];
        assert_eq!(pearson(&constant, &other), None);
        assert_eq!(pearson(&[Some(1.0)], &[Some(2.0)]), None);
    }

    #[test]
    fn test_matrix_symmetric_with_unit_diagonal() {
        let columns = vec![
            col("attendance_rate", &[0.5, 0.7, 0.9, 0.6]),
            col("exams_score", &[55.0, 72.0, 91.0, 60.0]),
            col("freelancing_income_usd_total", &[0.0, 300.0, 100.0, 900.0]),
            col("cohort", &[1.0, 1.0, 1.0, 1.0]),
        ];
        let matrix = correlation_matrix(&columns);
        assert_eq!(matrix.columns.len(), 4);
        for i in 0..3 {
            assert_eq!(matrix.get(i, i), Some(1.0));
            for j in 0..4 {
                assert_eq!(matrix.get(i, j), matrix.get(j, i));
            }
        }
        assert_eq!(matrix.get(3, 3), None);
        assert!(matrix.get(0, 1).unwrap() > 0.9);
    }
}
