//! Interquartile-range outlier removal
//!
//! Rows are kept when `lower <= value < upper`, where
//! `upper = Q3 + k_upper * IQR` and, only if `k_lower` is given,
//! `lower = Q1 - k_lower * IQR`. Quartiles use linear interpolation.

use crate::error::{PrepError, Result};
use crate::utils::float_values;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Bounds applied to one column
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IqrBounds {
    pub q1: f64,
    pub q3: f64,
    pub lower: Option<f64>,
    pub upper: f64,
}

impl IqrBounds {
    pub fn contains(&self, value: f64) -> bool {
        self.lower.map_or(true, |lower| lower <= value) && value < self.upper
    }
}

/// Outlier tolerance for one numeric column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierRule {
    pub column: String,
    pub k_upper: f64,
    #[serde(default)]
    pub k_lower: Option<f64>,
}

impl OutlierRule {
    pub fn upper(column: impl Into<String>, k_upper: f64) -> Self {
        Self {
            column: column.into(),
            k_upper,
            k_lower: None,
        }
    }

    pub fn both(column: impl Into<String>, k_upper: f64, k_lower: f64) -> Self {
        Self {
            column: column.into(),
            k_upper,
            k_lower: Some(k_lower),
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        let multipliers = std::iter::once(("k_upper", self.k_upper))
            .chain(self.k_lower.map(|k| ("k_lower", k)));
        for (name, k) in multipliers {
            if !k.is_finite() || k < 0.0 {
                return Err(PrepError::InvalidParameter {
                    name: format!("{}.{}", self.column, name),
                    value: k.to_string(),
                    reason: "must be a finite, non-negative multiplier".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Applies a sequence of IQR rules, each to the output of the previous one
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutlierFilter {
    rules: Vec<OutlierRule>,
}

impl OutlierFilter {
    pub fn new(rules: Vec<OutlierRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[OutlierRule] {
        &self.rules
    }

    pub fn apply(&self, df: &DataFrame) -> Result<DataFrame> {
        let mut result = df.clone();
        for rule in &self.rules {
            rule.validate()?;
            result = filter_by_iqr(&result, &rule.column, rule.k_upper, rule.k_lower)?;
        }
        Ok(result)
    }
}

/// Compute IQR bounds over the finite values of a column
pub fn iqr_bounds(df: &DataFrame, column: &str, k_upper: f64, k_lower: Option<f64>) -> Result<Option<IqrBounds>> {
    let values: Vec<f64> = float_values(df, column)?
        .into_iter()
        .flatten()
        .filter(|v| v.is_finite())
        .collect();

    if values.is_empty() {
        return Ok(None);
    }

    let ca = Float64Chunked::from_vec(column.into(), values);
    let q1 = ca.quantile(0.25, QuantileMethod::Linear)?;
    let q3 = ca.quantile(0.75, QuantileMethod::Linear)?;
    let (Some(q1), Some(q3)) = (q1, q3) else {
        return Ok(None);
    };

    let iqr = q3 - q1;
    Ok(Some(IqrBounds {
        q1,
        q3,
        lower: k_lower.map(|k| q1 - k * iqr),
        upper: q3 + k_upper * iqr,
    }))
}

/// Keep the rows whose `column` value lies inside the IQR bounds.
///
/// Rows with a missing value in `column` fail the comparison and are removed.
pub fn filter_by_iqr(df: &DataFrame, column: &str, k_upper: f64, k_lower: Option<f64>) -> Result<DataFrame> {
    let Some(bounds) = iqr_bounds(df, column, k_upper, k_lower)? else {
        return Ok(df.clone());
    };

    let mask: BooleanChunked = float_values(df, column)?
        .into_iter()
        .map(|v| v.map_or(false, |v| bounds.contains(v)))
        .collect();
    let result = df.filter(&mask)?;

    info!(
        column,
        upper = bounds.upper,
        lower = ?bounds.lower,
        removed = df.height() - result.height(),
        "Applied IQR outlier filter"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_df() -> DataFrame {
        df!(
            "id" => &[1i64, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11],
            "value" => &[1.0, 2.0, 3.0, 4.0, 5.0, 100.0, 6.0, 7.0, 8.0, 9.0, 10.0],
        )
        .unwrap()
    }

    #[test]
    fn test_bounds_use_linear_quartiles() {
        let df = create_test_df();
        let bounds = iqr_bounds(&df, "value", 1.5, Some(1.5)).unwrap().unwrap();

        assert!((bounds.q1 - 3.5).abs() < 1e-12);
        assert!((bounds.q3 - 8.5).abs() < 1e-12);
        assert!((bounds.upper - 16.0).abs() < 1e-12);
        assert!((bounds.lower.unwrap() - -4.0).abs() < 1e-12);
    }

    #[test]
    fn test_upper_outlier_removed() {
        let df = create_test_df();
        let result = filter_by_iqr(&df, "value", 1.5, None).unwrap();

        assert_eq!(result.height(), 10);
        let ids: Vec<Option<i64>> = result.column("id").unwrap().i64().unwrap().into_iter().collect();
        assert!(!ids.contains(&Some(6)));
    }

    #[test]
    fn test_upper_bound_is_exclusive_and_lower_inclusive() {
        let df = df!("value" => &[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        // Q1 = 2, Q3 = 4, IQR = 2 -> [1, 5)
        let result = filter_by_iqr(&df, "value", 0.5, Some(0.5)).unwrap();

        let values: Vec<f64> = result.column("value").unwrap().f64().unwrap().into_iter().flatten().collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_lower_bound_only_when_given() {
        let df = df!("value" => &[-100.0, 1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();

        let upper_only = filter_by_iqr(&df, "value", 3.0, None).unwrap();
        assert_eq!(upper_only.height(), 6);

        let both = filter_by_iqr(&df, "value", 3.0, Some(3.0)).unwrap();
        assert_eq!(both.height(), 5);
    }

    #[test]
    fn test_filter_applies_rules_in_sequence() {
        let df = df!(
            "a" => &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 500.0],
            "b" => &[10.0, 11.0, 12.0, 13.0, 14.0, -900.0, 15.0, 16.0, 17.0, 18.0],
        )
        .unwrap();

        let filter = OutlierFilter::new(vec![
            OutlierRule::upper("a", 3.0),
            OutlierRule::both("b", 3.0, 3.0),
        ]);
        let result = filter.apply(&df).unwrap();
        assert_eq!(result.height(), 8);
    }

    #[test]
    fn test_negative_multiplier_rejected() {
        let df = create_test_df();
        let filter = OutlierFilter::new(vec![OutlierRule::upper("value", -1.0)]);
        let err = filter.apply(&df).unwrap_err();
        assert!(matches!(err, PrepError::InvalidParameter { .. }));
    }

    #[test]
    fn test_missing_column() {
        let df = create_test_df();
        let err = filter_by_iqr(&df, "area", 3.0, None).unwrap_err();
        assert!(matches!(err, PrepError::SchemaMismatch(col) if col == "area"));
    }
}
