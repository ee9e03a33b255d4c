//! Min-max feature scaling
//!
//! The scaler is fitted once on the training partition and the resulting
//! [`ScalerState`] is applied unchanged to every partition.

use crate::error::{PrepError, Result};
use crate::split::Partitions;
use crate::utils::{float_values, replace_f64_column};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Fitted range of one column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnRange {
    pub column: String,
    pub min: f64,
    pub max: f64,
}

impl ColumnRange {
    pub fn is_zero_variance(&self) -> bool {
        self.max == self.min
    }

    fn scale(&self, x: f64) -> f64 {
        if self.is_zero_variance() {
            0.0
        } else {
            (x - self.min) / (self.max - self.min)
        }
    }

    fn unscale(&self, y: f64) -> f64 {
        if self.is_zero_variance() {
            self.min
        } else {
            y * (self.max - self.min) + self.min
        }
    }
}

/// Non-fatal notice that a column had a single value on the training data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZeroVarianceWarning {
    pub column: String,
}

/// Immutable min-max parameters learned from a training table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalerState {
    ranges: Vec<ColumnRange>,
}

/// Fits min-max scaler state
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureScaler;

impl FeatureScaler {
    /// Compute per-column (min, max) over the training table only
    pub fn fit(train: &DataFrame, columns: &[&str]) -> Result<ScalerState> {
        let mut ranges = Vec::with_capacity(columns.len());

        for column in columns {
            let mut min = f64::INFINITY;
            let mut max = f64::NEG_INFINITY;
            for v in float_values(train, column)?.into_iter().flatten() {
                if v.is_finite() {
                    min = min.min(v);
                    max = max.max(v);
                }
            }

            if min > max {
                return Err(PrepError::MissingValues(column.to_string()));
            }

            let range = ColumnRange {
                column: column.to_string(),
                min,
                max,
            };
            if range.is_zero_variance() {
                warn!(column = %column, value = min, "Zero-variance column, scaled values will be 0");
            }
            ranges.push(range);
        }

        debug!(columns = ranges.len(), rows = train.height(), "Fitted min-max scaler");
        Ok(ScalerState { ranges })
    }
}

impl ScalerState {
    pub fn ranges(&self) -> &[ColumnRange] {
        &self.ranges
    }

    pub fn range(&self, column: &str) -> Option<&ColumnRange> {
        self.ranges.iter().find(|r| r.column == column)
    }

    /// Columns whose fitted min equals their max
    pub fn zero_variance_columns(&self) -> Vec<ZeroVarianceWarning> {
        self.ranges
            .iter()
            .filter(|r| r.is_zero_variance())
            .map(|r| ZeroVarianceWarning {
                column: r.column.clone(),
            })
            .collect()
    }

    /// Map every fitted column to `(x - min) / (max - min)`.
    ///
    /// Other columns, including the row key, pass through untouched and
    /// row order is preserved. Values outside the fitted range map
    /// outside [0, 1].
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        self.apply(df, ColumnRange::scale)
    }

    /// Map scaled values back to their original units
    pub fn inverse_transform(&self, df: &DataFrame) -> Result<DataFrame> {
        self.apply(df, ColumnRange::unscale)
    }

    fn apply(&self, df: &DataFrame, f: fn(&ColumnRange, f64) -> f64) -> Result<DataFrame> {
        let mut result = df.clone();
        for range in &self.ranges {
            let values: Vec<Option<f64>> = float_values(df, &range.column)?
                .into_iter()
                .map(|v| v.map(|x| f(range, x)))
                .collect();
            replace_f64_column(&mut result, &range.column, values)?;
        }
        Ok(result)
    }
}

/// Scaled partitions together with the state that produced them
#[derive(Debug, Clone)]
pub struct ScaledPartitions {
    pub train: DataFrame,
    pub validate: DataFrame,
    pub test: DataFrame,
    pub state: ScalerState,
}

/// Fit on `train` and apply the same state to all three partitions
pub fn scale(partitions: &Partitions, columns: &[&str]) -> Result<ScaledPartitions> {
    let state = FeatureScaler::fit(&partitions.train, columns)?;
    Ok(ScaledPartitions {
        train: state.transform(&partitions.train)?,
        validate: state.transform(&partitions.validate)?,
        test: state.transform(&partitions.test)?,
        state,
    })
}
