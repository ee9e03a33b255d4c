//! Cleaning, feature engineering, encoding and scaling stages
//!
//! Each stage consumes the full table and returns it transformed:
//! - Geocoordinate and county normalization
//! - Cross-field imputation and null-row removal
//! - Ratio features (tax rate, bathrooms per square foot)
//! - IQR outlier removal
//! - Dummy encoding with a dropped reference level
//! - Min-max scaling fitted on the training partition

mod config;
mod pipeline;
pub mod encoder;
pub mod features;
pub mod imputer;
pub mod normalizer;
pub mod outlier;
pub mod scaler;

pub use config::PipelineConfig;
pub use encoder::{encode, object_columns, CategoricalEncoder};
pub use features::{bath_per_sqft, tax_rate, FeatureDeriver};
pub use imputer::{drop_rows_with_nulls, impute_bathrooms, impute_structure_value, MissingValueResolver};
pub use normalizer::{county_name, fix_coordinate, FieldNormalizer, UnmappedCountyPolicy};
pub use outlier::{filter_by_iqr, iqr_bounds, IqrBounds, OutlierFilter, OutlierRule};
pub use pipeline::HousingPipeline;
pub use scaler::{scale, ColumnRange, FeatureScaler, ScaledPartitions, ScalerState, ZeroVarianceWarning};

use crate::error::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Column data type as seen by the pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColumnType {
    Numeric,
    Categorical,
    Other,
}

impl ColumnType {
    pub fn of(dtype: &DataType) -> Self {
        if dtype.is_primitive_numeric() {
            ColumnType::Numeric
        } else if matches!(dtype, DataType::String) {
            ColumnType::Categorical
        } else {
            ColumnType::Other
        }
    }
}

/// Per-column summary of a table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureStats {
    pub name: String,
    pub dtype: ColumnType,
    pub count: usize,
    pub null_count: usize,
    pub unique_count: usize,
    pub mean: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl FeatureStats {
    /// Summarize one column
    pub fn from_column(column: &Column) -> Result<Self> {
        let series = column.as_materialized_series();
        let dtype = ColumnType::of(series.dtype());

        let mut stats = Self {
            name: series.name().to_string(),
            dtype,
            count: series.len(),
            null_count: series.null_count(),
            unique_count: unique_count(series)?,
            mean: None,
            min: None,
            max: None,
        };

        if stats.dtype == ColumnType::Numeric {
            let floats = series.cast(&DataType::Float64)?;
            let ca = floats.f64()?;
            stats.mean = ca.mean();
            stats.min = ca.min();
            stats.max = ca.max();
        }

        Ok(stats)
    }
}

/// Distinct values, with null counted as one value
fn unique_count(series: &Series) -> Result<usize> {
    let text = series.cast(&DataType::String)?;
    let distinct: HashSet<Option<&str>> = text.str()?.into_iter().collect();
    Ok(distinct.len())
}

/// Summarize every column of a table
pub fn summarize(df: &DataFrame) -> Result<Vec<FeatureStats>> {
    df.get_columns().iter().map(FeatureStats::from_column).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summarize() {
        let df = df!(
            "a" => &[Some(1.0), Some(3.0), None],
            "b" => &["x", "y", "x"],
        )
        .unwrap();

        let stats = summarize(&df).unwrap();
        assert_eq!(stats.len(), 2);

        assert_eq!(stats[0].dtype, ColumnType::Numeric);
        assert_eq!(stats[0].null_count, 1);
        assert_eq!(stats[0].mean, Some(2.0));
        assert_eq!(stats[0].max, Some(3.0));

        assert_eq!(stats[1].dtype, ColumnType::Categorical);
        assert_eq!(stats[1].unique_count, 2);
        assert_eq!(stats[1].mean, None);
    }

    #[test]
    fn test_column_type_serialize() {
        let json = serde_json::to_string(&ColumnType::Numeric).unwrap();
        assert_eq!(json, "\"Numeric\"");
    }
}
