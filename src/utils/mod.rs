//! Column helpers shared by the pipeline stages

use crate::error::{PrepError, Result};
use polars::prelude::*;

/// Look up a column, failing with a schema mismatch when it is absent
pub fn require_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column> {
    df.column(name)
        .map_err(|_| PrepError::SchemaMismatch(name.to_string()))
}

/// Read a column as nullable `f64` values.
///
/// Integer columns and numeric text are converted; anything that cannot be
/// parsed as a number is a type conversion error, never a silent null.
pub fn float_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let column = require_column(df, name)?;
    let series = column
        .as_materialized_series()
        .strict_cast(&DataType::Float64)
        .map_err(|e| PrepError::TypeConversion {
            column: name.to_string(),
            reason: e.to_string(),
        })?;
    let ca = series.f64()?;
    Ok(ca.into_iter().collect())
}

/// Read a column as nullable text values
pub fn text_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let column = require_column(df, name)?;
    let series = column
        .as_materialized_series()
        .cast(&DataType::String)
        .map_err(|e| PrepError::TypeConversion {
            column: name.to_string(),
            reason: e.to_string(),
        })?;
    let ca = series.str()?;
    Ok(ca.into_iter().map(|v| v.map(str::to_string)).collect())
}

/// Insert or replace a `f64` column in place
pub fn replace_f64_column(df: &mut DataFrame, name: &str, values: Vec<Option<f64>>) -> Result<()> {
    df.with_column(Series::new(name.into(), values))?;
    Ok(())
}

/// Whether a value is missing: null, or NaN in a float column
fn is_missing(value: Option<f64>) -> bool {
    value.map_or(true, f64::is_nan)
}

/// Row mask that is true where no column holds a missing value
pub fn complete_rows_mask(df: &DataFrame) -> BooleanChunked {
    let mut keep = vec![true; df.height()];

    for column in df.get_columns() {
        let series = column.as_materialized_series();
        if let Ok(ca) = series.f64() {
            for (row, value) in ca.into_iter().enumerate() {
                if is_missing(value) {
                    keep[row] = false;
                }
            }
        } else {
            let nulls = series.is_null();
            for (row, null) in nulls.into_iter().enumerate() {
                if null.unwrap_or(true) {
                    keep[row] = false;
                }
            }
        }
    }

    keep.into_iter().collect()
}

/// Row mask that is true for the listed row positions
pub fn membership_mask(height: usize, rows: &[usize]) -> BooleanChunked {
    let mut mask = vec![false; height];
    for &row in rows {
        mask[row] = true;
    }
    mask.into_iter().collect()
}

/// Names of all primitive numeric columns, in table order
pub fn numeric_columns(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|c| c.dtype().is_primitive_numeric())
        .map(|c| c.name().to_string())
        .collect()
}
