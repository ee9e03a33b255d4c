//! Categorical (dummy) encoding
//!
//! Each categorical column of cardinality N expands into N - 1 `i32`
//! indicator columns named `<column>_<category>`. Categories are ordered
//! lexicographically and the first one is the reference level.

use crate::error::{PrepError, Result};
use crate::utils::text_values;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

/// Names of the text columns of a table, in table order
pub fn object_columns(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|c| matches!(c.dtype(), DataType::String))
        .map(|c| c.name().to_string())
        .collect()
}

/// Indicator columns for `columns`, appended; original columns are kept
pub fn encode(df: &DataFrame, columns: &[&str]) -> Result<DataFrame> {
    CategoricalEncoder::new().fit_transform(df, columns)
}

/// Learned categories for one column
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ColumnLevels {
    column: String,
    /// Sorted; index 0 is the reference level
    levels: Vec<String>,
}

/// Dummy encoder with a dropped reference level
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoricalEncoder {
    drop_originals: bool,
    mappings: Vec<ColumnLevels>,
    is_fitted: bool,
}

impl CategoricalEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the encoded source columns after expansion
    pub fn with_drop_originals(mut self, drop: bool) -> Self {
        self.drop_originals = drop;
        self
    }

    /// Learn the categories of each column
    pub fn fit(&mut self, df: &DataFrame, columns: &[&str]) -> Result<&mut Self> {
        self.mappings.clear();
        for column in columns {
            let levels: BTreeSet<String> = text_values(df, column)?.into_iter().flatten().collect();
            self.mappings.push(ColumnLevels {
                column: column.to_string(),
                levels: levels.into_iter().collect(),
            });
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Append the indicator columns
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(PrepError::DataError("Categorical encoder is not fitted".to_string()));
        }

        let mut result = df.clone();

        for mapping in &self.mappings {
            let values = text_values(df, &mapping.column)?;

            for level in mapping.levels.iter().skip(1) {
                let indicator: Vec<i32> = values
                    .iter()
                    .map(|v| i32::from(v.as_deref() == Some(level.as_str())))
                    .collect();
                let name = format!("{}_{}", mapping.column, level);
                result.with_column(Series::new(name.into(), indicator))?;
            }

            debug!(
                column = %mapping.column,
                levels = mapping.levels.len(),
                indicators = mapping.levels.len().saturating_sub(1),
                "Encoded categorical column"
            );

            if self.drop_originals {
                result = result.drop(&mapping.column)?;
            }
        }

        Ok(result)
    }

    pub fn fit_transform(&mut self, df: &DataFrame, columns: &[&str]) -> Result<DataFrame> {
        self.fit(df, columns)?;
        self.transform(df)
    }

    /// Indicator column names produced for a column, in output order
    pub fn indicator_names(&self, column: &str) -> Vec<String> {
        self.mappings
            .iter()
            .find(|m| m.column == column)
            .map(|m| {
                m.levels
                    .iter()
                    .skip(1)
                    .map(|level| format!("{}_{}", m.column, level))
                    .collect()
            })
            .unwrap_or_default()
    }
}
