//! Missing value resolution
//!
//! Two cross-field imputations recover values that can be rebuilt from
//! other columns. Whatever is still incomplete afterwards is dropped.

use crate::error::Result;
use crate::schema::{BATHROOMS, CALCULATED_BATHROOMS, LAND_VALUE, STRUCTURE_VALUE, TOTAL_VALUE};
use crate::utils::{complete_rows_mask, float_values, replace_f64_column};
use polars::prelude::*;
use tracing::{debug, info};

/// Imputes recoverable fields, then drops unrecoverable rows
#[derive(Debug, Clone, Copy, Default)]
pub struct MissingValueResolver;

impl MissingValueResolver {
    pub fn new() -> Self {
        Self
    }

    /// Apply every imputation, then drop rows that are still incomplete
    pub fn resolve(&self, df: &mut DataFrame) -> Result<DataFrame> {
        impute_bathrooms(df)?;
        impute_structure_value(df)?;
        drop_rows_with_nulls(df)
    }
}

/// Fill a missing corrected bathroom count with the raw bathroom count
pub fn impute_bathrooms(df: &mut DataFrame) -> Result<()> {
    let raw = float_values(df, BATHROOMS)?;
    let corrected = float_values(df, CALCULATED_BATHROOMS)?;

    let mut filled = 0usize;
    let values: Vec<Option<f64>> = corrected
        .into_iter()
        .zip(raw)
        .map(|(corrected, raw)| match corrected {
            Some(v) => Some(v),
            None => {
                if raw.is_some() {
                    filled += 1;
                }
                raw
            }
        })
        .collect();

    debug!(filled, column = CALCULATED_BATHROOMS, "Imputed from raw bathroom count");
    replace_f64_column(df, CALCULATED_BATHROOMS, values)
}

/// Fill a missing structure value with total value minus land value
pub fn impute_structure_value(df: &mut DataFrame) -> Result<()> {
    let structure = float_values(df, STRUCTURE_VALUE)?;
    let total = float_values(df, TOTAL_VALUE)?;
    let land = float_values(df, LAND_VALUE)?;

    let mut filled = 0usize;
    let values: Vec<Option<f64>> = structure
        .into_iter()
        .zip(total.into_iter().zip(land))
        .map(|(structure, (total, land))| match (structure, total, land) {
            (Some(v), _, _) => Some(v),
            (None, Some(t), Some(l)) => {
                filled += 1;
                Some(t - l)
            }
            _ => None,
        })
        .collect();

    debug!(filled, column = STRUCTURE_VALUE, "Imputed from total minus land value");
    replace_f64_column(df, STRUCTURE_VALUE, values)
}

/// Drop every row that holds a null (or a float NaN) in any column
pub fn drop_rows_with_nulls(df: &DataFrame) -> Result<DataFrame> {
    let mask = complete_rows_mask(df);
    let result = df.filter(&mask)?;

    let dropped = df.height() - result.height();
    if dropped > 0 {
        info!(dropped, remaining = result.height(), "Dropped incomplete rows");
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PrepError;

    fn values_df() -> DataFrame {
        df!(
            STRUCTURE_VALUE => &[Some(100.0), None, None],
            TOTAL_VALUE => &[Some(300.0), Some(500.0), None],
            LAND_VALUE => &[Some(200.0), Some(150.0), Some(10.0)],
        )
        .unwrap()
    }

    #[test]
    fn test_impute_bathrooms() {
        let mut df = df!(
            BATHROOMS => &[Some(2.0), Some(3.0), None],
            CALCULATED_BATHROOMS => &[Some(2.5), None, None],
        )
        .unwrap();

        impute_bathrooms(&mut df).unwrap();
        let col: Vec<Option<f64>> = df.column(CALCULATED_BATHROOMS).unwrap().f64().unwrap().into_iter().collect();
        assert_eq!(col, vec![Some(2.5), Some(3.0), None]);
    }

    #[test]
    fn test_impute_structure_value() {
        let mut df = values_df();
        impute_structure_value(&mut df).unwrap();

        let col: Vec<Option<f64>> = df.column(STRUCTURE_VALUE).unwrap().f64().unwrap().into_iter().collect();
        assert_eq!(col, vec![Some(100.0), Some(350.0), None]);
    }

    #[test]
    fn test_resolve_drops_unrecoverable_rows() {
        let mut df = df!(
            BATHROOMS => &[Some(2.0), Some(1.0), Some(1.0)],
            CALCULATED_BATHROOMS => &[None, Some(1.0), Some(1.0)],
            STRUCTURE_VALUE => &[Some(100.0), None, None],
            TOTAL_VALUE => &[Some(300.0), Some(500.0), None],
            LAND_VALUE => &[Some(200.0), Some(150.0), Some(10.0)],
        )
        .unwrap();

        let result = MissingValueResolver::new().resolve(&mut df).unwrap();
        assert_eq!(result.height(), 2);
        let nulls: usize = result.get_columns().iter().map(|c| c.null_count()).sum();
        assert_eq!(nulls, 0);
    }

    #[test]
    fn test_drop_rows_with_nulls_is_identity_on_complete_table() {
        let df = df!(
            "a" => &[1.0, 2.0, 3.0],
            "b" => &["x", "y", "z"],
        )
        .unwrap();

        let result = drop_rows_with_nulls(&df).unwrap();
        assert!(result.equals(&df));

        let again = drop_rows_with_nulls(&result).unwrap();
        assert!(again.equals(&result));
    }

    #[test]
    fn test_resolve_requires_columns() {
        let mut df = df!(BATHROOMS => &[1.0]).unwrap();
        let err = MissingValueResolver::new().resolve(&mut df).unwrap_err();
        assert!(matches!(err, PrepError::SchemaMismatch(col) if col == CALCULATED_BATHROOMS));
    }
}
