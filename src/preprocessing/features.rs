//! Derived numeric features

use crate::error::Result;
use crate::schema::{BATHROOMS, BATH_PER_SQFT, FINISHED_AREA, TAX_AMOUNT, TAX_RATE, TOTAL_VALUE};
use crate::utils::{float_values, replace_f64_column};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Appends ratio features to the table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureDeriver {
    tax_rate: bool,
    bath_per_sqft: bool,
}

impl Default for FeatureDeriver {
    fn default() -> Self {
        Self::new(true, true)
    }
}

impl FeatureDeriver {
    pub fn new(tax_rate: bool, bath_per_sqft: bool) -> Self {
        Self {
            tax_rate,
            bath_per_sqft,
        }
    }

    /// Append every enabled feature
    pub fn derive(&self, df: &mut DataFrame) -> Result<()> {
        if self.tax_rate {
            tax_rate(df)?;
        }
        if self.bath_per_sqft {
            bath_per_sqft(df)?;
        }
        Ok(())
    }
}

/// `tax_rate = taxamount / taxvaluedollarcnt`
pub fn tax_rate(df: &mut DataFrame) -> Result<()> {
    append_ratio(df, TAX_RATE, TAX_AMOUNT, TOTAL_VALUE)
}

/// `bath_per_sqft = bathroomcnt / calculatedfinishedsquarefeet`
pub fn bath_per_sqft(df: &mut DataFrame) -> Result<()> {
    append_ratio(df, BATH_PER_SQFT, BATHROOMS, FINISHED_AREA)
}

/// A zero denominator yields NaN for that row; a null operand yields null.
fn append_ratio(df: &mut DataFrame, name: &str, numerator: &str, denominator: &str) -> Result<()> {
    let num = float_values(df, numerator)?;
    let den = float_values(df, denominator)?;

    let mut undefined = 0usize;
    let ratio: Vec<Option<f64>> = num
        .into_iter()
        .zip(den)
        .map(|pair| match pair {
            (Some(_), Some(d)) if d == 0.0 => {
                undefined += 1;
                Some(f64::NAN)
            }
            (Some(n), Some(d)) => Some(n / d),
            _ => None,
        })
        .collect();

    debug!(feature = name, undefined, "Derived ratio feature");
    replace_f64_column(df, name, ratio)
}
