//! Geocoordinate and county normalization
//!
//! Coordinates arrive as decimal degrees with the decimal point stripped
//! (`34123456` for `34.123456`). The integer part of a latitude has two
//! characters and that of a (negative) longitude has four including the
//! sign, so the point is restored by dividing by `10^(len - K)`.

use crate::error::{PrepError, Result};
use crate::schema::{COUNTY, FIPS, LATITUDE, LONGITUDE};
use crate::utils::{float_values, replace_f64_column};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Label written for unmapped codes under [`UnmappedCountyPolicy::Unknown`]
pub const UNKNOWN_COUNTY: &str = "Unknown";

/// Map a geographic code to its county name
pub fn county_name(code: i64) -> Option<&'static str> {
    match code {
        6037 => Some("Los Angeles"),
        6059 => Some("Orange"),
        6111 => Some("Ventura"),
        _ => None,
    }
}

/// What to do with a geographic code that has no county
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UnmappedCountyPolicy {
    /// Leave the county unset; the row is removed by the null-drop step
    #[default]
    Null,
    /// Label the county "Unknown"
    Unknown,
    /// Fail with [`PrepError::UnmappedCode`]
    Fail,
}

/// Fixes coordinate encodings and derives the county column
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldNormalizer {
    latitude_shift: u32,
    longitude_shift: u32,
    unmapped_county: UnmappedCountyPolicy,
}

impl Default for FieldNormalizer {
    fn default() -> Self {
        Self::new(2, 4, UnmappedCountyPolicy::Null)
    }
}

impl FieldNormalizer {
    pub fn new(latitude_shift: u32, longitude_shift: u32, unmapped_county: UnmappedCountyPolicy) -> Self {
        Self {
            latitude_shift,
            longitude_shift,
            unmapped_county,
        }
    }

    /// Run every normalization in order
    pub fn normalize(&self, df: &mut DataFrame) -> Result<()> {
        self.fix_latitude(df)?;
        self.fix_longitude(df)?;
        self.derive_county(df)
    }

    pub fn fix_latitude(&self, df: &mut DataFrame) -> Result<()> {
        fix_coordinate(df, LATITUDE, self.latitude_shift)
    }

    pub fn fix_longitude(&self, df: &mut DataFrame) -> Result<()> {
        fix_coordinate(df, LONGITUDE, self.longitude_shift)
    }

    /// Append the county name derived from the geographic code
    pub fn derive_county(&self, df: &mut DataFrame) -> Result<()> {
        let codes = float_values(df, FIPS)?;
        let mut unmapped = 0usize;
        let mut counties: Vec<Option<&str>> = Vec::with_capacity(codes.len());

        for code in codes {
            let Some(code) = code.filter(|c| c.is_finite()) else {
                counties.push(None);
                continue;
            };
            let code = code.trunc() as i64;
            match county_name(code) {
                Some(name) => counties.push(Some(name)),
                None => {
                    unmapped += 1;
                    match self.unmapped_county {
                        UnmappedCountyPolicy::Null => counties.push(None),
                        UnmappedCountyPolicy::Unknown => counties.push(Some(UNKNOWN_COUNTY)),
                        UnmappedCountyPolicy::Fail => {
                            return Err(PrepError::UnmappedCode {
                                column: FIPS.to_string(),
                                code,
                            })
                        }
                    }
                }
            }
        }

        if unmapped > 0 {
            warn!(unmapped, policy = ?self.unmapped_county, "Geographic codes without a county");
        }

        df.with_column(Series::new(COUNTY.into(), counties))?;
        Ok(())
    }
}

/// Number of characters in the decimal rendering of `value`, sign included
fn rendered_len(value: i64) -> i32 {
    let digits = value.unsigned_abs().checked_ilog10().map_or(1, |d| d + 1) as i32;
    if value < 0 {
        digits + 1
    } else {
        digits
    }
}

/// Restore the decimal point of one encoded coordinate
pub fn decode_coordinate(raw: f64, shift: u32) -> f64 {
    let whole = raw.trunc() as i64;
    let exponent = rendered_len(whole) - shift as i32;
    whole as f64 / 10f64.powi(exponent)
}

/// Replace an encoded coordinate column with decimal degrees
pub fn fix_coordinate(df: &mut DataFrame, column: &str, shift: u32) -> Result<()> {
    let raw = float_values(df, column)?;

    let fixed = raw
        .into_iter()
        .map(|value| match value {
            None => Ok(None),
            Some(v) if !v.is_finite() => Err(PrepError::TypeConversion {
                column: column.to_string(),
                reason: format!("{} is not an integer coordinate", v),
            }),
            Some(v) => Ok(Some(decode_coordinate(v, shift))),
        })
        .collect::<Result<Vec<_>>>()?;

    debug!(column, shift, "Fixed coordinate encoding");
    replace_f64_column(df, column, fixed)
}
