//! Column names of the property record table
//!
//! The raw table carries one row per property, keyed by [`PARCEL_ID`].
//! Derived columns are appended by the pipeline stages.

use crate::error::{PrepError, Result};
use polars::prelude::*;

/// Unique parcel identifier, the primary key after cleaning
pub const PARCEL_ID: &str = "parcelid";
pub const BATHROOMS: &str = "bathroomcnt";
pub const BEDROOMS: &str = "bedroomcnt";
/// Corrected bathroom count
pub const CALCULATED_BATHROOMS: &str = "calculatedbathnbr";
pub const FINISHED_AREA: &str = "calculatedfinishedsquarefeet";
/// Geographic (county) code
pub const FIPS: &str = "fips";
pub const LATITUDE: &str = "latitude";
pub const LONGITUDE: &str = "longitude";
pub const STRUCTURE_VALUE: &str = "structuretaxvaluedollarcnt";
pub const TOTAL_VALUE: &str = "taxvaluedollarcnt";
pub const LAND_VALUE: &str = "landtaxvaluedollarcnt";
pub const TAX_AMOUNT: &str = "taxamount";
pub const UNIT_COUNT: &str = "unitcnt";
pub const LAND_USE_TYPE_ID: &str = "propertylandusetypeid";
pub const LAND_USE_DESC: &str = "propertylandusedesc";

pub const COUNTY: &str = "county";
pub const TAX_RATE: &str = "tax_rate";
pub const BATH_PER_SQFT: &str = "bath_per_sqft";

/// Every column a raw record table must carry
pub const INPUT_COLUMNS: [&str; 15] = [
    PARCEL_ID,
    BATHROOMS,
    BEDROOMS,
    CALCULATED_BATHROOMS,
    FINISHED_AREA,
    FIPS,
    LATITUDE,
    LONGITUDE,
    STRUCTURE_VALUE,
    TOTAL_VALUE,
    LAND_VALUE,
    TAX_AMOUNT,
    UNIT_COUNT,
    LAND_USE_TYPE_ID,
    LAND_USE_DESC,
];

/// Check that a raw table carries every input column
pub fn validate_schema(df: &DataFrame) -> Result<()> {
    let names = df.get_column_names();
    for expected in INPUT_COLUMNS {
        if !names.iter().any(|name| name.as_str() == expected) {
            return Err(PrepError::SchemaMismatch(expected.to_string()));
        }
    }
    Ok(())
}
