//! The housing data preparation pipeline
//!
//! ```text
//! raw table
//!   -> FieldNormalizer       coordinates, county
//!   -> MissingValueResolver  cross-field imputation, null drop
//!   -> FeatureDeriver        tax_rate, bath_per_sqft
//!   -> OutlierFilter         IQR rules
//!   -> drop unused columns                         = prepare()
//!   -> CategoricalEncoder
//!   -> StratifiedSplitter                          = split_and_encode()
//!   -> FeatureScaler                               = scale()
//! ```

use super::{
    config::PipelineConfig,
    encoder::{object_columns, CategoricalEncoder},
    features::FeatureDeriver,
    imputer::{drop_rows_with_nulls, MissingValueResolver},
    normalizer::FieldNormalizer,
    outlier::OutlierFilter,
    scaler::{scale, ScaledPartitions},
};
use crate::error::{PrepError, Result};
use crate::schema::PARCEL_ID;
use crate::split::{Partitions, StratifiedSplitter};
use crate::utils::{float_values, numeric_columns, require_column};
use polars::prelude::*;
use std::collections::HashSet;
use std::time::Instant;
use tracing::{debug, info};

/// One configurable run of the cleaning, splitting and scaling stages
#[derive(Debug, Clone, Default)]
pub struct HousingPipeline {
    config: PipelineConfig,
}

impl HousingPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Clean, derive features, remove outliers and drop unused columns.
    ///
    /// The result has one row per parcel id and no missing values.
    pub fn prepare(&self, df: &DataFrame) -> Result<DataFrame> {
        let start = Instant::now();
        self.config.validate()?;
        let input_rows = df.height();

        let mut table = dedupe_parcels(df)?;

        FieldNormalizer::new(
            self.config.latitude_shift,
            self.config.longitude_shift,
            self.config.unmapped_county,
        )
        .normalize(&mut table)?;

        let mut table = MissingValueResolver::new().resolve(&mut table)?;

        FeatureDeriver::new(self.config.compute_tax_rate, self.config.compute_bath_per_sqft)
            .derive(&mut table)?;
        if self.config.drop_undefined_features {
            table = drop_rows_with_nulls(&table)?;
        }

        let mut table = OutlierFilter::new(self.config.outlier_rules.clone()).apply(&table)?;

        for column in &self.config.drop_columns {
            require_column(&table, column)?;
            table = table.drop(column)?;
        }

        info!(
            input_rows,
            output_rows = table.height(),
            columns = table.width(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Prepared property table"
        );
        Ok(table)
    }

    /// Dummy-encode the categorical columns, then split stratified on `target`
    pub fn split_and_encode(&self, df: &DataFrame, target: &str) -> Result<Partitions> {
        let columns = match &self.config.encode_columns {
            Some(columns) => columns.clone(),
            None => object_columns(df),
        };
        let column_refs: Vec<&str> = columns.iter().map(String::as_str).collect();

        let encoded = CategoricalEncoder::new()
            .with_drop_originals(self.config.drop_encoded_columns)
            .fit_transform(df, &column_refs)?;
        debug!(encoded = columns.len(), columns = encoded.width(), "Encoded categorical columns");

        StratifiedSplitter::new(self.config.split.clone()).split(&encoded, target)
    }

    /// Fit the min-max scaler on train and apply it to all partitions
    pub fn scale(&self, partitions: &Partitions, target: &str) -> Result<ScaledPartitions> {
        let columns = self.scale_columns(&partitions.train, target);
        let column_refs: Vec<&str> = columns.iter().map(String::as_str).collect();
        scale(partitions, &column_refs)
    }

    /// Run every stage on a raw table
    pub fn run(&self, df: &DataFrame, target: &str) -> Result<ScaledPartitions> {
        let prepared = self.prepare(df)?;
        let partitions = self.split_and_encode(&prepared, target)?;
        self.scale(&partitions, target)
    }

    fn scale_columns(&self, train: &DataFrame, target: &str) -> Vec<String> {
        match &self.config.scale_columns {
            Some(columns) => columns.clone(),
            None => numeric_columns(train)
                .into_iter()
                .filter(|c| c != PARCEL_ID && c != target)
                .collect(),
        }
    }
}

/// Keep the first row of each parcel id
fn dedupe_parcels(df: &DataFrame) -> Result<DataFrame> {
    let ids = float_values(df, PARCEL_ID)?;
    let mut seen = HashSet::with_capacity(ids.len());

    let mask: BooleanChunked = ids
        .iter()
        .map(|id| match id {
            Some(id) => Ok(seen.insert(id.to_bits())),
            None => Err(PrepError::MissingValues(PARCEL_ID.to_string())),
        })
        .collect::<Result<Vec<bool>>>()?
        .into_iter()
        .collect();

    let result = df.filter(&mask)?;
    let duplicates = df.height() - result.height();
    if duplicates > 0 {
        info!(duplicates, "Removed repeated parcel ids");
    }
    Ok(result)
}
