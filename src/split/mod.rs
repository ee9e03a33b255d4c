//! Train / validate / test partitioning stratified on a binned target
//!
//! The target column is cut into equal-width bins. A first stratified split
//! holds out the test partition; a second one, on the remainder and the same
//! bin labels, holds out the validation partition. With the defaults this
//! yields 56% / 24% / 20% of the rows.

mod stratified;

pub use stratified::{bin_labels, min_stratum_size, stratified_partition};

use crate::error::{PrepError, Result};
use crate::utils::{float_values, membership_mask};
use polars::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Stratified split parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    /// Number of equal-width target bins
    pub bins: usize,
    pub seed: u64,
    /// Share of all rows held out for test
    pub test_size: f64,
    /// Share of the non-test rows held out for validation
    pub validate_size: f64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            bins: 5,
            seed: 123,
            test_size: 0.2,
            validate_size: 0.3,
        }
    }
}

impl SplitConfig {
    pub fn with_bins(mut self, bins: usize) -> Self {
        self.bins = bins;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.bins == 0 {
            return Err(PrepError::ConfigError("split.bins must be at least 1".to_string()));
        }
        for (name, fraction) in [("test_size", self.test_size), ("validate_size", self.validate_size)] {
            if !(fraction > 0.0 && fraction < 1.0) {
                return Err(PrepError::ConfigError(format!(
                    "split.{} must lie strictly between 0 and 1, got {}",
                    name, fraction
                )));
            }
        }
        Ok(())
    }
}

/// Disjoint row subsets of one table
#[derive(Debug, Clone)]
pub struct Partitions {
    pub train: DataFrame,
    pub validate: DataFrame,
    pub test: DataFrame,
}

impl Partitions {
    pub fn total_rows(&self) -> usize {
        self.train.height() + self.validate.height() + self.test.height()
    }
}

/// Splits a table into train / validate / test partitions
#[derive(Debug, Clone, Default)]
pub struct StratifiedSplitter {
    config: SplitConfig,
}

impl StratifiedSplitter {
    pub fn new(config: SplitConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SplitConfig {
        &self.config
    }

    /// Partition `df`, stratifying on the binned `target` column.
    ///
    /// Identical input, target and configuration yield identical partitions.
    pub fn split(&self, df: &DataFrame, target: &str) -> Result<Partitions> {
        self.config.validate()?;
        if df.height() == 0 {
            return Err(PrepError::DataError("cannot split an empty table".to_string()));
        }

        let values = float_values(df, target)?
            .into_iter()
            .map(|v| v.filter(|x| x.is_finite()))
            .collect::<Option<Vec<f64>>>()
            .ok_or_else(|| PrepError::MissingValues(target.to_string()))?;

        let labels = bin_labels(&values, self.config.bins);
        let rows: Vec<usize> = (0..df.height()).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);

        let (rest, test) = stratified_partition(&rows, &labels, self.config.test_size, &mut rng)?;
        let (train, validate) = stratified_partition(&rest, &labels, self.config.validate_size, &mut rng)?;

        let partitions = Partitions {
            train: df.filter(&membership_mask(df.height(), &train))?,
            validate: df.filter(&membership_mask(df.height(), &validate))?,
            test: df.filter(&membership_mask(df.height(), &test))?,
        };

        info!(
            target_column = target,
            bins = self.config.bins,
            seed = self.config.seed,
            train = partitions.train.height(),
            validate = partitions.validate.height(),
            test = partitions.test.height(),
            "Stratified split"
        );
        Ok(partitions)
    }
}

/// Split with the default 80/20 then 70/30 ratios
pub fn split_stratified(df: &DataFrame, target: &str, bins: usize, seed: u64) -> Result<Partitions> {
    StratifiedSplitter::new(SplitConfig::default().with_bins(bins).with_seed(seed)).split(df, target)
}
