//! housing-prep - preparation pipeline for housing-price property records
//!
//! Takes a raw table of property records and produces scaled
//! train / validate / test partitions ready for model fitting.
//!
//! # Modules
//!
//! - [`source`] - Raw record acquisition (CSV file, local cache)
//! - [`preprocessing`] - Normalization, imputation, features, outliers, encoding, scaling
//! - [`split`] - Train / validate / test split stratified on a binned target
//! - [`schema`] - Column names of the record table
//! - [`cli`] - Command-line interface
//!
//! # Example
//!
//! ```no_run
//! use housing_prep::prelude::*;
//!
//! # fn main() -> housing_prep::Result<()> {
//! let raw = CsvSource::new("zillow.csv").fetch()?;
//! let scaled = HousingPipeline::new().run(&raw, "taxvaluedollarcnt")?;
//! println!("{} training rows", scaled.train.height());
//! # Ok(())
//! # }
//! ```

// Core error handling
pub mod error;

// Data
pub mod schema;
pub mod source;
pub mod utils;

// Pipeline stages
pub mod preprocessing;
pub mod split;

// Services
pub mod cli;

pub use error::{PrepError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{PrepError, Result};

    pub use crate::source::{CachedSource, CsvSource, RecordSource};

    pub use crate::preprocessing::{
        CategoricalEncoder, FeatureDeriver, FeatureScaler, FieldNormalizer, HousingPipeline,
        MissingValueResolver, OutlierFilter, OutlierRule, PipelineConfig, ScaledPartitions,
        ScalerState, UnmappedCountyPolicy,
    };

    pub use crate::split::{split_stratified, Partitions, SplitConfig, StratifiedSplitter};
}
