//! Pipeline configuration

use crate::error::{PrepError, Result};
use crate::schema::{
    CALCULATED_BATHROOMS, FINISHED_AREA, FIPS, LAND_USE_DESC, LAND_USE_TYPE_ID, TOTAL_VALUE,
    UNIT_COUNT,
};
use crate::split::SplitConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{OutlierRule, UnmappedCountyPolicy};

/// Every choice the cleaning, splitting and scaling stages make
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Length of a latitude's integer part, in characters
    pub latitude_shift: u32,

    /// Length of a longitude's integer part, in characters, sign included
    pub longitude_shift: u32,

    pub unmapped_county: UnmappedCountyPolicy,

    pub compute_tax_rate: bool,

    pub compute_bath_per_sqft: bool,

    /// Drop rows whose derived features are undefined (zero denominator)
    pub drop_undefined_features: bool,

    /// IQR rules, applied in order after feature derivation
    pub outlier_rules: Vec<OutlierRule>,

    /// Columns removed at the end of cleaning
    pub drop_columns: Vec<String>,

    /// Columns to dummy-encode; `None` encodes every text column
    pub encode_columns: Option<Vec<String>>,

    /// Drop encoded source columns so the table is fully numeric
    pub drop_encoded_columns: bool,

    pub split: SplitConfig,

    /// Columns to min-max scale; `None` scales every numeric column
    /// except the parcel key and the target
    pub scale_columns: Option<Vec<String>>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            latitude_shift: 2,
            longitude_shift: 4,
            unmapped_county: UnmappedCountyPolicy::Null,
            compute_tax_rate: true,
            compute_bath_per_sqft: true,
            drop_undefined_features: true,
            outlier_rules: vec![
                OutlierRule::upper(TOTAL_VALUE, 3.0),
                OutlierRule::both(FINISHED_AREA, 3.0, 3.0),
            ],
            drop_columns: [
                CALCULATED_BATHROOMS,
                FIPS,
                UNIT_COUNT,
                LAND_USE_TYPE_ID,
                LAND_USE_DESC,
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            encode_columns: None,
            drop_encoded_columns: true,
            split: SplitConfig::default(),
            scale_columns: None,
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a `.toml` or `.json` file; missing keys take their defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;

        let config: Self = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => toml::from_str(&content)?,
            Some("json") => serde_json::from_str(&content)?,
            other => {
                return Err(PrepError::ConfigError(format!(
                    "unsupported config format: {}",
                    other.unwrap_or("<none>")
                )))
            }
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.split.validate()?;
        for rule in &self.outlier_rules {
            rule.validate()
                .map_err(|e| PrepError::ConfigError(e.to_string()))?;
        }
        Ok(())
    }

    pub fn with_outlier_rules(mut self, rules: Vec<OutlierRule>) -> Self {
        self.outlier_rules = rules;
        self
    }

    pub fn with_drop_columns(mut self, columns: &[&str]) -> Self {
        self.drop_columns = columns.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_unmapped_county(mut self, policy: UnmappedCountyPolicy) -> Self {
        self.unmapped_county = policy;
        self
    }

    pub fn with_split(mut self, split: SplitConfig) -> Self {
        self.split = split;
        self
    }

    pub fn with_scale_columns(mut self, columns: &[&str]) -> Self {
        self.scale_columns = Some(columns.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn without_derived_features(mut self) -> Self {
        self.compute_tax_rate = false;
        self.compute_bath_per_sqft = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.latitude_shift, 2);
        assert_eq!(config.longitude_shift, 4);
        assert_eq!(config.outlier_rules.len(), 2);
        assert_eq!(config.split.bins, 5);
        assert_eq!(config.split.seed, 123);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = PipelineConfig::new()
            .with_outlier_rules(vec![OutlierRule::upper(TOTAL_VALUE, 3.5)])
            .with_unmapped_county(UnmappedCountyPolicy::Unknown)
            .with_scale_columns(&["bedroomcnt"]);

        assert_eq!(config.outlier_rules[0].k_upper, 3.5);
        assert_eq!(config.unmapped_county, UnmappedCountyPolicy::Unknown);
        assert_eq!(config.scale_columns, Some(vec!["bedroomcnt".to_string()]));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
unmapped_county = "unknown"

[split]
seed = 42

[[outlier_rules]]
column = "taxvaluedollarcnt"
k_upper = 3.5
"#
        )
        .unwrap();

        let config = PipelineConfig::from_file(file.path()).unwrap();
        assert_eq!(config.split.seed, 42);
        assert_eq!(config.split.bins, 5);
        assert_eq!(config.unmapped_county, UnmappedCountyPolicy::Unknown);
        assert_eq!(config.outlier_rules, vec![OutlierRule::upper(TOTAL_VALUE, 3.5)]);
        assert!(config.compute_tax_rate);
    }

    #[test]
    fn test_json_round_trip() {
        let config = PipelineConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: PipelineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_invalid_split_rejected() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"split": {{"bins": 0}}}}"#).unwrap();

        let err = PipelineConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, PrepError::ConfigError(_)));
    }
}
