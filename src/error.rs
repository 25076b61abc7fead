//! Error types.

use std::path::PathBuf;

use crate::models::Year;

#[derive(thiserror::Error, Debug)]
pub enum WealthGapError {
    #[error("Dataset unavailable: {}: {source}", path.display())]
    DatasetUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Row {row} of {} has no join column {column}", path.display())]
    MissingJoinColumn {
        path: PathBuf,
        row: usize,
        column: usize,
    },
    #[error("Config unavailable: {}: {source}", path.display())]
    ConfigUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid TOML in config: {0}")]
    Config(#[from] toml::de::Error),
    #[error("Invalid year range: {first}..={last}")]
    InvalidYearRange { first: Year, last: Year },
    #[error("Unknown metric: {0}")]
    UnknownMetric(String),
}

pub type Result<T> = std::result::Result<T, WealthGapError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_names_path() {
        let err = WealthGapError::DatasetUnavailable {
            path: PathBuf::from("raw_data/national_gdp.csv"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        let msg = err.to_string();
        assert!(msg.contains("raw_data/national_gdp.csv"));
        assert!(msg.starts_with("Dataset unavailable"));
    }

    #[test]
    fn test_toml_error_converts() {
        let toml_err = toml::from_str::<toml::Value>("first_year = ").unwrap_err();
        let err: WealthGapError = toml_err.into();
        assert!(matches!(err, WealthGapError::Config(_)));
    }
}
