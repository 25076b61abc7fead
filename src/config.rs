use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, WealthGapError};
use crate::models::Year;

/// File name and number of leading lines to skip for one dataset.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DatasetConfig {
    pub file_name: String,
    pub header_lines: usize,
}

impl DatasetConfig {
    fn new(file_name: &str, header_lines: usize) -> Self {
        Self {
            file_name: file_name.into(),
            header_lines,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(from = "ConfigFile")]
pub struct Config {
    pub data_directory: PathBuf,
    pub first_year: Year,
    pub last_year: Year,
    pub national_gdp: DatasetConfig,
    pub income_group: DatasetConfig,
    pub sector_gdp: DatasetConfig,
    pub unemployment: DatasetConfig,
    pub covid: DatasetConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_directory: "raw_data".into(),
            first_year: 2016,
            last_year: 2020,
            // World Bank export: source, blank, update date, blank, column names
            national_gdp: DatasetConfig::new("national_gdp.csv", 5),
            income_group: DatasetConfig::new("country_income_quartile.csv", 1),
            sector_gdp: DatasetConfig::new("sector_gdp.csv", 1),
            unemployment: DatasetConfig::new("unemployment_rate.csv", 4),
            covid: DatasetConfig::new("covid.csv", 1),
        }
    }
}

/// Dataset table as written in TOML; absent keys keep the default for that dataset.
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct DatasetOverride {
    file_name: Option<String>,
    header_lines: Option<usize>,
}

impl DatasetOverride {
    fn over(self, base: DatasetConfig) -> DatasetConfig {
        DatasetConfig {
            file_name: self.file_name.unwrap_or(base.file_name),
            header_lines: self.header_lines.unwrap_or(base.header_lines),
        }
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct ConfigFile {
    data_directory: Option<PathBuf>,
    first_year: Option<Year>,
    last_year: Option<Year>,
    national_gdp: DatasetOverride,
    income_group: DatasetOverride,
    sector_gdp: DatasetOverride,
    unemployment: DatasetOverride,
    covid: DatasetOverride,
}

impl From<ConfigFile> for Config {
    fn from(file: ConfigFile) -> Self {
        let base = Config::default();
        Config {
            data_directory: file.data_directory.unwrap_or(base.data_directory),
            first_year: file.first_year.unwrap_or(base.first_year),
            last_year: file.last_year.unwrap_or(base.last_year),
            national_gdp: file.national_gdp.over(base.national_gdp),
            income_group: file.income_group.over(base.income_group),
            sector_gdp: file.sector_gdp.over(base.sector_gdp),
            unemployment: file.unemployment.over(base.unemployment),
            covid: file.covid.over(base.covid),
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|source| WealthGapError::ConfigUnavailable {
                path: path.to_path_buf(),
                source,
            })?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.first_year > self.last_year {
            return Err(WealthGapError::InvalidYearRange {
                first: self.first_year,
                last: self.last_year,
            });
        }
        Ok(())
    }

    pub fn years(&self) -> RangeInclusive<Year> {
        self.first_year..=self.last_year
    }

    pub fn path_of(&self, dataset: &DatasetConfig) -> PathBuf {
        self.data_directory.join(&dataset.file_name)
    }
}
