//! Merges per-country GDP, sector, unemployment, income and COVID-19 datasets into one
//! record per country, ranks countries into GDP quartiles per year, and derives sums,
//! shares and changes for charting.

pub mod clean;
pub mod config;
pub mod eda;
pub mod eda_statistics;
pub mod error;
pub mod load_clean;
pub mod models;
pub mod pipeline;
pub mod store;
pub mod year_eda;

pub use config::Config;
pub use error::{Result, WealthGapError};
pub use models::{Attribute, CountryRecord, Metric, Quartile, Sector, Year};
pub use pipeline::{Dataset, Pipeline};
pub use store::{JoinKeyMap, RecordStore};
