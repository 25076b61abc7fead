use statrs::statistics::{Data, Distribution, Max, Median, Min};

use crate::models::{Metric, Year};
use crate::store::RecordStore;

/// Descriptive statistics of one metric for one year across all countries.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub metric: Metric,
    pub year: Year,
    pub count: usize,
    pub missing: usize,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub std_dev: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

pub fn summarize(store: &RecordStore, metric: Metric, year: Year) -> Summary {
    let values: Vec<f64> = store
        .records()
        .filter_map(|record| record.value(metric, year))
        .collect();
    let count = values.len();
    let missing = store.len() - count;

    if values.is_empty() {
        return Summary {
            metric,
            year,
            count,
            missing,
            mean: None,
            median: None,
            std_dev: None,
            min: None,
            max: None,
        };
    }

    let data = Data::new(values);
    // Sample standard deviation needs two points
    let std_dev = if count > 1 { data.std_dev() } else { None };
    Summary {
        metric,
        year,
        count,
        missing,
        mean: data.mean(),
        median: Some(data.median()),
        std_dev: std_dev.filter(|v| v.is_finite()),
        min: Some(data.min()),
        max: Some(data.max()),
    }
}
