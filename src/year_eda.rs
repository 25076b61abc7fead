//! Sums, ratios and changes over a populated record store.
//!
//! Functions that can be undefined for a country (missing values, division by zero)
//! return `f64::NAN` instead of failing; callers filter it with `f64::is_nan`.

use std::collections::BTreeMap;

use itertools::Itertools;

use crate::models::{Attribute, Metric, Quartile, Sector, Year};
use crate::store::RecordStore;

fn finite_or_nan(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        f64::NAN
    }
}

/// Sum of `attribute` over the countries that have it. Missing values are skipped.
pub fn sum_of(store: &RecordStore, attribute: Attribute) -> f64 {
    store
        .records()
        .filter_map(|record| record.numeric(attribute))
        .sum()
}

/// Share of `country` in the sum of `attribute`, in percent.
pub fn percent_of_whole(store: &RecordStore, attribute: Attribute, country: &str) -> f64 {
    let Some(portion) = store.get(country).and_then(|r| r.numeric(attribute)) else {
        return f64::NAN;
    };
    let total = sum_of(store, attribute);
    if total == 0.0 {
        return f64::NAN;
    }
    finite_or_nan(portion / total * 100.0)
}

/// `percent_of_whole` for every country that has the attribute.
pub fn percent_of_whole_all(store: &RecordStore, attribute: Attribute) -> BTreeMap<String, f64> {
    let total = sum_of(store, attribute);
    if total == 0.0 {
        return BTreeMap::new();
    }
    store
        .records()
        .filter_map(|record| {
            let portion = record.numeric(attribute)?;
            let share = finite_or_nan(portion / total * 100.0);
            (!share.is_nan()).then(|| (record.name().to_string(), share))
        })
        .collect()
}

/// Change in each country's percentage of the whole between `start` and `end`, in
/// percentage points. Countries without a share in both years are left out.
pub fn share_difference(store: &RecordStore, metric: Metric, start: Year, end: Year) -> BTreeMap<String, f64> {
    let before = percent_of_whole_all(store, Attribute::Yearly(metric, start));
    percent_of_whole_all(store, Attribute::Yearly(metric, end))
        .into_iter()
        .filter_map(|(name, after)| before.get(&name).map(|share| (name, after - share)))
        .collect()
}

/// Change from `old` to `new` for one country, in percent of `old`.
pub fn percent_change(store: &RecordStore, country: &str, new: Attribute, old: Attribute) -> f64 {
    let Some(record) = store.get(country) else {
        return f64::NAN;
    };
    match (record.numeric(new), record.numeric(old)) {
        (Some(new), Some(old)) if old != 0.0 => finite_or_nan((new - old) / old * 100.0),
        _ => f64::NAN,
    }
}

/// Year-on-year `percent_change` of `metric` for each year after `start` up to `end`,
/// labelled with the later year. Empty when `start >= end`.
pub fn percent_change_over_time<'a>(
    store: &'a RecordStore,
    metric: Metric,
    start: Year,
    end: Year,
    country: &'a str,
) -> impl Iterator<Item = (Year, f64)> + 'a {
    (start..=end).tuple_windows().map(move |(old, new)| {
        let change = percent_change(
            store,
            country,
            Attribute::Yearly(metric, new),
            Attribute::Yearly(metric, old),
        );
        (new, change)
    })
}

/// Sum of `attribute` over the countries whose GDP quartile for `year` is `quartile`.
pub fn quartile_sum(store: &RecordStore, attribute: Attribute, year: Year, quartile: Quartile) -> f64 {
    store
        .records()
        .filter(|record| record.gdp_quartile(year) == Some(quartile))
        .filter_map(|record| record.numeric(attribute))
        .sum()
}

/// `(gdp, value)` pairs of `metric` for `year`, grouped by GDP quartile. Countries
/// missing either value are left out.
pub fn attribute_by_quartile(store: &RecordStore, metric: Metric, year: Year) -> [Vec<(f64, f64)>; 4] {
    let mut groups: [Vec<(f64, f64)>; 4] = Default::default();
    for record in store.records() {
        if let (Some(quartile), Some(gdp), Some(value)) = (
            record.gdp_quartile(year),
            record.gdp(year),
            record.value(metric, year),
        ) {
            groups[quartile.index()].push((gdp, value));
        }
    }
    groups
}

/// Each sector's percentage of the combined sector GDP of one quartile.
#[derive(Debug, Clone, PartialEq)]
pub struct SectorShares {
    pub quartile: Quartile,
    pub total: f64,
    pub shares: BTreeMap<Sector, f64>,
}

pub fn sector_shares_by_quartile(store: &RecordStore, year: Year) -> Vec<SectorShares> {
    Quartile::ALL
        .iter()
        .map(|&quartile| {
            let sums: Vec<(Sector, f64)> = Sector::ALL
                .iter()
                .map(|&sector| {
                    let attribute = Attribute::Yearly(Metric::SectorGdp(sector), year);
                    (sector, quartile_sum(store, attribute, year, quartile))
                })
                .collect();
            let total: f64 = sums.iter().map(|(_, sum)| sum).sum();
            let shares = sums
                .into_iter()
                .map(|(sector, sum)| {
                    let share = if total == 0.0 { f64::NAN } else { sum / total * 100.0 };
                    (sector, share)
                })
                .collect();
            SectorShares { quartile, total, shares }
        })
        .collect()
}

/// Splits a `(year, value)` series into parallel vectors.
pub fn xy_series<I>(series: I) -> (Vec<Year>, Vec<f64>)
where
    I: IntoIterator<Item = (Year, f64)>,
{
    series.into_iter().unzip()
}
