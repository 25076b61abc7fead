use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use log::info;
use ordered_float::NotNan;

use crate::models::{Metric, Quartile, Year};
use crate::store::RecordStore;

/// Median of an ascending slice: the central element for odd lengths,
/// the mean of the two central elements for even lengths.
pub fn median(sorted: &[f64]) -> Option<f64> {
    let n = sorted.len();
    match n {
        0 => None,
        _ if n % 2 == 1 => Some(sorted[n / 2]),
        _ => Some((sorted[n / 2 - 1] + sorted[n / 2]) / 2.0),
    }
}

/// Upper bounds (inclusive) of the first three quartiles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuartileBoundaries {
    pub lower: f64,
    pub median: f64,
    pub upper: f64,
}

impl QuartileBoundaries {
    /// Computes boundaries from ascending values. The lower half is everything before
    /// the midpoint; the upper half starts at the midpoint for even lengths and just
    /// after it for odd ones. An empty half falls back to the overall median.
    pub fn from_sorted(sorted: &[f64]) -> Option<Self> {
        let median_all = median(sorted)?;
        let n = sorted.len();
        let lower_half = &sorted[..n / 2];
        let upper_half = if n % 2 == 0 {
            &sorted[n / 2..]
        } else {
            &sorted[n / 2 + 1..]
        };
        Some(Self {
            lower: median(lower_half).unwrap_or(median_all),
            median: median_all,
            upper: median(upper_half).unwrap_or(median_all),
        })
    }

    /// Ties go to the lower quartile.
    pub fn classify(&self, value: f64) -> Quartile {
        if value <= self.lower {
            Quartile::Low
        } else if value <= self.median {
            Quartile::LowerMiddle
        } else if value <= self.upper {
            Quartile::UpperMiddle
        } else {
            Quartile::High
        }
    }
}

/// Labels every country that has `metric` for `year` with its quartile and clears the
/// label on every other country. Returns `None` when no country has a value.
pub fn assign_quartiles(
    store: &mut RecordStore,
    metric: Metric,
    year: Year,
) -> Option<QuartileBoundaries> {
    let mut values: Vec<NotNan<f64>> = store
        .records()
        .filter_map(|record| record.value(metric, year))
        .filter_map(|value| NotNan::new(value).ok())
        .collect();
    values.sort();
    let sorted: Vec<f64> = values.into_iter().map(NotNan::into_inner).collect();

    let boundaries = QuartileBoundaries::from_sorted(&sorted);
    for record in store.records_mut() {
        let quartile = boundaries
            .zip(record.value(metric, year))
            .map(|(b, value)| b.classify(value));
        record.set_quartile(metric, year, quartile);
    }

    if let Some(b) = &boundaries {
        info!(
            "{metric} quartiles for {year} over {} countries: {:.2} / {:.2} / {:.2}",
            sorted.len(),
            b.lower,
            b.median,
            b.upper
        );
    }
    boundaries
}

/// Runs `assign_quartiles` independently for every year in `years`.
pub fn assign_quartiles_over(
    store: &mut RecordStore,
    metric: Metric,
    years: RangeInclusive<Year>,
) -> BTreeMap<Year, QuartileBoundaries> {
    years
        .filter_map(|year| assign_quartiles(store, metric, year).map(|b| (year, b)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Attribute;

    fn store_with_gdp(year: Year, values: &[(&str, Option<f64>)]) -> RecordStore {
        let mut store = RecordStore::new();
        for (name, value) in values {
            store.insert(name);
            store
                .get_mut(name)
                .unwrap()
                .set_numeric(Attribute::Yearly(Metric::Gdp, year), *value);
        }
        store
    }

    fn quartile_of(store: &RecordStore, name: &str, year: Year) -> Option<u8> {
        store
            .get(name)
            .and_then(|r| r.gdp_quartile(year))
            .map(|q| q.number())
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&[]), None);
        assert_eq!(median(&[4.0]), Some(4.0));
        assert_eq!(median(&[1.0, 3.0]), Some(2.0));
        assert_eq!(median(&[1.0, 2.0, 9.0]), Some(2.0));
    }

    #[test]
    fn test_eight_values_split_in_pairs() {
        let names = ["A", "B", "C", "D", "E", "F", "G", "H"];
        let values: Vec<(&str, Option<f64>)> = names
            .iter()
            .zip([10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0])
            .map(|(n, v)| (*n, Some(v)))
            .collect();
        let mut store = store_with_gdp(2016, &values);

        let b = assign_quartiles(&mut store, Metric::Gdp, 2016).unwrap();
        assert_eq!(b, QuartileBoundaries { lower: 25.0, median: 45.0, upper: 65.0 });
        let labels: Vec<Option<u8>> = names.iter().map(|n| quartile_of(&store, n, 2016)).collect();
        assert_eq!(
            labels,
            [1, 1, 2, 2, 3, 3, 4, 4].map(Some).to_vec()
        );
    }

    #[test]
    fn test_odd_count_excludes_midpoint_from_upper_half() {
        let b = QuartileBoundaries::from_sorted(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_eq!(b, QuartileBoundaries { lower: 1.5, median: 3.0, upper: 4.5 });
    }

    #[test]
    fn test_ties_fall_into_lower_quartile() {
        let b = QuartileBoundaries::from_sorted(&[5.0, 5.0, 5.0, 5.0]).unwrap();
        assert_eq!(b.classify(5.0), Quartile::Low);
        let b = QuartileBoundaries::from_sorted(&[1.0, 2.0, 2.0, 3.0]).unwrap();
        assert_eq!(b.classify(2.0), Quartile::LowerMiddle);
    }

    #[test]
    fn test_single_value_is_first_quartile() {
        let mut store = store_with_gdp(2020, &[("Solo", Some(42.0))]);
        let b = assign_quartiles(&mut store, Metric::Gdp, 2020).unwrap();
        assert_eq!(b, QuartileBoundaries { lower: 42.0, median: 42.0, upper: 42.0 });
        assert_eq!(quartile_of(&store, "Solo", 2020), Some(1));
    }

    #[test]
    fn test_two_and_three_values() {
        let b = QuartileBoundaries::from_sorted(&[1.0, 3.0]).unwrap();
        assert_eq!((b.classify(1.0), b.classify(3.0)), (Quartile::Low, Quartile::UpperMiddle));
        let b = QuartileBoundaries::from_sorted(&[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(
            [1.0, 2.0, 3.0].map(|v| b.classify(v)),
            [Quartile::Low, Quartile::LowerMiddle, Quartile::UpperMiddle]
        );
    }

    #[test]
    fn test_empty_year_and_missing_values() {
        let mut store = store_with_gdp(2016, &[("A", None), ("B", Some(1.0))]);
        assert_eq!(assign_quartiles(&mut store, Metric::Gdp, 2017), None);
        assign_quartiles(&mut store, Metric::Gdp, 2016);
        assert_eq!(quartile_of(&store, "A", 2016), None);
        assert_eq!(quartile_of(&store, "B", 2016), Some(1));
    }

    #[test]
    fn test_years_are_independent() {
        let mut store = store_with_gdp(2016, &[("A", Some(1.0)), ("B", Some(2.0))]);
        for (name, value) in [("A", 20.0), ("B", 10.0)] {
            store
                .get_mut(name)
                .unwrap()
                .set_numeric(Attribute::Yearly(Metric::Gdp, 2017), Some(value));
        }
        let all = assign_quartiles_over(&mut store, Metric::Gdp, 2016..=2018);
        assert_eq!(all.keys().copied().collect::<Vec<_>>(), vec![2016, 2017]);
        assert_eq!(quartile_of(&store, "A", 2016), Some(1));
        assert_eq!(quartile_of(&store, "A", 2017), Some(3));
        assert_eq!(quartile_of(&store, "B", 2017), Some(1));
    }

    #[test]
    fn test_stale_labels_are_cleared() {
        let mut store = store_with_gdp(2016, &[("A", Some(1.0))]);
        assign_quartiles(&mut store, Metric::Gdp, 2016);
        store
            .get_mut("A")
            .unwrap()
            .set_numeric(Attribute::Yearly(Metric::Gdp, 2016), None);
        assign_quartiles(&mut store, Metric::Gdp, 2016);
        assert_eq!(quartile_of(&store, "A", 2016), None);
    }
}
