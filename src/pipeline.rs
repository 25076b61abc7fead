use std::collections::BTreeMap;
use std::fmt;
use std::ops::RangeInclusive;

use log::{debug, info};

use crate::clean::{populate, PrimaryLayout};
use crate::config::Config;
use crate::eda::{summarize, Summary};
use crate::eda_statistics::{assign_quartiles_over, QuartileBoundaries};
use crate::error::Result;
use crate::load_clean::{load_dataset, DatasetSpec, JoinKey, LoadReport};
use crate::models::{Attribute, Metric, Quartile, Sector, Year};
use crate::store::{JoinKeyMap, RecordStore};
use crate::year_eda;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DatasetKind {
    NationalGdp,
    IncomeGroup,
    SectorGdp,
    Unemployment,
    Covid,
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DatasetKind::NationalGdp => "national GDP",
            DatasetKind::IncomeGroup => "income group",
            DatasetKind::SectorGdp => "sector GDP",
            DatasetKind::Unemployment => "unemployment",
            DatasetKind::Covid => "COVID-19",
        };
        write!(f, "{name}")
    }
}

const COVID_NAME_COLUMN: usize = 2;
const COVID_DEATHS_COLUMN: isize = 13;
const COVID_VACCINATIONS_COLUMN: isize = 40;
const SECTOR_FIRST_COLUMN: isize = 2;

/// One attribute per year taken from the last columns of each row, oldest first.
fn trailing_years(mut spec: DatasetSpec, metric: Metric, years: RangeInclusive<Year>) -> DatasetSpec {
    let count = years.clone().count() as isize;
    for (i, year) in years.enumerate() {
        spec = spec.column(Attribute::Yearly(metric, year), i as isize - count);
    }
    spec
}

/// The column layout of every dataset, for the configured files and year range.
pub fn dataset_specs(config: &Config) -> Vec<(DatasetKind, DatasetSpec)> {
    let years = config.years();

    let national_gdp = trailing_years(
        DatasetSpec::new(
            config.path_of(&config.national_gdp),
            config.national_gdp.header_lines,
            JoinKey::Name(PrimaryLayout::default().name_column),
        ),
        Metric::Gdp,
        years.clone(),
    );

    let income_group = DatasetSpec::new(
        config.path_of(&config.income_group),
        config.income_group.header_lines,
        JoinKey::Code(0),
    )
    .column(Attribute::IncomeGroup, 2);

    // Sectors repeat in file order for every year
    let mut sector_gdp = DatasetSpec::new(
        config.path_of(&config.sector_gdp),
        config.sector_gdp.header_lines,
        JoinKey::Name(0),
    );
    let mut column = SECTOR_FIRST_COLUMN;
    for year in years.clone() {
        for sector in Sector::ALL {
            sector_gdp = sector_gdp.column(Attribute::Yearly(Metric::SectorGdp(sector), year), column);
            column += 1;
        }
    }

    let unemployment = trailing_years(
        DatasetSpec::new(
            config.path_of(&config.unemployment),
            config.unemployment.header_lines,
            JoinKey::Name(0),
        ),
        Metric::Unemployment,
        years,
    );

    let covid = DatasetSpec::new(
        config.path_of(&config.covid),
        config.covid.header_lines,
        JoinKey::Name(COVID_NAME_COLUMN),
    )
    .column(Attribute::VaccinationsPerHundred, COVID_VACCINATIONS_COLUMN)
    .column(Attribute::DeathsPerMillion, COVID_DEATHS_COLUMN);

    vec![
        (DatasetKind::NationalGdp, national_gdp),
        (DatasetKind::IncomeGroup, income_group),
        (DatasetKind::SectorGdp, sector_gdp),
        (DatasetKind::Unemployment, unemployment),
        (DatasetKind::Covid, covid),
    ]
}

/// Runs population, every dataset load, then quartile derivation, in that order.
pub struct Pipeline {
    config: Config,
}

impl Pipeline {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn run(&self) -> Result<Dataset> {
        self.config.validate()?;
        debug!("config: {:?}", self.config);

        let (mut records, join_keys) = populate(
            &self.config.path_of(&self.config.national_gdp),
            self.config.national_gdp.header_lines,
            PrimaryLayout::default(),
        )?;

        let mut reports = Vec::new();
        for (kind, spec) in dataset_specs(&self.config) {
            info!("Loading {kind} dataset");
            let report = load_dataset(&mut records, &join_keys, &spec)?;
            reports.push((kind, report));
        }

        let boundaries = assign_quartiles_over(&mut records, Metric::Gdp, self.config.years());

        Ok(Dataset {
            records,
            join_keys,
            years: self.config.years(),
            boundaries,
            reports,
        })
    }
}

/// The merged, read-only result of one pipeline run.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: RecordStore,
    join_keys: JoinKeyMap,
    years: RangeInclusive<Year>,
    boundaries: BTreeMap<Year, QuartileBoundaries>,
    reports: Vec<(DatasetKind, LoadReport)>,
}

impl Dataset {
    pub fn records(&self) -> &RecordStore {
        &self.records
    }

    pub fn join_keys(&self) -> &JoinKeyMap {
        &self.join_keys
    }

    pub fn years(&self) -> RangeInclusive<Year> {
        self.years.clone()
    }

    /// GDP quartile boundaries of a year, if any country had GDP data that year.
    pub fn gdp_boundaries(&self, year: Year) -> Option<&QuartileBoundaries> {
        self.boundaries.get(&year)
    }

    pub fn reports(&self) -> &[(DatasetKind, LoadReport)] {
        &self.reports
    }

    pub fn sum_of(&self, attribute: Attribute) -> f64 {
        year_eda::sum_of(&self.records, attribute)
    }

    pub fn percent_of_whole(&self, attribute: Attribute, country: &str) -> f64 {
        year_eda::percent_of_whole(&self.records, attribute, country)
    }

    pub fn percent_change(&self, country: &str, new: Attribute, old: Attribute) -> f64 {
        year_eda::percent_change(&self.records, country, new, old)
    }

    pub fn percent_change_over_time(
        &self,
        metric: Metric,
        start: Year,
        end: Year,
        country: &str,
    ) -> Vec<(Year, f64)> {
        year_eda::percent_change_over_time(&self.records, metric, start, end, country).collect()
    }

    pub fn share_difference(&self, metric: Metric, start: Year, end: Year) -> BTreeMap<String, f64> {
        year_eda::share_difference(&self.records, metric, start, end)
    }

    pub fn quartile_sum(&self, attribute: Attribute, year: Year, quartile: Quartile) -> f64 {
        year_eda::quartile_sum(&self.records, attribute, year, quartile)
    }

    pub fn summarize(&self, metric: Metric, year: Year) -> Summary {
        summarize(&self.records, metric, year)
    }
}
