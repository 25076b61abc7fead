use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::WealthGapError;

pub type Year = u16;

/// Economic sector reported in the sector GDP dataset, in file column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Sector {
    Manufacturing,
    Service,
    Industry,
    Agriculture,
}

impl Sector {
    pub const ALL: [Sector; 4] = [
        Sector::Manufacturing,
        Sector::Service,
        Sector::Industry,
        Sector::Agriculture,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Sector::Manufacturing => "manufacturing",
            Sector::Service => "service",
            Sector::Industry => "industry",
            Sector::Agriculture => "agriculture",
        }
    }
}

/// A year-indexed numeric series held on every country.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Metric {
    Gdp,
    SectorGdp(Sector),
    Unemployment,
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Gdp => write!(f, "gdp"),
            Metric::SectorGdp(sector) => write!(f, "{}", sector.name()),
            Metric::Unemployment => write!(f, "unemployment"),
        }
    }
}

impl FromStr for Metric {
    type Err = WealthGapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gdp" => Ok(Metric::Gdp),
            "unemployment" => Ok(Metric::Unemployment),
            "manufacturing" => Ok(Metric::SectorGdp(Sector::Manufacturing)),
            "service" => Ok(Metric::SectorGdp(Sector::Service)),
            "industry" => Ok(Metric::SectorGdp(Sector::Industry)),
            "agriculture" => Ok(Metric::SectorGdp(Sector::Agriculture)),
            _ => Err(WealthGapError::UnknownMetric(s.to_string())),
        }
    }
}

/// A single settable field of a `CountryRecord`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Attribute {
    Yearly(Metric, Year),
    IncomeGroup,
    VaccinationsPerHundred,
    DeathsPerMillion,
}

impl Attribute {
    /// Whether the attribute only ever holds real numbers.
    pub fn is_numeric(&self) -> bool {
        !matches!(self, Attribute::IncomeGroup)
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attribute::Yearly(metric, year) => write!(f, "{metric}_{year}"),
            Attribute::IncomeGroup => write!(f, "income_group"),
            Attribute::VaccinationsPerHundred => write!(f, "vaccinations_per_hundred"),
            Attribute::DeathsPerMillion => write!(f, "deaths_per_million"),
        }
    }
}

/// Rank group of a country within one year's distribution, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Quartile {
    Low = 1,
    LowerMiddle = 2,
    UpperMiddle = 3,
    High = 4,
}

impl Quartile {
    pub const ALL: [Quartile; 4] = [
        Quartile::Low,
        Quartile::LowerMiddle,
        Quartile::UpperMiddle,
        Quartile::High,
    ];

    pub fn number(&self) -> u8 {
        *self as u8
    }

    pub fn label(&self) -> &'static str {
        match self {
            Quartile::Low => "Low GDP",
            Quartile::LowerMiddle => "Lower Middle GDP",
            Quartile::UpperMiddle => "Upper Middle GDP",
            Quartile::High => "High GDP",
        }
    }

    /// Position in `Quartile::ALL`.
    pub fn index(&self) -> usize {
        self.number() as usize - 1
    }
}

impl TryFrom<u8> for Quartile {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Quartile::Low),
            2 => Ok(Quartile::LowerMiddle),
            3 => Ok(Quartile::UpperMiddle),
            4 => Ok(Quartile::High),
            other => Err(other),
        }
    }
}

/// Merged statistics for one country. Every field except the name starts out missing.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryRecord {
    name: String,
    yearly: BTreeMap<(Metric, Year), f64>,
    quartiles: BTreeMap<(Metric, Year), Quartile>,
    income_group: Option<String>,
    vaccinations_per_hundred: Option<f64>,
    deaths_per_million: Option<f64>,
}

impl CountryRecord {
    pub(crate) fn new(name: String) -> Self {
        Self {
            name,
            yearly: BTreeMap::new(),
            quartiles: BTreeMap::new(),
            income_group: None,
            vaccinations_per_hundred: None,
            deaths_per_million: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self, metric: Metric, year: Year) -> Option<f64> {
        self.yearly.get(&(metric, year)).copied()
    }

    pub fn gdp(&self, year: Year) -> Option<f64> {
        self.value(Metric::Gdp, year)
    }

    /// Numeric value of `attribute`; always `None` for the income group.
    pub fn numeric(&self, attribute: Attribute) -> Option<f64> {
        match attribute {
            Attribute::Yearly(metric, year) => self.value(metric, year),
            Attribute::IncomeGroup => None,
            Attribute::VaccinationsPerHundred => self.vaccinations_per_hundred,
            Attribute::DeathsPerMillion => self.deaths_per_million,
        }
    }

    pub fn income_group(&self) -> Option<&str> {
        self.income_group.as_deref()
    }

    pub fn vaccinations_per_hundred(&self) -> Option<f64> {
        self.vaccinations_per_hundred
    }

    pub fn deaths_per_million(&self) -> Option<f64> {
        self.deaths_per_million
    }

    pub fn quartile(&self, metric: Metric, year: Year) -> Option<Quartile> {
        self.quartiles.get(&(metric, year)).copied()
    }

    pub fn gdp_quartile(&self, year: Year) -> Option<Quartile> {
        self.quartile(Metric::Gdp, year)
    }

    /// Sets or clears a numeric attribute. Non-finite values are stored as missing.
    pub(crate) fn set_numeric(&mut self, attribute: Attribute, value: Option<f64>) {
        let value = value.filter(|v| v.is_finite());
        match attribute {
            Attribute::Yearly(metric, year) => match value {
                Some(v) => {
                    self.yearly.insert((metric, year), v);
                }
                None => {
                    self.yearly.remove(&(metric, year));
                }
            },
            Attribute::IncomeGroup => {}
            Attribute::VaccinationsPerHundred => self.vaccinations_per_hundred = value,
            Attribute::DeathsPerMillion => self.deaths_per_million = value,
        }
    }

    pub(crate) fn set_income_group(&mut self, group: Option<String>) {
        self.income_group = group;
    }

    pub(crate) fn set_quartile(&mut self, metric: Metric, year: Year, quartile: Option<Quartile>) {
        match quartile {
            Some(q) => {
                self.quartiles.insert((metric, year), q);
            }
            None => {
                self.quartiles.remove(&(metric, year));
            }
        }
    }
}
