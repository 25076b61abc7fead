use std::fs;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord};
use log::{debug, info, warn};

use crate::clean::normalize_name;
use crate::error::{Result, WealthGapError};
use crate::models::{Attribute, CountryRecord};
use crate::store::{JoinKeyMap, RecordStore};

/// How rows of a secondary dataset are matched to existing records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKey {
    /// Country name in the given column.
    Name(usize),
    /// Country code in the given column, resolved through the join-key map.
    Code(usize),
}

impl JoinKey {
    fn column(&self) -> usize {
        match self {
            JoinKey::Name(column) | JoinKey::Code(column) => *column,
        }
    }
}

/// Column position in a row; negative values count back from the end of the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnIndex(pub isize);

impl ColumnIndex {
    pub fn resolve(&self, row_len: usize) -> Option<usize> {
        if self.0 >= 0 {
            let index = self.0 as usize;
            (index < row_len).then_some(index)
        } else {
            row_len.checked_sub(self.0.unsigned_abs())
        }
    }
}

/// Description of one dataset file and the attributes it feeds.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSpec {
    pub path: PathBuf,
    pub header_lines: usize,
    pub join: JoinKey,
    pub columns: Vec<(Attribute, ColumnIndex)>,
}

impl DatasetSpec {
    pub fn new<P: AsRef<Path>>(path: P, header_lines: usize, join: JoinKey) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            header_lines,
            join,
            columns: Vec::new(),
        }
    }

    pub fn column(mut self, attribute: Attribute, index: isize) -> Self {
        self.columns.push((attribute, ColumnIndex(index)));
        self
    }
}

/// A cell that could not be stored in the attribute it was meant for.
#[derive(Debug, Clone, PartialEq)]
pub struct Anomaly {
    pub row: usize,
    pub country: String,
    pub attribute: Attribute,
    pub raw: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub rows: usize,
    pub matched: usize,
    pub skipped: usize,
    pub anomalies: Vec<Anomaly>,
}

/// Trimmed cell text, or `None` for an empty or `..` placeholder cell.
pub(crate) fn cell(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    (!trimmed.is_empty() && trimmed != "..").then_some(trimmed)
}

fn parse_number(text: &str) -> Option<f64> {
    text.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn skip_lines(contents: &str, lines: usize) -> &str {
    let mut rest = contents;
    for _ in 0..lines {
        match rest.find('\n') {
            Some(end) => rest = &rest[end + 1..],
            None => return "",
        }
    }
    rest
}

/// Reads a whole file and parses the rows that follow the first `header_lines` lines.
pub fn read_rows(path: &Path, header_lines: usize) -> Result<Vec<StringRecord>> {
    let contents =
        fs::read_to_string(path).map_err(|source| WealthGapError::DatasetUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
    let body = skip_lines(contents.trim_start_matches('\u{feff}'), header_lines);

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(body.as_bytes());

    // Text is valid UTF-8 and rows may vary in length, so only I/O can fail here
    reader
        .records()
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|err| WealthGapError::DatasetUnavailable {
            path: path.to_path_buf(),
            source: err.into(),
        })
}

/// Populates the attributes named in `spec` on the records the file's rows resolve to.
/// Rows for unknown countries are skipped; no records are created.
pub fn load_dataset(
    store: &mut RecordStore,
    keys: &JoinKeyMap,
    spec: &DatasetSpec,
) -> Result<LoadReport> {
    let rows = read_rows(&spec.path, spec.header_lines)?;
    let mut report = LoadReport::default();

    for (i, row) in rows.iter().enumerate() {
        let row_number = spec.header_lines + i + 1;
        report.rows += 1;

        let key = row
            .get(spec.join.column())
            .ok_or_else(|| WealthGapError::MissingJoinColumn {
                path: spec.path.clone(),
                row: row_number,
                column: spec.join.column(),
            })?;
        let name = match spec.join {
            JoinKey::Name(_) => Some(normalize_name(key)),
            JoinKey::Code(_) => keys.name_of(key).map(str::to_string),
        };
        let record = match name.as_deref() {
            Some(name) => store.get_mut(name),
            None => None,
        };
        let Some(record) = record else {
            debug!(
                "{}: row {row_number} key {key:?} matches no country",
                spec.path.display()
            );
            report.skipped += 1;
            continue;
        };

        report.matched += 1;
        apply_row(record, row, row_number, &spec.columns, &mut report.anomalies);
    }

    for anomaly in &report.anomalies {
        warn!(
            "{}: row {} non-numeric {} for {}: {:?}",
            spec.path.display(),
            anomaly.row,
            anomaly.attribute,
            anomaly.country,
            anomaly.raw
        );
    }
    info!(
        "Loaded {}: {} rows, {} matched, {} skipped",
        spec.path.display(),
        report.rows,
        report.matched,
        report.skipped
    );
    Ok(report)
}

fn apply_row(
    record: &mut CountryRecord,
    row: &StringRecord,
    row_number: usize,
    columns: &[(Attribute, ColumnIndex)],
    anomalies: &mut Vec<Anomaly>,
) {
    for &(attribute, index) in columns {
        let text = index
            .resolve(row.len())
            .and_then(|i| row.get(i))
            .and_then(cell);

        if !attribute.is_numeric() {
            record.set_income_group(text.map(str::to_string));
            continue;
        }

        let value = text.and_then(parse_number);
        if let (Some(raw), None) = (text, value) {
            anomalies.push(Anomaly {
                row: row_number,
                country: record.name().to_string(),
                attribute,
                raw: raw.to_string(),
            });
        }
        record.set_numeric(attribute, value);
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::models::{Metric, Sector};

    fn write_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    fn store_with(countries: &[(&str, &str)]) -> (RecordStore, JoinKeyMap) {
        let mut store = RecordStore::new();
        let mut keys = JoinKeyMap::new();
        for (name, code) in countries {
            store.insert(name);
            keys.insert(code, name);
        }
        (store, keys)
    }

    #[test]
    fn test_column_index_resolve() {
        assert_eq!(ColumnIndex(0).resolve(3), Some(0));
        assert_eq!(ColumnIndex(3).resolve(3), None);
        assert_eq!(ColumnIndex(-1).resolve(3), Some(2));
        assert_eq!(ColumnIndex(-3).resolve(3), Some(0));
        assert_eq!(ColumnIndex(-4).resolve(3), None);
    }

    #[test]
    fn test_cell_placeholders() {
        assert_eq!(cell("  12.5 "), Some("12.5"));
        assert_eq!(cell(""), None);
        assert_eq!(cell(" .. "), None);
    }

    #[test]
    fn test_skip_lines_counts_blank_lines() {
        assert_eq!(skip_lines("a\n\nb\nc\n", 2), "b\nc\n");
        assert_eq!(skip_lines("a\n", 5), "");
    }

    #[test]
    fn test_load_by_name_with_negative_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "unemployment.csv",
            "header\nCANADA,CAN,7.0,6.3\nAtlantis,ATL,1,2\n",
        );
        let (mut store, keys) = store_with(&[("Canada", "CAN")]);
        let spec = DatasetSpec::new(&path, 1, JoinKey::Name(0))
            .column(Attribute::Yearly(Metric::Unemployment, 2019), -2)
            .column(Attribute::Yearly(Metric::Unemployment, 2020), -1);

        let report = load_dataset(&mut store, &keys, &spec).unwrap();
        assert_eq!(report.rows, 2);
        assert_eq!(report.matched, 1);
        assert_eq!(report.skipped, 1);
        assert!(!store.contains("Atlantis"));
        let canada = store.get("Canada").unwrap();
        assert_eq!(canada.value(Metric::Unemployment, 2019), Some(7.0));
        assert_eq!(canada.value(Metric::Unemployment, 2020), Some(6.3));
    }

    #[test]
    fn test_load_by_code_stores_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "income.csv",
            "Code,Region,Income group\nCAN,North America,High income\nZZZ,Nowhere,Low income\n",
        );
        let (mut store, keys) = store_with(&[("Canada", "CAN")]);
        let spec =
            DatasetSpec::new(&path, 1, JoinKey::Code(0)).column(Attribute::IncomeGroup, 2);

        let report = load_dataset(&mut store, &keys, &spec).unwrap();
        assert_eq!(report.skipped, 1);
        assert_eq!(store.get("Canada").unwrap().income_group(), Some("High income"));
    }

    #[test]
    fn test_non_numeric_cell_is_reported_and_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "sector.csv", "Canada,x,n/a,,12\n");
        let (mut store, keys) = store_with(&[("Canada", "CAN")]);
        let manufacturing = Attribute::Yearly(Metric::SectorGdp(Sector::Manufacturing), 2016);
        let service = Attribute::Yearly(Metric::SectorGdp(Sector::Service), 2016);
        let industry = Attribute::Yearly(Metric::SectorGdp(Sector::Industry), 2016);
        let spec = DatasetSpec::new(&path, 0, JoinKey::Name(0))
            .column(manufacturing, 2)
            .column(service, 3)
            .column(industry, 4);

        let report = load_dataset(&mut store, &keys, &spec).unwrap();
        assert_eq!(report.anomalies.len(), 1);
        assert_eq!(report.anomalies[0].raw, "n/a");
        assert_eq!(report.anomalies[0].attribute, manufacturing);
        let canada = store.get("Canada").unwrap();
        assert_eq!(canada.numeric(manufacturing), None);
        assert_eq!(canada.numeric(service), None);
        assert_eq!(canada.numeric(industry), Some(12.0));
    }

    #[test]
    fn test_load_is_idempotent_and_last_row_wins() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "gdp.csv", "Canada,CAN,1\nMexico,MEX,5\ncanada,CAN,2\n");
        let (mut store, keys) = store_with(&[("Canada", "CAN"), ("Mexico", "MEX")]);
        let attr = Attribute::Yearly(Metric::Gdp, 2016);
        let spec = DatasetSpec::new(&path, 0, JoinKey::Name(0)).column(attr, -1);

        load_dataset(&mut store, &keys, &spec).unwrap();
        let first = store.clone();
        load_dataset(&mut store, &keys, &spec).unwrap();
        assert_eq!(store, first);
        assert_eq!(store.get("Canada").unwrap().numeric(attr), Some(2.0));
    }

    #[test]
    fn test_invalid_utf8_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sector.csv");
        std::fs::write(&path, b"Canada,CAN,\xff\xfe12\n").unwrap();
        let (mut store, keys) = store_with(&[("Canada", "CAN")]);
        let spec = DatasetSpec::new(&path, 0, JoinKey::Name(0));
        let err = load_dataset(&mut store, &keys, &spec).unwrap_err();
        match err {
            WealthGapError::DatasetUnavailable { source, .. } => {
                assert_eq!(source.kind(), std::io::ErrorKind::InvalidData)
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_file_is_unavailable() {
        let (mut store, keys) = store_with(&[]);
        let spec = DatasetSpec::new("does/not/exist.csv", 1, JoinKey::Name(0));
        let err = load_dataset(&mut store, &keys, &spec).unwrap_err();
        assert!(matches!(err, WealthGapError::DatasetUnavailable { .. }));
    }
}
