use crate::csv::parse_csv;
use crate::numeric::to_number_lenient;
use crate::record::Record;
use log::debug;
use serde::Serialize;
use std::ops::RangeInclusive;

/// Fiscal years shown in the indicator charts.
pub const CHART_YEARS: RangeInclusive<i32> = 2020..=2024;

const SYMBOL_KEYS: &[&str] = &["Mã", "Ma"];
const YEAR_KEYS: &[&str] = &["Năm", "Nam"];
const SECTOR_KEYS: &[&str] = &["Sector", "Ngành"];

/// Integer prefix of a year cell; `"2021.0"` reads as 2021, text reads as 0.
fn leading_year(raw: &str) -> i32 {
    let trimmed = raw.trim();
    let end = trimmed
        .char_indices()
        .find(|(i, c)| !(c.is_ascii_digit() || (*i == 0 && *c == '-')))
        .map(|(i, _)| i)
        .unwrap_or(trimmed.len());
    trimmed[..end].parse().unwrap_or(0)
}

pub fn record_year(record: &Record) -> i32 {
    leading_year(record.get_any(YEAR_KEYS))
}

/// Rows of one flat per-year dataset (indicators, sector averages, or a
/// statement export read as records) ordered by fiscal year.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct YearSeries {
    records: Vec<Record>,
}

impl YearSeries {
    /// Keeps records accepted by `keep` whose year falls in [`CHART_YEARS`].
    pub fn from_records<F>(records: Vec<Record>, keep: F) -> Self
    where
        F: Fn(&Record) -> bool,
    {
        let mut records: Vec<Record> = records
            .into_iter()
            .filter(|r| CHART_YEARS.contains(&record_year(r)) && keep(r))
            .collect();
        records.sort_by_key(record_year);
        Self { records }
    }

    pub fn for_symbol(text: &str, symbol: &str) -> Self {
        let wanted = symbol.trim().to_uppercase();
        let series = Self::from_records(parse_csv(text).records(), |r| {
            r.get_any(SYMBOL_KEYS).trim().to_uppercase() == wanted
        });
        debug!("{} yearly rows for symbol {}", series.len(), wanted);
        series
    }

    pub fn for_sector(text: &str, sector: &str) -> Self {
        let wanted = sector.trim();
        let series = Self::from_records(parse_csv(text).records(), |r| {
            r.get_any(SECTOR_KEYS).trim() == wanted
        });
        debug!("{} yearly rows for sector {:?}", series.len(), wanted);
        series
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn years(&self) -> Vec<i32> {
        self.records.iter().map(record_year).collect()
    }

    pub fn first(&self) -> Option<&Record> {
        self.records.first()
    }

    pub fn latest(&self) -> Option<&Record> {
        self.records.last()
    }

    /// First record for `year`.
    pub fn for_year(&self, year: i32) -> Option<&Record> {
        self.records.iter().find(|r| record_year(r) == year)
    }

    /// Numeric value of `column` in `year`; 0 when the year or cell is missing.
    pub fn value(&self, year: i32, column: &str) -> f64 {
        self.for_year(year)
            .map(|r| to_number_lenient(r.get_trimmed(column)))
            .unwrap_or(0.0)
    }

    /// `(year, value)` for every record, in year order.
    pub fn column(&self, column: &str) -> Vec<(i32, f64)> {
        self.records
            .iter()
            .map(|r| (record_year(r), to_number_lenient(r.get_trimmed(column))))
            .collect()
    }

    pub fn latest_value(&self, column: &str) -> Option<f64> {
        self.latest().map(|r| to_number_lenient(r.get_trimmed(column)))
    }
}
