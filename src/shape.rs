use crate::classify::{classify, RowKind};
use crate::columns::{normalize_header, ColumnRoles};
use crate::config::NormalizeOptions;
use crate::csv::cell;
use crate::error::{Result, StatementError};
use crate::numeric::to_number;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Label used when a source row carries no item text.
pub const PLACEHOLDER_ITEM: &str = "(Khoản mục)";

const META_COLUMNS: &[&str] = &["mã", "ma", "symbol", "ticker", "năm", "nam"];

static YEAR_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*20[0-9]{2}\s*$").expect("valid year header pattern"));

/// Layout of a statement export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TableShape {
    #[schemars(description = "One column per fiscal year, one row per line item")]
    Wide,

    #[schemars(description = "One row per (year, item) pair with a separate value column")]
    Long,

    #[schemars(description = "One row per year, one column per metric")]
    Matrix,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CanonicalRow {
    #[schemars(description = "Line item label as it appears in the source file")]
    pub item: String,

    pub kind: RowKind,

    #[schemars(description = "Raw cell text keyed by fiscal year; only years from the table's year list")]
    pub values: BTreeMap<String, String>,
}

impl CanonicalRow {
    pub fn new(item: impl Into<String>, values: BTreeMap<String, String>) -> Self {
        let item = item.into();
        let kind = classify(&item);
        Self { item, kind, values }
    }

    pub fn value(&self, year: &str) -> &str {
        self.values.get(year).map(String::as_str).unwrap_or("")
    }

    pub fn number(&self, year: &str) -> f64 {
        to_number(self.value(year))
    }

    pub fn indent_level(&self) -> usize {
        self.kind.indent_level(&self.item)
    }

    fn is_all_zero(&self, years: &[String]) -> bool {
        years.iter().all(|y| self.number(y) == 0.0)
    }
}

/// A statement reduced to the shape-independent row model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FinancialTable {
    pub shape: TableShape,

    #[schemars(description = "Fiscal years in ascending order, at most the configured window")]
    pub years: Vec<String>,

    pub rows: Vec<CanonicalRow>,
}

impl FinancialTable {
    pub fn row(&self, item: &str) -> Option<&CanonicalRow> {
        let wanted = item.trim();
        self.rows.iter().find(|r| r.item.trim() == wanted)
    }

    /// "2020 – 2024" style caption, or `None` when no year survived.
    pub fn period_label(&self) -> Option<String> {
        match (self.years.first(), self.years.last()) {
            (Some(first), Some(last)) => Some(format!("{} – {}", first, last)),
            _ => None,
        }
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        let schema = schemars::schema_for!(FinancialTable);
        serde_json::to_string_pretty(&schema)
    }
}

pub fn is_year_header(header: &str) -> bool {
    YEAR_HEADER.is_match(header)
}

/// Identifier and year columns that never become rows in the matrix layout.
pub fn is_meta_column(header: &str) -> bool {
    let n = normalize_header(header);
    n.is_empty() || META_COLUMNS.contains(&n.as_str()) || n.starts_with("unnamed")
}

pub fn detect_shape<S: AsRef<str>>(headers: &[S], roles: &ColumnRoles) -> TableShape {
    if headers.iter().any(|h| is_year_header(h.as_ref())) {
        TableShape::Wide
    } else if roles.value.is_some() && roles.item.is_some() {
        TableShape::Long
    } else {
        TableShape::Matrix
    }
}

/// Drops `Item` rows whose value is zero in every selected year.
/// Sections and subsections are always kept.
pub fn prune_zero_items(rows: Vec<CanonicalRow>, years: &[String]) -> Vec<CanonicalRow> {
    rows.into_iter()
        .filter(|row| !row.kind.is_item() || !row.is_all_zero(years))
        .collect()
}

pub fn normalize(headers: &[String], rows: &[Vec<String>], symbol: &str) -> Result<FinancialTable> {
    normalize_with(headers, rows, symbol, &NormalizeOptions::default())
}

/// Reshapes a wide, long or matrix statement export into canonical rows for
/// one symbol. `headers` are expected to be trimmed already.
pub fn normalize_with(
    headers: &[String],
    rows: &[Vec<String>],
    symbol: &str,
    options: &NormalizeOptions,
) -> Result<FinancialTable> {
    options.validate()?;
    let roles = ColumnRoles::resolve(headers);
    let year_col = roles.year.as_deref().ok_or(StatementError::NoYearColumn)?;
    let shape = detect_shape(headers, &roles);

    let index_of = |name: Option<&str>| name.and_then(|n| headers.iter().position(|h| h == n));
    let symbol_idx = index_of(roles.symbol.as_deref());
    let wanted = symbol.trim().to_uppercase();

    let filtered: Vec<&Vec<String>> = rows
        .iter()
        .filter(|r| match symbol_idx {
            Some(i) => cell(r, Some(i)).trim().to_uppercase() == wanted,
            None => true,
        })
        .collect();
    if filtered.is_empty() {
        return Err(StatementError::NoRowsForSymbol {
            symbol: symbol.trim().to_string(),
        });
    }

    debug!(
        "Normalizing {:?} table for {} ({} of {} rows match)",
        shape,
        wanted,
        filtered.len(),
        rows.len()
    );

    let (years, table_rows) = match shape {
        TableShape::Wide => {
            let item_header = roles
                .item
                .as_deref()
                .or_else(|| {
                    headers
                        .iter()
                        .map(String::as_str)
                        .find(|h| !is_year_header(h) && Some(*h) != roles.symbol.as_deref())
                });
            reshape_wide(headers, &filtered, index_of(item_header), options)
        }
        TableShape::Long => reshape_long(
            &filtered,
            index_of(Some(year_col)),
            index_of(roles.item.as_deref()),
            index_of(roles.value.as_deref()),
            options,
        )?,
        TableShape::Matrix => reshape_matrix(headers, &filtered, index_of(Some(year_col)), options)?,
    };

    let before = table_rows.len();
    let pruned = prune_zero_items(table_rows, &years);
    debug!(
        "Kept {} of {} rows across years {:?}",
        pruned.len(),
        before,
        years
    );

    Ok(FinancialTable {
        shape,
        years,
        rows: pruned,
    })
}

fn parse_year(raw: &str) -> Option<i32> {
    raw.trim().parse::<i32>().ok()
}

/// Ascending by numeric year, keeping the `max_years` most recent.
fn select_years(mut years: Vec<(i32, String)>, options: &NormalizeOptions) -> Vec<String> {
    years.sort_by_key(|(n, _)| *n);
    let skip = years.len().saturating_sub(options.max_years);
    years.into_iter().skip(skip).map(|(_, y)| y).collect()
}

fn reshape_wide(
    headers: &[String],
    rows: &[&Vec<String>],
    item_idx: Option<usize>,
    options: &NormalizeOptions,
) -> (Vec<String>, Vec<CanonicalRow>) {
    let mut seen = BTreeSet::new();
    let candidates: Vec<(i32, String)> = headers
        .iter()
        .filter(|h| is_year_header(h))
        .filter_map(|h| {
            let y = h.trim().to_string();
            let n = parse_year(&y)?;
            (n >= options.min_year && seen.insert(y.clone())).then_some((n, y))
        })
        .collect();
    let years = select_years(candidates, options);

    let year_columns: Vec<(String, Option<usize>)> = years
        .iter()
        .map(|y| (y.clone(), headers.iter().position(|h| h.trim() == y)))
        .collect();

    let table = rows
        .iter()
        .map(|r| {
            let label = match cell(r, item_idx).trim() {
                "" => PLACEHOLDER_ITEM,
                label => label,
            };
            let values = year_columns
                .iter()
                .map(|(y, idx)| (y.clone(), cell(r, *idx).to_string()))
                .collect();
            CanonicalRow::new(label, values)
        })
        .collect();

    (years, table)
}

fn reshape_long(
    rows: &[&Vec<String>],
    year_idx: Option<usize>,
    item_idx: Option<usize>,
    value_idx: Option<usize>,
    options: &NormalizeOptions,
) -> Result<(Vec<String>, Vec<CanonicalRow>)> {
    let mut order: Vec<String> = Vec::new();
    let mut by_item: HashMap<String, BTreeMap<String, String>> = HashMap::new();
    let mut year_set: BTreeMap<String, i32> = BTreeMap::new();

    for r in rows {
        let year = cell(r, year_idx).trim();
        let Some(n) = parse_year(year) else {
            continue;
        };
        if n < options.min_year {
            continue;
        }

        let item = match cell(r, item_idx).trim() {
            "" => PLACEHOLDER_ITEM,
            item => item,
        };
        year_set.insert(year.to_string(), n);
        let values = by_item.entry(item.to_string()).or_insert_with(|| {
            order.push(item.to_string());
            BTreeMap::new()
        });
        values.insert(year.to_string(), cell(r, value_idx).to_string());
    }

    let years = select_years(
        year_set.into_iter().map(|(y, n)| (n, y)).collect(),
        options,
    );
    if years.is_empty() || order.is_empty() {
        return Err(StatementError::EmptyResultSet {
            min_year: options.min_year,
        });
    }

    let table = order
        .into_iter()
        .map(|item| {
            let mut values = by_item.remove(&item).unwrap_or_default();
            values.retain(|y, _| years.contains(y));
            CanonicalRow::new(item, values)
        })
        .collect();

    Ok((years, table))
}

fn reshape_matrix(
    headers: &[String],
    rows: &[&Vec<String>],
    year_idx: Option<usize>,
    options: &NormalizeOptions,
) -> Result<(Vec<String>, Vec<CanonicalRow>)> {
    let distinct: BTreeSet<i32> = rows
        .iter()
        .filter_map(|r| parse_year(cell(r, year_idx)))
        .filter(|n| *n >= options.min_year)
        .collect();
    if distinct.is_empty() {
        return Err(StatementError::EmptyResultSet {
            min_year: options.min_year,
        });
    }
    let years = select_years(
        distinct.into_iter().map(|n| (n, n.to_string())).collect(),
        options,
    );

    // First row per year wins.
    let row_for_year: Vec<(String, Option<&Vec<String>>)> = years
        .iter()
        .map(|y| {
            let found = rows.iter().copied().find(|r| cell(r, year_idx).trim() == y);
            (y.clone(), found)
        })
        .collect();

    let table = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| !is_meta_column(h))
        .map(|(col, header)| {
            let values = row_for_year
                .iter()
                .map(|(y, row)| {
                    let value = row.map(|r| cell(r, Some(col))).unwrap_or("");
                    (y.clone(), value.to_string())
                })
                .collect();
            CanonicalRow::new(header.trim(), values)
        })
        .collect();

    Ok((years, table))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn rows(values: &[&[&str]]) -> Vec<Vec<String>> {
        values.iter().map(|r| strings(r)).collect()
    }

    #[test]
    fn test_year_header_pattern() {
        assert!(is_year_header("2021"));
        assert!(is_year_header("  2024 "));
        assert!(!is_year_header("1999"));
        assert!(!is_year_header("2021a"));
        assert!(!is_year_header("Năm 2021"));
    }

    #[test]
    fn test_meta_columns() {
        assert!(is_meta_column(""));
        assert!(is_meta_column(" Mã "));
        assert!(is_meta_column("NĂM"));
        assert!(is_meta_column("Unnamed: 0"));
        assert!(!is_meta_column("Doanh thu"));
        assert!(!is_meta_column("Year"));
    }

    #[test]
    fn test_missing_year_column_fails() {
        let headers = strings(&["Mã", "Doanh thu"]);
        let result = normalize(&headers, &rows(&[&["FPT", "1"]]), "FPT");
        assert!(matches!(result, Err(StatementError::NoYearColumn)));
    }

    #[test]
    fn test_wide_year_window() {
        let headers = strings(&[
            "Mã", "Năm tài chính", "Chỉ tiêu", "2018", "2019", "2020", "2021", "2022", "2023", "2024",
        ]);
        let data = rows(&[
            &["FPT", "", "Doanh thu", "1", "2", "3", "4", "5", "6", "7"],
            &["VNM", "", "Doanh thu", "9", "9", "9", "9", "9", "9", "9"],
        ]);
        let table = normalize(&headers, &data, "fpt").unwrap();
        assert_eq!(table.shape, TableShape::Wide);
        assert_eq!(table.years, strings(&["2020", "2021", "2022", "2023", "2024"]));
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].value("2020"), "3");
        assert!(!table.rows[0].values.contains_key("2019"));
    }

    #[test]
    fn test_wide_keeps_five_most_recent() {
        let headers = strings(&["Năm", "Item", "2020", "2021", "2022", "2023", "2024", "2025"]);
        let data = rows(&[&["", "Tiền", "1", "1", "1", "1", "1", "1"]]);
        let table = normalize(&headers, &data, "FPT").unwrap();
        assert_eq!(table.years, strings(&["2021", "2022", "2023", "2024", "2025"]));
    }

    #[test]
    fn test_wide_blank_label_uses_placeholder() {
        let headers = strings(&["Mã", "Năm", "Khoản mục", "2021"]);
        let data = rows(&[&["FPT", "", " ", "5"]]);
        let table = normalize(&headers, &data, "FPT").unwrap();
        assert_eq!(table.rows[0].item, PLACEHOLDER_ITEM);
    }

    #[test]
    fn test_wide_label_falls_back_to_first_plain_header() {
        let headers = strings(&["Mã", "Năm", "Nhãn", "2021", "2022"]);
        let data = rows(&[&["FPT", "x", "Doanh thu", "1", "2"]]);
        let table = normalize(&headers, &data, "FPT").unwrap();
        let labels: Vec<&str> = table.rows.iter().map(|r| r.item.as_str()).collect();
        assert_eq!(labels, vec!["x"]);
        assert_eq!(table.rows[0].value("2022"), "2");
    }

    #[test]
    fn test_zero_year_window_is_rejected() {
        let headers = strings(&["Mã", "Năm", "Doanh thu"]);
        let data = rows(&[&["FPT", "2021", "1"]]);
        let options = NormalizeOptions {
            max_years: 0,
            ..NormalizeOptions::default()
        };
        let result = normalize_with(&headers, &data, "FPT", &options);
        assert!(matches!(result, Err(StatementError::InvalidConfig(_))));
    }

    #[test]
    fn test_wide_no_rows_for_symbol() {
        let headers = strings(&["Mã", "Năm", "Chỉ tiêu", "2021"]);
        let data = rows(&[&["VNM", "", "Doanh thu", "5"]]);
        let result = normalize(&headers, &data, "FPT");
        assert!(matches!(result, Err(StatementError::NoRowsForSymbol { .. })));
    }

    #[test]
    fn test_long_groups_items() {
        let headers = strings(&["Mã", "Năm", "Chỉ tiêu", "Giá trị"]);
        let data = rows(&[
            &["FPT", "2019", "Doanh thu", "90"],
            &["FPT", "2021", "Doanh thu", "100"],
            &["FPT", "2022", "Doanh thu", "120"],
            &["FPT", "2021", "A. TÀI SẢN", "0"],
            &["FPT", "2021", "Chi phí khác", "0"],
            &["FPT", "2022", "Chi phí khác", "-"],
            &["FPT", "abc", "Lợi nhuận", "1"],
            &["VNM", "2023", "Doanh thu", "5"],
        ]);
        let table = normalize(&headers, &data, "FPT").unwrap();
        assert_eq!(table.shape, TableShape::Long);
        assert_eq!(table.years, strings(&["2021", "2022"]));

        let items: Vec<&str> = table.rows.iter().map(|r| r.item.as_str()).collect();
        assert_eq!(items, vec!["Doanh thu", "A. TÀI SẢN"]);
        assert_eq!(table.rows[0].value("2022"), "120");
        assert_eq!(table.rows[1].kind, RowKind::Section);
    }

    #[test]
    fn test_long_later_duplicate_overwrites() {
        let headers = strings(&["Năm", "Item", "Amount"]);
        let data = rows(&[&["2021", "Tiền", "1"], &["2021", "Tiền", "2"]]);
        let table = normalize(&headers, &data, "ANY").unwrap();
        assert_eq!(table.rows[0].value("2021"), "2");
    }

    #[test]
    fn test_long_only_old_years_is_empty_result() {
        let headers = strings(&["Mã", "Năm", "Chỉ tiêu", "Giá trị"]);
        let data = rows(&[&["FPT", "2018", "Doanh thu", "1"]]);
        let result = normalize(&headers, &data, "FPT");
        assert!(matches!(result, Err(StatementError::EmptyResultSet { min_year: 2020 })));
    }

    #[test]
    fn test_long_values_limited_to_selected_years() {
        let headers = strings(&["Năm", "Item", "Amount"]);
        let data: Vec<Vec<String>> = (2020..=2025)
            .map(|y| {
                let year = y.to_string();
                strings(&[year.as_str(), "Tiền", "1"])
            })
            .collect();
        let table = normalize(&headers, &data, "X").unwrap();
        assert_eq!(table.years.len(), 5);
        assert!(!table.rows[0].values.contains_key("2020"));
    }

    #[test]
    fn test_matrix_columns_become_rows() {
        let headers = strings(&["Mã", "Năm", "Doanh thu", "Lợi nhuận", "Unnamed: 4"]);
        let data = rows(&[
            &["FPT", "2019", "100", "10", ""],
            &["FPT", "2021", "200", "0", ""],
            &["FPT", "2022", "0", "0", ""],
            &["FPT", "2022", "999", "999", ""],
            &["VNM", "2021", "50", "5", ""],
        ]);
        let table = normalize(&headers, &data, "FPT").unwrap();
        assert_eq!(table.shape, TableShape::Matrix);
        assert_eq!(table.years, strings(&["2021", "2022"]));
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].item, "Doanh thu");
        assert_eq!(table.rows[0].value("2021"), "200");
        assert_eq!(table.rows[0].value("2022"), "0");
    }

    #[test]
    fn test_matrix_without_recent_years_fails() {
        let headers = strings(&["Mã", "Năm", "Doanh thu"]);
        let data = rows(&[&["FPT", "2019", "100"]]);
        let result = normalize(&headers, &data, "FPT");
        assert!(matches!(result, Err(StatementError::EmptyResultSet { .. })));
    }

    #[test]
    fn test_sections_survive_pruning() {
        let years = strings(&["2021"]);
        let rows = vec![
            CanonicalRow::new("A. TÀI SẢN", BTreeMap::new()),
            CanonicalRow::new("1.1 Tiền", BTreeMap::new()),
            CanonicalRow::new("Tiền mặt", BTreeMap::new()),
        ];
        let pruned = prune_zero_items(rows, &years);
        assert_eq!(pruned.len(), 2);
    }

    #[test]
    fn test_normalize_is_repeatable() {
        let headers = strings(&["Mã", "Năm", "Doanh thu", "Chi phí"]);
        let data = rows(&[&["FPT", "2021", "200", "0"], &["FPT", "2022", "0", "(0)"]]);
        let first = normalize(&headers, &data, "FPT").unwrap();
        let second = normalize(&headers, &data, "FPT").unwrap();
        assert_eq!(first, second);
        assert!(first.row("Chi phí").is_none());
    }

    #[test]
    fn test_period_label() {
        let table = FinancialTable {
            shape: TableShape::Matrix,
            years: strings(&["2021", "2024"]),
            rows: vec![],
        };
        assert_eq!(table.period_label().as_deref(), Some("2021 – 2024"));
    }
}
