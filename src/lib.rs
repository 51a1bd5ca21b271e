//! # Financial Statement Normalizer
//!
//! Turns CSV exports of company financial statements into one canonical table
//! shape, whatever layout the export used.
//!
//! ## Core Concepts
//!
//! - **Parsing**: quote-aware CSV splitting that never fails; malformed input
//!   degrades to fewer or shorter rows
//! - **Column Roles**: symbol, exchange, year, value and item columns found by
//!   case-insensitive substring aliases (Vietnamese and English)
//! - **Shapes**: *Wide* (one column per year), *Long* (one row per item and
//!   year) and *Matrix* (one row per year, one column per item)
//! - **Canonical Rows**: `item` + `kind` + one value per selected year, where
//!   the year window keeps the five most recent years from 2020 onward
//! - **Row Kinds**: section headings, subsections and line items, with
//!   all-zero line items pruned
//!
//! ## Example
//!
//! ```rust
//! use financial_statement_normalizer::*;
//!
//! let csv = "Mã,Năm,Doanh thu\nAAA,2021,100\nAAA,2022,120\nBBB,2022,50\n";
//! let table = normalize_statement(csv, "aaa").unwrap();
//!
//! assert_eq!(table.shape, TableShape::Matrix);
//! assert_eq!(table.years, vec!["2021", "2022"]);
//! assert_eq!(table.rows[0].item, "Doanh thu");
//! assert_eq!(table.rows[0].value("2022"), "120");
//! ```

pub mod api;
pub mod classify;
pub mod columns;
pub mod config;
pub mod csv;
pub mod directory;
pub mod error;
pub mod indicators;
pub mod metrics;
pub mod numeric;
pub mod record;
pub mod shape;
pub mod statements;

pub use api::*;
pub use classify::{classify, RowKind};
pub use columns::{normalize_header, pick_column, pick_role, ColumnRole, ColumnRoles};
pub use config::{DashboardConfig, DatasetFiles, NormalizeOptions};
pub use csv::{parse_csv, DelimitedTable};
pub use directory::{visible_fields, CompanyDirectory};
pub use error::{Result, SearchError, StatementError};
pub use indicators::YearSeries;
pub use numeric::{format_compact, format_grouped, format_indicator, to_number, to_number_lenient};
pub use record::{to_records, Record};
pub use shape::{
    detect_shape, normalize, normalize_with, prune_zero_items, CanonicalRow, FinancialTable,
    TableShape, PLACEHOLDER_ITEM,
};
pub use statements::{load_statement, StatementKind, StatementPanel, StatementSet};

/// Parses one statement export and normalizes it for `symbol` with the
/// default year window.
pub fn normalize_statement(text: &str, symbol: &str) -> Result<FinancialTable> {
    normalize_statement_with(text, symbol, &NormalizeOptions::default())
}

pub fn normalize_statement_with(
    text: &str,
    symbol: &str,
    options: &NormalizeOptions,
) -> Result<FinancialTable> {
    load_statement(text, symbol, "statement", options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_to_end_wide_statement() {
        let csv = "Mã,Năm,Chỉ tiêu,2019,2020,2021\n\
                   VNM,2021,A. TÀI SẢN NGẮN HẠN,,,\n\
                   VNM,2021,Tiền,\"1,000\",\"1,200\",\"1,500\"\n\
                   VNM,2021,Dự phòng,0,0,0\n";

        let table = normalize_statement(csv, "VNM").unwrap();

        assert_eq!(table.shape, TableShape::Wide);
        assert_eq!(table.years, vec!["2020", "2021"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].kind, RowKind::Section);
        assert_eq!(table.rows[1].value("2021"), "1,500");
        assert_eq!(table.rows[1].number("2021"), 1500.0);
        assert!(table.row("Dự phòng").is_none());
    }

    #[test]
    fn test_unknown_symbol() {
        let csv = "Mã,Năm,Doanh thu\nAAA,2021,1\n";
        let result = normalize_statement(csv, "ZZZ");
        assert!(matches!(result, Err(StatementError::NoRowsForSymbol { .. })));
        assert!(result.unwrap_err().is_shape_error());
    }

    #[test]
    fn test_custom_window() {
        let csv = "Mã,Năm,Doanh thu\nAAA,2021,1\nAAA,2022,2\nAAA,2023,3\n";
        let options = NormalizeOptions {
            min_year: 2022,
            max_years: 1,
        };
        let table = normalize_statement_with(csv, "AAA", &options).unwrap();
        assert_eq!(table.years, vec!["2023"]);
    }
}
