use crate::config::{DashboardConfig, DatasetFiles, NormalizeOptions};
use crate::csv::parse_csv;
use crate::error::{Result, StatementError};
use crate::shape::{normalize_with, FinancialTable};
use log::{info, warn};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementKind {
    BalanceSheet,
    IncomeStatement,
    CashFlow,
}

impl StatementKind {
    pub const ALL: [StatementKind; 3] = [Self::BalanceSheet, Self::IncomeStatement, Self::CashFlow];

    pub fn title(self) -> &'static str {
        match self {
            Self::BalanceSheet => "Bảng cân đối kế toán",
            Self::IncomeStatement => "Báo cáo kết quả kinh doanh",
            Self::CashFlow => "Báo cáo lưu chuyển tiền tệ",
        }
    }

    pub fn file_name(self, files: &DatasetFiles) -> &str {
        match self {
            Self::BalanceSheet => &files.balance_sheet,
            Self::IncomeStatement => &files.income_statement,
            Self::CashFlow => &files.cash_flow,
        }
    }
}

/// Parses raw statement text and reduces it to canonical rows for `symbol`.
///
/// `source_name` only feeds the error raised for an empty file.
pub fn load_statement(
    text: &str,
    symbol: &str,
    source_name: &str,
    options: &NormalizeOptions,
) -> Result<FinancialTable> {
    let table = parse_csv(text).strip_headers();
    if table.headers.is_empty() || table.rows.is_empty() {
        return Err(StatementError::EmptyInput {
            source_name: source_name.to_string(),
        });
    }
    normalize_with(&table.headers, &table.rows, symbol, options)
}

/// Outcome of loading one statement. A failed statement carries the message
/// shown in place of its table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StatementPanel {
    Loaded(FinancialTable),
    Failed { message: String },
}

impl StatementPanel {
    pub fn from_result(kind: StatementKind, result: Result<FinancialTable>) -> Self {
        match result {
            Ok(table) => Self::Loaded(table),
            Err(e) => {
                warn!("{:?} could not be loaded: {}", kind, e);
                Self::Failed {
                    message: e.to_string(),
                }
            }
        }
    }

    pub fn table(&self) -> Option<&FinancialTable> {
        match self {
            Self::Loaded(table) => Some(table),
            Self::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Loaded(_) => None,
            Self::Failed { message } => Some(message),
        }
    }
}

/// The three statements for one symbol, each loaded independently.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatementSet {
    pub symbol: String,
    pub balance_sheet: StatementPanel,
    pub income_statement: StatementPanel,
    pub cash_flow: StatementPanel,
}

impl StatementSet {
    /// Builds the set from already-fetched texts; a fetch error only fails
    /// its own statement.
    pub fn from_sources(
        symbol: &str,
        options: &NormalizeOptions,
        balance_sheet: Result<String>,
        income_statement: Result<String>,
        cash_flow: Result<String>,
    ) -> Self {
        let build = |kind: StatementKind, source: Result<String>| {
            let result = source.and_then(|text| load_statement(&text, symbol, kind.title(), options));
            StatementPanel::from_result(kind, result)
        };

        let set = Self {
            symbol: symbol.trim().to_uppercase(),
            balance_sheet: build(StatementKind::BalanceSheet, balance_sheet),
            income_statement: build(StatementKind::IncomeStatement, income_statement),
            cash_flow: build(StatementKind::CashFlow, cash_flow),
        };
        info!(
            "Loaded statements for {}: {} of 3 succeeded",
            set.symbol,
            set.loaded_count()
        );
        set
    }

    /// Reads the three statement files from the configured data directory.
    pub fn load_from_dir(config: &DashboardConfig, symbol: &str) -> Self {
        let read = |kind: StatementKind| -> Result<String> {
            let path = config.dataset_path(kind.file_name(&config.files));
            Ok(std::fs::read_to_string(path)?)
        };
        Self::from_sources(
            symbol,
            &config.normalize,
            read(StatementKind::BalanceSheet),
            read(StatementKind::IncomeStatement),
            read(StatementKind::CashFlow),
        )
    }

    pub fn get(&self, kind: StatementKind) -> &StatementPanel {
        match kind {
            StatementKind::BalanceSheet => &self.balance_sheet,
            StatementKind::IncomeStatement => &self.income_statement,
            StatementKind::CashFlow => &self.cash_flow,
        }
    }

    pub fn loaded_count(&self) -> usize {
        StatementKind::ALL
            .iter()
            .filter(|kind| self.get(**kind).table().is_some())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BALANCE: &str = "Mã,Năm,Chỉ tiêu,Giá trị\nFPT,2021,A. TÀI SẢN,\nFPT,2021,Tiền,100\n";

    #[test]
    fn test_empty_file_is_reported() {
        let result = load_statement("", "FPT", "Balance_sheet.csv", &NormalizeOptions::default());
        assert!(matches!(result, Err(StatementError::EmptyInput { .. })));

        let header_only = load_statement("Mã,Năm\n", "FPT", "x", &NormalizeOptions::default());
        assert!(matches!(header_only, Err(StatementError::EmptyInput { .. })));
    }

    #[test]
    fn test_one_failure_does_not_block_others() {
        let set = StatementSet::from_sources(
            "fpt",
            &NormalizeOptions::default(),
            Ok(BALANCE.to_string()),
            Ok("Mã,Doanh thu\nFPT,1\n".to_string()),
            Err(StatementError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Cash_flow.csv",
            ))),
        );

        assert_eq!(set.symbol, "FPT");
        assert_eq!(set.loaded_count(), 1);
        let balance = set.balance_sheet.table().unwrap();
        assert_eq!(balance.years, vec!["2021".to_string()]);
        assert_eq!(balance.rows.len(), 2);
        assert_eq!(set.income_statement.error(), Some("No year column found"));
        assert!(set.cash_flow.error().unwrap().contains("Cash_flow.csv"));
    }

    #[test]
    fn test_panel_serializes_with_status_tag() {
        let panel = StatementPanel::Failed {
            message: "boom".to_string(),
        };
        let json = serde_json::to_value(&panel).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["message"], "boom");
    }
}
