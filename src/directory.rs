use crate::columns::{pick_role, ColumnRole};
use crate::csv::parse_csv;
use crate::error::{Result, SearchError, StatementError};
use crate::record::Record;
use log::debug;
use std::collections::BTreeSet;

const HIDDEN_FIELDS: &[&str] = &["", "RIC", "Hist.", "Full Name"];

const FIELD_LABELS: &[(&str, &str)] = &[
    ("Name", "TÊN CÔNG TY"),
    ("Symbol", "MÃ CỔ PHIẾU"),
    ("Start Date", "NGÀY CÔNG BỐ"),
    ("Category", "PHÂN LOẠI"),
    ("Exchange", "SÀN"),
    ("Market", "THỊ TRƯỜNG"),
    ("Currency", "ĐƠN VỊ TIỀN TỆ"),
    ("Sector", "NGÀNH"),
    ("Activity", "TÌNH TRẠNG HOẠT ĐỘNG"),
];

fn same_text(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

/// Company metadata from the stock info export, searchable by exchange and symbol.
#[derive(Debug, Clone, Default)]
pub struct CompanyDirectory {
    headers: Vec<String>,
    records: Vec<Record>,
    symbol_column: Option<String>,
    exchange_column: Option<String>,
    name_column: Option<String>,
}

impl CompanyDirectory {
    pub fn from_text(text: &str) -> Self {
        let table = parse_csv(text);
        let symbol_column = pick_role(&table.headers, ColumnRole::Symbol).map(str::to_string);
        let exchange_column = pick_role(&table.headers, ColumnRole::Exchange).map(str::to_string);
        let name_column = pick_role(&table.headers, ColumnRole::Name).map(str::to_string);
        let records = table.records();

        debug!(
            "Company directory: {} records, symbol={:?} exchange={:?} name={:?}",
            records.len(),
            symbol_column,
            exchange_column,
            name_column
        );

        Self {
            headers: table.headers,
            records,
            symbol_column,
            exchange_column,
            name_column,
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn symbol_column(&self) -> Option<&str> {
        self.symbol_column.as_deref()
    }

    pub fn exchange_column(&self) -> Option<&str> {
        self.exchange_column.as_deref()
    }

    pub fn name_column(&self) -> Option<&str> {
        self.name_column.as_deref()
    }

    /// Distinct non-empty exchange names, sorted.
    pub fn exchanges(&self) -> Vec<String> {
        let Some(column) = self.exchange_column.as_deref() else {
            return Vec::new();
        };
        self.records
            .iter()
            .map(|r| r.get(column).trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    fn is_on_exchange(&self, record: &Record, exchange: &str) -> bool {
        match self.exchange_column.as_deref() {
            Some(column) => same_text(record.get(column), exchange),
            None => true,
        }
    }

    /// Distinct symbols listed on `exchange`, sorted.
    pub fn suggestions(&self, exchange: &str) -> Vec<String> {
        let Some(symbol_column) = self.symbol_column.as_deref() else {
            return Vec::new();
        };
        if exchange.trim().is_empty() {
            return Vec::new();
        }
        self.records
            .iter()
            .filter(|r| self.is_on_exchange(r, exchange))
            .map(|r| r.get(symbol_column).trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Suggestions narrowed to those containing `typed` (case-insensitive).
    pub fn filter_suggestions(&self, exchange: &str, typed: &str) -> Vec<String> {
        let needle = typed.to_lowercase();
        self.suggestions(exchange)
            .into_iter()
            .filter(|s| s.to_lowercase().contains(&needle))
            .collect()
    }

    /// Looks up the company row for `query` on `exchange`.
    pub fn find(&self, exchange: &str, query: &str) -> Result<&Record> {
        if exchange.trim().is_empty() {
            return Err(SearchError::MissingExchange.into());
        }
        if query.trim().is_empty() {
            return Err(SearchError::MissingSymbol.into());
        }
        let symbol_column = match self.symbol_column.as_deref() {
            Some(column) if !self.records.is_empty() => column,
            _ => return Err(SearchError::NotReady.into()),
        };

        self.records
            .iter()
            .filter(|r| self.is_on_exchange(r, exchange))
            .find(|r| same_text(r.get(symbol_column), query))
            .ok_or_else(|| {
                SearchError::NotFound {
                    symbol: query.to_string(),
                    exchange: exchange.to_string(),
                }
                .into()
            })
    }

    /// Sector of `symbol`, read from the first row whose symbol matches.
    pub fn sector_of(&self, symbol: &str) -> Result<Option<String>> {
        let column = self
            .symbol_column
            .as_deref()
            .ok_or_else(|| StatementError::MissingColumn {
                role: ColumnRole::Symbol.label().to_string(),
            })?;
        let wanted = symbol.trim().to_uppercase();
        Ok(self
            .records
            .iter()
            .find(|r| r.get(column).trim().to_uppercase() == wanted)
            .map(|r| r.get_any(&["Sector", "Ngành"]).to_string())
            .filter(|s| !s.is_empty()))
    }

    pub fn display_name<'a>(&self, record: &'a Record) -> &'a str {
        match self.name_column.as_deref() {
            Some(column) => record.get(column),
            None => "",
        }
    }
}

pub fn field_label(header: &str) -> &str {
    FIELD_LABELS
        .iter()
        .find(|(source, _)| *source == header)
        .map(|(_, label)| *label)
        .unwrap_or(header)
}

/// `(label, value)` pairs of a company row for the detail card, with
/// internal columns hidden and empty values shown as `-`.
pub fn visible_fields(record: &Record) -> Vec<(String, String)> {
    record
        .iter()
        .filter(|(header, _)| !HIDDEN_FIELDS.contains(&header.trim()))
        .map(|(header, value)| {
            let value = if value.is_empty() { "-" } else { value };
            (field_label(header).to_string(), value.to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const STOCK_INFO: &str = "RIC,Name,Symbol,Exchange,Sector,Full Name\n\
        FPT.HM,FPT Corp,FPT,HOSE,Technology,FPT Corporation\n\
        VNM.HM,Vinamilk,VNM,HOSE,Consumer,\n\
        SHS.HN,Saigon Hanoi Sec,SHS,HNX,Financials,\n\
        FPT.HN,FPT dup,fpt,HNX,Technology,\n";

    #[test]
    fn test_columns_resolved() {
        let dir = CompanyDirectory::from_text(STOCK_INFO);
        assert_eq!(dir.symbol_column(), Some("Symbol"));
        assert_eq!(dir.exchange_column(), Some("Exchange"));
        assert_eq!(dir.name_column(), Some("Name"));
    }

    #[test]
    fn test_exchanges_and_suggestions() {
        let dir = CompanyDirectory::from_text(STOCK_INFO);
        assert_eq!(dir.exchanges(), vec!["HNX", "HOSE"]);
        assert_eq!(dir.suggestions("hose"), vec!["FPT", "VNM"]);
        assert_eq!(dir.suggestions("HNX"), vec!["SHS", "fpt"]);
        assert_eq!(dir.filter_suggestions("HOSE", "v"), vec!["VNM"]);
        assert!(dir.suggestions("").is_empty());
    }

    #[test]
    fn test_find_validates_input() {
        let dir = CompanyDirectory::from_text(STOCK_INFO);
        assert!(matches!(
            dir.find("", "FPT"),
            Err(StatementError::Search(SearchError::MissingExchange))
        ));
        assert!(matches!(
            dir.find("HOSE", " "),
            Err(StatementError::Search(SearchError::MissingSymbol))
        ));
        assert!(matches!(
            dir.find("HOSE", "SHS"),
            Err(StatementError::Search(SearchError::NotFound { .. }))
        ));

        let empty = CompanyDirectory::from_text("");
        assert!(matches!(
            empty.find("HOSE", "FPT"),
            Err(StatementError::Search(SearchError::NotReady))
        ));
    }

    #[test]
    fn test_find_is_case_insensitive_per_exchange() {
        let dir = CompanyDirectory::from_text(STOCK_INFO);
        let record = dir.find("hnx", "FPT").unwrap();
        assert_eq!(dir.display_name(record), "FPT dup");
    }

    #[test]
    fn test_sector_lookup() {
        let dir = CompanyDirectory::from_text(STOCK_INFO);
        assert_eq!(dir.sector_of("vnm").unwrap().as_deref(), Some("Consumer"));
        assert_eq!(dir.sector_of("XYZ").unwrap(), None);
    }

    #[test]
    fn test_visible_fields_hide_internal_columns() {
        let dir = CompanyDirectory::from_text(STOCK_INFO);
        let record = dir.find("HOSE", "VNM").unwrap();
        let fields = visible_fields(record);
        let labels: Vec<&str> = fields.iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(labels, vec!["TÊN CÔNG TY", "MÃ CỔ PHIẾU", "SÀN", "NGÀNH"]);
        assert_eq!(fields[0].1, "Vinamilk");
    }
}
