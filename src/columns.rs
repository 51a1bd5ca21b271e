use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Semantic role a header can play in an exported table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    Symbol,
    Exchange,
    Year,
    Value,
    Item,
    Name,
}

const SYMBOL_ALIASES: &[&str] = &["mã", "ma", "symbol", "ticker"];
const EXCHANGE_ALIASES: &[&str] = &["exchange", "sàn", "san"];
const YEAR_ALIASES: &[&str] = &["năm", "year", "nam"];
const VALUE_ALIASES: &[&str] = &[
    "value", "amount", "giá trị", "gia tri", "số tiền", "so tien", "vnd", "đồng", "dong",
];
const ITEM_ALIASES: &[&str] = &[
    "item",
    "line item",
    "account",
    "chỉ tiêu",
    "chi tieu",
    "khoản mục",
    "khoan muc",
];
const NAME_ALIASES: &[&str] = &["name", "full name", "tên", "ten"];

impl ColumnRole {
    /// Lowercase substrings that identify a header as this role.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::Symbol => SYMBOL_ALIASES,
            Self::Exchange => EXCHANGE_ALIASES,
            Self::Year => YEAR_ALIASES,
            Self::Value => VALUE_ALIASES,
            Self::Item => ITEM_ALIASES,
            Self::Name => NAME_ALIASES,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Symbol => "symbol",
            Self::Exchange => "exchange",
            Self::Year => "year",
            Self::Value => "value",
            Self::Item => "item",
            Self::Name => "name",
        }
    }
}

pub fn normalize_header(header: &str) -> String {
    header.trim().to_lowercase()
}

/// First header (by position) whose trimmed, lowercased text contains any alias.
pub fn pick_column<'a, S: AsRef<str>>(headers: &'a [S], aliases: &[&str]) -> Option<&'a str> {
    headers
        .iter()
        .map(AsRef::as_ref)
        .find(|header| {
            let normalized = normalize_header(header);
            aliases.iter().any(|alias| normalized.contains(alias))
        })
}

pub fn pick_role<S: AsRef<str>>(headers: &[S], role: ColumnRole) -> Option<&str> {
    pick_column(headers, role.aliases())
}

/// Header names resolved once per loaded file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRoles {
    pub symbol: Option<String>,
    pub exchange: Option<String>,
    pub year: Option<String>,
    pub value: Option<String>,
    pub item: Option<String>,
}

impl ColumnRoles {
    pub fn resolve<S: AsRef<str>>(headers: &[S]) -> Self {
        let pick = |role| pick_role(headers, role).map(str::to_string);
        Self {
            symbol: pick(ColumnRole::Symbol),
            exchange: pick(ColumnRole::Exchange),
            year: pick(ColumnRole::Year),
            value: pick(ColumnRole::Value),
            item: pick(ColumnRole::Item),
        }
    }

    pub fn get(&self, role: ColumnRole) -> Option<&str> {
        match role {
            ColumnRole::Symbol => self.symbol.as_deref(),
            ColumnRole::Exchange => self.exchange.as_deref(),
            ColumnRole::Year => self.year.as_deref(),
            ColumnRole::Value => self.value.as_deref(),
            ColumnRole::Item => self.item.as_deref(),
            ColumnRole::Name => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_match_by_position_wins() {
        let headers = ["Symbol", "Ticker"];
        assert_eq!(pick_column(&headers, &["symbol", "ticker"]), Some("Symbol"));

        let reversed = ["Ticker", "Symbol"];
        assert_eq!(pick_column(&reversed, &["symbol", "ticker"]), Some("Ticker"));
    }

    #[test]
    fn test_substring_and_case_insensitive() {
        let headers = ["  Năm Tài Chính ", "Giá trị (VND)"];
        assert_eq!(pick_role(&headers, ColumnRole::Year), Some("  Năm Tài Chính "));
        assert_eq!(pick_role(&headers, ColumnRole::Value), Some("Giá trị (VND)"));
        assert_eq!(pick_role(&headers, ColumnRole::Item), None);
    }

    #[test]
    fn test_resolve_roles() {
        let headers = vec![
            "Mã".to_string(),
            "Sàn".to_string(),
            "Year".to_string(),
            "Amount".to_string(),
            "Line Item".to_string(),
        ];
        let roles = ColumnRoles::resolve(&headers);
        assert_eq!(roles.symbol.as_deref(), Some("Mã"));
        assert_eq!(roles.exchange.as_deref(), Some("Sàn"));
        assert_eq!(roles.year.as_deref(), Some("Year"));
        assert_eq!(roles.value.as_deref(), Some("Amount"));
        assert_eq!(roles.item.as_deref(), Some("Line Item"));
        assert_eq!(roles.get(ColumnRole::Name), None);
    }

    #[test]
    fn test_no_match_is_none() {
        let headers: [&str; 0] = [];
        assert_eq!(pick_role(&headers, ColumnRole::Symbol), None);
    }
}
