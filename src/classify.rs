use once_cell::sync::Lazy;
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Display classification of a statement line label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RowKind {
    #[schemars(description = "Top-level heading such as 'A. TÀI SẢN NGẮN HẠN' or 'II. Nợ dài hạn'")]
    Section,

    #[schemars(description = "Numbered heading such as '1.2 Phải thu ngắn hạn'")]
    Subsection,

    #[schemars(description = "Plain line item; dropped when every selected year is zero")]
    Item,
}

static LETTER_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-ZĐĂÂÊÔƠƯ]\s*[.)]").expect("valid letter heading pattern"));

static ROMAN_HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:I|II|III|IV|V|VI|VII|VIII|IX|X)\s*[.)]").expect("valid roman heading pattern")
});

static NUMBERED_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+(?:\.[0-9]+)*\s*[.)]?").expect("valid numbered pattern"));

static FIXED_ASSET_RESIDUAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^|\s)(gtcl|giá trị còn lại)\b").expect("valid residual pattern"));

static FIXED_ASSET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(tscđ|tscd|tài sản cố định)").expect("valid fixed asset pattern"));

static UNDISTRIBUTED_PROFIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^lnst chưa phân phối\b").expect("valid profit pattern"));

fn is_label_letter(c: char) -> bool {
    c.is_ascii_alphabetic() || ('\u{C0}'..='\u{1EF9}').contains(&c) || c == 'Đ' || c == 'đ'
}

/// Labels the trimmed text as a section, subsection or plain item.
///
/// Section patterns are always tried first, so "I. Tiền" is a section even
/// though it could also read as a numbered heading in another locale.
pub fn classify(label: &str) -> RowKind {
    let s = label.trim();

    if LETTER_HEADING.is_match(s) || ROMAN_HEADING.is_match(s) {
        return RowKind::Section;
    }

    let has_letters = s.chars().any(is_label_letter);
    if has_letters && s == s.to_uppercase() {
        return RowKind::Section;
    }

    if NUMBERED_HEADING.is_match(s) {
        return RowKind::Subsection;
    }

    RowKind::Item
}

impl RowKind {
    pub fn is_item(self) -> bool {
        self == Self::Item
    }

    /// Indentation depth used by the statement table: 0 for sections, 1 for
    /// subsections, 2 for items, and 3 for a couple of detail lines that sit
    /// under an item.
    pub fn indent_level(self, label: &str) -> usize {
        let base = match self {
            Self::Section => 0,
            Self::Subsection => 1,
            Self::Item => 2,
        };

        let s = label.trim().to_lowercase();
        if FIXED_ASSET_RESIDUAL.is_match(&s) && FIXED_ASSET.is_match(&s) {
            return 3;
        }
        if UNDISTRIBUTED_PROFIT.is_match(&s) {
            return 3;
        }
        base
    }
}
