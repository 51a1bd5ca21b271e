//! Derived company metrics for the analysis charts. Everything here is a pure
//! function of the yearly series, recomputed whenever the inputs change.

use crate::indicators::YearSeries;
use schemars::JsonSchema;
use serde::Serialize;

pub const NET_REVENUE: &str = "Doanh thu thuần";
pub const PARENT_NET_PROFIT: &str = "Cổ đông của Công ty mẹ";
pub const OPERATING_CASH_FLOW: &str =
    "Lưu chuyển tiền tệ ròng từ các hoạt động sản xuất kinh doanh (TT)";
pub const DIVIDENDS_PAID: &str = "Cổ tức đã trả (TT)";
pub const SHORT_TERM_DEBT: &str = "Nợ ngắn hạn";
pub const LONG_TERM_DEBT: &str = "Nợ dài hạn";
pub const ROE: &str = "ROE (%)";
pub const PRICE_EARNINGS: &str = "P/E";
pub const GROSS_MARGIN: &str = "Biên lợi nhuận gộp";
pub const DEBT_TO_EQUITY: &str = "Nợ / Vốn chủ sở hữu (DE)";
pub const CURRENT_RATIO: &str = "Thanh khoản hiện hành";

const MAX_SANE_PE: f64 = 1000.0;

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct GrowthPoint {
    pub year: i32,
    pub revenue: f64,
    /// Year-over-year change in percent; absent for the first year or when
    /// the previous revenue was not positive.
    pub growth_pct: Option<f64>,
}

pub fn revenue_growth(income: &YearSeries) -> Vec<GrowthPoint> {
    let revenues = income.column(NET_REVENUE);
    revenues
        .iter()
        .enumerate()
        .map(|(i, &(year, revenue))| {
            let growth_pct = i
                .checked_sub(1)
                .map(|prev| revenues[prev].1)
                .filter(|prev| *prev > 0.0)
                .map(|prev| (revenue - prev) / prev * 100.0);
            GrowthPoint {
                year,
                revenue,
                growth_pct,
            }
        })
        .collect()
}

/// Growth of the last year over the one before, or `None` with fewer than two
/// years. A non-positive base year counts as zero growth.
pub fn latest_growth(income: &YearSeries) -> Option<f64> {
    let revenues = income.column(NET_REVENUE);
    let [.., (_, previous), (_, current)] = revenues.as_slice() else {
        return None;
    };
    if *previous > 0.0 {
        Some((current - previous) / previous * 100.0)
    } else {
        Some(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum GrowthVerdict {
    Strong,
    MarginSqueeze,
    Declining,
    Stable,
}

impl GrowthVerdict {
    pub fn classify(growth: f64, previous_margin: f64, latest_margin: f64) -> Self {
        if growth > 10.0 && latest_margin >= previous_margin {
            Self::Strong
        } else if growth > 0.0 && latest_margin < previous_margin {
            Self::MarginSqueeze
        } else if growth < 0.0 {
            Self::Declining
        } else {
            Self::Stable
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::Strong => "Công ty đang có tốc độ tăng trưởng doanh thu mạnh mẽ và duy trì được biên lợi nhuận gộp.",
            Self::MarginSqueeze => "Doanh thu đang tăng nhưng biên lợi nhuận gộp giảm, cần theo dõi cấu trúc chi phí.",
            Self::Declining => "Doanh thu đang sụt giảm, cần xem xét chiến lược kinh doanh.",
            Self::Stable => "Tăng trưởng ổn định, cần theo dõi xu hướng dài hạn.",
        }
    }
}

/// Verdict from the latest revenue growth and the last two gross margins.
pub fn growth_verdict(income: &YearSeries, indicators: &YearSeries) -> Option<GrowthVerdict> {
    let growth = latest_growth(income)?;
    let margins = indicators.column(GROSS_MARGIN);
    let latest = margins.last().map(|m| m.1).unwrap_or(0.0);
    let previous = margins
        .len()
        .checked_sub(2)
        .map(|i| margins[i].1)
        .unwrap_or(0.0);
    Some(GrowthVerdict::classify(growth, previous, latest))
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct RoeComparison {
    pub year: i32,
    pub company: f64,
    pub sector: f64,
    pub delta: f64,
}

/// Company ROE against the sector average for each company year. A year the
/// sector file lacks compares against 0.
pub fn roe_vs_sector(indicators: &YearSeries, sector: &YearSeries) -> Vec<RoeComparison> {
    indicators
        .column(ROE)
        .into_iter()
        .map(|(year, company)| {
            let sector = sector.value(year, ROE);
            RoeComparison {
                year,
                company,
                sector,
                delta: company - sector,
            }
        })
        .collect()
}

/// Mean of the positive ROE readings; 0 when there are none.
pub fn average_roe(indicators: &YearSeries) -> f64 {
    let positive: Vec<f64> = indicators
        .column(ROE)
        .into_iter()
        .map(|(_, v)| v)
        .filter(|v| *v > 0.0)
        .collect();
    mean(&positive).unwrap_or(0.0)
}

pub fn years_beating_sector(comparisons: &[RoeComparison]) -> usize {
    comparisons.iter().filter(|c| c.delta > 0.0).count()
}

pub fn average_roe_delta(comparisons: &[RoeComparison]) -> Option<f64> {
    let deltas: Vec<f64> = comparisons.iter().map(|c| c.delta).collect();
    mean(&deltas)
}

fn latest_year(indicators: &YearSeries) -> Option<i32> {
    indicators.years().last().copied()
}

/// Operating cash flow over parent net profit in percent for the latest
/// indicator year. `None` when net profit is zero.
pub fn cash_flow_quality(
    indicators: &YearSeries,
    income: &YearSeries,
    cash_flow: &YearSeries,
) -> Option<f64> {
    let year = latest_year(indicators)?;
    let net_profit = income.value(year, PARENT_NET_PROFIT);
    if net_profit == 0.0 {
        return None;
    }
    Some(cash_flow.value(year, OPERATING_CASH_FLOW) / net_profit * 100.0)
}

/// Dividends paid (sign dropped) over parent net profit in percent for the
/// latest indicator year.
pub fn payout_ratio(
    indicators: &YearSeries,
    income: &YearSeries,
    cash_flow: &YearSeries,
) -> Option<f64> {
    let year = latest_year(indicators)?;
    let net_profit = income.value(year, PARENT_NET_PROFIT);
    if net_profit == 0.0 {
        return None;
    }
    Some(cash_flow.value(year, DIVIDENDS_PAID).abs() / net_profit * 100.0)
}

/// Compound annual growth of dividends paid between the first and last
/// indicator years. `None` with fewer than two years or a zero endpoint.
pub fn dividend_cagr(indicators: &YearSeries, cash_flow: &YearSeries) -> Option<f64> {
    let years = indicators.years();
    let (first, last) = match years.as_slice() {
        [first, .., last] => (*first, *last),
        _ => return None,
    };
    let first_div = cash_flow.value(first, DIVIDENDS_PAID).abs();
    let last_div = cash_flow.value(last, DIVIDENDS_PAID).abs();
    if first_div == 0.0 || last_div == 0.0 {
        return None;
    }
    let periods = (years.len() - 1) as f64;
    Some(((last_div / first_div).powf(1.0 / periods) - 1.0) * 100.0)
}

fn sane_pe(pe: f64) -> Option<f64> {
    (pe > 0.0 && pe < MAX_SANE_PE).then_some(pe)
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct ValuationPoint {
    pub year: i32,
    pub company_pe: Option<f64>,
    pub sector_pe: Option<f64>,
    pub historical_avg_pe: Option<f64>,
}

/// P/E per year with outliers (non-positive or 1000+) dropped, plus the
/// company's average P/E over the kept years.
pub fn valuation_series(indicators: &YearSeries, sector: &YearSeries) -> Vec<ValuationPoint> {
    let points: Vec<(i32, Option<f64>, Option<f64>)> = indicators
        .column(PRICE_EARNINGS)
        .into_iter()
        .map(|(year, pe)| (year, sane_pe(pe), sane_pe(sector.value(year, PRICE_EARNINGS))))
        .collect();

    let kept: Vec<f64> = points.iter().filter_map(|p| p.1).collect();
    let historical_avg_pe = mean(&kept);

    points
        .into_iter()
        .map(|(year, company_pe, sector_pe)| ValuationPoint {
            year,
            company_pe,
            sector_pe,
            historical_avg_pe,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct DebtStructure {
    pub year: i32,
    pub short_term: f64,
    pub long_term: f64,
    pub short_term_pct: f64,
    pub long_term_pct: f64,
}

/// Short/long-term debt split of the latest balance sheet year; `None` when
/// there is no balance data or no debt.
pub fn debt_structure(balance: &YearSeries) -> Option<DebtStructure> {
    let year = *balance.years().last()?;
    let short_term = balance.value(year, SHORT_TERM_DEBT);
    let long_term = balance.value(year, LONG_TERM_DEBT);
    let total = short_term + long_term;
    if total <= 0.0 {
        return None;
    }
    Some(DebtStructure {
        year,
        short_term,
        long_term,
        short_term_pct: short_term / total * 100.0,
        long_term_pct: long_term / total * 100.0,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FinancialHealth {
    Excellent,
    Good,
    Acceptable,
    Alert,
}

impl FinancialHealth {
    pub fn classify(debt_to_equity: f64, current_ratio: f64) -> Self {
        if debt_to_equity < 1.0 && current_ratio >= 2.0 {
            Self::Excellent
        } else if debt_to_equity < 1.5 && current_ratio >= 1.5 {
            Self::Good
        } else if debt_to_equity < 2.0 && current_ratio >= 1.0 {
            Self::Acceptable
        } else {
            Self::Alert
        }
    }
}

/// Health from the latest debt-to-equity and current ratio readings.
pub fn financial_health(indicators: &YearSeries) -> Option<FinancialHealth> {
    let debt_to_equity = indicators.latest_value(DEBT_TO_EQUITY)?;
    let current_ratio = indicators.latest_value(CURRENT_RATIO)?;
    Some(FinancialHealth::classify(debt_to_equity, current_ratio))
}

/// Change in debt-to-equity from the first to the last year; negative means
/// the company is deleveraging.
pub fn debt_to_equity_change(indicators: &YearSeries) -> Option<f64> {
    let values = indicators.column(DEBT_TO_EQUITY);
    match values.as_slice() {
        [(_, first), .., (_, last)] => Some(last - first),
        _ => None,
    }
}
