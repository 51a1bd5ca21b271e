use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Sessions averaged when grading manipulation risk.
pub const RISK_AVERAGE_WINDOW: usize = 180;

/// Score at or above which the backend raises an alert.
pub const ALERT_THRESHOLD: f64 = 8.0;

const TREND_DEAD_BAND: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DiagnoseRequest {
    pub symbol: String,
}

impl DiagnoseRequest {
    #[must_use]
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into().trim().to_uppercase(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DiagnoseResponse {
    pub answer: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RiskContext {
    pub close: Option<f64>,
    pub volume: Option<f64>,
    pub turnover: Option<f64>,
    pub mkt_cap: Option<f64>,
}

/// Latest manipulation-risk reading for a ticker. When the backend has no
/// data it returns only `ticker` and `message`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RiskScore {
    pub ticker: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub risk_0_10: Option<f64>,
    #[serde(default)]
    pub alert: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<RiskContext>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RiskScore {
    pub fn has_data(&self) -> bool {
        self.risk_0_10.is_some()
    }

    /// The backend flag, or a score at or above [`ALERT_THRESHOLD`].
    pub fn is_alert(&self) -> bool {
        self.alert || self.risk_0_10.is_some_and(|r| r >= ALERT_THRESHOLD)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct HistoryPoint {
    pub date: NaiveDate,
    pub risk_0_10: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RiskHistory {
    pub ticker: String,
    #[serde(default)]
    pub history: Vec<HistoryPoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, JsonSchema)]
pub struct RiskAverage {
    pub value: f64,
    pub period_days: usize,
    pub latest: f64,
}

impl RiskHistory {
    /// Mean score over the last [`RISK_AVERAGE_WINDOW`] sessions.
    pub fn average(&self) -> Option<RiskAverage> {
        let latest = self.history.last()?.risk_0_10;
        let start = self.history.len().saturating_sub(RISK_AVERAGE_WINDOW);
        let recent = &self.history[start..];
        let sum: f64 = recent.iter().map(|p| p.risk_0_10).sum();
        Some(RiskAverage {
            value: sum / recent.len() as f64,
            period_days: recent.len(),
            latest,
        })
    }

    pub fn trend(&self) -> RiskTrend {
        RiskTrend::from_history(&self.history)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RiskSeverity {
    Safe,
    Caution,
    Warning,
    Danger,
    Critical,
}

impl RiskSeverity {
    pub fn from_score(score: f64) -> Self {
        if score >= 9.0 {
            Self::Critical
        } else if score >= 8.0 {
            Self::Danger
        } else if score >= 6.0 {
            Self::Warning
        } else if score >= 4.0 {
            Self::Caution
        } else {
            Self::Safe
        }
    }

    /// Graded on the history average when there is history, else on the
    /// point score, else as 0.
    pub fn assess(score: Option<&RiskScore>, history: &RiskHistory) -> Self {
        let value = history
            .average()
            .map(|avg| avg.value)
            .or_else(|| score.and_then(|s| s.risk_0_10))
            .unwrap_or(0.0);
        Self::from_score(value)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Critical => "CỰC KỲ NGUY HIỂM",
            Self::Danger => "RỦI RO CAO",
            Self::Warning => "RỦI RO TRUNG BÌNH",
            Self::Caution => "RỦI RO THẤP",
            Self::Safe => "AN TOÀN",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Critical => "Phát hiện dấu hiệu thao túng rõ ràng. Tránh giao dịch ngay!",
            Self::Danger => "Hành vi bất thường cao. Cần cảnh giác khi giao dịch.",
            Self::Warning => "Có một số dấu hiệu bất thường. Theo dõi chặt chẽ.",
            Self::Caution => "Giao dịch tương đối bình thường.",
            Self::Safe => "Không phát hiện dấu hiệu thao túng.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Up,
    Down,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, JsonSchema)]
pub struct RiskTrend {
    pub direction: TrendDirection,
    pub change: f64,
}

impl RiskTrend {
    /// Change between the last two sessions; moves within half a point are
    /// neutral.
    pub fn from_history(history: &[HistoryPoint]) -> Self {
        let change = match history {
            [.., previous, last] => last.risk_0_10 - previous.risk_0_10,
            _ => 0.0,
        };
        let direction = if change > TREND_DEAD_BAND {
            TrendDirection::Up
        } else if change < -TREND_DEAD_BAND {
            TrendDirection::Down
        } else {
            TrendDirection::Neutral
        };
        Self { direction, change }
    }
}

static SECTION_HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d+\.|^[A-Z][^:]*:$|^#+\s").expect("valid section heading pattern")
});

static MARKDOWN_HASHES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#+\s").expect("valid markdown heading pattern"));

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, JsonSchema)]
pub struct AnswerSection {
    pub title: String,
    pub content: Vec<String>,
}

/// Splits a diagnosis answer into titled sections. Numbered lines, markdown
/// headings, and capitalised lines ending in `:` start a section; a heading
/// with no lines under it is dropped.
pub fn split_sections(answer: &str) -> Vec<AnswerSection> {
    let mut sections = Vec::new();
    let mut current = AnswerSection::default();

    for line in answer.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if SECTION_HEADING.is_match(line) {
            let finished = std::mem::take(&mut current);
            if !finished.content.is_empty() {
                sections.push(finished);
            }
            let title = MARKDOWN_HASHES.replace(line, "");
            let title: &str = &title;
            current.title = title.strip_suffix(':').unwrap_or(title).to_string();
        } else {
            current.content.push(line.to_string());
        }
    }

    if !current.content.is_empty() {
        sections.push(current);
    }
    sections
}
