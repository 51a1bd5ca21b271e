use crate::api::types::{DiagnoseRequest, DiagnoseResponse, RiskHistory, RiskScore};
use crate::config::{DashboardConfig, DatasetFiles, NormalizeOptions};
use crate::error::{Result, StatementError};
use crate::statements::{StatementKind, StatementSet};
use futures::future::join3;
use log::{debug, info};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

const DEFAULT_HISTORY_DAYS: u32 = 180;

/// Client for the analysis backend and the static dataset host.
#[derive(Clone)]
pub struct DashboardClient {
    client: Client,
    api_base_url: String,
    dataset_base_url: String,
    files: DatasetFiles,
    normalize: NormalizeOptions,
}

impl DashboardClient {
    /// Datasets are fetched from the API base until
    /// [`DashboardClient::with_dataset_base_url`] points elsewhere.
    pub fn new(config: &DashboardConfig) -> Self {
        let api_base_url = config.api_base_url.trim_end_matches('/').to_string();
        Self {
            client: Client::new(),
            dataset_base_url: api_base_url.clone(),
            api_base_url,
            files: config.files.clone(),
            normalize: config.normalize,
        }
    }

    #[must_use]
    pub fn with_dataset_base_url(mut self, url: impl Into<String>) -> Self {
        self.dataset_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    async fn check(endpoint: &str, res: Response) -> Result<Response> {
        let status = res.status();
        if status.is_success() {
            return Ok(res);
        }
        let body = res.text().await.unwrap_or_default();
        Err(StatementError::Api {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
            body,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}{}", self.api_base_url, endpoint);
        debug!("GET {} {:?}", url, query);
        let res = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .query(query)
            .send()
            .await?;
        Ok(Self::check(endpoint, res).await?.json().await?)
    }

    /// Asks the backend for a narrative diagnosis of `symbol`.
    pub async fn diagnose(&self, symbol: &str) -> Result<DiagnoseResponse> {
        let endpoint = "/ai/diagnose";
        let payload = DiagnoseRequest::new(symbol);
        let url = format!("{}{}", self.api_base_url, endpoint);
        info!("Requesting diagnosis for {}", payload.symbol);

        let res = self.client.post(&url).json(&payload).send().await?;
        Ok(Self::check(endpoint, res).await?.json().await?)
    }

    pub async fn risk_score(&self, ticker: &str) -> Result<RiskScore> {
        let ticker = ticker.trim().to_uppercase();
        self.get_json("/risk/score", &[("ticker", ticker)]).await
    }

    pub async fn risk_history(&self, ticker: &str, days: Option<u32>) -> Result<RiskHistory> {
        let ticker = ticker.trim().to_uppercase();
        let days = days.unwrap_or(DEFAULT_HISTORY_DAYS).to_string();
        self.get_json("/risk/history", &[("ticker", ticker), ("days", days)])
            .await
    }

    /// Fetches a dataset file relative to the dataset base URL.
    pub async fn fetch_text(&self, path: &str) -> Result<String> {
        let url = format!("{}/{}", self.dataset_base_url, path.trim_start_matches('/'));
        debug!("GET {}", url);
        let res = self.client.get(&url).send().await?;
        Ok(Self::check(path, res).await?.text().await?)
    }

    /// Fetches the three statements concurrently; each one succeeds or fails
    /// on its own.
    pub async fn load_statements(&self, symbol: &str) -> StatementSet {
        let file = |kind: StatementKind| kind.file_name(&self.files);

        let (balance_sheet, income_statement, cash_flow) = join3(
            self.fetch_text(file(StatementKind::BalanceSheet)),
            self.fetch_text(file(StatementKind::IncomeStatement)),
            self.fetch_text(file(StatementKind::CashFlow)),
        )
        .await;

        StatementSet::from_sources(
            symbol,
            &self.normalize,
            balance_sheet,
            income_statement,
            cash_flow,
        )
    }
}
