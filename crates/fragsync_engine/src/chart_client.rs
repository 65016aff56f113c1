use std::sync::Arc;

use fragsync_core::charts::{
    revenue_change_query, BestSellersData, MonthSelection, RevenueChangeData,
    SalesVsExpensesData, BEST_SELLERS_PATH, REVENUE_CHANGE_PATH, SALES_VS_EXPENSES_PATH,
};
use fragsync_logging::sync_debug;
use serde::de::DeserializeOwned;
use url::Url;

use crate::fetch::{FetchSettings, Fetcher, ReqwestFetcher};
use crate::{FetchError, SyncError};

/// Loads the dashboard chart payloads.
pub struct ChartClient {
    fetcher: Arc<dyn Fetcher>,
    base_url: Url,
}

impl ChartClient {
    pub fn new(fetcher: Arc<dyn Fetcher>, base_url: Url) -> Self {
        Self { fetcher, base_url }
    }

    /// Client over HTTP. `settings` keeps its timeouts, limits and headers;
    /// accepted content switches to JSON.
    pub fn over_http(settings: FetchSettings, base_url: Url) -> Result<Self, FetchError> {
        let json = FetchSettings::json();
        let settings = FetchSettings {
            accept: json.accept,
            allowed_content_types: json.allowed_content_types,
            ..settings
        };
        Ok(Self::new(Arc::new(ReqwestFetcher::new(settings)?), base_url))
    }

    pub async fn sales_vs_expenses(&self) -> Result<SalesVsExpensesData, SyncError> {
        self.get_json(SALES_VS_EXPENSES_PATH).await
    }

    pub async fn best_sellers(&self) -> Result<BestSellersData, SyncError> {
        self.get_json(BEST_SELLERS_PATH).await
    }

    pub async fn revenue_change(
        &self,
        year: &str,
        month: MonthSelection,
    ) -> Result<RevenueChangeData, SyncError> {
        let path = format!("{REVENUE_CHANGE_PATH}?{}", revenue_change_query(year, month));
        self.get_json(&path).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, SyncError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|err| SyncError::InvalidPath {
                path: path.to_string(),
                message: err.to_string(),
            })?;
        sync_debug!("Loading chart data from {url}");
        let output = self.fetcher.fetch(url.as_str()).await?;
        Ok(serde_json::from_slice(&output.bytes)?)
    }
}
