use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};
use fragsync_core::charts::{
    best_sellers_view, default_selection, format_peso, revenue_view, sales_vs_expenses_view,
    ChartBoard, ChartId, ChartKind, ChartView, MonthSelection, ThemeColors, THEME_ATTRIBUTE,
};
use fragsync_engine::{ChartClient, SyncError};
use fragsync_logging::sync_debug;

/// The three dashboard charts behind the `charts` and `theme` commands.
pub struct Dashboard {
    client: ChartClient,
    board: ChartBoard,
}

impl Dashboard {
    pub fn new(client: ChartClient, board: ChartBoard) -> Self {
        Self { client, board }
    }

    /// Loads every chart for the picked year and month. Missing picks fall
    /// back to today's year and month when the data covers them.
    pub async fn load(
        &mut self,
        today: NaiveDate,
        year: Option<String>,
        month: Option<MonthSelection>,
    ) -> Result<Vec<(ChartView, ThemeColors)>, SyncError> {
        let sales = self.client.sales_vs_expenses().await?;
        let years = years_of(&sales.months);
        let (default_year, default_month) = default_selection(today, &years, &picker_months());
        let year = year
            .or(default_year)
            .or_else(|| years.last().cloned())
            .unwrap_or_else(|| today.year().to_string());
        let month = month.unwrap_or(default_month);
        sync_debug!("Loading charts for {year}-{}", month.as_param());

        let best = self.client.best_sellers().await?;
        let revenue = self.client.revenue_change(&year, month).await?;
        Ok(vec![
            self.render(ChartId::SalesVsExpenses, sales_vs_expenses_view(&sales, &year, month)),
            self.render(ChartId::BestSellers, best_sellers_view(&best)),
            self.render(ChartId::RevenueChange, revenue_view(&revenue, &year, month)),
        ])
    }

    /// Switches the theme; returns the restyled charts.
    pub fn set_theme(&mut self, value: &str) -> Vec<(ChartId, ThemeColors)> {
        self.board.attribute_changed(THEME_ATTRIBUTE, Some(value))
    }

    fn render(&mut self, chart: ChartId, view: ChartView) -> (ChartView, ThemeColors) {
        (view, self.board.rendered(chart))
    }
}

/// Console lines for one chart. Bar values carry peso labels.
pub fn describe(view: &ChartView) -> Vec<String> {
    let mut lines = vec![format!("== {} ({:?})", view.title, view.kind)];
    for series in &view.series {
        let values: Vec<String> = view
            .categories
            .iter()
            .zip(&series.data)
            .map(|(category, value)| match view.kind {
                ChartKind::Bar => format!("{category}: {}", format_peso(*value)),
                _ => format!("{category}: {value}"),
            })
            .collect();
        lines.push(format!("  {}: {}", series.name, values.join(", ")));
    }
    lines
}

fn years_of(months: &[String]) -> Vec<String> {
    months
        .iter()
        .filter_map(|month| month.split_once('-').map(|(year, _)| year.to_string()))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn picker_months() -> Vec<String> {
    (1..=12).map(|month| format!("{month:02}")).collect()
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use chrono::NaiveDate;
    use fragsync_core::charts::{ChartBoard, ChartId, MonthSelection, Theme};
    use fragsync_engine::{ChartClient, FetchError, FetchMetadata, FetchOutput, Fetcher};
    use pretty_assertions::assert_eq;
    use url::Url;

    use super::{describe, Dashboard};

    /// Serves canned JSON by path and records the requested URLs.
    #[derive(Default)]
    struct JsonFetcher {
        requested: Mutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl Fetcher for JsonFetcher {
        async fn fetch(&self, url: &str) -> Result<FetchOutput, FetchError> {
            self.requested.lock().unwrap().push(url.to_string());
            let body = if url.contains("/api/sales-vs-expenses/") {
                r#"{"months":["2023-12","2024-01","2024-02"],"sales":[5,10,20],"expenses":[1,2,3],
                    "daily_dates":["2024-02-01","2024-02-02"],"sales_daily":[7,8],"expenses_daily":[1,1]}"#
            } else if url.contains("/api/best-sellers/") {
                r#"{"labels":["Pandesal","Ensaymada"],"data":[40,12]}"#
            } else {
                r#"{"labels":["2024-02-01","2024-02-02"],"revenues":[1234.5,1000000]}"#
            };
            Ok(FetchOutput {
                bytes: body.as_bytes().to_vec(),
                metadata: FetchMetadata {
                    url: url.to_string(),
                    final_url: url.to_string(),
                    redirect_count: 0,
                    content_type: Some("application/json".to_string()),
                    byte_len: body.len() as u64,
                },
            })
        }
    }

    fn dashboard(fetcher: Arc<JsonFetcher>) -> Dashboard {
        let base = Url::parse("http://shop.test/").unwrap();
        Dashboard::new(ChartClient::new(fetcher, base), ChartBoard::new(Theme::Light))
    }

    #[tokio::test]
    async fn charts_default_to_the_current_month() {
        let fetcher = Arc::new(JsonFetcher::default());
        let mut board = dashboard(fetcher.clone());
        let today = NaiveDate::from_ymd_opt(2024, 2, 14).unwrap();

        let charts = board.load(today, None, None).await.unwrap();

        let titles: Vec<&str> = charts.iter().map(|(view, _)| view.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["Daily Sales vs Expenses - 2024-02", "Best Sellers", "Daily Sales - 2024-02"]
        );
        assert_eq!(
            fetcher.requested.lock().unwrap().last().map(String::as_str),
            Some("http://shop.test/api/revenue-change/?year=2024&month=02")
        );
        assert_eq!(
            describe(&charts[2].0),
            vec!["== Daily Sales - 2024-02 (Bar)", "  Sales: 1: ₱1,234.5, 2: ₱1,000,000"]
        );
    }

    #[tokio::test]
    async fn year_outside_the_data_falls_back_to_the_latest() {
        let fetcher = Arc::new(JsonFetcher::default());
        let mut board = dashboard(fetcher);
        let today = NaiveDate::from_ymd_opt(2026, 10, 1).unwrap();

        let charts = board
            .load(today, None, Some(MonthSelection::All))
            .await
            .unwrap();

        assert_eq!(charts[0].0.title, "Monthly Sales vs Expenses - 2024");
        assert_eq!(charts[0].0.categories, vec!["2024-01", "2024-02"]);
    }

    #[tokio::test]
    async fn theme_change_restyles_rendered_charts() {
        let mut board = dashboard(Arc::new(JsonFetcher::default()));
        assert!(board.set_theme("dark").is_empty());

        let today = NaiveDate::from_ymd_opt(2024, 2, 14).unwrap();
        let charts = board.load(today, Some("2024".to_string()), None).await.unwrap();
        assert_eq!(charts[0].1, Theme::Dark.colors());

        let restyled = board.set_theme("light");
        assert_eq!(
            restyled,
            vec![
                (ChartId::SalesVsExpenses, Theme::Light.colors()),
                (ChartId::BestSellers, Theme::Light.colors()),
                (ChartId::RevenueChange, Theme::Light.colors()),
            ]
        );
    }
}
