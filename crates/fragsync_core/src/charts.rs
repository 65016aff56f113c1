//! Dashboard chart data: JSON payload models, reshaping by year/month prefix
//! and light/dark theme selection.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

pub const SALES_VS_EXPENSES_PATH: &str = "/api/sales-vs-expenses/";
pub const BEST_SELLERS_PATH: &str = "/api/best-sellers/";
pub const REVENUE_CHANGE_PATH: &str = "/api/revenue-change/";

/// Attribute on the document root that carries the active theme.
pub const THEME_ATTRIBUTE: &str = "data-theme";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SalesVsExpensesData {
    pub months: Vec<String>,
    pub sales: Vec<f64>,
    pub expenses: Vec<f64>,
    pub daily_dates: Vec<String>,
    pub sales_daily: Vec<f64>,
    pub expenses_daily: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BestSellersData {
    pub labels: Vec<String>,
    pub data: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RevenueChangeData {
    pub labels: Vec<String>,
    pub revenues: Vec<f64>,
}

/// Month picker value: `"all"` or a two-digit month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonthSelection {
    All,
    Month(u32),
}

impl MonthSelection {
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("all") {
            return Some(MonthSelection::All);
        }
        match value.parse::<u32>() {
            Ok(month) if (1..=12).contains(&month) => Some(MonthSelection::Month(month)),
            _ => None,
        }
    }

    pub fn as_param(self) -> String {
        match self {
            MonthSelection::All => "all".to_string(),
            MonthSelection::Month(month) => format!("{month:02}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Line,
    Pie,
    Bar,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub data: Vec<f64>,
}

/// Declarative chart contents handed to the rendering library.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartView {
    pub kind: ChartKind,
    pub title: String,
    pub categories: Vec<String>,
    pub series: Vec<Series>,
}

pub fn sales_vs_expenses_view(
    data: &SalesVsExpensesData,
    year: &str,
    month: MonthSelection,
) -> ChartView {
    match month {
        MonthSelection::All => {
            let (categories, sales) = filter_by_prefix(&data.months, &data.sales, year);
            let (_, expenses) = filter_by_prefix(&data.months, &data.expenses, year);
            ChartView {
                kind: ChartKind::Line,
                title: format!("Monthly Sales vs Expenses - {year}"),
                categories,
                series: vec![series("Sales", sales), series("Expenses", expenses)],
            }
        }
        MonthSelection::Month(_) => {
            let selected = format!("{year}-{}", month.as_param());
            let (dates, sales) = filter_by_prefix(&data.daily_dates, &data.sales_daily, &selected);
            let (_, expenses) =
                filter_by_prefix(&data.daily_dates, &data.expenses_daily, &selected);
            ChartView {
                kind: ChartKind::Line,
                title: format!("Daily Sales vs Expenses - {selected}"),
                categories: dates.iter().map(|d| day_label(d)).collect(),
                series: vec![series("Sales", sales), series("Expenses", expenses)],
            }
        }
    }
}

/// The server already filters revenue by year and month; only labels change.
pub fn revenue_view(data: &RevenueChangeData, year: &str, month: MonthSelection) -> ChartView {
    let (title, categories) = match month {
        MonthSelection::All => (format!("Monthly Sales - {year}"), data.labels.clone()),
        MonthSelection::Month(_) => (
            format!("Daily Sales - {year}-{}", month.as_param()),
            data.labels.iter().map(|d| day_label(d)).collect(),
        ),
    };
    ChartView {
        kind: ChartKind::Bar,
        title,
        categories,
        series: vec![series("Sales", data.revenues.clone())],
    }
}

pub fn best_sellers_view(data: &BestSellersData) -> ChartView {
    ChartView {
        kind: ChartKind::Pie,
        title: "Best Sellers".to_string(),
        categories: data.labels.clone(),
        series: vec![series("Best Sellers", data.data.clone())],
    }
}

pub fn revenue_change_query(year: &str, month: MonthSelection) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .append_pair("year", year)
        .append_pair("month", &month.as_param())
        .finish()
}

/// Initial picker values: the current year and month when the pickers offer
/// them. Year stays unchanged (`None`) when not offered; month falls back to
/// "all".
pub fn default_selection(
    today: NaiveDate,
    years: &[String],
    months: &[String],
) -> (Option<String>, MonthSelection) {
    let year = today.year().to_string();
    let year = years.iter().any(|y| *y == year).then_some(year);
    let month_param = format!("{:02}", today.month());
    let month = if months.iter().any(|m| *m == month_param) {
        MonthSelection::Month(today.month())
    } else {
        MonthSelection::All
    };
    (year, month)
}

/// Data label for revenue bars: peso sign and en-US digit grouping.
pub fn format_peso(value: f64) -> String {
    let negative = value < 0.0;
    let rounded = (value.abs() * 1000.0).round() / 1000.0;
    let whole = rounded.trunc() as u64;
    let fraction = format!("{:.3}", rounded.fract());
    let fraction = fraction
        .trim_start_matches('0')
        .trim_end_matches('0')
        .trim_end_matches('.');

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if negative && (whole > 0 || !fraction.is_empty()) {
        "-"
    } else {
        ""
    };
    format!("₱{sign}{grouped}{fraction}")
}

fn series(name: &str, data: Vec<f64>) -> Series {
    Series {
        name: name.to_string(),
        data,
    }
}

fn filter_by_prefix(labels: &[String], values: &[f64], prefix: &str) -> (Vec<String>, Vec<f64>) {
    labels
        .iter()
        .zip(values.iter())
        .filter(|(label, _)| label.starts_with(prefix))
        .map(|(label, value)| (label.clone(), *value))
        .unzip()
}

fn day_label(date: &str) -> String {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|d| d.day().to_string())
        .unwrap_or_else(|_| date.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeColors {
    pub text: &'static str,
    pub grid: &'static str,
    pub tooltip_background: &'static str,
    pub tooltip_text: &'static str,
}

impl Theme {
    pub fn from_attribute(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.trim().eq_ignore_ascii_case("dark") => Theme::Dark,
            _ => Theme::Light,
        }
    }

    pub fn colors(self) -> ThemeColors {
        match self {
            Theme::Dark => ThemeColors {
                text: "#f1f8f4",
                grid: "rgba(119, 178, 84, 0.2)",
                tooltip_background: "rgba(26, 31, 32, 0.95)",
                tooltip_text: "#f1f8f4",
            },
            Theme::Light => ThemeColors {
                text: "#2f3e46",
                grid: "#e0e0e0",
                tooltip_background: "#ffffff",
                tooltip_text: "#2f3e46",
            },
        }
    }

    pub fn tooltip_mode(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ChartId {
    SalesVsExpenses,
    BestSellers,
    RevenueChange,
}

/// Tracks which dashboard charts exist so that a theme change restyles only
/// those.
#[derive(Debug, Clone, Default)]
pub struct ChartBoard {
    theme: Theme,
    rendered: BTreeSet<ChartId>,
}

impl ChartBoard {
    pub fn new(theme: Theme) -> Self {
        Self {
            theme,
            rendered: BTreeSet::new(),
        }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Registers a rendered chart and returns the colours it starts with.
    pub fn rendered(&mut self, chart: ChartId) -> ThemeColors {
        self.rendered.insert(chart);
        self.theme.colors()
    }

    /// Handles an attribute mutation on the document root.
    pub fn attribute_changed(
        &mut self,
        attribute: &str,
        value: Option<&str>,
    ) -> Vec<(ChartId, ThemeColors)> {
        if attribute != THEME_ATTRIBUTE {
            return Vec::new();
        }
        self.theme = Theme::from_attribute(value);
        let colors = self.theme.colors();
        self.rendered.iter().map(|chart| (*chart, colors)).collect()
    }
}
