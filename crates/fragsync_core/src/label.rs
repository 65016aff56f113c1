use chrono::{Datelike, NaiveDate};

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

pub fn month_name(month: u32) -> Option<&'static str> {
    MONTH_NAMES.get(month.checked_sub(1)? as usize).copied()
}

/// Text for the "filter info" display: the selected `YYYY-MM` month, or the
/// current month when no usable month is selected.
pub fn filter_info_label(month_value: Option<&str>, today: NaiveDate) -> String {
    if let Some((year, month)) = month_value.and_then(parse_year_month) {
        if let Some(name) = month_name(month) {
            return format!("{name} {year}");
        }
    }
    let name = month_name(today.month()).unwrap_or("January");
    format!("{name} {}", today.year())
}

fn parse_year_month(value: &str) -> Option<(i32, u32)> {
    let (year, month) = value.trim().split_once('-')?;
    let year = year.parse().ok()?;
    let month = month.get(..2).unwrap_or(month).parse().ok()?;
    Some((year, month))
}
