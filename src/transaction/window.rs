//! Reporting windows: the trailing date ranges that summaries and listings are
//! restricted to.

use std::{ops::RangeInclusive, str::FromStr};

use serde::{Deserialize, Serialize};
use time::{Date, Duration};

/// A trailing time range ending today, or no restriction at all.
///
/// In query strings the window is given as `7d`, `30d`, `365d` or `all`.
/// The labels `7j`, `30j` and `365j` sent by older clients are also accepted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportingWindow {
    /// The last 7 days.
    #[default]
    #[serde(rename = "7d", alias = "7j")]
    Week,
    /// The last 30 days.
    #[serde(rename = "30d", alias = "30j")]
    Month,
    /// The last 365 days.
    #[serde(rename = "365d", alias = "365j")]
    Year,
    /// Every transaction regardless of date.
    #[serde(rename = "all")]
    All,
}

impl ReportingWindow {
    /// The length of the window in days, `None` for [ReportingWindow::All].
    pub fn days(self) -> Option<i64> {
        match self {
            Self::Week => Some(7),
            Self::Month => Some(30),
            Self::Year => Some(365),
            Self::All => None,
        }
    }

    /// The value used for this window in query strings.
    pub fn as_query_value(self) -> &'static str {
        match self {
            Self::Week => "7d",
            Self::Month => "30d",
            Self::Year => "365d",
            Self::All => "all",
        }
    }

    /// The inclusive date range covered by the window when the current date is `today`.
    ///
    /// A window of N days spans N calendar dates, today included, so the last
    /// 7 days of 2025-03-10 start on 2025-03-04.
    /// Returns `None` for [ReportingWindow::All], meaning no date restriction.
    pub fn date_range(self, today: Date) -> Option<RangeInclusive<Date>> {
        self.days()
            .map(|days| today.saturating_sub(Duration::days(days - 1))..=today)
    }

    /// Whether `date` falls inside the window when the current date is `today`.
    pub fn contains(self, date: Date, today: Date) -> bool {
        self.date_range(today)
            .is_none_or(|range| range.contains(&date))
    }
}

impl FromStr for ReportingWindow {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "7d" | "7j" => Ok(Self::Week),
            "30d" | "30j" => Ok(Self::Month),
            "365d" | "365j" => Ok(Self::Year),
            "all" => Ok(Self::All),
            other => Err(format!(
                "unknown reporting window \"{other}\", expected one of 7d, 30d, 365d or all"
            )),
        }
    }
}
