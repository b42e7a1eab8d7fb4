//! Bucketing of 3-hour forecast entries into calendar days.

use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::types::{DayGroup, ForecastEntry, HourlyRow};

/// Number of calendar days kept by [`group_by_day`].
pub const MAX_DAYS: usize = 5;

/// Timezone used to turn entry timestamps into calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupingZone {
    /// System timezone at the moment of grouping
    #[default]
    Local,
    Named(Tz),
}

impl GroupingZone {
    /// `None` or an empty name selects the system timezone.
    pub fn from_name(name: Option<&str>) -> Result<Self, String> {
        match name.map(str::trim).filter(|n| !n.is_empty()) {
            None => Ok(Self::Local),
            Some(n) => n
                .parse::<Tz>()
                .map(Self::Named)
                .map_err(|e| format!("Unknown timezone '{}': {}", n, e)),
        }
    }

    /// Calendar date of an epoch-seconds timestamp in this zone.
    pub fn date_of(&self, timestamp: i64) -> Option<NaiveDate> {
        let utc = DateTime::<Utc>::from_timestamp(timestamp, 0)?;
        Some(match self {
            Self::Local => utc.with_timezone(&Local).date_naive(),
            Self::Named(tz) => utc.with_timezone(tz).date_naive(),
        })
    }

    /// Wall-clock time of an epoch-seconds timestamp in this zone.
    pub fn time_of(&self, timestamp: i64) -> Option<NaiveTime> {
        let utc = DateTime::<Utc>::from_timestamp(timestamp, 0)?;
        Some(match self {
            Self::Local => utc.with_timezone(&Local).time(),
            Self::Named(tz) => utc.with_timezone(tz).time(),
        })
    }
}

impl std::fmt::Display for GroupingZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Named(tz) => write!(f, "{}", tz.name()),
        }
    }
}

/// Group entries by calendar date in `zone`, keeping the first [`MAX_DAYS`] dates.
///
/// Groups appear in first-seen order and entries keep their input order.
/// Entries falling on a date beyond the cap are dropped.
pub fn group_by_day(entries: &[ForecastEntry], zone: &GroupingZone) -> Vec<DayGroup> {
    group_with(entries, |ts| zone.date_of(ts))
}

/// Same as [`group_by_day`] for any chrono timezone.
pub fn group_by_day_in<T: TimeZone>(entries: &[ForecastEntry], tz: &T) -> Vec<DayGroup> {
    group_with(entries, |ts| {
        DateTime::<Utc>::from_timestamp(ts, 0).map(|utc| utc.with_timezone(tz).date_naive())
    })
}

fn group_with<F>(entries: &[ForecastEntry], date_of: F) -> Vec<DayGroup>
where
    F: Fn(i64) -> Option<NaiveDate>,
{
    let mut buckets: Vec<(NaiveDate, Vec<ForecastEntry>)> = Vec::with_capacity(MAX_DAYS);

    for entry in entries {
        let Some(date) = date_of(entry.timestamp) else {
            tracing::warn!("Skipping forecast entry with invalid timestamp {}", entry.timestamp);
            continue;
        };

        if let Some(i) = buckets.iter().position(|(d, _)| *d == date) {
            buckets[i].1.push(entry.clone());
        } else if buckets.len() < MAX_DAYS {
            buckets.push((date, vec![entry.clone()]));
        }
    }

    buckets
        .into_iter()
        .filter_map(|(date, entries)| summarize(date, entries))
        .collect()
}

fn summarize(date: NaiveDate, entries: Vec<ForecastEntry>) -> Option<DayGroup> {
    let representative = entries.get(entries.len() / 2)?;
    let icon = representative.icon.clone();
    let description = representative.description.clone();

    let (min_temp, max_temp) = entries.iter().fold(
        (f64::INFINITY, f64::NEG_INFINITY),
        |(lo, hi), e| (lo.min(e.temperature), hi.max(e.temperature)),
    );

    Some(DayGroup {
        date,
        entries,
        min_temp,
        max_temp,
        icon,
        description,
    })
}

impl DayGroup {
    /// Rows for the hourly detail view, in entry order.
    pub fn hourly(&self, zone: &GroupingZone) -> Vec<HourlyRow> {
        self.entries
            .iter()
            .map(|e| HourlyRow {
                time: zone
                    .time_of(e.timestamp)
                    .map(|t| t.format("%H:%M").to_string())
                    .unwrap_or_default(),
                temperature: e.temperature,
                feels_like: e.feels_like,
                humidity: e.humidity,
                wind_speed: e.wind_speed,
                description: e.description.clone(),
                icon: e.icon.clone(),
            })
            .collect()
    }
}
