//! The value handed to the presentation layer after a successful fetch.

use serde::Serialize;

use crate::grouping::{group_by_day, GroupingZone};
use crate::types::{Coordinates, DayGroup, ForecastResponse, HourlyRow};

/// Grouped forecast plus where it was resolved to.
#[derive(Debug, Clone, Serialize)]
pub struct ForecastReport {
    pub location_name: Option<String>,
    pub coordinates: Option<Coordinates>,
    pub days: Vec<DayGroup>,
    /// Zone the days were keyed in; hourly times use the same one
    #[serde(skip)]
    pub zone: GroupingZone,
}

impl ForecastReport {
    pub fn from_response(response: &ForecastResponse, zone: &GroupingZone) -> Self {
        Self {
            location_name: response.city_name.clone(),
            coordinates: response.coordinates,
            days: group_by_day(&response.entries, zone),
            zone: *zone,
        }
    }

    /// Hourly rows for day `index`, with times in the grouping zone.
    pub fn hourly(&self, index: usize) -> Vec<HourlyRow> {
        self.days
            .get(index)
            .map(|day| day.hourly(&self.zone))
            .unwrap_or_default()
    }

    /// City name, or the coordinate when the API gave no name.
    pub fn display_name(&self) -> String {
        match (&self.location_name, &self.coordinates) {
            (Some(name), _) if !name.trim().is_empty() => name.clone(),
            (_, Some(c)) => format!("{:.2}, {:.2}", c.latitude, c.longitude),
            _ => "Unknown location".to_string(),
        }
    }
}
