//! Itinerary, day, activity and transport types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Travel mode for a leg between two consecutive activities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    Drive,
    Walk,
    Transit,
    Bike,
}

impl TransportMode {
    /// Human-readable label used in captions and confirmation messages
    pub fn label(self) -> &'static str {
        match self {
            TransportMode::Drive => "자동차",
            TransportMode::Walk => "도보",
            TransportMode::Transit => "대중교통",
            TransportMode::Bike => "자전거",
        }
    }
}

/// Planner inputs the itinerary was generated from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannerData {
    pub country: String,
    pub cities: Vec<String>,
    pub date_range: DateRange,
    pub travelers: Travelers,
    pub styles: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transport_mode: Option<TransportMode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Travelers {
    pub adults: u32,
    pub children: u32,
    #[serde(rename = "type")]
    pub kind: String,
}

/// A named point on a day's map trace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub time: String,
    pub lat: f64,
    pub lng: f64,
}

/// Travel segment between two consecutive activities in a day.
///
/// Valid only when its endpoints are adjacent entries in that day's
/// activity order; the edit service owns that invariant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportLeg {
    pub from_activity_id: String,
    pub to_activity_id: String,
    pub mode: TransportMode,
    pub duration_minutes: u32,
    pub distance_meters: u32,
    pub summary: String,
}

/// Per-day summary shown on the overview screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayOverview {
    pub day: u32,
    pub date: String,
    pub title: String,
    pub photo: String,
    pub activities: Vec<String>,
    pub locations: Vec<Location>,
    pub transports: Vec<TransportLeg>,
}

/// A single scheduled point of interest within a day.
///
/// Identity is `id`, unique within one itinerary snapshot. Matching by id
/// is exact; matching by name/location is fuzzy (see `crate::matching`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: String,
    pub name: String,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
    pub time: String,
    pub duration: String,
    pub description: String,
    pub image: String,
    pub open_hours: String,
    pub price: String,
    pub tips: Vec<String>,
    pub nearby_food: Vec<String>,
    pub estimated_duration: String,
    pub best_time: String,
}

/// The full multi-day travel plan.
///
/// `activities_by_day` is keyed by the stringified day number, matching the
/// wire format. Every successful edit returns a fresh snapshot with fresh
/// activity ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Itinerary {
    pub id: String,
    pub planner_data: PlannerData,
    pub overview: Vec<DayOverview>,
    pub activities_by_day: BTreeMap<String, Vec<Activity>>,
    pub created_at: String,
    pub updated_at: String,
}

impl Itinerary {
    /// Activities scheduled for `day`, empty when the day is unknown
    pub fn activities_for_day(&self, day: u32) -> &[Activity] {
        self.activities_by_day
            .get(&day.to_string())
            .map_or(&[], Vec::as_slice)
    }

    /// Whether `day` exists in the overview
    pub fn has_day(&self, day: u32) -> bool {
        self.overview.iter().any(|d| d.day == day)
    }

    /// First day number in the overview, defaulting to 1 for an empty plan
    pub fn first_day(&self) -> u32 {
        self.overview.first().map_or(1, |d| d.day)
    }

    /// Anchor city when nothing more specific is focused: the planner's
    /// first city, falling back to the country
    pub fn first_city(&self) -> &str {
        self.planner_data
            .cities
            .first()
            .map_or(self.planner_data.country.as_str(), String::as_str)
    }
}
