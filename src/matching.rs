//! Fuzzy text matching against itinerary activities
//!
//! One matching policy is used everywhere a textual reference has to be
//! resolved to an activity: case-insensitive substring over the activity's
//! name and location, first match in day order wins. Failure to match is a
//! normal outcome (`None`), never an error — callers degrade gracefully
//! (no highlight, literal fallback target).

use crate::model::{Activity, MealSlot};

/// Case-insensitive containment check
fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Whether `text` refers to this activity by name or location
pub fn activity_matches(activity: &Activity, text: &str) -> bool {
    contains_ci(&activity.name, text) || contains_ci(&activity.location, text)
}

/// Index of the first activity whose name or location contains `text`
pub fn find_activity_index(activities: &[Activity], text: &str) -> Option<usize> {
    activities.iter().position(|a| activity_matches(a, text))
}

/// First activity whose name or location contains `text`
pub fn find_activity<'a>(activities: &'a [Activity], text: &str) -> Option<&'a Activity> {
    find_activity_index(activities, text).map(|idx| &activities[idx])
}

/// Locate the activity occupying a meal slot in a day.
///
/// Tries the schedule label first (e.g. "점심 식사"), then the English
/// keyword for the slot. `None` means the day has no recognizable meal
/// activity for that slot.
pub fn find_meal_activity(activities: &[Activity], meal: MealSlot) -> Option<&Activity> {
    activities
        .iter()
        .find(|a| a.name.contains(meal.label()))
        .or_else(|| {
            activities
                .iter()
                .find(|a| a.name.to_lowercase().contains(meal.keyword_en()))
        })
}
