//! Change proposal builder
//!
//! Turns a resolved dialog input (freeform text, a chosen recommendation,
//! a meal slot reply) into exactly one structured [`Change`] ready for
//! submission. Captions are generated here so the rest of the crate never
//! formats user-facing change text.

use crate::matching::find_meal_activity;
use crate::model::{
    Activity, Change, ChangeAction, MealSlot, Recommendation, RecommendationSource, TransportMode,
};

/// Map a freeform mode description onto a transport mode.
///
/// Case-insensitive keyword scan; anything unrecognized is a drive.
pub fn detect_transport_mode(text: &str) -> TransportMode {
    let lowered = text.to_lowercase();
    if lowered.contains("도보") || lowered.contains("walk") {
        return TransportMode::Walk;
    }
    if lowered.contains("자전거") || lowered.contains("bike") {
        return TransportMode::Bike;
    }
    if ["버스", "bus", "대중", "지하철", "metro", "subway", "트램"]
        .iter()
        .any(|kw| lowered.contains(kw))
    {
        return TransportMode::Transit;
    }
    TransportMode::Drive
}

/// Replace the focused activity with a new place.
///
/// `meta` carries coordinates and cuisine when the replacement came from a
/// recommendation card rather than typed text.
pub fn replacement_change(
    day: u32,
    target_name: &str,
    replacement_name: &str,
    meta: Option<&Recommendation>,
) -> Change {
    let details = match meta.and_then(|m| m.cuisine.as_deref()) {
        Some(cuisine) => format!("{cuisine} 스팟으로 교체합니다."),
        None => format!("{target_name}을 {replacement_name}으로 교체합니다."),
    };
    let mut change = Change::new(ChangeAction::Replace);
    change.day = Some(day);
    change.target_location = Some(target_name.to_string());
    change.location = Some(replacement_name.to_string());
    change.details = Some(details);
    if let Some(meta) = meta {
        change.lat = meta.lat;
        change.lng = meta.lng;
        change.address = meta.address.clone();
    }
    change
}

/// Switch the travel mode of the focused leg
pub fn transport_change(day: u32, from: &str, to: &str, mode: TransportMode) -> Change {
    let mut change = Change::new(ChangeAction::Transport);
    change.day = Some(day);
    change.from_location = Some(from.to_string());
    change.to_location = Some(to.to_string());
    change.mode = Some(mode);
    change.details = Some(format!("{from}과 {to} 사이 이동을 {}로 변경", mode.label()));
    change
}

/// Slot a restaurant into a meal of the day.
///
/// Targets the day's matching meal activity when one exists; otherwise the
/// literal slot label is sent as the target and the edit service decides
/// what that means.
pub fn meal_change(
    activities: &[Activity],
    day: u32,
    meal: MealSlot,
    restaurant: &Recommendation,
) -> Change {
    let label = meal.label();
    let target = match find_meal_activity(activities, meal) {
        Some(activity) => activity.name.clone(),
        None => {
            tracing::debug!(day, meal = label, "no meal activity matched; sending literal label");
            label.to_string()
        }
    };
    let mut change = Change::new(ChangeAction::Replace);
    change.day = Some(day);
    change.target_location = Some(target);
    change.location = Some(format!("{label} - {}", restaurant.name));
    change.details = Some(format!("{label} 일정에 {}을 반영합니다.", restaurant.name));
    change.lat = restaurant.lat;
    change.lng = restaurant.lng;
    change.address = restaurant.address.clone();
    change
}

fn suggestion(
    name: String,
    location: String,
    cuisine: &str,
    source: RecommendationSource,
) -> Recommendation {
    Recommendation {
        name,
        location,
        rating: None,
        cuisine: Some(cuisine.to_string()),
        address: None,
        lat: None,
        lng: None,
        distance_meters: None,
        anchor_activity_name: None,
        user_ratings_total: None,
        source: Some(source),
        is_demo: None,
        walking_minutes: None,
        driving_minutes: None,
    }
}

/// Canned replacement ideas for the focused activity's city
pub fn replacement_suggestions(city: &str) -> Vec<Recommendation> {
    vec![
        suggestion(
            format!("{city} 현대 미술 갤러리"),
            city.to_string(),
            "전시 · 문화",
            RecommendationSource::Replacement,
        ),
        suggestion(
            format!("{city} 정원 산책"),
            city.to_string(),
            "산책 · 휴식",
            RecommendationSource::Replacement,
        ),
        suggestion(
            format!("{city} 감성 카페"),
            city.to_string(),
            "카페 · 휴식",
            RecommendationSource::Replacement,
        ),
    ]
}

/// Canned restaurant ideas near an anchor (activity name, leg label, or city)
pub fn restaurant_suggestions(city: &str, anchor: &str) -> Vec<Recommendation> {
    let mut cards = vec![
        suggestion(
            format!("{city} 브런치 스팟"),
            city.to_string(),
            "브런치",
            RecommendationSource::Restaurant,
        ),
        suggestion(
            format!("{city} 비스트로"),
            format!("{city} 시내"),
            "프랑스 가정식",
            RecommendationSource::Restaurant,
        ),
        suggestion(
            format!("{city} 로스터리 카페"),
            format!("{city} 중심가"),
            "커피 · 디저트",
            RecommendationSource::Restaurant,
        ),
    ];
    let ratings = [4.6, 4.5, 4.7];
    for (card, rating) in cards.iter_mut().zip(ratings) {
        card.rating = Some(rating);
        card.anchor_activity_name = Some(anchor.to_string());
    }
    cards
}
