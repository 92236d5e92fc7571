//! Conversation messages, previews, changes and recommendations

use crate::model::TransportMode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatSender {
    User,
    Assistant,
}

/// Marks a message as a centered system notice rather than a bubble
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageVariant {
    System,
}

/// One entry in the conversation log.
///
/// Immutable once appended, except that a change preview may be annotated
/// as applied (see [`Preview::Change`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub text: String,
    pub sender: ChatSender,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<MessageVariant>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<Preview>,
}

/// Proposed edits or recommendations attached to a message, awaiting an
/// explicit user action before anything is sent to the edit service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Preview {
    Change {
        title: String,
        #[serde(default)]
        changes: Vec<Change>,
        /// Set once the changes have been applied; the preview itself is
        /// never removed from the log
        #[serde(default)]
        applied: bool,
    },
    Recommendation {
        title: String,
        #[serde(default)]
        recommendations: Vec<Recommendation>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeAction {
    Add,
    Remove,
    Modify,
    Transport,
    Regenerate,
    Replace,
}

/// A structured edit instruction sent to the edit service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Change {
    pub action: ChangeAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day: Option<u32>,
    /// New value being introduced
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Value being replaced, when any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_location: Option<String>,
    /// Human caption shown in previews and confirmations
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<TransportMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after_activity_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl Change {
    /// Empty change with just an action; builders fill in the rest
    pub fn new(action: ChangeAction) -> Self {
        Self {
            action,
            day: None,
            location: None,
            target_location: None,
            details: None,
            mode: None,
            after_activity_name: None,
            from_location: None,
            to_location: None,
            lat: None,
            lng: None,
            address: None,
        }
    }
}

/// What happens when a recommendation card is selected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationSource {
    /// Selecting submits a replace change for the focused activity
    Replacement,
    /// Selecting asks which meal slot the restaurant should take
    Restaurant,
}

/// A selectable place card inside a recommendation preview
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub name: String,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cuisine: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_meters: Option<u32>,
    /// Activity the recommendation was anchored next to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor_activity_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_ratings_total: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<RecommendationSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_demo: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub walking_minutes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driving_minutes: Option<u32>,
}

impl Recommendation {
    /// Bare named place, used when the user types a restaurant name instead
    /// of picking a card
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            location: name.clone(),
            name,
            rating: None,
            cuisine: None,
            address: None,
            lat: None,
            lng: None,
            distance_meters: None,
            anchor_activity_name: None,
            user_ratings_total: None,
            source: Some(RecommendationSource::Restaurant),
            is_demo: None,
            walking_minutes: None,
            driving_minutes: None,
        }
    }
}

/// Which screen of the host surface the user is looking at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    Overview,
    Daily,
}

/// Pending-action tag included in the chat request context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PendingActionKind {
    Replace,
    Restaurant,
    Transport,
}

/// Meal slot a restaurant can be slotted into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealSlot {
    Breakfast,
    Lunch,
    Dinner,
}

impl MealSlot {
    pub const ALL: [MealSlot; 3] = [MealSlot::Breakfast, MealSlot::Lunch, MealSlot::Dinner];

    /// Schedule label the slot appears under in an itinerary
    pub fn label(self) -> &'static str {
        match self {
            MealSlot::Breakfast => "아침 식사",
            MealSlot::Lunch => "점심 식사",
            MealSlot::Dinner => "저녁 식사",
        }
    }

    /// English keyword used as a fallback when matching activity names
    pub fn keyword_en(self) -> &'static str {
        match self {
            MealSlot::Breakfast => "breakfast",
            MealSlot::Lunch => "lunch",
            MealSlot::Dinner => "dinner",
        }
    }

    /// Recognize a meal slot in a freeform reply; `None` when no keyword
    /// for any slot is present
    pub fn from_reply(text: &str) -> Option<Self> {
        let lowered = text.to_lowercase();
        if lowered.contains("아침") || lowered.contains("breakfast") {
            Some(MealSlot::Breakfast)
        } else if lowered.contains("점심") || lowered.contains("lunch") {
            Some(MealSlot::Lunch)
        } else if lowered.contains("저녁") || lowered.contains("dinner") {
            Some(MealSlot::Dinner)
        } else {
            None
        }
    }
}
