//! Dialog state types

use crate::model::{
    Itinerary, MealSlot, PendingActionKind, Recommendation, TransportMode, ViewMode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The schedule entity the user designated as the subject of the next edit.
///
/// Transport legs carry display names rather than ids because both endpoint
/// names are needed for captioning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum FocusTarget {
    Activity {
        day: u32,
        activity_id: String,
        name: String,
        location: String,
    },
    Transport {
        day: u32,
        from: String,
        to: String,
    },
}

impl FocusTarget {
    pub fn day(&self) -> u32 {
        match self {
            FocusTarget::Activity { day, .. } | FocusTarget::Transport { day, .. } => *day,
        }
    }

    /// Display label: the activity name, or "from → to" for a leg
    pub fn label(&self) -> String {
        match self {
            FocusTarget::Activity { name, .. } => name.clone(),
            FocusTarget::Transport { from, to, .. } => format!("{from} → {to}"),
        }
    }
}

/// Open restaurant recommendation prompt, keyed by the message that
/// carries the selectable cards
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantPrompt {
    pub message_id: String,
    pub day: u32,
}

/// Open meal-slot question for a chosen restaurant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealPrompt {
    pub restaurant: Recommendation,
    pub day: u32,
    pub message_id: String,
}

/// What kind of submission is in flight; carries what the confirmation or
/// error message will need to say about it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SubmissionKind {
    /// Freeform text forwarded to the chat backend
    Chat,
    Replace {
        target: String,
        replacement: String,
    },
    Transport {
        from: String,
        to: String,
        mode: TransportMode,
    },
    Meal {
        meal: MealSlot,
        restaurant: String,
    },
    /// Explicit apply of a change preview
    Apply,
}

/// Dialog state.
///
/// At most one pending action and at most one sub-prompt exist because the
/// state is one value; `Submitting` doubles as the busy flag that rejects
/// every user-originated trigger until the in-flight call resolves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DialogState {
    /// Ready for a quick action or freeform text
    #[default]
    Idle,

    /// "Change place" armed; next input names the replacement
    PendingReplace,

    /// Restaurant cards offered; next input picks or names a restaurant
    PendingRestaurant { prompt: RestaurantPrompt },

    /// Restaurant chosen; next input picks a meal slot
    PendingMealSlot { prompt: MealPrompt },

    /// "Change transport" armed; next input describes a mode
    PendingTransport,

    /// A chat or apply-preview call is in flight
    Submitting { submission: SubmissionKind },
}

impl DialogState {
    /// Tag reported to the chat backend in the request context
    pub fn pending_action(&self) -> Option<PendingActionKind> {
        match self {
            DialogState::PendingReplace => Some(PendingActionKind::Replace),
            DialogState::PendingRestaurant { .. } => Some(PendingActionKind::Restaurant),
            DialogState::PendingTransport => Some(PendingActionKind::Transport),
            DialogState::Idle
            | DialogState::PendingMealSlot { .. }
            | DialogState::Submitting { .. } => None,
        }
    }

    /// Whether a submission is in flight
    pub fn is_busy(&self) -> bool {
        matches!(self, DialogState::Submitting { .. })
    }
}

/// Read-only surroundings of a transition: the current itinerary snapshot,
/// the focus target, what the user is looking at, and the clock.
///
/// `now` feeds message ids and timestamps so the transition function stays
/// deterministic under test.
#[derive(Debug, Clone, Copy)]
pub struct DialogContext<'a> {
    pub itinerary: &'a Itinerary,
    pub focus: Option<&'a FocusTarget>,
    pub view: ViewMode,
    pub current_day: u32,
    pub now: DateTime<Utc>,
}

impl DialogContext<'_> {
    /// Day the next request refers to: the focused entity's day when one is
    /// set, else the day on screen
    pub fn context_day(&self) -> u32 {
        self.focus.map_or(self.current_day, FocusTarget::day)
    }
}
