//! Events that can occur in the edit dialog

use crate::model::{Change, ChatMessage, Itinerary, MealSlot, Recommendation};

/// Button-driven quick actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickAction {
    /// "장소 변경" — replace the focused activity
    Replace,
    /// "맛집 추천" — recommend restaurants near the focus
    Restaurant,
    /// "교통 변경" — change the focused leg's mode
    Transport,
}

/// Events that trigger dialog transitions.
///
/// The first group originates from the user; the completion group is fed
/// back by the session when a network call resolves.
#[derive(Debug, Clone)]
pub enum DialogEvent {
    // User events
    QuickAction {
        action: QuickAction,
    },
    UserText {
        text: String,
    },
    RecommendationChosen {
        /// Message whose preview held the card
        message_id: String,
        recommendation: Recommendation,
    },
    MealChosen {
        meal: MealSlot,
    },
    SkipRecommendation {
        /// Message whose prompt the skip belongs to
        message_id: String,
    },
    ApplyRequested {
        message_id: String,
        changes: Vec<Change>,
    },
    SurfaceClosed,

    // Submission completions
    ChatCompleted {
        reply: ChatMessage,
        updated_itinerary: Option<Box<Itinerary>>,
    },
    ApplyCompleted {
        source_message_id: String,
        changes: Vec<Change>,
        updated_itinerary: Box<Itinerary>,
        system_message: Option<String>,
    },
    SubmissionFailed {
        message: String,
    },
}
