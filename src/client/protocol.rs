//! Wire payloads for the edit service endpoints

use crate::model::{
    Change, ChatMessage, Itinerary, PendingActionKind, PlannerData, ViewMode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Body of `POST /itineraries`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateItineraryRequest {
    pub planner_data: PlannerData,
}

/// The user's chat turn as the backend sees it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessagePayload {
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// What the user was looking at when the message was sent.
///
/// `pending_action` is serialized even when null; the backend keys its
/// interpretation on the field being present.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequestContext {
    pub current_view: ViewMode,
    pub current_day: u32,
    pub pending_action: Option<PendingActionKind>,
}

/// Body of `POST /itineraries/{id}/chat`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: ChatMessagePayload,
    pub context: ChatRequestContext,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub reply: ChatMessage,
    #[serde(default)]
    pub updated_itinerary: Option<Itinerary>,
}

/// Body of `POST /itineraries/{id}/apply-preview`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyPreviewRequest {
    pub source_message_id: String,
    pub changes: Vec<Change>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyPreviewResponse {
    pub updated_itinerary: Itinerary,
    #[serde(default)]
    pub system_message: Option<String>,
}
