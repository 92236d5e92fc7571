//! Effects produced by dialog transitions

use crate::model::{Change, ChatMessage, Itinerary, PendingActionKind};
use chrono::{DateTime, Utc};

/// Work the session driver performs after a transition.
///
/// Effects are executed in order; the two submission effects are the only
/// suspension points in the whole dialog.
#[derive(Debug, Clone)]
pub enum DialogEffect {
    /// Append a message to the conversation log
    Append(ChatMessage),

    /// Forward freeform text to the chat backend
    SendChat {
        text: String,
        timestamp: DateTime<Utc>,
        pending_action: Option<PendingActionKind>,
    },

    /// Submit explicit changes to apply-preview
    SubmitChanges {
        source_message_id: String,
        changes: Vec<Change>,
    },

    /// Replace the session's itinerary wholesale
    ReplaceItinerary(Box<Itinerary>),

    /// Annotate a change preview as applied
    MarkPreviewApplied { message_id: String },

    /// Resolve the applied changes against the (already replaced)
    /// itinerary and stage a highlight for the next surface close
    StageHighlight { changes: Vec<Change> },

    /// Drop the focus target
    ClearFocus,

    /// Fire a staged highlight (surface just closed)
    FireHighlight,
}

impl DialogEffect {
    /// Whether this effect issues a network call
    pub fn is_submission(&self) -> bool {
        matches!(
            self,
            DialogEffect::SendChat { .. } | DialogEffect::SubmitChanges { .. }
        )
    }
}
