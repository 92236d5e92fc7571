//! Edit session driver
//!
//! Owns everything one dialog surface needs: the itinerary snapshot, the
//! dialog state, the focus target, the conversation log and the highlight
//! scheduler. Public methods translate surface gestures into events; the
//! dispatch loop runs pure transitions and executes their effects, feeding
//! network completions back in as events.
//!
//! All state changes are serialized through `&mut self`, and the dialog's
//! `Submitting` state rejects user triggers while a call is in flight, so
//! at most one submission exists per session regardless of how the surface
//! behaves.

#[cfg(test)]
mod testing;


use crate::client::{
    ApplyPreviewRequest, ChatMessagePayload, ChatRequest, ChatRequestContext, EditBackend,
};
use crate::dialog::{
    transition, DialogContext, DialogEffect, DialogEvent, DialogState, FocusTarget, QuickAction,
    TransitionError,
};
use crate::log::ConversationLog;
use crate::model::{
    ChatMessage, ChatSender, Itinerary, MealSlot, MessageVariant, Recommendation, ViewMode,
};
use crate::reconcile::{resolve_highlight, Highlight, HighlightScheduler};
use chrono::Utc;

const GREETING: &str = "안녕하세요! 여행 일정을 수정하거나 질문이 있으시면 말씀해 주세요. \
                        예를 들어 '2일차에 박물관 추가해줘' 또는 '식당 추천해줘' 같은 요청을 \
                        자유롭게 하실 수 있습니다.";

/// One user's edit dialog against one itinerary
pub struct EditSession<B: EditBackend> {
    backend: B,
    itinerary: Itinerary,
    state: DialogState,
    focus: Option<FocusTarget>,
    log: ConversationLog,
    highlights: HighlightScheduler,
    view: ViewMode,
    current_day: u32,
}

impl<B: EditBackend> EditSession<B> {
    pub fn new(itinerary: Itinerary, backend: B) -> Self {
        let current_day = itinerary.first_day();
        let mut log = ConversationLog::new();
        log.push(ChatMessage {
            id: format!("intro-{}", Utc::now().timestamp_millis()),
            text: GREETING.to_string(),
            sender: ChatSender::Assistant,
            timestamp: Utc::now(),
            variant: None,
            preview: None,
        });
        Self {
            backend,
            itinerary,
            state: DialogState::default(),
            focus: None,
            log,
            highlights: HighlightScheduler::new(),
            view: ViewMode::Overview,
            current_day,
        }
    }

    // ------------------------------------------------------------------
    // Surface state
    // ------------------------------------------------------------------

    pub fn itinerary(&self) -> &Itinerary {
        &self.itinerary
    }

    pub fn state(&self) -> &DialogState {
        &self.state
    }

    pub fn focus(&self) -> Option<&FocusTarget> {
        self.focus.as_ref()
    }

    pub fn log(&self) -> &ConversationLog {
        &self.log
    }

    pub fn view(&self) -> ViewMode {
        self.view
    }

    pub fn current_day(&self) -> u32 {
        self.current_day
    }

    pub fn is_busy(&self) -> bool {
        self.state.is_busy()
    }

    /// Highlight currently showing on the schedule, if any
    pub fn active_highlight(&self) -> Option<Highlight> {
        self.highlights.active()
    }

    pub fn set_view(&mut self, view: ViewMode) {
        self.view = view;
    }

    pub fn select_day(&mut self, day: u32) {
        if self.itinerary.has_day(day) {
            self.current_day = day;
        }
    }

    /// Designate the entity the next edit request is about.
    ///
    /// Replaces any previous focus and tags the conversation so the user
    /// sees what is selected.
    pub fn set_focus(&mut self, target: FocusTarget) {
        let label = target.label();
        self.focus = Some(target);
        self.log.push(ChatMessage {
            id: format!("focus-{}", Utc::now().timestamp_millis()),
            text: format!("[{label}]을 선택했어요. 원하는 작업을 빠른 액션으로 이어가 보세요."),
            sender: ChatSender::Assistant,
            timestamp: Utc::now(),
            variant: Some(MessageVariant::System),
            preview: None,
        });
    }

    /// Drop the focus target. A staged highlight stays staged.
    pub fn clear_focus(&mut self) {
        self.focus = None;
    }

    // ------------------------------------------------------------------
    // Dialog triggers
    // ------------------------------------------------------------------

    pub async fn quick_action(&mut self, action: QuickAction) {
        self.dispatch(DialogEvent::QuickAction { action }).await;
    }

    /// Freeform text from the input box; blank input is ignored
    pub async fn send_text(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        self.dispatch(DialogEvent::UserText {
            text: text.to_string(),
        })
        .await;
    }

    /// A recommendation card was clicked
    pub async fn select_recommendation(&mut self, message_id: &str, recommendation: Recommendation) {
        self.dispatch(DialogEvent::RecommendationChosen {
            message_id: message_id.to_string(),
            recommendation,
        })
        .await;
    }

    /// A meal-slot button was pressed
    pub async fn choose_meal(&mut self, meal: MealSlot) {
        self.dispatch(DialogEvent::MealChosen { meal }).await;
    }

    /// The skip affordance under a recommendation prompt was pressed
    pub async fn skip_recommendation(&mut self, message_id: &str) {
        self.dispatch(DialogEvent::SkipRecommendation {
            message_id: message_id.to_string(),
        })
        .await;
    }

    /// Apply the change preview carried by a message. Unknown messages and
    /// recommendation previews are ignored.
    pub async fn apply_preview(&mut self, message_id: &str) {
        let Some(changes) = self.log.preview_changes(message_id) else {
            tracing::debug!(message_id, "apply requested for a message without changes");
            return;
        };
        self.dispatch(DialogEvent::ApplyRequested {
            message_id: message_id.to_string(),
            changes,
        })
        .await;
    }

    /// The dialog surface closed: reset the pending slot, drop the focus,
    /// fire any staged highlight. Already-applied changes stay applied.
    pub async fn close_surface(&mut self) {
        self.dispatch(DialogEvent::SurfaceClosed).await;
    }

    // ------------------------------------------------------------------
    // Dispatch loop
    // ------------------------------------------------------------------

    async fn dispatch(&mut self, event: DialogEvent) {
        let mut queue = vec![event];

        while let Some(event) = queue.pop() {
            let context = DialogContext {
                itinerary: &self.itinerary,
                focus: self.focus.as_ref(),
                view: self.view,
                current_day: self.current_day,
                now: Utc::now(),
            };
            let result = match transition(&self.state, &context, event) {
                Ok(result) => result,
                Err(TransitionError::Busy) => {
                    tracing::debug!("submission in flight, trigger dropped");
                    continue;
                }
            };

            tracing::debug!(state = ?result.new_state, effects = result.effects.len(), "dialog transition");
            self.state = result.new_state;

            for effect in result.effects {
                if let Some(generated) = self.run_effect(effect).await {
                    queue.push(generated);
                }
            }
        }
    }

    async fn run_effect(&mut self, effect: DialogEffect) -> Option<DialogEvent> {
        match effect {
            DialogEffect::Append(message) => {
                self.log.push(message);
                None
            }

            DialogEffect::ClearFocus => {
                self.focus = None;
                None
            }

            DialogEffect::FireHighlight => {
                self.highlights.fire();
                None
            }

            DialogEffect::MarkPreviewApplied { message_id } => {
                self.log.mark_applied(&message_id);
                None
            }

            DialogEffect::ReplaceItinerary(next) => {
                self.replace_itinerary(*next);
                None
            }

            DialogEffect::StageHighlight { changes } => {
                match resolve_highlight(&changes, &self.itinerary, self.current_day) {
                    Some(highlight) => self.highlights.stage(highlight),
                    None => tracing::debug!("applied changes matched nothing, no highlight"),
                }
                None
            }

            DialogEffect::SendChat {
                text,
                timestamp,
                pending_action,
            } => {
                let payload = ChatRequest {
                    message: ChatMessagePayload { text, timestamp },
                    context: ChatRequestContext {
                        current_view: self.view,
                        current_day: self
                            .focus
                            .as_ref()
                            .map_or(self.current_day, FocusTarget::day),
                        pending_action,
                    },
                };
                match self.backend.send_chat(&self.itinerary.id, &payload).await {
                    Ok(response) => Some(DialogEvent::ChatCompleted {
                        reply: response.reply,
                        updated_itinerary: response.updated_itinerary.map(Box::new),
                    }),
                    Err(e) => Some(DialogEvent::SubmissionFailed { message: e.message }),
                }
            }

            DialogEffect::SubmitChanges {
                source_message_id,
                changes,
            } => {
                let payload = ApplyPreviewRequest {
                    source_message_id: source_message_id.clone(),
                    changes: changes.clone(),
                };
                match self.backend.apply_preview(&self.itinerary.id, &payload).await {
                    Ok(response) => Some(DialogEvent::ApplyCompleted {
                        source_message_id,
                        changes,
                        updated_itinerary: Box::new(response.updated_itinerary),
                        system_message: response.system_message,
                    }),
                    Err(e) => Some(DialogEvent::SubmissionFailed { message: e.message }),
                }
            }
        }
    }

    /// The returned itinerary replaces the held one wholesale; the selected
    /// day is clamped when it no longer exists in the new plan
    fn replace_itinerary(&mut self, next: Itinerary) {
        self.itinerary = next;
        if !self.itinerary.has_day(self.current_day) {
            self.current_day = self.itinerary.first_day();
        }
    }

    #[cfg(test)]
    pub(crate) fn set_state_for_test(&mut self, state: DialogState) {
        self.state = state;
    }
}
