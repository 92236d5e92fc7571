//! Pure dialog transition function
//!
//! Given the current state, its read-only context and one event, produces
//! the next state plus effects. No I/O happens here; the session driver
//! executes the effects and feeds completions back in as events.

use super::{
    DialogContext, DialogEffect, DialogEvent, DialogState, FocusTarget, MealPrompt, QuickAction,
    RestaurantPrompt, SubmissionKind,
};
use crate::model::{
    ChatMessage, ChatSender, MealSlot, MessageVariant, Preview, Recommendation,
    RecommendationSource,
};
use crate::proposal;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Keywords that turn freeform idle text into a restaurant flow
const RESTAURANT_KEYWORDS: [&str; 4] = ["맛집", "식당", "레스토랑", "restaurant"];

/// Result of a dialog transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: DialogState,
    pub effects: Vec<DialogEffect>,
}

impl TransitionResult {
    pub fn new(state: DialogState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: DialogEffect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Errors that can occur during a transition
#[derive(Debug, Error)]
pub enum TransitionError {
    /// A submission is already in flight; the trigger must be dropped
    /// without appending anything or issuing a second call
    #[error("submission in flight, trigger ignored")]
    Busy,
}

/// Pure transition function.
///
/// Same inputs always produce the same outputs; message ids derive from
/// `ctx.now`, mirroring the wire format's prefix + epoch-millis ids.
pub fn transition(
    state: &DialogState,
    ctx: &DialogContext<'_>,
    event: DialogEvent,
) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // ============================================================
        // Busy guard: one submission at a time, triggers are no-ops
        // ============================================================
        (
            DialogState::Submitting { .. },
            DialogEvent::QuickAction { .. }
            | DialogEvent::UserText { .. }
            | DialogEvent::RecommendationChosen { .. }
            | DialogEvent::MealChosen { .. }
            | DialogEvent::SkipRecommendation { .. }
            | DialogEvent::ApplyRequested { .. },
        ) => Err(TransitionError::Busy),

        // ============================================================
        // Quick actions (always restart the pending slot)
        // ============================================================
        (_, DialogEvent::QuickAction { action }) => Ok(match action {
            QuickAction::Replace => quick_replace(ctx),
            QuickAction::Restaurant => quick_restaurant(ctx, vec![]),
            QuickAction::Transport => quick_transport(ctx),
        }),

        // ============================================================
        // Freeform text, routed by the pending slot
        // ============================================================
        (DialogState::PendingMealSlot { prompt }, DialogEvent::UserText { text }) => {
            let user = user_message(&text, ctx.now);
            match MealSlot::from_reply(&text) {
                Some(meal) => Ok(submit_meal(prompt, meal, ctx).with_lead_effect(user)),
                None => Ok(TransitionResult::new(DialogState::PendingMealSlot {
                    prompt: prompt.clone(),
                })
                .with_effect(DialogEffect::Append(user))
                .with_effect(DialogEffect::Append(assistant_message(
                    "meal-help",
                    "아침, 점심, 저녁 중 하나를 선택해 주세요.",
                    ctx.now,
                )))),
            }
        }

        (DialogState::PendingReplace, DialogEvent::UserText { text }) => {
            if let Some(FocusTarget::Activity { day, name, .. }) = ctx.focus {
                let user = user_message(&text, ctx.now);
                let replacement = text.trim().to_string();
                let change = proposal::replacement_change(*day, name, &replacement, None);
                Ok(TransitionResult::new(DialogState::Submitting {
                    submission: SubmissionKind::Replace {
                        target: name.clone(),
                        replacement,
                    },
                })
                .with_effect(DialogEffect::SubmitChanges {
                    source_message_id: user.id.clone(),
                    changes: vec![change],
                })
                .with_lead_effect(user))
            } else {
                Ok(generic_chat(state, ctx, &text))
            }
        }

        (DialogState::PendingRestaurant { prompt }, DialogEvent::UserText { text }) => {
            let user = user_message(&text, ctx.now);
            let restaurant = Recommendation::named(text.trim());
            Ok(meal_slot_question(restaurant, prompt.day, ctx.now).with_lead_effect(user))
        }

        (DialogState::PendingTransport, DialogEvent::UserText { text }) => {
            if let Some(FocusTarget::Transport { day, from, to }) = ctx.focus {
                let user = user_message(&text, ctx.now);
                let mode = proposal::detect_transport_mode(&text);
                let change = proposal::transport_change(*day, from, to, mode);
                Ok(TransitionResult::new(DialogState::Submitting {
                    submission: SubmissionKind::Transport {
                        from: from.clone(),
                        to: to.clone(),
                        mode,
                    },
                })
                .with_effect(DialogEffect::SubmitChanges {
                    source_message_id: user.id.clone(),
                    changes: vec![change],
                })
                .with_lead_effect(user))
            } else {
                Ok(generic_chat(state, ctx, &text))
            }
        }

        (DialogState::Idle, DialogEvent::UserText { text }) => {
            if is_restaurant_request(&text) {
                let user = user_message(&text, ctx.now);
                Ok(quick_restaurant(ctx, vec![DialogEffect::Append(user)]))
            } else {
                Ok(generic_chat(state, ctx, &text))
            }
        }

        // ============================================================
        // Recommendation cards and sub-prompt replies
        // ============================================================
        (_, DialogEvent::RecommendationChosen { message_id, recommendation }) => {
            if recommendation.source == Some(RecommendationSource::Replacement) {
                if let Some(FocusTarget::Activity { day, name, .. }) = ctx.focus {
                    let change = proposal::replacement_change(
                        *day,
                        name,
                        &recommendation.name,
                        Some(&recommendation),
                    );
                    Ok(TransitionResult::new(DialogState::Submitting {
                        submission: SubmissionKind::Replace {
                            target: name.clone(),
                            replacement: recommendation.name,
                        },
                    })
                    .with_effect(DialogEffect::SubmitChanges {
                        source_message_id: message_id,
                        changes: vec![change],
                    }))
                } else {
                    // Focus vanished between offering and picking
                    Ok(TransitionResult::new(state.clone()))
                }
            } else {
                let day = ctx.context_day();
                Ok(meal_slot_question(recommendation, day, ctx.now))
            }
        }

        (DialogState::PendingMealSlot { prompt }, DialogEvent::MealChosen { meal }) => {
            Ok(submit_meal(prompt, meal, ctx))
        }

        // Meal buttons outside an open prompt do nothing
        (_, DialogEvent::MealChosen { .. }) => Ok(TransitionResult::new(state.clone())),

        (DialogState::PendingRestaurant { prompt }, DialogEvent::SkipRecommendation { message_id })
            if prompt.message_id == message_id =>
        {
            Ok(TransitionResult::new(DialogState::Idle).with_effect(DialogEffect::Append(
                system_message("skip", "네 일정에 반영하지 않겠습니다.", ctx.now),
            )))
        }

        // Skips for already-resolved prompts do nothing
        (_, DialogEvent::SkipRecommendation { .. }) => Ok(TransitionResult::new(state.clone())),

        // ============================================================
        // Apply a change preview
        // ============================================================
        (_, DialogEvent::ApplyRequested { message_id, changes }) => {
            if changes.is_empty() {
                return Ok(TransitionResult::new(state.clone()));
            }
            Ok(TransitionResult::new(DialogState::Submitting {
                submission: SubmissionKind::Apply,
            })
            .with_effect(DialogEffect::SubmitChanges {
                source_message_id: message_id,
                changes,
            }))
        }

        // ============================================================
        // Surface lifecycle
        // ============================================================
        (_, DialogEvent::SurfaceClosed) => Ok(TransitionResult::new(DialogState::Idle)
            .with_effect(DialogEffect::ClearFocus)
            .with_effect(DialogEffect::FireHighlight)),

        // ============================================================
        // Submission completions
        // ============================================================
        (_, DialogEvent::ChatCompleted { reply, updated_itinerary }) => {
            let mut result =
                TransitionResult::new(settle(state)).with_effect(DialogEffect::Append(reply));
            if let Some(itinerary) = updated_itinerary {
                result = result.with_effect(DialogEffect::ReplaceItinerary(itinerary));
            }
            Ok(result)
        }

        (
            _,
            DialogEvent::ApplyCompleted {
                source_message_id,
                changes,
                updated_itinerary,
                system_message: backend_text,
            },
        ) => {
            let (prefix, fallback) = apply_done_text(state);
            let mut result = TransitionResult::new(settle(state))
                .with_effect(DialogEffect::ReplaceItinerary(updated_itinerary))
                .with_effect(DialogEffect::StageHighlight { changes });
            if matches!(
                state,
                DialogState::Submitting { submission: SubmissionKind::Apply }
            ) {
                result = result.with_effect(DialogEffect::MarkPreviewApplied {
                    message_id: source_message_id,
                });
            }
            Ok(result.with_effect(DialogEffect::Append(system_message(
                prefix,
                &backend_text.unwrap_or(fallback),
                ctx.now,
            ))))
        }

        (_, DialogEvent::SubmissionFailed { message }) => {
            let (prefix, template) = failure_text(state, &message);
            Ok(TransitionResult::new(DialogState::Idle)
                .with_effect(DialogEffect::Append(assistant_message(prefix, &template, ctx.now))))
        }
    }
}

// ============================================================================
// Quick-action entries
// ============================================================================

fn quick_replace(ctx: &DialogContext<'_>) -> TransitionResult {
    let Some(FocusTarget::Activity { name, location, .. }) = ctx.focus else {
        return TransitionResult::new(DialogState::Idle).with_effect(DialogEffect::Append(
            assistant_message(
                "need-target",
                "변경할 장소 카드를 더블클릭해서 선택해 주세요.",
                ctx.now,
            ),
        ));
    };
    let city = if location.is_empty() {
        ctx.itinerary.first_city()
    } else {
        location
    };
    let message = preview_message(
        "replace",
        format!(
            "{name}을 일정에서 제거하겠습니다. 대신 이 자리에 들어갈 장소를 추천해드릴게요. \
             아래와 같은 장소는 어떠신가요? 모두 마음에 안드신다면 가고 싶은 곳을 직접 입력해주세요"
        ),
        Preview::Recommendation {
            title: format!("{name} 대체 추천"),
            recommendations: proposal::replacement_suggestions(city),
        },
        ctx.now,
    );
    TransitionResult::new(DialogState::PendingReplace).with_effect(DialogEffect::Append(message))
}

fn quick_restaurant(ctx: &DialogContext<'_>, lead: Vec<DialogEffect>) -> TransitionResult {
    let city = match ctx.focus {
        Some(FocusTarget::Activity { location, .. }) if !location.is_empty() => location.as_str(),
        _ => ctx.itinerary.first_city(),
    };
    let anchor = match ctx.focus {
        Some(focus) => focus.label(),
        None => city.to_string(),
    };
    let day = ctx.context_day();
    let message = preview_message(
        "restaurant",
        format!(
            "{anchor} 주변에서 가볼 만한 맛집을 골라봤어요. 마음에 드는 곳을 선택하면 일정에 \
             반영해드리겠습니다."
        ),
        Preview::Recommendation {
            title: format!("{anchor} 주변 추천"),
            recommendations: proposal::restaurant_suggestions(city, &anchor),
        },
        ctx.now,
    );
    let message_id = message.id.clone();
    let mut result = TransitionResult::new(DialogState::PendingRestaurant {
        prompt: RestaurantPrompt { message_id, day },
    });
    result.effects = lead;
    result.with_effect(DialogEffect::Append(message))
}

fn quick_transport(ctx: &DialogContext<'_>) -> TransitionResult {
    let Some(FocusTarget::Transport { from, to, .. }) = ctx.focus else {
        return TransitionResult::new(DialogState::Idle).with_effect(DialogEffect::Append(
            assistant_message(
                "need-transport",
                "교통을 바꿀 이동 카드를 더블클릭해 주세요.",
                ctx.now,
            ),
        ));
    };
    TransitionResult::new(DialogState::PendingTransport).with_effect(DialogEffect::Append(
        assistant_message(
            "transport",
            &format!(
                "{from}과 {to} 사이의 이동 수단을 무엇으로 변경하고 싶으신가요? \
                 (자동차, 대중교통, 자전거 등이 있습니다)"
            ),
            ctx.now,
        ),
    ))
}

// ============================================================================
// Flow helpers
// ============================================================================

fn is_restaurant_request(text: &str) -> bool {
    let lowered = text.to_lowercase();
    RESTAURANT_KEYWORDS.iter().any(|kw| lowered.contains(kw))
}

/// Ask which meal slot the chosen restaurant should occupy
fn meal_slot_question(
    restaurant: Recommendation,
    day: u32,
    now: DateTime<Utc>,
) -> TransitionResult {
    let question = assistant_message(
        "meal",
        "아침 식사, 점심 식사, 저녁 식사 일정 중 어디에 반영해드릴까요?",
        now,
    );
    let prompt = MealPrompt {
        restaurant,
        day,
        message_id: question.id.clone(),
    };
    TransitionResult::new(DialogState::PendingMealSlot { prompt })
        .with_effect(DialogEffect::Append(question))
}

fn submit_meal(prompt: &MealPrompt, meal: MealSlot, ctx: &DialogContext<'_>) -> TransitionResult {
    let activities = ctx.itinerary.activities_for_day(prompt.day);
    let change = proposal::meal_change(activities, prompt.day, meal, &prompt.restaurant);
    TransitionResult::new(DialogState::Submitting {
        submission: SubmissionKind::Meal {
            meal,
            restaurant: prompt.restaurant.name.clone(),
        },
    })
    .with_effect(DialogEffect::SubmitChanges {
        source_message_id: prompt.message_id.clone(),
        changes: vec![change],
    })
}

/// Forward text to the chat backend, tagging the current pending slot
fn generic_chat(state: &DialogState, ctx: &DialogContext<'_>, text: &str) -> TransitionResult {
    let user = user_message(text, ctx.now);
    TransitionResult::new(DialogState::Submitting {
        submission: SubmissionKind::Chat,
    })
    .with_effect(DialogEffect::SendChat {
        text: text.to_string(),
        timestamp: ctx.now,
        pending_action: state.pending_action(),
    })
    .with_lead_effect(user)
}

/// Post-completion state: a resolved submission settles to Idle; a
/// completion that arrives after the surface already moved on (accepted
/// leak) leaves the current state alone
fn settle(state: &DialogState) -> DialogState {
    if state.is_busy() {
        DialogState::Idle
    } else {
        state.clone()
    }
}

fn apply_done_text(state: &DialogState) -> (&'static str, String) {
    match state {
        DialogState::Submitting {
            submission: SubmissionKind::Replace { target, replacement },
        } => (
            "replace-done",
            format!("{target}을 {replacement}으로 변경했어요."),
        ),
        DialogState::Submitting {
            submission: SubmissionKind::Transport { from, to, mode },
        } => (
            "transport-done",
            format!("{from} → {to} 구간을 {}로 변경했습니다.", mode.label()),
        ),
        DialogState::Submitting {
            submission: SubmissionKind::Meal { meal, restaurant },
        } => (
            "meal-apply",
            format!("{} 일정이 {restaurant}으로 변경되었습니다.", meal.label()),
        ),
        _ => ("apply", "변경사항을 일정에 반영했습니다.".to_string()),
    }
}

fn failure_text(state: &DialogState, message: &str) -> (&'static str, String) {
    match state {
        DialogState::Submitting {
            submission: SubmissionKind::Replace { .. },
        } => (
            "replace-error",
            format!("변경 처리 중 오류가 발생했습니다: {message}"),
        ),
        DialogState::Submitting {
            submission: SubmissionKind::Transport { .. },
        } => (
            "transport-error",
            format!("요청을 처리하는 중 문제가 발생했습니다: {message}"),
        ),
        DialogState::Submitting {
            submission: SubmissionKind::Meal { .. },
        } => (
            "meal-error",
            format!("요청 처리 중 오류가 발생했습니다: {message}"),
        ),
        DialogState::Submitting {
            submission: SubmissionKind::Apply,
        } => (
            "apply-error",
            format!("변경사항 적용 중 오류가 발생했습니다: {message}"),
        ),
        _ => (
            "error",
            format!("요청을 처리하는 중 문제가 발생했습니다: {message}"),
        ),
    }
}

// ============================================================================
// Message construction
// ============================================================================

fn message_id(prefix: &str, now: DateTime<Utc>) -> String {
    format!("{prefix}-{}", now.timestamp_millis())
}

fn base_message(prefix: &str, text: &str, sender: ChatSender, now: DateTime<Utc>) -> ChatMessage {
    ChatMessage {
        id: message_id(prefix, now),
        text: text.to_string(),
        sender,
        timestamp: now,
        variant: None,
        preview: None,
    }
}

fn user_message(text: &str, now: DateTime<Utc>) -> ChatMessage {
    base_message("user", text, ChatSender::User, now)
}

fn assistant_message(prefix: &str, text: &str, now: DateTime<Utc>) -> ChatMessage {
    base_message(prefix, text, ChatSender::Assistant, now)
}

fn system_message(prefix: &str, text: &str, now: DateTime<Utc>) -> ChatMessage {
    let mut message = base_message(prefix, text, ChatSender::Assistant, now);
    message.variant = Some(MessageVariant::System);
    message
}

fn preview_message(
    prefix: &str,
    text: String,
    preview: Preview,
    now: DateTime<Utc>,
) -> ChatMessage {
    let mut message = base_message(prefix, &text, ChatSender::Assistant, now);
    message.preview = Some(preview);
    message
}

impl TransitionResult {
    /// Prepend an effect (the user's own message goes first in the log)
    fn with_lead_effect(mut self, message: ChatMessage) -> Self {
        self.effects.insert(0, DialogEffect::Append(message));
        self
    }
}
