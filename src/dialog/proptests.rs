//! Property-based tests for the dialog state machine
//!
//! These verify the invariants that matter across all inputs: one
//! submission at a time, no pending action without a matching focus, and
//! clean resets on failure and surface close.

#![allow(clippy::single_match_else)]

use super::state::*;
use super::transition::*;
use super::*;
use crate::model::{
    Activity, ChatSender, DateRange, Itinerary, MealSlot, PlannerData, Recommendation,
    RecommendationSource, TransportMode, Travelers, ViewMode,
};
use chrono::{DateTime, Utc};
use proptest::prelude::*;
use std::collections::BTreeMap;

// ============================================================================
// Test Helpers
// ============================================================================

fn test_now() -> DateTime<Utc> {
    DateTime::from_timestamp(1_714_000_000, 0).unwrap()
}

fn activity(id: &str, name: &str) -> Activity {
    Activity {
        id: id.to_string(),
        name: name.to_string(),
        location: "파리".to_string(),
        lat: None,
        lng: None,
        time: "10:00".to_string(),
        duration: "2시간".to_string(),
        description: String::new(),
        image: String::new(),
        open_hours: String::new(),
        price: String::new(),
        tips: vec![],
        nearby_food: vec![],
        estimated_duration: String::new(),
        best_time: String::new(),
    }
}

fn test_itinerary() -> Itinerary {
    let mut activities_by_day = BTreeMap::new();
    activities_by_day.insert(
        "1".to_string(),
        vec![
            activity("a1", "루브르 박물관"),
            activity("a2", "점심 식사"),
            activity("a3", "튈르리 정원"),
        ],
    );
    Itinerary {
        id: "it-test".to_string(),
        planner_data: PlannerData {
            country: "프랑스".to_string(),
            cities: vec!["파리".to_string()],
            date_range: DateRange {
                start: "2025-05-01".to_string(),
                end: "2025-05-03".to_string(),
            },
            travelers: Travelers {
                adults: 2,
                children: 0,
                kind: "couple".to_string(),
            },
            styles: vec![],
            transport_mode: None,
        },
        overview: vec![],
        activities_by_day,
        created_at: String::new(),
        updated_at: String::new(),
    }
}

fn ctx<'a>(itinerary: &'a Itinerary, focus: Option<&'a FocusTarget>) -> DialogContext<'a> {
    DialogContext {
        itinerary,
        focus,
        view: ViewMode::Daily,
        current_day: 1,
        now: test_now(),
    }
}

fn submission_effects(result: &TransitionResult) -> usize {
    result.effects.iter().filter(|e| e.is_submission()).count()
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_focus() -> impl Strategy<Value = Option<FocusTarget>> {
    prop_oneof![
        Just(None),
        Just(Some(FocusTarget::Activity {
            day: 1,
            activity_id: "a1".to_string(),
            name: "루브르 박물관".to_string(),
            location: "파리".to_string(),
        })),
        Just(Some(FocusTarget::Transport {
            day: 1,
            from: "루브르 박물관".to_string(),
            to: "튈르리 정원".to_string(),
        })),
    ]
}

fn arb_submission() -> impl Strategy<Value = SubmissionKind> {
    prop_oneof![
        Just(SubmissionKind::Chat),
        Just(SubmissionKind::Apply),
        "[a-z가-힣]{1,10}".prop_map(|s| SubmissionKind::Replace {
            target: s.clone(),
            replacement: s,
        }),
        Just(SubmissionKind::Transport {
            from: "박물관".to_string(),
            to: "공원".to_string(),
            mode: TransportMode::Transit,
        }),
        Just(SubmissionKind::Meal {
            meal: MealSlot::Lunch,
            restaurant: "비스트로".to_string(),
        }),
    ]
}

fn arb_state() -> impl Strategy<Value = DialogState> {
    prop_oneof![
        Just(DialogState::Idle),
        Just(DialogState::PendingReplace),
        Just(DialogState::PendingRestaurant {
            prompt: RestaurantPrompt {
                message_id: "restaurant-1".to_string(),
                day: 1,
            },
        }),
        Just(DialogState::PendingMealSlot {
            prompt: MealPrompt {
                restaurant: Recommendation::named("비스트로"),
                day: 1,
                message_id: "meal-1".to_string(),
            },
        }),
        Just(DialogState::PendingTransport),
        arb_submission().prop_map(|submission| DialogState::Submitting { submission }),
    ]
}

fn arb_quick_action() -> impl Strategy<Value = QuickAction> {
    prop_oneof![
        Just(QuickAction::Replace),
        Just(QuickAction::Restaurant),
        Just(QuickAction::Transport),
    ]
}

fn arb_user_event() -> impl Strategy<Value = DialogEvent> {
    prop_oneof![
        arb_quick_action().prop_map(|action| DialogEvent::QuickAction { action }),
        "[a-z가-힣 ]{1,30}".prop_map(|text| DialogEvent::UserText { text }),
        Just(DialogEvent::RecommendationChosen {
            message_id: "restaurant-1".to_string(),
            recommendation: Recommendation::named("비스트로"),
        }),
        Just(DialogEvent::MealChosen {
            meal: MealSlot::Dinner,
        }),
        Just(DialogEvent::SkipRecommendation {
            message_id: "restaurant-1".to_string(),
        }),
        Just(DialogEvent::ApplyRequested {
            message_id: "preview-1".to_string(),
            changes: vec![crate::model::Change::new(crate::model::ChangeAction::Replace)],
        }),
    ]
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// While a submission is in flight every user trigger is rejected
    #[test]
    fn busy_rejects_all_user_triggers(
        submission in arb_submission(),
        event in arb_user_event(),
        focus in arb_focus(),
    ) {
        let itinerary = test_itinerary();
        let state = DialogState::Submitting { submission };
        let result = transition(&state, &ctx(&itinerary, focus.as_ref()), event);
        prop_assert!(matches!(result, Err(TransitionError::Busy)));
    }

    /// No transition ever produces more than one network submission
    #[test]
    fn at_most_one_submission_per_transition(
        state in arb_state(),
        event in arb_user_event(),
        focus in arb_focus(),
    ) {
        let itinerary = test_itinerary();
        if let Ok(result) = transition(&state, &ctx(&itinerary, focus.as_ref()), event) {
            prop_assert!(submission_effects(&result) <= 1);
        }
    }

    /// Replace/transport quick actions without a matching-kind focus never
    /// submit and never arm a pending action
    #[test]
    fn unfocused_quick_action_never_arms(state in arb_state()) {
        let itinerary = test_itinerary();
        for action in [QuickAction::Replace, QuickAction::Transport] {
            let event = DialogEvent::QuickAction { action };
            match transition(&state, &ctx(&itinerary, None), event) {
                Ok(result) => {
                    prop_assert_eq!(submission_effects(&result), 0);
                    prop_assert!(result.new_state.pending_action().is_none());
                    prop_assert_eq!(result.new_state, DialogState::Idle);
                }
                Err(TransitionError::Busy) => prop_assert!(state.is_busy()),
            }
        }
    }

    /// A wrong-kind focus is as good as no focus for the guards
    #[test]
    fn wrong_kind_focus_never_arms(state in arb_state()) {
        let itinerary = test_itinerary();
        let transport_focus = FocusTarget::Transport {
            day: 1,
            from: "루브르 박물관".to_string(),
            to: "튈르리 정원".to_string(),
        };
        let event = DialogEvent::QuickAction { action: QuickAction::Replace };
        if let Ok(result) = transition(&state, &ctx(&itinerary, Some(&transport_focus)), event) {
            prop_assert_eq!(submission_effects(&result), 0);
            prop_assert_eq!(result.new_state, DialogState::Idle);
        }
    }

    /// Closing the surface resets everything and fires the staged highlight
    #[test]
    fn surface_close_resets(state in arb_state(), focus in arb_focus()) {
        let itinerary = test_itinerary();
        let result = transition(
            &state,
            &ctx(&itinerary, focus.as_ref()),
            DialogEvent::SurfaceClosed,
        ).unwrap();
        prop_assert_eq!(&result.new_state, &DialogState::Idle);
        prop_assert_eq!(submission_effects(&result), 0);
        prop_assert!(result.effects.iter().any(|e| matches!(e, DialogEffect::ClearFocus)));
        prop_assert!(result.effects.iter().any(|e| matches!(e, DialogEffect::FireHighlight)));
    }

    /// A failed submission always settles to Idle with exactly one message
    #[test]
    fn failure_always_settles_to_idle(state in arb_state(), msg in "[a-z ]{1,20}") {
        let itinerary = test_itinerary();
        let result = transition(
            &state,
            &ctx(&itinerary, None),
            DialogEvent::SubmissionFailed { message: msg },
        ).unwrap();
        prop_assert_eq!(&result.new_state, &DialogState::Idle);
        let appended = result
            .effects
            .iter()
            .filter(|e| matches!(e, DialogEffect::Append(_)))
            .count();
        prop_assert_eq!(appended, 1);
        prop_assert_eq!(submission_effects(&result), 0);
    }

    /// Restaurant-sourced cards always open the meal prompt; replacement-
    /// sourced cards never do
    #[test]
    fn recommendation_routing_by_source(state in arb_state(), focus in arb_focus()) {
        let itinerary = test_itinerary();
        let mut restaurant = Recommendation::named("비스트로");
        restaurant.source = Some(RecommendationSource::Restaurant);
        let mut replacement = Recommendation::named("오르세 미술관");
        replacement.source = Some(RecommendationSource::Replacement);

        let context = ctx(&itinerary, focus.as_ref());
        if let Ok(result) = transition(&state, &context, DialogEvent::RecommendationChosen {
            message_id: "m1".to_string(),
            recommendation: restaurant,
        }) {
            let entered_meal_slot = matches!(result.new_state, DialogState::PendingMealSlot { .. });
            prop_assert!(entered_meal_slot);
        }
        if let Ok(result) = transition(&state, &context, DialogEvent::RecommendationChosen {
            message_id: "m1".to_string(),
            recommendation: replacement,
        }) {
            // A replacement card never *enters* the meal prompt (a no-op
            // pick from inside one stays put)
            if !matches!(state, DialogState::PendingMealSlot { .. }) {
                let entered_meal_slot = matches!(result.new_state, DialogState::PendingMealSlot { .. });
                prop_assert!(!entered_meal_slot);
            }
        }
    }
}

// ============================================================================
// Targeted transition tests
// ============================================================================

#[cfg(test)]
mod scenarios {
    use super::*;
    use crate::model::{ChangeAction, Preview};

    fn activity_focus() -> FocusTarget {
        FocusTarget::Activity {
            day: 1,
            activity_id: "a1".to_string(),
            name: "루브르 박물관".to_string(),
            location: "파리".to_string(),
        }
    }

    #[test]
    fn replace_quick_action_offers_recommendations() {
        let itinerary = test_itinerary();
        let focus = activity_focus();
        let result = transition(
            &DialogState::Idle,
            &ctx(&itinerary, Some(&focus)),
            DialogEvent::QuickAction {
                action: QuickAction::Replace,
            },
        )
        .unwrap();
        assert_eq!(result.new_state, DialogState::PendingReplace);
        let DialogEffect::Append(message) = &result.effects[0] else {
            panic!("expected appended message");
        };
        assert!(matches!(message.preview, Some(Preview::Recommendation { .. })));
    }

    #[test]
    fn restaurant_without_focus_anchors_on_first_city() {
        let itinerary = test_itinerary();
        let result = transition(
            &DialogState::Idle,
            &ctx(&itinerary, None),
            DialogEvent::QuickAction {
                action: QuickAction::Restaurant,
            },
        )
        .unwrap();
        let DialogState::PendingRestaurant { prompt } = &result.new_state else {
            panic!("expected restaurant prompt");
        };
        assert_eq!(prompt.day, 1);
        let DialogEffect::Append(message) = &result.effects[0] else {
            panic!("expected appended message");
        };
        assert!(message.text.starts_with("파리 주변에서"));
    }

    #[test]
    fn typed_replacement_submits_one_replace_change() {
        let itinerary = test_itinerary();
        let focus = activity_focus();
        let result = transition(
            &DialogState::PendingReplace,
            &ctx(&itinerary, Some(&focus)),
            DialogEvent::UserText {
                text: "오르세 미술관".to_string(),
            },
        )
        .unwrap();
        assert!(result.new_state.is_busy());
        let DialogEffect::SubmitChanges { changes, .. } = &result.effects[1] else {
            panic!("expected submission");
        };
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].action, ChangeAction::Replace);
        assert_eq!(changes[0].target_location.as_deref(), Some("루브르 박물관"));
        assert_eq!(changes[0].location.as_deref(), Some("오르세 미술관"));
    }

    #[test]
    fn meal_keyword_reply_submits_against_matched_activity() {
        let itinerary = test_itinerary();
        let state = DialogState::PendingMealSlot {
            prompt: MealPrompt {
                restaurant: Recommendation::named("리옹 비스트로"),
                day: 1,
                message_id: "meal-1".to_string(),
            },
        };
        let result = transition(
            &state,
            &ctx(&itinerary, None),
            DialogEvent::UserText {
                text: "점심으로 부탁해".to_string(),
            },
        )
        .unwrap();
        let DialogEffect::SubmitChanges { changes, source_message_id } = &result.effects[1] else {
            panic!("expected submission");
        };
        assert_eq!(source_message_id, "meal-1");
        assert_eq!(changes[0].target_location.as_deref(), Some("점심 식사"));
    }

    #[test]
    fn unrecognized_meal_reply_keeps_prompt_open() {
        let itinerary = test_itinerary();
        let state = DialogState::PendingMealSlot {
            prompt: MealPrompt {
                restaurant: Recommendation::named("리옹 비스트로"),
                day: 1,
                message_id: "meal-1".to_string(),
            },
        };
        let result = transition(
            &state,
            &ctx(&itinerary, None),
            DialogEvent::UserText {
                text: "아무 때나 좋아".to_string(),
            },
        )
        .unwrap();
        assert_eq!(result.new_state, state);
        assert_eq!(submission_effects(&result), 0);
    }

    #[test]
    fn transport_text_maps_subway_to_transit() {
        let itinerary = test_itinerary();
        let focus = FocusTarget::Transport {
            day: 1,
            from: "루브르 박물관".to_string(),
            to: "튈르리 정원".to_string(),
        };
        let result = transition(
            &DialogState::PendingTransport,
            &ctx(&itinerary, Some(&focus)),
            DialogEvent::UserText {
                text: "지하철로 바꿔줘".to_string(),
            },
        )
        .unwrap();
        let DialogEffect::SubmitChanges { changes, .. } = &result.effects[1] else {
            panic!("expected submission");
        };
        assert_eq!(changes[0].mode, Some(TransportMode::Transit));
        assert_eq!(changes[0].from_location.as_deref(), Some("루브르 박물관"));
    }

    #[test]
    fn skip_only_clears_its_own_prompt() {
        let itinerary = test_itinerary();
        let state = DialogState::PendingRestaurant {
            prompt: RestaurantPrompt {
                message_id: "restaurant-1".to_string(),
                day: 1,
            },
        };
        let stale = transition(
            &state,
            &ctx(&itinerary, None),
            DialogEvent::SkipRecommendation {
                message_id: "restaurant-0".to_string(),
            },
        )
        .unwrap();
        assert_eq!(stale.new_state, state);
        assert!(stale.effects.is_empty());

        let current = transition(
            &state,
            &ctx(&itinerary, None),
            DialogEvent::SkipRecommendation {
                message_id: "restaurant-1".to_string(),
            },
        )
        .unwrap();
        assert_eq!(current.new_state, DialogState::Idle);
    }

    #[test]
    fn freeform_restaurant_request_opens_prompt_from_idle() {
        let itinerary = test_itinerary();
        let result = transition(
            &DialogState::Idle,
            &ctx(&itinerary, None),
            DialogEvent::UserText {
                text: "근처 맛집 추천해줘".to_string(),
            },
        )
        .unwrap();
        assert!(matches!(result.new_state, DialogState::PendingRestaurant { .. }));
        assert_eq!(submission_effects(&result), 0);
        // User message first, then the recommendation preview
        let DialogEffect::Append(first) = &result.effects[0] else {
            panic!("expected appended message");
        };
        assert_eq!(first.sender, ChatSender::User);
    }

    #[test]
    fn plain_chat_goes_to_backend_with_null_pending_action() {
        let itinerary = test_itinerary();
        let result = transition(
            &DialogState::Idle,
            &ctx(&itinerary, None),
            DialogEvent::UserText {
                text: "2일차 일정을 더 알차게 만들어줘".to_string(),
            },
        )
        .unwrap();
        assert!(result.new_state.is_busy());
        let DialogEffect::SendChat { pending_action, .. } = &result.effects[1] else {
            panic!("expected chat submission");
        };
        assert!(pending_action.is_none());
    }

    #[test]
    fn apply_completed_annotates_preview_and_stages_highlight() {
        let itinerary = test_itinerary();
        let state = DialogState::Submitting {
            submission: SubmissionKind::Apply,
        };
        let changes = vec![crate::model::Change::new(ChangeAction::Replace)];
        let result = transition(
            &state,
            &ctx(&itinerary, None),
            DialogEvent::ApplyCompleted {
                source_message_id: "preview-9".to_string(),
                changes,
                updated_itinerary: Box::new(test_itinerary()),
                system_message: None,
            },
        )
        .unwrap();
        assert_eq!(result.new_state, DialogState::Idle);
        assert!(result.effects.iter().any(|e| matches!(
            e,
            DialogEffect::MarkPreviewApplied { message_id } if message_id == "preview-9"
        )));
        assert!(result
            .effects
            .iter()
            .any(|e| matches!(e, DialogEffect::StageHighlight { .. })));
        // Replace-itinerary must precede highlight staging
        let replace_idx = result
            .effects
            .iter()
            .position(|e| matches!(e, DialogEffect::ReplaceItinerary(_)))
            .unwrap();
        let stage_idx = result
            .effects
            .iter()
            .position(|e| matches!(e, DialogEffect::StageHighlight { .. }))
            .unwrap();
        assert!(replace_idx < stage_idx);
    }

    #[test]
    fn late_completion_after_close_still_lands() {
        let itinerary = test_itinerary();
        let result = transition(
            &DialogState::Idle,
            &ctx(&itinerary, None),
            DialogEvent::ApplyCompleted {
                source_message_id: "user-1".to_string(),
                changes: vec![],
                updated_itinerary: Box::new(test_itinerary()),
                system_message: None,
            },
        )
        .unwrap();
        assert_eq!(result.new_state, DialogState::Idle);
        assert!(result
            .effects
            .iter()
            .any(|e| matches!(e, DialogEffect::ReplaceItinerary(_))));
        let appended: Vec<_> = result
            .effects
            .iter()
            .filter_map(|e| match e {
                DialogEffect::Append(m) => Some(m),
                _ => None,
            })
            .collect();
        assert_eq!(appended.len(), 1);
        // The submission context is gone, so the generic confirmation is used
        assert_eq!(appended[0].text, "변경사항을 일정에 반영했습니다.");
    }

    #[test]
    fn backend_system_message_wins_over_template() {
        let itinerary = test_itinerary();
        let state = DialogState::Submitting {
            submission: SubmissionKind::Replace {
                target: "루브르 박물관".to_string(),
                replacement: "오르세 미술관".to_string(),
            },
        };
        let result = transition(
            &state,
            &ctx(&itinerary, None),
            DialogEvent::ApplyCompleted {
                source_message_id: "user-1".to_string(),
                changes: vec![],
                updated_itinerary: Box::new(test_itinerary()),
                system_message: Some("일정을 변경했습니다.".to_string()),
            },
        )
        .unwrap();
        let appended: Vec<_> = result
            .effects
            .iter()
            .filter_map(|e| match e {
                DialogEffect::Append(m) => Some(m),
                _ => None,
            })
            .collect();
        assert_eq!(appended.len(), 1);
        assert_eq!(appended[0].text, "일정을 변경했습니다.");
    }
}
