//! Dialog state machine for the edit conversation
//!
//! Elm-style core: one tagged-union state, pure transitions, effects
//! executed by the session driver. The single `DialogState` value is the
//! whole story — there is no way to hold two pending actions or two open
//! sub-prompts at once.

mod effect;
mod event;
mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::DialogEffect;
pub use event::{DialogEvent, QuickAction};
pub use state::{
    DialogContext, DialogState, FocusTarget, MealPrompt, RestaurantPrompt, SubmissionKind,
};
pub use transition::{transition, TransitionError, TransitionResult};
