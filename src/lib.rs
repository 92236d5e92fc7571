//! wayfarer — conversational itinerary-editing core
//!
//! A Rust core for refining a generated multi-day travel itinerary through
//! quick actions and freeform chat. The heart is a pure dialog state
//! machine ([`dialog`]) driven by an [`session::EditSession`]: surface
//! gestures become events, transitions produce effects, and the two
//! network effects talk to the itinerary edit service through
//! [`client::EditBackend`]. Applied edits are fuzzy-matched back onto the
//! fresh itinerary ([`reconcile`]) so the affected entity can be flashed
//! when the dialog surface closes.

pub mod client;
pub mod dialog;
pub mod log;
pub mod matching;
pub mod model;
pub mod prefs;
pub mod proposal;
pub mod reconcile;
pub mod session;

pub use client::{EditBackend, HttpEditClient};
pub use dialog::{DialogState, FocusTarget, QuickAction};
pub use model::{Itinerary, MealSlot, ViewMode};
pub use session::EditSession;
