//! Reconciliation of applied changes against the fresh itinerary
//!
//! A successful apply returns a brand new itinerary with fresh activity
//! ids, so the change descriptors have to be fuzzy-matched back onto it to
//! find the entity the edit referred to. The match is best-effort: no hit
//! means no highlight, never an error.

use crate::matching::find_activity_index;
use crate::model::{Change, ChangeAction, Itinerary};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

/// How long a fired highlight stays visible
pub const HIGHLIGHT_DURATION: Duration = Duration::from_millis(2600);

/// Entity anchor for a transient highlight
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Highlight {
    Activity { day: u32, activity_id: String },
    /// A leg is anchored on the earlier of its two adjacent activities
    Transport { day: u32, from_activity_id: String },
}

/// Locate the entity an applied change set referred to inside the new
/// itinerary.
///
/// Transport changes resolve through both endpoint names and require the
/// matches to sit on adjacent indices; activity changes (replace/add/
/// modify) resolve through the new location, falling back to the replaced
/// one. When a change set carries both, the activity resolution wins.
/// First match wins throughout; `None` means nothing will be highlighted.
pub fn resolve_highlight(
    changes: &[Change],
    itinerary: &Itinerary,
    fallback_day: u32,
) -> Option<Highlight> {
    let transport = changes
        .iter()
        .find(|c| c.action == ChangeAction::Transport)
        .and_then(|c| resolve_transport(c, itinerary, fallback_day));

    let activity = changes
        .iter()
        .find(|c| {
            matches!(
                c.action,
                ChangeAction::Replace | ChangeAction::Add | ChangeAction::Modify
            )
        })
        .and_then(|c| resolve_activity(c, itinerary, fallback_day));

    activity.or(transport)
}

fn resolve_transport(
    change: &Change,
    itinerary: &Itinerary,
    fallback_day: u32,
) -> Option<Highlight> {
    let from = change.from_location.as_deref()?;
    let to = change.to_location.as_deref()?;
    let day = change.day.unwrap_or(fallback_day);
    let activities = itinerary.activities_for_day(day);
    let from_idx = find_activity_index(activities, from)?;
    let to_idx = find_activity_index(activities, to)?;
    if from_idx.abs_diff(to_idx) != 1 {
        tracing::debug!(day, from, to, "transport endpoints not adjacent, no highlight");
        return None;
    }
    let anchor = &activities[from_idx.min(to_idx)];
    Some(Highlight::Transport {
        day,
        from_activity_id: anchor.id.clone(),
    })
}

fn resolve_activity(
    change: &Change,
    itinerary: &Itinerary,
    fallback_day: u32,
) -> Option<Highlight> {
    let needle = change
        .location
        .as_deref()
        .or(change.target_location.as_deref())?;
    let day = change.day.unwrap_or(fallback_day);
    let activities = itinerary.activities_for_day(day);
    let idx = find_activity_index(activities, needle)?;
    Some(Highlight::Activity {
        day,
        activity_id: activities[idx].id.clone(),
    })
}

/// Owns the staged highlight and its clear timer.
///
/// A resolved highlight is staged first and only fired when the dialog
/// surface closes, so it never flashes behind an open overlay. Firing
/// starts a clear timer; the handle is owned here and aborted on re-fire,
/// cancel, and drop, so no timer outlives the surface that asked for it.
#[derive(Debug, Default)]
pub struct HighlightScheduler {
    pending: Option<Highlight>,
    active: Arc<Mutex<Option<Highlight>>>,
    clear_timer: Option<JoinHandle<()>>,
}

impl HighlightScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a highlight for the next surface close, replacing any
    /// previously staged one
    pub fn stage(&mut self, highlight: Highlight) {
        self.pending = Some(highlight);
    }

    /// The staged highlight, if any
    pub fn pending(&self) -> Option<&Highlight> {
        self.pending.as_ref()
    }

    /// Currently visible highlight, if the clear timer has not run yet
    pub fn active(&self) -> Option<Highlight> {
        self.active.lock().expect("highlight lock poisoned").clone()
    }

    /// Fire the staged highlight: make it active and clear it after
    /// [`HIGHLIGHT_DURATION`]. No-op when nothing is staged.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn fire(&mut self) {
        let Some(highlight) = self.pending.take() else {
            return;
        };
        if let Some(timer) = self.clear_timer.take() {
            timer.abort();
        }
        *self.active.lock().expect("highlight lock poisoned") = Some(highlight);
        let active = Arc::clone(&self.active);
        self.clear_timer = Some(tokio::spawn(async move {
            tokio::time::sleep(HIGHLIGHT_DURATION).await;
            active.lock().expect("highlight lock poisoned").take();
        }));
    }

    /// Drop everything: staged highlight, visible highlight, clear timer
    pub fn cancel(&mut self) {
        self.pending = None;
        if let Some(timer) = self.clear_timer.take() {
            timer.abort();
        }
        self.active.lock().expect("highlight lock poisoned").take();
    }
}

impl Drop for HighlightScheduler {
    fn drop(&mut self) {
        if let Some(timer) = self.clear_timer.take() {
            timer.abort();
        }
    }
}
