//! Change submission client
//!
//! The itinerary edit service is the only network dependency. `EditBackend`
//! is the seam the session drives; `HttpEditClient` is the production
//! implementation. Mock backends live next to the session tests.

mod error;
mod http;
mod protocol;

pub use error::{BackendError, BackendErrorKind};
pub use http::{HttpEditClient, DEFAULT_BASE_URL};
pub use protocol::*;

use async_trait::async_trait;
use std::sync::Arc;

/// Client interface to the itinerary edit service
#[async_trait]
pub trait EditBackend: Send + Sync {
    /// Forward a freeform chat turn; the backend may answer with a preview
    /// and may or may not return an updated itinerary
    async fn send_chat(
        &self,
        itinerary_id: &str,
        payload: &ChatRequest,
    ) -> Result<ChatResponse, BackendError>;

    /// Apply explicit changes; a success always carries a fresh itinerary
    async fn apply_preview(
        &self,
        itinerary_id: &str,
        payload: &ApplyPreviewRequest,
    ) -> Result<ApplyPreviewResponse, BackendError>;
}

#[async_trait]
impl<T: EditBackend + ?Sized> EditBackend for Arc<T> {
    async fn send_chat(
        &self,
        itinerary_id: &str,
        payload: &ChatRequest,
    ) -> Result<ChatResponse, BackendError> {
        (**self).send_chat(itinerary_id, payload).await
    }

    async fn apply_preview(
        &self,
        itinerary_id: &str,
        payload: &ApplyPreviewRequest,
    ) -> Result<ApplyPreviewResponse, BackendError> {
        (**self).apply_preview(itinerary_id, payload).await
    }
}
