//! Data model for itineraries and the edit conversation
//!
//! Mirrors the edit service's wire format (camelCase JSON). The itinerary
//! is replaced wholesale on every successful edit; nothing in this module
//! mutates one in place.

mod chat;
mod itinerary;

pub use chat::*;
pub use itinerary::*;
