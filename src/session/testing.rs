//! Mock backend and fixtures for session tests

use crate::client::{
    ApplyPreviewRequest, ApplyPreviewResponse, BackendError, ChatRequest, ChatResponse,
    EditBackend,
};
use crate::model::{
    Activity, DateRange, DayOverview, Itinerary, PlannerData, Travelers,
};
use async_trait::async_trait;
use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;

/// Edit backend that returns queued responses and records every request
pub struct MockBackend {
    chat_responses: Mutex<VecDeque<Result<ChatResponse, BackendError>>>,
    apply_responses: Mutex<VecDeque<Result<ApplyPreviewResponse, BackendError>>>,
    pub chat_requests: Mutex<Vec<(String, ChatRequest)>>,
    pub apply_requests: Mutex<Vec<(String, ApplyPreviewRequest)>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            chat_responses: Mutex::new(VecDeque::new()),
            apply_responses: Mutex::new(VecDeque::new()),
            chat_requests: Mutex::new(Vec::new()),
            apply_requests: Mutex::new(Vec::new()),
        }
    }

    pub fn queue_chat(&self, response: ChatResponse) {
        self.chat_responses.lock().unwrap().push_back(Ok(response));
    }

    pub fn queue_chat_error(&self, error: BackendError) {
        self.chat_responses.lock().unwrap().push_back(Err(error));
    }

    pub fn queue_apply(&self, response: ApplyPreviewResponse) {
        self.apply_responses.lock().unwrap().push_back(Ok(response));
    }

    pub fn queue_apply_error(&self, error: BackendError) {
        self.apply_responses.lock().unwrap().push_back(Err(error));
    }

    pub fn chat_count(&self) -> usize {
        self.chat_requests.lock().unwrap().len()
    }

    pub fn apply_count(&self) -> usize {
        self.apply_requests.lock().unwrap().len()
    }

    pub fn last_apply_request(&self) -> Option<ApplyPreviewRequest> {
        self.apply_requests.lock().unwrap().last().map(|(_, r)| r.clone())
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EditBackend for MockBackend {
    async fn send_chat(
        &self,
        itinerary_id: &str,
        payload: &ChatRequest,
    ) -> Result<ChatResponse, BackendError> {
        self.chat_requests
            .lock()
            .unwrap()
            .push((itinerary_id.to_string(), payload.clone()));
        self.chat_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(BackendError::network("no mock chat response queued")))
    }

    async fn apply_preview(
        &self,
        itinerary_id: &str,
        payload: &ApplyPreviewRequest,
    ) -> Result<ApplyPreviewResponse, BackendError> {
        self.apply_requests
            .lock()
            .unwrap()
            .push((itinerary_id.to_string(), payload.clone()));
        self.apply_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(BackendError::network("no mock apply response queued")))
    }
}

// ============================================================================
// Fixtures
// ============================================================================

pub fn activity(id: &str, name: &str, location: &str) -> Activity {
    Activity {
        id: id.to_string(),
        name: name.to_string(),
        location: location.to_string(),
        lat: None,
        lng: None,
        time: "10:00".to_string(),
        duration: "1시간".to_string(),
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

fn day_overview(day: u32) -> DayOverview {
    DayOverview {
        day,
        date: format!("2025-05-0{day}"),
        title: format!("Day {day}"),
        photo: String::new(),
        activities: vec![],
        locations: vec![],
        transports: vec![],
    }
}

/// Two-day itinerary: day 1 has a museum, a lunch slot and a park (in that
/// order), day 2 has a single gallery
pub fn sample_itinerary(id: &str) -> Itinerary {
    let mut activities_by_day = BTreeMap::new();
    activities_by_day.insert(
        "1".to_string(),
        vec![
            activity("a1", "루브르 박물관", "파리"),
            activity("a2", "점심 식사", "파리 시내"),
            activity("a3", "튈르리 정원", "파리"),
        ],
    );
    activities_by_day.insert(
        "2".to_string(),
        vec![activity("b1", "오르세 미술관", "파리")],
    );
    Itinerary {
        id: id.to_string(),
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
            styles: vec!["문화".to_string()],
            transport_mode: None,
        },
        overview: vec![day_overview(1), day_overview(2)],
        activities_by_day,
        created_at: "2025-04-01T00:00:00Z".to_string(),
        updated_at: "2025-04-01T00:00:00Z".to_string(),
    }
}
