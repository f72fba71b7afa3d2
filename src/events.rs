use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use chrono::Utc;
use reqwest::StatusCode;
use serde_json::json;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::models::{Event, EventStatus, NewEvent};

/// Failures talking to the remote events API.
#[derive(Debug, thiserror::Error)]
pub enum EventApiError {
    #[error("event not found")]
    NotFound,
    #[error("events API returned {status}: {message}")]
    Rejected { status: StatusCode, message: String },
    #[error("events API request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

// 1. EventApi Contract
/// EventApi
///
/// CRUD against the system of record for events. The provider below caches what
/// this returns; implementations do no caching of their own.
#[async_trait]
pub trait EventApi: Send + Sync {
    async fn list_events(&self) -> Result<Vec<Event>, EventApiError>;
    async fn get_event(&self, id: Uuid) -> Result<Event, EventApiError>;
    async fn create_event(&self, event: NewEvent) -> Result<Event, EventApiError>;
    async fn update_status(&self, id: Uuid, status: EventStatus) -> Result<Event, EventApiError>;
    async fn delete_event(&self, id: Uuid) -> Result<(), EventApiError>;
}

// 2. The Real Implementation
/// RemoteEventApi
///
/// JSON-over-HTTP client for `{base_url}/events`.
#[derive(Clone)]
pub struct RemoteEventApi {
    client: reqwest::Client,
    base_url: String,
}

impl RemoteEventApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, EventApiError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn events_url(&self) -> String {
        format!("{}/events", self.base_url)
    }

    fn event_url(&self, id: Uuid) -> String {
        format!("{}/events/{}", self.base_url, id)
    }
}

/// Maps non-success statuses onto `EventApiError`.
async fn check(response: reqwest::Response) -> Result<reqwest::Response, EventApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::NOT_FOUND {
        return Err(EventApiError::NotFound);
    }
    let message = response.text().await.unwrap_or_default();
    Err(EventApiError::Rejected { status, message })
}

#[async_trait]
impl EventApi for RemoteEventApi {
    async fn list_events(&self) -> Result<Vec<Event>, EventApiError> {
        let response = self.client.get(self.events_url()).send().await?;
        Ok(check(response).await?.json().await?)
    }

    async fn get_event(&self, id: Uuid) -> Result<Event, EventApiError> {
        let response = self.client.get(self.event_url(id)).send().await?;
        Ok(check(response).await?.json().await?)
    }

    async fn create_event(&self, event: NewEvent) -> Result<Event, EventApiError> {
        let response = self
            .client
            .post(self.events_url())
            .json(&event)
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    async fn update_status(&self, id: Uuid, status: EventStatus) -> Result<Event, EventApiError> {
        let response = self
            .client
            .put(format!("{}/status", self.event_url(id)))
            .json(&json!({ "status": status }))
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    async fn delete_event(&self, id: Uuid) -> Result<(), EventApiError> {
        let response = self.client.delete(self.event_url(id)).send().await?;
        check(response).await?;
        Ok(())
    }
}

// 3. The Mock Implementation (Testing)
/// MockEventApi
///
/// In-memory stand-in for the remote API. `new_failing` makes every call fail with
/// a 503 rejection. Counts upstream calls so cache behaviour can be observed.
#[derive(Default)]
pub struct MockEventApi {
    events: RwLock<HashMap<Uuid, Event>>,
    failing: bool,
    calls: AtomicUsize,
}

impl MockEventApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_events(events: impl IntoIterator<Item = Event>) -> Self {
        Self {
            events: RwLock::new(events.into_iter().map(|e| (e.id, e)).collect()),
            ..Self::default()
        }
    }

    pub fn new_failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    /// Number of calls that reached this API.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn enter(&self) -> Result<(), EventApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            return Err(EventApiError::Rejected {
                status: StatusCode::SERVICE_UNAVAILABLE,
                message: "mock failure".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl EventApi for MockEventApi {
    async fn list_events(&self) -> Result<Vec<Event>, EventApiError> {
        self.enter()?;
        Ok(self.events.read().await.values().cloned().collect())
    }

    async fn get_event(&self, id: Uuid) -> Result<Event, EventApiError> {
        self.enter()?;
        self.events
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(EventApiError::NotFound)
    }

    async fn create_event(&self, event: NewEvent) -> Result<Event, EventApiError> {
        self.enter()?;
        let NewEvent { request, status } = event;
        let created = Event {
            id: Uuid::new_v4(),
            title: request.title,
            description: request.description,
            venue: request.venue,
            starts_at: request.starts_at,
            ends_at: request.ends_at,
            capacity: request.capacity,
            status,
            created_at: Utc::now(),
        };
        self.events.write().await.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update_status(&self, id: Uuid, status: EventStatus) -> Result<Event, EventApiError> {
        self.enter()?;
        let mut events = self.events.write().await;
        let event = events.get_mut(&id).ok_or(EventApiError::NotFound)?;
        event.status = status;
        Ok(event.clone())
    }

    async fn delete_event(&self, id: Uuid) -> Result<(), EventApiError> {
        self.enter()?;
        self.events
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(EventApiError::NotFound)
    }
}

// 4. The Provider
#[derive(Default)]
struct EventCache {
    events: HashMap<Uuid, Event>,
    // Set after the first full listing. Single fetches alone do not make the list complete.
    loaded: bool,
}

/// EventProvider
///
/// Process-wide event state: a cache of records fetched through an `EventApi`.
/// Writes go to the API first and only touch the cache once the API accepted them.
///
/// Refreshes and writes are serialized on `sync`, so a listing fetched before a
/// write can never replace the cache after that write landed.
pub struct EventProvider {
    api: Arc<dyn EventApi>,
    cache: RwLock<EventCache>,
    sync: Mutex<()>,
}

pub type EventProviderState = Arc<EventProvider>;

impl EventProvider {
    pub fn new(api: Arc<dyn EventApi>) -> Self {
        Self {
            api,
            cache: RwLock::new(EventCache::default()),
            sync: Mutex::new(()),
        }
    }

    /// Reloads the full list from the API, replacing the cache.
    pub async fn refresh(&self) -> Result<usize, EventApiError> {
        let _sync = self.sync.lock().await;
        let events = self.api.list_events().await?;
        let count = events.len();
        let mut cache = self.cache.write().await;
        cache.events = events.into_iter().map(|e| (e.id, e)).collect();
        cache.loaded = true;
        tracing::debug!(count, "event cache refreshed");
        Ok(count)
    }

    /// All events ordered by start time. Loads the cache on first use.
    pub async fn list(&self) -> Result<Vec<Event>, EventApiError> {
        if !self.cache.read().await.loaded {
            self.refresh().await?;
        }
        let mut events: Vec<Event> = self.cache.read().await.events.values().cloned().collect();
        events.sort_by(|a, b| a.starts_at.cmp(&b.starts_at).then(a.id.cmp(&b.id)));
        Ok(events)
    }

    pub async fn get(&self, id: Uuid) -> Result<Event, EventApiError> {
        if let Some(event) = self.cache.read().await.events.get(&id) {
            return Ok(event.clone());
        }
        let _sync = self.sync.lock().await;
        let event = self.api.get_event(id).await?;
        self.cache.write().await.events.insert(id, event.clone());
        Ok(event)
    }

    pub async fn create(&self, event: NewEvent) -> Result<Event, EventApiError> {
        let _sync = self.sync.lock().await;
        let created = self.api.create_event(event).await?;
        self.cache
            .write()
            .await
            .events
            .insert(created.id, created.clone());
        tracing::info!(event_id = %created.id, status = ?created.status, "event created");
        Ok(created)
    }

    pub async fn update_status(&self, id: Uuid, status: EventStatus) -> Result<Event, EventApiError> {
        let _sync = self.sync.lock().await;
        let updated = self.api.update_status(id, status).await?;
        self.cache
            .write()
            .await
            .events
            .insert(updated.id, updated.clone());
        tracing::info!(event_id = %id, ?status, "event status updated");
        Ok(updated)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), EventApiError> {
        let _sync = self.sync.lock().await;
        let result = self.api.delete_event(id).await;
        // Gone upstream either way once the API reports NotFound.
        if matches!(result, Ok(()) | Err(EventApiError::NotFound)) {
            self.cache.write().await.events.remove(&id);
        }
        result
    }
}
