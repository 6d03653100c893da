//! Park directory: the full park list with a client-side query.

use std::sync::Arc;

use barpark_core::notice::LoadState;
use barpark_core::optimistic;
use barpark_core::park::{Park, ParkQuery};
use barpark_core::types::RecordId;
use barpark_events::{ChangeEvent, ChangeKind};
use barpark_services::ParkService;
use tokio::sync::RwLock;

use crate::session::Session;

#[derive(Debug, Default)]
struct ParkState {
    load_state: LoadState,
    parks: Vec<Park>,
    query: ParkQuery,
}

#[derive(Clone)]
pub struct ParkDirectoryViewModel {
    session: Session,
    service: Arc<dyn ParkService>,
    state: Arc<RwLock<ParkState>>,
}

impl ParkDirectoryViewModel {
    pub fn new(session: Session, service: Arc<dyn ParkService>) -> Self {
        Self {
            session,
            service,
            state: Arc::default(),
        }
    }

    pub async fn open(session: Session, service: Arc<dyn ParkService>) -> Self {
        let vm = Self::new(session, service);
        vm.load().await;
        vm
    }

    pub async fn load(&self) {
        self.state.write().await.load_state = LoadState::Loading;

        let result = self.service.fetch_all().await;

        let mut state = self.state.write().await;
        match result {
            Ok(parks) => {
                tracing::info!(count = parks.len(), "Parks loaded");
                state.parks = parks;
                state.load_state = LoadState::Ready;
                self.session.publish(ChangeEvent::new(ChangeKind::ParksLoaded));
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to load parks");
                state.parks.clear();
                state.load_state = LoadState::Failed(e.to_string());
            }
        }
    }

    pub async fn retry(&self) {
        self.load().await;
    }

    pub async fn set_query(&self, query: ParkQuery) {
        self.state.write().await.query = query;
    }

    pub async fn query(&self) -> ParkQuery {
        self.state.read().await.query.clone()
    }

    /// Parks matching the current query, in query order.
    pub async fn results(&self) -> Vec<Park> {
        let state = self.state.read().await;
        state.query.apply(&state.parks)
    }

    pub async fn park(&self, park_id: RecordId) -> Option<Park> {
        optimistic::find(&self.state.read().await.parks, park_id).cloned()
    }

    pub async fn load_state(&self) -> LoadState {
        self.state.read().await.load_state.clone()
    }
}
