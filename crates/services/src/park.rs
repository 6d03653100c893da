//! Park directory service.

use async_trait::async_trait;
use barpark_core::park::Park;
use tokio::sync::RwLock;

use crate::error::ServiceError;
use crate::simulation::{Operation, Simulation};

#[async_trait]
pub trait ParkService: Send + Sync {
    /// Every known park.
    async fn fetch_all(&self) -> Result<Vec<Park>, ServiceError>;
}

#[derive(Debug)]
pub struct InMemoryParkService {
    parks: RwLock<Vec<Park>>,
    simulation: Simulation,
}

impl InMemoryParkService {
    pub fn new(simulation: Simulation, parks: Vec<Park>) -> Self {
        Self {
            parks: RwLock::new(parks),
            simulation,
        }
    }
}

#[async_trait]
impl ParkService for InMemoryParkService {
    async fn fetch_all(&self) -> Result<Vec<Park>, ServiceError> {
        self.simulation.round_trip(Operation::FetchParks).await?;
        Ok(self.parks.read().await.clone())
    }
}
