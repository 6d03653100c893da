//! Persisted dashboard preferences.
//!
//! The stored value is the ordered list of enabled dashboard modules. It is
//! read once when the dashboard is built and written on every change.

use std::path::PathBuf;

use async_trait::async_trait;
use barpark_core::dashboard::DashboardModule;
use tokio::sync::RwLock;

use crate::error::ServiceError;
use crate::simulation::{Operation, Simulation};

#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// The saved module list, or `None` if nothing was ever saved.
    async fn load(&self) -> Result<Option<Vec<DashboardModule>>, ServiceError>;

    async fn save(&self, modules: &[DashboardModule]) -> Result<(), ServiceError>;
}

#[derive(Debug)]
pub struct InMemorySettingsStore {
    modules: RwLock<Option<Vec<DashboardModule>>>,
    simulation: Simulation,
}

impl InMemorySettingsStore {
    pub fn new(simulation: Simulation) -> Self {
        Self {
            modules: RwLock::new(None),
            simulation,
        }
    }

    pub fn with_modules(simulation: Simulation, modules: Vec<DashboardModule>) -> Self {
        Self {
            modules: RwLock::new(Some(modules)),
            simulation,
        }
    }
}

#[async_trait]
impl SettingsStore for InMemorySettingsStore {
    async fn load(&self) -> Result<Option<Vec<DashboardModule>>, ServiceError> {
        self.simulation.round_trip(Operation::LoadSettings).await?;
        Ok(self.modules.read().await.clone())
    }

    async fn save(&self, modules: &[DashboardModule]) -> Result<(), ServiceError> {
        self.simulation.round_trip(Operation::SaveSettings).await?;
        *self.modules.write().await = Some(modules.to_vec());
        Ok(())
    }
}

/// Stores the module list as a JSON array in a single file.
#[derive(Debug, Clone)]
pub struct JsonSettingsStore {
    path: PathBuf,
}

impl JsonSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SettingsStore for JsonSettingsStore {
    async fn load(&self) -> Result<Option<Vec<DashboardModule>>, ServiceError> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let modules: Vec<DashboardModule> = serde_json::from_slice(&raw)?;
        Ok(Some(modules))
    }

    async fn save(&self, modules: &[DashboardModule]) -> Result<(), ServiceError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let body = serde_json::to_vec_pretty(modules)?;
        // Readers only ever see a complete file.
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, body).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        tracing::debug!(path = %self.path.display(), count = modules.len(), "Dashboard settings saved");
        Ok(())
    }
}
