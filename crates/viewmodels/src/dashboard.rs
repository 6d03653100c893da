//! Dashboard module preferences: which cards are shown and in what order.
//!
//! The list is loaded once from a [`SettingsStore`] and saved after every
//! change. A failed save puts the previous order back.

use std::sync::Arc;

use barpark_core::dashboard::{self, DashboardModule};
use barpark_core::notice::{visible_banner, ErrorBanner};
use barpark_events::{ChangeEvent, ChangeKind, ChangePhase};
use barpark_services::SettingsStore;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::outcome::Outcome;
use crate::session::Session;

#[derive(Debug, Default)]
struct DashboardState {
    modules: Vec<DashboardModule>,
    banner: Option<ErrorBanner>,
}

#[derive(Clone)]
pub struct DashboardViewModel {
    session: Session,
    store: Arc<dyn SettingsStore>,
    state: Arc<RwLock<DashboardState>>,
}

impl DashboardViewModel {
    /// Read the saved module list, falling back to the defaults when
    /// nothing is saved or the store can't be read.
    pub async fn load(session: Session, store: Arc<dyn SettingsStore>) -> Self {
        let modules = match store.load().await {
            Ok(Some(saved)) => dashboard::dedup_modules(saved),
            Ok(None) => dashboard::default_modules(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load dashboard settings, using defaults");
                dashboard::default_modules()
            }
        };
        tracing::info!(count = modules.len(), "Dashboard modules loaded");

        Self {
            session,
            store,
            state: Arc::new(RwLock::new(DashboardState {
                modules,
                banner: None,
            })),
        }
    }

    /// Enable a module (appended at the end) or disable it.
    pub async fn toggle(&self, module: DashboardModule) -> Outcome {
        self.change(|modules| {
            dashboard::toggle_module(modules, module);
            true
        })
        .await
    }

    /// Drag-and-drop reorder. Out-of-range indices are skipped.
    pub async fn move_module(&self, from: usize, to: usize) -> Outcome {
        self.change(|modules| from != to && dashboard::move_module(modules, from, to).is_ok())
            .await
    }

    /// Apply `edit` locally, then persist. `edit` returns `false` when it
    /// made no change.
    async fn change(&self, edit: impl FnOnce(&mut Vec<DashboardModule>) -> bool) -> Outcome {
        let (previous, updated) = {
            let mut state = self.state.write().await;
            let previous = state.modules.clone();
            if !edit(&mut state.modules) {
                return Outcome::Skipped;
            }
            (previous, state.modules.clone())
        };
        self.announce(&updated, ChangePhase::Optimistic);

        match self.store.save(&updated).await {
            Ok(()) => {
                self.announce(&updated, ChangePhase::Confirmed);
                Outcome::Committed
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to save dashboard settings");
                {
                    let mut state = self.state.write().await;
                    if state.modules == updated {
                        state.modules = previous.clone();
                    }
                    state.banner = Some(ErrorBanner::new("Couldn't save your dashboard", Utc::now()));
                }
                self.announce(&previous, ChangePhase::RolledBack);
                Outcome::Reverted(e)
            }
        }
    }

    fn announce(&self, modules: &[DashboardModule], phase: ChangePhase) {
        self.session.publish(
            ChangeEvent::new(ChangeKind::DashboardChanged)
                .with_phase(phase)
                .with_payload(serde_json::json!({ "modules": modules })),
        );
    }

    /// Enabled modules in display order.
    pub async fn modules(&self) -> Vec<DashboardModule> {
        self.state.read().await.modules.clone()
    }

    pub async fn is_enabled(&self, module: DashboardModule) -> bool {
        self.state.read().await.modules.contains(&module)
    }

    /// Modules the user could still enable.
    pub async fn available(&self) -> Vec<DashboardModule> {
        let state = self.state.read().await;
        DashboardModule::ALL
            .into_iter()
            .filter(|m| !state.modules.contains(m))
            .collect()
    }

    pub async fn error_banner(&self) -> Option<ErrorBanner> {
        let state = self.state.read().await;
        visible_banner(&state.banner, Utc::now()).cloned()
    }

    pub async fn dismiss_error(&self) {
        self.state.write().await.banner = None;
    }
}
