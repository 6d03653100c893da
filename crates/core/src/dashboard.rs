//! Dashboard module kinds and the ordered enabled-module list.
//!
//! The set of modules is closed: each [`DashboardModule`] maps to its title
//! and content description through exhaustive matches, so adding a kind is
//! a compile error everywhere it is not yet handled.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DashboardModule {
    NearbyParks,
    UpcomingEvents,
    WorkoutProgress,
    RecentPhotos,
    PersonalRecords,
    TopRatedParks,
}

/// What a dashboard card shows for a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleContent {
    ParkList { limit: usize, by_rating: bool },
    EventList { limit: usize },
    PhotoGrid { limit: usize },
    ProgressChart,
    RecordTable,
}

impl DashboardModule {
    pub const ALL: [DashboardModule; 6] = [
        Self::NearbyParks,
        Self::UpcomingEvents,
        Self::WorkoutProgress,
        Self::RecentPhotos,
        Self::PersonalRecords,
        Self::TopRatedParks,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Self::NearbyParks => "Parks near you",
            Self::UpcomingEvents => "Upcoming events",
            Self::WorkoutProgress => "Workout progress",
            Self::RecentPhotos => "Recent photos",
            Self::PersonalRecords => "Personal records",
            Self::TopRatedParks => "Top rated parks",
        }
    }

    pub fn content(self) -> ModuleContent {
        match self {
            Self::NearbyParks => ModuleContent::ParkList {
                limit: 3,
                by_rating: false,
            },
            Self::TopRatedParks => ModuleContent::ParkList {
                limit: 3,
                by_rating: true,
            },
            Self::UpcomingEvents => ModuleContent::EventList { limit: 3 },
            Self::RecentPhotos => ModuleContent::PhotoGrid { limit: 6 },
            Self::WorkoutProgress => ModuleContent::ProgressChart,
            Self::PersonalRecords => ModuleContent::RecordTable,
        }
    }
}

/// Modules enabled on a fresh install, in display order.
pub fn default_modules() -> Vec<DashboardModule> {
    vec![
        DashboardModule::NearbyParks,
        DashboardModule::UpcomingEvents,
        DashboardModule::WorkoutProgress,
    ]
}

/// Enable `module` (appending it) or disable it when already present.
/// Returns whether it is enabled afterwards.
pub fn toggle_module(modules: &mut Vec<DashboardModule>, module: DashboardModule) -> bool {
    if let Some(index) = modules.iter().position(|m| *m == module) {
        modules.remove(index);
        false
    } else {
        modules.push(module);
        true
    }
}

/// Move the module at `from` so it ends up at index `to`.
pub fn move_module(
    modules: &mut Vec<DashboardModule>,
    from: usize,
    to: usize,
) -> Result<(), CoreError> {
    let len = modules.len();
    if from >= len || to >= len {
        return Err(CoreError::Validation(format!(
            "Cannot move module from {from} to {to} in a list of {len}"
        )));
    }
    let module = modules.remove(from);
    modules.insert(to, module);
    Ok(())
}

/// Drop duplicates while keeping first occurrences, e.g. after loading a
/// hand-edited settings file.
pub fn dedup_modules(modules: Vec<DashboardModule>) -> Vec<DashboardModule> {
    let mut out: Vec<DashboardModule> = Vec::with_capacity(modules.len());
    for module in modules {
        if !out.contains(&module) {
            out.push(module);
        }
    }
    out
}
