//! Park records and the directory filter used by the park list.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::optimistic::Identified;
use crate::types::RecordId;

/// Mean Earth radius used by [`distance_km`].
const EARTH_RADIUS_KM: f64 = 6_371.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Equipment {
    PullUpBar,
    ParallelBars,
    MonkeyBars,
    Rings,
    WallBars,
    DipStation,
}

impl Equipment {
    pub fn label(self) -> &'static str {
        match self {
            Self::PullUpBar => "Pull-up bar",
            Self::ParallelBars => "Parallel bars",
            Self::MonkeyBars => "Monkey bars",
            Self::Rings => "Rings",
            Self::WallBars => "Wall bars",
            Self::DipStation => "Dip station",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Park {
    pub id: RecordId,
    pub name: String,
    pub city: String,
    pub location: Coordinate,
    pub equipment: BTreeSet<Equipment>,
    /// Cached mean of the park's review ratings; 0 when unrated.
    pub average_rating: f64,
}

impl Identified for Park {
    fn id(&self) -> RecordId {
        self.id
    }
}

/// Great-circle distance between two coordinates (haversine).
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    let (lat1, lat2) = (a.latitude.to_radians(), b.latitude.to_radians());
    let d_lat = lat2 - lat1;
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ParkSort {
    #[default]
    Name,
    Rating,
    /// Nearest first from the given point.
    Distance(Coordinate),
}

/// Client-side search over the park directory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParkQuery {
    /// Case-insensitive substring matched against name and city.
    pub text: String,
    /// Every listed piece of equipment must be present.
    pub equipment: BTreeSet<Equipment>,
    pub min_rating: Option<f64>,
    pub sort: ParkSort,
}

impl ParkQuery {
    pub fn matches(&self, park: &Park) -> bool {
        let needle = self.text.trim().to_lowercase();
        let text_ok = needle.is_empty()
            || park.name.to_lowercase().contains(&needle)
            || park.city.to_lowercase().contains(&needle);

        let equipment_ok = self.equipment.is_subset(&park.equipment);
        let rating_ok = self.min_rating.is_none_or(|min| park.average_rating >= min);

        text_ok && equipment_ok && rating_ok
    }

    /// Filter and order `parks` according to this query.
    pub fn apply(&self, parks: &[Park]) -> Vec<Park> {
        let mut out: Vec<Park> = parks.iter().filter(|p| self.matches(p)).cloned().collect();
        match self.sort {
            ParkSort::Name => out.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase())),
            ParkSort::Rating => out.sort_by(|a, b| b.average_rating.total_cmp(&a.average_rating)),
            ParkSort::Distance(origin) => out.sort_by(|a, b| {
                distance_km(origin, a.location).total_cmp(&distance_km(origin, b.location))
            }),
        }
        out
    }
}
