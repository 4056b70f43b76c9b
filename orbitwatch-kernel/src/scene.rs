//! Frame de scène pour le rendu du globe.
//!
//! Positions de présentation uniquement (trigonométrie, pas de mécanique orbitale).

use crate::alerts::AlertBook;
use crate::models::SatelliteId;
use crate::registry::SatelliteRegistry;
use serde::Serialize;
use std::f64::consts::TAU;

/// Rayon terrestre moyen en km, le globe fait 1 unité de rayon
const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenePoint {
    pub id: SatelliteId,
    pub name: String,
    pub position: [f64; 3],
    pub hazard: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneFrame {
    pub satellites: Vec<ScenePoint>,
    pub hazard_count: usize,
}

pub fn build_frame(registry: &SatelliteRegistry, alerts: &AlertBook) -> SceneFrame {
    let hazardous = alerts.hazardous_satellites();
    let total = registry.len();

    let satellites: Vec<ScenePoint> = registry
        .iter()
        .enumerate()
        .map(|(index, sat)| ScenePoint {
            id: sat.id,
            name: sat.name.clone(),
            position: position(index, total, sat.altitude, sat.inclination),
            hazard: hazardous.contains(&sat.id),
        })
        .collect();

    let hazard_count = satellites.iter().filter(|p| p.hazard).count();
    SceneFrame { satellites, hazard_count }
}

/// Position déterministe : index -> azimut, inclinaison -> élévation, altitude -> rayon
pub fn position(index: usize, total: usize, altitude_km: f64, inclination_deg: f64) -> [f64; 3] {
    let radius = 1.0 + altitude_km / EARTH_RADIUS_KM;
    let azimuth = index as f64 * TAU / total.max(1) as f64;
    let elevation = azimuth.sin() * inclination_deg.to_radians();

    [
        radius * elevation.cos() * azimuth.cos(),
        radius * elevation.sin(),
        radius * elevation.cos() * azimuth.sin(),
    ]
}
