/**
 * REGISTRE SATELLITES - Collection ordonnée des satellites fictifs
 *
 * RÔLE : Validation de la saisie utilisateur, attribution des identifiants,
 * stockage indexé id -> satellite. Ajout uniquement : ni mise à jour ni suppression.
 *
 * ORDRE : les ids sont dérivés de l'horloge et strictement croissants, donc
 * l'itération du BTreeMap suit l'ordre d'insertion.
 */

use crate::models::{Satellite, SatelliteId, SatelliteInput};
use std::collections::BTreeMap;
use time::OffsetDateTime;

pub const UNKNOWN_SATELLITE: &str = "Unknown Satellite";

/// Raisons de rejet d'une saisie satellite
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegistryError {
    #[error("Missing field: {0}")]
    MissingField(&'static str),
    #[error("Invalid number for {field}: {value:?}")]
    InvalidNumber { field: &'static str, value: String },
}

#[derive(Debug, Default)]
pub struct SatelliteRegistry {
    satellites: BTreeMap<SatelliteId, Satellite>,
    last_id: u64,
}

impl SatelliteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Valide la saisie et ajoute le satellite en fin de registre
    pub fn add_satellite(&mut self, input: &SatelliteInput) -> Result<Satellite, RegistryError> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(RegistryError::MissingField("name"));
        }
        let altitude = parse_field("altitude", &input.altitude)?;
        let inclination = parse_field("inclination", &input.inclination)?;

        let now = OffsetDateTime::now_utc();
        let id = self.next_id(now);
        let satellite = Satellite {
            id,
            name: name.to_string(),
            altitude,
            inclination,
            created_at: now,
        };
        self.satellites.insert(id, satellite.clone());
        Ok(satellite)
    }

    fn next_id(&mut self, now: OffsetDateTime) -> SatelliteId {
        let millis = (now.unix_timestamp_nanos() / 1_000_000).max(0) as u64;
        // deux créations dans la même milliseconde
        self.last_id = millis.max(self.last_id + 1);
        SatelliteId(self.last_id)
    }

    pub fn get(&self, id: SatelliteId) -> Option<&Satellite> {
        self.satellites.get(&id)
    }

    pub fn contains(&self, id: SatelliteId) -> bool {
        self.satellites.contains_key(&id)
    }

    /// Nom affichable, avec repli si l'id ne correspond à rien
    pub fn name_of(&self, id: SatelliteId) -> &str {
        self.satellites
            .get(&id)
            .map(|s| s.name.as_str())
            .unwrap_or(UNKNOWN_SATELLITE)
    }

    pub fn list(&self) -> Vec<Satellite> {
        self.satellites.values().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Satellite> {
        self.satellites.values()
    }

    pub fn len(&self) -> usize {
        self.satellites.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.satellites.is_empty()
    }
}

fn parse_field(field: &'static str, raw: &str) -> Result<f64, RegistryError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(RegistryError::MissingField(field));
    }
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(RegistryError::InvalidNumber { field, value: raw.to_string() }),
    }
}
