/**
 * ÉVALUATION DES RISQUES - Tâche différée one-shot par satellite
 *
 * RÔLE :
 * Après l'ajout d'un satellite, attend le délai configuré puis lance deux
 * contrôles indépendants :
 * - météo spatiale : flux d'advisories, première CME => une alerte
 * - conjonction : un tirage uniforme dans [0,1), >= seuil => une alerte débris
 *
 * FONCTIONNEMENT :
 * - HazardEvaluator = les deux contrôles, RNG seedable pour tests déterministes
 * - HazardScheduler = handles de tâches indexés par satellite (annulables)
 * - Fire-and-forget : aucune erreur ne remonte, un échec du flux = pas d'alerte CME
 * - Si le satellite a disparu entre-temps, la mutation est ignorée
 */

use crate::dashboard::Dashboard;
use crate::feed::{cme_messages, AdvisoryFeed};
use crate::health::HealthTracker;
use crate::models::{Alert, AlertKind, Satellite, SatelliteId, SatelliteInput};
use crate::registry::RegistryError;
use crate::state::SharedDashboard;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

pub const CME_ACTION: &str = "power down non-critical systems, shield instruments";
pub const CONJUNCTION_MESSAGE: &str = "possible collision with debris";
pub const CONJUNCTION_ACTION: &str = "perform evasive maneuver or adjust orbit";

pub struct HazardEvaluator {
    feed: Arc<dyn AdvisoryFeed>,
    rng: Mutex<fastrand::Rng>,
    quiet_below: f64,
    health: HealthTracker,
}

impl HazardEvaluator {
    pub fn new(feed: Arc<dyn AdvisoryFeed>, quiet_below: f64, seed: Option<u64>, health: HealthTracker) -> Self {
        let rng = match seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        Self { feed, rng: Mutex::new(rng), quiet_below, health }
    }

    /// Contrôle météo spatiale ; une erreur du flux vaut "pas d'alerte"
    pub async fn space_weather_check(&self, satellite_id: SatelliteId) -> Option<Alert> {
        let advisories = match self.feed.fetch().await {
            Ok(advisories) => {
                self.health.record_feed_success();
                advisories
            }
            Err(e) => {
                self.health.record_feed_failure();
                tracing::warn!(satellite = %satellite_id, "space weather feed unavailable: {e}");
                return None;
            }
        };

        cme_messages(&advisories)
            .first()
            .map(|message| Alert::new(satellite_id, AlertKind::SpaceWeather, *message, CME_ACTION))
    }

    /// Contrôle conjonction débris : un tirage, alerte si >= seuil
    pub fn conjunction_check(&self, satellite_id: SatelliteId) -> Option<Alert> {
        let draw = self.rng.lock().f64();
        if draw < self.quiet_below {
            return None;
        }
        Some(Alert::new(satellite_id, AlertKind::Conjunction, CONJUNCTION_MESSAGE, CONJUNCTION_ACTION))
    }

    /// Les deux contrôles ; l'ordre relatif n'a pas d'effet sur le résultat
    pub async fn evaluate(&self, satellite_id: SatelliteId) -> Vec<Alert> {
        let (space_weather, conjunction) = tokio::join!(
            self.space_weather_check(satellite_id),
            async { self.conjunction_check(satellite_id) }
        );
        space_weather.into_iter().chain(conjunction).collect()
    }
}

#[derive(Clone)]
pub struct HazardScheduler {
    dashboard: SharedDashboard,
    evaluator: Arc<HazardEvaluator>,
    delay: Duration,
    tasks: Arc<Mutex<HashMap<SatelliteId, JoinHandle<()>>>>,
}

impl HazardScheduler {
    pub fn new(dashboard: SharedDashboard, evaluator: Arc<HazardEvaluator>, delay: Duration) -> Self {
        Self {
            dashboard,
            evaluator,
            delay,
            tasks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Ajoute le satellite puis programme son évaluation.
    /// Saisie rejetée => aucune tâche programmée.
    pub fn add_satellite(&self, input: &SatelliteInput) -> Result<Satellite, RegistryError> {
        let satellite = self.dashboard.lock().add_satellite(input)?;
        self.schedule(satellite.id);
        Ok(satellite)
    }

    pub fn schedule(&self, satellite_id: SatelliteId) {
        let dashboard = self.dashboard.clone();
        let evaluator = self.evaluator.clone();
        let delay = self.delay;

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let alerts = evaluator.evaluate(satellite_id).await;
            let raised = apply(&dashboard, satellite_id, alerts);
            tracing::debug!(satellite = %satellite_id, raised, "hazard evaluation done");
        });

        let mut tasks = self.tasks.lock();
        tasks.retain(|_, h| !h.is_finished());
        if let Some(previous) = tasks.insert(satellite_id, handle) {
            // une seule évaluation par satellite
            previous.abort();
        }
        tracing::debug!(satellite = %satellite_id, delay_ms = delay.as_millis() as u64, "hazard evaluation scheduled");
    }

    /// Annule l'évaluation en attente ; faux si rien n'était en attente
    pub fn cancel(&self, satellite_id: SatelliteId) -> bool {
        match self.tasks.lock().remove(&satellite_id) {
            Some(handle) if !handle.is_finished() => {
                handle.abort();
                tracing::info!(satellite = %satellite_id, "hazard evaluation cancelled");
                true
            }
            _ => false,
        }
    }

    pub fn pending(&self) -> usize {
        let mut tasks = self.tasks.lock();
        tasks.retain(|_, h| !h.is_finished());
        tasks.len()
    }

    /// Abandonne toutes les évaluations (arrêt du kernel)
    pub fn shutdown(&self) {
        let tasks: Vec<_> = self.tasks.lock().drain().collect();
        let aborted = tasks.iter().filter(|(_, h)| !h.is_finished()).count();
        for (_, handle) in tasks {
            handle.abort();
        }
        if aborted > 0 {
            tracing::info!(aborted, "pending hazard evaluations aborted");
        }
    }

    /// Attend la fin de toutes les évaluations programmées
    #[cfg(test)]
    pub async fn drain(&self) {
        let tasks: Vec<_> = self.tasks.lock().drain().collect();
        for (satellite_id, handle) in tasks {
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    tracing::error!(satellite = %satellite_id, "hazard evaluation task failed: {e}");
                }
            }
        }
    }
}

fn apply(dashboard: &Mutex<Dashboard>, satellite_id: SatelliteId, alerts: Vec<Alert>) -> usize {
    if alerts.is_empty() {
        return 0;
    }
    dashboard.lock().raise_alerts(satellite_id, alerts).len()
}
