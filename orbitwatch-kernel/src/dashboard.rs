/**
 * DASHBOARD - État unique : registre satellites + cycle de vie des alertes
 *
 * RÔLE : Point de mutation unique. Chaque mutation réussie publie un
 * DashboardEvent pour que le rendu de scène se redessine.
 *
 * CONCURRENCE : utilisé derrière `Shared<Dashboard>`, une mutation = un tour
 * sous le verrou. Aucune opération n'attend d'I/O.
 */

use crate::alerts::{AlertBook, ExecuteOutcome};
use crate::events::{DashboardEvent, EventBus};
use crate::models::{Alert, AlertId, LogEntry, Satellite, SatelliteId, SatelliteInput};
use crate::registry::{RegistryError, SatelliteRegistry};
use crate::scene::{build_frame, SceneFrame};

pub struct Dashboard {
    registry: SatelliteRegistry,
    alerts: AlertBook,
    events: EventBus,
}

impl Dashboard {
    pub fn new(events: EventBus) -> Self {
        Self {
            registry: SatelliteRegistry::new(),
            alerts: AlertBook::new(),
            events,
        }
    }

    pub fn add_satellite(&mut self, input: &SatelliteInput) -> Result<Satellite, RegistryError> {
        let satellite = self.registry.add_satellite(input)?;
        tracing::info!(id = %satellite.id, name = %satellite.name, "satellite added");
        self.events.publish(DashboardEvent::SatelliteAdded { satellite: satellite.clone() });
        Ok(satellite)
    }

    /// Ajoute les alertes issues d'une évaluation.
    /// No-op si le satellite n'est plus dans le registre.
    pub fn raise_alerts(&mut self, satellite_id: SatelliteId, alerts: Vec<Alert>) -> Vec<Alert> {
        if !self.registry.contains(satellite_id) {
            tracing::debug!(id = %satellite_id, "evaluation finished for absent satellite, ignored");
            return Vec::new();
        }

        let mut raised = Vec::with_capacity(alerts.len());
        for mut alert in alerts {
            alert.satellite_id = satellite_id;
            if self.alerts.push(alert.clone()) {
                tracing::warn!(satellite = %satellite_id, kind = ?alert.kind, message = %alert.message, "alert raised");
                self.events.publish(DashboardEvent::AlertRaised { alert: alert.clone() });
                raised.push(alert);
            }
        }
        raised
    }

    pub fn execute_action(&mut self, alert_id: AlertId) -> ExecuteOutcome {
        let outcome = self.alerts.execute(alert_id, &self.registry);
        self.announce(&outcome);
        outcome
    }

    fn announce(&self, outcome: &ExecuteOutcome) {
        match outcome {
            ExecuteOutcome::Executed { alert, entry } => {
                tracing::info!(alert = %alert.id, "{}", entry.text);
                self.events.publish(DashboardEvent::AlertExecuted {
                    alert: alert.clone(),
                    entry: entry.clone(),
                });
            }
            ExecuteOutcome::Noop => tracing::debug!("execute ignored, alert already handled"),
        }
    }

    pub fn satellites(&self) -> Vec<Satellite> {
        self.registry.list()
    }

    pub fn satellite(&self, id: SatelliteId) -> Option<Satellite> {
        self.registry.get(id).cloned()
    }

    pub fn satellite_count(&self) -> usize {
        self.registry.len()
    }

    pub fn active_alerts(&self) -> Vec<Alert> {
        self.alerts.active().to_vec()
    }

    pub fn execution_log(&self) -> Vec<LogEntry> {
        self.alerts.log().to_vec()
    }

    pub fn scene(&self) -> SceneFrame {
        build_frame(&self.registry, &self.alerts)
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AlertKind;

    fn dashboard() -> Dashboard {
        Dashboard::new(EventBus::new(16))
    }

    #[test]
    fn test_valid_add_grows_registry_by_one() {
        let mut dash = dashboard();
        let before = dash.satellite_count();
        let sat = dash.add_satellite(&SatelliteInput::new("ISS", "400", "51.6")).unwrap();
        assert_eq!(dash.satellite_count(), before + 1);
        assert_eq!(dash.satellite(sat.id).unwrap().name, "ISS");
    }

    #[test]
    fn test_raise_for_absent_satellite_is_noop() {
        let mut dash = dashboard();
        let alert = Alert::new(SatelliteId(99), AlertKind::Conjunction, "debris", "dodge");
        assert!(dash.raise_alerts(SatelliteId(99), vec![alert]).is_empty());
        assert!(dash.active_alerts().is_empty());
    }

    #[tokio::test]
    async fn test_mutations_publish_events() {
        let mut dash = dashboard();
        let mut rx = dash.events().subscribe();

        let sat = dash.add_satellite(&SatelliteInput::new("ISS", "400", "51.6")).unwrap();
        let alert = Alert::new(sat.id, AlertKind::Conjunction, "possible collision with debris", "perform evasive maneuver or adjust orbit");
        dash.raise_alerts(sat.id, vec![alert.clone()]);
        dash.execute_action(alert.id);
        dash.execute_action(alert.id);

        let names: Vec<_> = (0..3).map(|_| rx.try_recv().unwrap().name()).collect();
        assert_eq!(names, vec!["satellite_added", "alert_raised", "alert_executed"]);
        assert!(rx.try_recv().is_err());
        assert_eq!(dash.execution_log().len(), 1);
    }
}
