/**
 * CYCLE DE VIE DES ALERTES - Alertes actives + journal des exécutions
 *
 * RÔLE :
 * Stocke les alertes en attente produites par l'évaluation des risques et
 * retire une alerte lorsque l'utilisateur exécute son action de mitigation.
 *
 * INVARIANT : la collection active ne contient que des alertes `executed == false`.
 * Marquer exécutée + retirer + journaliser se fait dans une seule opération.
 */

use crate::models::{Alert, AlertId, LogEntry, SatelliteId};
use crate::registry::SatelliteRegistry;
use serde::Serialize;
use std::collections::HashSet;
use time::OffsetDateTime;

/// Résultat d'une demande d'exécution
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExecuteOutcome {
    Executed { alert: Alert, entry: LogEntry },
    /// Alerte déjà exécutée ou inconnue : rien ne change
    Noop,
}

#[derive(Debug, Default)]
pub struct AlertBook {
    active: Vec<Alert>,
    log: Vec<LogEntry>,
}

impl AlertBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ajoute une alerte en attente. Une alerte déjà exécutée est ignorée.
    pub fn push(&mut self, alert: Alert) -> bool {
        if alert.executed {
            return false;
        }
        self.active.push(alert);
        true
    }

    /// Exécute l'action d'une alerte en attente et la retire de l'ensemble actif
    pub fn execute(&mut self, alert_id: AlertId, registry: &SatelliteRegistry) -> ExecuteOutcome {
        match self.get(alert_id).cloned() {
            Some(alert) => self.execute_alert(&alert, registry),
            None => ExecuteOutcome::Noop,
        }
    }

    /// Variante prenant l'alerte elle-même : garde d'idempotence sur le flag
    pub fn execute_alert(&mut self, alert: &Alert, registry: &SatelliteRegistry) -> ExecuteOutcome {
        if alert.executed {
            return ExecuteOutcome::Noop;
        }
        let Some(pos) = self.active.iter().position(|a| a.id == alert.id) else {
            return ExecuteOutcome::Noop;
        };

        let mut alert = self.active.remove(pos);
        alert.executed = true;

        let entry = LogEntry {
            alert_id: alert.id,
            satellite_id: alert.satellite_id,
            text: format_log_text(registry.name_of(alert.satellite_id), &alert.action),
            executed_at: OffsetDateTime::now_utc(),
        };
        self.log.push(entry.clone());

        ExecuteOutcome::Executed { alert, entry }
    }

    pub fn get(&self, alert_id: AlertId) -> Option<&Alert> {
        self.active.iter().find(|a| a.id == alert_id)
    }

    pub fn active(&self) -> &[Alert] {
        &self.active
    }

    pub fn log(&self) -> &[LogEntry] {
        &self.log
    }

    /// Satellites visés par au moins une alerte active
    pub fn hazardous_satellites(&self) -> HashSet<SatelliteId> {
        self.active.iter().map(|a| a.satellite_id).collect()
    }
}

fn format_log_text(satellite_name: &str, action: &str) -> String {
    format!("✅ Action executed for {satellite_name}: {action}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AlertKind, SatelliteInput};
    use crate::registry::UNKNOWN_SATELLITE;

    fn setup() -> (SatelliteRegistry, AlertBook, Alert) {
        let mut registry = SatelliteRegistry::new();
        let sat = registry.add_satellite(&SatelliteInput::new("ISS", "400", "51.6")).unwrap();
        let mut book = AlertBook::new();
        let alert = Alert::new(sat.id, AlertKind::Conjunction, "possible collision with debris", "perform evasive maneuver or adjust orbit");
        book.push(alert.clone());
        (registry, book, alert)
    }

    #[test]
    fn test_execute_once() {
        let (registry, mut book, alert) = setup();

        let outcome = book.execute(alert.id, &registry);
        let ExecuteOutcome::Executed { alert: done, entry } = outcome else {
            panic!("expected execution");
        };

        assert!(done.executed);
        assert_eq!(book.log().len(), 1);
        assert!(book.active().is_empty());
        assert!(book.get(alert.id).is_none());
        assert_eq!(entry.text, "✅ Action executed for ISS: perform evasive maneuver or adjust orbit");
    }

    #[test]
    fn test_execute_twice_is_noop() {
        let (registry, mut book, alert) = setup();

        book.execute_alert(&alert, &registry);
        let second = book.execute_alert(&alert, &registry);

        assert_eq!(second, ExecuteOutcome::Noop);
        assert_eq!(book.log().len(), 1);
        assert!(book.active().is_empty());
    }

    #[test]
    fn test_execute_by_id_then_by_stale_copy() {
        let (registry, mut book, alert) = setup();

        assert_eq!(book.execute(AlertId::new(), &registry), ExecuteOutcome::Noop);
        assert!(matches!(book.execute(alert.id, &registry), ExecuteOutcome::Executed { .. }));
        // copie antérieure à l'exécution : flag encore faux, mais plus active
        assert_eq!(book.execute_alert(&alert, &registry), ExecuteOutcome::Noop);
        assert_eq!(book.execute(alert.id, &registry), ExecuteOutcome::Noop);
        assert_eq!(book.log().len(), 1);
    }

    #[test]
    fn test_executed_flag_guard() {
        let (registry, mut book, mut alert) = setup();
        alert.executed = true;

        assert_eq!(book.execute_alert(&alert, &registry), ExecuteOutcome::Noop);
        assert_eq!(book.active().len(), 1);
        assert!(book.log().is_empty());
    }

    #[test]
    fn test_unknown_satellite_uses_fallback_label() {
        let registry = SatelliteRegistry::new();
        let mut book = AlertBook::new();
        let alert = Alert::new(SatelliteId(42), AlertKind::SpaceWeather, "CME", "power down non-critical systems, shield instruments");
        book.push(alert.clone());

        let ExecuteOutcome::Executed { entry, .. } = book.execute(alert.id, &registry) else {
            panic!("expected execution");
        };
        assert!(entry.text.contains(UNKNOWN_SATELLITE));
    }

    #[test]
    fn test_log_keeps_execution_order() {
        let (registry, mut book, first) = setup();
        let second = Alert::new(first.satellite_id, AlertKind::SpaceWeather, "CME", "shield");
        book.push(second.clone());

        book.execute(second.id, &registry);
        book.execute(first.id, &registry);

        let ids: Vec<_> = book.log().iter().map(|e| e.alert_id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[test]
    fn test_hazardous_satellites_follow_active_set() {
        let (registry, mut book, alert) = setup();
        assert!(book.hazardous_satellites().contains(&alert.satellite_id));
        book.execute(alert.id, &registry);
        assert!(book.hazardous_satellites().is_empty());
    }
}
