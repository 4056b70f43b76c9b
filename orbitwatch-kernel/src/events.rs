use crate::models::{Alert, LogEntry, Satellite};
use serde::Serialize;
use tokio::sync::broadcast;

/// Changement d'état publié après chaque mutation du dashboard.
/// Consommé par le rendu de scène (SSE) et republié sur MQTT.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DashboardEvent {
    SatelliteAdded { satellite: Satellite },
    AlertRaised { alert: Alert },
    AlertExecuted { alert: Alert, entry: LogEntry },
}

impl DashboardEvent {
    pub fn name(&self) -> &'static str {
        match self {
            DashboardEvent::SatelliteAdded { .. } => "satellite_added",
            DashboardEvent::AlertRaised { .. } => "alert_raised",
            DashboardEvent::AlertExecuted { .. } => "alert_executed",
        }
    }
}

#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<DashboardEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publie sans bloquer ; aucun abonné n'est pas une erreur
    pub fn publish(&self, event: DashboardEvent) {
        let name = event.name();
        match self.sender.send(event) {
            Ok(n) => tracing::trace!(event = name, subscribers = n, "event published"),
            Err(_) => tracing::trace!(event = name, "event dropped, no subscriber"),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DashboardEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
