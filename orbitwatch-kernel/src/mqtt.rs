use crate::config::MqttConf;
use crate::events::{DashboardEvent, EventBus};
use crate::health::HealthTracker;
use rumqttc::{AsyncClient, Event, Incoming, MqttOptions, QoS};
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::task;

/// Topic MQTT (contrat versionné) pour un événement du dashboard
pub fn topic_for(event: &DashboardEvent) -> &'static str {
    match event {
        DashboardEvent::SatelliteAdded { .. } => "orbitwatch/satellites/added@v1",
        DashboardEvent::AlertRaised { .. } => "orbitwatch/alerts/raised@v1",
        DashboardEvent::AlertExecuted { .. } => "orbitwatch/alerts/executed@v1",
    }
}

/// Republie chaque DashboardEvent sur le broker tant que le kernel tourne
pub fn spawn_event_publisher(conf: MqttConf, events: &EventBus, health: HealthTracker) -> task::JoinHandle<()> {
    let mut rx = events.subscribe();

    task::spawn(async move {
        let mut opts = MqttOptions::new("orbitwatch-kernel", &conf.host, conf.port);
        opts.set_keep_alive(Duration::from_secs(15));
        let (client, mut eventloop) = AsyncClient::new(opts, 32);
        health.mark_mqtt_connecting();
        tracing::info!(host = %conf.host, port = conf.port, "mqtt event publisher started");

        loop {
            tokio::select! {
                received = rx.recv() => {
                    match received {
                        Ok(event) => publish(&client, &event),
                        Err(RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "mqtt publisher lagging, events skipped");
                        }
                        Err(RecvError::Closed) => break,
                    }
                },
                polled = eventloop.poll() => {
                    match polled {
                        Ok(Event::Incoming(Incoming::ConnAck(_))) => health.mark_mqtt_connected(),
                        Ok(_) => {}
                        Err(e) => {
                            tracing::warn!("mqtt error: {e:?}");
                            health.increment_reconnects();
                            tokio::time::sleep(Duration::from_secs(2)).await;
                        }
                    }
                }
            }
        }
        tracing::info!("mqtt event publisher stopped");
    })
}

/// Non bloquant : l'eventloop est pollée dans la même boucle
fn publish(client: &AsyncClient, event: &DashboardEvent) {
    let topic = topic_for(event);
    match serde_json::to_string(event) {
        Ok(payload) => {
            if let Err(e) = client.try_publish(topic, QoS::AtLeastOnce, false, payload) {
                tracing::warn!(topic, "mqtt publish failed: {e:?}");
            }
        }
        Err(e) => tracing::error!(topic, "event serialization failed: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Alert, AlertKind, LogEntry, SatelliteId};
    use time::OffsetDateTime;

    #[test]
    fn test_topics_per_event() {
        let alert = Alert::new(SatelliteId(1), AlertKind::Conjunction, "debris", "dodge");
        let entry = LogEntry {
            alert_id: alert.id,
            satellite_id: alert.satellite_id,
            text: "✅ Action executed for ISS: dodge".into(),
            executed_at: OffsetDateTime::now_utc(),
        };

        assert_eq!(topic_for(&DashboardEvent::AlertRaised { alert: alert.clone() }), "orbitwatch/alerts/raised@v1");
        assert_eq!(
            topic_for(&DashboardEvent::AlertExecuted { alert, entry }),
            "orbitwatch/alerts/executed@v1"
        );
    }
}
