use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::hazards::HazardScheduler;
use crate::state::SharedDashboard;

#[derive(Debug, Serialize, Deserialize)]
pub struct KernelHealth {
    pub uptime_seconds: u64,
    pub satellites_tracked: u32,
    pub active_alerts: u32,
    pub executed_actions: u32,
    pub pending_evaluations: u32,
    pub feed_successes: u64,
    pub feed_failures: u64,
    pub mqtt_status: String,
    pub mqtt_reconnects: u32,
}

#[derive(Clone)]
pub struct HealthTracker {
    start_time: Instant,
    feed_successes: Arc<AtomicU64>,
    feed_failures: Arc<AtomicU64>,
    mqtt_reconnects: Arc<AtomicU32>,
    mqtt_status: Arc<Mutex<String>>,
}

impl HealthTracker {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            feed_successes: Arc::new(AtomicU64::new(0)),
            feed_failures: Arc::new(AtomicU64::new(0)),
            mqtt_reconnects: Arc::new(AtomicU32::new(0)),
            mqtt_status: Arc::new(Mutex::new("disabled".to_string())),
        }
    }

    pub fn record_feed_success(&self) {
        self.feed_successes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_feed_failure(&self) {
        self.feed_failures.fetch_add(1, Ordering::Relaxed);
    }

    #[cfg(test)]
    pub fn feed_failures(&self) -> u64 {
        self.feed_failures.load(Ordering::Relaxed)
    }

    pub fn mark_mqtt_connecting(&self) {
        *self.mqtt_status.lock() = "connecting".to_string();
    }

    pub fn mark_mqtt_connected(&self) {
        *self.mqtt_status.lock() = "connected".to_string();
    }

    pub fn increment_reconnects(&self) {
        self.mqtt_reconnects.fetch_add(1, Ordering::Relaxed);
        *self.mqtt_status.lock() = "reconnecting".to_string();
    }

    pub fn get_health(&self, dashboard: &SharedDashboard, hazards: &HazardScheduler) -> KernelHealth {
        let (satellites, active, executed) = {
            let dash = dashboard.lock();
            (dash.satellite_count(), dash.active_alerts().len(), dash.execution_log().len())
        };

        KernelHealth {
            uptime_seconds: self.start_time.elapsed().as_secs(),
            satellites_tracked: satellites as u32,
            active_alerts: active as u32,
            executed_actions: executed as u32,
            pending_evaluations: hazards.pending() as u32,
            feed_successes: self.feed_successes.load(Ordering::Relaxed),
            feed_failures: self.feed_failures.load(Ordering::Relaxed),
            mqtt_status: self.mqtt_status.lock().clone(),
            mqtt_reconnects: self.mqtt_reconnects.load(Ordering::Relaxed),
        }
    }
}

impl Default for HealthTracker {
    fn default() -> Self {
        Self::new()
    }
}
