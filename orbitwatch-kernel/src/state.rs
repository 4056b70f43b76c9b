use parking_lot::Mutex;
use std::sync::Arc;

use crate::dashboard::Dashboard;

pub type Shared<T> = Arc<Mutex<T>>;

pub fn new_state<T>(value: T) -> Shared<T> {
    Arc::new(Mutex::new(value))
}

/// Dashboard partagé entre handlers HTTP et tâches d'évaluation.
/// Le verrou n'est jamais tenu à travers un `.await`.
pub type SharedDashboard = Shared<Dashboard>;
