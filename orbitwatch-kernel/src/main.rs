/**
 * ORBITWATCH KERNEL - Point d'entrée principal
 *
 * RÔLE : Orchestration des modules : config, dashboard, évaluation des risques,
 * flux météo spatiale, MQTT, HTTP, health.
 *
 * ARCHITECTURE : état unique partagé + tâches d'évaluation différées + API REST
 * + republication optionnelle des événements sur MQTT.
 */

mod alerts;
mod config;
mod dashboard;
mod events;
mod feed;
mod hazards;
mod health;
mod http;
mod models;
mod mqtt;
mod registry;
mod scene;
mod state;

use crate::config::load_config;
use crate::dashboard::Dashboard;
use crate::events::EventBus;
use crate::feed::HttpAdvisoryFeed;
use crate::hazards::{HazardEvaluator, HazardScheduler};
use crate::health::HealthTracker;
use crate::http::AppState;
use crate::state::new_state;

use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Charger les variables d'environnement depuis .env (si présent)
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cfg = load_config().await;
    let health = HealthTracker::new();

    // état unique + bus de changements pour le rendu
    let events = EventBus::default();
    let dashboard = new_state(Dashboard::new(events.clone()));

    let feed = HttpAdvisoryFeed::new(&cfg.feed).context("failed to build feed client")?;
    tracing::info!(url = %cfg.feed.url, "space weather feed configured");

    let evaluator = Arc::new(HazardEvaluator::new(
        Arc::new(feed),
        cfg.hazards.conjunction_quiet_below,
        cfg.hazards.seed,
        health.clone(),
    ));
    let hazards = HazardScheduler::new(dashboard.clone(), evaluator, cfg.hazards.evaluation_delay());

    // MQTT optionnel : republication des événements
    let publisher = cfg
        .mqtt
        .clone()
        .map(|conf| mqtt::spawn_event_publisher(conf, &events, health.clone()));
    if publisher.is_none() {
        tracing::info!("no mqtt section, event publishing disabled");
    }

    let api_key = std::env::var("ORBITWATCH_API_KEY").ok().filter(|k| !k.is_empty());
    if api_key.is_none() {
        tracing::warn!("ORBITWATCH_API_KEY not set, API is open");
    }

    let app_state = AppState {
        dashboard,
        hazards: hazards.clone(),
        health,
        api_key,
    };
    let app = http::build_router(app_state);

    let addr: SocketAddr = cfg
        .http
        .bind
        .parse()
        .with_context(|| format!("invalid http.bind {:?}", cfg.http.bind))?;
    let listener = TcpListener::bind(addr).await.with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("failed to listen for shutdown signal: {e}");
            }
        })
        .await
        .context("http server failed")?;

    // évaluations en attente abandonnées, pas d'annulation côté utilisateur
    hazards.shutdown();
    if let Some(publisher) = publisher {
        publisher.abort();
    }
    tracing::info!("kernel stopped");
    Ok(())
}
