/*!
Faux flux météo spatiale pour développement sans réseau

Démarre un serveur HTTP local (port éphémère) qui sert une réponse scriptée :
liste d'advisories JSON, statut d'erreur, ou corps brut mal formé.
Compte les requêtes reçues pour les assertions de tests.
*/

use anyhow::Result;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Réponse servie par le faux flux
#[derive(Debug, Clone)]
pub enum FeedResponse {
    /// Tableau JSON d'advisories (voir `AdvisoryBuilder`)
    Advisories(Vec<Value>),
    /// Statut HTTP d'erreur sans corps
    Status(u16),
    /// Corps brut servi tel quel en application/json
    Raw(String),
}

#[derive(Clone)]
struct StubState {
    response: Arc<Mutex<FeedResponse>>,
    hits: Arc<AtomicUsize>,
}

pub struct MockFeedServer {
    addr: SocketAddr,
    state: StubState,
    handle: JoinHandle<()>,
}

impl MockFeedServer {
    pub async fn start(response: FeedResponse) -> Result<Self> {
        let state = StubState {
            response: Arc::new(Mutex::new(response)),
            hits: Arc::new(AtomicUsize::new(0)),
        };

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let app = Router::new()
            .route("/notifications", get(serve_feed))
            .with_state(state.clone());

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                log::error!("🛰️ [MOCK] feed server stopped: {}", e);
            }
        });

        log::info!("🛰️ [MOCK] feed server listening on {}", addr);
        Ok(Self { addr, state, handle })
    }

    pub fn url(&self) -> String {
        format!("http://{}/notifications", self.addr)
    }

    /// Nombre de requêtes reçues
    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }

    /// Change la réponse servie aux prochaines requêtes
    pub fn respond_with(&self, response: FeedResponse) {
        *self.state.response.lock().unwrap() = response;
    }
}

impl Drop for MockFeedServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn serve_feed(State(state): State<StubState>) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    let response = state.response.lock().unwrap().clone();

    match response {
        FeedResponse::Advisories(list) => Json(Value::Array(list)).into_response(),
        FeedResponse::Status(code) => StatusCode::from_u16(code)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            .into_response(),
        FeedResponse::Raw(body) => ([(header::CONTENT_TYPE, "application/json")], body).into_response(),
    }
}
