/**
 * FLUX MÉTÉO SPATIALE - Adaptateur du service public d'advisories
 *
 * RÔLE : GET HTTP sur l'endpoint configuré, décodage JSON en liste
 * d'advisories, filtrage des éjections de masse coronale (CME).
 *
 * DÉCODAGE : entrée par entrée ; une entrée sans texte est ignorée sans
 * perdre le reste du flux.
 *
 * ÉCHECS : réseau, statut HTTP ou corps non-tableau remontent en FeedError ;
 * l'évaluation des risques les traite comme "pas d'alerte CME".
 */

use crate::config::FeedConf;
use crate::models::Advisory;
use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Feed returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("Malformed feed body: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Source d'advisories ; implémentée par le client HTTP et par les stubs de test
#[async_trait]
pub trait AdvisoryFeed: Send + Sync {
    async fn fetch(&self) -> Result<Vec<Advisory>, FeedError>;
}

pub struct HttpAdvisoryFeed {
    client: reqwest::Client,
    url: String,
}

impl HttpAdvisoryFeed {
    pub fn new(conf: &FeedConf) -> Result<Self, FeedError> {
        let client = reqwest::Client::builder()
            .timeout(conf.timeout())
            .user_agent("orbitwatch-kernel")
            .build()?;
        Ok(Self { client, url: conf.url.clone() })
    }
}

#[async_trait]
impl AdvisoryFeed for HttpAdvisoryFeed {
    async fn fetch(&self) -> Result<Vec<Advisory>, FeedError> {
        let response = self.client.get(&self.url).send().await?;
        if !response.status().is_success() {
            return Err(FeedError::Status(response.status()));
        }
        let body = response.bytes().await?;
        let entries: Vec<serde_json::Value> = serde_json::from_slice(&body)?;
        let advisories: Vec<Advisory> = entries.iter().filter_map(Advisory::from_entry).collect();
        if advisories.len() < entries.len() {
            tracing::debug!(skipped = entries.len() - advisories.len(), "feed entries without text");
        }
        Ok(advisories)
    }
}

/// Vrai si le texte annonce une éjection de masse coronale
pub fn is_cme(text: &str) -> bool {
    text.to_lowercase().contains("coronal mass ejection")
        || text
            .split(|c: char| !c.is_ascii_alphanumeric())
            .any(|word| word == "CME" || word == "CMEs")
}

/// Textes CME dans l'ordre du flux
pub fn cme_messages(advisories: &[Advisory]) -> Vec<&str> {
    advisories
        .iter()
        .map(|a| a.message.as_str())
        .filter(|m| is_cme(m))
        .collect()
}
