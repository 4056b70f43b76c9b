use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tokio::fs;

pub const DEFAULT_FEED_URL: &str = "https://api.nasa.gov/DONKI/notifications?type=all&api_key=DEMO_KEY";

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct KernelConfig {
    pub http: HttpConf,
    pub feed: FeedConf,
    pub hazards: HazardConf,
    pub mqtt: Option<MqttConf>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct HttpConf {
    pub bind: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct FeedConf {
    pub url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct HazardConf {
    pub evaluation_delay_secs: u64,
    /// Tirage < seuil => pas d'alerte conjonction (0.4 => 60% d'alertes)
    pub conjunction_quiet_below: f64,
    pub seed: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MqttConf {
    pub host: String,
    pub port: u16,
}

impl Default for HttpConf {
    fn default() -> Self {
        Self { bind: "0.0.0.0:8080".into() }
    }
}

impl Default for FeedConf {
    fn default() -> Self {
        Self { url: DEFAULT_FEED_URL.into(), timeout_secs: 10 }
    }
}

pub const DEFAULT_QUIET_BELOW: f64 = 0.4;

impl Default for HazardConf {
    fn default() -> Self {
        Self { evaluation_delay_secs: 10, conjunction_quiet_below: DEFAULT_QUIET_BELOW, seed: None }
    }
}

impl FeedConf {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl HazardConf {
    pub fn evaluation_delay(&self) -> Duration {
        Duration::from_secs(self.evaluation_delay_secs)
    }

    /// Seuil ramené dans [0,1] ; NaN => valeur par défaut
    fn sanitize(&mut self) {
        let raw = self.conjunction_quiet_below;
        let fixed = if raw.is_nan() { DEFAULT_QUIET_BELOW } else { raw.clamp(0.0, 1.0) };
        if fixed != raw {
            tracing::warn!(configured = raw, used = fixed, "conjunction_quiet_below out of [0,1]");
            self.conjunction_quiet_below = fixed;
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Lit le fichier de config ; fichier vide => défauts
pub async fn read_config(path: &Path) -> Result<KernelConfig, ConfigError> {
    let txt = fs::read_to_string(path).await?;
    if txt.trim().is_empty() {
        return Ok(KernelConfig::default());
    }
    let mut cfg: KernelConfig = serde_yaml::from_str(&txt)?;
    cfg.hazards.sanitize();
    Ok(cfg)
}

pub async fn load_config() -> KernelConfig {
    let path = std::env::var("ORBITWATCH_KERNEL_CONFIG").unwrap_or_else(|_| "kernel.yaml".into());
    let path = Path::new(&path);
    if !path.exists() {
        tracing::info!(path = %path.display(), "no config file, using defaults");
        return KernelConfig::default();
    }
    read_config(path).await.unwrap_or_else(|e| {
        tracing::warn!(path = %path.display(), "invalid config: {e}, using defaults");
        KernelConfig::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let cfg = KernelConfig::default();
        assert_eq!(cfg.http.bind, "0.0.0.0:8080");
        assert_eq!(cfg.hazards.evaluation_delay(), Duration::from_secs(10));
        assert_eq!(cfg.hazards.conjunction_quiet_below, 0.4);
        assert!(cfg.mqtt.is_none());
    }

    #[tokio::test]
    async fn test_partial_yaml_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("kernel.yaml");
        std::fs::write(&path, "hazards:\n  evaluation_delay_secs: 2\n  seed: 7\nmqtt:\n  host: broker\n  port: 1884\n").unwrap();

        let cfg = read_config(&path).await.unwrap();
        assert_eq!(cfg.hazards.evaluation_delay_secs, 2);
        assert_eq!(cfg.hazards.seed, Some(7));
        assert_eq!(cfg.hazards.conjunction_quiet_below, 0.4);
        assert_eq!(cfg.feed.url, DEFAULT_FEED_URL);
        assert_eq!(cfg.mqtt.unwrap().port, 1884);
    }

    #[tokio::test]
    async fn test_quiet_threshold_is_bounded() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("kernel.yaml");

        std::fs::write(&path, "hazards:\n  conjunction_quiet_below: .nan\n").unwrap();
        assert_eq!(read_config(&path).await.unwrap().hazards.conjunction_quiet_below, DEFAULT_QUIET_BELOW);

        std::fs::write(&path, "hazards:\n  conjunction_quiet_below: 1.7\n").unwrap();
        assert_eq!(read_config(&path).await.unwrap().hazards.conjunction_quiet_below, 1.0);

        std::fs::write(&path, "hazards:\n  conjunction_quiet_below: -0.2\n").unwrap();
        assert_eq!(read_config(&path).await.unwrap().hazards.conjunction_quiet_below, 0.0);

        std::fs::write(&path, "hazards:\n  conjunction_quiet_below: 0.25\n").unwrap();
        assert_eq!(read_config(&path).await.unwrap().hazards.conjunction_quiet_below, 0.25);
    }

    #[tokio::test]
    async fn test_empty_and_invalid_files() {
        let dir = TempDir::new().unwrap();
        let empty = dir.path().join("empty.yaml");
        std::fs::write(&empty, "   \n").unwrap();
        assert_eq!(read_config(&empty).await.unwrap().feed.timeout_secs, 10);

        let broken = dir.path().join("broken.yaml");
        std::fs::write(&broken, "hazards: [not, a, map").unwrap();
        assert!(matches!(read_config(&broken).await, Err(ConfigError::Yaml(_))));
    }
}
