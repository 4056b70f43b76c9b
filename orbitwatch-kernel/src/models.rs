use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use time::OffsetDateTime;
use uuid::Uuid;

/// Identifiant satellite dérivé de l'heure de création (ms Unix), strictement croissant
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SatelliteId(pub u64);

impl fmt::Display for SatelliteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlertId(pub Uuid);

impl AlertId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for AlertId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Satellite {
    pub id: SatelliteId,
    pub name: String,
    pub altitude: f64,    // km
    pub inclination: f64, // degrés
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Producteur à l'origine d'une alerte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    SpaceWeather,
    Conjunction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: AlertId,
    pub satellite_id: SatelliteId,
    pub kind: AlertKind,
    pub message: String,
    pub action: String,
    pub executed: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub raised_at: OffsetDateTime,
}

impl Alert {
    pub fn new(satellite_id: SatelliteId, kind: AlertKind, message: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            id: AlertId::new(),
            satellite_id,
            kind,
            message: message.into(),
            action: action.into(),
            executed: false,
            raised_at: OffsetDateTime::now_utc(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub alert_id: AlertId,
    pub satellite_id: SatelliteId,
    pub text: String,
    #[serde(with = "time::serde::rfc3339")]
    pub executed_at: OffsetDateTime,
}

/// Saisie brute du formulaire "ajouter un satellite".
/// Les champs numériques acceptent texte ou nombre JSON.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SatelliteInput {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub altitude: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub inclination: String,
}

impl SatelliteInput {
    #[cfg(test)]
    pub fn new(name: &str, altitude: &str, inclination: &str) -> Self {
        Self {
            name: name.to_string(),
            altitude: altitude.to_string(),
            inclination: inclination.to_string(),
        }
    }
}

fn text_or_number<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    let value = serde_json::Value::deserialize(de)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// Entrée du flux météo spatiale, réduite à son texte libre
#[derive(Debug, Clone, PartialEq)]
pub struct Advisory {
    pub message: String,
}

impl Advisory {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }

    /// Texte depuis `message`, sinon `messageBody` (format DONKI).
    /// Entrée sans texte exploitable => None.
    pub fn from_entry(entry: &serde_json::Value) -> Option<Self> {
        ["message", "messageBody"]
            .iter()
            .filter_map(|key| entry.get(*key).and_then(serde_json::Value::as_str))
            .find(|text| !text.trim().is_empty())
            .map(Self::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_satellite_input_accepts_numbers_and_text() {
        let input: SatelliteInput =
            serde_json::from_str(r#"{"name":"ISS","altitude":400,"inclination":"51.6"}"#).unwrap();
        assert_eq!(input.name, "ISS");
        assert_eq!(input.altitude, "400");
        assert_eq!(input.inclination, "51.6");

        let missing: SatelliteInput = serde_json::from_str(r#"{"name":"ISS"}"#).unwrap();
        assert!(missing.altitude.is_empty());
    }

    #[test]
    fn test_advisory_reads_donki_fields() {
        let donki = serde_json::json!({"messageType":"CME","messageBody":"Coronal Mass Ejection detected","messageID":"x"});
        assert_eq!(Advisory::from_entry(&donki), Some(Advisory::new("Coronal Mass Ejection detected")));

        let plain = serde_json::json!({"message":"Solar flare"});
        assert_eq!(Advisory::from_entry(&plain), Some(Advisory::new("Solar flare")));
    }

    #[test]
    fn test_advisory_text_precedence_and_gaps() {
        let both = serde_json::json!({"message":"CME short","messageBody":"full text"});
        assert_eq!(Advisory::from_entry(&both).unwrap().message, "CME short");

        let null_message = serde_json::json!({"message":null,"messageBody":"CME body"});
        assert_eq!(Advisory::from_entry(&null_message).unwrap().message, "CME body");

        assert!(Advisory::from_entry(&serde_json::json!({"message":null})).is_none());
        assert!(Advisory::from_entry(&serde_json::json!({"message":42})).is_none());
        assert!(Advisory::from_entry(&serde_json::json!("CME")).is_none());
    }

    #[test]
    fn test_alert_kind_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&AlertKind::SpaceWeather).unwrap(), "\"space_weather\"");
    }
}
