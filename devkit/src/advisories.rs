/*!
Builders d'advisories au format du flux DONKI (notifications NASA)

Champs produits : messageType, messageID, messageURL, messageIssueTime, messageBody.
*/

use serde_json::Value;
use std::sync::atomic::{AtomicU32, Ordering};

static SEQUENCE: AtomicU32 = AtomicU32::new(1);

pub struct AdvisoryBuilder;

impl AdvisoryBuilder {
    /// Advisory d'éjection de masse coronale
    pub fn cme<S: Into<String>>(body: S) -> Value {
        Self::notification("CME", body)
    }

    /// Advisory d'éruption solaire (ne doit pas déclencher d'alerte CME)
    pub fn flare<S: Into<String>>(body: S) -> Value {
        Self::notification("FLR", body)
    }

    /// Advisory générique au format DONKI
    pub fn notification<S: Into<String>>(message_type: &str, body: S) -> Value {
        let now = chrono::Utc::now();
        let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
        let message_id = format!("{}-AL-{:03}", now.format("%Y%m%d"), seq);

        serde_json::json!({
            "messageType": message_type,
            "messageID": message_id,
            "messageURL": format!("https://kauai.ccmc.gsfc.nasa.gov/DONKI/view/Alert/{}/1", seq),
            "messageIssueTime": now.format("%Y-%m-%dT%H:%MZ").to_string(),
            "messageBody": body.into()
        })
    }

    /// Forme minimale : un seul champ `message`
    pub fn plain<S: Into<String>>(message: S) -> Value {
        serde_json::json!({ "message": message.into() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_donki_shape() {
        let adv = AdvisoryBuilder::cme("Coronal Mass Ejection detected");
        assert_eq!(adv["messageType"], "CME");
        assert_eq!(adv["messageBody"], "Coronal Mass Ejection detected");
        assert!(adv["messageID"].as_str().unwrap().contains("-AL-"));
        assert!(adv["messageIssueTime"].as_str().unwrap().ends_with('Z'));
    }

    #[test]
    fn test_ids_are_distinct() {
        let a = AdvisoryBuilder::flare("X1 flare");
        let b = AdvisoryBuilder::flare("X1 flare");
        assert_ne!(a["messageID"], b["messageID"]);
    }

    #[test]
    fn test_plain_message() {
        assert_eq!(AdvisoryBuilder::plain("CME inbound")["message"], "CME inbound");
    }
}
