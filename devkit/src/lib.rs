/*!
# OrbitWatch DevKit - Stubs et utilitaires pour les tests du kernel

Bibliothèque facilitant les tests sans accès réseau:
- Faux flux météo spatiale (serveur HTTP local scripté)
- Builders d'advisories au format DONKI
*/

pub mod advisories;
pub mod feed_stub;

pub use advisories::AdvisoryBuilder;
pub use feed_stub::{FeedResponse, MockFeedServer};
