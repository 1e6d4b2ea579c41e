//! Per-process entity settings
//!
//! One process is one federation entity. The entity's name is given at
//! startup and determines its entity identifier and listening port; both
//! follow a fixed mapping for the well-known federation names and a
//! `nodeN` convention otherwise.

use std::env;

use tracing::warn;

const DEFAULT_PORT: u16 = 8080;

/// Immutable startup configuration for this entity
#[derive(Debug, Clone)]
pub struct EntitySettings {
    /// Short name given on the command line (e.g. "node1", "edugain")
    pub entity_name: String,
    /// Entity identifier URL, used as `iss`/`sub` of the Entity Configuration
    pub entity_id: String,
    /// Listening port
    pub port: u16,
    /// Base URL other entities use to reach this one
    pub base_url: String,
}

impl EntitySettings {
    /// Derive settings from the entity name, honoring `PORT` and
    /// `FEDERATION_PUBLIC_URL` environment overrides.
    pub fn for_entity(entity_name: &str) -> Self {
        let port = port_for(entity_name);
        let base_url = env::var("FEDERATION_PUBLIC_URL")
            .unwrap_or_else(|_| format!("http://localhost:{}", port));

        Self {
            entity_name: entity_name.to_string(),
            entity_id: entity_id_for(entity_name),
            port,
            base_url,
        }
    }

    /// The URL of this entity's subordinate fetch endpoint
    pub fn fetch_endpoint(&self) -> String {
        format!("{}/fetch", self.base_url)
    }

    /// The URL of this entity's subordinate listing endpoint
    pub fn list_endpoint(&self) -> String {
        format!("{}/manage/subordinates", self.base_url)
    }
}

/// Map an entity name to its entity identifier
pub fn entity_id_for(entity_name: &str) -> String {
    match entity_name.to_lowercase().as_str() {
        "edugain" => "https://edugain.geant.org".into(),
        "swamid" => "https://swamid.se".into(),
        "umu" => "https://umu.se".into(),
        "op-umu" | "opumu" => "https://op.umu.se".into(),
        "ligo" => "https://ligo.example.org".into(),
        _ => format!("https://{}.example.com", entity_name),
    }
}

/// Map an entity name to its listening port
///
/// `PORT` in the environment wins; named entities use fixed ports;
/// `nodeN` maps to `8080 + N - 1`.
pub fn port_for(entity_name: &str) -> u16 {
    if let Ok(raw) = env::var("PORT") {
        match raw.parse() {
            Ok(port) => return port,
            Err(_) => warn!(port = %raw, "Invalid PORT environment variable, using name-derived port"),
        }
    }

    match entity_name.to_lowercase().as_str() {
        "edugain" => return 8080,
        "swamid" => return 8081,
        "umu" => return 8082,
        "op-umu" | "opumu" => return 8083,
        "ligo" => return 8084,
        _ => {}
    }

    if let Some(ordinal) = entity_name.strip_prefix("node") {
        if let Ok(n) = ordinal.parse::<u16>() {
            if n >= 1 {
                return 8080 + n - 1;
            }
        }
    }

    DEFAULT_PORT
}
