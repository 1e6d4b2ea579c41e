//! Trust chain resolution
//!
//! Walks upward from a target entity through authority hints, fetching and
//! cryptographically verifying every statement, until the expected trust
//! anchor is reached. Failures never escape as errors: the resolver always
//! returns a complete [`ChainResult`] audit trail with `valid = false` and a
//! descriptive error list.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use federation_core::jwk::JwkSet;
use federation_core::jwt;
use federation_core::statement::Statement;

use crate::fetch::HttpFetcher;

/// Hop cap; resolution of any input terminates within this many superiors.
pub const MAX_HOPS: usize = 10;

/// Outcome of a trust chain resolution
#[derive(Debug, Serialize)]
pub struct ChainResult {
    /// Target entity URL as given by the caller
    pub target_entity: String,
    /// Trust anchor URL as given by the caller
    pub trust_anchor: String,
    /// Whether a fully verified chain to the anchor was found
    pub valid: bool,
    /// Every verified statement, in chain order: the target's Entity
    /// Configuration first, then per hop the superior's configuration and
    /// its subordinate statement about the previous entity
    pub statements: Vec<Statement>,
    /// Progress notes for the caller
    pub messages: Vec<String>,
    /// What went wrong, when anything did
    pub errors: Vec<String>,
}

impl ChainResult {
    fn new(target_entity: &str, trust_anchor: &str) -> Self {
        Self {
            target_entity: target_entity.to_string(),
            trust_anchor: trust_anchor.to_string(),
            valid: false,
            statements: Vec::new(),
            messages: Vec::new(),
            errors: Vec::new(),
        }
    }
}

/// Resolves trust chains by fetching statements through an [`HttpFetcher`].
///
/// Stateless apart from the fetcher: concurrent resolutions need no
/// coordination and nothing in entity state is touched.
pub struct TrustChainResolver {
    fetcher: Arc<dyn HttpFetcher>,
}

impl TrustChainResolver {
    pub fn new(fetcher: Arc<dyn HttpFetcher>) -> Self {
        Self { fetcher }
    }

    /// Resolve and validate the trust chain from `target_url` to the anchor
    /// served at `anchor_url`.
    pub async fn resolve(&self, target_url: &str, anchor_url: &str) -> ChainResult {
        info!(target = %target_url, anchor = %anchor_url, "Starting trust chain resolution");

        let mut result = ChainResult::new(target_url, anchor_url);

        let Some(target_config) = self.fetch_entity_configuration(target_url).await else {
            result
                .errors
                .push(format!("failed to fetch or verify entity configuration of {}", target_url));
            return result;
        };

        let Some(target_id) = target_config.iss().map(String::from) else {
            result.errors.push("target entity configuration has no iss".into());
            return result;
        };
        info!(entity_id = %target_id, "Resolved target entity configuration");

        let mut hints = target_config.authority_hints();
        result.statements.push(target_config);

        // The anchor is named by URL; its identity is whatever its own
        // verified configuration declares as iss.
        let Some(anchor_id) = self.resolve_anchor_entity_id(anchor_url).await else {
            result
                .errors
                .push(format!("failed to resolve trust anchor identity from {}", anchor_url));
            return result;
        };
        info!(anchor_id = %anchor_id, "Resolved trust anchor identity");

        let mut visited: HashSet<String> = HashSet::new();
        visited.insert(target_id.clone());
        let mut current_id = target_id;

        if hints.is_empty() {
            if current_id == anchor_id {
                result.valid = true;
                result.messages.push("entity is the trust anchor".into());
            } else {
                result
                    .errors
                    .push("entity has no authority hints and is not the trust anchor".into());
            }
            return result;
        }

        let mut hops = 0;
        while !hints.is_empty() && hops < MAX_HOPS {
            hops += 1;

            // Only the first hint is followed; entities with several
            // superiors order the relevant one first.
            let superior_url = hints[0].clone();
            info!(hop = hops, superior = %superior_url, "Following authority hint");

            if visited.contains(&superior_url) {
                result.errors.push(format!("cycle detected: {}", superior_url));
                return result;
            }

            let Some(superior_config) = self.fetch_entity_configuration(&superior_url).await else {
                result
                    .errors
                    .push(format!("failed to fetch authority configuration: {}", superior_url));
                return result;
            };

            let Some(superior_id) = superior_config.iss().map(String::from) else {
                result.errors.push("authority configuration has no iss".into());
                return result;
            };
            let superior_jwks = superior_config.jwks();
            let superior_hints = superior_config.authority_hints();
            result.statements.push(superior_config);

            if !visited.insert(superior_id.clone()) {
                result.errors.push(format!("cycle detected: {}", superior_id));
                return result;
            }

            let Some(superior_jwks) = superior_jwks else {
                result.errors.push(format!("authority {} has no jwks", superior_id));
                return result;
            };

            let Some(sub_stmt) = self
                .fetch_subordinate_statement(&superior_url, &current_id, &superior_jwks)
                .await
            else {
                result
                    .errors
                    .push(format!("failed to fetch subordinate statement from {}", superior_url));
                return result;
            };

            if sub_stmt.iss() != Some(superior_id.as_str()) {
                result.errors.push("subordinate statement issuer mismatch".into());
                return result;
            }
            if sub_stmt.sub() != Some(current_id.as_str()) {
                result.errors.push("subordinate statement subject mismatch".into());
                return result;
            }
            result.statements.push(sub_stmt);

            if superior_id == anchor_id {
                info!(anchor = %anchor_id, hops, "Reached trust anchor");
                result.valid = true;
                result.messages.push("trust chain validated, reached trust anchor".into());
                return result;
            }

            current_id = superior_id;
            hints = superior_hints;

            if hints.is_empty() {
                // A trust anchor, but not the one the caller asked for
                result
                    .errors
                    .push("reached a trust anchor that is not the expected one".into());
                return result;
            }
        }

        result.errors.push("maximum hop count exceeded".into());
        result
    }

    /// Fetch an anchor's verified configuration and read its entity identifier.
    async fn resolve_anchor_entity_id(&self, anchor_url: &str) -> Option<String> {
        let config = self.fetch_entity_configuration(anchor_url).await?;
        config.iss().map(String::from)
    }

    /// GET `<url>/.well-known/openid-federation` and verify the returned JWT
    /// against the JWKS embedded in its own claims.
    async fn fetch_entity_configuration(&self, entity_url: &str) -> Option<Statement> {
        let url = format!(
            "{}/.well-known/openid-federation",
            entity_url.trim_end_matches('/')
        );
        debug!(url = %url, "Fetching entity configuration");

        let response = match self.fetcher.get(&url).await {
            Ok(response) => response,
            Err(e) => {
                warn!(url = %url, error = %e, "Entity configuration fetch failed");
                return None;
            }
        };

        if response.status != 200 {
            warn!(url = %url, status = response.status, "Entity configuration fetch returned non-200");
            return None;
        }

        let claims = jwt::verify_self_signed(&response.body)?;
        Some(Statement::new(claims))
    }

    /// GET `<superior_url>/fetch?sub=<sub>` and verify the returned JWT
    /// against the superior's JWKS.
    async fn fetch_subordinate_statement(
        &self,
        superior_url: &str,
        subordinate_id: &str,
        superior_jwks: &JwkSet,
    ) -> Option<Statement> {
        let url = format!(
            "{}/fetch?sub={}",
            superior_url.trim_end_matches('/'),
            subordinate_id
        );
        debug!(url = %url, "Fetching subordinate statement");

        let response = match self.fetcher.get(&url).await {
            Ok(response) => response,
            Err(e) => {
                warn!(url = %url, error = %e, "Subordinate statement fetch failed");
                return None;
            }
        };

        if response.status != 200 {
            warn!(url = %url, status = response.status, "Subordinate statement fetch returned non-200");
            return None;
        }

        let claims = jwt::verify_statement(&response.body, superior_jwks)?;
        Some(Statement::new(claims))
    }
}
