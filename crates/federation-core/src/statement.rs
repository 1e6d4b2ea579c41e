//! The statement model
//!
//! A [`Statement`] is the claim map extracted from a verified JWT during
//! resolution. Entity Configurations and Subordinate Statements share one
//! wire shape and are told apart by whether `iss == sub`.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::jwk::JwkSet;
use crate::jwt::Claims;

/// What kind of statement a claim map represents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    /// Self-signed: `iss == sub`
    EntityConfiguration,
    /// A superior's assertion about a subordinate: `iss != sub`
    SubordinateStatement,
}

/// A verified statement's claims
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct Statement {
    claims: Claims,
}

impl Statement {
    pub fn new(claims: Claims) -> Self {
        Self { claims }
    }

    /// Classify by the iss/sub relationship
    pub fn kind(&self) -> StatementKind {
        if self.iss().is_some() && self.iss() == self.sub() {
            StatementKind::EntityConfiguration
        } else {
            StatementKind::SubordinateStatement
        }
    }

    pub fn iss(&self) -> Option<&str> {
        self.claims.get("iss").and_then(Value::as_str)
    }

    pub fn sub(&self) -> Option<&str> {
        self.claims.get("sub").and_then(Value::as_str)
    }

    /// The embedded key set, if any
    pub fn jwks(&self) -> Option<JwkSet> {
        self.claims
            .get("jwks")
            .and_then(|v| JwkSet::from_value(v).ok())
    }

    /// Declared superiors; empty when absent
    pub fn authority_hints(&self) -> Vec<String> {
        self.claims
            .get("authority_hints")
            .and_then(Value::as_array)
            .map(|hints| {
                hints
                    .iter()
                    .filter_map(|h| h.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Raw trust mark JWTs carried by an Entity Configuration
    pub fn trust_marks(&self) -> Vec<String> {
        self.claims
            .get("trust_marks")
            .and_then(Value::as_array)
            .map(|marks| {
                marks
                    .iter()
                    .filter_map(|m| m.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Access an arbitrary claim
    pub fn claim(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }

    pub fn claims(&self) -> &Map<String, Value> {
        &self.claims
    }
}
