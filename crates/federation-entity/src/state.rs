//! In-memory state for a federation entity
//!
//! Thread-safe storage for everything a running entity knows about itself:
//! its declared superiors, registered subordinates, and the trust marks it
//! has issued and received. All state lives in process memory; a restart is
//! a clean slate.
//!
//! Each field sits behind its own `RwLock` held only for O(1) operations.
//! Read accessors return cloned snapshots, so readers never observe a torn
//! state and callers cannot mutate the store behind its back.

use std::collections::HashMap;
use std::sync::RwLock;

use serde_json::{Map, Value};
use tracing::info;

/// A registered subordinate entity
#[derive(Debug, Clone)]
pub struct SubordinateRecord {
    /// The subordinate's entity identifier
    pub entity_id: String,
    /// The subordinate's declared public key set, as provided at registration
    pub jwks: Option<Value>,
    /// Declarative metadata published in subordinate statements
    pub metadata: Map<String, Value>,
    /// The subordinate's declared superiors; always contains this entity
    pub authority_hints: Vec<String>,
    /// Registration time, epoch seconds
    pub created_at: i64,
}

/// A trust mark this entity issued or received
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustMarkRecord {
    /// Trust mark type identifier (a namespace URL)
    pub id: String,
    /// Entity identifier of the issuer
    pub issuer: String,
    /// Entity identifier the mark is about
    pub subject: String,
    /// Epoch seconds
    pub issued_at: i64,
    /// Epoch seconds; `None` means the mark does not expire
    pub expires_at: Option<i64>,
    /// The authoritative serialized form
    pub signed_jwt: String,
}

impl TrustMarkRecord {
    pub fn is_expired(&self, now: i64) -> bool {
        match self.expires_at {
            Some(exp) => exp < now,
            None => false,
        }
    }
}

/// Outcome of a subordinate registration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Created,
    Updated,
}

/// Mutable state of this entity, shared across request handlers
#[derive(Debug)]
pub struct EntityState {
    entity_id: String,
    authority_hints: RwLock<Vec<String>>,
    subordinates: RwLock<HashMap<String, SubordinateRecord>>,
    issued_trust_marks: RwLock<Vec<TrustMarkRecord>>,
    received_trust_marks: RwLock<Vec<TrustMarkRecord>>,
    metadata: RwLock<Map<String, Value>>,
}

impl EntityState {
    pub fn new(entity_id: impl Into<String>) -> Self {
        Self {
            entity_id: entity_id.into(),
            authority_hints: RwLock::new(Vec::new()),
            subordinates: RwLock::new(HashMap::new()),
            issued_trust_marks: RwLock::new(Vec::new()),
            received_trust_marks: RwLock::new(Vec::new()),
            metadata: RwLock::new(Map::new()),
        }
    }

    /// This entity's identifier; immutable for the life of the process
    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    // =========================================================================
    // Subordinates
    // =========================================================================

    /// Insert or replace a subordinate registration.
    ///
    /// This entity's own identifier is injected into the record's authority
    /// hints when the registrant left it out.
    pub fn upsert_subordinate(&self, mut record: SubordinateRecord) -> Upsert {
        if !record.authority_hints.iter().any(|h| h == &self.entity_id) {
            record.authority_hints.push(self.entity_id.clone());
        }

        let mut subordinates = self.subordinates.write().unwrap();
        let outcome = if subordinates.contains_key(&record.entity_id) {
            Upsert::Updated
        } else {
            Upsert::Created
        };

        info!(sub = %record.entity_id, outcome = ?outcome, "Registering subordinate");
        subordinates.insert(record.entity_id.clone(), record);
        outcome
    }

    /// Register a subordinate from the fields a caller supplied, merging
    /// into any existing record under a single write lock.
    ///
    /// An existing record keeps fields the caller omitted; a new record gets
    /// this entity injected into its authority hints.
    pub fn upsert_subordinate_fields(
        &self,
        entity_id: &str,
        jwks: Option<Value>,
        metadata: Option<Map<String, Value>>,
        authority_hints: Option<Vec<String>>,
        now: i64,
    ) -> (SubordinateRecord, Upsert) {
        let mut subordinates = self.subordinates.write().unwrap();

        if let Some(existing) = subordinates.get_mut(entity_id) {
            if let Some(jwks) = jwks {
                existing.jwks = Some(jwks);
            }
            if let Some(metadata) = metadata {
                existing.metadata = metadata;
            }
            if let Some(hints) = authority_hints {
                existing.authority_hints = hints;
            }
            info!(sub = %entity_id, "Updated subordinate registration");
            return (existing.clone(), Upsert::Updated);
        }

        let mut hints = authority_hints.unwrap_or_default();
        if !hints.iter().any(|h| h == &self.entity_id) {
            hints.push(self.entity_id.clone());
        }

        let record = SubordinateRecord {
            entity_id: entity_id.to_string(),
            jwks,
            metadata: metadata.unwrap_or_default(),
            authority_hints: hints,
            created_at: now,
        };

        info!(sub = %entity_id, "Created subordinate registration");
        subordinates.insert(entity_id.to_string(), record.clone());
        (record, Upsert::Created)
    }

    /// Update an existing subordinate in place; `None` when absent
    pub fn update_subordinate_fields(
        &self,
        entity_id: &str,
        jwks: Option<Value>,
        metadata: Option<Map<String, Value>>,
        authority_hints: Option<Vec<String>>,
    ) -> Option<SubordinateRecord> {
        let mut subordinates = self.subordinates.write().unwrap();
        let record = subordinates.get_mut(entity_id)?;

        if let Some(jwks) = jwks {
            record.jwks = Some(jwks);
        }
        if let Some(metadata) = metadata {
            record.metadata = metadata;
        }
        if let Some(hints) = authority_hints {
            record.authority_hints = hints;
        }

        info!(sub = %entity_id, "Updated subordinate");
        Some(record.clone())
    }

    /// Remove a subordinate; no-op when absent
    pub fn remove_subordinate(&self, entity_id: &str) -> bool {
        let mut subordinates = self.subordinates.write().unwrap();
        let removed = subordinates.remove(entity_id).is_some();
        if removed {
            info!(sub = %entity_id, "Removed subordinate");
        }
        removed
    }

    pub fn subordinate(&self, entity_id: &str) -> Option<SubordinateRecord> {
        let subordinates = self.subordinates.read().unwrap();
        subordinates.get(entity_id).cloned()
    }

    /// Snapshot of all subordinate records
    pub fn subordinates(&self) -> Vec<SubordinateRecord> {
        let subordinates = self.subordinates.read().unwrap();
        subordinates.values().cloned().collect()
    }

    pub fn subordinate_count(&self) -> usize {
        let subordinates = self.subordinates.read().unwrap();
        subordinates.len()
    }

    // =========================================================================
    // Authority hints
    // =========================================================================

    pub fn authority_hints(&self) -> Vec<String> {
        let hints = self.authority_hints.read().unwrap();
        hints.clone()
    }

    pub fn set_authority_hints(&self, hints: Vec<String>) {
        info!(hints = ?hints, "Setting authority hints");
        let mut guard = self.authority_hints.write().unwrap();
        *guard = hints;
    }

    /// Append a hint unless already declared
    pub fn add_authority_hint(&self, hint: impl Into<String>) {
        let hint = hint.into();
        let mut hints = self.authority_hints.write().unwrap();
        if !hints.contains(&hint) {
            info!(hint = %hint, "Adding authority hint");
            hints.push(hint);
        }
    }

    // =========================================================================
    // Metadata
    // =========================================================================

    pub fn metadata(&self) -> Map<String, Value> {
        let metadata = self.metadata.read().unwrap();
        metadata.clone()
    }

    pub fn set_metadata(&self, metadata: Map<String, Value>) {
        let mut guard = self.metadata.write().unwrap();
        *guard = metadata;
    }

    // =========================================================================
    // Trust marks
    // =========================================================================

    pub fn add_issued_trust_mark(&self, record: TrustMarkRecord) {
        info!(id = %record.id, sub = %record.subject, "Recording issued trust mark");
        let mut issued = self.issued_trust_marks.write().unwrap();
        issued.push(record);
    }

    pub fn issued_trust_marks(&self) -> Vec<TrustMarkRecord> {
        let issued = self.issued_trust_marks.read().unwrap();
        issued.clone()
    }

    /// First issued mark with the given trust mark ID
    pub fn issued_trust_mark(&self, id: &str) -> Option<TrustMarkRecord> {
        let issued = self.issued_trust_marks.read().unwrap();
        issued.iter().find(|tm| tm.id == id).cloned()
    }

    /// Drop all issued marks with the given trust mark ID
    pub fn remove_issued_trust_mark(&self, id: &str) -> bool {
        let mut issued = self.issued_trust_marks.write().unwrap();
        let before = issued.len();
        issued.retain(|tm| tm.id != id);
        let removed = issued.len() < before;
        if removed {
            info!(id = %id, "Revoked trust mark");
        }
        removed
    }

    pub fn add_received_trust_mark(&self, record: TrustMarkRecord) {
        info!(id = %record.id, iss = %record.issuer, "Recording received trust mark");
        let mut received = self.received_trust_marks.write().unwrap();
        received.push(record);
    }

    pub fn received_trust_marks(&self) -> Vec<TrustMarkRecord> {
        let received = self.received_trust_marks.read().unwrap();
        received.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(entity_id: &str) -> SubordinateRecord {
        SubordinateRecord {
            entity_id: entity_id.into(),
            jwks: Some(json!({"keys": []})),
            metadata: Map::new(),
            authority_hints: Vec::new(),
            created_at: 1_700_000_000,
        }
    }

    fn mark(id: &str, subject: &str) -> TrustMarkRecord {
        TrustMarkRecord {
            id: id.into(),
            issuer: "https://a.example.com".into(),
            subject: subject.into(),
            issued_at: 1_700_000_000,
            expires_at: None,
            signed_jwt: "eyJ.x.y".into(),
        }
    }

    #[test]
    fn test_upsert_creates_then_updates() {
        let state = EntityState::new("https://a.example.com");

        assert_eq!(
            state.upsert_subordinate(record("https://b.example.com")),
            Upsert::Created
        );

        let mut updated = record("https://b.example.com");
        updated.metadata.insert("org".into(), json!("B Org"));
        assert_eq!(state.upsert_subordinate(updated), Upsert::Updated);

        let stored = state.subordinate("https://b.example.com").unwrap();
        assert_eq!(stored.metadata["org"], "B Org");
        assert_eq!(state.subordinate_count(), 1);
    }

    #[test]
    fn test_upsert_injects_own_entity_id_into_hints() {
        let state = EntityState::new("https://a.example.com");
        state.upsert_subordinate(record("https://b.example.com"));

        let stored = state.subordinate("https://b.example.com").unwrap();
        assert!(stored
            .authority_hints
            .contains(&"https://a.example.com".to_string()));
    }

    #[test]
    fn test_upsert_does_not_duplicate_own_hint() {
        let state = EntityState::new("https://a.example.com");

        let mut rec = record("https://b.example.com");
        rec.authority_hints.push("https://a.example.com".into());
        state.upsert_subordinate(rec);

        let stored = state.subordinate("https://b.example.com").unwrap();
        assert_eq!(stored.authority_hints.len(), 1);
    }

    #[test]
    fn test_upsert_fields_merges_into_existing() {
        let state = EntityState::new("https://a.example.com");
        state.upsert_subordinate(record("https://b.example.com"));

        let mut metadata = Map::new();
        metadata.insert("org".into(), json!("B Org"));
        let (merged, outcome) = state.upsert_subordinate_fields(
            "https://b.example.com",
            None,
            Some(metadata),
            None,
            1_700_000_100,
        );

        assert_eq!(outcome, Upsert::Updated);
        assert_eq!(merged.metadata["org"], "B Org");
        // Omitted fields survive the merge
        assert!(merged.jwks.is_some());
        assert_eq!(merged.created_at, 1_700_000_000);
    }

    #[test]
    fn test_upsert_fields_creates_with_injected_hint() {
        let state = EntityState::new("https://a.example.com");

        let (created, outcome) = state.upsert_subordinate_fields(
            "https://b.example.com",
            None,
            None,
            None,
            1_700_000_000,
        );

        assert_eq!(outcome, Upsert::Created);
        assert!(created
            .authority_hints
            .contains(&"https://a.example.com".to_string()));
    }

    #[test]
    fn test_update_fields_requires_existing() {
        let state = EntityState::new("https://a.example.com");

        assert!(state
            .update_subordinate_fields("https://b.example.com", None, None, None)
            .is_none());

        state.upsert_subordinate(record("https://b.example.com"));
        let updated = state
            .update_subordinate_fields(
                "https://b.example.com",
                None,
                None,
                Some(vec!["https://other.example.com".into()]),
            )
            .unwrap();
        assert_eq!(updated.authority_hints, vec!["https://other.example.com"]);
    }

    #[test]
    fn test_remove_subordinate() {
        let state = EntityState::new("https://a.example.com");
        state.upsert_subordinate(record("https://b.example.com"));

        assert!(state.remove_subordinate("https://b.example.com"));
        assert!(!state.remove_subordinate("https://b.example.com"));
        assert!(state.subordinate("https://b.example.com").is_none());
    }

    #[test]
    fn test_snapshots_are_detached() {
        let state = EntityState::new("https://a.example.com");
        state.set_authority_hints(vec!["https://root.example.com".into()]);

        let mut snapshot = state.authority_hints();
        snapshot.push("https://rogue.example.com".into());

        assert_eq!(state.authority_hints().len(), 1);
    }

    #[test]
    fn test_add_authority_hint_dedups() {
        let state = EntityState::new("https://a.example.com");
        state.add_authority_hint("https://root.example.com");
        state.add_authority_hint("https://root.example.com");

        assert_eq!(state.authority_hints().len(), 1);
    }

    #[test]
    fn test_issued_trust_mark_lookup_and_revoke() {
        let state = EntityState::new("https://a.example.com");
        state.add_issued_trust_mark(mark("https://refeds.org/sirtfi", "https://op.umu.se"));

        assert!(state.issued_trust_mark("https://refeds.org/sirtfi").is_some());
        assert!(state.remove_issued_trust_mark("https://refeds.org/sirtfi"));
        assert!(state.issued_trust_mark("https://refeds.org/sirtfi").is_none());
        assert!(!state.remove_issued_trust_mark("https://refeds.org/sirtfi"));
    }

    #[test]
    fn test_received_trust_marks_accumulate() {
        let state = EntityState::new("https://b.example.com");
        state.add_received_trust_mark(mark("https://refeds.org/sirtfi", "https://b.example.com"));

        assert_eq!(state.received_trust_marks().len(), 1);
    }

    #[test]
    fn test_trust_mark_expiry() {
        let mut tm = mark("https://refeds.org/sirtfi", "https://b.example.com");
        assert!(!tm.is_expired(2_000_000_000));

        tm.expires_at = Some(1_700_000_100);
        assert!(!tm.is_expired(1_700_000_100));
        assert!(tm.is_expired(1_700_000_101));
    }
}
