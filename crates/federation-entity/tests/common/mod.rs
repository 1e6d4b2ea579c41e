//! Shared test harness: an in-process federation.
//!
//! Entities are full `EntityContext` values publishing their signed
//! statements into one `StaticFetcher`, so resolution runs against real
//! JWTs without sockets. RSA key pairs are generated once per entity name
//! and shared across the binary's tests.

// Not every test binary touches every helper.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

use federation_core::{FixedClock, KeyManager};
use federation_entity::statements::{signed_entity_configuration, signed_subordinate_statement};
use federation_entity::{EntityContext, EntitySettings, StaticFetcher};

pub const NOW: i64 = 1_700_000_000;

pub fn shared_keys(entity_name: &str) -> Arc<KeyManager> {
    static CACHE: OnceLock<Mutex<HashMap<String, Arc<KeyManager>>>> = OnceLock::new();
    let cache = CACHE.get_or_init(|| Mutex::new(HashMap::new()));
    let mut guard = cache.lock().unwrap();
    guard
        .entry(entity_name.to_string())
        .or_insert_with(|| Arc::new(KeyManager::initialize(entity_name).unwrap()))
        .clone()
}

/// Build an entity whose base URL is its entity identifier, wired to the
/// shared fetcher and clock.
pub fn entity(
    entity_name: &str,
    entity_id: &str,
    fetcher: &Arc<StaticFetcher>,
    clock: &Arc<FixedClock>,
) -> EntityContext {
    let settings = EntitySettings {
        entity_name: entity_name.to_string(),
        entity_id: entity_id.to_string(),
        port: 8080,
        base_url: entity_id.to_string(),
    };

    EntityContext::new(
        settings,
        shared_keys(entity_name),
        clock.clone(),
        fetcher.clone(),
    )
}

/// Publish (or republish) an entity's current statements into the fetcher:
/// its Entity Configuration and one Subordinate Statement per registration.
pub fn publish(fetcher: &StaticFetcher, ctx: &EntityContext) {
    let entity_id = ctx.state.entity_id();

    let config = signed_entity_configuration(ctx).expect("entity configuration signs");
    fetcher.insert(
        format!("{}/.well-known/openid-federation", entity_id),
        config,
    );

    for record in ctx.state.subordinates() {
        let statement =
            signed_subordinate_statement(ctx, &record.entity_id).expect("subordinate statement signs");
        fetcher.insert(
            format!("{}/fetch?sub={}", entity_id, record.entity_id),
            statement,
        );
    }
}

/// Register `subordinate` at `superior` and declare the superior in the
/// subordinate's authority hints.
pub fn link(superior: &EntityContext, subordinate: &EntityContext) {
    superior.state.upsert_subordinate_fields(
        subordinate.state.entity_id(),
        Some(subordinate.keys.public_jwk_set().to_value()),
        None,
        None,
        NOW,
    );
    subordinate
        .state
        .add_authority_hint(superior.state.entity_id());
}

/// The Appendix-A style four-entity line:
/// eduGAIN (anchor) ← SWAMID ← UMU ← OP.UMU, all published.
pub struct FourNodeLine {
    pub fetcher: Arc<StaticFetcher>,
    pub clock: Arc<FixedClock>,
    pub edugain: EntityContext,
    pub swamid: EntityContext,
    pub umu: EntityContext,
    pub op_umu: EntityContext,
}

pub fn four_node_line() -> FourNodeLine {
    let fetcher = Arc::new(StaticFetcher::new());
    let clock = Arc::new(FixedClock::new(NOW));

    let edugain = entity("edugain", "https://edugain.geant.org", &fetcher, &clock);
    let swamid = entity("swamid", "https://swamid.se", &fetcher, &clock);
    let umu = entity("umu", "https://umu.se", &fetcher, &clock);
    let op_umu = entity("op-umu", "https://op.umu.se", &fetcher, &clock);

    link(&edugain, &swamid);
    link(&swamid, &umu);
    link(&umu, &op_umu);

    for ctx in [&edugain, &swamid, &umu, &op_umu] {
        publish(&fetcher, ctx);
    }

    FourNodeLine {
        fetcher,
        clock,
        edugain,
        swamid,
        umu,
        op_umu,
    }
}
