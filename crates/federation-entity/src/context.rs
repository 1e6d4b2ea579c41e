//! Entity context
//!
//! One value carrying everything a handler needs: settings, signing keys,
//! mutable state, and the clock and fetcher collaborators. Threaded through
//! the router as shared state instead of living in process globals.

use std::sync::Arc;

use federation_core::{Clock, KeyManager};

use crate::fetch::HttpFetcher;
use crate::settings::EntitySettings;
use crate::state::EntityState;

pub struct EntityContext {
    pub settings: EntitySettings,
    pub keys: Arc<KeyManager>,
    pub state: EntityState,
    pub clock: Arc<dyn Clock>,
    pub fetcher: Arc<dyn HttpFetcher>,
}

impl EntityContext {
    pub fn new(
        settings: EntitySettings,
        keys: Arc<KeyManager>,
        clock: Arc<dyn Clock>,
        fetcher: Arc<dyn HttpFetcher>,
    ) -> Self {
        let state = EntityState::new(settings.entity_id.clone());
        Self {
            settings,
            keys,
            state,
            clock,
            fetcher,
        }
    }
}
