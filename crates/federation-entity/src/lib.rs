//! Federation Entity Server
//!
//! One process running this crate is one OpenID Federation 1.0 entity. It:
//! - Publishes a self-signed Entity Configuration at the well-known endpoint
//! - Serves signed Subordinate Statements about registered subordinates
//! - Issues and receives Trust Marks
//! - Resolves trust chains from any target entity to a trust anchor
//!
//! ## API Endpoints
//!
//! ### Federation wire protocol
//! - `GET /.well-known/openid-federation` - Entity Configuration (signed JWT)
//! - `GET /fetch?sub=<id>` - Subordinate Statement (signed JWT)
//! - `GET /resolve?sub=<url>&trust_anchor=<url>` - trust chain resolution
//!
//! ### Management
//! - `GET /manage/entity` - entity summary
//! - `POST /manage/entity/authority-hints` - declare superiors
//! - `GET|POST /manage/subordinates`, `GET|PUT|DELETE /manage/subordinates/{id}`
//! - `GET|POST /manage/trust-marks`, `GET|DELETE /manage/trust-marks/{id}`
//! - `GET|POST /manage/entity/trust-marks` - trust marks received by this entity

pub mod api;
pub mod context;
pub mod fetch;
pub mod resolver;
pub mod settings;
pub mod state;
pub mod statements;
pub mod trust_marks;
pub mod validator;

pub use api::create_router;
pub use context::EntityContext;
pub use fetch::{HttpFetcher, ReqwestFetcher, StaticFetcher};
pub use resolver::{ChainResult, TrustChainResolver, MAX_HOPS};
pub use settings::EntitySettings;
pub use state::{EntityState, SubordinateRecord, TrustMarkRecord};
pub use validator::{validate_trust_marks, TrustMarkValidation};
