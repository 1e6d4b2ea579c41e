//! # Federation Core
//!
//! Core types and cryptographic primitives for OpenID Federation 1.0
//! entities.
//!
//! ## Key Concepts
//!
//! - **Entity Configuration**: a self-signed JWT where `iss == sub`
//! - **Subordinate Statement**: a superior's signed assertion about a
//!   subordinate (`iss != sub`)
//! - **Trust Mark**: a signed assertion that a subject meets criteria
//!   identified by a trust mark ID
//!
//! All statements are compact-serialized RS256 JWTs. Signing keys are
//! RSA-2048 pairs generated at process start and published as JWKS.

pub mod error;
pub mod jwk;
pub mod jwt;
pub mod keys;
pub mod statement;
pub mod time;

pub use error::{FederationError, Result};
pub use jwk::{Jwk, JwkSet};
pub use keys::KeyManager;
pub use statement::{Statement, StatementKind};
pub use time::{Clock, FixedClock, SystemClock};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
