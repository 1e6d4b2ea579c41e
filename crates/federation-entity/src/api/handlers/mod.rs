//! API request handlers

pub mod entity;
pub mod fetch;
pub mod resolve;
pub mod subordinates;
pub mod trust_marks;
pub mod wellknown;

pub use entity::{
    add_received_trust_mark, entity_info, list_received_trust_marks, set_authority_hints,
    AddReceivedTrustMarkRequest, AddReceivedTrustMarkResponse, EntityInfoResponse,
    ReceivedTrustMarkResponse, SetAuthorityHintsRequest, SetAuthorityHintsResponse,
};
pub use fetch::{fetch_subordinate, FetchParams};
pub use resolve::{resolve_chain, ResolveParams, ResolveResponse};
pub use subordinates::{
    delete_subordinate, get_subordinate, list_subordinates, statement_preview,
    update_subordinate, upsert_subordinate, DeleteSubordinateResponse, SubordinateResponse,
    UpdateSubordinateRequest, UpsertSubordinateRequest,
};
pub use trust_marks::{IssueTrustMarkRequest, IssueTrustMarkResponse, RevokeTrustMarkResponse, TrustMarkResponse};
pub use wellknown::{entity_configuration, ENTITY_STATEMENT_CONTENT_TYPE};
