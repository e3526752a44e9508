//! Entity models module
//!
//! All derived entity structs are consolidated in models.rs; the domain
//! enums they share live in enums.rs.

mod enums;
mod models;

pub use enums::{
    CycleState, PositionHealth, ProtocolEventKind, RequestKind, RequestStatus,
};
pub use models::*;
