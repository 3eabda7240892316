//! Data Transfer Objects for REST request/response serialization.
//!
//! Money amounts are serialized as decimal strings.

pub mod common_dto;
pub mod inbox_dto;
pub mod listing_dto;
pub mod purchase_dto;

pub use common_dto::*;
pub use inbox_dto::*;
pub use listing_dto::*;
pub use purchase_dto::*;
