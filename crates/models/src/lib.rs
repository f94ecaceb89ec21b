//! Domain model for the brief catalog.
//! - Plain serde types persisted by the service layer's store.
//! - Field validation lives on the input types, the status state machine on
//!   `BriefStatus`.

pub mod brief;
pub mod errors;

pub use brief::{Brief, BriefInput, BriefPatch, BriefStatus, Level, Resource, ResourceKind};
