//! Storage for the service layer.
//!
//! A JSON file-backed map keyed by brief id; the store handle is created by
//! the boundary layer and passed into the core components.

pub mod brief_store;

pub use brief_store::BriefStore;
