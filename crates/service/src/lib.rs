//! Service layer: the cross-service referential-integrity and aggregation
//! core of the brief catalog.
//! - Verifies foreign competence references against their authority before
//!   any write that introduces them (fail-closed).
//! - Guards deletes behind the learner service's usage report (fail-open).
//! - Computes paginated listings, aggregate statistics and a popularity
//!   ranking with a local fallback.

pub mod authority;
pub mod briefs;
pub mod clients;
pub mod errors;
pub mod pagination;
pub mod popular;
pub mod stats;
pub mod storage;
#[cfg(test)]
pub mod test_support;
pub mod usage_guard;
pub mod verify;
