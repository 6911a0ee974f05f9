//! Domain model for tracked parcel shipments.
//!
//! # Invariants
//! - Every persisted parcel is identified by its store-assigned `number`.
//! - Deletion is a hard delete; there are no tombstones.

pub mod parcel;
