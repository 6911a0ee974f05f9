//! Repository layer over the `parcel` table.
//!
//! # Responsibility
//! - Define the data access contract used by the service layer.
//! - Keep SQL inside the persistence boundary.
//!
//! # Invariants
//! - Each repository call is exactly one SQL statement; there are no
//!   transactions, retries or caches at this layer.
//! - Semantic errors (`NotFound`, `PreconditionFailed`) are reported next to
//!   transport errors from the driver.

pub mod parcel_repo;
