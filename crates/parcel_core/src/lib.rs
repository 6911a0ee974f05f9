//! Core data access for parcel shipment tracking.
//! This crate owns the rules for when a parcel may be changed or removed.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::parcel::{now_rfc3339, ClientId, Parcel, ParcelNumber, ParcelStatus};
pub use repo::parcel_repo::{
    GuardedOperation, ParcelRepository, ParcelStore, RepoError, RepoResult,
};
pub use service::parcel_service::ParcelService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
