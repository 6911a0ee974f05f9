//! Use-case services for parcel tracking.
//!
//! # Responsibility
//! - Turn tracking use cases into repository calls.
//! - Keep CLI callers away from storage details.

pub mod parcel_service;
