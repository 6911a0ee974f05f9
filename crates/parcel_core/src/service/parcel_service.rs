//! Parcel tracking use cases.
//!
//! # Invariants
//! - The service never bypasses repository guards; address and delete rules
//!   stay in the single guarded statements.
//! - `next_status` is a read followed by an unconditional write and is not
//!   atomic with respect to other writers.

use crate::model::parcel::{ClientId, Parcel, ParcelNumber, ParcelStatus};
use crate::repo::parcel_repo::{ParcelRepository, RepoResult};
use log::info;

/// Use-case wrapper over a parcel repository.
pub struct ParcelService<R: ParcelRepository> {
    repo: R,
}

impl<R: ParcelRepository> ParcelService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers a new parcel for `client` and returns it with its number set.
    ///
    /// # Contract
    /// - Status is `registered`.
    /// - `created_at` is the current UTC time.
    pub fn register(&self, client: ClientId, address: impl Into<String>) -> RepoResult<Parcel> {
        let mut parcel = Parcel::new(client, address);
        parcel.number = self.repo.add(&parcel)?;
        info!(
            "event=parcel_register module=service status=ok number={} client={client}",
            parcel.number
        );
        Ok(parcel)
    }

    /// Loads one parcel by number.
    pub fn parcel(&self, number: ParcelNumber) -> RepoResult<Parcel> {
        self.repo.get(number)
    }

    /// Returns every parcel owned by `client`.
    pub fn client_parcels(&self, client: ClientId) -> RepoResult<Vec<Parcel>> {
        self.repo.get_by_client(client)
    }

    /// Moves a parcel to the next lifecycle status.
    ///
    /// Returns the new status, or `None` when the parcel is already in a
    /// terminal or unknown status (nothing is written then).
    pub fn next_status(&self, number: ParcelNumber) -> RepoResult<Option<ParcelStatus>> {
        let parcel = self.repo.get(number)?;
        let Some(next) = parcel.status.next() else {
            info!(
                "event=parcel_next_status module=service status=skipped number={number} current={}",
                parcel.status
            );
            return Ok(None);
        };

        self.repo.set_status(number, &next)?;
        info!(
            "event=parcel_next_status module=service status=ok number={number} from={} to={next}",
            parcel.status
        );
        Ok(Some(next))
    }

    /// Changes the delivery address of a `registered` parcel.
    pub fn change_address(&self, number: ParcelNumber, address: &str) -> RepoResult<()> {
        self.repo.set_address(number, address)?;
        info!("event=parcel_change_address module=service status=ok number={number}");
        Ok(())
    }

    /// Deletes a `registered` parcel.
    pub fn delete(&self, number: ParcelNumber) -> RepoResult<()> {
        self.repo.delete(number)?;
        info!("event=parcel_delete module=service status=ok number={number}");
        Ok(())
    }
}
