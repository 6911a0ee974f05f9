//! Parcel repository contract and its SQLite implementation.
//!
//! # Responsibility
//! - Provide add/get/list/update/delete over `parcel` rows.
//! - Enforce the `registered`-only rule for address changes and deletes.
//!
//! # Invariants
//! - Guarded mutations are single conditional statements; the affected-row
//!   count is the only precondition signal.
//! - A guarded mutation that matches nothing cannot tell a missing row from a
//!   parcel in the wrong status. Both surface as `PreconditionFailed`.

use crate::db::DbError;
use crate::model::parcel::{ClientId, Parcel, ParcelNumber, ParcelStatus};
use log::{debug, warn};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

const PARCEL_TABLE: &str = "parcel";
const PARCEL_COLUMNS: &[&str] = &["number", "client", "status", "address", "created_at"];

const PARCEL_SELECT_SQL: &str = "SELECT
    number,
    client,
    status,
    address,
    created_at
FROM parcel";

pub type RepoResult<T> = Result<T, RepoError>;

/// Which guarded mutation was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardedOperation {
    SetAddress,
    Delete,
}

impl GuardedOperation {
    fn as_str(self) -> &'static str {
        match self {
            Self::SetAddress => "set_address",
            Self::Delete => "delete",
        }
    }
}

/// Error returned by parcel repository operations.
#[derive(Debug)]
pub enum RepoError {
    /// Statement could not be prepared or executed.
    Db(DbError),
    /// `get` found no row with this number.
    NotFound(ParcelNumber),
    /// A guarded mutation changed no rows: the parcel is missing or is not
    /// `registered`.
    PreconditionFailed {
        number: ParcelNumber,
        operation: GuardedOperation,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(number) => write!(f, "parcel not found: {number}"),
            Self::PreconditionFailed { number, operation } => write!(
                f,
                "parcel {number} not found or not registered; {} rejected",
                operation.as_str()
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "required table `{table}` does not exist")
            }
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` does not exist")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for parcel persistence.
pub trait ParcelRepository {
    /// Inserts a parcel and returns the assigned number. `parcel.number` is ignored.
    fn add(&self, parcel: &Parcel) -> RepoResult<ParcelNumber>;
    /// Loads one parcel; `RepoError::NotFound` when absent.
    fn get(&self, number: ParcelNumber) -> RepoResult<Parcel>;
    /// Lists all parcels of a client in unspecified order.
    fn get_by_client(&self, client: ClientId) -> RepoResult<Vec<Parcel>>;
    /// Overwrites the status. Succeeds even when no row matches.
    fn set_status(&self, number: ParcelNumber, status: &ParcelStatus) -> RepoResult<()>;
    /// Changes the address of a `registered` parcel.
    fn set_address(&self, number: ParcelNumber, address: &str) -> RepoResult<()>;
    /// Hard-deletes a `registered` parcel.
    fn delete(&self, number: ParcelNumber) -> RepoResult<()>;
}

/// SQLite-backed parcel store borrowing a caller-owned connection.
pub struct ParcelStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> ParcelStore<'conn> {
    /// Wraps `conn` without inspecting it.
    ///
    /// Use when the caller already guarantees the `parcel` table exists.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Wraps `conn` after checking that the `parcel` table has every column
    /// the store reads or writes.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_parcel_table(conn)?;
        Ok(Self { conn })
    }
}

impl ParcelRepository for ParcelStore<'_> {
    fn add(&self, parcel: &Parcel) -> RepoResult<ParcelNumber> {
        self.conn.execute(
            "INSERT INTO parcel (client, status, address, created_at)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                parcel.client,
                parcel.status.as_str(),
                parcel.address.as_str(),
                parcel.created_at.as_str(),
            ],
        )?;

        let number = self.conn.last_insert_rowid();
        debug!(
            "event=parcel_add module=repo status=ok number={number} client={}",
            parcel.client
        );
        Ok(number)
    }

    fn get(&self, number: ParcelNumber) -> RepoResult<Parcel> {
        self.conn
            .query_row(
                &format!("{PARCEL_SELECT_SQL} WHERE number = ?1;"),
                [number],
                parse_parcel_row,
            )
            .optional()?
            .ok_or(RepoError::NotFound(number))
    }

    fn get_by_client(&self, client: ClientId) -> RepoResult<Vec<Parcel>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PARCEL_SELECT_SQL} WHERE client = ?1;"))?;
        let parcels = stmt
            .query_map([client], parse_parcel_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(parcels)
    }

    fn set_status(&self, number: ParcelNumber, status: &ParcelStatus) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE parcel SET status = ?1 WHERE number = ?2;",
            params![status.as_str(), number],
        )?;

        debug!(
            "event=parcel_set_status module=repo status=ok number={number} new_status={status} changed={changed}"
        );
        Ok(())
    }

    fn set_address(&self, number: ParcelNumber, address: &str) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE parcel SET address = ?1 WHERE number = ?2 AND status = ?3;",
            params![address, number, ParcelStatus::Registered.as_str()],
        )?;
        guard_changed(changed, number, GuardedOperation::SetAddress)
    }

    fn delete(&self, number: ParcelNumber) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM parcel WHERE number = ?1 AND status = ?2;",
            params![number, ParcelStatus::Registered.as_str()],
        )?;
        guard_changed(changed, number, GuardedOperation::Delete)
    }
}

fn guard_changed(
    changed: usize,
    number: ParcelNumber,
    operation: GuardedOperation,
) -> RepoResult<()> {
    if changed == 0 {
        warn!(
            "event=parcel_{} module=repo status=rejected number={number} error_code=precondition_failed",
            operation.as_str()
        );
        return Err(RepoError::PreconditionFailed { number, operation });
    }

    debug!(
        "event=parcel_{} module=repo status=ok number={number}",
        operation.as_str()
    );
    Ok(())
}

fn parse_parcel_row(row: &Row<'_>) -> rusqlite::Result<Parcel> {
    Ok(Parcel {
        number: row.get("number")?,
        client: row.get("client")?,
        status: ParcelStatus::from(row.get::<_, String>("status")?),
        address: row.get("address")?,
        created_at: row.get("created_at")?,
    })
}

fn ensure_parcel_table(conn: &Connection) -> RepoResult<()> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1);")?;
    let columns = stmt
        .query_map([PARCEL_TABLE], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<HashSet<_>>>()?;

    if columns.is_empty() {
        return Err(RepoError::MissingRequiredTable(PARCEL_TABLE));
    }

    for &column in PARCEL_COLUMNS {
        if !columns.contains(column) {
            return Err(RepoError::MissingRequiredColumn {
                table: PARCEL_TABLE,
                column,
            });
        }
    }

    Ok(())
}
