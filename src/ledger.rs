//! Bid ledger
//!
//! An append-only record of accepted bids, oldest first. The file is
//! the only authoritative store; sessions only cache what was read.
//!
//! There is no locking around appends. Two sessions placing a bid at
//! the same time append independently, and readers see whatever made
//! it to the file by the time they read.
mod csv_file;
#[cfg(test)]
mod in_memory;

pub use self::csv_file::*;
#[cfg(test)]
pub use self::in_memory::*;

use crate::auction::{BidRecord, HighestBid};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("ledger i/o failed for {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed ledger record")]
    Csv(#[from] csv::Error),
    #[error("ledger amount {amount} for {email} is not a finite number")]
    NonFiniteAmount { email: String, amount: f64 },
}

pub type LedgerResult<T> = Result<T, LedgerError>;

pub trait Ledger {
    /// Highest bid recorded so far
    ///
    /// A missing or empty ledger is `Ok(None)`, not an error.
    fn read_highest(&self) -> LedgerResult<Option<HighestBid>>;

    fn append(&self, record: &BidRecord) -> LedgerResult<()>;
}

pub type SharedLedger = Arc<dyn Ledger + Send + Sync + 'static>;
