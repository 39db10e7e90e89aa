mod auction;
mod service;

use std::path::PathBuf;

/// Unique ledger path in the system temp dir, not created yet
pub fn temp_ledger_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "leber_auction_{}_{}.csv",
        name,
        uuid::Uuid::new_v4()
    ))
}
