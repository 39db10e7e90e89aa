use super::*;
use parking_lot::RwLock;

/// Fake in-memory ledger.
///
/// Useful for unit-tests.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    records: RwLock<Vec<BidRecord>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<BidRecord>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    pub fn records(&self) -> Vec<BidRecord> {
        self.records.read().clone()
    }
}

impl Ledger for InMemoryLedger {
    fn read_highest(&self) -> LedgerResult<Option<HighestBid>> {
        Ok(HighestBid::from_records(self.records.read().iter()))
    }

    fn append(&self, record: &BidRecord) -> LedgerResult<()> {
        self.records.write().push(record.clone());
        Ok(())
    }
}
