use super::*;
use crate::auction::format_amount;
use std::fs::{self, OpenOptions};
use std::io;
use tracing::debug;

/// Headerless `email,amount` CSV file
#[derive(Debug, Clone)]
pub struct CsvLedger {
    path: PathBuf,
}

impl CsvLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn new_shared(path: impl Into<PathBuf>) -> SharedLedger {
        Arc::new(Self::new(path))
    }

    fn io_err(&self, source: io::Error) -> LedgerError {
        LedgerError::Io {
            path: self.path.clone(),
            source,
        }
    }

    pub fn read_all(&self) -> LedgerResult<Vec<BidRecord>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(self.io_err(e)),
        };

        if content.trim().is_empty() {
            return Ok(vec![]);
        }

        csv::ReaderBuilder::new()
            .has_headers(false)
            .trim(csv::Trim::Fields)
            .from_reader(content.as_bytes())
            .deserialize::<BidRecord>()
            .map(|record| -> LedgerResult<BidRecord> {
                let record = record?;
                if !record.amount.is_finite() {
                    return Err(LedgerError::NonFiniteAmount {
                        email: record.email,
                        amount: record.amount,
                    });
                }
                Ok(record)
            })
            .collect()
    }
}

impl Ledger for CsvLedger {
    fn read_highest(&self) -> LedgerResult<Option<HighestBid>> {
        let records = self.read_all()?;
        Ok(HighestBid::from_records(&records))
    }

    fn append(&self, record: &BidRecord) -> LedgerResult<()> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_err(e))?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        let amount = format_amount(record.amount);
        writer.write_record([record.email.as_str(), amount.as_str()])?;
        writer.flush().map_err(|e| self.io_err(e))?;

        debug!(path = %self.path.display(), email = %record.email, amount = record.amount, "bid appended");
        Ok(())
    }
}
