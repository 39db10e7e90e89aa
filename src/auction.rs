use crate::config::AuctionConfig;
use chrono::{DateTime, Duration, Local, Timelike};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type Amount = f64;
pub type Email = String;
pub type EmailRef<'s> = &'s str;

/// Why a bid entered at the form was not accepted
///
/// None of these are shown to the viewer; the page simply keeps
/// showing the old price.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BidRejected {
    #[error("email is blank")]
    BlankEmail,
    #[error("not a number: {0}")]
    NotANumber(String),
    #[error("bid {amount} is below the minimum of {min}")]
    BelowMinimum { amount: Amount, min: Amount },
    #[error("bid {amount} is not a multiple of {step} above the minimum")]
    OffStep { amount: Amount, step: Amount },
}

/// One accepted bid, a single row of the ledger
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BidRecord {
    pub email: Email,
    pub amount: Amount,
}

impl BidRecord {
    pub fn new(email: impl Into<Email>, amount: Amount) -> Self {
        Self {
            email: email.into(),
            amount,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct HighestBid {
    pub amount: Amount,
    pub email: Email,
}

impl HighestBid {
    /// Highest amount, attributed to the earliest record that reached it
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a BidRecord>) -> Option<Self> {
        let mut highest: Option<&BidRecord> = None;
        for record in records {
            if highest.map_or(true, |h| h.amount < record.amount) {
                highest = Some(record);
            }
        }
        highest.map(|record| Self {
            amount: record.amount,
            email: record.email.clone(),
        })
    }
}

/// A bid as entered by the viewer, checked against the form constraints
#[derive(Clone, Debug, PartialEq)]
pub struct BidInput {
    pub email: Email,
    pub amount: Amount,
}

impl BidInput {
    pub fn parse(
        email: EmailRef,
        amount: &str,
        config: &AuctionConfig,
    ) -> Result<Self, BidRejected> {
        use BidRejected::*;

        if email.trim().is_empty() {
            return Err(BlankEmail);
        }

        let amount: Amount = amount
            .trim()
            .parse()
            .ok()
            .filter(|a: &Amount| a.is_finite())
            .ok_or_else(|| NotANumber(amount.to_owned()))?;

        if amount < config.min_bid {
            return Err(BelowMinimum {
                amount,
                min: config.min_bid,
            });
        }
        if ((amount - config.min_bid) / config.bid_step).fract() != 0.0 {
            return Err(OffStep {
                amount,
                step: config.bid_step,
            });
        }

        Ok(Self {
            email: email.to_owned(),
            amount,
        })
    }
}

/// Display state of one viewer
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AuctionSession {
    pub current_price: Amount,
    pub current_bidder: String,
    pub last_bid_time: DateTime<Local>,
    pub bid_count: u64,
    pub image_index: usize,
    /// Only ever switched off; nothing bids automatically.
    pub auto_bidding_active: bool,
    pub start_time: DateTime<Local>,
    pub end_time: DateTime<Local>,
    /// Last content of the email field, kept across refreshes
    pub email_input: String,
}

impl AuctionSession {
    pub fn seed(highest: Option<HighestBid>, config: &AuctionConfig, now: DateTime<Local>) -> Self {
        let (current_price, current_bidder) = match highest {
            Some(HighestBid { amount, email }) => (amount, email),
            None => (config.starting_price, config.placeholder_bidder.clone()),
        };

        Self {
            current_price,
            current_bidder,
            last_bid_time: now,
            bid_count: 0,
            image_index: 0,
            auto_bidding_active: true,
            start_time: now - Duration::days(2),
            end_time: next_full_hour(now) + Duration::hours(1),
            email_input: String::new(),
        }
    }

    /// Accept the bid if it beats the current price
    ///
    /// Returns the record that has to be appended to the ledger.
    pub fn place_bid(&mut self, bid: BidInput, now: DateTime<Local>) -> Option<BidRecord> {
        if bid.amount <= self.current_price {
            return None;
        }

        self.current_price = bid.amount;
        self.current_bidder = bid.email.clone();
        self.last_bid_time = now;
        self.auto_bidding_active = false;
        self.bid_count += 1;

        Some(BidRecord::new(bid.email, bid.amount))
    }

    pub fn previous_image(&mut self) {
        self.image_index = self.image_index.saturating_sub(1);
    }

    pub fn next_image(&mut self, image_count: usize) {
        let last = image_count.saturating_sub(1);
        self.image_index = (self.image_index + 1).min(last);
    }
}

fn next_full_hour(now: DateTime<Local>) -> DateTime<Local> {
    let later = now + Duration::hours(1);
    later
        .with_minute(0)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(later)
}

/// Render an amount the way the ledger and the page show it
///
/// Whole amounts lose the fractional part: `1050`, not `1050.0`.
pub fn format_amount(amount: Amount) -> String {
    format!("{}", amount)
}
