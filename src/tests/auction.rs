use crate::{
    auction::{format_amount, AuctionSession, BidInput, BidRecord, BidRejected, HighestBid},
    config::AuctionConfig,
};
use anyhow::Result;
use chrono::{Local, Timelike};

fn bid(email: &str, amount: &str) -> Result<BidInput> {
    Ok(BidInput::parse(email, amount, &AuctionConfig::default())?)
}

#[test]
fn highest_bid_prefers_first_occurrence() {
    let records = vec![
        BidRecord::new("a@x.com", 100.0),
        BidRecord::new("b@x.com", 250.0),
        BidRecord::new("c@x.com", 250.0),
    ];

    assert_eq!(
        HighestBid::from_records(&records),
        Some(HighestBid {
            amount: 250.0,
            email: "b@x.com".to_owned()
        })
    );
    assert_eq!(HighestBid::from_records(Vec::<BidRecord>::new().iter()), None);
}

#[test]
fn seeds_defaults_without_bids() {
    let config = AuctionConfig::default();
    let now = Local::now();
    let session = AuctionSession::seed(None, &config, now);

    assert_eq!(session.current_price, 10000.0);
    assert_eq!(session.current_bidder, "No bids yet");
    assert_eq!(session.bid_count, 0);
    assert_eq!(session.image_index, 0);
    assert_eq!(session.last_bid_time, now);
    assert!(session.auto_bidding_active);
    assert!(session.start_time < now);
    assert!(session.end_time > now);
    assert_eq!(session.end_time.minute(), 0);
}

#[test]
fn seeds_from_highest_bid() {
    let session = AuctionSession::seed(
        Some(HighestBid {
            amount: 12050.0,
            email: "b@x.com".to_owned(),
        }),
        &AuctionConfig::default(),
        Local::now(),
    );

    assert_eq!(session.current_price, 12050.0);
    assert_eq!(session.current_bidder, "b@x.com");
}

#[test]
fn equal_bid_is_rejected() -> Result<()> {
    let mut session = AuctionSession::seed(None, &AuctionConfig::default(), Local::now());
    let before = session.clone();

    assert_eq!(session.place_bid(bid("a@x.com", "10000")?, Local::now()), None);
    assert_eq!(session, before);
    Ok(())
}

#[test]
fn higher_bid_updates_session() -> Result<()> {
    let seeded_at = Local::now();
    let mut session = AuctionSession::seed(None, &AuctionConfig::default(), seeded_at);
    let bid_at = seeded_at + chrono::Duration::seconds(5);

    let record = session.place_bid(bid("a@x.com", "10050")?, bid_at);

    assert_eq!(record, Some(BidRecord::new("a@x.com", 10050.0)));
    assert_eq!(session.current_price, 10050.0);
    assert_eq!(session.current_bidder, "a@x.com");
    assert_eq!(session.last_bid_time, bid_at);
    assert_eq!(session.bid_count, 1);
    assert!(!session.auto_bidding_active);
    Ok(())
}

#[test]
fn bid_input_enforces_form_constraints() {
    let config = AuctionConfig::default();

    assert_eq!(
        BidInput::parse("", "1000", &config),
        Err(BidRejected::BlankEmail)
    );
    assert_eq!(
        BidInput::parse("  \t", "1000", &config),
        Err(BidRejected::BlankEmail)
    );
    assert_eq!(
        BidInput::parse("a@x.com", "950", &config),
        Err(BidRejected::BelowMinimum {
            amount: 950.0,
            min: 1000.0
        })
    );
    assert_eq!(
        BidInput::parse("a@x.com", "1020", &config),
        Err(BidRejected::OffStep {
            amount: 1020.0,
            step: 50.0
        })
    );
    assert!(matches!(
        BidInput::parse("a@x.com", "lots", &config),
        Err(BidRejected::NotANumber(_))
    ));
    assert_eq!(
        BidInput::parse("a@x.com", "1050", &config),
        Ok(BidInput {
            email: "a@x.com".to_owned(),
            amount: 1050.0
        })
    );
}

#[test]
fn image_navigation_stays_in_range() {
    let mut session = AuctionSession::seed(None, &AuctionConfig::default(), Local::now());

    session.previous_image();
    assert_eq!(session.image_index, 0);

    session.next_image(2);
    assert_eq!(session.image_index, 1);
    session.next_image(2);
    assert_eq!(session.image_index, 1);

    session.previous_image();
    assert_eq!(session.image_index, 0);
}

#[test]
fn whole_amounts_have_no_fraction() {
    assert_eq!(format_amount(1050.0), "1050");
    assert_eq!(format_amount(1050.5), "1050.5");
}
