use crate::auction::Amount;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Fixed settings of the auction page
///
/// There are no flags or env vars to tweak these; tests build their own
/// with struct update syntax over `Default`.
#[derive(Clone, Debug)]
pub struct AuctionConfig {
    pub bind_addr: SocketAddr,
    pub ledger_path: PathBuf,
    pub starting_price: Amount,
    pub placeholder_bidder: String,
    pub currency: String,
    pub refresh_interval: Duration,
    pub min_bid: Amount,
    pub bid_step: Amount,
    pub image_paths: Vec<PathBuf>,
    pub logo_path: PathBuf,
    pub categories: Vec<String>,
    /// Idle time after which a viewer's session is discarded
    pub session_ttl: Duration,
    pub title: String,
    pub subtitle: String,
}

impl AuctionConfig {
    pub fn image_count(&self) -> usize {
        self.image_paths.len()
    }
}

impl Default for AuctionConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            ledger_path: PathBuf::from("emails.csv"),
            starting_price: 10000.0,
            placeholder_bidder: "No bids yet".to_owned(),
            currency: "CHF".to_owned(),
            refresh_interval: Duration::from_millis(1000),
            min_bid: 1000.0,
            bid_step: 50.0,
            image_paths: vec![
                PathBuf::from("img/img_1.jpg"),
                PathBuf::from("img/img_2.jpg"),
            ],
            logo_path: PathBuf::from("Logo.png"),
            categories: [
                "Autos",
                "Immobilien",
                "Kleider",
                "Möbel",
                "Schmuck",
                "Technik",
                "Weiteres Organe",
            ]
            .iter()
            .map(|c| c.to_string())
            .collect(),
            session_ttl: Duration::from_secs(30 * 60),
            title: "Leber-Auktion".to_owned(),
            subtitle: "Leber in gutem Zustand zu verkaufen".to_owned(),
        }
    }
}
