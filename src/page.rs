//! The auction page
//!
//! Every request a viewer makes is one tick: initialize the session,
//! apply whatever the viewer did, then render. The session stays locked
//! for the whole tick.
use crate::{
    auction::{format_amount, AuctionSession, BidInput},
    config::AuctionConfig,
    ledger::{LedgerResult, SharedLedger},
    session::{SessionIdRef, SharedSessionStore},
};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// What the viewer did on this tick
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    /// Periodic refresh or plain page load
    Refresh,
    Bid { email: String, amount: String },
    PreviousImage,
    NextImage,
}

/// Session state as sent to the refresh script
#[derive(Clone, Debug, Serialize)]
pub struct SessionView {
    #[serde(flatten)]
    pub session: AuctionSession,
    pub price_display: String,
    pub image_count: usize,
}

#[derive(Clone)]
pub struct Page {
    config: Arc<AuctionConfig>,
    ledger: SharedLedger,
    sessions: SharedSessionStore,
}

impl Page {
    pub fn new(
        config: Arc<AuctionConfig>,
        ledger: SharedLedger,
        sessions: SharedSessionStore,
    ) -> Self {
        Self {
            config,
            ledger,
            sessions,
        }
    }

    pub fn config(&self) -> &AuctionConfig {
        &self.config
    }

    pub fn tick(
        &self,
        session_id: SessionIdRef,
        action: Action,
        now: DateTime<Local>,
    ) -> LedgerResult<SessionView> {
        let handle = self
            .sessions
            .initialize(session_id, &*self.ledger, &self.config, now)?;
        let mut entry = handle.lock();
        let session = &mut entry.state;

        match action {
            Action::Refresh => {}
            Action::PreviousImage => session.previous_image(),
            Action::NextImage => session.next_image(self.config.image_count()),
            Action::Bid { email, amount } => {
                session.email_input = email.clone();
                match BidInput::parse(&email, &amount, &self.config) {
                    Ok(bid) => {
                        if let Some(record) = session.place_bid(bid, now) {
                            self.ledger.append(&record)?;
                            info!(
                                session = session_id,
                                email = %record.email,
                                amount = record.amount,
                                "bid accepted"
                            );
                        } else {
                            debug!(
                                session = session_id,
                                amount = %amount,
                                current = session.current_price,
                                "bid not above current price"
                            );
                        }
                    }
                    Err(e) => debug!(session = session_id, "bid rejected: {}", e),
                }
            }
        }

        Ok(SessionView {
            price_display: self.price_display(session),
            image_count: self.config.image_count(),
            session: session.clone(),
        })
    }

    fn price_display(&self, session: &AuctionSession) -> String {
        format!(
            "{} {}",
            format_amount(session.current_price),
            self.config.currency
        )
    }

    pub fn render(&self, view: &SessionView) -> String {
        let config = &self.config;
        let session = &view.session;

        let categories: String = config
            .categories
            .iter()
            .map(|category| format!("<li>{}</li>\n", escape_html(category)))
            .collect();

        let mut html = String::new();
        html.push_str("<!DOCTYPE html>\n<html lang=\"de\">\n<head>\n<meta charset=\"utf-8\">\n");
        html.push_str("<title>Leber zu verkaufen</title>\n");
        html.push_str(STYLE);
        html.push_str("</head>\n<body>\n");

        html.push_str(&format!(
            "<aside class=\"sidebar\">\n<img src=\"/logo\" alt=\"Logo\">\n<ul>\n{}</ul>\n</aside>\n",
            categories
        ));

        html.push_str(&format!(
            "<main>\n<h1>{title}</h1>\n<h3>{subtitle}</h3>\n\
             <img class=\"item\" src=\"/image/{index}\" alt=\"Bild {position}\">\n\
             <div class=\"nav\">\
             <form method=\"post\" action=\"/nav/previous\"><button>← Vorherige</button></form>\
             <span id=\"position\">{position}/{count}</span>\
             <form method=\"post\" action=\"/nav/next\"><button>Nächstes →</button></form>\
             </div>\n",
            title = escape_html(&config.title),
            subtitle = escape_html(&config.subtitle),
            index = session.image_index,
            position = session.image_index + 1,
            count = view.image_count,
        ));

        html.push_str(&format!(
            "<form method=\"post\" action=\"/bid\" class=\"bid\">\n\
             <label>Enter your email <input type=\"text\" name=\"email\" id=\"email\" value=\"{email}\"></label>\n\
             <label>Bid amount <input type=\"number\" name=\"bid\" min=\"{min}\" step=\"{step}\" value=\"{min}\"></label>\n\
             <button id=\"bid_button\"{disabled}>Place bid</button>\n\
             </form>\n",
            email = escape_html(&session.email_input),
            min = format_amount(config.min_bid),
            step = format_amount(config.bid_step),
            disabled = if session.email_input.trim().is_empty() {
                " disabled"
            } else {
                ""
            },
        ));

        html.push_str(&format!(
            "<div class=\"metric\"><div>Current Price</div><div id=\"price\">{price}</div></div>\n\
             <p>Current highest bidder: <span id=\"bidder\">{bidder}</span></p>\n\
             <p class=\"ends\">Auktion endet: {ends}</p>\n\
             </main>\n",
            price = escape_html(&view.price_display),
            bidder = escape_html(&session.current_bidder),
            ends = session.end_time.format("%d.%m.%Y %H:%M"),
        ));

        html.push_str(&format!(
            "<script>\n\
             const email = document.getElementById('email');\n\
             const button = document.getElementById('bid_button');\n\
             email.addEventListener('input', () => {{ button.disabled = email.value.trim() === ''; }});\n\
             setInterval(async () => {{\n\
               const res = await fetch('/state');\n\
               if (!res.ok) return;\n\
               const state = await res.json();\n\
               document.getElementById('price').textContent = state.price_display;\n\
               document.getElementById('bidder').textContent = state.current_bidder;\n\
             }}, {});\n\
             </script>\n",
            config.refresh_interval.as_millis()
        ));
        html.push_str("</body>\n</html>\n");
        html
    }
}

const STYLE: &str = "<style>\n\
body { display: flex; font-family: sans-serif; margin: 0; }\n\
.sidebar { width: 14em; padding: 1em; background: #f0f2f6; min-height: 100vh; }\n\
.sidebar img { width: 100%; }\n\
.sidebar ul { list-style: none; padding: 0; }\n\
main { flex: 1; max-width: 40em; margin: 0 auto; padding: 1em; }\n\
img.item { width: 100%; }\n\
.nav { display: flex; justify-content: space-between; align-items: center; }\n\
.bid label { display: block; margin: .5em 0; }\n\
.metric div:last-child { font-size: 2em; }\n\
</style>\n";

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
