//! Per-viewer session state
//!
//! Sessions are seeded once, from the ledger or from the configured
//! defaults, and from then on only changed by the viewer's own actions.
//! Re-initializing an existing session never overwrites it, so a bid
//! placed in a session survives later refreshes even if the ledger
//! says something else.
use crate::{
    auction::AuctionSession,
    config::AuctionConfig,
    ledger::{Ledger, LedgerResult},
};
use chrono::{DateTime, Local};
use parking_lot::Mutex;
use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};
use tracing::debug;
use uuid::Uuid;

pub type SessionId = String;
pub type SessionIdRef<'a> = &'a str;

pub fn new_session_id() -> SessionId {
    Uuid::new_v4().to_string()
}

#[derive(Debug)]
pub struct SessionEntry {
    pub state: AuctionSession,
    last_seen: Instant,
}

/// A session locked for the duration of one tick
pub type SessionHandle = Arc<Mutex<SessionEntry>>;

pub type SharedSessionStore = Arc<SessionStore>;

#[derive(Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<SessionId, SessionHandle>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_shared() -> SharedSessionStore {
        Arc::new(Self::new())
    }

    /// Get the session, seeding it first if it does not exist yet
    ///
    /// The ledger is read only for sessions that are not there yet.
    pub fn initialize(
        &self,
        id: SessionIdRef,
        ledger: &dyn Ledger,
        config: &AuctionConfig,
        now: DateTime<Local>,
    ) -> LedgerResult<SessionHandle> {
        if let Some(handle) = self.get(id) {
            handle.lock().last_seen = Instant::now();
            return Ok(handle);
        }

        let seeded = AuctionSession::seed(ledger.read_highest()?, config, now);

        let handle = self
            .sessions
            .lock()
            .entry(id.to_owned())
            .or_insert_with(|| {
                debug!(
                    session = id,
                    price = seeded.current_price,
                    bidder = %seeded.current_bidder,
                    "session seeded"
                );
                Arc::new(Mutex::new(SessionEntry {
                    state: seeded,
                    last_seen: Instant::now(),
                }))
            })
            .clone();

        Ok(handle)
    }

    pub fn get(&self, id: SessionIdRef) -> Option<SessionHandle> {
        self.sessions.lock().get(id).cloned()
    }

    /// Drop sessions not seen for longer than `ttl`
    ///
    /// Returns how many were dropped.
    pub fn evict_idle(&self, ttl: Duration, now: Instant) -> usize {
        let mut sessions = self.sessions.lock();
        let before = sessions.len();
        sessions.retain(|_, handle| now.saturating_duration_since(handle.lock().last_seen) <= ttl);
        before - sessions.len()
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }
}
