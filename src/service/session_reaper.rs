use crate::{service::LoopService, session::SharedSessionStore};
use anyhow::Result;
use std::time::{Duration, Instant};
use tracing::info;

/// Discards sessions of viewers that went away
pub struct SessionReaper {
    sessions: SharedSessionStore,
    ttl: Duration,
    sweep_every: Duration,
    last_sweep: Instant,
}

impl SessionReaper {
    pub fn new(sessions: SharedSessionStore, ttl: Duration) -> Self {
        Self {
            sessions,
            ttl,
            sweep_every: Duration::from_secs(10),
            last_sweep: Instant::now(),
        }
    }

    pub fn sweep(&mut self, now: Instant) -> usize {
        self.last_sweep = now;
        let evicted = self.sessions.evict_idle(self.ttl, now);
        if evicted > 0 {
            info!(
                evicted,
                remaining = self.sessions.len(),
                "idle sessions discarded"
            );
        }
        evicted
    }
}

impl LoopService for SessionReaper {
    fn name(&self) -> &'static str {
        "session-reaper"
    }

    fn run_iteration(&mut self) -> Result<()> {
        // don't hog the cpu
        std::thread::sleep(Duration::from_millis(100));

        let now = Instant::now();
        if now.saturating_duration_since(self.last_sweep) >= self.sweep_every {
            self.sweep(now);
        }
        Ok(())
    }
}
