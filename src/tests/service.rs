use crate::service::{LoopService, ServiceControl};
use anyhow::{bail, Result};
use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

struct Ticker(Arc<AtomicUsize>);

impl LoopService for Ticker {
    fn name(&self) -> &'static str {
        "ticker"
    }

    fn run_iteration(&mut self) -> Result<()> {
        self.0.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(5));
        Ok(())
    }
}

struct FailsAfter(usize);

impl LoopService for FailsAfter {
    fn name(&self) -> &'static str {
        "fails-after"
    }

    fn run_iteration(&mut self) -> Result<()> {
        if self.0 == 0 {
            bail!("out of iterations");
        }
        self.0 -= 1;
        std::thread::sleep(Duration::from_millis(5));
        Ok(())
    }
}

struct Panics;

impl LoopService for Panics {
    fn name(&self) -> &'static str {
        "panics"
    }

    fn run_iteration(&mut self) -> Result<()> {
        panic!("boom");
    }
}

#[test]
fn stop_all_ends_every_service() -> Result<()> {
    let svc_ctr = ServiceControl::new();
    let ticks = Arc::new(AtomicUsize::new(0));

    let handle = svc_ctr.spawn_loop(Ticker(ticks.clone()))?;
    std::thread::sleep(Duration::from_millis(20));
    svc_ctr.stop_all();

    handle.join()?;
    assert!(ticks.load(Ordering::SeqCst) > 0);
    Ok(())
}

#[test]
fn failing_service_stops_the_others() -> Result<()> {
    let svc_ctr = ServiceControl::new();

    let ticker = svc_ctr.spawn_loop(Ticker(Arc::new(AtomicUsize::new(0))))?;
    let failing = svc_ctr.spawn_loop(FailsAfter(3))?;

    let err = failing.join().expect_err("service should fail");
    assert!(format!("{:#}", err).contains("out of iterations"));

    // the ticker only returns once the failure stopped everything
    ticker.join()?;
    Ok(())
}

#[test]
fn panicking_service_is_reported_as_error() -> Result<()> {
    let svc_ctr = ServiceControl::new();

    let ticker = svc_ctr.spawn_loop(Ticker(Arc::new(AtomicUsize::new(0))))?;
    let panics = svc_ctr.spawn_loop(Panics)?;

    let err = panics.join().expect_err("panic should surface as an error");
    assert!(format!("{:#}", err).contains("service panics failed"));

    ticker.join()?;
    Ok(())
}
