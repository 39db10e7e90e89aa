pub mod session_reaper;
pub mod ui;

pub use self::{session_reaper::*, ui::*};
use anyhow::{format_err, Context, Result};
use std::{
    panic::{self, AssertUnwindSafe},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
};
use tracing::{debug, error};

/// A service that is a loop that does something
pub trait LoopService: Send + Sync {
    /// Used to name the service thread and in logs
    fn name(&self) -> &'static str;

    fn run_iteration(&mut self) -> Result<()>;
}

/// Service execution control instance
///
/// All services are basically a loop, and we would like to be able to
/// gracefully terminate them, and handle and top-level error of any
/// of them by gracefully stopping everything else.
#[derive(Clone, Default)]
pub struct ServiceControl {
    stop_all: Arc<AtomicBool>,
}

impl ServiceControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop_all(&self) {
        self.stop_all.store(true, Ordering::SeqCst);
    }

    /// Run `service` on its own thread until it fails or everything stops
    ///
    /// An error or panic in the service stops all the other services too.
    pub fn spawn_loop(&self, mut service: impl LoopService + 'static) -> Result<JoinHandle> {
        let name = service.name();
        let stop = Arc::new(AtomicBool::new(false));
        let stop_all = self.stop_all.clone();

        let thread = thread::Builder::new()
            .name(name.to_owned())
            .spawn({
                let stop = stop.clone();
                move || {
                    let res = panic::catch_unwind(AssertUnwindSafe(|| {
                        run_until_stopped(&stop, &stop_all, || service.run_iteration())
                    }))
                    .unwrap_or_else(|_| Err(format_err!("service panicked")))
                    .with_context(|| format!("service {} failed", name));

                    if let Err(e) = &res {
                        error!("{:#}", e);
                        stop_all.store(true, Ordering::SeqCst);
                    }
                    debug!(service = name, "service stopped");
                    res
                }
            })
            .with_context(|| format!("failed to spawn service {}", name))?;

        Ok(JoinHandle::new(stop, thread))
    }
}

fn run_until_stopped(
    stop: &AtomicBool,
    stop_all: &AtomicBool,
    mut iteration: impl FnMut() -> Result<()>,
) -> Result<()> {
    while !stop.load(Ordering::SeqCst) && !stop_all.load(Ordering::SeqCst) {
        iteration()?;
    }
    Ok(())
}

/// Simple thread join wrapper that joins the thread on drop
pub struct JoinHandle {
    stop: Arc<AtomicBool>,
    thread: Option<thread::JoinHandle<Result<()>>>,
}

impl JoinHandle {
    fn new(stop: Arc<AtomicBool>, handle: thread::JoinHandle<Result<()>>) -> Self {
        JoinHandle {
            stop,
            thread: Some(handle),
        }
    }

    fn join_mut(&mut self) -> Result<()> {
        if let Some(h) = self.thread.take() {
            h.join().map_err(|e| format_err!("join failed: {:?}", e))?
        } else {
            Ok(())
        }
    }

    pub fn join(mut self) -> Result<()> {
        self.join_mut()
    }
}

impl Drop for JoinHandle {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Err(e) = self.join_mut() {
            error!("service stopped with error: {:#}", e);
        }
    }
}
