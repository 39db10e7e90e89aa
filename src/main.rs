mod auction;
mod config;
mod ledger;
mod page;
mod service;
mod session;

use anyhow::Result;
use std::sync::Arc;
use tracing::info;

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let config = Arc::new(config::AuctionConfig::default());
    let ledger = ledger::CsvLedger::new_shared(config.ledger_path.clone());
    let sessions = session::SessionStore::new_shared();
    let page = page::Page::new(config.clone(), ledger, sessions.clone());

    let svc_ctr = service::ServiceControl::new();

    ctrlc::set_handler({
        let svc_ctr = svc_ctr.clone();
        move || {
            info!("Stopping all services...");
            svc_ctr.stop_all();
        }
    })?;

    for handle in vec![
        svc_ctr.spawn_loop(service::Ui::new(page)?)?,
        svc_ctr.spawn_loop(service::SessionReaper::new(sessions, config.session_ttl))?,
    ] {
        handle.join()?
    }

    Ok(())
}

#[cfg(test)]
mod tests;
