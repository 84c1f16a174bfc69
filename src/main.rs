use log::{error, info, warn};

use ymm_messenger::drawer::{Drawer, Poller};
use ymm_messenger::integration::Config;
use ymm_messenger::state::AppState;
use ymm_messenger::{Error, Result};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::default();
    let app = AppState::init(&config.api)?;

    if config.api.token.is_none() {
        if let Some(credentials) = config.api.credentials.as_ref() {
            app.auth_service.login(credentials).await?;
        }
    }

    let viewer = app.auth_service.me().await?.ok_or(Error::Unauthenticated)?;
    match viewer.id() {
        Some(id) => info!("signed in as {} ({id})", viewer.username()),
        None => warn!("signed in as {} without a user id", viewer.username()),
    }

    let drawer = Drawer::new(app, viewer.id());
    if let Err(e) = drawer.open().await {
        error!("could not open drawer: {e}");
    }

    let poller = Poller::spawn(drawer.clone(), config.poll_interval);
    let mut changes = drawer.subscribe();
    let mut last = changes.borrow_and_update().clone();
    info!(
        "{} threads, {} unread",
        last.threads.len(),
        last.unread_count
    );

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = changes.changed() => {
                if changed.is_err() {
                    break;
                }

                let state = changes.borrow_and_update().clone();
                if state.unread_count != last.unread_count {
                    info!("unread: {}", state.unread_count);
                }
                if state.threads.len() != last.threads.len() {
                    info!("threads: {}", state.threads.len());
                }
                if state.active_thread != last.active_thread {
                    if let Some(t) = state.active() {
                        info!("active: {} ({})", t.display_name(), t.kind().as_str());
                    }
                }
                if let Some(e) = state.error.as_ref().filter(|_| state.error != last.error) {
                    error!("{e}");
                }
                last = state;
            }
        }
    }

    info!("shutting down");
    poller.stop().await;
    Ok(())
}
