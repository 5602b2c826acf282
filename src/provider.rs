use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};

use chrono::Utc;
use tracing::{info, warn};

use crate::feed_fetch::FeedSource;
use crate::presence::fetch_presence;
use crate::state::{Delta, ProviderCommand};

/// Background worker that owns all network access. It loads the feed once
/// at start, then serves commands until the command channel closes.
pub fn spawn_provider(
    source: FeedSource,
    presence_server_id: Option<String>,
    tx: Sender<Delta>,
    cmd_rx: Receiver<ProviderCommand>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        load_feed(&source, &tx);
        if let Some(server_id) = presence_server_id.as_deref() {
            load_presence(server_id, &tx);
        }

        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                ProviderCommand::ReloadFeed => load_feed(&source, &tx),
                ProviderCommand::FetchPresence => match presence_server_id.as_deref() {
                    Some(server_id) => load_presence(server_id, &tx),
                    None => {
                        let _ = tx.send(Delta::Log(
                            "[INFO] Community widget is not configured".to_string(),
                        ));
                    }
                },
            }
        }
        info!("provider stopped");
    })
}

fn load_feed(source: &FeedSource, tx: &Sender<Delta>) {
    let now = Utc::now().timestamp();
    let delta = match source.load(now) {
        Ok(snapshot) => Delta::SetFeed {
            snapshot: Arc::new(snapshot),
            fetched_at: now,
        },
        Err(err) => {
            let message = format!("{err:#}");
            warn!(source = %source.describe(), error = %message, "feed load failed");
            Delta::FeedFailed(message)
        }
    };
    let _ = tx.send(delta);
}

fn load_presence(server_id: &str, tx: &Sender<Delta>) {
    let delta = match fetch_presence(server_id) {
        Ok(widget) => Delta::SetPresence(widget),
        Err(err) => {
            let message = format!("{err:#}");
            warn!(server_id, error = %message, "presence widget failed");
            Delta::PresenceFailed(message)
        }
    };
    let _ = tx.send(delta);
}
