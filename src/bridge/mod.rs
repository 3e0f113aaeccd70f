//! Window-side bridge to the privileged host process
//!
//! Each window gets a [`Bridge`] exposing exactly three call shapes:
//! fire-and-forget sends, one blocking request/reply lookup, and
//! subscriptions gated by the window's channel allow-list. Failures of the
//! host link are invisible to callers; there is no retry and no timeout.

mod io;
pub mod message;
pub mod types;

pub use io::{parse_message, parse_message_graceful, serialize_message, ParseResult};
pub use message::{Channel, Message};
pub use types::{
    CollectionInfo, CollectionMod, ConfirmRecord, FileLink, LogLevel, SavegameMod,
    SavegameSnapshot, WindowTag,
};

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::mpsc as std_mpsc;

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// One unit of outbound traffic. A reply sender is attached only by
/// [`Outbound::invoke_sync`]; everything else is fire-and-forget.
pub struct Envelope {
    pub message: Message,
    pub reply: Option<std_mpsc::SyncSender<Message>>,
}

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("host endpoint closed")]
    HostClosed,
    #[error("host did not reply")]
    NoReply,
}

/// Cloneable sending half of a window's host link. Handlers registered via
/// [`Bridge::subscribe`] capture one of these instead of the bridge itself.
#[derive(Clone)]
pub struct Outbound {
    window: WindowTag,
    tx: mpsc::UnboundedSender<Envelope>,
}

impl Outbound {
    pub fn window(&self) -> WindowTag {
        self.window
    }

    /// Fire-and-forget send. A gone host is not an error the caller sees.
    pub fn send(&self, message: Message) {
        let envelope = Envelope {
            message,
            reply: None,
        };
        if self.tx.send(envelope).is_err() {
            debug!(window = self.window.as_str(), "host endpoint gone, message dropped");
        }
    }

    /// Forward a structured log line to the host's log sink.
    pub fn log(&self, level: LogLevel, text: impl Into<String>) {
        self.send(Message::Log {
            level,
            source: self.window.as_str().to_string(),
            text: text.into(),
        });
    }

    /// Send a request and block the calling thread until the host replies.
    /// Only the confirm window's path lookup goes through here; the host
    /// answers it fast enough that stalling the UI thread is acceptable.
    pub fn invoke_sync(&self, message: Message) -> Result<Message, BridgeError> {
        let (reply_tx, reply_rx) = std_mpsc::sync_channel(1);
        let envelope = Envelope {
            message,
            reply: Some(reply_tx),
        };
        self.tx
            .send(envelope)
            .map_err(|_| BridgeError::HostClosed)?;
        reply_rx.recv().map_err(|_| BridgeError::NoReply)
    }

    /// Blocking home-directory display mapping. Degrades to the unmapped
    /// path when the host cannot answer.
    pub fn home_dir_map(&self, path: &str) -> String {
        match self.invoke_sync(Message::HomeDirMap {
            path: path.to_string(),
        }) {
            Ok(Message::HomeDirMapped { path }) => path,
            Ok(other) => {
                warn!(window = self.window.as_str(), reply = ?other, "unexpected reply to path lookup");
                path.to_string()
            }
            Err(err) => {
                warn!(window = self.window.as_str(), error = %err, "path lookup failed");
                path.to_string()
            }
        }
    }
}

type Listener = Box<dyn FnMut(&Message)>;

/// Per-window capability surface over the host link.
pub struct Bridge {
    outbound: Outbound,
    listeners: RefCell<HashMap<Channel, Vec<Listener>>>,
}

impl Bridge {
    /// Returns the bridge plus the host-side receiver for its outbound
    /// traffic.
    pub fn new(window: WindowTag) -> (Self, mpsc::UnboundedReceiver<Envelope>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let bridge = Self {
            outbound: Outbound { window, tx },
            listeners: RefCell::new(HashMap::new()),
        };
        (bridge, rx)
    }

    pub fn window(&self) -> WindowTag {
        self.outbound.window
    }

    pub fn outbound(&self) -> Outbound {
        self.outbound.clone()
    }

    pub fn send(&self, message: Message) {
        self.outbound.send(message);
    }

    /// Register a handler for an inbound channel. A channel outside this
    /// window's allow-list is dropped without telling the caller.
    pub fn subscribe<F>(&self, channel: Channel, handler: F)
    where
        F: FnMut(&Message) + 'static,
    {
        if !self.window().allowed_channels().contains(&channel) {
            warn!(
                window = self.window().as_str(),
                channel = channel.wire_name(),
                "subscription outside window allow-list dropped"
            );
            return;
        }
        self.listeners
            .borrow_mut()
            .entry(channel)
            .or_default()
            .push(Box::new(handler));
    }

    /// Route one inbound host message to its listeners. Handlers must not
    /// subscribe from inside dispatch; the listener table stays borrowed
    /// while they run.
    pub fn dispatch(&self, message: &Message) {
        let Some(channel) = message.inbound_channel() else {
            debug!("outbound-only message on the inbound path, dropped");
            return;
        };
        if !self.window().allowed_channels().contains(&channel) {
            warn!(
                window = self.window().as_str(),
                channel = channel.wire_name(),
                "inbound push outside window allow-list dropped"
            );
            return;
        }
        if let Some(handlers) = self.listeners.borrow_mut().get_mut(&channel) {
            for handler in handlers.iter_mut() {
                handler(message);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn subscribe_outside_allowlist_is_dropped() {
        let (bridge, _rx) = Bridge::new(WindowTag::Notes);
        let seen = Rc::new(RefCell::new(0));

        let counter = Rc::clone(&seen);
        bridge.subscribe(Channel::SaveInfo, move |_| {
            *counter.borrow_mut() += 1;
        });

        bridge.dispatch(&Message::SaveInfo {
            savegame: SavegameSnapshot::default(),
        });
        assert_eq!(*seen.borrow(), 0);
    }

    #[test]
    fn dispatch_reaches_every_listener() {
        let (bridge, _rx) = Bridge::new(WindowTag::Savegame);
        let seen = Rc::new(RefCell::new(0));

        for _ in 0..2 {
            let counter = Rc::clone(&seen);
            bridge.subscribe(Channel::L10nRefresh, move |_| {
                *counter.borrow_mut() += 1;
            });
        }

        bridge.dispatch(&Message::L10nRefresh);
        bridge.dispatch(&Message::L10nRefresh);
        assert_eq!(*seen.borrow(), 4);
    }

    #[test]
    fn send_with_host_gone_is_silent() {
        let (bridge, rx) = Bridge::new(WindowTag::Savegame);
        drop(rx);
        bridge.send(Message::SetMoveFolder);
    }

    #[test]
    fn invoke_sync_blocks_for_the_reply() {
        let (bridge, mut rx) = Bridge::new(WindowTag::Confirm);

        let host = std::thread::spawn(move || {
            let envelope = rx.blocking_recv().expect("request");
            let Message::HomeDirMap { path } = envelope.message else {
                panic!("unexpected request");
            };
            let mapped = path.replace("/home/farmer", "~");
            envelope
                .reply
                .expect("reply channel")
                .send(Message::HomeDirMapped { path: mapped })
                .unwrap();
        });

        let mapped = bridge.outbound().home_dir_map("/home/farmer/mods");
        host.join().unwrap();
        assert_eq!(mapped, "~/mods");
    }

    #[test]
    fn failed_lookup_degrades_to_the_input() {
        let (bridge, rx) = Bridge::new(WindowTag::Confirm);
        drop(rx);
        assert_eq!(
            bridge.outbound().home_dir_map("/home/farmer/mods"),
            "/home/farmer/mods"
        );
    }
}
