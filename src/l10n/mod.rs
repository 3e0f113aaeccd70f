//! Pull-based localization relay
//!
//! The window enumerates which markers need translation and asks the host
//! for the lot; the host answers one key/text pair at a time, unordered.
//! Overlapping refreshes are safe: updates are keyed by marker, not by
//! request, so the pair that arrives last wins.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;

use crate::bridge::{Bridge, Channel, Message, Outbound};
use crate::dom::Document;

pub struct LocalizationRelay {
    document: Rc<RefCell<Document>>,
    outbound: Outbound,
}

impl LocalizationRelay {
    pub fn new(document: Rc<RefCell<Document>>, outbound: Outbound) -> Rc<Self> {
        Rc::new(Self { document, outbound })
    }

    /// Collect every marker currently in the document and request the set.
    pub fn request(&self) {
        let keys: Vec<String> = self.document.borrow().l10n_keys().into_iter().collect();
        if keys.is_empty() {
            return;
        }
        debug!(count = keys.len(), "requesting translations");
        self.outbound.send(Message::GetTextSend { keys });
    }

    /// Splice one resolved pair into every node bearing the marker.
    pub fn apply(&self, key: &str, text: &str) {
        self.document.borrow_mut().apply_translation(key, text);
    }

    /// Wire the relay to its window's inbound channels.
    pub fn attach(relay: &Rc<Self>, bridge: &Bridge) {
        let target = Rc::clone(relay);
        bridge.subscribe(Channel::L10nRefresh, move |_| target.request());

        let relay = Rc::clone(relay);
        bridge.subscribe(Channel::GetTextReturn, move |message| {
            if let Message::GetTextReturn { key, text } = message {
                relay.apply(key, text);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::WindowTag;
    use crate::dom::Node;

    fn setup() -> (
        Rc<RefCell<Document>>,
        Bridge,
        tokio::sync::mpsc::UnboundedReceiver<crate::bridge::Envelope>,
        Rc<LocalizationRelay>,
    ) {
        let (bridge, rx) = Bridge::new(WindowTag::Savegame);
        let document = Rc::new(RefCell::new(Document::new()));
        let relay = LocalizationRelay::new(Rc::clone(&document), bridge.outbound());
        LocalizationRelay::attach(&relay, &bridge);
        (document, bridge, rx, relay)
    }

    #[test]
    fn refresh_requests_the_deduplicated_marker_set() {
        let (document, bridge, mut rx, _relay) = setup();
        document.borrow_mut().replace_children(
            "list",
            vec![
                Node::new("span").l10n("badge_unused"),
                Node::new("span").l10n("badge_unused"),
                Node::new("span").l10n("badge_dlc"),
            ],
        );

        bridge.dispatch(&Message::L10nRefresh);

        let envelope = rx.try_recv().expect("one request");
        match envelope.message {
            Message::GetTextSend { keys } => assert_eq!(keys, ["badge_dlc", "badge_unused"]),
            other => panic!("unexpected message: {other:?}"),
        }
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn empty_document_requests_nothing() {
        let (_document, bridge, mut rx, _relay) = setup();
        bridge.dispatch(&Message::L10nRefresh);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn pairs_apply_in_arrival_order_last_write_wins() {
        let (document, bridge, _rx, _relay) = setup();
        document
            .borrow_mut()
            .replace_children("list", vec![Node::new("span").l10n("badge_dlc").text("dlc")]);

        // A stale pair from an earlier refresh, then the fresh one
        bridge.dispatch(&Message::GetTextReturn {
            key: "badge_dlc".to_string(),
            text: "DLC (alt)".to_string(),
        });
        bridge.dispatch(&Message::GetTextReturn {
            key: "badge_dlc".to_string(),
            text: "DLC".to_string(),
        });

        assert!(document.borrow().to_html().contains(">DLC<"));
    }
}
