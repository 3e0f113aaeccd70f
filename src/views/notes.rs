//! Collection notes view controller
//!
//! Shows the stored note fields for the current collection and forwards
//! every edit straight to the host. No validation, no debounce, no
//! rollback; the host's copy is the source of truth.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;

use crate::bridge::types::CollectionInfo;
use crate::bridge::{Bridge, Channel, Message, Outbound};
use crate::dom::{Document, Node};

/// Container showing the collection's display name
pub const TITLE: &str = "notes-title";

/// Bound input fields, one per stored note value
pub const NOTE_FIELDS: [&str; 6] = [
    "note_server",
    "note_password",
    "note_website",
    "note_admin",
    "note_username",
    "note_notes",
];

pub struct NotesView {
    document: Rc<RefCell<Document>>,
    outbound: Outbound,
    collection_id: Option<String>,
}

impl NotesView {
    pub fn new(document: Rc<RefCell<Document>>, outbound: Outbound) -> Self {
        Self {
            document,
            outbound,
            collection_id: None,
        }
    }

    /// Wire the controller to its window's inbound channels.
    pub fn attach(view: Rc<RefCell<Self>>, bridge: &Bridge) {
        let target = Rc::clone(&view);
        bridge.subscribe(Channel::CollectionName, move |message| {
            if let Message::CollectionName { collection } = message {
                target.borrow_mut().populate(collection);
            }
        });
    }

    /// Fill every bound field from the pushed notes map; absent values show
    /// as empty.
    pub fn populate(&mut self, collection: &CollectionInfo) {
        self.collection_id = Some(collection.id.clone());

        let mut doc = self.document.borrow_mut();
        doc.replace_children(
            TITLE,
            vec![Node::new("span")
                .class("collection-name")
                .text(collection.name.clone())],
        );

        let notes = collection.notes.get(&collection.id);
        for field in NOTE_FIELDS {
            let value = notes
                .and_then(|fields| fields.get(field))
                .cloned()
                .unwrap_or_default();
            doc.set_input(field, value);
        }
    }

    /// One user edit: update the field and forward it for persistence.
    pub fn edit(&mut self, field: &str, value: &str) {
        let Some(collection) = self.collection_id.clone() else {
            debug!(field, "edit before any collection push, dropped");
            return;
        };
        self.document
            .borrow_mut()
            .set_input(field, value.to_string());
        self.outbound.send(Message::SetNote {
            field: field.to_string(),
            value: value.to_string(),
            collection,
        });
    }
}
