//! Savegame inspector view controller
//!
//! Consumes the collection-context and savegame-analysis pushes, derives one
//! status record per mod name, and renders the list, badges, counters, and
//! error entries. All derivation is per-pass: the same collection + savegame
//! input always produces the same records, counts, and selection lists.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use tracing::debug;
use uuid::Uuid;

use crate::bridge::types::{CollectionInfo, CollectionMod, LogLevel, SavegameMod, SavegameSnapshot};
use crate::bridge::{Bridge, Channel, Message, Outbound};
use crate::dom::{Document, Node};
use crate::l10n::LocalizationRelay;

/// Container replaced with one entry per derived record
pub const MOD_LIST: &str = "save-mod-list";
/// Container for the savegame's informational error entries
pub const ERROR_LIST: &str = "save-error-list";
/// Container for badge and selection counters
pub const COUNTERS: &str = "save-counters";

/// DLC mods are recognized by name alone; they never live in the collection.
pub const DLC_PREFIX: &str = "pdlc_";

/// A name with this suffix ends the record pass where it stands: entries
/// sorted after it are dropped, not skipped.
const CSV_SUFFIX: &str = ".csv";

/// Display badges an entry can carry. The filter bar shows one checkbox per
/// badge; checked filters combine with AND semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Badge {
    NoHub,
    Dlc,
    Missing,
    Unused,
    Inactive,
    ScriptOnly,
    Mismatch,
}

impl Badge {
    pub const ALL: [Badge; 7] = [
        Badge::NoHub,
        Badge::Dlc,
        Badge::Missing,
        Badge::Unused,
        Badge::Inactive,
        Badge::ScriptOnly,
        Badge::Mismatch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Badge::NoHub => "nohub",
            Badge::Dlc => "dlc",
            Badge::Missing => "missing",
            Badge::Unused => "unused",
            Badge::Inactive => "inactive",
            Badge::ScriptOnly => "scriptonly",
            Badge::Mismatch => "mismatch",
        }
    }

    pub fn l10n_key(&self) -> &'static str {
        match self {
            Badge::NoHub => "savegame_badge_nohub",
            Badge::Dlc => "savegame_badge_dlc",
            Badge::Missing => "savegame_badge_missing",
            Badge::Unused => "savegame_badge_unused",
            Badge::Inactive => "savegame_badge_inactive",
            Badge::ScriptOnly => "savegame_badge_scriptonly",
            Badge::Mismatch => "savegame_badge_mismatch",
        }
    }

    pub fn parse(name: &str) -> Option<Badge> {
        Badge::ALL
            .into_iter()
            .find(|badge| badge.as_str() == name.to_ascii_lowercase())
    }
}

/// Status record derived per mod name, fresh on every render pass
#[derive(Debug, Clone, PartialEq)]
pub struct ModRecord {
    pub name: String,
    pub title: String,
    pub version: String,
    /// Collection identity; only collection mods are selectable
    pub uuid: Option<Uuid>,
    pub is_dlc: bool,
    pub is_present: bool,
    pub is_loaded: bool,
    pub is_used: bool,
    pub script_only: bool,
    pub version_mismatch: bool,
    pub is_mod_hub: bool,
    /// Farms the usage is attributed to; cleared for the map mod, which is
    /// not attributable to any one farm
    pub used_by: Option<BTreeSet<u8>>,
}

impl ModRecord {
    /// Merge the collection entry and the savegame entry for one name.
    pub fn derive(
        name: &str,
        installed: Option<&CollectionMod>,
        saved: Option<&SavegameMod>,
        map_mod: Option<&str>,
    ) -> Self {
        let is_map = map_mod == Some(name);
        let is_dlc = name.starts_with(DLC_PREFIX);
        let is_present = installed.is_some();
        let script_only = installed
            .map(|entry| entry.store_items == 0 && entry.script_files > 0)
            .unwrap_or(false);

        let mut is_loaded = saved.map(|entry| entry.loaded).unwrap_or(false);
        let mut is_used = saved.map(|entry| entry.used).unwrap_or(false);
        // Script mods never appear in a farm's usage, so a loaded one counts
        // as used.
        if script_only && is_loaded {
            is_used = true;
        }
        let mut used_by = saved
            .map(|entry| entry.farms.clone())
            .filter(|farms| !farms.is_empty());
        if is_map {
            is_loaded = true;
            is_used = true;
            used_by = None;
        }

        let saved_version = saved.and_then(|entry| entry.version.as_deref());
        let version_mismatch = match (installed, saved_version) {
            (Some(entry), Some(in_save)) => entry.version != in_save,
            _ => false,
        };

        let title = installed
            .map(|entry| entry.title.clone())
            .or_else(|| saved.and_then(|entry| entry.title.clone()))
            .unwrap_or_else(|| name.to_string());
        let version = installed
            .map(|entry| entry.version.clone())
            .or_else(|| saved_version.map(str::to_string))
            .unwrap_or_default();

        Self {
            name: name.to_string(),
            title,
            version,
            uuid: installed.map(|entry| entry.uuid),
            is_dlc,
            is_present,
            is_loaded,
            is_used,
            script_only,
            version_mismatch,
            is_mod_hub: installed.and_then(|entry| entry.mod_hub_id).is_some(),
            used_by,
        }
    }

    /// Entry color, first matching rule wins.
    pub fn color_class(&self) -> &'static str {
        if !self.is_present && !self.is_dlc {
            "entry-missing"
        } else if self.version_mismatch {
            "entry-mismatch"
        } else if self.is_used {
            "entry-used"
        } else if self.is_loaded {
            "entry-loaded"
        } else {
            "entry-default"
        }
    }

    /// Badges carried by this record. Hub absence is unknowable for DLC and
    /// missing mods, so neither gets the nohub badge.
    pub fn badges(&self) -> Vec<Badge> {
        let mut badges = Vec::new();
        if self.is_present && !self.is_dlc && !self.is_mod_hub {
            badges.push(Badge::NoHub);
        }
        if self.is_dlc {
            badges.push(Badge::Dlc);
        }
        if !self.is_present && !self.is_dlc {
            badges.push(Badge::Missing);
        }
        if !self.is_used {
            badges.push(Badge::Unused);
        }
        if !self.is_loaded {
            badges.push(Badge::Inactive);
        }
        if self.script_only {
            badges.push(Badge::ScriptOnly);
        }
        if self.version_mismatch {
            badges.push(Badge::Mismatch);
        }
        badges
    }
}

/// Which selection list a select action sends to the main window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionCategory {
    Unused,
    Inactive,
    NoHub,
    Active,
}

/// Composite keys (`collection--uuid`) per unsatisfied condition, rebuilt
/// every render pass
#[derive(Debug, Default)]
pub struct SelectionLists {
    pub unused: Vec<String>,
    pub inactive: Vec<String>,
    pub no_hub: Vec<String>,
    pub active: Vec<String>,
}

impl SelectionLists {
    fn clear(&mut self) {
        self.unused.clear();
        self.inactive.clear();
        self.no_hub.clear();
        self.active.clear();
    }

    pub fn get(&self, category: SelectionCategory) -> &[String] {
        match category {
            SelectionCategory::Unused => &self.unused,
            SelectionCategory::Inactive => &self.inactive,
            SelectionCategory::NoHub => &self.no_hub,
            SelectionCategory::Active => &self.active,
        }
    }
}

pub struct SavegameView {
    document: Rc<RefCell<Document>>,
    outbound: Outbound,
    relay: Rc<LocalizationRelay>,
    collection: Option<CollectionInfo>,
    selection: SelectionLists,
    badge_counts: BTreeMap<Badge, usize>,
    /// Entry node id plus its badges, kept for client-side filtering
    entry_badges: Vec<(String, Vec<Badge>)>,
    active_filters: BTreeSet<Badge>,
}

impl SavegameView {
    pub fn new(
        document: Rc<RefCell<Document>>,
        outbound: Outbound,
        relay: Rc<LocalizationRelay>,
    ) -> Self {
        Self {
            document,
            outbound,
            relay,
            collection: None,
            selection: SelectionLists::default(),
            badge_counts: BTreeMap::new(),
            entry_badges: Vec::new(),
            active_filters: BTreeSet::new(),
        }
    }

    /// Wire the controller to its window's inbound channels.
    pub fn attach(view: Rc<RefCell<Self>>, bridge: &Bridge) {
        let target = Rc::clone(&view);
        bridge.subscribe(Channel::CollectionName, move |message| {
            if let Message::CollectionName { collection } = message {
                target.borrow_mut().set_collection(collection.clone());
            }
        });

        let target = Rc::clone(&view);
        bridge.subscribe(Channel::SaveInfo, move |message| {
            if let Message::SaveInfo { savegame } = message {
                target.borrow_mut().render(savegame);
            }
        });
    }

    /// Set the collection context for subsequent savegame pushes.
    pub fn set_collection(&mut self, collection: CollectionInfo) {
        self.collection = Some(collection);
    }

    pub fn selection(&self) -> &SelectionLists {
        &self.selection
    }

    pub fn badge_count(&self, badge: Badge) -> usize {
        self.badge_counts.get(&badge).copied().unwrap_or(0)
    }

    /// Full render pass for one savegame snapshot.
    pub fn render(&mut self, savegame: &SavegameSnapshot) {
        // Every pass starts from zero; nothing accumulates across pushes.
        self.selection.clear();
        self.badge_counts.clear();
        self.entry_badges.clear();

        let empty = BTreeMap::new();
        let (collection_id, installed) = match &self.collection {
            Some(collection) => (collection.id.as_str(), &collection.mods),
            None => ("", &empty),
        };

        let mut names: BTreeSet<&str> = installed.keys().map(String::as_str).collect();
        names.extend(savegame.mods.keys().map(String::as_str));

        let mut records = Vec::with_capacity(names.len());
        for name in names {
            if name.ends_with(CSV_SUFFIX) {
                // Ends the pass where it stands; names sorted after the
                // sentinel are dropped.
                debug!(name, "csv entry ends the record pass");
                break;
            }
            records.push(ModRecord::derive(
                name,
                installed.get(name),
                savegame.mods.get(name),
                savegame.map_mod.as_deref(),
            ));
        }

        let mut entries = Vec::with_capacity(records.len());
        for record in &records {
            if let Some(uuid) = record.uuid {
                let key = format!("{collection_id}--{uuid}");
                if !record.is_used {
                    self.selection.unused.push(key.clone());
                }
                if !record.is_loaded {
                    self.selection.inactive.push(key.clone());
                }
                if !record.is_mod_hub {
                    self.selection.no_hub.push(key.clone());
                }
                if record.is_loaded {
                    self.selection.active.push(key);
                }
            }

            let badges = record.badges();
            for badge in &badges {
                *self.badge_counts.entry(*badge).or_default() += 1;
            }
            let node = entry_node(record, &badges, savegame.single_farm);
            self.entry_badges
                .push((node.id.clone().unwrap_or_default(), badges));
            entries.push(node);
        }

        {
            let mut doc = self.document.borrow_mut();
            doc.replace_children(MOD_LIST, entries);
            doc.replace_children(
                ERROR_LIST,
                savegame
                    .errors
                    .iter()
                    .map(|error| Node::new("li").class("save-error").text(error.clone()))
                    .collect(),
            );
            doc.replace_children(COUNTERS, self.counter_nodes());
        }

        self.apply_filters();
        self.relay.request();
        self.outbound.log(
            LogLevel::Debug,
            format!("rendered {} mod entries", self.entry_badges.len()),
        );
    }

    fn counter_nodes(&self) -> Vec<Node> {
        let mut nodes: Vec<Node> = Badge::ALL
            .iter()
            .map(|badge| {
                Node::new("span")
                    .id(format!("count-{}", badge.as_str()))
                    .class("badge-count")
                    .text(self.badge_count(*badge).to_string())
            })
            .collect();
        for (category, list) in [
            ("unused", &self.selection.unused),
            ("inactive", &self.selection.inactive),
            ("nohub", &self.selection.no_hub),
            ("active", &self.selection.active),
        ] {
            nodes.push(
                Node::new("span")
                    .id(format!("count-select-{category}"))
                    .class("select-count")
                    .text(list.len().to_string()),
            );
        }
        nodes
    }

    /// Check or uncheck one badge filter and re-evaluate visibility.
    pub fn set_filter(&mut self, badge: Badge, checked: bool) {
        if checked {
            self.active_filters.insert(badge);
        } else {
            self.active_filters.remove(&badge);
        }
        self.apply_filters();
    }

    /// An entry is shown only if it carries every checked badge; with no
    /// filters checked everything shows.
    fn apply_filters(&mut self) {
        let mut doc = self.document.borrow_mut();
        for (id, badges) in &self.entry_badges {
            let show = self
                .active_filters
                .iter()
                .all(|filter| badges.contains(filter));
            doc.set_hidden(id, !show);
        }
    }

    /// Ask the main window to select one category's composite keys.
    pub fn send_selection(&self, category: SelectionCategory) {
        self.outbound.send(Message::SelectInMain {
            keys: self.selection.get(category).to_vec(),
        });
    }
}

fn entry_node(record: &ModRecord, badges: &[Badge], single_farm: bool) -> Node {
    let mut node = Node::new("li")
        .id(format!("mod-{}", record.name))
        .class("mod-entry")
        .class(record.color_class())
        .child(
            Node::new("span")
                .class("mod-title")
                .text(record.title.clone()),
        );
    if !record.version.is_empty() {
        node = node.child(
            Node::new("span")
                .class("mod-version")
                .text(record.version.clone()),
        );
    }
    for badge in badges {
        node = node.child(
            Node::new("span")
                .class("badge")
                .class(badge.as_str())
                .l10n(badge.l10n_key())
                .text(badge.as_str()),
        );
    }
    if !single_farm {
        if let Some(farms) = &record.used_by {
            let list = farms
                .iter()
                .map(u8::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            node = node.child(Node::new("span").class("mod-farms").text(list));
        }
    }
    node
}
