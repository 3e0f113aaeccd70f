//! Payload types carried by the host message contract

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

/// Severity of a forwarded log line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

/// Identity of a sub window. Fixes which inbound channels it may subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowTag {
    Savegame,
    Notes,
    Confirm,
}

impl WindowTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            WindowTag::Savegame => "savegame",
            WindowTag::Notes => "notes",
            WindowTag::Confirm => "confirm",
        }
    }
}

/// One installed mod inside a collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionMod {
    pub uuid: Uuid,
    pub title: String,
    pub version: String,
    /// Mod hub catalog id; absent when the mod is not a known hub mod
    #[serde(rename = "modHubId", default)]
    pub mod_hub_id: Option<u64>,
    /// Count of purchasable store items the mod ships
    #[serde(rename = "storeItems", default)]
    pub store_items: u32,
    /// Count of script files the mod ships
    #[serde(rename = "scriptFiles", default)]
    pub script_files: u32,
}

/// Collection metadata push payload.
///
/// The notes map is keyed by collection id, then by note field id; windows
/// that do not show notes receive it empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub mods: BTreeMap<String, CollectionMod>,
    #[serde(default)]
    pub notes: BTreeMap<String, BTreeMap<String, String>>,
}

/// Per-mod slice of a savegame analysis
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SavegameMod {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    /// Listed in the save's mod list
    #[serde(default)]
    pub loaded: bool,
    /// Referenced by at least one farm
    #[serde(default)]
    pub used: bool,
    /// Farms the mod usage is attributed to
    #[serde(default)]
    pub farms: BTreeSet<u8>,
}

/// Host-computed savegame analysis snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SavegameSnapshot {
    /// Mod providing the save's map; always counted used and loaded
    #[serde(rename = "mapMod", default)]
    pub map_mod: Option<String>,
    #[serde(rename = "singleFarm", default)]
    pub single_farm: bool,
    /// Problems the host found while reading the save; informational only
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub mods: BTreeMap<String, SavegameMod>,
}

/// Resolved source/target pair for a pending file operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileLink {
    pub source: String,
    pub target: String,
}

/// One row of the confirm window's file list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfirmRecord {
    pub name: String,
    pub path: String,
    #[serde(rename = "isFolder", default)]
    pub is_folder: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_fields_default_when_absent() {
        let save: SavegameSnapshot = serde_json::from_str(r#"{"mods":{"seedRunner":{}}}"#).unwrap();
        assert_eq!(save.map_mod, None);
        assert!(!save.single_farm);
        assert!(save.errors.is_empty());

        let entry = &save.mods["seedRunner"];
        assert!(!entry.loaded);
        assert!(!entry.used);
        assert!(entry.farms.is_empty());
    }

    #[test]
    fn collection_mod_wire_names() {
        let raw = r#"{
            "uuid": "7f2e1d3c-9f70-4a4e-8a9e-2b1c0d4e5f60",
            "title": "Seed Runner",
            "version": "1.0.0.2",
            "modHubId": 271823,
            "storeItems": 3,
            "scriptFiles": 0
        }"#;
        let entry: CollectionMod = serde_json::from_str(raw).unwrap();
        assert_eq!(entry.mod_hub_id, Some(271823));
        assert_eq!(entry.store_items, 3);
    }
}
