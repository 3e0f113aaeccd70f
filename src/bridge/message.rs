//! Host message contract
//!
//! One enum covers every channel crossing the window/host boundary. The
//! `type` field on the wire selects the variant; the wire names are the
//! channel names the host dispatches on.

use serde::{Deserialize, Serialize};

use super::types::{
    CollectionInfo, ConfirmRecord, FileLink, LogLevel, SavegameSnapshot, WindowTag,
};

/// A message crossing the window/host boundary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Message {
    /// Structured log line forwarded to the host's log sink
    #[serde(rename = "toMain_log")]
    Log {
        level: LogLevel,
        source: String,
        text: String,
    },

    /// Request translations for a deduplicated set of l10n keys
    #[serde(rename = "toMain_getText_send")]
    GetTextSend { keys: Vec<String> },

    /// One resolved translation pair; pairs arrive unordered, one at a time
    #[serde(rename = "fromMain_getText_return")]
    GetTextReturn { key: String, text: String },

    /// Host invalidated its translations; re-collect and re-request
    #[serde(rename = "fromMain_l10n_refresh")]
    L10nRefresh,

    /// Ask the host to close a sub window
    #[serde(rename = "toMain_closeSubWindow")]
    CloseSubWindow { window: WindowTag },

    /// Commit the pending move-folder choice
    #[serde(rename = "toMain_setMoveFolder")]
    SetMoveFolder,

    /// Map an absolute path into the host's home-relative display form.
    /// Synchronous: the caller blocks until [`Message::HomeDirMapped`] comes
    /// back on the reply channel.
    #[serde(rename = "toMain_homeDirRevamp")]
    HomeDirMap { path: String },

    /// Reply to [`Message::HomeDirMap`]
    #[serde(rename = "fromMain_homeDirRevamp")]
    HomeDirMapped { path: String },

    /// Forward resolved file mappings for the pending operation
    #[serde(rename = "toMain_realFileLink")]
    RealFileLink { links: Vec<FileLink> },

    /// Rows for the confirm window's file list
    #[serde(rename = "fromMain_confirmList")]
    ConfirmList { records: Vec<ConfirmRecord> },

    /// Collection metadata (and notes) push; sets the collection context
    #[serde(rename = "fromMain_collectionName")]
    CollectionName { collection: CollectionInfo },

    /// Full savegame analysis push; triggers a render pass
    #[serde(rename = "fromMain_saveInfo")]
    SaveInfo { savegame: SavegameSnapshot },

    /// Select these composite keys (`collection--uuid`) in the main window
    #[serde(rename = "toMain_selectInMain")]
    SelectInMain { keys: Vec<String> },

    /// Persist one note field of a collection
    #[serde(rename = "toMain_setNote")]
    SetNote {
        field: String,
        value: String,
        collection: String,
    },
}

/// Inbound (host → window) channels a window can subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    ConfirmList,
    CollectionName,
    SaveInfo,
    L10nRefresh,
    GetTextReturn,
}

impl Channel {
    pub fn wire_name(&self) -> &'static str {
        match self {
            Channel::ConfirmList => "fromMain_confirmList",
            Channel::CollectionName => "fromMain_collectionName",
            Channel::SaveInfo => "fromMain_saveInfo",
            Channel::L10nRefresh => "fromMain_l10n_refresh",
            Channel::GetTextReturn => "fromMain_getText_return",
        }
    }
}

impl Message {
    /// Channel of an inbound push, or `None` for sends and the rendezvous
    /// reply (which never goes through subscription dispatch).
    pub fn inbound_channel(&self) -> Option<Channel> {
        match self {
            Message::ConfirmList { .. } => Some(Channel::ConfirmList),
            Message::CollectionName { .. } => Some(Channel::CollectionName),
            Message::SaveInfo { .. } => Some(Channel::SaveInfo),
            Message::L10nRefresh => Some(Channel::L10nRefresh),
            Message::GetTextReturn { .. } => Some(Channel::GetTextReturn),
            _ => None,
        }
    }
}

impl WindowTag {
    /// Inbound channels this window is authorized to subscribe to. This
    /// table is the sole authorization mechanism at the window/host
    /// boundary.
    pub fn allowed_channels(&self) -> &'static [Channel] {
        match self {
            WindowTag::Savegame => &[
                Channel::CollectionName,
                Channel::SaveInfo,
                Channel::L10nRefresh,
                Channel::GetTextReturn,
            ],
            WindowTag::Notes => &[
                Channel::CollectionName,
                Channel::L10nRefresh,
                Channel::GetTextReturn,
            ],
            WindowTag::Confirm => &[
                Channel::ConfirmList,
                Channel::L10nRefresh,
                Channel::GetTextReturn,
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_tag_round_trip() {
        let msg = Message::Log {
            level: LogLevel::Info,
            source: "savegame".to_string(),
            text: "render pass done".to_string(),
        };
        let raw = serde_json::to_string(&msg).unwrap();
        assert!(raw.contains(r#""type":"toMain_log""#));
        assert_eq!(serde_json::from_str::<Message>(&raw).unwrap(), msg);
    }

    #[test]
    fn inbound_channel_mapping() {
        assert_eq!(
            Message::L10nRefresh.inbound_channel(),
            Some(Channel::L10nRefresh)
        );
        assert_eq!(
            Message::SaveInfo {
                savegame: SavegameSnapshot::default()
            }
            .inbound_channel(),
            Some(Channel::SaveInfo)
        );
        // Sends and the rendezvous reply never dispatch through subscriptions
        assert_eq!(Message::SetMoveFolder.inbound_channel(), None);
        assert_eq!(
            Message::HomeDirMapped {
                path: "~".to_string()
            }
            .inbound_channel(),
            None
        );
    }

    #[test]
    fn notes_window_cannot_take_save_pushes() {
        assert!(!WindowTag::Notes
            .allowed_channels()
            .contains(&Channel::SaveInfo));
        assert!(WindowTag::Savegame
            .allowed_channels()
            .contains(&Channel::SaveInfo));
        assert!(WindowTag::Confirm
            .allowed_channels()
            .contains(&Channel::ConfirmList));
    }

    #[test]
    fn confirm_window_channels_round_trip() {
        let push = Message::ConfirmList {
            records: vec![ConfirmRecord {
                name: "cropCare".to_string(),
                path: "/home/farmer/mods/cropCare.zip".to_string(),
                is_folder: false,
            }],
        };
        let raw = serde_json::to_string(&push).unwrap();
        assert!(raw.contains(r#""type":"fromMain_confirmList""#));
        assert_eq!(serde_json::from_str::<Message>(&raw).unwrap(), push);

        let send = Message::RealFileLink {
            links: vec![FileLink {
                source: "/home/farmer/mods/cropCare.zip".to_string(),
                target: "/home/farmer/collections/farm_main/cropCare.zip".to_string(),
            }],
        };
        let raw = serde_json::to_string(&send).unwrap();
        assert!(raw.contains(r#""type":"toMain_realFileLink""#));

        let close = Message::CloseSubWindow {
            window: WindowTag::Confirm,
        };
        let raw = serde_json::to_string(&close).unwrap();
        assert!(raw.contains(r#""window":"confirm""#));
    }

    #[test]
    fn save_info_parses_from_wire_name() {
        let raw = r#"{"type":"fromMain_saveInfo","savegame":{"mapMod":"mapAlpine","singleFarm":true}}"#;
        let msg: Message = serde_json::from_str(raw).unwrap();
        match msg {
            Message::SaveInfo { savegame } => {
                assert_eq!(savegame.map_mod.as_deref(), Some("mapAlpine"));
                assert!(savegame.single_farm);
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }
}
