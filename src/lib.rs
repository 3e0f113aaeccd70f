//! modassist - savegame inspector and host bridge for mod collections
//!
//! This crate is the window-side half of a mod manager for Farming
//! Simulator-style games:
//! - Typed message bridge to the privileged host process that owns the
//!   filesystem, the mod analysis, and persistence
//! - Pull-based localization relay
//! - View controllers that turn host-pushed collection/savegame snapshots
//!   into rendered, filterable list markup

pub const APP_VERSION: &str = "0.1.0";

pub mod bridge;
pub mod config;
pub mod dom;
pub mod l10n;
pub mod views;

pub use config::Config;
