//! Persistence gateway: serializes session state into the key-value port.
//!
//! Four logical records are written under stable string keys: the player
//! list, the marker list, the current ink snapshot as a base64 PNG, and the
//! action log with its cursor. The in-memory session stays authoritative;
//! a failed write is logged and the board keeps working without persistence.

use super::KeyValueStore;
use crate::entities::{Marker, Player};
use crate::history::{Action, ActionLog};
use crate::raster::Bitmap;
use log::warn;
use std::sync::Arc;

const KEY_PLAYERS: &str = "courtboard.players";
const KEY_MARKERS: &str = "courtboard.markers";
const KEY_INK: &str = "courtboard.ink";
const KEY_ACTION_LOG: &str = "courtboard.actionLog";
const KEY_ACTION_LOG_CURSOR: &str = "courtboard.actionLogCursor";

/// Session state restored from the store. Any slice whose key is absent (or
/// unreadable) comes back as its empty default.
#[derive(Debug, Default)]
pub struct PersistedState {
    pub players: Vec<Player>,
    pub markers: Vec<Marker>,
    pub ink: Option<Bitmap>,
    pub log: ActionLog,
}

/// Writes and restores session state through an injected [`KeyValueStore`].
pub struct PersistenceGateway {
    store: Arc<dyn KeyValueStore>,
}

impl PersistenceGateway {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Persist all four records. Each failure is logged and skipped; the
    /// remaining records are still written.
    pub fn save(&self, players: &[Player], markers: &[Marker], ink: &Bitmap, log: &ActionLog) {
        self.save_json(KEY_PLAYERS, players);
        self.save_json(KEY_MARKERS, markers);
        self.save_json(KEY_ACTION_LOG, log.entries());

        if let Err(e) = self
            .store
            .set(KEY_ACTION_LOG_CURSOR, &log.cursor_index().to_string())
        {
            warn!("failed to persist {KEY_ACTION_LOG_CURSOR}: {e}");
        }

        match ink.to_base64_png() {
            Ok(encoded) => {
                if let Err(e) = self.store.set(KEY_INK, &encoded) {
                    warn!("failed to persist {KEY_INK}: {e}");
                }
            }
            Err(e) => warn!("failed to encode ink layer: {e}"),
        }
    }

    fn save_json<T: serde::Serialize + ?Sized>(&self, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(json) => {
                if let Err(e) = self.store.set(key, &json) {
                    warn!("failed to persist {key}: {e}");
                }
            }
            Err(e) => warn!("failed to serialize {key}: {e}"),
        }
    }

    /// Restore whatever the store holds. Decode failures degrade to empty
    /// slices; the session always comes up usable.
    pub fn load(&self) -> PersistedState {
        let players: Vec<Player> = self.load_json(KEY_PLAYERS).unwrap_or_default();
        let markers: Vec<Marker> = self.load_json(KEY_MARKERS).unwrap_or_default();
        let entries: Vec<Action> = self.load_json(KEY_ACTION_LOG).unwrap_or_default();

        let cursor_index = match self.read_key(KEY_ACTION_LOG_CURSOR) {
            Some(raw) => raw.trim().parse::<i64>().unwrap_or_else(|e| {
                warn!("unreadable {KEY_ACTION_LOG_CURSOR}: {e}");
                entries.len() as i64 - 1
            }),
            None => entries.len() as i64 - 1,
        };

        let ink = self.read_key(KEY_INK).and_then(|encoded| {
            Bitmap::from_base64_png(&encoded)
                .map_err(|e| warn!("failed to decode persisted ink layer: {e}"))
                .ok()
        });

        PersistedState {
            players,
            markers,
            ink,
            log: ActionLog::from_parts(entries, cursor_index),
        }
    }

    fn read_key(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!("failed to read {key}: {e}");
                None
            }
        }
    }

    fn load_json<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.read_key(key)?;
        serde_json::from_str(&raw)
            .map_err(|e| warn!("unreadable {key}, starting that slice empty: {e}"))
            .ok()
    }

    /// Delete every persisted record.
    pub fn clear(&self) {
        for key in [
            KEY_PLAYERS,
            KEY_MARKERS,
            KEY_INK,
            KEY_ACTION_LOG,
            KEY_ACTION_LOG_CURSOR,
        ] {
            if let Err(e) = self.store.remove(key) {
                warn!("failed to remove {key}: {e}");
            }
        }
    }
}
