//! Unified action log: one chronological, truncatable record of undoable
//! operations across the entity and raster subsystems.
//!
//! Users interleave placing tokens and drawing strokes; undo must reverse
//! "whatever I did last" regardless of kind, so both subsystems share a
//! single log with tagged entries instead of per-subsystem undo stacks.

use crate::entities::{EntityId, Marker, Player};
use serde::{Deserialize, Serialize};

/// An entity captured inside a log entry, with enough payload to invert the
/// recorded operation exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "entity", rename_all = "camelCase")]
pub enum Entity {
    Player(Player),
    Marker(Marker),
}

impl Entity {
    pub fn id(&self) -> EntityId {
        match self {
            Entity::Player(p) => p.id,
            Entity::Marker(m) => m.id,
        }
    }
}

/// One undoable action. `EntityRemoved` carries the entity as captured at
/// delete time; the live store no longer has it to consult.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum Action {
    EntityAdded(Entity),
    EntityRemoved(Entity),
    RasterCommitted { snapshot: usize },
}

/// Ordered action sequence with a single cursor.
///
/// `cursor` counts applied entries, so the most recent applied entry sits at
/// `cursor - 1`. The persisted form is the zero-based index of that entry
/// (-1 when nothing is applied), matching [`ActionLog::cursor_index`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionLog {
    entries: Vec<Action>,
    cursor: usize,
}

impl ActionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a log from its persisted parts, clamping a cursor index that
    /// does not fit the entry list.
    pub fn from_parts(entries: Vec<Action>, cursor_index: i64) -> Self {
        let cursor = (cursor_index + 1).clamp(0, entries.len() as i64) as usize;
        Self { entries, cursor }
    }

    pub fn entries(&self) -> &[Action] {
        &self.entries
    }

    /// Zero-based index of the most recent applied entry, -1 when empty.
    pub fn cursor_index(&self) -> i64 {
        self.cursor as i64 - 1
    }

    pub fn is_empty(&self) -> bool {
        self.cursor == 0
    }

    /// Append an action, discarding any entries past the cursor left by
    /// earlier undos. Callers record only after the underlying store
    /// mutation succeeded, so the log never references unapplied state.
    pub fn record(&mut self, action: Action) {
        self.entries.truncate(self.cursor);
        self.entries.push(action);
        self.cursor = self.entries.len();
    }

    /// Step the cursor back one entry and return it for kind-specific
    /// inversion. None when nothing is applied.
    pub fn undo_last(&mut self) -> Option<&Action> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        Some(&self.entries[self.cursor])
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raster(snapshot: usize) -> Action {
        Action::RasterCommitted { snapshot }
    }

    #[test]
    fn test_empty_log() {
        let mut log = ActionLog::new();
        assert!(log.is_empty());
        assert_eq!(log.cursor_index(), -1);
        assert!(log.undo_last().is_none());
    }

    #[test]
    fn test_record_and_undo() {
        let mut log = ActionLog::new();
        log.record(raster(1));
        log.record(raster(2));
        assert_eq!(log.cursor_index(), 1);

        assert_eq!(log.undo_last(), Some(&raster(2)));
        assert_eq!(log.undo_last(), Some(&raster(1)));
        assert_eq!(log.cursor_index(), -1);
        assert!(log.undo_last().is_none());
    }

    #[test]
    fn test_record_after_undo_truncates() {
        let mut log = ActionLog::new();
        log.record(raster(1));
        log.record(raster(2));
        log.undo_last();

        log.record(raster(3));
        assert_eq!(log.entries(), &[raster(1), raster(3)]);
        assert_eq!(log.cursor_index(), 1);
    }

    #[test]
    fn test_from_parts_clamps_cursor() {
        let log = ActionLog::from_parts(vec![raster(1)], 99);
        assert_eq!(log.cursor_index(), 0);
        let log = ActionLog::from_parts(vec![raster(1)], -7);
        assert_eq!(log.cursor_index(), -1);
    }

    #[test]
    fn test_action_serde_tagging() {
        let json = serde_json::to_string(&raster(3)).unwrap();
        assert_eq!(json, r#"{"type":"rasterCommitted","data":{"snapshot":3}}"#);
        let back: Action = serde_json::from_str(&json).unwrap();
        assert_eq!(back, raster(3));
    }
}
