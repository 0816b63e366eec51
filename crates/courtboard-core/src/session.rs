//! The board session: owner of all entity, raster, and history state.
//!
//! Every mutation flows through a session method that pairs the store
//! mutation with its action-log record, so the log only ever references
//! already-applied state and the two history cursors stay in lockstep.

use crate::entities::{
    EntityId, EntityRef, EntityStore, Marker, MarkerKind, PLAYER_PALETTE, Player, PlayerPatch,
};
use crate::geometry::{BoardSize, clamp_to_board};
use crate::history::{Action, ActionLog, Entity};
use crate::paint;
use crate::raster::{Bitmap, RasterHistory};
use crate::storage::{KeyValueStore, PersistenceGateway};
use crate::tools::{DrawMode, ToolState};
use kurbo::Point;
use std::sync::Arc;
use uuid::Uuid;

/// One tactical-board editing session.
///
/// The session exclusively owns its entities and raster history; nothing is
/// shared with the outside. Hosts drive it through an [`crate::InputController`]
/// or call the methods directly.
pub struct BoardSession {
    size: BoardSize,
    entities: EntityStore,
    /// Mutable ink layer, painted stroke-by-stroke. Readers that need a
    /// final value (persistence, export) use the committed snapshot instead.
    live: Bitmap,
    raster: RasterHistory,
    log: ActionLog,
    pub tools: ToolState,
    gateway: PersistenceGateway,
    stroke_anchor: Option<Point>,
}

fn pixel_dims(size: BoardSize) -> (u32, u32) {
    (size.width.round().max(1.0) as u32, size.height.round().max(1.0) as u32)
}

impl BoardSession {
    /// Start a session, restoring whatever the store holds. Absent keys mean
    /// an empty board; a persisted ink image becomes the sole initial
    /// snapshot, adjusted to the board dimensions.
    pub fn new(size: BoardSize, store: Arc<dyn KeyValueStore>) -> Self {
        let gateway = PersistenceGateway::new(store);
        let state = gateway.load();
        let (w, h) = pixel_dims(size);

        let raster = match state.ink {
            Some(ink) => RasterHistory::from_snapshot(ink.resized(w, h)),
            None => RasterHistory::new(w, h),
        };
        let live = raster.current().clone();

        let mut entities = EntityStore::new();
        entities.load(state.players, state.markers);

        Self {
            size,
            entities,
            live,
            raster,
            log: state.log,
            tools: ToolState::new(),
            gateway,
            stroke_anchor: None,
        }
    }

    pub fn size(&self) -> BoardSize {
        self.size
    }

    pub fn entities(&self) -> &EntityStore {
        &self.entities
    }

    pub fn players(&self) -> &[Player] {
        self.entities.players()
    }

    pub fn markers(&self) -> &[Marker] {
        self.entities.markers()
    }

    /// Last committed ink snapshot. Safe for export/persistence; never
    /// reflects a stroke still in progress.
    pub fn ink(&self) -> &Bitmap {
        self.raster.current()
    }

    /// The ink layer as currently visible, including any in-progress stroke.
    pub fn live_ink(&self) -> &Bitmap {
        &self.live
    }

    pub fn log(&self) -> &ActionLog {
        &self.log
    }

    pub fn raster(&self) -> &RasterHistory {
        &self.raster
    }

    pub fn hit_test(&self, point: Point) -> Option<EntityRef> {
        self.entities.hit_test(point)
    }

    // ---- entity mutations ------------------------------------------------

    /// Add a player at the board center with attributes derived from the
    /// current roster size: number = count + 1, color round-robin from the
    /// palette. Returns the fresh id.
    pub fn add_player(&mut self) -> EntityId {
        let count = self.entities.player_count();
        let player = Player {
            id: Uuid::new_v4(),
            number: (count + 1) as u32,
            color: PLAYER_PALETTE[count % PLAYER_PALETTE.len()],
            name: None,
            position: self.size.center(),
        };
        let id = player.id;
        self.entities.add_player(player.clone());
        self.log.record(Action::EntityAdded(Entity::Player(player)));
        self.persist();
        id
    }

    /// Add a marker of the given kind at the board center.
    pub fn add_marker(&mut self, kind: MarkerKind) -> EntityId {
        let marker = Marker {
            id: Uuid::new_v4(),
            kind,
            position: self.size.center(),
        };
        let id = marker.id;
        self.entities.add_marker(marker.clone());
        self.log.record(Action::EntityAdded(Entity::Marker(marker)));
        self.persist();
        id
    }

    /// Remove a player, capturing it in the log for undo re-insertion.
    /// Returns false when the id is absent.
    pub fn remove_player(&mut self, id: EntityId) -> bool {
        let Some(player) = self.entities.remove_player(id) else {
            return false;
        };
        self.log.record(Action::EntityRemoved(Entity::Player(player)));
        self.persist();
        true
    }

    /// Remove a marker, capturing it in the log.
    pub fn remove_marker(&mut self, id: EntityId) -> bool {
        let Some(marker) = self.entities.remove_marker(id) else {
            return false;
        };
        self.log.record(Action::EntityRemoved(Entity::Marker(marker)));
        self.persist();
        true
    }

    /// Merge editable player fields. Edits are not undoable actions, only
    /// adds and removes are; this mirrors dragging.
    pub fn edit_player(&mut self, id: EntityId, patch: PlayerPatch) -> bool {
        let updated = self.entities.update_player(id, patch);
        if updated {
            self.persist();
        }
        updated
    }

    /// Move an entity during a drag, clamped so its disc stays on the board.
    /// Intermediate positions are not persisted; [`Self::end_drag`] is.
    pub fn move_entity(&mut self, target: EntityRef, point: Point) {
        let clamped = clamp_to_board(point, target.radius(), self.size);
        self.entities.update_position(target, clamped);
    }

    /// Finalize a drag gesture by persisting the entity lists.
    pub fn end_drag(&mut self) {
        self.persist();
    }

    // ---- ink strokes -----------------------------------------------------

    /// Begin a stroke at `point`. Holds the stroke lock until
    /// [`Self::end_stroke`]; a second begin before that is ignored.
    pub fn begin_stroke(&mut self, point: Point) {
        if self.stroke_anchor.is_none() {
            self.stroke_anchor = Some(point);
        }
    }

    /// Extend the active stroke to `point`, painting (or erasing) the
    /// segment from the previous anchor. No-op without an active stroke.
    pub fn extend_stroke(&mut self, point: Point) {
        let Some(from) = self.stroke_anchor else { return };
        let width = self.tools.brush_width();
        match self.tools.mode {
            DrawMode::Pencil => {
                paint::stroke_segment(&mut self.live, from, point, width, self.tools.stroke_color);
            }
            DrawMode::Eraser => paint::erase_segment(&mut self.live, from, point, width),
        }
        self.stroke_anchor = Some(point);
    }

    /// End the active stroke: commit the live layer as one snapshot and
    /// record it in the action log. Commits even a zero-length stroke, as a
    /// tap is still a gesture the user expects undo to step over.
    pub fn end_stroke(&mut self) {
        if self.stroke_anchor.take().is_none() {
            return;
        }
        self.raster.commit(self.live.clone());
        self.log.record(Action::RasterCommitted { snapshot: self.raster.cursor() });
        self.persist();
    }

    pub fn stroke_active(&self) -> bool {
        self.stroke_anchor.is_some()
    }

    // ---- history ---------------------------------------------------------

    /// Undo the most recent action, whichever subsystem owns it. Returns
    /// false when the log is empty.
    pub fn undo(&mut self) -> bool {
        let Some(action) = self.log.undo_last().cloned() else {
            return false;
        };
        match action {
            Action::EntityAdded(Entity::Player(p)) => {
                self.entities.remove_player(p.id);
            }
            Action::EntityAdded(Entity::Marker(m)) => {
                self.entities.remove_marker(m.id);
            }
            Action::EntityRemoved(Entity::Player(p)) => self.entities.add_player(p),
            Action::EntityRemoved(Entity::Marker(m)) => self.entities.add_marker(m),
            Action::RasterCommitted { .. } => {
                if let Some(snapshot) = self.raster.undo() {
                    self.live = snapshot.clone();
                }
            }
        }
        self.persist();
        true
    }

    /// Reset the whole session: empty stores, single blank snapshot, empty
    /// log, persisted records deleted.
    pub fn clear(&mut self) {
        let (w, h) = pixel_dims(self.size);
        self.entities.clear();
        self.raster.reset(w, h);
        self.live = Bitmap::blank(w, h);
        self.log.clear();
        self.stroke_anchor = None;
        self.gateway.clear();
    }

    /// Resize the board surface. Ink is clipped or blank-extended, never
    /// rescaled, and no history entry is created. Entities keep their
    /// positions; the next drag clamps them to the new bounds.
    pub fn resize(&mut self, size: BoardSize) {
        self.size = size;
        let (w, h) = pixel_dims(size);
        self.raster.resize(w, h);
        self.live = self.live.resized(w, h);
    }

    fn persist(&self) {
        self.gateway
            .save(self.entities.players(), self.entities.markers(), self.raster.current(), &self.log);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    const SIZE: BoardSize = BoardSize { width: 400.0, height: 300.0 };

    fn session() -> BoardSession {
        BoardSession::new(SIZE, Arc::new(MemoryStore::new()))
    }

    fn draw_stroke(session: &mut BoardSession, from: Point, to: Point) {
        session.begin_stroke(from);
        session.extend_stroke(to);
        session.end_stroke();
    }

    #[test]
    fn test_add_player_defaults() {
        let mut session = session();
        let id = session.add_player();

        let player = session.entities().player(id).unwrap();
        assert_eq!(player.number, 1);
        assert_eq!(player.color, PLAYER_PALETTE[0]);
        assert_eq!(player.position, Point::new(200.0, 150.0));
        assert_eq!(player.display_name(), "Player 1");

        let second = session.add_player();
        let second = session.entities().player(second).unwrap();
        assert_eq!(second.number, 2);
        assert_eq!(second.color, PLAYER_PALETTE[1]);
    }

    #[test]
    fn test_drag_clamps_to_board() {
        let mut session = session();
        let id = session.add_player();
        session.move_entity(EntityRef::Player(id), Point::new(1000.0, 1000.0));
        session.end_drag();

        let player = session.entities().player(id).unwrap();
        assert_eq!(player.position, Point::new(382.0, 282.0)); // radius 18
    }

    #[test]
    fn test_undo_add_then_readd_assigns_fresh_id() {
        let mut session = session();
        let id = session.add_player();
        session.move_entity(EntityRef::Player(id), Point::new(50.0, 50.0));

        assert!(session.undo());
        assert!(session.entities().player(id).is_none());
        assert!(session.entities().is_empty());

        let second = session.add_player();
        assert_ne!(second, id);
        let player = session.entities().player(second).unwrap();
        // Defaults are deterministic from the (again empty) roster.
        assert_eq!(player.number, 1);
        assert_eq!(player.color, PLAYER_PALETTE[0]);
    }

    #[test]
    fn test_undo_remove_reinserts_captured_state() {
        let mut session = session();
        let id = session.add_player();
        session.edit_player(
            id,
            PlayerPatch { name: Some("Bia".to_string()), number: Some(9), ..Default::default() },
        );
        session.move_entity(EntityRef::Player(id), Point::new(100.0, 90.0));

        assert!(session.remove_player(id));
        assert!(session.entities().player(id).is_none());

        assert!(session.undo());
        let player = session.entities().player(id).unwrap();
        // Attributes as captured at delete time.
        assert_eq!(player.number, 9);
        assert_eq!(player.name.as_deref(), Some("Bia"));
        assert_eq!(player.position, Point::new(100.0, 90.0));
    }

    #[test]
    fn test_stroke_commits_one_snapshot() {
        let mut session = session();
        draw_stroke(&mut session, Point::new(10.0, 10.0), Point::new(60.0, 10.0));

        assert_eq!(session.raster().len(), 2);
        assert_eq!(session.raster().cursor(), 1);
        assert!(!session.ink().is_blank());
        assert_eq!(session.log().cursor_index(), 0);
    }

    #[test]
    fn test_mid_stroke_not_committed() {
        let mut session = session();
        session.begin_stroke(Point::new(10.0, 10.0));
        session.extend_stroke(Point::new(40.0, 10.0));

        // Live layer has paint, the committed snapshot does not.
        assert!(!session.live_ink().is_blank());
        assert!(session.ink().is_blank());
        assert_eq!(session.raster().len(), 1);

        session.end_stroke();
        assert!(!session.ink().is_blank());
    }

    #[test]
    fn test_eraser_clears_ink() {
        let mut session = session();
        draw_stroke(&mut session, Point::new(20.0, 20.0), Point::new(40.0, 20.0));

        session.tools.toggle_eraser();
        draw_stroke(&mut session, Point::new(10.0, 20.0), Point::new(50.0, 20.0));
        assert!(session.ink().is_blank());
        assert_eq!(session.raster().len(), 3);
    }

    #[test]
    fn test_unified_undo_across_kinds() {
        // Stroke, then marker, then undo twice.
        let mut session = session();
        draw_stroke(&mut session, Point::new(10.0, 10.0), Point::new(80.0, 80.0));
        session.add_marker(MarkerKind::Ball);

        assert!(session.undo());
        assert!(session.markers().is_empty());
        assert!(!session.ink().is_blank());

        assert!(session.undo());
        assert!(session.ink().is_blank());
        assert_eq!(session.raster().cursor(), 0);
        assert_eq!(session.log().cursor_index(), -1);

        assert!(!session.undo());
    }

    #[test]
    fn test_commit_after_undo_discards_redo_branch() {
        let mut session = session();
        draw_stroke(&mut session, Point::new(10.0, 10.0), Point::new(30.0, 10.0));
        draw_stroke(&mut session, Point::new(10.0, 30.0), Point::new(30.0, 30.0));
        session.undo();

        draw_stroke(&mut session, Point::new(10.0, 50.0), Point::new(30.0, 50.0));
        // First stroke plus replacement; the undone second stroke is gone.
        assert_eq!(session.raster().len(), 3);
        assert_eq!(session.log().entries().len(), 2);
        // The replacement snapshot does not contain the undone stroke.
        assert_eq!(session.ink().pixel(20, 30), Some([0, 0, 0, 0]));
        assert_ne!(session.ink().pixel(20, 50), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_interleaved_add_remove_undo_restores_store() {
        let mut session = session();
        let p1 = session.add_player();
        let p2 = session.add_player();
        session.remove_player(p1);
        session.add_marker(MarkerKind::Ball);

        let expected_after_two = {
            // After undoing marker-add and p1-remove, p1 is back with p2.
            session.undo();
            session.undo();
            session.entities().clone()
        };
        assert!(expected_after_two.player(p1).is_some());
        assert!(expected_after_two.player(p2).is_some());
        assert!(expected_after_two.markers().is_empty());

        session.undo();
        session.undo();
        assert!(session.entities().is_empty());
        assert_eq!(session.log().cursor_index(), -1);
    }

    #[test]
    fn test_persistence_round_trip() {
        let store: Arc<MemoryStore> = Arc::new(MemoryStore::new());
        let (p1, marker);
        {
            let mut session = BoardSession::new(SIZE, store.clone());
            p1 = session.add_player();
            marker = session.add_marker(MarkerKind::Ball);
            session.move_entity(EntityRef::Player(p1), Point::new(120.0, 80.0));
            session.end_drag();
            draw_stroke(&mut session, Point::new(10.0, 10.0), Point::new(60.0, 60.0));
        }

        let restored = BoardSession::new(SIZE, store);
        assert_eq!(restored.players().len(), 1);
        assert_eq!(restored.players()[0].id, p1);
        assert_eq!(restored.players()[0].position, Point::new(120.0, 80.0));
        assert_eq!(restored.markers()[0].id, marker);
        assert!(!restored.ink().is_blank());
        // Ink restores as the sole initial snapshot.
        assert_eq!(restored.raster().len(), 1);
        assert_eq!(restored.log().entries().len(), 3);

        // The restored log still undoes chronologically.
        let mut restored = restored;
        assert!(restored.undo());
        assert!(restored.undo());
        assert!(restored.markers().is_empty());
        assert_eq!(restored.players().len(), 1);
    }

    #[test]
    fn test_clear_then_reload_is_empty() {
        let store: Arc<MemoryStore> = Arc::new(MemoryStore::new());
        {
            let mut session = BoardSession::new(SIZE, store.clone());
            session.add_player();
            draw_stroke(&mut session, Point::new(10.0, 10.0), Point::new(20.0, 20.0));
            session.clear();

            assert!(session.entities().is_empty());
            assert!(session.ink().is_blank());
            assert_eq!(session.raster().len(), 1);
            assert_eq!(session.log().cursor_index(), -1);
        }

        let reloaded = BoardSession::new(SIZE, store);
        assert!(reloaded.entities().is_empty());
        assert!(reloaded.ink().is_blank());
        assert_eq!(reloaded.raster().len(), 1);
        assert_eq!(reloaded.log().cursor_index(), -1);
    }

    #[test]
    fn test_resize_keeps_ink_without_history_entry() {
        let mut session = session();
        draw_stroke(&mut session, Point::new(10.0, 10.0), Point::new(30.0, 10.0));
        let len_before = session.raster().len();

        session.resize(BoardSize::new(500.0, 400.0));
        assert_eq!(session.raster().len(), len_before);
        assert_eq!(session.ink().width(), 500);
        assert_ne!(session.ink().pixel(20, 10), Some([0, 0, 0, 0]));
        assert_eq!(session.log().entries().len(), 1);
    }

    #[test]
    fn test_undo_raster_restores_live_layer() {
        let mut session = session();
        draw_stroke(&mut session, Point::new(10.0, 10.0), Point::new(30.0, 10.0));
        assert!(!session.live_ink().is_blank());

        session.undo();
        assert!(session.live_ink().is_blank());
    }
}
