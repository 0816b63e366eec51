//! Pointer/touch gesture handling: the thin adaptation layer between raw
//! input events and session mutations.
//!
//! Gestures are modal. A draw gesture holds the stroke until release; a
//! select-mode drag binds to one entity at gesture start and never
//! reinterprets mid-gesture. Leaving the canvas counts as a release, never
//! as a silent abandon.

use crate::entities::{EntityId, EntityRef};
use crate::session::BoardSession;
use crate::tools::Tool;
use kurbo::Point;
use std::time::{Duration, Instant};

/// Long-press delay before an edit request fires, cancelled by any pointer
/// movement or release.
pub const LONG_PRESS: Duration = Duration::from_millis(500);

/// Double-tap detection window.
const DOUBLE_TAP_TIME: Duration = Duration::from_millis(500);
const DOUBLE_TAP_DISTANCE: f64 = 5.0;

/// Unified pointer event, positions in board-local pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(Point),
    Move(Point),
    Up(Point),
    /// Pointer left the canvas mid-gesture. Finalized exactly like `Up`.
    Leave,
}

/// Request for the host chrome (modals live outside the core).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiRequest {
    EditPlayer(EntityId),
    DeleteMarker(EntityId),
}

fn request_for(target: EntityRef) -> UiRequest {
    match target {
        EntityRef::Player(id) => UiRequest::EditPlayer(id),
        EntityRef::Marker(id) => UiRequest::DeleteMarker(id),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
enum Gesture {
    #[default]
    Idle,
    Drag { target: EntityRef },
    Stroke,
}

#[derive(Debug, Clone, Copy)]
struct Press {
    target: EntityRef,
    started: Instant,
}

#[derive(Debug, Clone, Copy)]
struct Tap {
    target: EntityRef,
    at: Instant,
    position: Point,
}

/// Maps pointer event streams onto session calls and raises edit/delete
/// requests from double-tap and long-press gestures.
#[derive(Debug, Default)]
pub struct InputController {
    gesture: Gesture,
    press: Option<Press>,
    last_tap: Option<Tap>,
}

impl InputController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one pointer event. Returns a chrome request when the event
    /// completed a double-tap.
    pub fn handle(&mut self, session: &mut BoardSession, event: PointerEvent) -> Option<UiRequest> {
        self.handle_at(session, event, Instant::now())
    }

    /// Fire the pending long-press once its delay has elapsed. Hosts call
    /// this from their tick; movement and release cancel the press before it
    /// can fire.
    pub fn poll_long_press(&mut self) -> Option<UiRequest> {
        self.poll_long_press_at(Instant::now())
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.gesture, Gesture::Idle)
    }

    fn handle_at(
        &mut self,
        session: &mut BoardSession,
        event: PointerEvent,
        now: Instant,
    ) -> Option<UiRequest> {
        match event {
            PointerEvent::Down(p) => self.pointer_down(session, p, now),
            PointerEvent::Move(p) => {
                // Any movement cancels the long-press timer.
                self.press = None;
                match self.gesture {
                    Gesture::Stroke => session.extend_stroke(p),
                    Gesture::Drag { target } => session.move_entity(target, p),
                    Gesture::Idle => {}
                }
                None
            }
            PointerEvent::Up(_) | PointerEvent::Leave => {
                self.press = None;
                match std::mem::replace(&mut self.gesture, Gesture::Idle) {
                    Gesture::Stroke => session.end_stroke(),
                    Gesture::Drag { .. } => session.end_drag(),
                    Gesture::Idle => {}
                }
                None
            }
        }
    }

    fn pointer_down(
        &mut self,
        session: &mut BoardSession,
        p: Point,
        now: Instant,
    ) -> Option<UiRequest> {
        if session.tools.tool == Tool::Draw {
            session.begin_stroke(p);
            self.gesture = Gesture::Stroke;
            return None;
        }

        let Some(target) = session.hit_test(p) else {
            self.gesture = Gesture::Idle;
            self.last_tap = None;
            return None;
        };

        if let Some(tap) = self.last_tap.take() {
            let is_double = tap.target == target
                && now.duration_since(tap.at) <= DOUBLE_TAP_TIME
                && tap.position.distance(p) <= DOUBLE_TAP_DISTANCE;
            if is_double {
                self.gesture = Gesture::Idle;
                return Some(request_for(target));
            }
        }

        self.gesture = Gesture::Drag { target };
        self.press = Some(Press { target, started: now });
        self.last_tap = Some(Tap { target, at: now, position: p });
        None
    }

    fn poll_long_press_at(&mut self, now: Instant) -> Option<UiRequest> {
        let press = self.press?;
        if now.duration_since(press.started) < LONG_PRESS {
            return None;
        }
        // The press becomes an edit gesture; the drag it started is over.
        self.press = None;
        self.gesture = Gesture::Idle;
        Some(request_for(press.target))
    }
}
