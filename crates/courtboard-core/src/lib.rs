//! Courtboard Core Library
//!
//! Platform-agnostic state engine for the Courtboard tactical board: entity
//! and raster stores, the unified undoable action log, gesture handling, and
//! key-value persistence. Rendering chrome and real storage backends live
//! outside this crate and talk to it through [`BoardSession`],
//! [`InputController`], and the [`storage::KeyValueStore`] port.

pub mod entities;
pub mod geometry;
pub mod history;
pub mod input;
pub mod paint;
pub mod raster;
pub mod session;
pub mod storage;
pub mod tools;

pub use entities::{Color, EntityId, EntityRef, EntityStore, Marker, MarkerKind, Player, PlayerPatch};
pub use geometry::{BoardSize, clamp_to_board};
pub use history::{Action, ActionLog, Entity};
pub use input::{InputController, PointerEvent, UiRequest};
pub use raster::{Bitmap, RasterError, RasterHistory};
pub use session::BoardSession;
pub use storage::{FileStore, KeyValueStore, MemoryStore, PersistenceGateway, StorageError};
pub use tools::{DrawMode, Tool, ToolState};
