//! Board entities: players, markers, and the ordered store that owns them.

use kurbo::Point;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a board entity.
pub type EntityId = Uuid;

/// RGBA8 color, persisted as a CSS hex string (`#rrggbb` / `#rrggbbaa`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub const fn white() -> Self {
        Self::opaque(255, 255, 255)
    }

    pub const fn black() -> Self {
        Self::opaque(0, 0, 0)
    }

    /// Parse a `#rgb`, `#rrggbb`, or `#rrggbbaa` hex string.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#')?.trim();
        match hex.len() {
            3 => {
                let r = u8::from_str_radix(&hex[0..1], 16).ok()? * 17;
                let g = u8::from_str_radix(&hex[1..2], 16).ok()? * 17;
                let b = u8::from_str_radix(&hex[2..3], 16).ok()? * 17;
                Some(Self::opaque(r, g, b))
            }
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                Some(Self::opaque(r, g, b))
            }
            8 => {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                let a = u8::from_str_radix(&hex[6..8], 16).ok()?;
                Some(Self::new(r, g, b, a))
            }
            _ => None,
        }
    }

    /// Format as a hex string; alpha is emitted only when not fully opaque.
    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::from_hex(&value).ok_or_else(|| format!("invalid color string: {value}"))
    }
}

/// Token fill colors assigned round-robin to new players.
pub const PLAYER_PALETTE: [Color; 7] = [
    Color::opaque(0xff, 0x6b, 0x6b),
    Color::opaque(0xff, 0xa0, 0x6b),
    Color::opaque(0xff, 0xd5, 0x6b),
    Color::opaque(0xc2, 0xe0, 0x76),
    Color::opaque(0x6b, 0xce, 0xff),
    Color::opaque(0x9f, 0x7a, 0xea),
    Color::opaque(0xff, 0x7e, 0xb3),
];

/// Ink colors offered by the pencil tool.
pub const DRAW_PALETTE: [Color; 7] = [
    Color::opaque(0xff, 0x00, 0x00),
    Color::opaque(0xff, 0x99, 0x00),
    Color::opaque(0xff, 0xff, 0x00),
    Color::opaque(0x00, 0xff, 0x00),
    Color::opaque(0x00, 0x00, 0xff),
    Color::opaque(0x99, 0x00, 0xff),
    Color::opaque(0x00, 0x00, 0x00),
];

/// Radius of a player token in board pixels.
pub const PLAYER_RADIUS: f64 = 18.0;

/// Radius of a marker token in board pixels.
pub const MARKER_RADIUS: f64 = 15.0;

/// A labeled, movable player token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: EntityId,
    /// Jersey number; display-only, need not be unique.
    pub number: u32,
    pub color: Color,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub name: Option<String>,
    pub position: Point,
}

impl Player {
    /// Name shown on the token tag; falls back to `"Player {number}"`.
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("Player {}", self.number))
    }
}

/// Fixed type tag for a marker entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerKind {
    Ball,
}

/// A movable marker token (e.g. the ball). Position is its only mutable
/// attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub id: EntityId,
    pub kind: MarkerKind,
    pub position: Point,
}

/// Sparse update for a player's editable attributes.
#[derive(Debug, Clone, Default)]
pub struct PlayerPatch {
    pub number: Option<u32>,
    pub color: Option<Color>,
    pub name: Option<String>,
}

/// Reference to an entity of either kind, as resolved by hit-testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityRef {
    Player(EntityId),
    Marker(EntityId),
}

impl EntityRef {
    pub fn id(&self) -> EntityId {
        match self {
            EntityRef::Player(id) | EntityRef::Marker(id) => *id,
        }
    }

    /// Hit/clamp radius for the referenced entity kind.
    pub fn radius(&self) -> f64 {
        match self {
            EntityRef::Player(_) => PLAYER_RADIUS,
            EntityRef::Marker(_) => MARKER_RADIUS,
        }
    }
}

/// Ordered collections of players and markers.
///
/// Insertion order is z-order: later entries render on top. Both collections
/// are small, so lookups are linear scans by id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityStore {
    players: Vec<Player>,
    markers: Vec<Marker>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn player(&self, id: EntityId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn marker(&self, id: EntityId) -> Option<&Marker> {
        self.markers.iter().find(|m| m.id == id)
    }

    /// Append a player. Used both for fresh adds and for undo re-insertion,
    /// which must preserve the captured id and attributes.
    pub fn add_player(&mut self, player: Player) {
        self.players.push(player);
    }

    /// Append a marker.
    pub fn add_marker(&mut self, marker: Marker) {
        self.markers.push(marker);
    }

    /// Replace an entity's position. Silent no-op when the id is absent;
    /// a stale drag target must never surface an error to the UI.
    pub fn update_position(&mut self, target: EntityRef, position: Point) {
        match target {
            EntityRef::Player(id) => {
                if let Some(p) = self.players.iter_mut().find(|p| p.id == id) {
                    p.position = position;
                }
            }
            EntityRef::Marker(id) => {
                if let Some(m) = self.markers.iter_mut().find(|m| m.id == id) {
                    m.position = position;
                }
            }
        }
    }

    /// Merge editable fields into a player. Patching an empty name clears
    /// it, so the tag falls back to the default label. Returns false when
    /// the id is absent.
    pub fn update_player(&mut self, id: EntityId, patch: PlayerPatch) -> bool {
        let Some(player) = self.players.iter_mut().find(|p| p.id == id) else {
            return false;
        };
        if let Some(number) = patch.number {
            player.number = number;
        }
        if let Some(color) = patch.color {
            player.color = color;
        }
        if let Some(name) = patch.name {
            player.name = if name.is_empty() { None } else { Some(name) };
        }
        true
    }

    /// Remove a player by id, returning it for undo capture.
    pub fn remove_player(&mut self, id: EntityId) -> Option<Player> {
        let idx = self.players.iter().position(|p| p.id == id)?;
        Some(self.players.remove(idx))
    }

    /// Remove a marker by id, returning it for undo capture.
    pub fn remove_marker(&mut self, id: EntityId) -> Option<Marker> {
        let idx = self.markers.iter().position(|m| m.id == id)?;
        Some(self.markers.remove(idx))
    }

    /// Topmost entity whose disc contains `point`, players over markers,
    /// later insertions first.
    pub fn hit_test(&self, point: Point) -> Option<EntityRef> {
        for p in self.players.iter().rev() {
            if p.position.distance(point) <= PLAYER_RADIUS {
                return Some(EntityRef::Player(p.id));
            }
        }
        for m in self.markers.iter().rev() {
            if m.position.distance(point) <= MARKER_RADIUS {
                return Some(EntityRef::Marker(m.id));
            }
        }
        None
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty() && self.markers.is_empty()
    }

    pub fn clear(&mut self) {
        self.players.clear();
        self.markers.clear();
    }

    /// Replace both collections wholesale (session load).
    pub fn load(&mut self, players: Vec<Player>, markers: Vec<Marker>) {
        self.players = players;
        self.markers = markers;
    }
}
