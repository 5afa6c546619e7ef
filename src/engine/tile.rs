use emath::{Rect, Vec2};

use super::drag::DragState;
use super::host::WindowId;
use super::screen::ScreenId;

/// Stable handle for a tracked tile. Never reused within one engine lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TileId(u64);

impl TileId {
    pub(crate) fn from_u64(id: u64) -> Self {
        Self(id)
    }

    pub fn to_u64(self) -> u64 {
        self.0
    }
}

/// The engine's managed-geometry wrapper around one host window.
///
/// Exactly one `Tile` exists per tracked window; it is created when the window appears
/// and dropped when it disappears. `bounds` is the engine's mirror of the window's
/// geometry: it is refreshed from the host at well-defined points (resize ticks,
/// pointer release) and written back on every committed mutation.
#[derive(Debug)]
pub struct Tile {
    pub(super) window: WindowId,
    /// Key into the persistence collaborator's layout document.
    pub(super) persistence_key: String,
    pub(super) bounds: Rect,
    /// Window-reported minimum size; never mutated by the engine.
    pub(super) min_size: Vec2,
    /// Participates in the no-gap/no-overlap tiling invariant.
    pub(super) locked: bool,
    /// Saved layout already applied once; further restores are no-ops.
    pub(super) restored: bool,
    pub(super) screen: Option<ScreenId>,
    pub(super) drag: DragState,
}

impl Tile {
    pub(super) fn new(
        window: WindowId,
        persistence_key: String,
        bounds: Rect,
        min_size: Vec2,
    ) -> Self {
        Self {
            window,
            persistence_key,
            bounds,
            min_size,
            locked: false,
            restored: false,
            screen: None,
            drag: DragState::default(),
        }
    }

    pub fn window(&self) -> WindowId {
        self.window
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn min_size(&self) -> Vec2 {
        self.min_size
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn screen(&self) -> Option<ScreenId> {
        self.screen
    }
}
