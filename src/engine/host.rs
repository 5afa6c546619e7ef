use emath::{Pos2, Rect};

use super::screen::ScreenId;

/// Host-assigned handle for a managed top-level window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WindowId(pub u64);

/// Which poll loop the engine wants running for a window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickKind {
    /// Drives [`super::Engine::on_move_tick`] while the window is being moved.
    Move,
    /// Drives [`super::Engine::on_resize_tick`] while the window is being resized.
    Resize,
}

/// How the two rects of a cancel preview combine visually.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CombineMode {
    /// Fill the overlapping region (an invalid overlap with a neighbor).
    Intersect,
    /// Fill the symmetric difference (a screen-edge pin violation).
    Xor,
}

/// Everything the engine needs from its host environment.
///
/// The engine never touches native message pumps: the host translates raw OS
/// notifications into calls on [`super::Engine`] and implements this trait for the
/// queries and effects flowing the other way.
///
/// Threading contract: the engine computes what to write and then dispatches;
/// `apply_bounds` must marshal the write onto the execution context owning that
/// window. All methods take `&self` — the host is responsible for its own interior
/// synchronization. Calls *into* the engine must be serialized by the host (one
/// event or tick at a time), which is what makes split commits and cascade ticks
/// atomic units.
pub trait Host {
    /// The window's live bounds, or `None` if the window is gone.
    fn window_bounds(&self, window: WindowId) -> Option<Rect>;

    /// Write new bounds to a window, on that window's own execution context.
    fn apply_bounds(&self, window: WindowId, bounds: Rect);

    /// Raise a window without changing focus.
    fn raise_window(&self, window: WindowId);

    /// Keep a window above its peers while a drag is in flight.
    fn set_topmost(&self, window: WindowId, topmost: bool);

    /// Current pointer position in global coordinates, if known.
    fn pointer_pos(&self) -> Option<Pos2>;

    /// Snapshot of whether the configured split/cancel modifier key is held.
    fn modifier_held(&self) -> bool;

    /// Start delivering periodic ticks (period [`super::options::TICK_MS`]) for this
    /// window. Idempotent.
    fn start_ticks(&self, window: WindowId, kind: TickKind);

    /// Stop delivering ticks of this kind. Idempotent.
    fn stop_ticks(&self, window: WindowId, kind: TickKind);

    /// Paint the split preview rectangle on a screen's overlay.
    fn show_split_preview(&self, screen: ScreenId, shape: Rect);

    /// Paint a cancel preview from two rects combined per `mode`.
    fn show_cancel_preview(&self, screen: ScreenId, a: Rect, b: Rect, mode: CombineMode);

    /// Clear a screen's overlay.
    fn clear_preview(&self, screen: ScreenId);
}
