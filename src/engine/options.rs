use emath::Vec2;

/// Poll period for both move and resize ticks, in milliseconds.
pub const TICK_MS: u64 = 50;

/// Dwell time over an unchanged split target before the level advances, in
/// milliseconds. Should be divisible by [`TICK_MS`]: level advance is counted in
/// ticks, not wall-clock time.
pub const DWELL_MS: u64 = 1400;

/// Options for [`super::Engine`].
#[derive(Clone, Debug)]
pub struct EngineOptions {
    /// Sense of the split modifier key.
    ///
    /// - `true` (default): split mode is on by default and *holding* the modifier
    ///   disables it (useful when most drags are meant to tile).
    /// - `false`: holding the modifier enables split mode.
    pub modifier_disables: bool,

    /// Raise every other locked tile on the same screen when a locked tile's drag is
    /// released, so the whole tiled group surfaces together.
    pub bring_to_front: bool,

    /// Size the dragged window is shrunk to while split mode is engaged, so it stops
    /// covering potential targets under the pointer.
    pub probe_size: Vec2,

    /// Offset of the probe window's top-left from the pointer while shrunk.
    pub probe_grab_offset: Vec2,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            modifier_disables: true,
            bring_to_front: true,
            probe_size: Vec2::new(400.0, 400.0),
            probe_grab_offset: Vec2::new(5.0, 5.0),
        }
    }
}

impl EngineOptions {
    /// Whether split mode is engaged for the given live modifier state.
    pub(crate) fn split_engaged(&self, modifier_held: bool) -> bool {
        modifier_held != self.modifier_disables
    }
}

/// Number of unchanged-target ticks between level advances.
pub(crate) fn ticks_per_level() -> u64 {
    DWELL_MS / TICK_MS
}
