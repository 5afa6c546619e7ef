use super::cascade::ResizeSession;
use super::split::SplitSession;

/// Per-tile interaction state.
///
/// Event flows, mirroring the native notifications:
/// 1. pointer down → move notifications → move ticks → pointer up
/// 2. pointer down → resize notification → resize ticks → pointer up
///
/// A move that turns into a resize (the OS decides based on where the window was
/// grabbed) kills the move poll; pointer up always resets everything.
#[derive(Debug, Default)]
pub(super) struct DragState {
    /// Pointer button is down on this window.
    pub(super) pointer_down: bool,
    /// The OS reported a user resize for the current drag.
    pub(super) sizing: bool,
    /// The engine itself shrank/restored the window (probe mode); the next resize
    /// notification is ours and must not arm the cascade.
    pub(super) code_resize: bool,
    /// Probe shrink currently applied (split mode engaged mid-move).
    pub(super) probe_engaged: bool,
    /// Split-target computation state for the current move drag.
    pub(super) split: Option<SplitSession>,
    /// Cascade state for the current resize drag.
    pub(super) resize: Option<ResizeSession>,
}

impl DragState {
    /// Reset on pointer release. Sessions are taken, not dropped, so the release
    /// handler can still commit or roll back from them.
    pub(super) fn release(&mut self) -> (Option<SplitSession>, Option<ResizeSession>) {
        self.pointer_down = false;
        self.sizing = false;
        self.code_resize = false;
        self.probe_engaged = false;
        (self.split.take(), self.resize.take())
    }
}
