use emath::Rect;

use super::geometry::point_in_bounds;

/// Host-assigned display identifier, stable for the lifetime of a screen set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ScreenId(pub u64);

/// One display region. Immutable once discovered; the whole set is rebuilt by the
/// host on workspace activation.
#[derive(Clone, Copy, Debug)]
pub struct Screen {
    pub id: ScreenId,
    /// Full display bounds.
    pub bounds: Rect,
    /// Bounds excluding OS chrome (taskbars etc). All tiling happens inside this.
    pub work_area: Rect,
}

impl Screen {
    pub fn new(id: ScreenId, bounds: Rect, work_area: Rect) -> Self {
        Self {
            id,
            bounds,
            work_area,
        }
    }
}

/// The known displays, in registration order. First match wins on point lookups,
/// so overlapping virtual screens resolve deterministically.
#[derive(Debug, Default)]
pub struct ScreenMap {
    screens: Vec<Screen>,
}

impl ScreenMap {
    pub(super) fn rebuild(&mut self, screens: Vec<Screen>) {
        for screen in &screens {
            log::debug!(
                "screen {:?} bounds={:?} work_area={:?}",
                screen.id,
                screen.bounds,
                screen.work_area
            );
        }
        self.screens = screens;
    }

    pub fn get(&self, id: ScreenId) -> Option<&Screen> {
        self.screens.iter().find(|s| s.id == id)
    }

    /// The first registered screen whose working area contains the point.
    pub fn screen_at(&self, x: f32, y: f32) -> Option<&Screen> {
        self.screens
            .iter()
            .find(|s| point_in_bounds(x, y, s.work_area))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Screen> {
        self.screens.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.screens.is_empty()
    }
}
