use std::cmp::Ordering;

use emath::Rect;

/// Tolerance for edge comparisons, in logical units.
///
/// This needs to be at least the distance at which the OS cursor switches from the
/// straight resize arrows to the diagonal ones near a window corner, so that a drag
/// that grabs "almost the edge" still counts as the edge.
pub const EPSILON: f32 = 5.0;

/// Tolerance-based total order on coordinates.
///
/// `f32::MAX` and `f32::MIN` act as representable +∞/−∞: each compares equal only to
/// itself and greater/less than everything else. Downstream code uses them to mean
/// "no constraint on this side" without a special case. All other values within
/// [`EPSILON`] of each other compare equal.
pub fn approx_cmp(a: f32, b: f32) -> Ordering {
    if a == f32::MAX {
        return if b == f32::MAX {
            Ordering::Equal
        } else {
            Ordering::Greater
        };
    }
    if b == f32::MAX {
        return Ordering::Less;
    }
    if a == f32::MIN {
        return if b == f32::MIN {
            Ordering::Equal
        } else {
            Ordering::Less
        };
    }
    if b == f32::MIN {
        return Ordering::Greater;
    }
    if a > b + EPSILON {
        Ordering::Greater
    } else if a < b - EPSILON {
        Ordering::Less
    } else {
        Ordering::Equal
    }
}

pub fn approx_eq(a: f32, b: f32) -> bool {
    approx_cmp(a, b) == Ordering::Equal
}

/// An edge relation between two rectangles.
///
/// The plain variants are *touching* relations: `Top` means the first rect's top edge
/// coincides with the second rect's bottom edge (the second rect sits above). The
/// `*Aligned` variants are *coincident* relations: both rects share the same coordinate
/// on that edge, regardless of whether they touch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SharedBorder {
    Top,
    Bottom,
    Left,
    Right,
    LeftAligned,
    RightAligned,
    TopAligned,
    BottomAligned,
}

impl SharedBorder {
    /// The aligned variants, in the order used to pick the shrink edge on split commit.
    pub(crate) const ALIGNED: [Self; 4] = [
        Self::LeftAligned,
        Self::RightAligned,
        Self::TopAligned,
        Self::BottomAligned,
    ];
}

/// The touching-edge relation from `r1` to `r2`, if any.
///
/// Symmetric under swapping: `find_shared_border(a, b) == Some(Top)` iff
/// `find_shared_border(b, a) == Some(Bottom)`, and likewise for `Left`/`Right`.
pub fn find_shared_border(r1: Rect, r2: Rect) -> Option<SharedBorder> {
    if approx_eq(r1.top(), r2.bottom()) {
        Some(SharedBorder::Top)
    } else if approx_eq(r1.bottom(), r2.top()) {
        Some(SharedBorder::Bottom)
    } else if approx_eq(r1.left(), r2.right()) {
        Some(SharedBorder::Left)
    } else if approx_eq(r1.right(), r2.left()) {
        Some(SharedBorder::Right)
    } else {
        None
    }
}

/// All coincident-edge relations between `r1` and `r2`.
pub fn find_same_borders(r1: Rect, r2: Rect) -> Vec<SharedBorder> {
    let mut same = Vec::new();
    if approx_eq(r1.top(), r2.top()) {
        same.push(SharedBorder::TopAligned);
    }
    if approx_eq(r1.bottom(), r2.bottom()) {
        same.push(SharedBorder::BottomAligned);
    }
    if approx_eq(r1.left(), r2.left()) {
        same.push(SharedBorder::LeftAligned);
    }
    if approx_eq(r1.right(), r2.right()) {
        same.push(SharedBorder::RightAligned);
    }
    same
}

/// Inclusive containment with [`EPSILON`] slack on all four sides.
pub fn point_in_bounds(x: f32, y: f32, bounds: Rect) -> bool {
    approx_cmp(y, bounds.top()) != Ordering::Less
        && approx_cmp(y, bounds.bottom()) != Ordering::Greater
        && approx_cmp(x, bounds.left()) != Ordering::Less
        && approx_cmp(x, bounds.right()) != Ordering::Greater
}

/// The intersection of two rects, or `None` when they do not overlap with positive area.
pub fn intersection(r1: Rect, r2: Rect) -> Option<Rect> {
    let inter = r1.intersect(r2);
    inter.is_positive().then_some(inter)
}

/// Which quadrant of a screen a window mostly occupies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResizeQuadrant {
    LeftTop,
    LeftBottom,
    RightTop,
    RightBottom,
}

/// Splits `screen_bounds` into four quadrants and returns the one with the largest
/// overlap with `window_bounds`. Ties go to the earlier quadrant in enumeration order
/// (`LeftTop`, `LeftBottom`, `RightTop`, `RightBottom`).
pub fn resize_quadrant(window_bounds: Rect, screen_bounds: Rect) -> ResizeQuadrant {
    let half = screen_bounds.size() / 2.0;
    let quadrants = [
        (
            ResizeQuadrant::LeftTop,
            Rect::from_min_size(screen_bounds.min, half),
        ),
        (
            ResizeQuadrant::LeftBottom,
            Rect::from_min_size(screen_bounds.min + emath::vec2(0.0, half.y), half),
        ),
        (
            ResizeQuadrant::RightTop,
            Rect::from_min_size(screen_bounds.min + emath::vec2(half.x, 0.0), half),
        ),
        (
            ResizeQuadrant::RightBottom,
            Rect::from_min_size(screen_bounds.min + half, half),
        ),
    ];

    let mut best = (ResizeQuadrant::LeftTop, f32::MIN);
    for (quadrant, rect) in quadrants {
        let area = intersection(rect, window_bounds)
            .map(|r| r.area())
            .unwrap_or(0.0);
        if area > best.1 {
            best = (quadrant, area);
        }
    }
    best.0
}
