use ahash::HashMap;
use emath::{Rect, Vec2, pos2, vec2};

use super::geometry::{SharedBorder, approx_eq, find_same_borders, find_shared_border};
use super::tile::TileId;

/// Cascade state for one edge drag. Created on the first resize tick and consumed on
/// pointer release.
#[derive(Debug)]
pub(super) struct ResizeSession {
    /// Bounds the dragged tile snaps back to if the session ends cancel-pending.
    pub(super) rollback: Rect,
    /// Full relation set against every locked peer on the screen, computed once at
    /// arm time. Stale entries are pruned as windows disappear.
    pub(super) relations: Vec<(SharedBorder, TileId)>,
    /// The last tick was rejected; release rolls back unless a later tick clears it.
    pub(super) cancel_pending: bool,
}

impl ResizeSession {
    pub(super) fn new(rollback: Rect, relations: Vec<(SharedBorder, TileId)>) -> Self {
        Self {
            rollback,
            relations,
            cancel_pending: false,
        }
    }
}

/// Both touching and aligned relations between the dragged tile and its peers. A
/// peer can contribute several relations (e.g. touching on one axis, aligned on the
/// other); each is cascaded independently.
pub(super) fn capture_relations(
    dragged: Rect,
    peers: &[(TileId, Rect)],
) -> Vec<(SharedBorder, TileId)> {
    let mut relations = Vec::new();
    for &(id, bounds) in peers {
        if let Some(border) = find_shared_border(dragged, bounds) {
            relations.push((border, id));
        }
        for border in find_same_borders(dragged, bounds) {
            relations.push((border, id));
        }
    }
    relations
}

/// Whether the dragged tile abandoned a screen edge it was pinned to at arm time.
///
/// A tile flush to the working-area boundary must stay flush: letting it pull away
/// would open a gap no neighbor can fill.
pub(super) fn screen_pin_violated(rollback: Rect, now: Rect, screen_work: Rect) -> bool {
    find_same_borders(rollback, screen_work)
        .into_iter()
        .any(|border| match border {
            SharedBorder::LeftAligned => !approx_eq(now.left(), rollback.left()),
            SharedBorder::TopAligned => !approx_eq(now.top(), rollback.top()),
            SharedBorder::RightAligned => !approx_eq(now.right(), rollback.right()),
            SharedBorder::BottomAligned => !approx_eq(now.bottom(), rollback.bottom()),
            _ => false,
        })
}

/// Outcome of one cascade tick.
#[derive(Debug)]
pub(super) enum CascadeTick {
    /// Every recomputed neighbor is valid; apply all of these together.
    Commit(Vec<(TileId, Rect)>),
    /// A neighbor would fall under its minimum size; nothing may be applied this
    /// tick. `offender` is the neighbor's current bounds, for the cancel overlay.
    CancelInvalid { offender: Rect },
}

/// Recompute every related neighbor to keep shared edges touching and aligned edges
/// coincident with the dragged tile's new bounds. Validate-then-commit: the first
/// minimum-size violation rejects the whole tick.
pub(super) fn cascade_tick(
    relations: &[(SharedBorder, TileId)],
    dragged: Rect,
    lookup: impl Fn(TileId) -> Option<(Rect, Vec2)>,
) -> CascadeTick {
    // Accumulate per neighbor so a tile with several relations composes them; edge
    // extents are always measured against the original bounds, like the capture.
    let mut pending: HashMap<TileId, Rect> = HashMap::default();

    for &(border, id) in relations {
        let Some((orig, min_size)) = lookup(id) else {
            continue;
        };
        let acc = *pending.get(&id).unwrap_or(&orig);

        let new_bounds = match border {
            SharedBorder::Left => Rect::from_min_size(
                acc.min,
                vec2((orig.left() - dragged.left()).abs(), acc.height()),
            ),
            SharedBorder::LeftAligned => Rect::from_min_size(
                pos2(dragged.left(), acc.top()),
                vec2((dragged.left() - orig.right()).abs(), acc.height()),
            ),
            SharedBorder::Right => Rect::from_min_size(
                pos2(dragged.right(), acc.top()),
                vec2((dragged.right() - orig.right()).abs(), acc.height()),
            ),
            SharedBorder::RightAligned => Rect::from_min_size(
                acc.min,
                vec2((orig.left() - dragged.right()).abs(), acc.height()),
            ),
            SharedBorder::Top => Rect::from_min_size(
                acc.min,
                vec2(acc.width(), (orig.top() - dragged.top()).abs()),
            ),
            SharedBorder::TopAligned => Rect::from_min_size(
                pos2(acc.left(), dragged.top()),
                vec2(acc.width(), (dragged.top() - orig.bottom()).abs()),
            ),
            SharedBorder::Bottom => Rect::from_min_size(
                pos2(acc.left(), dragged.bottom()),
                vec2(acc.width(), (dragged.bottom() - orig.bottom()).abs()),
            ),
            SharedBorder::BottomAligned => Rect::from_min_size(
                acc.min,
                vec2(acc.width(), (orig.top() - dragged.bottom()).abs()),
            ),
        };

        if new_bounds != orig {
            if new_bounds.width() < min_size.x || new_bounds.height() < min_size.y {
                return CascadeTick::CancelInvalid { offender: orig };
            }
            pending.insert(id, new_bounds);
        }
    }

    CascadeTick::Commit(pending.into_iter().collect())
}
