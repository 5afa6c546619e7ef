use std::cmp::Ordering;

use emath::{Pos2, Rect, pos2, vec2};
use itertools::Itertools as _;

use super::geometry::{
    SharedBorder, approx_cmp, approx_eq, find_same_borders, intersection,
};
use super::options::ticks_per_level;
use super::tile::TileId;

/// Split-target state for one move drag. Lives from the first move tick until
/// pointer release; the commit step consumes it.
#[derive(Debug, Default)]
pub(super) struct SplitSession {
    /// Candidate shape for the dragged window. Persists across ticks where the
    /// pointer hovers no locked tile; cleared when the modifier disengages.
    pub(super) shape: Option<Rect>,
    /// `(level, tile)` pairs for the hovered target, all levels.
    pub(super) pairs: Vec<(usize, TileId)>,
    pub(super) border: Option<SharedBorder>,
    /// Active level; advances by dwell, resets on any target change.
    pub(super) level: usize,
    tick_counter: u64,
}

impl SplitSession {
    /// Feed one tick's freshly computed target set and advance/reset the level.
    ///
    /// The level advances by exactly one every [`ticks_per_level`] ticks while the
    /// pair set and border stay identical, saturating at the maximum observed level.
    /// Any change resets both the dwell counter and the level.
    pub(super) fn observe(&mut self, border: Option<SharedBorder>, pairs: Vec<(usize, TileId)>) {
        self.tick_counter += 1;

        let lists_match = pairs.len() == self.pairs.len()
            && border == self.border
            && pairs.iter().all(|p| self.pairs.contains(p));

        if lists_match {
            if self.tick_counter % ticks_per_level() == 0 && !pairs.is_empty() {
                let max_level = pairs.iter().map(|(level, _)| *level).max().unwrap_or(0);
                self.level = (self.level + 1).min(max_level);
            }
        } else {
            self.tick_counter = 0;
            self.level = 0;
        }

        self.border = border;
        self.pairs = pairs;
    }
}

/// Split orientation from the pointer position within the hovered target: left and
/// right thirds take priority, otherwise the vertical midpoint decides top vs bottom.
pub(super) fn split_border_at(pointer: Pos2, target: Rect) -> SharedBorder {
    if approx_cmp(pointer.x, target.left() + target.width() / 3.0) != Ordering::Greater {
        SharedBorder::Left
    } else if approx_cmp(pointer.x, target.left() + target.width() * 2.0 / 3.0)
        != Ordering::Less
    {
        SharedBorder::Right
    } else if approx_cmp(pointer.y, target.top() + target.height() / 2.0) != Ordering::Greater {
        SharedBorder::Top
    } else {
        SharedBorder::Bottom
    }
}

/// The ordered neighbor run for a chosen split edge: every peer (the target
/// included) whose corresponding edge aligns with the target's, sorted by the
/// perpendicular coordinate (top-to-bottom for vertical splits, left-to-right for
/// horizontal ones).
pub(super) fn aligned_run(
    border: SharedBorder,
    target: Rect,
    peers: &[(TileId, Rect)],
) -> Vec<(TileId, Rect)> {
    let edge_matches = |r: &Rect| match border {
        SharedBorder::Left => approx_eq(r.left(), target.left()),
        SharedBorder::Right => approx_eq(r.right(), target.right()),
        SharedBorder::Top => approx_eq(r.top(), target.top()),
        SharedBorder::Bottom => approx_eq(r.bottom(), target.bottom()),
        _ => false,
    };
    let perpendicular = |r: &Rect| match border {
        SharedBorder::Left | SharedBorder::Right => r.top(),
        _ => r.left(),
    };

    peers
        .iter()
        .filter(|(_, r)| edge_matches(r))
        .sorted_by(|(_, a), (_, b)| perpendicular(a).total_cmp(&perpendicular(b)))
        .copied()
        .collect()
}

/// Enumerate nested neighbor groups around the target.
///
/// Level `L` is the union of every contiguous sub-range of length `L + 1` that
/// contains the target: the run clipped to radius `L` around `target_idx`. Level 0
/// is the target alone; the maximum level is `run.len() - 1`.
pub(super) fn level_pairs(run: &[(TileId, Rect)], target_idx: usize) -> Vec<(usize, TileId)> {
    let n = run.len();
    let mut pairs = Vec::new();
    for level in 0..n {
        let lo = target_idx.saturating_sub(level);
        let hi = (target_idx + level).min(n - 1);
        for (id, _) in &run[lo..=hi] {
            pairs.push((level, *id));
        }
    }
    pairs
}

/// The tiles making up one level: the clipped contiguous run of radius `level`.
pub(super) fn level_rects(run: &[(TileId, Rect)], target_idx: usize, level: usize) -> Vec<Rect> {
    let lo = target_idx.saturating_sub(level);
    let hi = (target_idx + level).min(run.len() - 1);
    run[lo..=hi].iter().map(|(_, r)| *r).collect()
}

/// The split shape for one level, flush to the chosen edge.
///
/// For vertical (left/right) splits: width is half the narrowest level tile, height
/// the sum of level tile heights. Horizontal splits are the transpose. With a single
/// level tile this degenerates to the half-rect of the hovered target.
pub(super) fn split_shape(border: SharedBorder, target: Rect, level_rects: &[Rect]) -> Rect {
    debug_assert!(!level_rects.is_empty());
    let min_w = level_rects.iter().map(Rect::width).fold(f32::MAX, f32::min);
    let min_h = level_rects
        .iter()
        .map(Rect::height)
        .fold(f32::MAX, f32::min);
    let sum_w: f32 = level_rects.iter().map(Rect::width).sum();
    let sum_h: f32 = level_rects.iter().map(Rect::height).sum();
    let min_top = level_rects.iter().map(Rect::top).fold(f32::MAX, f32::min);
    let min_left = level_rects.iter().map(Rect::left).fold(f32::MAX, f32::min);

    match border {
        SharedBorder::Left => {
            Rect::from_min_size(pos2(target.left(), min_top), vec2(min_w / 2.0, sum_h))
        }
        SharedBorder::Right => Rect::from_min_size(
            pos2(target.right() - min_w / 2.0, min_top),
            vec2(min_w / 2.0, sum_h),
        ),
        SharedBorder::Top => {
            Rect::from_min_size(pos2(min_left, target.top()), vec2(sum_w, min_h / 2.0))
        }
        _ => Rect::from_min_size(
            pos2(min_left, target.bottom() - min_h / 2.0),
            vec2(sum_w, min_h / 2.0),
        ),
    }
}

/// Neighbor shrinkage for a committed split: each active-level neighbor loses the
/// area it intersects with the shape, shrunk from exactly one edge.
///
/// The edge to shrink is identified by alignment against the lost area (`offset`):
/// the first of left/right/top/bottom whose alignment with the neighbor is *absent*
/// names the side of the neighbor the shape did not reach — so the opposite strip is
/// the one to give up.
pub(super) fn commit_moves(
    shape: Rect,
    level: usize,
    pairs: &[(usize, TileId)],
    bounds_of: impl Fn(TileId) -> Option<Rect>,
) -> Vec<(TileId, Rect)> {
    let mut moves = Vec::new();
    for &(_, id) in pairs.iter().filter(|(l, _)| *l == level) {
        let Some(nb) = bounds_of(id) else {
            log::warn!("split commit: neighbor {id:?} vanished, skipping");
            continue;
        };
        let Some(offset) = intersection(shape, nb) else {
            continue;
        };
        let same = find_same_borders(nb, offset);
        let Some(resize_border) = SharedBorder::ALIGNED.into_iter().find(|b| !same.contains(b))
        else {
            // Offset covers the whole neighbor; a split can never absorb a tile fully.
            log::warn!("split commit: shape swallows neighbor {id:?}, skipping");
            continue;
        };
        log::debug!("split commit: neighbor {id:?} offset={offset:?} shrink={resize_border:?}");

        let new_bounds = match resize_border {
            SharedBorder::RightAligned => Rect::from_min_size(
                pos2(nb.left() + offset.width(), nb.top()),
                vec2(nb.width() - offset.width(), nb.height()),
            ),
            SharedBorder::LeftAligned => {
                Rect::from_min_size(nb.min, vec2(nb.width() - offset.width(), nb.height()))
            }
            SharedBorder::BottomAligned => Rect::from_min_size(
                pos2(nb.left(), nb.top() + offset.height()),
                vec2(nb.width(), nb.height() - offset.height()),
            ),
            _ => Rect::from_min_size(nb.min, vec2(nb.width(), nb.height() - offset.height())),
        };
        moves.push((id, new_bounds));
    }
    moves
}
