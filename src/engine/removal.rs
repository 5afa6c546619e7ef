use emath::{Rect, pos2, vec2};

use super::geometry::{SharedBorder, approx_cmp, approx_eq, find_shared_border};
use super::tile::TileId;

/// Which way a sibling expands into a vacated slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ExpandDirection {
    Left,
    Right,
    Up,
    Down,
}

/// Siblings eligible to absorb the vacated tile's area, per direction.
///
/// A sibling qualifies only if it touches the vacating tile on that side and is no
/// larger along the shared edge — expanding a sibling that spans multiple other
/// tiles would break alignment elsewhere.
fn eligible_siblings(
    vacated: Rect,
    peers: &[(TileId, Rect)],
) -> Vec<(ExpandDirection, TileId, Rect)> {
    let mut siblings = Vec::new();
    for &(id, bounds) in peers {
        let Some(border) = find_shared_border(vacated, bounds) else {
            continue;
        };
        match border {
            SharedBorder::Top => {
                if approx_cmp(bounds.width(), vacated.width()).is_le() {
                    siblings.push((ExpandDirection::Down, id, bounds));
                }
            }
            SharedBorder::Bottom => {
                if approx_cmp(bounds.width(), vacated.width()).is_le() {
                    siblings.push((ExpandDirection::Up, id, bounds));
                }
            }
            SharedBorder::Left => {
                if approx_cmp(bounds.height(), vacated.height()).is_le() {
                    siblings.push((ExpandDirection::Right, id, bounds));
                }
            }
            SharedBorder::Right => {
                if approx_cmp(bounds.height(), vacated.height()).is_le() {
                    siblings.push((ExpandDirection::Left, id, bounds));
                }
            }
            _ => {}
        }
    }
    siblings
}

/// Number of distinct rows/columns the freed span is divided between: siblings
/// expanding along `axis` that align with `sibling` on a perpendicular edge,
/// deduplicated by the edge they expand from.
fn share_count(
    siblings: &[(ExpandDirection, TileId, Rect)],
    sibling: Rect,
    direction: ExpandDirection,
) -> usize {
    let horizontal = matches!(direction, ExpandDirection::Left | ExpandDirection::Right);
    let mut edges: Vec<f32> = siblings
        .iter()
        .filter(|(d, _, _)| {
            matches!(d, ExpandDirection::Left | ExpandDirection::Right) == horizontal
        })
        .filter(|(_, _, r)| {
            if horizontal {
                approx_eq(r.top(), sibling.top()) || approx_eq(r.bottom(), sibling.bottom())
            } else {
                approx_eq(r.left(), sibling.left()) || approx_eq(r.right(), sibling.right())
            }
        })
        .map(|(_, _, r)| match direction {
            ExpandDirection::Left => r.left(),
            ExpandDirection::Right => r.right(),
            ExpandDirection::Up => r.top(),
            ExpandDirection::Down => r.bottom(),
        })
        .collect();
    edges.sort_by(f32::total_cmp);
    edges.dedup_by(|a, b| approx_eq(*a, *b));
    edges.len().max(1)
}

/// Expand the vacating tile's siblings into its slot.
///
/// One pass applies only one axis: directions are processed Left, Right, Up, Down,
/// and the first applied horizontal expansion suppresses the vertical ones (and
/// vice versa), so a corner sibling never absorbs the slot on both axes.
pub(super) fn redistribution_moves(vacated: Rect, peers: &[(TileId, Rect)]) -> Vec<(TileId, Rect)> {
    let siblings = eligible_siblings(vacated, peers);

    let mut moves = Vec::new();
    let mut moving_horizontal = false;
    let mut moving_vertical = false;

    for direction in [
        ExpandDirection::Left,
        ExpandDirection::Right,
        ExpandDirection::Up,
        ExpandDirection::Down,
    ] {
        for &(d, id, bounds) in &siblings {
            if d != direction {
                continue;
            }
            match direction {
                ExpandDirection::Left | ExpandDirection::Right if moving_vertical => continue,
                ExpandDirection::Up | ExpandDirection::Down if moving_horizontal => continue,
                _ => {}
            }

            let count = share_count(&siblings, bounds, direction) as f32;
            let new_bounds = match direction {
                ExpandDirection::Left => {
                    let px = vacated.width() / count;
                    Rect::from_min_size(
                        pos2(bounds.left() - px, bounds.top()),
                        vec2(bounds.width() + px, bounds.height()),
                    )
                }
                ExpandDirection::Right => {
                    let px = vacated.width() / count;
                    Rect::from_min_size(bounds.min, vec2(bounds.width() + px, bounds.height()))
                }
                ExpandDirection::Up => {
                    let px = vacated.height() / count;
                    Rect::from_min_size(
                        pos2(bounds.left(), bounds.top() - px),
                        vec2(bounds.width(), bounds.height() + px),
                    )
                }
                ExpandDirection::Down => {
                    let px = vacated.height() / count;
                    Rect::from_min_size(bounds.min, vec2(bounds.width(), bounds.height() + px))
                }
            };
            log::debug!("redistribute: {id:?} {direction:?} {bounds:?} -> {new_bounds:?}");
            moves.push((id, new_bounds));

            match direction {
                ExpandDirection::Left | ExpandDirection::Right => moving_horizontal = true,
                ExpandDirection::Up | ExpandDirection::Down => moving_vertical = true,
            }
        }
    }

    moves
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(left: f32, top: f32, width: f32, height: f32) -> Rect {
        Rect::from_min_size(pos2(left, top), vec2(width, height))
    }

    fn id(n: u64) -> TileId {
        TileId::from_u64(n)
    }

    fn total_area(rects: &[Rect]) -> f32 {
        rects.iter().map(Rect::area).sum()
    }

    #[test]
    fn flanking_columns_split_the_freed_width_evenly() {
        // Columns A | B | C; B vacates.
        let a = rect(0.0, 0.0, 300.0, 800.0);
        let b = rect(300.0, 0.0, 300.0, 800.0);
        let c = rect(600.0, 0.0, 300.0, 800.0);

        let moves = redistribution_moves(b, &[(id(0), a), (id(2), c)]);
        assert_eq!(moves.len(), 2);
        let new_a = moves.iter().find(|(i, _)| *i == id(0)).unwrap().1;
        let new_c = moves.iter().find(|(i, _)| *i == id(2)).unwrap().1;
        assert_eq!(new_a, rect(0.0, 0.0, 450.0, 800.0));
        assert_eq!(new_c, rect(450.0, 0.0, 450.0, 800.0));

        // Conservation: gains sum to the vacated area, and the seam still meets.
        let gained = total_area(&[new_a, new_c]) - total_area(&[a, c]);
        assert!((gained - b.area()).abs() < 1.0);
        assert!(approx_eq(new_a.right(), new_c.left()));
    }

    #[test]
    fn sole_sibling_absorbs_the_whole_slot() {
        let a = rect(0.0, 0.0, 500.0, 800.0);
        let b = rect(500.0, 0.0, 500.0, 800.0);
        let moves = redistribution_moves(b, &[(id(0), a)]);
        assert_eq!(moves, [(id(0), rect(0.0, 0.0, 1000.0, 800.0))]);
    }

    #[test]
    fn one_pass_applies_only_one_axis() {
        // Vacating a corner tile with a sibling to the right and one below: the
        // horizontal expansion wins, the vertical one is suppressed.
        let vacating = rect(0.0, 0.0, 500.0, 400.0);
        let right = rect(500.0, 0.0, 500.0, 400.0);
        let below = rect(0.0, 400.0, 500.0, 400.0);

        let moves = redistribution_moves(vacating, &[(id(1), right), (id(2), below)]);
        assert_eq!(moves, [(id(1), rect(0.0, 0.0, 1000.0, 400.0))]);
    }

    #[test]
    fn oversized_siblings_are_not_expanded() {
        // The sibling spans two other tiles along the shared edge; expanding it
        // would misalign them.
        let vacating = rect(0.0, 0.0, 400.0, 400.0);
        let tall = rect(400.0, 0.0, 400.0, 800.0);
        let moves = redistribution_moves(vacating, &[(id(1), tall)]);
        assert!(moves.is_empty());
    }

    #[test]
    fn stacked_rows_each_take_their_even_share() {
        // Vacating a full-height column with two stacked rows to its left: each row
        // expands right by the full freed width (one distinct column).
        let vacating = rect(600.0, 0.0, 400.0, 800.0);
        let upper = rect(0.0, 0.0, 600.0, 400.0);
        let lower = rect(0.0, 400.0, 600.0, 400.0);

        let moves = redistribution_moves(vacating, &[(id(1), upper), (id(2), lower)]);
        assert_eq!(moves.len(), 2);
        for (_, r) in &moves {
            assert!(approx_eq(r.right(), 1000.0));
            assert!(approx_eq(r.width(), 1000.0));
        }
    }
}
