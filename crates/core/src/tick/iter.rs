use std::iter::FusedIterator;

use crate::viewport::{AxisMap, Viewport};

use super::{Tick, TickKind};

/// One generated mark: window coordinate along the axis and local index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickMark {
    pub pos: f64,
    pub local_index: f64,
}

/// Lazy, finite sequence of the marks a tier draws for one viewport state.
///
/// The range covered is the visible index range widened by one step of the
/// densest visible tier on each side, so marks straddling an edge are still
/// produced. The widening is done in index space (via `localize` and
/// `globalize`), not in pixels, so it stays consistent across zoom levels.
///
/// Marks come out in order of increasing window coordinate, so a backward
/// tickline yields descending local indices for every tier kind. Stepping is
/// capped at the number of integers in the covered range: far from the
/// origin, where adding one no longer changes an `f64`, the iterator stops
/// instead of repeating a mark.
#[derive(Debug, Clone)]
pub struct TickIter<'a> {
    state: State<'a>,
}

#[derive(Debug, Clone)]
enum State<'a> {
    Stepping {
        pos: f64,
        index: f64,
        step: f64,
        direction: f64,
        low: f64,
        high: f64,
        remaining: u64,
    },
    Listing {
        data: &'a [f64],
        /// Next entry when ascending, one past it when descending.
        cursor: usize,
        descending: bool,
        low: f64,
        high: f64,
        map: AxisMap,
        scale_factor: f64,
    },
    Exhausted,
}

impl<'a> TickIter<'a> {
    pub(super) fn new(tick: &'a Tick, viewport: &Viewport, densest: &Tick) -> Self {
        let scale = viewport.scale();
        // Infinite scale means fully zoomed in on a single index: nothing to draw.
        if !(scale.is_finite() && scale > 0.0) || !tick.is_visible_at(scale) {
            return Self::exhausted();
        }

        let direction = viewport.direction();
        let ext_0 = densest.globalize(densest.localize(viewport.index_0()) - direction);
        let ext_1 = densest.globalize(densest.localize(viewport.index_1()) + direction);
        let local_0 = tick.localize(ext_0);
        let local_1 = tick.localize(ext_1);
        let (low, high) = if viewport.backward() {
            (local_1, local_0)
        } else {
            (local_0, local_1)
        };
        let map = viewport.axis_map();

        let state = match &tick.kind {
            TickKind::Regular | TickKind::Labelless => {
                let shifted = local_0 - direction * tick.offset;
                let first = if viewport.backward() {
                    shifted.floor()
                } else {
                    shifted.ceil()
                };
                let index = first + direction * tick.offset;
                let span = high - low;
                if !span.is_finite() {
                    return Self::exhausted();
                }
                State::Stepping {
                    pos: map.pos(tick.globalize(index)),
                    index,
                    step: tick.local_scale(scale),
                    direction,
                    low,
                    high,
                    // `as` saturates on huge spans.
                    remaining: (span.max(0.0).floor() as u64).saturating_add(1),
                }
            }
            TickKind::DataList(data) => {
                let descending = viewport.backward();
                let cursor = if descending {
                    data.partition_point(|&v| v <= high)
                } else {
                    data.partition_point(|&v| v < low)
                };
                State::Listing {
                    data,
                    cursor,
                    descending,
                    low,
                    high,
                    map,
                    scale_factor: tick.scale_factor,
                }
            }
        };
        Self { state }
    }

    fn exhausted() -> Self {
        Self {
            state: State::Exhausted,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self.state, State::Exhausted)
    }
}

impl Iterator for TickIter<'_> {
    type Item = TickMark;

    fn next(&mut self) -> Option<TickMark> {
        let mark = match &mut self.state {
            State::Stepping {
                pos,
                index,
                step,
                direction,
                low,
                high,
                remaining,
            } => {
                if *remaining == 0 || *index < *low || *index > *high {
                    None
                } else {
                    let mark = TickMark {
                        pos: *pos,
                        local_index: *index,
                    };
                    let next = *index + *direction;
                    *remaining = if next == *index { 0 } else { *remaining - 1 };
                    *pos += *step;
                    *index = next;
                    Some(mark)
                }
            }
            State::Listing {
                data,
                cursor,
                descending,
                low,
                high,
                map,
                scale_factor,
            } => {
                let entry = if *descending {
                    cursor
                        .checked_sub(1)
                        .and_then(|i| data.get(i))
                        .filter(|&&v| v >= *low)
                } else {
                    data.get(*cursor).filter(|&&v| v <= *high)
                };
                entry.copied().map(|local_index| {
                    if *descending {
                        *cursor -= 1;
                    } else {
                        *cursor += 1;
                    }
                    TickMark {
                        pos: map.pos(local_index / *scale_factor),
                        local_index,
                    }
                })
            }
            State::Exhausted => None,
        };
        if mark.is_none() {
            self.state = State::Exhausted;
        }
        mark
    }
}

impl FusedIterator for TickIter<'_> {}

#[cfg(test)]
mod tests {
    use tickline_protocol::Rect;

    use super::*;
    use crate::viewport::Orientation;

    fn viewport(extent: f64, i0: f64, i1: f64) -> Viewport {
        Viewport::new(Rect::new(0.0, 0.0, extent, 30.0), Orientation::Horizontal, i0, i1)
    }

    fn indices(iter: impl Iterator<Item = TickMark>) -> Vec<f64> {
        iter.map(|m| m.local_index).collect()
    }

    #[test]
    fn regular_ticks_extend_one_step_past_each_edge() {
        let vp = viewport(500.0, 0.0, 10.0);
        let tick = Tick::regular();
        assert_eq!(
            indices(tick.ticks(&vp, None)),
            (-1..=11).map(f64::from).collect::<Vec<_>>()
        );
    }

    #[test]
    fn positions_follow_the_transform() {
        let vp = Viewport::new(
            Rect::new(100.0, 0.0, 500.0, 30.0),
            Orientation::Horizontal,
            0.5,
            10.5,
        );
        let tick = Tick::regular().with_scale_factor(2.0).with_min_space(1.0);
        for mark in tick.ticks(&vp, None) {
            let expected = vp.index_to_pos(tick.globalize(mark.local_index));
            assert!((mark.pos - expected).abs() < 1e-9, "{mark:?} vs {expected}");
        }
    }

    #[test]
    fn densest_tier_sets_extension() {
        let vp = viewport(1000.0, 0.0, 10.0);
        let coarse = Tick::regular();
        let fine = Tick::regular().with_scale_factor(10.0);
        // One fine step (0.1) past each edge is not enough to reach the
        // next coarse mark, so the coarse tier stays within [0, 10].
        let marks = indices(coarse.ticks(&vp, Some(&fine)));
        assert_eq!(marks.first(), Some(&0.0));
        assert_eq!(marks.last(), Some(&10.0));

        let fine_marks = indices(fine.ticks(&vp, Some(&fine)));
        assert_eq!(fine_marks.first(), Some(&-1.0));
        assert_eq!(fine_marks.last(), Some(&101.0));
    }

    #[test]
    fn suppressed_below_min_space_and_shown_at_it() {
        // scale 50, local scale 10 at scale_factor 5.
        let vp = viewport(500.0, 0.0, 10.0);
        let at_limit = Tick::regular().with_scale_factor(5.0).with_min_space(10.0);
        assert!(at_limit.ticks(&vp, None).next().is_some());

        let above_limit = Tick::regular().with_scale_factor(5.0).with_min_space(10.5);
        let mut iter = above_limit.ticks(&vp, None);
        assert!(iter.is_exhausted());
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn infinite_scale_draws_nothing() {
        let vp = viewport(500.0, 4.0, 4.0);
        assert_eq!(Tick::regular().ticks(&vp, None).count(), 0);
    }

    #[test]
    fn offset_shifts_local_indices() {
        let vp = viewport(500.0, 0.0, 10.0);
        let tick = Tick::regular().with_offset(0.5);
        let marks = indices(tick.ticks(&vp, None));
        assert_eq!(marks.first(), Some(&-0.5));
        assert_eq!(marks.last(), Some(&10.5));
        assert!(marks.iter().all(|m| m.fract().abs() == 0.5));
    }

    #[test]
    fn backward_steps_downwards_from_the_near_edge() {
        let mut vp = viewport(500.0, 0.0, 10.0);
        vp.set_backward(true);
        let marks: Vec<_> = Tick::regular().ticks(&vp, None).collect();
        assert_eq!(marks.first().map(|m| m.local_index), Some(11.0));
        assert_eq!(marks.last().map(|m| m.local_index), Some(-1.0));
        assert!(marks.windows(2).all(|w| w[1].pos > w[0].pos));
        // Index 10 sits on the near edge.
        let ten = marks.iter().find(|m| m.local_index == 10.0);
        assert_eq!(ten.map(|m| m.pos), Some(0.0));
    }

    #[test]
    fn data_list_yields_entries_in_range() {
        let vp = viewport(500.0, 0.0, 2.0);
        let tick = Tick::data_list(vec![-0.3, 1.0, 1.5, 2.0, 4.0, 8.0, 16.0, 23.0])
            .with_scale_factor(5.0)
            .with_min_space(1.0);
        // Local range [0, 10] widened by one local step on each side.
        assert_eq!(
            indices(tick.ticks(&vp, None)),
            vec![-0.3, 1.0, 1.5, 2.0, 4.0, 8.0]
        );
    }

    #[test]
    fn data_list_exhausted_before_edge_terminates() {
        let vp = viewport(500.0, 0.0, 100.0);
        let tick = Tick::data_list(vec![1.0, 2.0]).with_min_space(1.0);
        let mut iter = tick.ticks(&vp, None);
        assert_eq!(iter.next().map(|m| m.local_index), Some(1.0));
        assert_eq!(iter.next().map(|m| m.local_index), Some(2.0));
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn data_list_backward_walks_down_like_regular_tiers() {
        let mut vp = viewport(500.0, 0.0, 10.0);
        vp.set_backward(true);
        let tick = Tick::data_list(vec![-5.0, 0.0, 3.0, 9.0, 30.0]).with_min_space(1.0);
        let marks: Vec<_> = tick.ticks(&vp, None).collect();
        assert_eq!(
            marks.iter().map(|m| m.local_index).collect::<Vec<_>>(),
            vec![9.0, 3.0, 0.0]
        );
        assert!(marks.windows(2).all(|w| w[1].pos > w[0].pos));
    }

    #[test]
    fn stepping_ends_where_f64_stops_counting() {
        // Above 2^53 adding one no longer moves the index.
        let origin = 1.7e18;
        let vp = viewport(500.0, origin, origin + 512.0);
        let tick = Tick::regular().with_min_space(0.5);
        let marks = indices(tick.ticks(&vp, None).take(10_000));
        assert!((1..=515).contains(&marks.len()), "{} marks", marks.len());
        assert!(marks.windows(2).all(|w| w[0] != w[1]), "repeated index");
    }

    #[test]
    fn zoomed_far_out_draws_nothing() {
        // 500px over 5e9 indices is far below any positive spacing.
        let vp = viewport(500.0, 0.0, 5e9);
        let tick = Tick::regular().with_min_space(0.5);
        assert!(tick.validate().is_ok());
        assert_eq!(tick.ticks(&vp, None).count(), 0);
        assert!(Tick::regular().with_min_space(0.0).validate().is_err());
    }
}
