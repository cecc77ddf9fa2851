//! Label collision resolution.
//!
//! During one redraw every labelled mark offers a candidate to a
//! [`Labeller`]. Candidates are keyed by their slot on screen (sub-pixel
//! position along the axis plus the side of the axis they sit on); when two
//! tiers land in the same slot the coarser tier, the one with the smaller
//! `scale_factor`, keeps it. `finalize` emits the survivors and leaves the
//! resolver empty.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tickline_protocol::{Paint, Point, Rect, RenderCommand, SharedStr, TextAlign};

use crate::text::TextMeasure;
use crate::tick::{HAlign, Tick, TickAlign, TickVariant, VAlign};
use crate::viewport::Orientation;

/// Per-pass inputs shared by every registration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelContext {
    pub orientation: Orientation,
    /// Gap in pixels between a mark and its label.
    pub padding: f64,
    /// Global scale of the pass, used for the label threshold.
    pub scale: f64,
}

/// Something that collects label candidates for one redraw pass.
pub trait Labeller {
    /// Offer the label of the mark at `local_index` drawn as `tick_rect`.
    /// Returns whether a candidate now occupies the mark's slot on its behalf.
    fn register(
        &mut self,
        tick: &Tick,
        local_index: f64,
        tick_rect: Rect,
        ctx: &LabelContext,
        measure: &dyn TextMeasure,
    ) -> bool;

    /// Append the surviving labels to `out` and forget all candidates.
    fn finalize(&mut self, out: &mut Vec<RenderCommand>);
}

/// Positions are bucketed at 1/256 px so that two tiers computing the same
/// screen position through different float paths share a slot.
const SLOT_RESOLUTION: f64 = 256.0;

type SlotKey = (i64, TickAlign);

#[derive(Debug, Clone)]
struct Candidate {
    text: SharedStr,
    position: Point,
    color: Paint,
    font_size: f64,
    priority: f64,
}

/// Single resolver: one namespace of slots for every tier registered with it.
#[derive(Debug, Default)]
pub struct LabelResolver {
    candidates: Vec<Candidate>,
    slots: HashMap<SlotKey, usize>,
}

impl LabelResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

impl Labeller for LabelResolver {
    fn register(
        &mut self,
        tick: &Tick,
        local_index: f64,
        tick_rect: Rect,
        ctx: &LabelContext,
        measure: &dyn TextMeasure,
    ) -> bool {
        if !tick.is_labelled_at(ctx.scale) {
            return false;
        }
        let Some(text) = tick.label_text(local_index) else {
            return false;
        };

        let align = tick.align(ctx.orientation);
        let along = match ctx.orientation {
            Orientation::Vertical => tick_rect.center().y,
            Orientation::Horizontal => tick_rect.center().x,
        };
        let key = ((along * SLOT_RESOLUTION).round() as i64, align);

        if let Some(&existing) = self.slots.get(&key) {
            if self.candidates[existing].priority <= tick.scale_factor {
                return false;
            }
        }

        let font_size = tick.font_size();
        let extent = measure.measure(&text, font_size);
        let candidate = Candidate {
            position: label_position(align, tick_rect, extent.width, extent.height, ctx.padding),
            text: SharedStr::from(text),
            color: tick.label_color,
            font_size,
            priority: tick.scale_factor,
        };
        match self.slots.get(&key) {
            Some(&existing) => self.candidates[existing] = candidate,
            None => {
                self.slots.insert(key, self.candidates.len());
                self.candidates.push(candidate);
            }
        }
        true
    }

    fn finalize(&mut self, out: &mut Vec<RenderCommand>) {
        self.slots.clear();
        out.extend(self.candidates.drain(..).map(|c| RenderCommand::DrawText {
            position: c.position,
            text: c.text,
            color: c.color,
            font_size: c.font_size,
            align: TextAlign::Left,
        }));
    }
}

/// Top-left corner of a label placed just outside its mark, on the side
/// facing away from the edge or line the mark is flush with.
fn label_position(align: TickAlign, tick: Rect, text_w: f64, text_h: f64, padding: f64) -> Point {
    match align {
        TickAlign::H(h) => {
            let x = match h {
                HAlign::Left | HAlign::LineRight => tick.right() + padding,
                HAlign::Right | HAlign::LineLeft => tick.x - text_w - padding,
            };
            Point::new(x, tick.center().y - text_h / 2.0)
        }
        TickAlign::V(v) => {
            let y = match v {
                VAlign::Top | VAlign::LineBottom => tick.bottom() + padding,
                VAlign::Bottom | VAlign::LineTop => tick.y - text_h - padding,
            };
            Point::new(tick.center().x - text_w / 2.0, y)
        }
    }
}

/// How a tickline groups its tiers for collision resolution.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum LabelStrategy {
    /// All tiers compete for the same slots.
    #[default]
    Single,
    /// Each group of variants resolves independently; variants not named in
    /// any group share one extra resolver.
    PerVariant(Vec<Vec<TickVariant>>),
}

impl LabelStrategy {
    pub fn build(&self) -> Box<dyn Labeller> {
        match self {
            LabelStrategy::Single => Box::new(LabelResolver::new()),
            LabelStrategy::PerVariant(groups) => Box::new(CompositeLabelResolver::new(groups)),
        }
    }
}

/// Routes each registration to a sub-resolver picked by the tier's variant.
///
/// The routing table is fixed at construction, so dispatch is an array
/// lookup. Sub-resolvers are finalized in the order their groups were given.
#[derive(Debug)]
pub struct CompositeLabelResolver {
    resolvers: Vec<LabelResolver>,
    route: [usize; TickVariant::ALL.len()],
}

impl CompositeLabelResolver {
    pub fn new(groups: &[Vec<TickVariant>]) -> Self {
        let mut route = [usize::MAX; TickVariant::ALL.len()];
        let mut resolvers = Vec::with_capacity(groups.len() + 1);
        for group in groups {
            let slot = resolvers.len();
            resolvers.push(LabelResolver::new());
            for variant in group {
                // First group naming a variant claims it.
                if route[variant.slot()] == usize::MAX {
                    route[variant.slot()] = slot;
                }
            }
        }
        if route.contains(&usize::MAX) {
            let fallback = resolvers.len();
            resolvers.push(LabelResolver::new());
            for target in route.iter_mut().filter(|r| **r == usize::MAX) {
                *target = fallback;
            }
        }
        Self { resolvers, route }
    }

    pub fn resolver_count(&self) -> usize {
        self.resolvers.len()
    }
}

impl Labeller for CompositeLabelResolver {
    fn register(
        &mut self,
        tick: &Tick,
        local_index: f64,
        tick_rect: Rect,
        ctx: &LabelContext,
        measure: &dyn TextMeasure,
    ) -> bool {
        let slot = self.route[tick.variant().slot()];
        match self.resolvers.get_mut(slot) {
            Some(resolver) => resolver.register(tick, local_index, tick_rect, ctx, measure),
            None => false,
        }
    }

    fn finalize(&mut self, out: &mut Vec<RenderCommand>) {
        for resolver in &mut self.resolvers {
            resolver.finalize(out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::MonospaceMeasure;

    fn ctx() -> LabelContext {
        LabelContext {
            orientation: Orientation::Vertical,
            padding: 0.0,
            scale: 1000.0,
        }
    }

    fn texts(out: &[RenderCommand]) -> Vec<String> {
        out.iter()
            .filter_map(|c| match c {
                RenderCommand::DrawText { text, .. } => Some(text.to_string()),
                _ => None,
            })
            .collect()
    }

    fn mark() -> Rect {
        Rect::new(0.0, 99.0, 8.0, 2.0)
    }

    #[test]
    fn coarser_tier_wins_the_slot() {
        let measure = MonospaceMeasure::default();
        let coarse = Tick::regular().with_scale_factor(2.0);
        let fine = Tick::regular().with_scale_factor(5.0);

        // Registration order must not matter.
        for order in [[&fine, &coarse], [&coarse, &fine]] {
            let mut resolver = LabelResolver::new();
            for tick in order {
                let local = tick.scale_factor * 3.0;
                resolver.register(tick, local, mark(), &ctx(), &measure);
            }
            assert_eq!(resolver.len(), 1);
            let mut out = Vec::new();
            resolver.finalize(&mut out);
            assert_eq!(texts(&out), vec!["6"]);
            assert!(resolver.is_empty());
        }
    }

    #[test]
    fn opposite_sides_do_not_collide() {
        let measure = MonospaceMeasure::default();
        let left = Tick::regular();
        let right = Tick::regular().with_halign(HAlign::Right).with_scale_factor(2.0);
        let mut resolver = LabelResolver::new();
        assert!(resolver.register(&left, 1.0, mark(), &ctx(), &measure));
        assert!(resolver.register(&right, 2.0, mark(), &ctx(), &measure));
        assert_eq!(resolver.len(), 2);
    }

    #[test]
    fn skips_unlabelled_marks() {
        let measure = MonospaceMeasure::default();
        let mut resolver = LabelResolver::new();
        assert!(!resolver.register(&Tick::labelless(), 1.0, mark(), &ctx(), &measure));

        let sparse = LabelContext { scale: 37.0, ..ctx() };
        assert!(!resolver.register(&Tick::regular(), 1.0, mark(), &sparse, &measure));
        assert!(resolver.is_empty());
    }

    #[test]
    fn label_sits_beside_mark_away_from_edge() {
        let measure = MonospaceMeasure {
            advance: 0.5,
            line_height: 1.0,
        };
        let padding = 3.0;
        let mut resolver = LabelResolver::new();
        let ctx = LabelContext { padding, ..ctx() };
        // font 16: text "7" is 8 wide and 16 tall.
        resolver.register(&Tick::regular(), 7.0, mark(), &ctx, &measure);
        let mut out = Vec::new();
        resolver.finalize(&mut out);
        assert!(
            matches!(
                out.first(),
                Some(RenderCommand::DrawText { position, font_size, .. })
                    if *font_size == 16.0 && *position == Point::new(11.0, 92.0)
            ),
            "{out:?}"
        );

        let above = label_position(TickAlign::V(VAlign::Bottom), Rect::new(49.0, 92.0, 2.0, 8.0), 8.0, 16.0, 1.0);
        assert_eq!(above, Point::new(46.0, 75.0));
    }

    #[test]
    fn composite_routes_by_variant_and_appends_fallback() {
        let measure = MonospaceMeasure::default();
        let mut composite = CompositeLabelResolver::new(&[vec![TickVariant::DataList]]);
        assert_eq!(composite.resolver_count(), 2);

        // Same slot, different resolvers: both survive.
        let regular = Tick::regular().with_halign(HAlign::LineRight);
        let data = Tick::data_list(vec![4.0]).with_scale_factor(4.0);
        assert!(composite.register(&data, 4.0, mark(), &ctx(), &measure));
        assert!(composite.register(&regular, 1.0, mark(), &ctx(), &measure));

        let mut out = Vec::new();
        composite.finalize(&mut out);
        // Finalized in group order: the data-list group first, then fallback.
        assert_eq!(texts(&out), vec!["4", "1"]);
    }

    #[test]
    fn strategy_builds_matching_resolver() {
        let measure = MonospaceMeasure::default();
        let mut single = LabelStrategy::Single.build();
        let coarse = Tick::regular();
        let data = Tick::data_list(vec![2.0]).with_halign(HAlign::Left).with_scale_factor(2.0);
        single.register(&coarse, 1.0, mark(), &ctx(), &measure);
        single.register(&data, 2.0, mark(), &ctx(), &measure);
        let mut out = Vec::new();
        single.finalize(&mut out);
        assert_eq!(texts(&out), vec!["1"]);
    }
}
