//! Multi-touch pan and pinch-zoom.
//!
//! With exactly `translation_touches` touches down the range pans; with two
//! or more touches (and zoom enabled) the pair of touches farthest apart
//! drives an anchor-preserving zoom. Panning goes through the momentum
//! engine so that a release can fling; a pinch sets the transform directly
//! and then re-seats the engine on the new centre.

use log::debug;
use serde::{Deserialize, Serialize};
use tickline_protocol::Point;

use crate::momentum::{Momentum, Motion};
use crate::viewport::Viewport;

pub type TouchId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TouchPhase {
    Down,
    Move,
    Up,
}

/// One touch lifecycle event in window coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchEvent {
    pub id: TouchId,
    pub phase: TouchPhase,
    pub pos: Point,
    /// Position reported with the previous event of this touch. Defaults to
    /// the last position the controller saw.
    #[serde(default)]
    pub prev_pos: Option<Point>,
}

impl TouchEvent {
    pub fn down(id: TouchId, pos: Point) -> Self {
        Self {
            id,
            phase: TouchPhase::Down,
            pos,
            prev_pos: None,
        }
    }

    pub fn moved(id: TouchId, pos: Point) -> Self {
        Self {
            id,
            phase: TouchPhase::Move,
            pos,
            prev_pos: None,
        }
    }

    pub fn up(id: TouchId, pos: Point) -> Self {
        Self {
            id,
            phase: TouchPhase::Up,
            pos,
            prev_pos: None,
        }
    }

    pub fn with_prev(mut self, prev_pos: Point) -> Self {
        self.prev_pos = Some(prev_pos);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureSettings {
    /// Touch count that pans the range.
    pub translation_touches: usize,
    pub zoomable: bool,
    pub scale_min: f64,
    pub scale_max: f64,
}

impl Default for GestureSettings {
    fn default() -> Self {
        Self {
            translation_touches: 1,
            zoomable: true,
            scale_min: 0.0,
            scale_max: f64::INFINITY,
        }
    }
}

impl GestureSettings {
    /// Clamp a computed scale into the configured zoom range.
    pub fn clamp_scale(&self, scale: f64) -> f64 {
        scale.max(self.scale_min).min(self.scale_max)
    }
}

/// Touch bookkeeping: grabbed touches in arrival order with their last
/// known window positions.
#[derive(Debug, Clone, Default)]
pub struct GestureController {
    settings: GestureSettings,
    touches: Vec<(TouchId, Point)>,
}

impl GestureController {
    pub fn new(settings: GestureSettings) -> Self {
        Self {
            settings,
            touches: Vec::new(),
        }
    }

    pub fn settings(&self) -> &GestureSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut GestureSettings {
        &mut self.settings
    }

    pub fn active_touches(&self) -> usize {
        self.touches.len()
    }

    pub fn is_tracking(&self, id: TouchId) -> bool {
        self.position(id).is_some()
    }

    fn position(&self, id: TouchId) -> Option<usize> {
        self.touches.iter().position(|&(t, _)| t == id)
    }

    fn translate_now(&self) -> bool {
        self.touches.len() == self.settings.translation_touches
    }

    /// Dispatch one event. Returns whether the controller consumed it.
    pub fn handle<M: Momentum>(
        &mut self,
        event: &TouchEvent,
        viewport: &mut Viewport,
        motion: &mut Motion<M>,
    ) -> bool {
        match event.phase {
            TouchPhase::Down => self.touch_down(event.id, event.pos, viewport, motion),
            TouchPhase::Move => {
                self.touch_move(event.id, event.pos, event.prev_pos, viewport, motion)
            }
            TouchPhase::Up => self.touch_up(event.id, viewport, motion),
        }
    }

    /// Grab a touch landing inside the viewport. Touches outside it, or ids
    /// already grabbed, are left alone.
    pub fn touch_down<M: Momentum>(
        &mut self,
        id: TouchId,
        pos: Point,
        viewport: &Viewport,
        motion: &mut Motion<M>,
    ) -> bool {
        if self.is_tracking(id) || !viewport.bounds().contains(pos) {
            return false;
        }
        self.touches.push((id, pos));
        debug!("grabbed touch {id} ({} active)", self.touches.len());

        let engine = motion.engine_mut();
        if self.translate_now() {
            engine.start(viewport.index_mid());
        } else {
            engine.cancel();
        }
        true
    }

    pub fn touch_move<M: Momentum>(
        &mut self,
        id: TouchId,
        pos: Point,
        prev_pos: Option<Point>,
        viewport: &mut Viewport,
        motion: &mut Motion<M>,
    ) -> bool {
        let Some(slot) = self.position(id) else {
            return false;
        };
        let last = self.touches[slot].1;

        if self.translate_now() {
            let delta = (viewport.along(pos) - viewport.along(last))
                / self.settings.translation_touches as f64;
            let target = viewport.index_mid() - delta / viewport.scale() * viewport.direction();
            motion.engine_mut().update(target);
            motion.follow(viewport);
        } else {
            motion.engine_mut().cancel();
        }

        if self.touches.len() >= 2 && self.settings.zoomable {
            self.pinch(slot, pos, prev_pos.unwrap_or(last), viewport, motion);
        }

        self.touches[slot].1 = pos;
        true
    }

    /// Release a touch. Completing a pan hands the centre over to the
    /// momentum engine for a kinetic release.
    pub fn touch_up<M: Momentum>(
        &mut self,
        id: TouchId,
        viewport: &mut Viewport,
        motion: &mut Motion<M>,
    ) -> bool {
        let Some(slot) = self.position(id) else {
            return false;
        };
        if self.translate_now() {
            motion.engine_mut().stop(viewport.index_mid());
            motion.follow(viewport);
        }
        self.touches.remove(slot);
        debug!("released touch {id} ({} active)", self.touches.len());
        true
    }

    /// Drop every touch without a kinetic release.
    pub fn reset<M: Momentum>(&mut self, motion: &mut Motion<M>) {
        self.touches.clear();
        motion.engine_mut().cancel();
    }

    fn pinch<M: Momentum>(
        &self,
        slot: usize,
        pos: Point,
        prev: Point,
        viewport: &mut Viewport,
        motion: &mut Motion<M>,
    ) {
        let Some(anchor_slot) = farthest(&self.touches, pos) else {
            return;
        };
        let anchor = self.touches[anchor_slot].1;
        // Only the touch completing the widest pair drives the zoom.
        if farthest(&self.touches, anchor) != Some(slot) {
            return;
        }

        let separation = pos.distance(anchor);
        let prev_separation = prev.distance(anchor);
        if separation == 0.0 || prev_separation == 0.0 {
            debug!("skipping pinch step for touch {}: zero separation", self.touches[slot].0);
            return;
        }

        let origin = viewport.pos0();
        let intercept = viewport.along(anchor.midpoint(pos)) - origin;
        let old_intercept = viewport.along(anchor.midpoint(prev)) - origin;
        let pinned = viewport.pos_to_index(old_intercept, false);

        let scale = self
            .settings
            .clamp_scale(separation / prev_separation * viewport.scale());
        if !(scale.is_finite() && scale > 0.0) {
            return;
        }
        viewport.rescale_about(pinned, intercept, scale);

        let engine = motion.engine_mut();
        engine.update(viewport.index_mid());
        engine.set_manual(true);
        motion.follow(viewport);
    }
}

/// Slot of the touch farthest from `from`; the earliest wins ties.
fn farthest(touches: &[(TouchId, Point)], from: Point) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (slot, &(_, p)) in touches.iter().enumerate() {
        let d = p.distance(from);
        if best.is_none_or(|(_, bd)| d > bd) {
            best = Some((slot, d));
        }
    }
    best.map(|(slot, _)| slot)
}

#[cfg(test)]
mod tests {
    use tickline_protocol::Rect;

    use super::*;
    use crate::momentum::{DampedScroll, MomentumTuning};
    use crate::viewport::Orientation;

    const EPS: f64 = 1e-9;

    fn setup(extent: f64, i0: f64, i1: f64) -> (Viewport, Motion<DampedScroll>) {
        let vp = Viewport::new(Rect::new(0.0, 0.0, 40.0, extent), Orientation::Vertical, i0, i1);
        let mut engine = DampedScroll::new();
        engine.tune(MomentumTuning::for_scale(20.0, vp.scale()));
        let mut motion = Motion::new(engine);
        motion.calibrate(&vp);
        (vp, motion)
    }

    fn at(y: f64) -> Point {
        Point::new(20.0, y)
    }

    #[test]
    fn single_touch_pan_shifts_range() {
        let (mut vp, mut motion) = setup(500.0, 0.0, 10.0);
        let mut g = GestureController::default();
        assert!(g.touch_down(1, at(100.0), &vp, &mut motion));
        assert!(g.touch_move(1, at(200.0), None, &mut vp, &mut motion));
        assert!((vp.index_0() + 2.0).abs() < EPS);
        assert!((vp.index_1() - 8.0).abs() < EPS);
        assert_eq!(vp.scale(), 50.0);
    }

    #[test]
    fn backward_pan_moves_the_other_way() {
        let (mut vp, mut motion) = setup(500.0, 0.0, 10.0);
        vp.set_backward(true);
        motion.calibrate(&vp);
        let mut g = GestureController::default();
        g.touch_down(1, at(100.0), &vp, &mut motion);
        g.touch_move(1, at(200.0), None, &mut vp, &mut motion);
        assert!((vp.index_0() - 12.0).abs() < EPS);
        assert!((vp.index_1() - 2.0).abs() < EPS);
    }

    #[test]
    fn pinch_keeps_old_intercept_index() {
        let (mut vp, mut motion) = setup(1000.0, 0.0, 10.0);
        let mut g = GestureController::default();
        g.touch_down(1, at(200.0), &vp, &mut motion);
        g.touch_down(2, at(600.0), &vp, &mut motion);
        let old_inter_index = vp.pos_to_index(400.0, false);

        assert!(g.touch_move(2, at(800.0), Some(at(600.0)), &mut vp, &mut motion));
        assert!((vp.scale() - 150.0).abs() < EPS);
        assert!((vp.pos_to_index(500.0, false) - old_inter_index).abs() < EPS);
        assert!((vp.index_1() - vp.index_0() - 1000.0 / 150.0).abs() < EPS);
        assert!(motion.engine().is_manual());
    }

    #[test]
    fn pinch_scale_is_clamped_consistently() {
        let (mut vp, mut motion) = setup(1000.0, 0.0, 10.0);
        let mut g = GestureController::new(GestureSettings {
            scale_max: 120.0,
            ..GestureSettings::default()
        });
        g.touch_down(1, at(200.0), &vp, &mut motion);
        g.touch_down(2, at(600.0), &vp, &mut motion);
        let old_inter_index = vp.pos_to_index(400.0, false);
        g.touch_move(2, at(800.0), Some(at(600.0)), &mut vp, &mut motion);

        assert_eq!(vp.scale(), 120.0);
        assert!((vp.pos_to_index(500.0, false) - old_inter_index).abs() < EPS);
        assert!((vp.index_1() - vp.index_0() - 1000.0 / 120.0).abs() < EPS);
    }

    #[test]
    fn zero_separation_is_a_no_op() {
        let (mut vp, mut motion) = setup(1000.0, 0.0, 10.0);
        let mut g = GestureController::default();
        g.touch_down(1, at(200.0), &vp, &mut motion);
        g.touch_down(2, at(600.0), &vp, &mut motion);
        // Reported previous position coincides with the anchor.
        g.touch_move(2, at(700.0), Some(at(200.0)), &mut vp, &mut motion);
        assert_eq!((vp.index_0(), vp.index_1()), (0.0, 10.0));
    }

    #[test]
    fn secondary_touch_does_not_zoom() {
        let (mut vp, mut motion) = setup(1000.0, 0.0, 10.0);
        let mut g = GestureController::default();
        g.touch_down(1, at(100.0), &vp, &mut motion);
        g.touch_down(2, at(900.0), &vp, &mut motion);
        g.touch_down(3, at(500.0), &vp, &mut motion);
        // Touch 3 is not part of the widest pair.
        g.touch_move(3, at(550.0), Some(at(500.0)), &mut vp, &mut motion);
        assert_eq!((vp.index_0(), vp.index_1()), (0.0, 10.0));
    }

    #[test]
    fn disabled_zoom_ignores_pinches() {
        let (mut vp, mut motion) = setup(1000.0, 0.0, 10.0);
        let mut g = GestureController::new(GestureSettings {
            zoomable: false,
            ..GestureSettings::default()
        });
        g.touch_down(1, at(200.0), &vp, &mut motion);
        g.touch_down(2, at(600.0), &vp, &mut motion);
        g.touch_move(2, at(800.0), Some(at(600.0)), &mut vp, &mut motion);
        assert_eq!(vp.scale(), 100.0);
    }

    #[test]
    fn two_finger_pan_averages_the_moves() {
        let (mut vp, mut motion) = setup(500.0, 0.0, 10.0);
        let mut g = GestureController::new(GestureSettings {
            translation_touches: 2,
            zoomable: false,
            ..GestureSettings::default()
        });
        g.touch_down(1, at(100.0), &vp, &mut motion);
        // One finger is not enough to pan.
        g.touch_move(1, at(150.0), None, &mut vp, &mut motion);
        assert_eq!((vp.index_0(), vp.index_1()), (0.0, 10.0));

        g.touch_down(2, at(300.0), &vp, &mut motion);
        g.touch_move(1, at(250.0), None, &mut vp, &mut motion);
        g.touch_move(2, at(400.0), None, &mut vp, &mut motion);
        // 100px per finger, halved per move, at 50px per index.
        assert!((vp.index_0() + 2.0).abs() < EPS, "i0 {}", vp.index_0());
        assert!((vp.index_1() - 8.0).abs() < EPS, "i1 {}", vp.index_1());
        assert_eq!(vp.scale(), 50.0);
    }

    #[test]
    fn untracked_ids_are_ignored() {
        let (mut vp, mut motion) = setup(500.0, 0.0, 10.0);
        let mut g = GestureController::default();
        assert!(!g.touch_move(9, at(10.0), None, &mut vp, &mut motion));
        assert!(!g.touch_up(9, &mut vp, &mut motion));

        g.touch_down(1, at(100.0), &vp, &mut motion);
        assert!(g.touch_up(1, &mut vp, &mut motion));
        assert!(!g.touch_up(1, &mut vp, &mut motion));
        assert_eq!(g.active_touches(), 0);
    }

    #[test]
    fn touches_outside_bounds_are_not_grabbed() {
        let (vp, mut motion) = setup(500.0, 0.0, 10.0);
        let mut g = GestureController::default();
        assert!(!g.touch_down(1, Point::new(100.0, 100.0), &vp, &mut motion));
        assert!(!g.is_tracking(1));
    }

    #[test]
    fn second_touch_cancels_momentum() {
        let (vp, mut motion) = setup(500.0, 0.0, 10.0);
        let mut g = GestureController::default();
        g.touch_down(1, at(100.0), &vp, &mut motion);
        assert!(motion.engine().is_manual());
        g.touch_down(2, at(300.0), &vp, &mut motion);
        assert!(!motion.in_motion());
    }

    #[test]
    fn events_decode_from_json() {
        let json = r#"{"id":3,"phase":"Move","pos":{"x":1.0,"y":2.0}}"#;
        let event: TouchEvent =
            serde_json::from_str(json).unwrap_or(TouchEvent::down(0, Point::default()));
        assert_eq!(event, TouchEvent::moved(3, Point::new(1.0, 2.0)));
    }
}
