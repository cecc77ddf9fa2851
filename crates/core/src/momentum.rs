//! Kinetic scrolling of the centre index.
//!
//! The gesture controller never moves the range itself while panning: it
//! feeds target centre indices to a [`Momentum`] engine, and the tickline
//! follows the engine's [`value`](Momentum::value). After release the engine
//! keeps moving the value on its own as frames advance.

use std::collections::VecDeque;

use crate::viewport::Viewport;

/// Contract between the tickline and a kinetic scroll engine. All values are
/// in global index units; time advances only through [`advance`](Self::advance).
pub trait Momentum {
    /// Begin manual tracking at `value`, dropping any velocity.
    fn start(&mut self, value: f64);
    /// Move the manual target to `value`.
    fn update(&mut self, value: f64);
    /// End manual tracking at `value` and fling with the recent velocity.
    fn stop(&mut self, value: f64);
    /// Drop velocity and manual control.
    fn cancel(&mut self);
    fn set_bounds(&mut self, min: f64, max: f64);
    /// Overwrite the value without touching velocity or history.
    fn set_value(&mut self, value: f64);
    fn value(&self) -> f64;
    fn velocity(&self) -> f64;
    fn is_manual(&self) -> bool;
    fn set_manual(&mut self, manual: bool);
    fn tune(&mut self, tuning: MomentumTuning);
    /// Step the simulation by `dt` seconds.
    fn advance(&mut self, dt: f64);
}

/// Thresholds expressed in index units. They depend on the current scale
/// because the engine only sees indices while users think in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MomentumTuning {
    /// Total manual travel at or below which a release does not fling.
    pub drag_threshold: f64,
    /// Manual steps shorter than this kill the velocity.
    pub min_distance: f64,
    /// Below this speed the engine comes to rest.
    pub min_velocity: f64,
    /// Overscroll smaller than this is snapped away.
    pub min_overscroll: f64,
}

impl MomentumTuning {
    pub fn for_scale(drag_threshold_px: f64, scale: f64) -> Self {
        Self {
            drag_threshold: drag_threshold_px / scale,
            min_distance: 0.1 / scale,
            min_velocity: 0.1 / scale,
            min_overscroll: 0.5 / scale,
        }
    }
}

impl Default for MomentumTuning {
    fn default() -> Self {
        Self {
            drag_threshold: 20.0,
            min_distance: 0.1,
            min_velocity: 0.5,
            min_overscroll: 0.5,
        }
    }
}

/// A momentum engine bound to a viewport's centre index.
///
/// [`follow`](Self::follow) is the value-changed notification: it moves the
/// range only when the engine's value differs from the last one observed, so
/// a centre index that cannot represent the value exactly does not cause a
/// translation on every frame.
#[derive(Debug, Clone)]
pub struct Motion<M> {
    engine: M,
    observed: f64,
}

impl<M: Momentum> Motion<M> {
    pub fn new(engine: M) -> Self {
        let observed = engine.value();
        Self { engine, observed }
    }

    pub fn engine(&self) -> &M {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut M {
        &mut self.engine
    }

    /// Translate `viewport` so its centre matches a changed engine value.
    /// Returns whether the range moved.
    pub fn follow(&mut self, viewport: &mut Viewport) -> bool {
        let value = self.engine.value();
        if value == self.observed || !value.is_finite() {
            return false;
        }
        self.observed = value;
        let revision = viewport.revision();
        viewport.translate_by(value - viewport.index_mid());
        viewport.revision() != revision
    }

    /// Re-seat the engine on the viewport: bounds from the index limits,
    /// value from the current centre.
    pub fn calibrate(&mut self, viewport: &Viewport) {
        self.engine.set_bounds(viewport.min_index(), viewport.max_index());
        self.engine.set_value(viewport.index_mid());
        self.observed = self.engine.value();
    }

    pub fn in_motion(&self) -> bool {
        self.engine.velocity() != 0.0 || self.engine.is_manual()
    }
}

const MAX_HISTORY: usize = 5;
/// Samples younger than this are too fresh to estimate release velocity.
const VELOCITY_WINDOW: f64 = 10.0 / 60.0;

/// Friction-decelerated scroll that springs back when carried past its
/// bounds.
#[derive(Debug, Clone)]
pub struct DampedScroll {
    pub friction: f64,
    /// Reference frame duration the friction is calibrated against.
    pub std_dt: f64,
    pub spring_constant: f64,
    pub edge_damping: f64,
    tuning: MomentumTuning,
    min: f64,
    max: f64,
    value: f64,
    velocity: f64,
    overscroll: f64,
    is_manual: bool,
    displacement: f64,
    history: VecDeque<(f64, f64)>,
    clock: f64,
    wake: bool,
}

impl Default for DampedScroll {
    fn default() -> Self {
        Self {
            friction: 0.05,
            std_dt: 0.017,
            spring_constant: 2.0,
            edge_damping: 0.25,
            tuning: MomentumTuning::default(),
            min: f64::NEG_INFINITY,
            max: f64::INFINITY,
            value: 0.0,
            velocity: 0.0,
            overscroll: 0.0,
            is_manual: false,
            displacement: 0.0,
            history: VecDeque::with_capacity(MAX_HISTORY + 1),
            clock: 0.0,
            wake: false,
        }
    }
}

impl DampedScroll {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn overscroll(&self) -> f64 {
        self.overscroll
    }

    pub fn tuning(&self) -> MomentumTuning {
        self.tuning
    }

    fn last_sample(&self) -> f64 {
        self.history.back().map_or(self.value, |&(_, v)| v)
    }

    /// Bounds in ascending order.
    fn limits(&self) -> (f64, f64) {
        if self.min > self.max {
            (self.max, self.min)
        } else {
            (self.min, self.max)
        }
    }

    fn set_value_inner(&mut self, value: f64) {
        self.value = value;
        let (lo, hi) = self.limits();
        let overscroll = if value < lo {
            value - lo
        } else if value > hi {
            value - hi
        } else {
            0.0
        };
        if overscroll != self.overscroll {
            self.overscroll = overscroll;
            self.wake = true;
        }
    }

    fn apply_distance(&mut self, distance: f64) {
        if distance.abs() < self.tuning.min_distance {
            self.velocity = 0.0;
        }
        self.set_value_inner(self.value + distance);
    }

    fn push_sample(&mut self, value: f64) {
        self.history.push_back((self.clock, value));
        if self.history.len() > MAX_HISTORY {
            self.history.pop_front();
        }
    }

    fn update_velocity(&mut self, dt: f64) {
        if self.velocity.abs() <= self.tuning.min_velocity && self.overscroll == 0.0 {
            self.velocity = 0.0;
            return;
        }

        let (lo, hi) = self.limits();
        let side = self.overscroll.signum();
        let edge = if self.overscroll > 0.0 { hi } else { lo };
        let small = self.overscroll.abs() <= self.tuning.min_overscroll;

        // Nearly at rest just outside the bounds: settle on the edge.
        if !self.is_manual
            && self.overscroll != 0.0
            && small
            && self.velocity.abs() <= self.tuning.min_velocity
        {
            self.set_value_inner(edge);
            self.velocity = 0.0;
            return;
        }

        // Heading back inside from an overscroll: stop exactly on the edge.
        let returning = !self.is_manual && self.overscroll * self.velocity < 0.0;

        let mut force = self.velocity * self.friction * dt / self.std_dt;
        if !small {
            force += self.velocity * self.edge_damping;
            force += self.overscroll * self.spring_constant;
        }

        self.velocity -= force;
        if !self.is_manual {
            self.apply_distance(self.velocity * dt);
            if returning && (self.value - edge) * side <= 0.0 {
                self.set_value_inner(edge);
                self.velocity = 0.0;
                return;
            }
        }
        self.wake = true;
    }
}

impl Momentum for DampedScroll {
    fn start(&mut self, value: f64) {
        self.is_manual = true;
        self.velocity = 0.0;
        self.displacement = 0.0;
        self.history.clear();
        self.push_sample(value);
    }

    fn update(&mut self, value: f64) {
        let distance = value - self.last_sample();
        self.displacement += distance.abs();
        if distance.abs() < self.tuning.min_distance {
            self.velocity = 0.0;
        }
        self.set_value_inner(value);
        self.push_sample(value);
    }

    fn stop(&mut self, value: f64) {
        self.is_manual = false;
        if self.displacement <= self.tuning.drag_threshold {
            self.velocity = 0.0;
            self.wake = self.overscroll != 0.0;
            return;
        }
        let distance = value - self.last_sample();
        self.apply_distance(distance);

        let newest = (self.clock, value);
        let mut oldest = self.history.front().copied().unwrap_or(newest);
        for &sample in &self.history {
            if newest.0 - sample.0 < VELOCITY_WINDOW {
                break;
            }
            oldest = sample;
        }
        let duration = (newest.0 - oldest.0).abs();
        self.velocity = (newest.1 - oldest.1) / duration.max(1e-4);
        self.wake = true;
    }

    fn cancel(&mut self) {
        self.is_manual = false;
        self.velocity = 0.0;
    }

    fn set_bounds(&mut self, min: f64, max: f64) {
        self.min = min;
        self.max = max;
        self.set_value_inner(self.value);
    }

    fn set_value(&mut self, value: f64) {
        self.set_value_inner(value);
    }

    fn value(&self) -> f64 {
        self.value
    }

    fn velocity(&self) -> f64 {
        self.velocity
    }

    fn is_manual(&self) -> bool {
        self.is_manual
    }

    fn set_manual(&mut self, manual: bool) {
        self.is_manual = manual;
    }

    fn tune(&mut self, tuning: MomentumTuning) {
        self.tuning = tuning;
    }

    fn advance(&mut self, dt: f64) {
        self.clock += dt;
        if std::mem::take(&mut self.wake) {
            self.update_velocity(dt);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: f64 = 1.0 / 60.0;

    fn tuned(scale: f64) -> DampedScroll {
        let mut m = DampedScroll::new();
        m.tune(MomentumTuning::for_scale(20.0, scale));
        m
    }

    fn drag(m: &mut DampedScroll, from: f64, step: f64, frames: usize) -> f64 {
        m.start(from);
        let mut v = from;
        for _ in 0..frames {
            m.advance(FRAME);
            v += step;
            m.update(v);
        }
        v
    }

    #[test]
    fn tuning_scales_with_zoom() {
        let t = MomentumTuning::for_scale(20.0, 50.0);
        assert!((t.drag_threshold - 0.4).abs() < 1e-12);
        assert!((t.min_distance - 0.002).abs() < 1e-12);
        assert!((t.min_velocity - 0.002).abs() < 1e-12);
        assert!((t.min_overscroll - 0.01).abs() < 1e-12);
    }

    #[test]
    fn manual_updates_set_value() {
        let mut m = tuned(50.0);
        drag(&mut m, 5.0, -0.5, 4);
        assert!(m.is_manual());
        assert_eq!(m.value(), 3.0);
        assert_eq!(m.velocity(), 0.0);
    }

    #[test]
    fn short_drag_does_not_fling() {
        let mut m = tuned(50.0);
        // 0.3 index of travel is 15px, below the 20px threshold.
        let end = drag(&mut m, 5.0, 0.1, 3);
        m.stop(end);
        assert!(!m.is_manual());
        assert_eq!(m.velocity(), 0.0);
        m.advance(FRAME);
        assert_eq!(m.value(), end);
    }

    #[test]
    fn release_flings_and_decays() {
        let mut m = tuned(50.0);
        let end = drag(&mut m, 0.0, 1.0, 12);
        m.stop(end);
        let v0 = m.velocity();
        assert!(v0 > 0.0, "velocity {v0}");

        let mut last = m.value();
        let mut frames = 0;
        while m.velocity() != 0.0 && frames < 10_000 {
            m.advance(FRAME);
            assert!(m.value() >= last);
            last = m.value();
            frames += 1;
        }
        assert!(frames < 10_000, "never came to rest");
        assert!(last > end);
    }

    #[test]
    fn cancel_drops_velocity() {
        let mut m = tuned(50.0);
        let end = drag(&mut m, 0.0, 1.0, 12);
        m.stop(end);
        m.cancel();
        assert_eq!(m.velocity(), 0.0);
        assert!(!m.is_manual());
    }

    #[test]
    fn overscroll_springs_back_to_edge() {
        let mut m = tuned(50.0);
        m.set_bounds(0.0, 10.0);
        m.set_value(12.0);
        assert_eq!(m.overscroll(), 2.0);
        for _ in 0..2_000 {
            m.advance(FRAME);
        }
        assert!((m.value() - 10.0).abs() < 0.01, "value {}", m.value());
        assert_eq!(m.velocity(), 0.0);
    }

    #[test]
    fn slight_overscroll_settles_exactly_on_the_edge() {
        let mut m = tuned(50.0);
        m.set_bounds(0.0, 10.0);
        m.set_value(-0.004);
        m.advance(FRAME);
        assert_eq!(m.value(), 0.0);
        assert_eq!(m.overscroll(), 0.0);
        assert_eq!(m.velocity(), 0.0);
    }

    #[test]
    fn fling_past_the_edge_comes_back_to_it() {
        let mut m = tuned(50.0);
        m.set_bounds(0.0, 10.0);
        m.set_value(5.0);
        let end = drag(&mut m, 5.0, 0.5, 12);
        m.stop(end);
        let mut peak = m.value();
        for _ in 0..2_000 {
            m.advance(FRAME);
            peak = peak.max(m.value());
        }
        assert!(peak > 10.0, "never overscrolled, peak {peak}");
        assert_eq!(m.value(), 10.0);
        assert_eq!(m.velocity(), 0.0);
    }

    #[test]
    fn motion_follows_value_changes_only() {
        use crate::viewport::Orientation;
        use tickline_protocol::Rect;

        let mut vp = Viewport::new(Rect::new(0.0, 0.0, 30.0, 500.0), Orientation::Vertical, 0.0, 10.0);
        let mut motion = Motion::new(tuned(50.0));
        motion.calibrate(&vp);
        assert_eq!(motion.engine().value(), 5.0);
        assert!(!motion.follow(&mut vp));

        motion.engine_mut().start(5.0);
        motion.engine_mut().update(3.0);
        assert!(motion.follow(&mut vp));
        assert_eq!((vp.index_0(), vp.index_1()), (-2.0, 8.0));
        assert!(motion.in_motion());
        // No new value, no movement.
        assert!(!motion.follow(&mut vp));
    }

    #[test]
    fn inverted_bounds_are_normalised() {
        let mut m = DampedScroll::new();
        m.set_bounds(10.0, 0.0);
        m.set_value(5.0);
        assert_eq!(m.overscroll(), 0.0);
        m.set_value(-1.0);
        assert_eq!(m.overscroll(), -1.0);
    }
}
