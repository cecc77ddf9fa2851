//! The tickline widget state: viewport, tiers, gestures and momentum, with
//! frame-coalesced redraw and calibration.

use log::{debug, trace};
use tickline_protocol::{Paint, Point, Rect, RenderCommand, SharedStr};

use crate::config::{TickConfig, TicklineConfig};
use crate::error::ConfigError;
use crate::gesture::{GestureController, GestureSettings, TouchEvent};
use crate::labels::{LabelContext, LabelStrategy};
use crate::momentum::{DampedScroll, Momentum, MomentumTuning, Motion};
use crate::schedule::Trigger;
use crate::text::TextMeasure;
use crate::tick::{AxisFrame, Tick};
use crate::viewport::{IndexOverride, Orientation, Viewport};

/// Last observed values of the inputs that drive deferred work.
#[derive(Debug, Clone, Copy)]
struct Seen {
    revision: u64,
    scale: f64,
    /// `(index_mid, min_index, max_index, pos0)`
    calibration: (f64, f64, f64, f64),
}

impl Seen {
    fn of(viewport: &Viewport) -> Self {
        Self {
            revision: viewport.revision(),
            scale: viewport.scale(),
            calibration: calibration_inputs(viewport),
        }
    }
}

fn calibration_inputs(viewport: &Viewport) -> (f64, f64, f64, f64) {
    (
        viewport.index_mid(),
        viewport.min_index(),
        viewport.max_index(),
        viewport.pos0(),
    )
}

/// A zoomable, pannable ruler.
///
/// Setters only record state and request work; [`frame`](Self::frame) runs
/// the momentum engine, recalibrates it and redraws, each at most once.
#[derive(Debug)]
pub struct Tickline<M = DampedScroll> {
    viewport: Viewport,
    ticks: Vec<Tick>,
    /// `(scale_factor * min_space, tick position)`, ascending.
    tolerances: Vec<(f64, usize)>,
    densest: Option<usize>,
    labelling: LabelStrategy,
    gestures: GestureController,
    motion: Motion<M>,
    draw_line: bool,
    line_width: f64,
    line_offset: f64,
    line_color: Paint,
    background_color: Paint,
    drag_threshold: f64,
    label_padding: f64,
    redraw: Trigger,
    calibrate: Trigger,
    seen: Seen,
}

impl Tickline<DampedScroll> {
    pub fn new(config: TicklineConfig) -> Result<Self, ConfigError> {
        Self::with_momentum(config, DampedScroll::new())
    }
}

impl<M: Momentum> Tickline<M> {
    pub fn with_momentum(config: TicklineConfig, engine: M) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut viewport =
            Viewport::new(config.bounds, config.orientation, config.index_0, config.index_1);
        viewport.set_backward(config.backward);
        viewport.set_index_limits(config.min_index(), config.max_index());
        let ticks = config
            .ticks
            .iter()
            .cloned()
            .map(TickConfig::into_tick)
            .collect();
        Ok(Self::assemble(config, viewport, ticks, engine))
    }

    fn assemble(config: TicklineConfig, viewport: Viewport, ticks: Vec<Tick>, engine: M) -> Self {
        let gestures = GestureController::new(GestureSettings {
            translation_touches: config.translation_touches,
            zoomable: config.zoomable,
            scale_min: config.scale_min,
            scale_max: config.scale_max(),
        });
        let mut tickline = Self {
            seen: Seen::of(&viewport),
            viewport,
            ticks,
            tolerances: Vec::new(),
            densest: None,
            labelling: config.labelling,
            gestures,
            motion: Motion::new(engine),
            draw_line: config.draw_line,
            line_width: config.line_width,
            line_offset: config.line_offset,
            line_color: config.line_color,
            background_color: config.background_color,
            drag_threshold: config.drag_threshold,
            label_padding: config.tick_label_padding,
            redraw: Trigger::new(),
            calibrate: Trigger::new(),
        };
        tickline.update_tolerances();
        tickline.tune_momentum();
        tickline.motion.calibrate(&tickline.viewport);
        tickline.redraw.request();
        tickline
    }

    // --- State ---

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn ticks(&self) -> &[Tick] {
        &self.ticks
    }

    pub fn tick(&self, position: usize) -> Option<&Tick> {
        self.ticks.get(position)
    }

    /// The tier that sets the off-screen margin at the current scale.
    pub fn densest_tick(&self) -> Option<&Tick> {
        self.densest.and_then(|i| self.ticks.get(i))
    }

    pub fn momentum(&self) -> &M {
        self.motion.engine()
    }

    pub fn gestures(&self) -> &GestureController {
        &self.gestures
    }

    pub fn labelling(&self) -> &LabelStrategy {
        &self.labelling
    }

    pub fn index_0(&self) -> f64 {
        self.viewport.index_0()
    }

    pub fn index_1(&self) -> f64 {
        self.viewport.index_1()
    }

    pub fn index_mid(&self) -> f64 {
        self.viewport.index_mid()
    }

    pub fn scale(&self) -> f64 {
        self.viewport.scale()
    }

    /// Whether the range is being dragged or is still coasting.
    pub fn in_motion(&self) -> bool {
        self.motion.in_motion()
    }

    pub fn redraw_count(&self) -> u64 {
        self.redraw.runs()
    }

    pub fn calibration_count(&self) -> u64 {
        self.calibrate.runs()
    }

    pub fn is_redraw_pending(&self) -> bool {
        self.redraw.is_pending()
    }

    pub fn pos_to_index(&self, pixel: f64, window: bool) -> f64 {
        self.viewport.pos_to_index(pixel, window)
    }

    pub fn index_to_pos(&self, index: f64) -> f64 {
        self.viewport.index_to_pos(index)
    }

    pub fn index_to_pos_with(&self, index: f64, over: IndexOverride) -> f64 {
        self.viewport.index_to_pos_with(index, over)
    }

    /// Cross-axis window coordinate of the centre line.
    pub fn line_pos(&self) -> f64 {
        let centre = self.viewport.bounds().center();
        let base = match self.viewport.orientation() {
            Orientation::Vertical => centre.x,
            Orientation::Horizontal => centre.y,
        };
        base + self.line_offset
    }

    /// `(min, max)` scales outside of which no tier has anything useful to
    /// show: below `min` even the coarsest tier is suppressed, above `max`
    /// the finest tier has at most one mark on screen.
    pub fn natural_scale_limits(&self) -> Option<(f64, f64)> {
        let extent = self.viewport.extent();
        let min = self
            .ticks
            .iter()
            .map(|t| t.min_space * t.scale_factor)
            .reduce(f64::min)?;
        let max = self
            .ticks
            .iter()
            .map(|t| extent * t.scale_factor)
            .reduce(f64::max)?;
        Some((min, max))
    }

    // --- Transform mutation ---

    pub fn set_index_0(&mut self, index_0: f64) {
        self.viewport.set_index_0(index_0);
        self.observe();
    }

    pub fn set_index_1(&mut self, index_1: f64) {
        self.viewport.set_index_1(index_1);
        self.observe();
    }

    pub fn set_index_range(&mut self, index_0: f64, index_1: f64) {
        self.viewport.set_index_range(index_0, index_1);
        self.observe();
    }

    pub fn set_index_mid(&mut self, mid: f64) {
        self.viewport.set_index_mid(mid);
        self.observe();
    }

    pub fn translate_by(&mut self, delta: f64) {
        self.viewport.translate_by(delta);
        self.observe();
    }

    pub fn set_scale(&mut self, scale: f64) {
        self.viewport.set_scale(scale);
        self.observe();
    }

    /// Zoom by `ratio` around the window coordinate `pixel` along the axis,
    /// keeping the index under it in place. The result is clamped to the
    /// configured zoom range.
    pub fn zoom_by(&mut self, ratio: f64, pixel: f64) {
        if !(ratio.is_finite() && ratio > 0.0) {
            return;
        }
        let scale = self
            .gestures
            .settings()
            .clamp_scale(self.viewport.scale() * ratio);
        if !(scale.is_finite() && scale > 0.0) {
            return;
        }
        let at = pixel - self.viewport.pos0();
        let pinned = self.viewport.pos_to_index(at, false);
        self.motion.engine_mut().cancel();
        self.viewport.rescale_about(pinned, at, scale);
        self.observe();
    }

    pub fn set_bounds(&mut self, bounds: Rect) {
        self.viewport.set_bounds(bounds);
        self.observe();
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.viewport.set_orientation(orientation);
        self.observe();
    }

    pub fn set_backward(&mut self, backward: bool) {
        self.viewport.set_backward(backward);
        self.observe();
    }

    pub fn set_index_limits(&mut self, min_index: f64, max_index: f64) -> Result<(), ConfigError> {
        if min_index.is_nan() || max_index.is_nan() || min_index > max_index {
            return Err(ConfigError::IndexLimits {
                min: min_index,
                max: max_index,
            });
        }
        self.viewport.set_index_limits(min_index, max_index);
        self.observe();
        Ok(())
    }

    // --- Appearance ---

    pub fn set_draw_line(&mut self, draw_line: bool) {
        self.draw_line = draw_line;
        self.redraw.request();
    }

    pub fn set_line_width(&mut self, line_width: f64) {
        self.line_width = line_width;
        self.redraw.request();
    }

    pub fn set_line_offset(&mut self, line_offset: f64) {
        self.line_offset = line_offset;
        self.redraw.request();
    }

    /// Move the centre line to the cross-axis window coordinate `pos`.
    pub fn set_line_pos(&mut self, pos: f64) {
        let offset = self.line_offset + pos - self.line_pos();
        self.set_line_offset(offset);
    }

    pub fn set_line_color(&mut self, color: impl Into<Paint>) {
        self.line_color = color.into();
        self.redraw.request();
    }

    pub fn set_background_color(&mut self, color: impl Into<Paint>) {
        self.background_color = color.into();
        self.redraw.request();
    }

    pub fn set_label_padding(&mut self, padding: f64) {
        self.label_padding = padding;
        self.redraw.request();
    }

    pub fn set_labelling(&mut self, labelling: LabelStrategy) {
        self.labelling = labelling;
        self.redraw.request();
    }

    // --- Interaction settings ---

    pub fn set_zoomable(&mut self, zoomable: bool) {
        self.gestures.settings_mut().zoomable = zoomable;
    }

    pub fn set_translation_touches(&mut self, count: usize) -> Result<(), ConfigError> {
        if count < 1 {
            return Err(ConfigError::TranslationTouches(count));
        }
        self.gestures.settings_mut().translation_touches = count;
        Ok(())
    }

    pub fn set_scale_limits(&mut self, scale_min: f64, scale_max: f64) -> Result<(), ConfigError> {
        crate::error::non_negative("scale_min", scale_min)?;
        if scale_max.is_nan() || scale_min > scale_max {
            return Err(ConfigError::ScaleLimits {
                min: scale_min,
                max: scale_max,
            });
        }
        let settings = self.gestures.settings_mut();
        settings.scale_min = scale_min;
        settings.scale_max = scale_max;
        Ok(())
    }

    pub fn set_drag_threshold(&mut self, pixels: f64) {
        self.drag_threshold = pixels;
        self.tune_momentum();
    }

    // --- Tiers ---

    pub fn add_tick(&mut self, tick: Tick) -> Result<usize, ConfigError> {
        tick.validate()?;
        self.ticks.push(tick);
        self.tiers_changed();
        Ok(self.ticks.len() - 1)
    }

    pub fn remove_tick(&mut self, position: usize) -> Result<Tick, ConfigError> {
        if position >= self.ticks.len() {
            return Err(ConfigError::NoSuchTick(position));
        }
        let tick = self.ticks.remove(position);
        self.tiers_changed();
        Ok(tick)
    }

    /// Edit a tier in place. The edit is rolled back if it leaves the tier
    /// invalid.
    pub fn update_tick(
        &mut self,
        position: usize,
        edit: impl FnOnce(&mut Tick),
    ) -> Result<(), ConfigError> {
        let tick = self
            .ticks
            .get_mut(position)
            .ok_or(ConfigError::NoSuchTick(position))?;
        let mut edited = tick.clone();
        edit(&mut edited);
        edited.validate()?;
        *tick = edited;
        self.tiers_changed();
        Ok(())
    }

    pub fn set_ticks(&mut self, ticks: Vec<Tick>) -> Result<(), ConfigError> {
        for tick in &ticks {
            tick.validate()?;
        }
        self.ticks = ticks;
        self.tiers_changed();
        Ok(())
    }

    fn tiers_changed(&mut self) {
        self.update_tolerances();
        self.redraw.request();
    }

    fn update_tolerances(&mut self) {
        self.tolerances = self
            .ticks
            .iter()
            .enumerate()
            .map(|(i, t)| (t.tolerance(), i))
            .collect();
        self.tolerances.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        self.update_densest();
    }

    fn update_densest(&mut self) {
        let scale = self.viewport.scale();
        let visible = self.tolerances.partition_point(|&(tol, _)| tol <= scale);
        self.densest = visible
            .checked_sub(1)
            .and_then(|i| self.tolerances.get(i))
            .map(|&(_, tick)| tick);
    }

    fn tune_momentum(&mut self) {
        let scale = self.viewport.scale();
        if scale.is_finite() && scale > 0.0 {
            self.motion
                .engine_mut()
                .tune(MomentumTuning::for_scale(self.drag_threshold, scale));
        }
    }

    /// Turn viewport changes since the last call into requests for deferred
    /// work.
    fn observe(&mut self) {
        let revision = self.viewport.revision();
        if revision != self.seen.revision {
            self.seen.revision = revision;
            self.redraw.request();
        }

        let scale = self.viewport.scale();
        if scale.to_bits() != self.seen.scale.to_bits() {
            self.seen.scale = scale;
            debug!("scale changed to {scale}");
            self.update_densest();
            self.tune_momentum();
        }

        let calibration = calibration_inputs(&self.viewport);
        if calibration != self.seen.calibration {
            self.seen.calibration = calibration;
            self.calibrate.request();
        }
    }

    // --- Events and frames ---

    /// Feed one touch event. Returns whether the tickline consumed it.
    pub fn handle_touch(&mut self, event: &TouchEvent) -> bool {
        let consumed = self
            .gestures
            .handle(event, &mut self.viewport, &mut self.motion);
        self.observe();
        consumed
    }

    /// Release every touch, e.g. when the host loses focus.
    pub fn cancel_touches(&mut self) {
        self.gestures.reset(&mut self.motion);
    }

    /// Advance one frame: step the momentum engine by `dt` seconds, apply
    /// its value, then run pending calibration and redraw. Returns the new
    /// command list when a redraw ran.
    pub fn frame(&mut self, dt: f64, measure: &dyn TextMeasure) -> Option<Vec<RenderCommand>> {
        self.motion.engine_mut().advance(dt);
        self.motion.follow(&mut self.viewport);
        self.observe();

        if self.calibrate.take() {
            self.motion.calibrate(&self.viewport);
            trace!(
                "calibrated momentum at {} within [{}, {}]",
                self.viewport.index_mid(),
                self.viewport.min_index(),
                self.viewport.max_index()
            );
        }

        self.redraw.take().then(|| self.render(measure))
    }

    /// Produce the full command list for the current state without touching
    /// the redraw schedule.
    pub fn render(&self, measure: &dyn TextMeasure) -> Vec<RenderCommand> {
        let vp = &self.viewport;
        let bounds = vp.bounds();
        let orientation = vp.orientation();
        let mut commands = Vec::with_capacity(64);

        commands.push(RenderCommand::SetClip { rect: bounds });
        commands.push(RenderCommand::DrawRect {
            rect: bounds,
            color: self.background_color,
            border_color: None,
        });

        let line_pos = self.line_pos();
        if self.draw_line {
            let (from, to) = match orientation {
                Orientation::Vertical => (
                    Point::new(line_pos, bounds.y),
                    Point::new(line_pos, bounds.bottom()),
                ),
                Orientation::Horizontal => (
                    Point::new(bounds.x, line_pos),
                    Point::new(bounds.right(), line_pos),
                ),
            };
            commands.push(RenderCommand::DrawLine {
                from,
                to,
                color: self.line_color,
                width: self.line_width,
            });
        }

        let frame = AxisFrame {
            bounds,
            orientation,
            line_pos,
        };
        let ctx = LabelContext {
            orientation,
            padding: self.label_padding,
            scale: vp.scale(),
        };
        let densest = self.densest_tick();
        let mut labeller = self.labelling.build();
        let mut marks = 0usize;

        for (i, tick) in self.ticks.iter().enumerate() {
            let mut iter = tick.ticks(vp, densest).peekable();
            if iter.peek().is_none() {
                continue;
            }
            commands.push(RenderCommand::BeginGroup {
                id: SharedStr::from(format!("tick-{i}")),
                label: None,
            });
            for mark in iter {
                let rect = tick.draw_tick(&frame, mark.pos);
                commands.push(RenderCommand::DrawRect {
                    rect,
                    color: tick.color,
                    border_color: None,
                });
                labeller.register(tick, mark.local_index, rect, &ctx, measure);
                marks += 1;
            }
            commands.push(RenderCommand::EndGroup);
        }

        labeller.finalize(&mut commands);
        commands.push(RenderCommand::ClearClip);
        trace!(
            "redraw [{}, {}] at scale {}: {marks} marks, {} commands",
            vp.index_0(),
            vp.index_1(),
            vp.scale(),
            commands.len()
        );
        commands
    }
}

#[cfg(test)]
mod tests {
    use tickline_protocol::ThemeToken;

    use super::*;
    use crate::text::MonospaceMeasure;
    use crate::tick::{HAlign, TickVariant};

    const MEASURE: MonospaceMeasure = MonospaceMeasure {
        advance: 0.6,
        line_height: 1.2,
    };

    fn vertical(extent: f64, ticks: Vec<Tick>) -> Tickline {
        let config = TicklineConfig {
            bounds: Rect::new(0.0, 0.0, 60.0, extent),
            ..TicklineConfig::default()
        };
        let mut tickline = Tickline::new(config).expect("valid config");
        tickline.set_ticks(ticks).expect("valid ticks");
        tickline
    }

    fn texts(commands: &[RenderCommand]) -> Vec<String> {
        commands
            .iter()
            .filter_map(|c| match c {
                RenderCommand::DrawText { text, .. } => Some(text.to_string()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn mutations_in_one_turn_redraw_once() {
        let mut tl = vertical(500.0, vec![Tick::regular()]);
        assert!(tl.frame(0.016, &MEASURE).is_some());
        let before = tl.redraw_count();

        for i in 0..25 {
            tl.set_index_0(f64::from(i) * 0.1);
        }
        assert_eq!(tl.redraw_count(), before);
        assert!(tl.frame(0.016, &MEASURE).is_some());
        assert_eq!(tl.redraw_count(), before + 1);
        assert!(tl.frame(0.016, &MEASURE).is_none());
        assert_eq!(tl.redraw_count(), before + 1);
    }

    #[test]
    fn densest_tick_tracks_scale() {
        let mut tl = vertical(
            500.0,
            vec![
                Tick::regular(),
                Tick::regular().with_scale_factor(10.0),
                Tick::regular().with_scale_factor(100.0),
            ],
        );
        assert_eq!(tl.densest_tick().map(|t| t.scale_factor), Some(1.0));
        tl.set_scale(150.0);
        assert_eq!(tl.densest_tick().map(|t| t.scale_factor), Some(10.0));
        tl.set_scale(5.0);
        assert!(tl.densest_tick().is_none());
    }

    #[test]
    fn redraw_layers_background_line_ticks_labels() {
        let mut tl = vertical(500.0, vec![Tick::regular(), Tick::labelless().with_scale_factor(5.0)]);
        let commands = tl.frame(0.0, &MEASURE).unwrap_or_default();

        assert!(matches!(commands.first(), Some(RenderCommand::SetClip { .. })));
        assert!(matches!(
            commands.get(1),
            Some(RenderCommand::DrawRect { rect, .. }) if *rect == Rect::new(0.0, 0.0, 60.0, 500.0)
        ));
        assert!(matches!(
            commands.get(2),
            Some(RenderCommand::DrawLine { from, to, width, .. })
                if *from == Point::new(30.0, 0.0) && *to == Point::new(30.0, 500.0) && *width == 4.0
        ));
        assert!(matches!(commands.last(), Some(RenderCommand::ClearClip)));

        let groups = commands
            .iter()
            .filter(|c| matches!(c, RenderCommand::BeginGroup { .. }))
            .count();
        assert_eq!(groups, 2);
        // The labelless tier is densest, so the regular tier gets no margin
        // marks: 0..=10, all labelled at scale 50.
        assert_eq!(texts(&commands).len(), 11);
    }

    #[test]
    fn coarse_labels_win_shared_slots() {
        let mut tl = vertical(
            1000.0,
            vec![Tick::regular(), Tick::regular().with_scale_factor(2.0)],
        );
        let labels = texts(&tl.frame(0.0, &MEASURE).unwrap_or_default());
        let count = |s: &str| labels.iter().filter(|l| l.as_str() == s).count();
        assert_eq!(labels.len(), 23);
        assert_eq!(count("2"), 1);
        assert_eq!(count("1"), 2);
        assert_eq!(count("-1"), 1);
    }

    #[test]
    fn per_variant_labelling_separates_tiers() {
        let data = Tick::data_list(vec![0.0, 2.0, 4.0]).with_halign(HAlign::Left);
        let mut tl = vertical(1000.0, vec![Tick::regular(), data]);
        // Equal priority: the tier registered first keeps the slot.
        let labels = texts(&tl.frame(0.0, &MEASURE).unwrap_or_default());
        assert_eq!(labels.len(), 13);

        tl.set_labelling(LabelStrategy::PerVariant(vec![
            vec![TickVariant::Regular],
            vec![TickVariant::DataList],
        ]));
        let labels = texts(&tl.frame(0.0, &MEASURE).unwrap_or_default());
        assert_eq!(labels.len(), 16);
    }

    #[test]
    fn hidden_line_is_not_drawn() {
        let mut tl = vertical(500.0, Vec::new());
        tl.set_draw_line(false);
        let commands = tl.frame(0.0, &MEASURE).unwrap_or_default();
        assert!(!commands.iter().any(|c| matches!(c, RenderCommand::DrawLine { .. })));
        assert_eq!(commands.len(), 3);
    }

    #[test]
    fn line_pos_moves_with_offset() {
        let mut tl = vertical(500.0, Vec::new());
        assert_eq!(tl.line_pos(), 30.0);
        tl.set_line_pos(12.0);
        assert_eq!(tl.line_pos(), 12.0);
        tl.set_line_color(ThemeToken::CenterLine);
        let commands = tl.frame(0.0, &MEASURE).unwrap_or_default();
        assert!(commands.iter().any(|c| matches!(
            c,
            RenderCommand::DrawLine { from, color, .. }
                if from.x == 12.0 && *color == Paint::Theme(ThemeToken::CenterLine)
        )));
    }

    #[test]
    fn backward_swaps_range() {
        let mut tl = vertical(500.0, Vec::new());
        tl.set_backward(true);
        assert_eq!((tl.index_0(), tl.index_1()), (10.0, 0.0));
        assert!((tl.pos_to_index(0.0, true) - 10.0).abs() < 1e-9);
        tl.set_backward(false);
        assert_eq!((tl.index_0(), tl.index_1()), (0.0, 10.0));
    }

    #[test]
    fn zoom_by_pins_index_under_pixel() {
        let mut tl = vertical(500.0, Vec::new());
        let pinned = tl.pos_to_index(100.0, true);
        tl.zoom_by(2.0, 100.0);
        assert_eq!(tl.scale(), 100.0);
        assert!((tl.pos_to_index(100.0, true) - pinned).abs() < 1e-9);

        tl.set_scale_limits(0.0, 150.0).expect("valid limits");
        tl.zoom_by(4.0, 100.0);
        assert_eq!(tl.scale(), 150.0);
        assert!((tl.pos_to_index(100.0, true) - pinned).abs() < 1e-9);
    }

    #[test]
    fn natural_limits_span_all_tiers() {
        let tl = vertical(
            500.0,
            vec![
                Tick::regular().with_min_space(20.0),
                Tick::regular().with_scale_factor(10.0),
            ],
        );
        assert_eq!(tl.natural_scale_limits(), Some((20.0, 5000.0)));
        assert_eq!(vertical(500.0, Vec::new()).natural_scale_limits(), None);
    }

    #[test]
    fn calibration_is_coalesced() {
        let mut tl = vertical(500.0, Vec::new());
        tl.frame(0.0, &MEASURE);
        let before = tl.calibration_count();
        tl.set_index_mid(50.0);
        tl.translate_by(3.0);
        tl.set_index_limits(-100.0, 100.0).expect("valid limits");
        tl.frame(0.0, &MEASURE);
        assert_eq!(tl.calibration_count(), before + 1);
        assert_eq!(tl.momentum().value(), 53.0);
    }

    #[test]
    fn tier_edits_are_validated() {
        let mut tl = vertical(500.0, vec![Tick::regular()]);
        assert!(tl.update_tick(0, |t| t.scale_factor = 0.0).is_err());
        assert_eq!(tl.tick(0).map(|t| t.scale_factor), Some(1.0));
        assert!(tl.update_tick(3, |t| t.offset = 0.5).is_err());
        assert!(tl.remove_tick(0).is_ok());
        assert!(tl.ticks().is_empty());
        assert!(tl.set_translation_touches(0).is_err());
    }
}
