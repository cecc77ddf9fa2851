use eframe::egui;
use log::{debug, info};
use tickline_core::{Orientation, Tickline, TouchEvent, TouchId};
use tickline_protocol::{Point, Rect, RenderCommand};

use crate::renderer::{self, PainterMeasure};
use crate::theme::{self, ThemeMode};

/// Touch id reserved for the mouse, which drives the ruler like one finger.
const MOUSE_TOUCH: TouchId = TouchId::MAX;

/// Wheel points per doubling of the scale.
const WHEEL_POINTS_PER_OCTAVE: f64 = 100.0;

/// Main application state.
pub struct TicklineApp {
    tickline: Tickline,
    /// Range restored by the reset action, and the direction it was read in.
    home: (f64, f64),
    home_backward: bool,
    theme_mode: ThemeMode,
    /// Last command list produced by the tickline; replayed every paint.
    commands: Vec<RenderCommand>,
    /// Screen position of the tickline's origin during the last paint.
    origin: egui::Pos2,
    /// Once real touch events arrive, emulated pointer events are ignored.
    saw_touch: bool,
    mouse_down: bool,
}

impl TicklineApp {
    pub fn new(cc: &eframe::CreationContext<'_>, tickline: Tickline) -> Self {
        let theme_mode = ThemeMode::Dark;
        cc.egui_ctx.set_visuals(theme_mode.visuals());
        theme::apply_typography(&cc.egui_ctx);

        let home = (tickline.index_0(), tickline.index_1());
        let home_backward = tickline.viewport().backward();
        info!("tickline ready with {} tiers", tickline.ticks().len());

        Self {
            tickline,
            home,
            home_backward,
            theme_mode,
            commands: Vec::new(),
            origin: egui::Pos2::ZERO,
            saw_touch: false,
            mouse_down: false,
        }
    }

    fn local(&self, pos: egui::Pos2) -> Point {
        Point::new(
            f64::from(pos.x - self.origin.x),
            f64::from(pos.y - self.origin.y),
        )
    }

    /// Position along the ruler's axis, relative to its bounds.
    fn along(&self, pos: egui::Pos2) -> f64 {
        self.tickline.viewport().along(self.local(pos))
    }

    fn handle_events(&mut self, events: &[egui::Event]) {
        // Touch screens also emit emulated pointer events, sometimes ahead of
        // the touch events of the same frame.
        if !self.saw_touch && events.iter().any(|e| matches!(e, egui::Event::Touch { .. })) {
            self.saw_touch = true;
            if self.mouse_down {
                self.mouse_down = false;
                self.tickline.cancel_touches();
            }
        }
        for event in events {
            match event {
                egui::Event::Touch { id, phase, pos, .. } => {
                    let at = self.local(*pos);
                    match phase {
                        egui::TouchPhase::Start => {
                            self.tickline.handle_touch(&TouchEvent::down(id.0, at));
                        }
                        egui::TouchPhase::Move => {
                            self.tickline.handle_touch(&TouchEvent::moved(id.0, at));
                        }
                        egui::TouchPhase::End => {
                            self.tickline.handle_touch(&TouchEvent::up(id.0, at));
                        }
                        egui::TouchPhase::Cancel => self.tickline.cancel_touches(),
                    }
                }
                egui::Event::PointerButton {
                    pos,
                    button: egui::PointerButton::Primary,
                    pressed,
                    ..
                } if !self.saw_touch => {
                    let at = self.local(*pos);
                    if *pressed {
                        self.mouse_down = self.tickline.handle_touch(&TouchEvent::down(MOUSE_TOUCH, at));
                    } else if self.mouse_down {
                        self.mouse_down = false;
                        self.tickline.handle_touch(&TouchEvent::up(MOUSE_TOUCH, at));
                    }
                }
                egui::Event::PointerMoved(pos) if self.mouse_down && !self.saw_touch => {
                    let at = self.local(*pos);
                    self.tickline.handle_touch(&TouchEvent::moved(MOUSE_TOUCH, at));
                }
                egui::Event::PointerGone if self.mouse_down => {
                    self.mouse_down = false;
                    self.tickline.cancel_touches();
                }
                _ => {}
            }
        }
    }

    fn handle_wheel_and_keys(&mut self, ui: &egui::Ui, available: egui::Rect) {
        let hover = ui.input(|i| i.pointer.hover_pos());
        let pivot = hover
            .filter(|p| available.contains(*p))
            .map_or_else(|| self.along(available.center()), |p| self.along(p));

        // Scroll wheel = zoom around the pointer
        let scroll = ui.input(|i| i.smooth_scroll_delta);
        if scroll.y.abs() > 0.1 {
            let ratio = 2.0_f64.powf(f64::from(scroll.y) / WHEEL_POINTS_PER_OCTAVE);
            self.tickline.zoom_by(ratio, pivot);
        }

        // Trackpad pinch
        let zoom_delta = ui.input(|i| i.zoom_delta());
        if (zoom_delta - 1.0).abs() > 0.001 {
            self.tickline.zoom_by(f64::from(zoom_delta), pivot);
        }

        ui.input(|i| {
            let span = self.tickline.index_1() - self.tickline.index_0();
            let step = span * 0.1;
            if i.key_pressed(egui::Key::A) || i.key_pressed(egui::Key::ArrowLeft) {
                self.tickline.translate_by(-step);
            }
            if i.key_pressed(egui::Key::D) || i.key_pressed(egui::Key::ArrowRight) {
                self.tickline.translate_by(step);
            }
            let centre = self.along(available.center());
            if i.key_pressed(egui::Key::Plus) || i.key_pressed(egui::Key::Equals) {
                self.tickline.zoom_by(2.0, centre);
            }
            if i.key_pressed(egui::Key::Minus) {
                self.tickline.zoom_by(0.5, centre);
            }
            if i.key_pressed(egui::Key::Num0) {
                self.reset_view();
            }
        });
    }

    fn reset_view(&mut self) {
        self.tickline.cancel_touches();
        self.mouse_down = false;
        let (a, b) = self.home;
        if self.tickline.viewport().backward() == self.home_backward {
            self.tickline.set_index_range(a, b);
        } else {
            self.tickline.set_index_range(b, a);
        }
    }

    fn toolbar(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        ui.heading("tickline");
        ui.separator();

        let theme_label = match self.theme_mode {
            ThemeMode::Dark => "🌙 Dark",
            ThemeMode::Light => "☀ Light",
        };
        if ui.button(theme_label).clicked() {
            self.theme_mode = self.theme_mode.toggled();
            ctx.set_visuals(self.theme_mode.visuals());
        }

        let orientation = self.tickline.viewport().orientation();
        let orientation_label = match orientation {
            Orientation::Horizontal => "↔ Horizontal",
            Orientation::Vertical => "↕ Vertical",
        };
        if ui.button(orientation_label).clicked() {
            let flipped = match orientation {
                Orientation::Horizontal => Orientation::Vertical,
                Orientation::Vertical => Orientation::Horizontal,
            };
            debug!("switching to {flipped:?}");
            self.tickline.cancel_touches();
            self.tickline.set_orientation(flipped);
        }

        let mut backward = self.tickline.viewport().backward();
        if ui.checkbox(&mut backward, "Backward").changed() {
            self.tickline.set_backward(backward);
        }

        let mut zoomable = self.tickline.gestures().settings().zoomable;
        if ui.checkbox(&mut zoomable, "Pinch zoom").changed() {
            self.tickline.set_zoomable(zoomable);
        }

        if ui.button("⟲ Reset").clicked() {
            self.reset_view();
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.label(format!("{:.1} px/index", self.tickline.scale()));
        });
    }
}

impl eframe::App for TicklineApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Top toolbar
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| self.toolbar(ctx, ui));
        });

        // Status bar
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let densest = self
                    .tickline
                    .densest_tick()
                    .map_or_else(|| "none".to_owned(), |t| format!("×{}", t.scale_factor));
                ui.label(format!(
                    "Index {:.3} … {:.3} | Densest tier: {densest} | drag to pan, wheel or pinch to zoom",
                    self.tickline.index_0(),
                    self.tickline.index_1(),
                ));
            });
        });

        // Central panel: the ruler
        egui::CentralPanel::default().show(ctx, |ui| {
            let available = ui.available_rect_before_wrap();
            let _response = ui.allocate_rect(available, egui::Sense::click_and_drag());

            let size = available.size();
            let bounds = Rect::new(0.0, 0.0, f64::from(size.x), f64::from(size.y));
            if self.tickline.viewport().bounds() != bounds {
                self.tickline.set_bounds(bounds);
            }
            self.origin = available.min;

            let events = ui.input(|i| i.events.clone());
            self.handle_events(&events);
            self.handle_wheel_and_keys(ui, available);

            let mut painter = ui.painter_at(available);
            let dt = ui.input(|i| f64::from(i.stable_dt));
            let measure = PainterMeasure::new(&painter);
            if let Some(commands) = self.tickline.frame(dt, &measure) {
                self.commands = commands;
            }

            renderer::render_commands(&mut painter, &self.commands, self.origin, self.theme_mode);
        });

        if self.tickline.in_motion() || self.tickline.is_redraw_pending() {
            ctx.request_repaint();
        }
    }
}
