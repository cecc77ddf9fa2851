use egui::{Align2, CornerRadius, FontId, Pos2, Rect, Stroke, StrokeKind};
use tickline_core::{TextExtent, TextMeasure};
use tickline_protocol::{RenderCommand, TextAlign};

use crate::theme::{self, ThemeMode};

/// Render a list of `RenderCommand` into an egui `Painter`.
///
/// `offset` is the top-left pixel position of the tickline's bounds; the
/// commands themselves are relative to it.
pub fn render_commands(
    painter: &mut egui::Painter,
    commands: &[RenderCommand],
    offset: Pos2,
    mode: ThemeMode,
) {
    let mut clip_stack: Vec<Rect> = Vec::new();
    let to_screen =
        |x: f64, y: f64| Pos2::new(x as f32 + offset.x, y as f32 + offset.y);

    for cmd in commands {
        match cmd {
            RenderCommand::DrawRect {
                rect,
                color,
                border_color,
            } => {
                let w = rect.w as f32;
                let h = rect.h as f32;
                if w <= 0.0 || h <= 0.0 {
                    continue;
                }

                let egui_rect = Rect::from_min_size(to_screen(rect.x, rect.y), egui::vec2(w, h));

                // Cull off-screen
                if !painter.clip_rect().intersects(egui_rect) {
                    continue;
                }

                painter.rect_filled(egui_rect, CornerRadius::ZERO, theme::resolve(*color, mode));

                if let Some(bc) = border_color {
                    painter.rect_stroke(
                        egui_rect,
                        CornerRadius::ZERO,
                        Stroke::new(1.0, theme::resolve(*bc, mode)),
                        StrokeKind::Inside,
                    );
                }
            }

            RenderCommand::DrawText {
                position,
                text,
                color,
                font_size,
                align,
            } => {
                let size = *font_size as f32;
                if size < 1.0 {
                    continue;
                }

                // Positions are the top edge of the text box.
                let anchor = match align {
                    TextAlign::Left => Align2::LEFT_TOP,
                    TextAlign::Center => Align2::CENTER_TOP,
                    TextAlign::Right => Align2::RIGHT_TOP,
                };

                painter.text(
                    to_screen(position.x, position.y),
                    anchor,
                    text.as_ref(),
                    FontId::proportional(size),
                    theme::resolve(*color, mode),
                );
            }

            RenderCommand::DrawLine {
                from,
                to,
                color,
                width,
            } => {
                painter.line_segment(
                    [to_screen(from.x, from.y), to_screen(to.x, to.y)],
                    Stroke::new(*width as f32, theme::resolve(*color, mode)),
                );
            }

            RenderCommand::SetClip { rect } => {
                let clip_rect = Rect::from_min_size(
                    to_screen(rect.x, rect.y),
                    egui::vec2(rect.w as f32, rect.h as f32),
                );
                clip_stack.push(painter.clip_rect());
                let intersected = painter.clip_rect().intersect(clip_rect);
                painter.set_clip_rect(intersected);
            }

            RenderCommand::ClearClip => {
                if let Some(prev) = clip_stack.pop() {
                    painter.set_clip_rect(prev);
                }
            }

            RenderCommand::BeginGroup { .. } | RenderCommand::EndGroup => {
                // Tier groups only matter to consumers that batch
            }
        }
    }
}

/// Measures label text with egui's proportional font, so label collision
/// boxes match what [`render_commands`] will paint.
pub struct PainterMeasure<'a> {
    painter: &'a egui::Painter,
}

impl<'a> PainterMeasure<'a> {
    pub fn new(painter: &'a egui::Painter) -> Self {
        Self { painter }
    }
}

impl TextMeasure for PainterMeasure<'_> {
    fn measure(&self, text: &str, font_size: f64) -> TextExtent {
        let galley = self.painter.layout_no_wrap(
            text.to_owned(),
            FontId::proportional(font_size as f32),
            egui::Color32::WHITE,
        );
        let size = galley.size();
        TextExtent {
            width: f64::from(size.x),
            height: f64::from(size.y),
        }
    }
}
