//! Tick tiers.
//!
//! A [`Tick`] is one density tier of marks. It owns a local index space in
//! which consecutive marks are one unit apart: local index `k` corresponds to
//! global index `k / scale_factor`. A tier whose marks would be closer than
//! `min_space` pixels is suppressed entirely.

mod iter;

pub use iter::{TickIter, TickMark};

use serde::{Deserialize, Serialize};
use tickline_protocol::{Paint, Rect, ThemeToken};

use crate::error::{ConfigError, non_negative, positive};
use crate::viewport::{Orientation, Viewport};

/// Cross-axis placement of marks on a vertical tickline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HAlign {
    /// Flush with the left edge of the widget.
    #[default]
    Left,
    /// Flush with the right edge of the widget.
    Right,
    /// Ending on the centre line, from its left.
    LineLeft,
    /// Starting on the centre line, to its right.
    LineRight,
}

/// Cross-axis placement of marks on a horizontal tickline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum VAlign {
    Top,
    #[default]
    Bottom,
    LineTop,
    LineBottom,
}

/// The alignment a tick actually uses for a given orientation. Doubles as the
/// "side" part of a label collision key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TickAlign {
    H(HAlign),
    V(VAlign),
}

/// What a tier draws marks for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TickKind {
    /// Every local integer (shifted by `offset`), labelled with its local index.
    Regular,
    /// Like `Regular`, without labels.
    Labelless,
    /// Only the listed local indices, which must be sorted ascending.
    DataList(Vec<f64>),
}

/// Discriminant of [`TickKind`], used to route labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TickVariant {
    Regular,
    Labelless,
    DataList,
}

impl TickVariant {
    pub const ALL: [TickVariant; 3] = [
        TickVariant::Regular,
        TickVariant::Labelless,
        TickVariant::DataList,
    ];

    pub(crate) fn slot(self) -> usize {
        match self {
            TickVariant::Regular => 0,
            TickVariant::Labelless => 1,
            TickVariant::DataList => 2,
        }
    }
}

/// Cross-axis geometry shared by all tiers during one redraw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisFrame {
    pub bounds: Rect,
    pub orientation: Orientation,
    /// Cross-axis window coordinate of the centre line.
    pub line_pos: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub kind: TickKind,
    /// `[width, length]`: width runs along the axis, length across it.
    pub tick_size: [f64; 2],
    pub color: Paint,
    pub label_color: Paint,
    pub halign: HAlign,
    pub valign: VAlign,
    /// Below this mark spacing (pixels) the tier is not drawn at all. Must be
    /// positive.
    pub min_space: f64,
    /// At or below this mark spacing (pixels) the tier is not labelled.
    pub min_label_space: f64,
    /// Marks per unit of global index; at least 1.
    pub scale_factor: f64,
    /// Fractional shift of the marks in local index units.
    pub offset: f64,
}

impl Tick {
    pub fn new(kind: TickKind) -> Self {
        let data_list = matches!(kind, TickKind::DataList(_));
        Self {
            kind,
            tick_size: [2.0, 8.0],
            color: Paint::Theme(if data_list {
                ThemeToken::TickData
            } else {
                ThemeToken::TickMajor
            }),
            label_color: Paint::Theme(ThemeToken::TickLabel),
            halign: if data_list { HAlign::LineRight } else { HAlign::Left },
            valign: VAlign::Bottom,
            min_space: 10.0,
            min_label_space: if data_list { 0.0 } else { 37.0 },
            scale_factor: 1.0,
            offset: 0.0,
        }
    }

    pub fn regular() -> Self {
        Self::new(TickKind::Regular)
    }

    pub fn labelless() -> Self {
        Self::new(TickKind::Labelless)
    }

    pub fn data_list(data: Vec<f64>) -> Self {
        Self::new(TickKind::DataList(data))
    }

    pub fn with_scale_factor(mut self, scale_factor: f64) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    pub fn with_offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_size(mut self, width: f64, length: f64) -> Self {
        self.tick_size = [width, length];
        self
    }

    pub fn with_min_space(mut self, min_space: f64) -> Self {
        self.min_space = min_space;
        self
    }

    pub fn with_min_label_space(mut self, min_label_space: f64) -> Self {
        self.min_label_space = min_label_space;
        self
    }

    pub fn with_halign(mut self, halign: HAlign) -> Self {
        self.halign = halign;
        self
    }

    pub fn with_valign(mut self, valign: VAlign) -> Self {
        self.valign = valign;
        self
    }

    pub fn with_color(mut self, color: impl Into<Paint>) -> Self {
        self.color = color.into();
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.scale_factor.is_finite() && self.scale_factor >= 1.0) {
            return Err(ConfigError::ScaleFactor(self.scale_factor));
        }
        // Spacing bounds the mark count per redraw.
        positive("min_space", self.min_space)?;
        non_negative("min_label_space", self.min_label_space)?;
        non_negative("tick width", self.tick_size[0])?;
        non_negative("tick length", self.tick_size[1])?;
        if !self.offset.is_finite() {
            return Err(ConfigError::Negative {
                field: "offset",
                value: self.offset,
            });
        }
        if let TickKind::DataList(data) = &self.kind {
            let mut previous = f64::NEG_INFINITY;
            for (position, &value) in data.iter().enumerate() {
                if !value.is_finite() || value < previous {
                    return Err(ConfigError::DataList { position });
                }
                previous = value;
            }
        }
        Ok(())
    }

    pub fn variant(&self) -> TickVariant {
        match self.kind {
            TickKind::Regular => TickVariant::Regular,
            TickKind::Labelless => TickVariant::Labelless,
            TickKind::DataList(_) => TickVariant::DataList,
        }
    }

    /// Pixel spacing between consecutive marks at the given global scale.
    pub fn local_scale(&self, scale: f64) -> f64 {
        scale / self.scale_factor
    }

    pub fn localize(&self, index: f64) -> f64 {
        index * self.scale_factor
    }

    pub fn globalize(&self, local_index: f64) -> f64 {
        local_index / self.scale_factor
    }

    /// The smallest global scale at which this tier is drawn.
    pub fn tolerance(&self) -> f64 {
        self.scale_factor * self.min_space
    }

    /// Whether the tier is drawn at `scale`. Inclusive: spacing exactly
    /// `min_space` is drawn.
    pub fn is_visible_at(&self, scale: f64) -> bool {
        self.local_scale(scale) >= self.min_space
    }

    pub fn is_labelled_at(&self, scale: f64) -> bool {
        self.local_scale(scale) > self.min_label_space
    }

    /// Label text for a mark, if the tier labels its marks.
    pub fn label_text(&self, local_index: f64) -> Option<String> {
        match self.kind {
            TickKind::Labelless => None,
            TickKind::Regular | TickKind::DataList(_) => Some(format_index(local_index)),
        }
    }

    pub fn font_size(&self) -> f64 {
        self.tick_size[1] * 2.0
    }

    /// The alignment in effect for `orientation`.
    pub fn align(&self, orientation: Orientation) -> TickAlign {
        match orientation {
            Orientation::Vertical => TickAlign::H(self.halign),
            Orientation::Horizontal => TickAlign::V(self.valign),
        }
    }

    /// Rectangle of the mark centred at window coordinate `pos` along the axis.
    pub fn draw_tick(&self, frame: &AxisFrame, pos: f64) -> Rect {
        let [tw, th] = self.tick_size;
        let b = frame.bounds;
        match frame.orientation {
            Orientation::Vertical => {
                let x = match self.halign {
                    HAlign::Left => b.x,
                    HAlign::LineLeft => frame.line_pos - th,
                    HAlign::LineRight => frame.line_pos,
                    HAlign::Right => b.right() - th,
                };
                Rect::new(x, pos - tw / 2.0, th, tw)
            }
            Orientation::Horizontal => {
                let y = match self.valign {
                    VAlign::Top => b.y,
                    VAlign::LineTop => frame.line_pos - th,
                    VAlign::LineBottom => frame.line_pos,
                    VAlign::Bottom => b.bottom() - th,
                };
                Rect::new(pos - tw / 2.0, y, tw, th)
            }
        }
    }

    /// Marks to draw for the current viewport, one densest-tier step past
    /// each edge. `densest` falls back to `self` when absent.
    pub fn ticks<'a>(&'a self, viewport: &Viewport, densest: Option<&Tick>) -> TickIter<'a> {
        TickIter::new(self, viewport, densest.unwrap_or(self))
    }
}

fn format_index(local_index: f64) -> String {
    // `+ 0.0` folds -0 into 0.
    format!("{}", local_index + 0.0)
}
