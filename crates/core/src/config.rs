use serde::{Deserialize, Serialize};
use tickline_protocol::{Color, Paint, Rect, ThemeToken};

use crate::error::{ConfigError, non_negative};
use crate::labels::LabelStrategy;
use crate::tick::{HAlign, Tick, TickKind, VAlign};
use crate::viewport::Orientation;

/// Declarative description of a tickline, as read from JSON.
///
/// Every field has a default, so `{}` is a valid configuration. Unbounded
/// limits are written as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TicklineConfig {
    pub bounds: Rect,
    pub orientation: Orientation,
    pub backward: bool,
    pub zoomable: bool,
    pub draw_line: bool,
    pub line_width: f64,
    /// Cross-axis shift of the centre line from the widget centre.
    pub line_offset: f64,
    pub line_color: Paint,
    pub background_color: Paint,
    pub index_0: f64,
    pub index_1: f64,
    pub min_index: Option<f64>,
    pub max_index: Option<f64>,
    pub scale_min: f64,
    pub scale_max: Option<f64>,
    pub translation_touches: usize,
    /// Pixels a pan must travel before its release can fling.
    pub drag_threshold: f64,
    pub tick_label_padding: f64,
    pub labelling: LabelStrategy,
    pub ticks: Vec<TickConfig>,
}

impl Default for TicklineConfig {
    fn default() -> Self {
        Self {
            bounds: Rect::new(0.0, 0.0, 100.0, 100.0),
            orientation: Orientation::Vertical,
            backward: false,
            zoomable: true,
            draw_line: true,
            line_width: 4.0,
            line_offset: 0.0,
            line_color: Paint::Rgba(Color::WHITE),
            background_color: Paint::Rgba(Color::BLACK),
            index_0: 0.0,
            index_1: 10.0,
            min_index: None,
            max_index: None,
            scale_min: 0.0,
            scale_max: None,
            translation_touches: 1,
            drag_threshold: 20.0,
            tick_label_padding: 0.0,
            labelling: LabelStrategy::Single,
            ticks: Vec::new(),
        }
    }
}

impl TicklineConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// A ready-made horizontal ruler with three nested tiers and a data tier.
    pub fn demo() -> Result<Self, ConfigError> {
        Self::from_json(include_str!("../assets/ruler.json"))
    }

    pub fn min_index(&self) -> f64 {
        self.min_index.unwrap_or(f64::NEG_INFINITY)
    }

    pub fn max_index(&self) -> f64 {
        self.max_index.unwrap_or(f64::INFINITY)
    }

    pub fn scale_max(&self) -> f64 {
        self.scale_max.unwrap_or(f64::INFINITY)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.translation_touches < 1 {
            return Err(ConfigError::TranslationTouches(self.translation_touches));
        }
        if !(self.index_0.is_finite() && self.index_1.is_finite()) {
            return Err(ConfigError::IndexRange {
                index_0: self.index_0,
                index_1: self.index_1,
            });
        }
        let (min, max) = (self.min_index(), self.max_index());
        if min.is_nan() || max.is_nan() || min > max {
            return Err(ConfigError::IndexLimits { min, max });
        }
        non_negative("scale_min", self.scale_min)?;
        let scale_max = self.scale_max();
        if scale_max.is_nan() || self.scale_min > scale_max {
            return Err(ConfigError::ScaleLimits {
                min: self.scale_min,
                max: scale_max,
            });
        }
        non_negative("bounds width", self.bounds.w)?;
        non_negative("bounds height", self.bounds.h)?;
        non_negative("line_width", self.line_width)?;
        non_negative("drag_threshold", self.drag_threshold)?;
        non_negative("tick_label_padding", self.tick_label_padding)?;
        for tick in &self.ticks {
            tick.clone().into_tick().validate()?;
        }
        Ok(())
    }
}

/// One tick tier. Omitted fields take the tier defaults, which differ for
/// data-list tiers (`min_label_space` 0, marks from the centre line).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TickConfig {
    pub kind: TickKind,
    pub tick_size: [f64; 2],
    pub color: Option<Paint>,
    pub label_color: Paint,
    pub halign: Option<HAlign>,
    pub valign: VAlign,
    pub min_space: f64,
    pub min_label_space: Option<f64>,
    pub scale_factor: f64,
    pub offset: f64,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            kind: TickKind::Regular,
            tick_size: [2.0, 8.0],
            color: None,
            label_color: Paint::Theme(ThemeToken::TickLabel),
            halign: None,
            valign: VAlign::Bottom,
            min_space: 10.0,
            min_label_space: None,
            scale_factor: 1.0,
            offset: 0.0,
        }
    }
}

impl TickConfig {
    pub fn into_tick(self) -> Tick {
        let mut tick = Tick::new(self.kind);
        tick.tick_size = self.tick_size;
        if let Some(color) = self.color {
            tick.color = color;
        }
        tick.label_color = self.label_color;
        if let Some(halign) = self.halign {
            tick.halign = halign;
        }
        tick.valign = self.valign;
        tick.min_space = self.min_space;
        if let Some(min_label_space) = self.min_label_space {
            tick.min_label_space = min_label_space;
        }
        tick.scale_factor = self.scale_factor;
        tick.offset = self.offset;
        tick
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gives_defaults() {
        let config = TicklineConfig::from_json("{}").expect("empty config");
        assert_eq!(config, TicklineConfig::default());
        assert_eq!(config.orientation, Orientation::Vertical);
        assert_eq!(config.max_index(), f64::INFINITY);
        assert_eq!(config.scale_max(), f64::INFINITY);
    }

    #[test]
    fn decodes_ticks_with_variant_defaults() {
        let json = r#"{
            "orientation": "Horizontal",
            "index_0": -5, "index_1": 5,
            "min_index": -100, "max_index": null,
            "labelling": {"PerVariant": [["DataList"]]},
            "ticks": [
                {"scale_factor": 10, "color": "TickMinor"},
                {"kind": {"DataList": [0.5, 2.0]}},
                {"kind": "Labelless", "halign": "Right", "tick_size": [1, 4]}
            ]
        }"#;
        let config = TicklineConfig::from_json(json).expect("valid config");
        assert_eq!(config.ticks.len(), 3);
        assert_eq!(config.min_index(), -100.0);

        let ticks: Vec<Tick> = config.ticks.into_iter().map(TickConfig::into_tick).collect();
        assert_eq!(ticks[0].scale_factor, 10.0);
        assert_eq!(ticks[0].color, Paint::Theme(ThemeToken::TickMinor));
        assert_eq!(ticks[0].min_label_space, 37.0);
        assert_eq!(ticks[1].min_label_space, 0.0);
        assert_eq!(ticks[1].halign, HAlign::LineRight);
        assert_eq!(ticks[2].halign, HAlign::Right);
        assert_eq!(ticks[2].tick_size, [1.0, 4.0]);
    }

    #[test]
    fn demo_ruler_is_valid() {
        let config = TicklineConfig::demo().expect("bundled ruler");
        assert_eq!(config.orientation, Orientation::Horizontal);
        assert_eq!(config.ticks.len(), 4);
        assert_eq!(config.scale_max(), 4000.0);
    }

    #[test]
    fn rejects_invalid_configuration() {
        for json in [
            r#"{"translation_touches": 0}"#,
            r#"{"ticks": [{"scale_factor": 0.5}]}"#,
            r#"{"ticks": [{"kind": {"DataList": [3, 1]}}]}"#,
            r#"{"min_index": 5, "max_index": 1}"#,
            r#"{"scale_min": 10, "scale_max": 1}"#,
            r#"{"line_width": -1}"#,
            r#"{"orientation": "Diagonal"}"#,
        ] {
            assert!(TicklineConfig::from_json(json).is_err(), "{json}");
        }
    }
}
