/// Pixel size of a laid-out label.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextExtent {
    pub width: f64,
    pub height: f64,
}

/// Text measurement service used to place labels next to their marks.
///
/// Front ends implement this with their real font stack (egui's font atlas,
/// a terminal cell grid); [`MonospaceMeasure`] serves headless use.
pub trait TextMeasure {
    fn measure(&self, text: &str, font_size: f64) -> TextExtent;
}

/// Fixed-advance approximation: every glyph is `advance × font_size` wide and
/// a line is `line_height × font_size` tall.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceMeasure {
    pub advance: f64,
    pub line_height: f64,
}

impl Default for MonospaceMeasure {
    fn default() -> Self {
        Self {
            advance: 0.6,
            line_height: 1.2,
        }
    }
}

impl TextMeasure for MonospaceMeasure {
    fn measure(&self, text: &str, font_size: f64) -> TextExtent {
        TextExtent {
            width: text.chars().count() as f64 * self.advance * font_size,
            height: self.line_height * font_size,
        }
    }
}

impl<T: TextMeasure + ?Sized> TextMeasure for &T {
    fn measure(&self, text: &str, font_size: f64) -> TextExtent {
        (**self).measure(text, font_size)
    }
}
