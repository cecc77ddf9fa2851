use thiserror::Error;

/// Rejected tickline or tick configuration.
///
/// This is the only failure the engine reports; runtime edge cases (zero
/// width ranges, coincident touches, unknown touch ids) recover locally.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("translation_touches must be at least 1, got {0}")]
    TranslationTouches(usize),
    #[error("tick scale_factor must be finite and at least 1, got {0}")]
    ScaleFactor(f64),
    #[error("{field} must be finite and non-negative, got {value}")]
    Negative { field: &'static str, value: f64 },
    #[error("{field} must be finite and positive, got {value}")]
    NotPositive { field: &'static str, value: f64 },
    #[error("index range must be finite, got [{index_0}, {index_1}]")]
    IndexRange { index_0: f64, index_1: f64 },
    #[error("min_index {min} exceeds max_index {max}")]
    IndexLimits { min: f64, max: f64 },
    #[error("scale_min {min} exceeds scale_max {max}")]
    ScaleLimits { min: f64, max: f64 },
    #[error("data list entries must be finite and sorted ascending (entry {position})")]
    DataList { position: usize },
    #[error("no tick at position {0}")]
    NoSuchTick(usize),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Check that `value` is finite and non-negative.
pub(crate) fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}

pub(crate) fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}
