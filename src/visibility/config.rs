use crate::foundation::error::{RevealError, RevealResult};

/// Lifecycle mode of a visibility observer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObserveMode {
    /// One-shot: the first `true` pins the signal and releases the observation.
    Latched,
    /// Every crossing of the threshold is reported, in both directions.
    #[default]
    Retriggering,
}

/// Immutable configuration of one observer.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "VisibilityConfigDef")]
pub struct VisibilityConfig {
    /// Fraction of the element's area that must be on screen, in `[0, 1]`.
    pub threshold: f64,
    /// Latched or re-triggering.
    pub mode: ObserveMode,
}

impl VisibilityConfig {
    /// Validated constructor.
    pub fn new(threshold: f64, mode: ObserveMode) -> RevealResult<Self> {
        if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
            return Err(RevealError::validation(format!(
                "visibility threshold must be in [0, 1] (got {threshold})"
            )));
        }
        Ok(Self { threshold, mode })
    }

    /// Re-triggering observer at `threshold`.
    pub fn retriggering(threshold: f64) -> RevealResult<Self> {
        Self::new(threshold, ObserveMode::Retriggering)
    }

    /// One-shot observer at `threshold`.
    pub fn latched(threshold: f64) -> RevealResult<Self> {
        Self::new(threshold, ObserveMode::Latched)
    }

    /// Whether a measured ratio counts as visible.
    pub fn is_visible_at(&self, ratio: f64) -> bool {
        let ratio = if ratio.is_nan() { 0.0 } else { ratio };
        ratio >= self.threshold
    }
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        Self {
            threshold: 0.0,
            mode: ObserveMode::default(),
        }
    }
}

// Accepts either `mode` or the `trigger_once` shorthand, not both.
#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct VisibilityConfigDef {
    #[serde(default)]
    threshold: f64,
    #[serde(default)]
    mode: Option<ObserveMode>,
    #[serde(default)]
    trigger_once: Option<bool>,
}

impl TryFrom<VisibilityConfigDef> for VisibilityConfig {
    type Error = RevealError;

    fn try_from(def: VisibilityConfigDef) -> Result<Self, Self::Error> {
        let mode = match (def.mode, def.trigger_once) {
            (Some(_), Some(_)) => {
                return Err(RevealError::validation(
                    "set either 'mode' or 'trigger_once', not both",
                ));
            }
            (Some(mode), None) => mode,
            (None, Some(true)) => ObserveMode::Latched,
            (None, Some(false)) | (None, None) => ObserveMode::Retriggering,
        };
        Self::new(def.threshold, mode)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/visibility/config.rs"]
mod tests;
