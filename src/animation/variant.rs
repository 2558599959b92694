use crate::{
    animation::ease::Ease,
    foundation::core::{Millis, Vec2, secs},
    foundation::error::{RevealError, RevealResult},
};

/// Linear interpolation between two values of the same type.
pub trait Lerp: Sized {
    /// Interpolate from `a` (`t = 0`) to `b` (`t = 1`).
    fn lerp(a: &Self, b: &Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        a + (b - a) * t
    }
}

impl Lerp for Vec2 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Vec2::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
    }
}

/// Named variant state of a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantKey {
    /// Pre-entrance state.
    Hidden,
    /// Post-entrance state.
    Visible,
}

impl std::fmt::Display for VariantKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Hidden => "hidden",
            Self::Visible => "visible",
        })
    }
}

/// Visual description of a variant. The scheduler never looks inside it; it is
/// only interpolated when sampling a node's style over time.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct VisualStyle {
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
    /// Translation from the laid-out position, in pixels.
    pub offset: Vec2,
    /// Uniform scale factor.
    pub scale: f64,
}

impl Default for VisualStyle {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            offset: Vec2::ZERO,
            scale: 1.0,
        }
    }
}

impl VisualStyle {
    /// Fully transparent, otherwise neutral.
    pub fn transparent() -> Self {
        Self {
            opacity: 0.0,
            ..Self::default()
        }
    }

    /// Builder-style offset override.
    pub fn with_offset(mut self, x: f64, y: f64) -> Self {
        self.offset = Vec2::new(x, y);
        self
    }

    /// Builder-style scale override.
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Check the numeric ranges.
    pub fn validate(&self) -> RevealResult<()> {
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(RevealError::validation(format!(
                "opacity must be in [0, 1] (got {})",
                self.opacity
            )));
        }
        if !self.offset.is_finite() {
            return Err(RevealError::validation("offset must be finite"));
        }
        if !self.scale.is_finite() || self.scale < 0.0 {
            return Err(RevealError::validation(format!(
                "scale must be finite and >= 0 (got {})",
                self.scale
            )));
        }
        Ok(())
    }
}

impl Lerp for VisualStyle {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Self {
            opacity: <f64 as Lerp>::lerp(&a.opacity, &b.opacity, t).clamp(0.0, 1.0),
            offset: <Vec2 as Lerp>::lerp(&a.offset, &b.offset, t),
            scale: <f64 as Lerp>::lerp(&a.scale, &b.scale, t),
        }
    }
}

fn default_duration() -> Millis {
    Millis(300)
}

/// Timing of the transition *into* a variant, plus how the variant orchestrates
/// its children. All times are written in seconds.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Transition {
    /// Length of the node's own tween.
    #[serde(with = "secs")]
    pub duration: Millis,
    /// Easing applied over `duration`.
    pub ease: Ease,
    /// Extra delay added per child index.
    #[serde(with = "secs")]
    pub stagger_children: Millis,
    /// Offset applied before the first child starts.
    #[serde(with = "secs")]
    pub delay_children: Millis,
    /// Node-local delay on top of whatever the parent derives for it.
    #[serde(with = "secs")]
    pub delay: Millis,
}

impl Default for Transition {
    fn default() -> Self {
        Self {
            duration: default_duration(),
            ease: Ease::default(),
            stagger_children: Millis::ZERO,
            delay_children: Millis::ZERO,
            delay: Millis::ZERO,
        }
    }
}

impl Transition {
    /// A plain tween of `duration` using `ease`.
    pub fn tween(duration: Millis, ease: Ease) -> Self {
        Self {
            duration,
            ease,
            ..Self::default()
        }
    }

    /// An orchestrating transition that staggers children.
    pub fn stagger(stagger_children: Millis, delay_children: Millis) -> Self {
        Self {
            stagger_children,
            delay_children,
            ..Self::default()
        }
    }

    /// Builder-style node-local delay.
    pub fn with_delay(mut self, delay: Millis) -> Self {
        self.delay = delay;
        self
    }

    /// Check easing parameters.
    pub fn validate(&self) -> RevealResult<()> {
        if !self.ease.is_valid() {
            return Err(RevealError::validation(format!(
                "invalid easing curve {:?}",
                self.ease
            )));
        }
        Ok(())
    }
}

/// One named state: what it looks like and how to get there.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Variant {
    /// Target look.
    pub style: VisualStyle,
    /// Transition into this look.
    pub transition: Transition,
}

impl Variant {
    /// Variant with a style and default timing.
    pub fn new(style: VisualStyle) -> Self {
        Self {
            style,
            transition: Transition::default(),
        }
    }

    /// Builder-style transition override.
    pub fn with_transition(mut self, transition: Transition) -> Self {
        self.transition = transition;
        self
    }
}

/// The pair of states every animated node declares.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VariantSet {
    /// Pre-entrance state.
    pub hidden: Variant,
    /// Post-entrance state; its transition drives staggering.
    pub visible: Variant,
}

impl Default for VariantSet {
    fn default() -> Self {
        Self {
            hidden: Variant::new(VisualStyle::transparent()),
            visible: Variant::new(VisualStyle::default()),
        }
    }
}

impl VariantSet {
    /// Look up a variant by key.
    pub fn get(&self, key: VariantKey) -> &Variant {
        match key {
            VariantKey::Hidden => &self.hidden,
            VariantKey::Visible => &self.visible,
        }
    }

    /// Validate both variants.
    pub fn validate(&self) -> RevealResult<()> {
        for key in [VariantKey::Hidden, VariantKey::Visible] {
            let v = self.get(key);
            v.style
                .validate()
                .and_then(|()| v.transition.validate())
                .map_err(|e| RevealError::validation(format!("{key} variant: {e}")))?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/variant.rs"]
mod tests;
