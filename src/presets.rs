//! Variant declarations of the portfolio page's sections.
//!
//! Each section uses the same item entrance (fade in while rising 50px over 0.8s,
//! ease-out) under a container that staggers its items; only the stagger timing and
//! the visibility threshold differ.

use crate::{
    animation::ease::Ease,
    animation::tree::{AnimationNode, NodeBuilder},
    animation::variant::{Transition, Variant, VariantSet, VisualStyle},
    foundation::core::Millis,
    foundation::error::{RevealError, RevealResult},
    visibility::config::VisibilityConfig,
};

/// The sections of the page, top to bottom.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    /// Introduction; animates as soon as it mounts.
    Hero,
    /// Biography.
    About,
    /// Skill categories and certifications.
    Skills,
    /// Project gallery.
    Projects,
    /// Contact details and form.
    Contact,
}

impl SectionKind {
    /// All sections in page order.
    pub const ALL: [SectionKind; 5] = [
        SectionKind::Hero,
        SectionKind::About,
        SectionKind::Skills,
        SectionKind::Projects,
        SectionKind::Contact,
    ];

    /// Stable lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Hero => "hero",
            Self::About => "about",
            Self::Skills => "skills",
            Self::Projects => "projects",
            Self::Contact => "contact",
        }
    }

    /// Threshold, stagger and delay of this section.
    pub fn preset(self) -> SectionPreset {
        // (threshold, staggerChildren ms, delayChildren ms)
        let (threshold, stagger, delay) = match self {
            Self::Hero => (0.0, 300, 200),
            Self::About => (0.3, 200, 100),
            Self::Skills => (0.2, 100, 200),
            Self::Projects => (0.2, 200, 100),
            Self::Contact => (0.3, 200, 100),
        };
        SectionPreset {
            kind: self,
            visibility: VisibilityConfig {
                threshold,
                mode: Default::default(),
            },
            container: container_variants(Millis(stagger), Millis(delay)),
            item: item_variants(),
        }
    }
}

/// Ready-made configuration for one section.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SectionPreset {
    /// Which section.
    pub kind: SectionKind,
    /// Observer configuration.
    pub visibility: VisibilityConfig,
    /// Container variants (orchestration only).
    pub container: VariantSet,
    /// Variants shared by every item.
    pub item: VariantSet,
}

impl SectionPreset {
    /// Container with `items` direct children named `<section>/<n>`.
    pub fn tree(&self, items: usize) -> RevealResult<AnimationNode> {
        let name = self.kind.name();
        NodeBuilder::new(name)
            .variants(self.container)
            .children((0..items).map(|i| {
                NodeBuilder::new(format!("{name}/{i}")).variants(self.item)
            }))
            .build()
    }

    /// Container whose items each hold their own staggered children, e.g. skill
    /// cards holding their skill bars. `groups[i]` is the number of children of item
    /// `i`; nested children stagger by `inner_stagger`.
    pub fn nested_tree(
        &self,
        groups: &[usize],
        inner_stagger: Millis,
    ) -> RevealResult<AnimationNode> {
        if groups.is_empty() {
            return Err(RevealError::validation("nested tree needs at least one group"));
        }
        let name = self.kind.name();
        let mut item = self.item;
        item.visible.transition.stagger_children = inner_stagger;
        NodeBuilder::new(name)
            .variants(self.container)
            .children(groups.iter().enumerate().map(|(i, &n)| {
                NodeBuilder::new(format!("{name}/{i}"))
                    .variants(item)
                    .children((0..n).map(move |j| {
                        NodeBuilder::new(format!("{name}/{i}/{j}")).variants(self.item)
                    }))
            }))
            .build()
    }
}

/// Container: fade from transparent, staggering children.
pub fn container_variants(stagger: Millis, delay: Millis) -> VariantSet {
    VariantSet {
        hidden: Variant::new(VisualStyle::transparent()),
        visible: Variant::new(VisualStyle::default())
            .with_transition(Transition::stagger(stagger, delay)),
    }
}

/// Item: rise 50px while fading in over 0.8s with ease-out.
pub fn item_variants() -> VariantSet {
    VariantSet {
        hidden: Variant::new(VisualStyle::transparent().with_offset(0.0, 50.0)),
        visible: Variant::new(VisualStyle::default())
            .with_transition(Transition::tween(Millis(800), Ease::EaseOut)),
    }
}

#[cfg(test)]
#[path = "../tests/unit/section/presets.rs"]
mod tests;
