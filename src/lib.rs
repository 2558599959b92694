//! Reveal drives scroll-triggered entrance animations for sectioned pages.
//!
//! Each page section pairs a [`VisibilityObserver`] on its root element with a
//! [`StaggerScheduler`] over a declarative variant tree:
//!
//! - Describe the section's nodes with [`NodeBuilder`] or load them from JSON
//! - Mount a [`Section`] against an [`ObservationHost`]
//! - Feed intersection notifications and clock ticks; collect [`FiredActivation`]s
//!
//! [`SimulatedHost`] and [`Page`] replay scroll sessions without a browser.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub(crate) mod animation;
/// Contact form boundary.
pub mod contact;
/// Multi-section pages and scripted scroll sessions.
pub mod page;
/// Section presets of the portfolio page.
pub mod presets;
pub(crate) mod schedule;
pub(crate) mod section;
pub(crate) mod visibility;

pub use crate::foundation::core::{ElementRef, Millis, NodeId, Point, Rect, Vec2, secs};
pub use crate::foundation::error::{RevealError, RevealResult};

pub use crate::animation::ease::Ease;
pub use crate::animation::tree::{AnimationNode, NodeBuilder, PlannedNode};
pub use crate::animation::variant::{
    Lerp, Transition, Variant, VariantKey, VariantSet, VisualStyle,
};
pub use crate::contact::{
    ContactForm, ContactMessage, DEFAULT_SUBJECT, DeliveryError, DeliveryService, SubmitOutcome,
};
pub use crate::page::{
    Page, PageConfig, PageEvent, ResolvedSection, ScrollScript, ScrollStep, SectionBounds,
    SectionConfig, ViewportSize,
};
pub use crate::presets::{SectionKind, SectionPreset, container_variants, item_variants};
pub use crate::schedule::scheduler::{
    ActivationCommand, ActivationRecord, FiredActivation, NodeState, StaggerScheduler,
};
pub use crate::schedule::timer::{TimerId, TimerQueue};
pub use crate::section::{Section, SectionUpdate};
pub use crate::visibility::config::{ObserveMode, VisibilityConfig};
pub use crate::visibility::geometry::intersection_ratio;
pub use crate::visibility::host::{ObservationHandle, ObservationHost, ObservationId};
pub use crate::visibility::observer::VisibilityObserver;
pub use crate::visibility::sim::{IntersectionEntry, SimulatedHost};
