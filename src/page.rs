use std::rc::Rc;

use crate::{
    animation::tree::{AnimationNode, PlannedNode},
    animation::variant::VariantKey,
    foundation::core::{Millis, NodeId, Rect, secs},
    foundation::error::{RevealError, RevealResult},
    presets::SectionKind,
    section::{Section, SectionUpdate},
    visibility::config::VisibilityConfig,
    visibility::sim::SimulatedHost,
};

/// Viewport size in CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ViewportSize {
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

/// Vertical extent of a section's root element on the page.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SectionBounds {
    /// Page offset of the top edge.
    pub top: f64,
    /// Height.
    pub height: f64,
}

/// One section entry of a page file: either an explicit tree or a preset.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SectionConfig {
    /// Section name; defaults to the preset name.
    #[serde(default)]
    pub name: Option<String>,
    /// Preset supplying visibility and variants.
    #[serde(default)]
    pub preset: Option<SectionKind>,
    /// Number of items when building from a preset.
    #[serde(default)]
    pub items: Option<usize>,
    /// Explicit visibility settings; overrides the preset's.
    #[serde(default)]
    pub visibility: Option<VisibilityConfig>,
    /// Explicit variant tree; overrides the preset's.
    #[serde(default)]
    pub tree: Option<AnimationNode>,
    /// Where the section's root element sits.
    pub bounds: SectionBounds,
}

/// Fully resolved section: name, observer settings and tree.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedSection {
    /// Section name.
    pub name: String,
    /// Observer settings.
    pub visibility: VisibilityConfig,
    /// Variant tree.
    pub tree: AnimationNode,
    /// Root element placement.
    pub bounds: SectionBounds,
}

impl SectionConfig {
    /// Resolve preset defaults and validate.
    pub fn resolve(&self) -> RevealResult<ResolvedSection> {
        let preset = self.preset.map(SectionKind::preset);
        let name = match (&self.name, self.preset) {
            (Some(n), _) => n.clone(),
            (None, Some(kind)) => kind.name().to_string(),
            (None, None) => {
                return Err(RevealError::validation(
                    "section needs a 'name' or a 'preset'",
                ));
            }
        };
        let visibility = self
            .visibility
            .or(preset.map(|p| p.visibility))
            .unwrap_or_default();
        let tree = match (&self.tree, preset) {
            (Some(tree), _) => {
                tree.validate()?;
                tree.clone()
            }
            (None, Some(p)) => p.tree(self.items.unwrap_or(0))?,
            (None, None) => {
                return Err(RevealError::validation(format!(
                    "section '{name}' needs a 'tree' or a 'preset'"
                )));
            }
        };
        if !(self.bounds.top.is_finite()
            && self.bounds.height.is_finite()
            && self.bounds.height >= 0.0)
        {
            return Err(RevealError::validation(format!(
                "section '{name}' has invalid bounds"
            )));
        }
        Ok(ResolvedSection {
            name,
            visibility,
            tree,
            bounds: self.bounds,
        })
    }
}

/// A page file: viewport plus sections.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PageConfig {
    /// Viewport size.
    pub viewport: ViewportSize,
    /// Sections, top to bottom.
    pub sections: Vec<SectionConfig>,
}

impl PageConfig {
    /// Parse from JSON.
    pub fn from_json(s: &str) -> RevealResult<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Resolve and validate every section; names must be unique.
    pub fn resolve(&self) -> RevealResult<Vec<ResolvedSection>> {
        if !(self.viewport.width > 0.0 && self.viewport.height > 0.0) {
            return Err(RevealError::validation("viewport must have a positive size"));
        }
        let mut out: Vec<ResolvedSection> = Vec::with_capacity(self.sections.len());
        for s in &self.sections {
            let r = s.resolve()?;
            if out.iter().any(|o| o.name == r.name) {
                return Err(RevealError::validation(format!(
                    "duplicate section name '{}'",
                    r.name
                )));
            }
            out.push(r);
        }
        Ok(out)
    }

    /// Validate without keeping the result.
    pub fn validate(&self) -> RevealResult<()> {
        self.resolve().map(|_| ())
    }

    /// Static plan of every section's effective delays.
    pub fn plan(&self) -> RevealResult<Vec<(String, Vec<PlannedNode>)>> {
        Ok(self
            .resolve()?
            .into_iter()
            .map(|s| {
                let plan = s.tree.plan();
                (s.name, plan)
            })
            .collect())
    }
}

/// Something observable that happened on the page.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageEvent {
    /// A section's visibility signal changed.
    Visibility {
        /// Section name.
        section: String,
        /// Time of the change.
        at: Millis,
        /// New signal.
        visible: bool,
    },
    /// A node was commanded to a variant.
    Activation {
        /// Section name.
        section: String,
        /// Time the command was due.
        at: Millis,
        /// Target node.
        node: NodeId,
        /// Target variant.
        target: VariantKey,
    },
}

/// A mounted page driven by a simulated scroll position.
#[derive(Debug)]
pub struct Page {
    host: Rc<SimulatedHost>,
    sections: Vec<Section>,
}

impl Page {
    /// Mount every section of `config` with the viewport at the top of the page.
    #[tracing::instrument(skip(config), fields(sections = config.sections.len()))]
    pub fn mount(config: &PageConfig, now: Millis) -> RevealResult<(Self, Vec<PageEvent>)> {
        let resolved = config.resolve()?;
        let host = Rc::new(SimulatedHost::new(Rect::new(
            0.0,
            0.0,
            config.viewport.width,
            config.viewport.height,
        )));
        let mut sections = Vec::with_capacity(resolved.len());
        let mut events = Vec::new();
        for r in resolved {
            let el = host.mount(Rect::new(
                0.0,
                r.bounds.top,
                config.viewport.width,
                r.bounds.top + r.bounds.height,
            ));
            let (section, update) =
                Section::mount(&r.name, host.clone(), el, r.visibility, r.tree, now)?;
            collect(&r.name, &update, now, &mut events);
            sections.push(section);
        }
        Ok((Self { host, sections }, events))
    }

    /// Mounted sections.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Look a section up by name.
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name() == name)
    }

    /// Scroll the viewport top to `y` and route the resulting notifications.
    pub fn scroll_to(&mut self, y: f64, now: Millis) -> Vec<PageEvent> {
        self.host.scroll_to(y);
        let mut events = Vec::new();
        for entry in self.host.poll() {
            let Some(section) = self
                .sections
                .iter_mut()
                .find(|s| s.observation_id() == Some(entry.id))
            else {
                continue;
            };
            let update = section.on_intersection(entry.ratio, now);
            collect(section.name(), &update, now, &mut events);
        }
        events
    }

    /// Deliver due commands in every section.
    pub fn tick(&mut self, now: Millis) -> Vec<PageEvent> {
        let mut events = Vec::new();
        for section in &mut self.sections {
            let fired = section.tick(now);
            let update = SectionUpdate {
                fired,
                ..SectionUpdate::default()
            };
            collect(section.name(), &update, now, &mut events);
        }
        events
    }

    /// Unmount every section.
    pub fn unmount(&mut self) {
        for section in &mut self.sections {
            section.unmount();
        }
    }

    /// Live observations held by the page.
    pub fn active_observations(&self) -> usize {
        self.host.active_observations()
    }
}

fn collect(section: &str, update: &SectionUpdate, now: Millis, out: &mut Vec<PageEvent>) {
    if let Some(visible) = update.visibility {
        out.push(PageEvent::Visibility {
            section: section.to_string(),
            at: now,
            visible,
        });
    }
    for f in &update.fired {
        out.push(PageEvent::Activation {
            section: section.to_string(),
            at: f.at,
            node: f.node.clone(),
            target: f.target,
        });
    }
}

/// One scripted input.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ScrollStep {
    /// When, in seconds.
    #[serde(with = "secs")]
    pub at: Millis,
    /// Viewport top after the step; `None` only advances time.
    #[serde(default)]
    pub scroll: Option<f64>,
}

/// A scripted scroll session.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ScrollScript {
    /// Steps in time order.
    pub steps: Vec<ScrollStep>,
    /// Final time to run pending commands up to, in seconds.
    #[serde(with = "secs", default)]
    pub until: Millis,
}

impl ScrollScript {
    /// Steps must be in non-decreasing time order.
    pub fn validate(&self) -> RevealResult<()> {
        if !self.steps.windows(2).all(|w| w[0].at <= w[1].at) {
            return Err(RevealError::validation("script steps must be sorted by time"));
        }
        if self.steps.iter().any(|s| s.scroll.is_some_and(|y| !y.is_finite())) {
            return Err(RevealError::validation("scroll offsets must be finite"));
        }
        Ok(())
    }

    /// Replay against a freshly mounted page and return every event in order.
    pub fn run(&self, config: &PageConfig) -> RevealResult<Vec<PageEvent>> {
        self.validate()?;
        let (mut page, mut events) = Page::mount(config, Millis::ZERO)?;
        for step in &self.steps {
            events.extend(page.tick(step.at));
            if let Some(y) = step.scroll {
                events.extend(page.scroll_to(y, step.at));
            }
        }
        let end = self
            .steps
            .last()
            .map(|s| s.at)
            .unwrap_or(Millis::ZERO)
            .max(self.until);
        events.extend(page.tick(end));
        page.unmount();
        Ok(events)
    }
}

#[cfg(test)]
#[path = "../tests/unit/page/page.rs"]
mod tests;
