use std::rc::Rc;

use crate::{
    animation::tree::AnimationNode,
    foundation::core::{ElementRef, Millis, NodeId},
    foundation::error::RevealResult,
    schedule::scheduler::{ActivationCommand, FiredActivation, StaggerScheduler},
    visibility::config::VisibilityConfig,
    visibility::host::{ObservationHost, ObservationId},
    visibility::observer::VisibilityObserver,
};

/// What one input to a section produced.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct SectionUpdate {
    /// New signal value, when it changed.
    pub visibility: Option<bool>,
    /// Commands planned by the scheduler for that change.
    pub planned: Vec<ActivationCommand>,
    /// Commands whose time has come.
    pub fired: Vec<FiredActivation>,
}

impl SectionUpdate {
    /// Whether nothing happened.
    pub fn is_empty(&self) -> bool {
        self.visibility.is_none() && self.planned.is_empty() && self.fired.is_empty()
    }
}

/// One page section: a visibility observer on its root element feeding a stagger
/// scheduler for its variant tree. Sections never share state.
#[derive(Debug)]
pub struct Section {
    name: String,
    observer: VisibilityObserver,
    scheduler: StaggerScheduler,
    mounted: bool,
}

impl Section {
    /// Build the observer/scheduler pair and attach to `element`.
    ///
    /// If the element is already visible the entrance is planned right away.
    #[tracing::instrument(skip(host, tree), fields(nodes = tree.node_count()))]
    pub fn mount(
        name: &str,
        host: Rc<dyn ObservationHost>,
        element: ElementRef,
        config: VisibilityConfig,
        tree: AnimationNode,
        now: Millis,
    ) -> RevealResult<(Self, SectionUpdate)> {
        let scheduler = StaggerScheduler::new(tree)?;
        let mut section = Self {
            name: name.to_string(),
            observer: VisibilityObserver::new(host, config),
            scheduler,
            mounted: true,
        };
        let change = section.observer.attach(element);
        let update = section.apply(change, now);
        Ok((section, update))
    }

    /// Section name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current visibility signal.
    pub fn is_visible(&self) -> bool {
        self.observer.is_visible()
    }

    /// Whether the section is still mounted.
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// The section's observer.
    pub fn observer(&self) -> &VisibilityObserver {
        &self.observer
    }

    /// The section's scheduler.
    pub fn scheduler(&self) -> &StaggerScheduler {
        &self.scheduler
    }

    /// Host id used to route intersection notifications to this section.
    pub fn observation_id(&self) -> Option<ObservationId> {
        self.observer.observation_id()
    }

    /// Feed one intersection notification for the section's root element.
    pub fn on_intersection(&mut self, ratio: f64, now: Millis) -> SectionUpdate {
        if !self.mounted {
            return SectionUpdate::default();
        }
        let change = self.observer.on_intersection(ratio);
        self.apply(change, now)
    }

    /// Point the section at a different root element.
    ///
    /// Commands planned for the previous element are dropped before the new one is
    /// measured; the entrance is then planned from that measurement.
    pub fn rebind(&mut self, element: ElementRef, now: Millis) -> SectionUpdate {
        if !self.mounted || self.observer.element() == Some(element) {
            return SectionUpdate::default();
        }
        let change = self.observer.attach(element);
        let planned = self.scheduler.restart(self.observer.is_visible(), now);
        let fired = self.scheduler.advance(now);
        SectionUpdate {
            visibility: change,
            planned,
            fired,
        }
    }

    /// Deliver commands whose time has come.
    pub fn tick(&mut self, now: Millis) -> Vec<FiredActivation> {
        self.scheduler.advance(now)
    }

    /// Add a node rendered after the section first appeared.
    pub fn insert_child(
        &mut self,
        parent: &NodeId,
        node: AnimationNode,
        now: Millis,
    ) -> RevealResult<SectionUpdate> {
        let planned = self.scheduler.insert_child(parent, node, now)?;
        let fired = self.scheduler.advance(now);
        Ok(SectionUpdate {
            visibility: None,
            planned,
            fired,
        })
    }

    /// Release the observation and cancel all pending work.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.observer.detach();
        self.scheduler.teardown();
        self.mounted = false;
        tracing::debug!(section = %self.name, "section unmounted");
    }

    fn apply(&mut self, change: Option<bool>, now: Millis) -> SectionUpdate {
        let planned = match change {
            Some(visible) => self.scheduler.schedule(visible, now),
            None => Vec::new(),
        };
        let fired = self.scheduler.advance(now);
        SectionUpdate {
            visibility: change,
            planned,
            fired,
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/section/section.rs"]
mod tests;
