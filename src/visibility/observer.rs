use std::rc::Rc;

use crate::{
    foundation::core::ElementRef,
    foundation::error::{RevealError, RevealResult},
    visibility::config::{ObserveMode, VisibilityConfig},
    visibility::host::{ObservationHandle, ObservationHost, ObservationId},
};

/// Tracks whether one element currently meets its visibility threshold.
///
/// The observer owns at most one [`ObservationHandle`]. Re-attaching to another
/// element, detaching, latching and dropping the observer all release it.
pub struct VisibilityObserver {
    host: Rc<dyn ObservationHost>,
    config: VisibilityConfig,
    element: Option<ElementRef>,
    handle: Option<ObservationHandle>,
    visible: bool,
    latched: bool,
    degraded: bool,
}

impl VisibilityObserver {
    /// Observer that is not yet attached to an element.
    pub fn new(host: Rc<dyn ObservationHost>, config: VisibilityConfig) -> Self {
        Self {
            host,
            config,
            element: None,
            handle: None,
            visible: false,
            latched: false,
            degraded: false,
        }
    }

    /// Re-triggering observer at `threshold`.
    pub fn with_threshold(host: Rc<dyn ObservationHost>, threshold: f64) -> RevealResult<Self> {
        Ok(Self::new(host, VisibilityConfig::retriggering(threshold)?))
    }

    /// Configuration this observer was built with.
    pub fn config(&self) -> VisibilityConfig {
        self.config
    }

    /// Current signal.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Whether the one-shot latch has closed.
    pub fn is_latched(&self) -> bool {
        self.latched
    }

    /// Whether the host lacked observation support and the signal failed open.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Whether a live host observation is held.
    pub fn is_observing(&self) -> bool {
        self.handle.is_some()
    }

    /// Element currently attached, if any.
    pub fn element(&self) -> Option<ElementRef> {
        self.element
    }

    /// Host id of the live observation, used to route host notifications.
    pub fn observation_id(&self) -> Option<ObservationId> {
        self.handle.as_ref().map(ObservationHandle::id)
    }

    /// Bind to `element`, measure it, and start observing.
    ///
    /// Returns the new signal when it differs from the previous one. Attaching to
    /// the element already observed is a no-op.
    #[tracing::instrument(skip(self), fields(threshold = self.config.threshold))]
    pub fn attach(&mut self, element: ElementRef) -> Option<bool> {
        if self.element == Some(element) && (self.handle.is_some() || self.latched) {
            return None;
        }
        self.release();
        self.element = Some(element);
        self.latched = false;
        self.degraded = false;

        let before = self.visible;
        let Some(ratio) = self.host.measure(element) else {
            tracing::debug!(element = element.0, "element not mounted at attach");
            self.element = None;
            return None;
        };

        match ObservationHandle::acquire(self.host.clone(), element, self.config.threshold) {
            Ok(handle) => {
                self.handle = Some(handle);
                self.visible = self.config.is_visible_at(ratio);
                if self.visible {
                    self.close_latch();
                }
            }
            Err(RevealError::Capability(reason)) => {
                tracing::warn!(
                    element = element.0,
                    %reason,
                    "visibility observation unavailable; content shown without waiting"
                );
                self.degraded = true;
                self.visible = true;
            }
            Err(err) => {
                tracing::debug!(element = element.0, error = %err, "observe failed; detaching");
                self.element = None;
                return None;
            }
        }

        (self.visible != before).then_some(self.visible)
    }

    /// Feed one intersection notification. Returns the new signal only when it
    /// actually changed.
    pub fn on_intersection(&mut self, ratio: f64) -> Option<bool> {
        self.handle.as_ref()?;
        let next = self.config.is_visible_at(ratio);
        if next == self.visible {
            return None;
        }
        self.visible = next;
        if next {
            self.close_latch();
        }
        Some(next)
    }

    /// The host reported the element gone mid-observation: release quietly.
    pub fn on_element_lost(&mut self) {
        tracing::debug!(element = ?self.element, "observed element lost");
        self.detach();
    }

    /// Release the observation and forget the element.
    pub fn detach(&mut self) {
        self.release();
        self.element = None;
    }

    fn close_latch(&mut self) {
        if self.config.mode == ObserveMode::Latched {
            self.latched = true;
            self.release();
        }
    }

    fn release(&mut self) {
        // Dropping the handle unregisters it from the host.
        self.handle = None;
    }
}

impl std::fmt::Debug for VisibilityObserver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisibilityObserver")
            .field("config", &self.config)
            .field("element", &self.element)
            .field("handle", &self.handle)
            .field("visible", &self.visible)
            .field("latched", &self.latched)
            .field("degraded", &self.degraded)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/visibility/observer.rs"]
mod tests;
