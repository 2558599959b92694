use std::rc::Rc;

use crate::foundation::core::ElementRef;
use crate::foundation::error::RevealResult;

/// Host-assigned id of one underlying visibility observation.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct ObservationId(pub u64);

/// What the rendering layer must provide to observe element visibility.
///
/// Calls happen on the host's single UI thread, so methods take `&self` and hosts use
/// interior mutability.
pub trait ObservationHost {
    /// Start delivering intersection changes for `element` around `threshold`.
    ///
    /// Returns [`RevealError::Capability`](crate::RevealError::Capability) when the
    /// platform has no visibility observation, or
    /// [`RevealError::StaleReference`](crate::RevealError::StaleReference) when the
    /// element is no longer mounted.
    fn observe(&self, element: ElementRef, threshold: f64) -> RevealResult<ObservationId>;

    /// Stop a previously started observation. Unknown ids are ignored.
    fn unobserve(&self, id: ObservationId);

    /// Current visible fraction of `element`, or `None` if it is not mounted.
    fn measure(&self, element: ElementRef) -> Option<f64>;
}

/// Exclusive ownership of one live observation; released when dropped.
pub struct ObservationHandle {
    host: Rc<dyn ObservationHost>,
    id: ObservationId,
    element: ElementRef,
}

impl ObservationHandle {
    /// Register a new observation with `host`.
    pub fn acquire(
        host: Rc<dyn ObservationHost>,
        element: ElementRef,
        threshold: f64,
    ) -> RevealResult<Self> {
        let id = host.observe(element, threshold)?;
        Ok(Self { host, id, element })
    }

    /// Host id of the observation.
    pub fn id(&self) -> ObservationId {
        self.id
    }

    /// Observed element.
    pub fn element(&self) -> ElementRef {
        self.element
    }
}

impl Drop for ObservationHandle {
    fn drop(&mut self) {
        tracing::trace!(id = self.id.0, element = self.element.0, "release observation");
        self.host.unobserve(self.id);
    }
}

impl std::fmt::Debug for ObservationHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObservationHandle")
            .field("id", &self.id)
            .field("element", &self.element)
            .finish_non_exhaustive()
    }
}
