use std::cell::RefCell;
use std::collections::BTreeMap;

use crate::{
    foundation::core::{ElementRef, Rect},
    foundation::error::{RevealError, RevealResult},
    visibility::geometry::intersection_ratio,
    visibility::host::{ObservationHost, ObservationId},
};

/// One pending intersection notification produced by [`SimulatedHost::poll`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IntersectionEntry {
    /// Observation that fired.
    pub id: ObservationId,
    /// Observed element.
    pub element: ElementRef,
    /// Visible fraction at the time of polling.
    pub ratio: f64,
}

#[derive(Debug, Default)]
struct SimState {
    viewport: Rect,
    elements: BTreeMap<ElementRef, Rect>,
    observations: BTreeMap<ObservationId, (ElementRef, f64)>,
    // Last ratio reported per observation, to emit only on change.
    last_ratio: BTreeMap<ObservationId, f64>,
    next_element: u64,
    next_observation: u64,
    registrations: u64,
    releases: u64,
    unavailable: bool,
}

/// In-memory page geometry implementing [`ObservationHost`].
///
/// Elements are rectangles in page coordinates; scrolling moves the viewport.
#[derive(Debug, Default)]
pub struct SimulatedHost {
    state: RefCell<SimState>,
}

impl SimulatedHost {
    /// Host with the given viewport.
    pub fn new(viewport: Rect) -> Self {
        Self {
            state: RefCell::new(SimState {
                viewport,
                ..SimState::default()
            }),
        }
    }

    /// Host that reports visibility observation as unsupported.
    pub fn without_observation(viewport: Rect) -> Self {
        let host = Self::new(viewport);
        host.state.borrow_mut().unavailable = true;
        host
    }

    /// Mount an element at `rect`.
    pub fn mount(&self, rect: Rect) -> ElementRef {
        let mut st = self.state.borrow_mut();
        let el = ElementRef(st.next_element);
        st.next_element += 1;
        st.elements.insert(el, rect);
        el
    }

    /// Unmount an element; live observations of it stay registered until released.
    pub fn unmount(&self, element: ElementRef) {
        self.state.borrow_mut().elements.remove(&element);
    }

    /// Move an element.
    pub fn place(&self, element: ElementRef, rect: Rect) {
        if let Some(r) = self.state.borrow_mut().elements.get_mut(&element) {
            *r = rect;
        }
    }

    /// Scroll so the viewport's top edge sits at page offset `y`.
    pub fn scroll_to(&self, y: f64) {
        let mut st = self.state.borrow_mut();
        let h = st.viewport.height();
        st.viewport = Rect::new(st.viewport.x0, y, st.viewport.x1, y + h);
    }

    /// Current viewport.
    pub fn viewport(&self) -> Rect {
        self.state.borrow().viewport
    }

    /// Number of live observations.
    pub fn active_observations(&self) -> usize {
        self.state.borrow().observations.len()
    }

    /// Total observations ever registered.
    pub fn registrations(&self) -> u64 {
        self.state.borrow().registrations
    }

    /// Total observations released.
    pub fn releases(&self) -> u64 {
        self.state.borrow().releases
    }

    /// Collect notifications for every live observation whose ratio changed since
    /// the last poll, in observation order. Observations of unmounted elements are
    /// skipped.
    pub fn poll(&self) -> Vec<IntersectionEntry> {
        let mut st = self.state.borrow_mut();
        let viewport = st.viewport;
        let mut out = Vec::new();
        let observed: Vec<_> = st
            .observations
            .iter()
            .map(|(id, (el, _))| (*id, *el))
            .collect();
        for (id, element) in observed {
            let Some(rect) = st.elements.get(&element).copied() else {
                continue;
            };
            let ratio = intersection_ratio(rect, viewport);
            if st.last_ratio.get(&id) == Some(&ratio) {
                continue;
            }
            st.last_ratio.insert(id, ratio);
            out.push(IntersectionEntry { id, element, ratio });
        }
        out
    }
}

impl ObservationHost for SimulatedHost {
    fn observe(&self, element: ElementRef, threshold: f64) -> RevealResult<ObservationId> {
        let mut st = self.state.borrow_mut();
        if st.unavailable {
            return Err(RevealError::capability(
                "host has no intersection observation",
            ));
        }
        let Some(rect) = st.elements.get(&element).copied() else {
            return Err(RevealError::stale_reference(format!(
                "element {} is not mounted",
                element.0
            )));
        };
        let id = ObservationId(st.next_observation);
        st.next_observation += 1;
        st.registrations += 1;
        st.observations.insert(id, (element, threshold));
        let ratio = intersection_ratio(rect, st.viewport);
        st.last_ratio.insert(id, ratio);
        Ok(id)
    }

    fn unobserve(&self, id: ObservationId) {
        let mut st = self.state.borrow_mut();
        if st.observations.remove(&id).is_some() {
            st.releases += 1;
            st.last_ratio.remove(&id);
        }
    }

    fn measure(&self, element: ElementRef) -> Option<f64> {
        let st = self.state.borrow();
        st.elements
            .get(&element)
            .map(|rect| intersection_ratio(*rect, st.viewport))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/visibility/sim.rs"]
mod tests;
