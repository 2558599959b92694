use super::*;
use crate::foundation::core::Rect;
use crate::visibility::sim::SimulatedHost;

fn setup(mode: ObserveMode, threshold: f64) -> (Rc<SimulatedHost>, VisibilityObserver, ElementRef) {
    let host = Rc::new(SimulatedHost::new(Rect::new(0.0, 0.0, 100.0, 100.0)));
    let el = host.mount(Rect::new(0.0, 200.0, 100.0, 300.0));
    let obs = VisibilityObserver::new(
        host.clone(),
        VisibilityConfig::new(threshold, mode).unwrap(),
    );
    (host, obs, el)
}

#[test]
fn signal_matches_threshold_and_only_reports_crossings() {
    let (_host, mut obs, el) = setup(ObserveMode::Retriggering, 0.3);
    assert_eq!(obs.attach(el), None);
    assert!(!obs.is_visible());

    assert_eq!(obs.on_intersection(0.1), None);
    assert_eq!(obs.on_intersection(0.29), None);
    assert_eq!(obs.on_intersection(0.3), Some(true));
    assert_eq!(obs.on_intersection(0.8), None);
    assert_eq!(obs.on_intersection(0.8), None);
    assert_eq!(obs.on_intersection(0.0), Some(false));
    assert_eq!(obs.on_intersection(1.0), Some(true));
    assert!(obs.is_observing());
}

#[test]
fn initial_measurement_sets_signal_before_any_event() {
    let (host, mut obs, _) = setup(ObserveMode::Retriggering, 0.5);
    let onscreen = host.mount(Rect::new(0.0, 0.0, 100.0, 100.0));
    assert_eq!(obs.attach(onscreen), Some(true));
    assert!(obs.is_visible());
}

#[test]
fn latched_mode_pins_true_and_releases_observation() {
    let (host, mut obs, el) = setup(ObserveMode::Latched, 0.2);
    obs.attach(el);
    assert_eq!(host.active_observations(), 1);

    assert_eq!(obs.on_intersection(0.5), Some(true));
    assert!(obs.is_latched());
    assert!(!obs.is_observing());
    assert_eq!(host.active_observations(), 0);
    assert_eq!(host.releases(), 1);

    assert_eq!(obs.on_intersection(0.0), None);
    assert!(obs.is_visible());
    // Re-attaching the same element does not register again.
    assert_eq!(obs.attach(el), None);
    assert_eq!(host.registrations(), 1);
}

#[test]
fn latched_mode_latches_on_initial_measurement() {
    let (host, mut obs, _) = setup(ObserveMode::Latched, 0.2);
    let onscreen = host.mount(Rect::new(0.0, 0.0, 50.0, 50.0));
    assert_eq!(obs.attach(onscreen), Some(true));
    assert!(obs.is_latched());
    assert_eq!(host.active_observations(), 0);
}

#[test]
fn changing_element_releases_previous_observation() {
    let (host, mut obs, el) = setup(ObserveMode::Retriggering, 0.2);
    obs.attach(el);
    let first = obs.observation_id().unwrap();
    let other = host.mount(Rect::new(0.0, 500.0, 10.0, 510.0));
    obs.attach(other);
    assert_ne!(obs.observation_id(), Some(first));
    assert_eq!(host.active_observations(), 1);
    assert_eq!(host.releases(), 1);
    assert_eq!(obs.element(), Some(other));
}

#[test]
fn dropping_observer_releases_observation() {
    let (host, mut obs, el) = setup(ObserveMode::Retriggering, 0.2);
    obs.attach(el);
    assert_eq!(host.active_observations(), 1);
    drop(obs);
    assert_eq!(host.active_observations(), 0);
}

#[test]
fn missing_capability_fails_open() {
    let host = Rc::new(SimulatedHost::without_observation(Rect::new(
        0.0, 0.0, 100.0, 100.0,
    )));
    let el = host.mount(Rect::new(0.0, 900.0, 10.0, 910.0));
    let mut obs = VisibilityObserver::with_threshold(host.clone(), 0.5).unwrap();
    assert_eq!(obs.attach(el), Some(true));
    assert!(obs.is_degraded());
    assert!(obs.is_visible());
    assert_eq!(obs.on_intersection(0.0), None);
    assert!(obs.is_visible());
}

#[test]
fn stale_reference_detaches_without_signal_change() {
    let (host, mut obs, el) = setup(ObserveMode::Retriggering, 0.2);
    host.unmount(el);
    assert_eq!(obs.attach(el), None);
    assert_eq!(obs.element(), None);
    assert_eq!(host.active_observations(), 0);

    let el2 = host.mount(Rect::new(0.0, 0.0, 10.0, 10.0));
    obs.attach(el2);
    assert!(obs.is_observing());
    obs.on_element_lost();
    assert!(!obs.is_observing());
    assert_eq!(host.active_observations(), 0);
    assert_eq!(obs.on_intersection(0.0), None);
}
