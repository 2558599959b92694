use super::*;

fn host() -> SimulatedHost {
    SimulatedHost::new(Rect::new(0.0, 0.0, 100.0, 100.0))
}

#[test]
fn poll_reports_only_changed_ratios() {
    let h = host();
    let el = h.mount(Rect::new(0.0, 150.0, 100.0, 250.0));
    let id = h.observe(el, 0.5).unwrap();
    assert!(h.poll().is_empty());

    h.scroll_to(100.0);
    let entries = h.poll();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].id, id);
    assert_eq!(entries[0].ratio, 0.5);

    assert!(h.poll().is_empty());
}

#[test]
fn observe_fails_for_unmounted_elements_and_missing_capability() {
    let h = host();
    let err = h.observe(ElementRef(42), 0.1).unwrap_err();
    assert!(matches!(err, RevealError::StaleReference(_)));

    let h = SimulatedHost::without_observation(Rect::new(0.0, 0.0, 10.0, 10.0));
    let el = h.mount(Rect::new(0.0, 0.0, 1.0, 1.0));
    assert!(matches!(
        h.observe(el, 0.1).unwrap_err(),
        RevealError::Capability(_)
    ));
}

#[test]
fn unobserve_is_counted_once() {
    let h = host();
    let el = h.mount(Rect::new(0.0, 0.0, 10.0, 10.0));
    let id = h.observe(el, 0.1).unwrap();
    h.unobserve(id);
    h.unobserve(id);
    assert_eq!(h.registrations(), 1);
    assert_eq!(h.releases(), 1);
    assert_eq!(h.active_observations(), 0);
}

#[test]
fn measure_tracks_geometry() {
    let h = host();
    let el = h.mount(Rect::new(0.0, 50.0, 100.0, 150.0));
    assert_eq!(h.measure(el), Some(0.5));
    h.place(el, Rect::new(0.0, 0.0, 100.0, 100.0));
    assert_eq!(h.measure(el), Some(1.0));
    h.unmount(el);
    assert_eq!(h.measure(el), None);
}
